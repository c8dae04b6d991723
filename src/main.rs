use csv::Writer;
use satsim::config::satellite::DemoSat;
use satsim::constants::{M_EARTH, R_EARTH};
use satsim::models::Planet;
use satsim::sim::commands::Command;
use satsim::sim::simulator::Simulator;
use std::error::Error;
use std::fs::{self, File};
use std::path::Path;
use std::time::Instant;

/// Demo scenario: a 1000 kg satellite lifts off from the Earth surface,
/// climbs to a 9000 km circular orbit, synchronizes its rotation, then
/// performs a Hohmann transfer to 12000 km.
fn main() -> Result<(), Box<dyn Error>> {
    let mut sim = Simulator::new(20.0);
    sim.add_planet(Planet::new("Earth", R_EARTH, M_EARTH));

    let earth = sim.planet("Earth").expect("Earth was just added").clone();
    let mut sat = DemoSat::on_surface("mySat", &earth);
    sat.schedule(60.0, Command::parse("ctr-run-takeoff", 0.0)?);
    sat.schedule(120.0, Command::parse("ctr-run-geo", 9.0e6)?);
    sat.schedule(10_000.0, Command::parse("ctr-run-hohmann", 1.2e7)?);
    sim.add_satellite(sat);

    // Create output directory if it doesn't exist
    let output_dir = Path::new("output");
    fs::create_dir_all(output_dir)?;

    let file = File::create(output_dir.join("trajectory.csv"))?;
    let mut writer = Writer::from_writer(file);
    writer.write_record([
        "UTC Time",
        "Time (s)",
        "Position X (km)",
        "Position Y (km)",
        "Position Z (km)",
        "Radius (km)",
        "Speed (km/s)",
        "Orientation Z (rad)",
        "Power main",
        "Power left",
        "Power right",
        "Power brake",
    ])?;

    let time_max = 20_000.0;
    let wall_budget = 15.0;
    let t0 = Instant::now();
    let mut next_report = 0.0;

    while sim.time() < time_max && sim.count_alive() > 0 {
        sim.step();

        if sim.time() >= next_report {
            next_report += time_max / 10.0;
            for sat in sim.satellites() {
                println!(
                    "[{} - {:.0} s] altitude {:.0} m, speed {:.0} m/s",
                    sat.body.name,
                    sim.time(),
                    sat.get_altitude(),
                    sat.get_speed()
                );
            }
        }

        // Record every 5th tick, and every tick a thruster is firing
        let snapshot = sim.snapshot();
        let shot = &snapshot[0];
        let burning = shot.thrusters.iter().any(|t| t.power > 0.0);
        if sim.iteration() % 5 == 0 || burning {
            let mut record = vec![
                sim.utc().to_string(),
                format!("{}", shot.time),
                format!("{}", shot.x / 1000.0),
                format!("{}", shot.y / 1000.0),
                format!("{}", shot.z / 1000.0),
                format!("{}", shot.radius / 1000.0),
                format!("{}", shot.speed / 1000.0),
                format!("{}", shot.orientation),
            ];
            record.extend(shot.thrusters.iter().map(|t| format!("{}", t.power)));
            writer.write_record(&record)?;
        }

        if t0.elapsed().as_secs_f64() >= wall_budget {
            eprintln!("Wall-clock budget exhausted, stopping early");
            break;
        }
    }

    writer.flush()?;
    println!(
        "Simulated {:.0} s in {} iterations; trajectory written to output/trajectory.csv",
        sim.time(),
        sim.iteration()
    );

    Ok(())
}
