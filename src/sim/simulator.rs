use std::time::Instant;

use hifitime::{Duration, Epoch};
use serde::Serialize;

use crate::models::{Body, Planet, Satellite};
use crate::sim::clock::SimClock;
use crate::sim::commands::SimCommand;

/// Fixed-timestep scenario driver. Owns every body and the clock; each tick
/// steps the satellites in list order, advances simulated time, applies due
/// simulator-level commands, then runs every controller exactly once.
#[derive(Debug)]
pub struct Simulator {
    pub clock: SimClock,
    /// Calendar date of t = 0, for snapshot stamping.
    pub epoch: Epoch,
    running: bool,
    iteration: u64,
    satellites: Vec<Satellite>,
    planets: Vec<Planet>,
    commands: Vec<(f64, SimCommand)>,
}

impl Simulator {
    pub fn new(dt: f64) -> Self {
        Simulator {
            clock: SimClock::new(dt),
            epoch: Epoch::from_gregorian_utc_at_midnight(2024, 3, 15),
            running: false,
            iteration: 0,
            satellites: Vec::new(),
            planets: Vec::new(),
            commands: Vec::new(),
        }
    }

    pub fn with_epoch(mut self, epoch: Epoch) -> Self {
        self.epoch = epoch;
        self
    }

    pub fn add_planet(&mut self, planet: Planet) {
        self.planets.push(planet);
    }

    pub fn add_satellite(&mut self, satellite: Satellite) {
        self.satellites.push(satellite);
    }

    pub fn planet(&self, name: &str) -> Option<&Planet> {
        self.planets.iter().find(|p| p.name() == name)
    }

    pub fn satellite(&self, name: &str) -> Option<&Satellite> {
        self.satellites.iter().find(|s| s.name() == name)
    }

    pub fn satellite_mut(&mut self, name: &str) -> Option<&mut Satellite> {
        self.satellites.iter_mut().find(|s| s.name() == name)
    }

    pub fn satellites(&self) -> &[Satellite] {
        &self.satellites
    }

    pub fn planets(&self) -> &[Planet] {
        &self.planets
    }

    pub fn time(&self) -> f64 {
        self.clock.time
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Calendar stamp of the current simulated instant.
    pub fn utc(&self) -> Epoch {
        self.epoch + Duration::from_seconds(self.clock.time)
    }

    /// Schedule a simulator-level command at a trigger time.
    pub fn schedule(&mut self, at: f64, command: SimCommand) {
        self.commands.push((at, command));
        self.commands
            .sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    }

    pub fn count_alive(&self) -> usize {
        self.satellites.iter().filter(|s| s.is_alive()).count()
    }

    /// One full tick: physics and scripted dispatch for every satellite in
    /// list order, clock advance, simulator commands, controller updates.
    pub fn step(&mut self) {
        let clock = self.clock;
        for satellite in &mut self.satellites {
            satellite.step(&self.planets, &clock);
        }
        self.clock.advance();

        let due = self
            .commands
            .iter()
            .take_while(|(at, _)| *at <= self.clock.time)
            .count();
        for (_, command) in self.commands.drain(..due) {
            match command {
                SimCommand::SetTimeStep(dt) => {
                    println!(
                        "Simulator: time step set to {} s at t={:.0}s",
                        dt, self.clock.time
                    );
                    self.clock.dt = dt;
                }
            }
        }

        let clock = self.clock;
        for satellite in &mut self.satellites {
            let mut controller = std::mem::take(&mut satellite.controller);
            controller.update(satellite, &clock);
            satellite.controller = controller;
        }

        self.iteration += 1;
    }

    /// Drive the simulation until the wall-clock budget (s) is spent, the
    /// simulated time ceiling is reached, or no satellite is left alive.
    /// `infos` below 1.0 is a fraction of `time_max` between progress lines;
    /// 0 disables them.
    pub fn run(&mut self, duration_max: f64, time_max: f64, infos: f64) -> bool {
        println!("Starting simulation...");
        self.running = true;
        let t0 = Instant::now();

        let info_every = if infos > 0.0 && infos < 1.0 {
            infos * time_max
        } else {
            infos
        };
        let mut next_info = 0.0;

        while self.running {
            self.step();

            if info_every > 0.0 && self.clock.time >= next_info {
                next_info += info_every;
                for satellite in &self.satellites {
                    if satellite.planet_ref.is_some() {
                        println!(
                            "[{} - {:.0} s] altitude {:.0} m, speed {:.0} m/s",
                            satellite.name(),
                            self.clock.time,
                            satellite.get_altitude(),
                            satellite.get_speed()
                        );
                    }
                }
            }

            if t0.elapsed().as_secs_f64() >= duration_max
                || self.clock.time >= time_max
                || self.count_alive() == 0
            {
                self.stop(t0);
                return false;
            }
        }
        true
    }

    fn stop(&mut self, t0: Instant) {
        self.running = false;
        println!(
            "Simulation finished after {} iterations and {:.2} s ({:.0} s simulated)",
            self.iteration,
            t0.elapsed().as_secs_f64(),
            self.clock.time
        );
    }

    /// Read-only per-tick state for recorders and plotters.
    pub fn snapshot(&self) -> Vec<Snapshot> {
        self.satellites
            .iter()
            .map(|satellite| Snapshot {
                satellite: satellite.name().to_string(),
                time: self.clock.time,
                x: satellite.body.position[0],
                y: satellite.body.position[1],
                z: satellite.body.position[2],
                radius: satellite.get_radius(),
                speed: satellite.get_speed(),
                orientation: satellite.ang_pos[2],
                dt: self.clock.dt,
                thrusters: satellite
                    .thrusters()
                    .iter()
                    .map(|t| ThrusterPower {
                        name: t.name.clone(),
                        power: t.power,
                    })
                    .collect(),
            })
            .collect()
    }
}

/// Per-thruster throttle state exposed to external consumers.
#[derive(Debug, Clone, Serialize)]
pub struct ThrusterPower {
    pub name: String,
    pub power: f64,
}

/// Read-only view of one satellite at one tick.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub satellite: String,
    pub time: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub radius: f64,
    pub speed: f64,
    /// z angular coordinate, enough for display.
    pub orientation: f64,
    pub dt: f64,
    pub thrusters: Vec<ThrusterPower>,
}
