use nalgebra as na;

use crate::models::{Body, Planet, Satellite};
use crate::physics::orbital::OrbitalMechanics;

/// Demo spacecraft preset used by the binary and the scenario tests.
pub struct DemoSat;

impl DemoSat {
    pub const MASS: f64 = 1000.0; // kg
    pub const SIZE: [f64; 3] = [3.0, 1.0, 1.0]; // m

    fn base(name: &str) -> Satellite {
        let mut sat = Satellite::new(
            name,
            Self::MASS,
            na::Vector3::new(Self::SIZE[0], Self::SIZE[1], Self::SIZE[2]),
        );
        sat.add_default_thrusters();
        sat
    }

    /// Landed on the planet surface along world +x, ready for takeoff.
    pub fn on_surface(name: &str, planet: &Planet) -> Satellite {
        let mut sat =
            Self::base(name).at(planet.position() + na::Vector3::new(planet.radius, 0.0, 0.0));
        sat.set_planet_ref(planet);
        sat.landed = true;
        sat
    }

    /// On a circular prograde orbit at the given radius, with the body
    /// already rotation-synchronized: +x along the velocity, -y pointing
    /// away from the planet, spinning at the orbital rate.
    pub fn in_orbit(name: &str, planet: &Planet, radius: f64) -> Satellite {
        let speed = OrbitalMechanics::circular_speed(planet.mass(), radius);
        let mut sat = Self::base(name)
            .at(planet.position() + na::Vector3::new(radius, 0.0, 0.0))
            .moving(na::Vector3::new(0.0, speed, 0.0));
        sat.set_planet_ref(planet);
        sat.update_orientation(&na::Vector3::new(0.0, 0.0, std::f64::consts::FRAC_PI_2));
        sat.ang_pos = na::Vector3::new(0.0, 0.0, std::f64::consts::FRAC_PI_2);
        sat.ang_vel = na::Vector3::new(0.0, 0.0, speed / radius);
        sat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn surface_preset_is_landed_on_the_surface() {
        let earth = Planet::new("Earth", 6.371e6, 5.972e24);
        let sat = DemoSat::on_surface("demo", &earth);
        assert!(sat.landed);
        assert_eq!(sat.get_radius(), earth.radius);
        let names: Vec<&str> = sat.thrusters().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["main", "left", "right", "brake"]);
        assert_eq!(sat.thruster("main").unwrap().max_thrust, 12.0 * DemoSat::MASS);
        assert_eq!(sat.thruster("left").unwrap().max_thrust, DemoSat::MASS / 200.0);
    }

    #[test]
    fn orbit_preset_is_synchronized() {
        let earth = Planet::new("Earth", 6.371e6, 5.972e24);
        let sat = DemoSat::in_orbit("demo", &earth, 9.0e6);
        // -uy points away from the planet center
        let r_hat = (sat.body.position - earth.position()) / sat.get_radius();
        assert_abs_diff_eq!(r_hat.dot(&-sat.uy), 1.0, epsilon = 1e-9);
        // +x tracks the velocity
        assert_abs_diff_eq!(
            sat.ux.dot(&(sat.body.velocity / sat.get_speed())),
            1.0,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(
            sat.ang_vel[2],
            sat.get_speed() / sat.get_radius(),
            epsilon = 1e-12
        );
    }
}
