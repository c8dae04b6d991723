use crate::constants::{G, PI};

pub struct OrbitalMechanics;

impl OrbitalMechanics {
    /// Tangential speed of a circular orbit of the given radius around a
    /// body of the given mass.
    pub fn circular_speed(planet_mass: f64, radius: f64) -> f64 {
        (G * planet_mass / radius).sqrt()
    }

    /// Orbital period implied by the current radius and speed, 2πr/v.
    pub fn instantaneous_period(radius: f64, speed: f64) -> f64 {
        2.0 * PI * (radius / speed)
    }

    /// Departure and arrival speeds of the half-elliptic transfer between
    /// two circular orbits (vis-viva at perigee and apogee of the ellipse).
    pub fn hohmann_speeds(planet_mass: f64, r1: f64, r2: f64) -> (f64, f64) {
        let mu2 = 2.0 * G * planet_mass;
        let v1 = (mu2 * (1.0 / r1 - 1.0 / (r1 + r2))).sqrt();
        let v2 = (mu2 * (1.0 / r2 - 1.0 / (r1 + r2))).sqrt();
        (v1, v2)
    }

    /// Coast duration of the transfer: half the period of the ellipse with
    /// semi-major axis (r1+r2)/2.
    pub fn hohmann_transfer_time(planet_mass: f64, r1: f64, r2: f64) -> f64 {
        0.5 * (4.0 * PI * PI / (G * planet_mass) * ((r1 + r2) / 2.0).powi(3)).sqrt()
    }
}
