use std::cell::Cell;

use nalgebra as na;

use super::body::{Body, BodyState};
use super::planet::{Planet, PlanetRef};
use super::thruster::{Thruster, ThrusterAxis};
use crate::gnc::controller::Controller;
use crate::numerics::rotation::{self, Axis};
use crate::physics::{gravity, integrator};
use crate::sim::clock::SimClock;
use crate::sim::commands::{Command, CommandSchedule, ScheduledCommand};

/// A rigid box-shaped spacecraft with named thrusters, an incrementally
/// rotated orthonormal basis and an autonomous maneuver controller.
#[derive(Debug)]
pub struct Satellite {
    pub body: BodyState,
    /// Half-extent basis for inertia and geometry (m).
    pub size: na::Vector3<f64>,
    /// Box inertia diagonal, derived once from mass and size (kg·m²).
    pub inertia: na::Vector3<f64>,

    // Orientation basis; invariant: always orthonormal, updated only by
    // small-angle incremental axis rotations.
    pub ux: na::Vector3<f64>,
    pub uy: na::Vector3<f64>,
    pub uz: na::Vector3<f64>,

    // Angular state in body axes.
    pub ang_pos: na::Vector3<f64>,
    pub ang_vel: na::Vector3<f64>,
    pub ang_acc: na::Vector3<f64>,

    /// Gravitational acceleration accumulated during the last step (m/s²).
    pub gravity: na::Vector3<f64>,
    /// Resultant thruster force in world coordinates (N).
    pub thrust: na::Vector3<f64>,
    /// Resultant thruster torque in world coordinates (N·m).
    pub torque: na::Vector3<f64>,

    pub planet_ref: Option<PlanetRef>,
    pub landed: bool,
    pub taking_off: bool,

    pub controller: Controller,
    pub commands: CommandSchedule,

    thrusters: Vec<Thruster>,
    radius_cache: Cell<Option<f64>>,
    speed_cache: Cell<Option<f64>>,
}

impl Satellite {
    pub fn new(name: &str, mass: f64, size: na::Vector3<f64>) -> Self {
        let inertia = 1.0 / 12.0
            * mass
            * na::Vector3::new(
                size[1] * size[1] + size[2] * size[2],
                size[0] * size[0] + size[2] * size[2],
                size[0] * size[0] + size[1] * size[1],
            );
        Satellite {
            body: BodyState::new(name, mass),
            size,
            inertia,
            ux: na::Vector3::x(),
            uy: na::Vector3::y(),
            uz: na::Vector3::z(),
            ang_pos: na::Vector3::zeros(),
            ang_vel: na::Vector3::zeros(),
            ang_acc: na::Vector3::zeros(),
            gravity: na::Vector3::zeros(),
            thrust: na::Vector3::zeros(),
            torque: na::Vector3::zeros(),
            planet_ref: None,
            landed: false,
            taking_off: false,
            controller: Controller::default(),
            commands: CommandSchedule::default(),
            thrusters: Vec::new(),
            radius_cache: Cell::new(None),
            speed_cache: Cell::new(None),
        }
    }

    pub fn at(mut self, position: na::Vector3<f64>) -> Self {
        self.body.position = position;
        self
    }

    pub fn moving(mut self, velocity: na::Vector3<f64>) -> Self {
        self.body.velocity = velocity;
        self
    }

    pub fn set_planet_ref(&mut self, planet: &Planet) {
        self.planet_ref = Some(planet.reference());
    }

    /// Register a thruster. Names must be unique; a duplicate is rejected
    /// with a warning so a scenario typo cannot shadow an existing nozzle.
    pub fn add_thruster(&mut self, thruster: Thruster) {
        if self.thrusters.iter().any(|t| t.name == thruster.name) {
            eprintln!(
                "Warning: thruster '{}' already exists on {}, ignoring duplicate",
                thruster.name, self.body.name
            );
            return;
        }
        self.thrusters.push(thruster);
    }

    /// Install the standard complement scaled from the satellite mass:
    /// a main engine and a brake on +x, and two small lateral nozzles.
    pub fn add_default_thrusters(&mut self) {
        let mass = self.body.mass;
        let s = self.size;
        self.add_thruster(Thruster::new(
            "main",
            na::Vector3::new(-s[0] / 2.0, 0.0, 0.0),
            12.0 * mass,
            ThrusterAxis::XPlus,
        ));
        self.add_thruster(Thruster::new(
            "left",
            na::Vector3::new(-s[0] / 3.0, s[1] / 2.0, 0.0),
            mass / 200.0,
            ThrusterAxis::YMinus,
        ));
        self.add_thruster(Thruster::new(
            "right",
            na::Vector3::new(-s[0] / 3.0, -s[1] / 2.0, 0.0),
            mass / 200.0,
            ThrusterAxis::YPlus,
        ));
        self.add_thruster(Thruster::new(
            "brake",
            na::Vector3::new(-s[0] / 2.0, 0.0, 0.0),
            mass,
            ThrusterAxis::XPlus,
        ));
    }

    pub fn thrusters(&self) -> &[Thruster] {
        &self.thrusters
    }

    pub fn thruster(&self, name: &str) -> Option<&Thruster> {
        self.thrusters.iter().find(|t| t.name == name)
    }

    pub fn thruster_mut(&mut self, name: &str) -> Option<&mut Thruster> {
        self.thrusters.iter_mut().find(|t| t.name == name)
    }

    /// Enqueue a scripted command for later dispatch.
    pub fn schedule(&mut self, at: f64, command: Command) {
        self.commands.push(ScheduledCommand { at, command });
    }

    /// Distance to the reference planet center. Cached for the remainder of
    /// the tick; 0.0 when no reference planet is assigned.
    pub fn get_radius(&self) -> f64 {
        if let Some(r) = self.radius_cache.get() {
            return r;
        }
        let r = match &self.planet_ref {
            Some(planet) => (self.body.position - planet.position).norm(),
            None => 0.0,
        };
        self.radius_cache.set(Some(r));
        r
    }

    /// Velocity magnitude, cached for the remainder of the tick.
    pub fn get_speed(&self) -> f64 {
        if let Some(v) = self.speed_cache.get() {
            return v;
        }
        let v = self.body.velocity.norm();
        self.speed_cache.set(Some(v));
        v
    }

    /// Height above the reference planet surface; 0.0 when no reference
    /// planet is assigned.
    pub fn get_altitude(&self) -> f64 {
        match &self.planet_ref {
            Some(planet) => self.get_radius() - planet.radius,
            None => {
                eprintln!(
                    "Warning: {} has no reference planet, altitude reported as 0",
                    self.body.name
                );
                0.0
            }
        }
    }

    fn invalidate_caches(&self) {
        self.radius_cache.set(None);
        self.speed_cache.set(None);
    }

    /// Overwrite position and velocity, dropping the per-tick caches. Used
    /// by the controller to snap onto an exact target orbit.
    pub fn force_state(&mut self, position: na::Vector3<f64>, velocity: na::Vector3<f64>) {
        self.body.position = position;
        self.body.velocity = velocity;
        self.invalidate_caches();
    }

    /// Sum every thruster's force and torque and express the resultants in
    /// world coordinates through the satellite basis.
    pub fn aggregate_thrust_torque(&mut self) -> (na::Vector3<f64>, na::Vector3<f64>) {
        let mut thrust = na::Vector3::zeros();
        let mut torque = na::Vector3::zeros();
        for thruster in &self.thrusters {
            thrust += thruster.thrust;
            torque += thruster.torque;
        }
        self.thrust = rotation::from_basis(&thrust, &self.ux, &self.uy, &self.uz);
        self.torque = rotation::from_basis(&torque, &self.ux, &self.uy, &self.uz);
        (self.thrust, self.torque)
    }

    /// Rotate the basis by the per-axis angular increments, applying the
    /// elementary rotations sequentially in x, y, z order. The sequential
    /// composition is not order-invariant; reference trajectories depend on
    /// this exact ordering, so it must not be replaced by a single combined
    /// rotation.
    pub fn update_orientation(&mut self, dalpha: &na::Vector3<f64>) {
        for axis in Axis::ALL {
            let delta = dalpha[axis.index()];
            if delta != 0.0 {
                let rot = rotation::rotation_matrix(delta, axis);
                self.ux = rot * self.ux;
                self.uy = rot * self.uy;
                self.uz = rot * self.uz;
            }
        }
    }

    /// One fixed-timestep physics update: thrust aggregation, gravity,
    /// translational then angular semi-implicit Euler integration, basis
    /// update, collision check, scripted-command dispatch. Dispatch runs
    /// even for dead or landed satellites.
    pub fn step(&mut self, planets: &[Planet], clock: &SimClock) {
        if self.body.alive && (!self.landed || self.taking_off) {
            let (force, torque) = self.aggregate_thrust_torque();

            self.gravity = gravity::gravitational_acceleration(
                &self.body.position,
                self.body.id,
                planets,
            );
            self.body.acceleration = self.gravity + force / self.body.mass;
            let (position, velocity) = integrator::semi_implicit_euler(
                &self.body.position,
                &self.body.velocity,
                &self.body.acceleration,
                clock.dt,
            );
            self.body.position = position;
            self.body.velocity = velocity;
            self.invalidate_caches();

            self.ang_acc = torque.component_div(&self.inertia);
            let (ang_pos, ang_vel) = integrator::semi_implicit_euler(
                &self.ang_pos,
                &self.ang_vel,
                &self.ang_acc,
                clock.dt,
            );
            let dalpha = ang_pos - self.ang_pos;
            self.ang_pos = ang_pos;
            self.ang_vel = ang_vel;
            self.update_orientation(&dalpha);

            if !(self.landed || self.taking_off) {
                self.check_collision(planets, clock);
            }
        }
        self.dispatch_commands(clock);
    }

    /// Kill the satellite on first contact with a planet surface, snapping
    /// the position back onto the surface along the pre-collision direction.
    /// The first colliding planet wins.
    pub fn check_collision(&mut self, planets: &[Planet], clock: &SimClock) {
        for planet in planets {
            let offset = self.body.position - planet.position();
            if offset.norm() < planet.radius {
                println!(
                    "Satellite {} crashed into {} after {:.0} s alive",
                    self.body.name,
                    planet.name(),
                    clock.time
                );
                self.body.alive = false;
                self.body.position = planet.position() + offset / offset.norm() * planet.radius;
                break;
            }
        }
    }

    /// Consume every scripted command whose trigger time has passed, in
    /// temporal order. Dispatch failures are reported and skipped; the
    /// simulation keeps going.
    fn dispatch_commands(&mut self, clock: &SimClock) {
        for entry in self.commands.drain_due(clock.time) {
            println!(
                "Command for {} at t={:.0}s: {}",
                self.body.name, clock.time, entry.command
            );
            if let Err(e) = self.apply(entry.command) {
                eprintln!("Warning: command dropped: {}", e);
            }
        }
    }

    fn apply(&mut self, command: Command) -> Result<(), crate::sim::commands::CommandError> {
        use crate::sim::commands::CommandError;
        match command {
            Command::Thruster { name, power } => {
                let thruster = self
                    .thruster_mut(&name)
                    .ok_or(CommandError::UnknownThruster(name))?;
                thruster.on(power);
                Ok(())
            }
            Command::Run(request) => {
                self.controller.request(request);
                Ok(())
            }
            Command::SetLanded(value) => {
                self.landed = value;
                Ok(())
            }
            Command::SetTakingOff(value) => {
                self.taking_off = value;
                Ok(())
            }
        }
    }
}

impl Body for Satellite {
    fn state(&self) -> &BodyState {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gnc::maneuver::ManeuverRequest;
    use approx::assert_abs_diff_eq;

    fn test_sat() -> Satellite {
        let mut sat = Satellite::new("test", 1000.0, na::Vector3::new(3.0, 1.0, 1.0));
        sat.add_default_thrusters();
        sat
    }

    fn clock(dt: f64) -> SimClock {
        SimClock { time: 0.0, dt }
    }

    #[test]
    fn box_inertia_diagonal() {
        let sat = test_sat();
        // 1/12 · 1000 · (1+1, 9+1, 9+1)
        assert_abs_diff_eq!(
            sat.inertia,
            na::Vector3::new(166.666_666_666_666_66, 833.333_333_333_333_3, 833.333_333_333_333_3),
            epsilon = 1e-9
        );
    }

    #[test]
    fn duplicate_thruster_names_are_rejected() {
        let mut sat = test_sat();
        let before = sat.thrusters().len();
        sat.add_thruster(Thruster::new(
            "main",
            na::Vector3::zeros(),
            1.0,
            ThrusterAxis::XPlus,
        ));
        assert_eq!(sat.thrusters().len(), before);
    }

    #[test]
    fn basis_stays_orthonormal_through_incremental_rotations() {
        let mut sat = test_sat();
        for i in 0..500 {
            let dalpha = na::Vector3::new(
                0.01 * (i % 3) as f64,
                0.02 * (i % 2) as f64,
                0.015,
            );
            sat.update_orientation(&dalpha);
        }
        for u in [sat.ux, sat.uy, sat.uz] {
            assert_abs_diff_eq!(u.norm(), 1.0, epsilon = 1e-9);
        }
        assert_abs_diff_eq!(sat.ux.dot(&sat.uy), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(sat.uy.dot(&sat.uz), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(sat.uz.dot(&sat.ux), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn sequential_axis_rotations_compose_in_fixed_order() {
        use crate::numerics::rotation::{rotation_matrix, Axis};
        let mut sat = test_sat();
        sat.update_orientation(&na::Vector3::new(0.3, 0.2, 0.0));
        // x rotation applied first, then y, to the world axes
        let expected =
            rotation_matrix(0.2, Axis::Y) * rotation_matrix(0.3, Axis::X) * na::Vector3::x();
        assert_abs_diff_eq!(sat.ux, expected, epsilon = 1e-12);
    }

    #[test]
    fn radius_and_speed_are_cached_within_a_tick() {
        let earth = Planet::new("Earth", 6.371e6, 5.972e24);
        let mut sat = test_sat()
            .at(na::Vector3::new(7.0e6, 0.0, 0.0))
            .moving(na::Vector3::new(0.0, 7500.0, 0.0));
        sat.set_planet_ref(&earth);

        let r1 = sat.get_radius();
        let v1 = sat.get_speed();
        // Mutate state directly; cached values must survive until the next step
        sat.body.position = na::Vector3::new(8.0e6, 0.0, 0.0);
        sat.body.velocity = na::Vector3::zeros();
        assert_eq!(sat.get_radius(), r1);
        assert_eq!(sat.get_speed(), v1);

        sat.step(&[earth], &clock(1.0));
        assert_ne!(sat.get_radius(), r1);
    }

    #[test]
    fn radius_without_reference_planet_is_zero() {
        let sat = test_sat();
        assert_eq!(sat.get_radius(), 0.0);
        assert_eq!(sat.get_altitude(), 0.0);
    }

    #[test]
    fn collision_kills_and_snaps_to_surface() {
        let earth = Planet::new("Earth", 6.371e6, 5.972e24);
        let mut sat = test_sat().at(na::Vector3::new(6.0e6, 0.0, 0.0));
        sat.set_planet_ref(&earth);
        sat.check_collision(std::slice::from_ref(&earth), &clock(1.0));
        assert!(!sat.body.alive);
        assert_abs_diff_eq!(
            (sat.body.position - earth.position()).norm(),
            earth.radius,
            epsilon = 1e-6
        );
    }

    #[test]
    fn landed_satellite_skips_physics_but_dispatches_commands() {
        let earth = Planet::new("Earth", 6.371e6, 5.972e24);
        let mut sat = test_sat().at(na::Vector3::new(6.371e6, 0.0, 0.0));
        sat.set_planet_ref(&earth);
        sat.landed = true;
        sat.schedule(0.0, Command::Run(ManeuverRequest::Takeoff));

        let before = sat.body.position;
        sat.step(std::slice::from_ref(&earth), &clock(20.0));
        assert_eq!(sat.body.position, before, "no integration while landed");
        assert!(sat.body.alive, "no collision check while landed");
        assert!(
            sat.controller.has_pending(),
            "scripted dispatch still runs while landed"
        );
    }

    #[test]
    fn thrust_resultant_follows_the_basis() {
        let mut sat = test_sat();
        // Rotate the body 90° about z: body +x is world +y
        sat.update_orientation(&na::Vector3::new(0.0, 0.0, std::f64::consts::FRAC_PI_2));
        sat.thruster_mut("main").unwrap().on(1.0);
        let (force, _) = sat.aggregate_thrust_torque();
        assert_abs_diff_eq!(
            force,
            na::Vector3::new(0.0, 12_000.0, 0.0),
            epsilon = 1e-6
        );
    }
}
