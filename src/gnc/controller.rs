use nalgebra as na;

use crate::constants::PI;
use crate::gnc::burns;
use crate::gnc::maneuver::{
    GeoInsertion, GeoPhase, HohmannPhase, HohmannTransfer, ManeuverRequest, RotationSync,
    SyncPhase,
};
use crate::models::Satellite;
use crate::numerics::rotation::normalize;
use crate::physics::orbital::OrbitalMechanics;
use crate::sim::clock::SimClock;

/// Autonomous maneuver controller. Holds at most one active instance of
/// each maneuver kind; `None` is the explicit idle variant. When several
/// are active only one is advanced per tick, in fixed priority order:
/// GEO insertion, then rotation sync, then Hohmann transfer.
#[derive(Debug, Default)]
pub struct Controller {
    pub reach_geo: Option<GeoInsertion>,
    pub reach_sync: Option<RotationSync>,
    pub hohmann: Option<HohmannTransfer>,
    pending: Vec<ManeuverRequest>,
}

impl Controller {
    /// Queue a maneuver order; it is armed at the next controller update.
    pub fn request(&mut self, request: ManeuverRequest) {
        self.pending.push(request);
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn is_idle(&self) -> bool {
        self.reach_geo.is_none()
            && self.reach_sync.is_none()
            && self.hohmann.is_none()
            && self.pending.is_empty()
    }

    /// One controller tick: release surface flags, arm queued orders, then
    /// advance the highest-priority active maneuver.
    pub fn update(&mut self, sat: &mut Satellite, clock: &SimClock) {
        if sat.landed || sat.taking_off {
            if let Some(planet) = &sat.planet_ref {
                if sat.get_radius() > 1.01 * planet.radius {
                    sat.landed = false;
                    sat.taking_off = false;
                }
            }
        }

        for request in std::mem::take(&mut self.pending) {
            self.arm(request, sat, clock);
        }

        if self.reach_geo.is_some() {
            self.advance_geo(sat, clock);
        } else if self.reach_sync.is_some() {
            self.advance_sync(sat, clock);
        } else if self.hohmann.is_some() {
            self.advance_hohmann(sat, clock);
        }
    }

    fn arm(&mut self, request: ManeuverRequest, sat: &mut Satellite, clock: &SimClock) {
        match request {
            ManeuverRequest::Takeoff => self.takeoff(sat, clock),
            ManeuverRequest::Geo { radius } => self.arm_geo(sat, clock, radius),
            ManeuverRequest::Synchronize => self.arm_synchronize(sat, clock),
            ManeuverRequest::Hohmann { radius } => self.arm_hohmann(sat, clock, radius),
        }
    }

    fn takeoff(&mut self, sat: &mut Satellite, clock: &SimClock) {
        sat.taking_off = true;
        match forward_thruster(sat) {
            Some(name) => {
                if let Some(thruster) = sat.thruster_mut(&name) {
                    thruster.on(0.90);
                }
                println!("Controller: takeoff burn started at t={:.0}s", clock.time);
            }
            None => eprintln!("Warning: takeoff impossible, no forward thruster"),
        }
    }

    fn arm_geo(&mut self, sat: &mut Satellite, clock: &SimClock, radius: f64) {
        let Some(planet) = sat.planet_ref.clone() else {
            eprintln!("Warning: GEO insertion needs a reference planet");
            return;
        };
        let (Some(main), Some(lateral)) = (forward_thruster(sat), positive_spin_thruster(sat))
        else {
            eprintln!("Warning: GEO insertion impossible, no capable thruster pair");
            return;
        };
        let lateral_torque = sat
            .thruster(&lateral)
            .map(|t| t.max_torque[2])
            .unwrap_or(0.0);
        let coef = sat.inertia[2] / lateral_torque / clock.dt;
        self.reach_geo = Some(GeoInsertion {
            phase: GeoPhase::Approach,
            target_radius: radius,
            target_speed: OrbitalMechanics::circular_speed(planet.mass, radius),
            switch_threshold: GeoInsertion::SWITCH_THRESHOLD,
            gamma_approach: GeoInsertion::GAMMA_APPROACH,
            gamma_reaching: GeoInsertion::GAMMA_REACHING,
            rot_pulse: GeoInsertion::ROT_PULSE_SCALE * coef,
            main,
            lateral,
            eps_radius: GeoInsertion::EPSILON,
            eps_speed: GeoInsertion::EPSILON,
            eps_angle: GeoInsertion::EPSILON,
        });
        println!(
            "Controller: phase 1 of GEO insertion started at t={:.0}s",
            clock.time
        );
    }

    fn advance_geo(&mut self, sat: &mut Satellite, clock: &SimClock) {
        let Some(mut geo) = self.reach_geo.take() else {
            return;
        };
        let Some(planet) = sat.planet_ref.clone() else {
            eprintln!("Warning: reference planet lost, dropping GEO insertion");
            return;
        };
        let mut finished = false;
        match geo.phase {
            GeoPhase::Approach => {
                // Hold a slight radial surplus over local gravity.
                let thrust = (1.0 + geo.gamma_approach) * sat.gravity.norm() * sat.body.mass;
                if let Some(main) = sat.thruster_mut(&geo.main) {
                    let power = thrust / main.max_thrust;
                    main.on(power);
                }
                if sat.get_radius() / geo.target_radius >= geo.switch_threshold {
                    geo.phase = GeoPhase::Reaching;
                    // Single-tick pulse, switched back off on the next update.
                    if let Some(lateral) = sat.thruster_mut(&geo.lateral) {
                        lateral.on(geo.rot_pulse);
                    }
                    println!(
                        "Controller: phase 2 of GEO insertion started at t={:.0}s",
                        clock.time
                    );
                }
            }
            GeoPhase::Reaching => {
                if let Some(lateral) = sat.thruster_mut(&geo.lateral) {
                    lateral.off();
                }
                let r_hat = normalize(&(sat.body.position - planet.position));
                let angle = r_hat.dot(&sat.ux).clamp(-1.0, 1.0).acos();
                // Compensate gravity and the centrifugal term, projected onto
                // the tilted thrust axis.
                let mut thrust = (1.0 + geo.gamma_reaching) * sat.gravity.norm();
                thrust -= sat.get_speed().powi(2) / sat.get_radius() * angle.sin().powi(2);
                thrust *= sat.body.mass / angle.cos();
                if let Some(main) = sat.thruster_mut(&geo.main) {
                    let power = thrust / main.max_thrust;
                    main.on(power);
                }

                let radius_ok =
                    (sat.get_radius() / geo.target_radius - 1.0).abs() < geo.eps_radius;
                let speed_ok = (sat.get_speed() / geo.target_speed - 1.0).abs() < geo.eps_speed;
                let angle_ok = (angle / (PI / 2.0) - 1.0).abs() < geo.eps_angle;
                if radius_ok && speed_ok && angle_ok {
                    // Close enough: snap onto the exact circular orbit so
                    // discretization drift cannot accumulate.
                    sat.force_state(
                        planet.position + r_hat * geo.target_radius,
                        na::Vector3::z().cross(&r_hat) * geo.target_speed,
                    );
                    if let Some(main) = sat.thruster_mut(&geo.main) {
                        main.off();
                    }
                    println!("Controller: GEO reached (forced) at t={:.0}s", clock.time);
                    finished = true;
                    // Re-synchronize the rotation for any maneuver to come.
                    self.pending.push(ManeuverRequest::Synchronize);
                }
            }
        }
        if !finished {
            self.reach_geo = Some(geo);
        }
    }

    fn arm_synchronize(&mut self, sat: &mut Satellite, clock: &SimClock) {
        match burns::power_to_cancel_rotation(sat, 2, clock.dt) {
            Some(plan) => {
                if let Some(thruster) = sat.thruster_mut(&plan.thruster) {
                    thruster.on(plan.power);
                }
                self.reach_sync = Some(RotationSync {
                    phase: SyncPhase::Stop { plan, iteration: 0 },
                    epsilon: RotationSync::ALIGN_EPSILON,
                });
                println!(
                    "Controller: starting rotation sync at t={:.0}s",
                    clock.time
                );
            }
            None => eprintln!("Warning: rotation sync impossible, no capable thruster"),
        }
    }

    fn advance_sync(&mut self, sat: &mut Satellite, clock: &SimClock) {
        let Some(mut sync) = self.reach_sync.take() else {
            return;
        };
        let Some(planet) = sat.planet_ref.clone() else {
            eprintln!("Warning: reference planet lost, dropping rotation sync");
            return;
        };

        if let SyncPhase::Stop { plan, iteration } = &mut sync.phase {
            if *iteration == plan.iterations {
                if let Some(thruster) = sat.thruster_mut(&plan.thruster) {
                    thruster.off();
                }
                sync.phase = SyncPhase::Wait {
                    period: OrbitalMechanics::instantaneous_period(
                        sat.get_radius(),
                        sat.get_speed(),
                    ),
                };
            } else {
                *iteration += 1;
            }
        }
        if let SyncPhase::Wait { period } = sync.phase {
            let r_hat = normalize(&(sat.body.position - planet.position));
            let cos_angle = r_hat.dot(&-sat.uy);
            if cos_angle > 1.0 - sync.epsilon {
                match burns::power_for_rotation(sat, period, 2, 1, clock.dt) {
                    Some(plan) => {
                        if let Some(thruster) = sat.thruster_mut(&plan.thruster) {
                            thruster.on(plan.power);
                        }
                        sync.phase = SyncPhase::Sync { plan, iteration: 0 };
                    }
                    None => {
                        println!(
                            "Controller: rotation sync infeasible, aborted at t={:.0}s",
                            clock.time
                        );
                        return;
                    }
                }
            }
        }
        let mut finished = false;
        if let SyncPhase::Sync { plan, iteration } = &mut sync.phase {
            if *iteration == plan.iterations {
                if let Some(thruster) = sat.thruster_mut(&plan.thruster) {
                    thruster.off();
                }
                println!(
                    "Controller: rotation synchronized at t={:.0}s",
                    clock.time
                );
                finished = true;
            } else {
                *iteration += 1;
            }
        }
        if !finished {
            self.reach_sync = Some(sync);
        }
    }

    fn arm_hohmann(&mut self, sat: &mut Satellite, clock: &SimClock, radius: f64) {
        let Some(planet) = sat.planet_ref.clone() else {
            eprintln!("Warning: Hohmann transfer needs a reference planet");
            return;
        };
        let r1 = sat.get_radius();
        let r2 = radius;
        let (v1, _) = OrbitalMechanics::hohmann_speeds(planet.mass, r1, r2);
        let Some(plan) =
            burns::power_for_speed(sat, v1 - sat.get_speed(), &na::Vector3::x(), 1, clock.dt)
        else {
            println!(
                "Controller: cannot reach the elliptic transfer orbit ({} -> {:.0} m)",
                sat.body.name, r2
            );
            return;
        };
        let transfer_time = OrbitalMechanics::hohmann_transfer_time(planet.mass, r1, r2);
        let Some(rotation) =
            burns::power_for_rotation(sat, -2.0 * transfer_time, 2, 1, clock.dt)
        else {
            println!(
                "Controller: cannot reach the elliptic transfer orbit ({} -> {:.0} m)",
                sat.body.name, r2
            );
            return;
        };
        // The orbital angular rate already turns the body; only command the
        // difference so the spin is not double-counted.
        let period = OrbitalMechanics::instantaneous_period(sat.get_radius(), sat.get_speed());
        let already_in = burns::power_for_rotation(sat, period, 2, 1, clock.dt)
            .map(|p| p.power)
            .unwrap_or(0.0);
        if let Some(thruster) = sat.thruster_mut(&rotation.thruster) {
            thruster.on(rotation.power - already_in);
        }
        if let Some(thruster) = sat.thruster_mut(&plan.thruster) {
            thruster.on(plan.power);
        }
        self.hohmann = Some(HohmannTransfer {
            phase: HohmannPhase::ReachElliptic,
            target_radius: r2,
            transfer_time,
            stop_at: clock.time + transfer_time,
            plan,
            rotation: Some(rotation),
            iteration: 0,
        });
        println!(
            "Controller: Hohmann transfer started at t={:.0}s, coasting {:.0}s",
            clock.time, transfer_time
        );
    }

    fn advance_hohmann(&mut self, sat: &mut Satellite, clock: &SimClock) {
        let Some(mut transfer) = self.hohmann.take() else {
            return;
        };
        let Some(planet) = sat.planet_ref.clone() else {
            eprintln!("Warning: reference planet lost, dropping Hohmann transfer");
            return;
        };

        if transfer.phase == HohmannPhase::ReachElliptic {
            if let Some(rotation) = &transfer.rotation {
                if transfer.iteration == rotation.iterations {
                    if let Some(thruster) = sat.thruster_mut(&rotation.thruster) {
                        thruster.off();
                    }
                }
            }
            if transfer.iteration == transfer.plan.iterations {
                if let Some(thruster) = sat.thruster_mut(&transfer.plan.thruster) {
                    thruster.off();
                }
                transfer.phase = HohmannPhase::OnElliptic;
                println!(
                    "Controller: elliptic transfer orbit reached at t={:.0}s",
                    clock.time
                );
            } else {
                transfer.iteration += 1;
            }
        }
        if transfer.phase == HohmannPhase::OnElliptic && clock.time >= transfer.stop_at {
            let arrival_speed =
                OrbitalMechanics::circular_speed(planet.mass, transfer.target_radius);
            let delta_v = arrival_speed - sat.get_speed();
            match burns::power_for_speed(sat, delta_v, &na::Vector3::x(), 1, clock.dt) {
                None => {
                    // Infeasible arrival burn: abort and keep flying.
                    println!(
                        "Controller: cannot circularize at {:.0} m, transfer aborted at t={:.0}s",
                        transfer.target_radius, clock.time
                    );
                    return;
                }
                Some(plan) => {
                    if let Some(thruster) = sat.thruster_mut(&plan.thruster) {
                        thruster.on(plan.power);
                    }
                    transfer.plan = plan;
                    transfer.iteration = 0;
                    transfer.phase = HohmannPhase::ReachGeo;
                }
            }
        }
        let mut finished = false;
        if transfer.phase == HohmannPhase::ReachGeo {
            if transfer.iteration == transfer.plan.iterations {
                if let Some(thruster) = sat.thruster_mut(&transfer.plan.thruster) {
                    thruster.off();
                }
                // Snap onto the exact arrival orbit, as for GEO insertion.
                let r_hat = normalize(&(sat.body.position - planet.position));
                let speed =
                    OrbitalMechanics::circular_speed(planet.mass, transfer.target_radius);
                sat.force_state(
                    planet.position + r_hat * transfer.target_radius,
                    na::Vector3::z().cross(&r_hat) * speed,
                );
                println!(
                    "Controller: Hohmann transfer complete at t={:.0}s",
                    clock.time
                );
                finished = true;
                self.pending.push(ManeuverRequest::Synchronize);
            } else {
                transfer.iteration += 1;
            }
        }
        if !finished {
            self.hohmann = Some(transfer);
        }
    }
}

/// First thruster able to push the body forward (+x), in list order.
fn forward_thruster(sat: &Satellite) -> Option<String> {
    sat.thrusters()
        .iter()
        .find(|t| t.direction()[0] > 0.0)
        .map(|t| t.name.clone())
}

/// First thruster producing positive torque about the body z axis.
fn positive_spin_thruster(sat: &Satellite) -> Option<String> {
    sat.thrusters()
        .iter()
        .find(|t| t.max_torque[2] > 0.0)
        .map(|t| t.name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Body, Planet};

    fn orbiting_sat() -> (Satellite, Planet) {
        let earth = Planet::new("Earth", 6.371e6, 5.972e24);
        let r = 9.0e6;
        let v = OrbitalMechanics::circular_speed(earth.mass(), r);
        let mut sat = Satellite::new("sat", 1000.0, na::Vector3::new(3.0, 1.0, 1.0))
            .at(na::Vector3::new(r, 0.0, 0.0))
            .moving(na::Vector3::new(0.0, v, 0.0));
        sat.add_default_thrusters();
        sat.set_planet_ref(&earth);
        (sat, earth)
    }

    #[test]
    fn geo_arming_selects_main_and_left() {
        let (mut sat, _) = orbiting_sat();
        let clock = SimClock::new(20.0);
        let mut controller = Controller::default();
        // Target well above the current radius so the first update stays in approach
        controller.request(ManeuverRequest::Geo { radius: 2.0e7 });
        controller.update(&mut sat, &clock);

        let geo = controller.reach_geo.as_ref().expect("maneuver armed");
        assert_eq!(geo.main, "main");
        assert_eq!(geo.lateral, "left");
        assert_eq!(geo.phase, GeoPhase::Approach);
        assert!(geo.rot_pulse > 0.0);
        assert_eq!(
            geo.target_speed,
            OrbitalMechanics::circular_speed(5.972e24, 2.0e7)
        );
    }

    #[test]
    fn geo_without_reference_planet_is_refused() {
        let mut sat = Satellite::new("lost", 1000.0, na::Vector3::new(3.0, 1.0, 1.0));
        sat.add_default_thrusters();
        let clock = SimClock::new(20.0);
        let mut controller = Controller::default();
        controller.request(ManeuverRequest::Geo { radius: 9.0e6 });
        controller.update(&mut sat, &clock);
        assert!(controller.reach_geo.is_none());
        assert!(controller.is_idle());
    }

    #[test]
    fn takeoff_fires_the_main_thruster() {
        let (mut sat, _) = orbiting_sat();
        sat.landed = true;
        let clock = SimClock::new(20.0);
        let mut controller = Controller::default();
        controller.request(ManeuverRequest::Takeoff);
        controller.update(&mut sat, &clock);
        assert!(sat.taking_off);
        assert_eq!(sat.thruster("main").unwrap().power, 0.90);
    }

    #[test]
    fn surface_flags_release_above_the_threshold() {
        let (mut sat, _) = orbiting_sat();
        // 9e6 > 1.01 · 6.371e6, so one update clears the flags
        sat.landed = true;
        sat.taking_off = true;
        let clock = SimClock::new(20.0);
        let mut controller = Controller::default();
        controller.update(&mut sat, &clock);
        assert!(!sat.landed);
        assert!(!sat.taking_off);
    }

    #[test]
    fn synchronize_starts_in_stop_phase_with_the_spin_cancel_burn() {
        let (mut sat, _) = orbiting_sat();
        sat.ang_vel[2] = -0.005;
        let clock = SimClock::new(20.0);
        let mut controller = Controller::default();
        controller.request(ManeuverRequest::Synchronize);
        controller.update(&mut sat, &clock);

        let sync = controller.reach_sync.as_ref().expect("maneuver armed");
        match &sync.phase {
            SyncPhase::Stop { plan, .. } => {
                assert_eq!(plan.thruster, "left");
                assert!(sat.thruster("left").unwrap().power > 0.0);
            }
            other => panic!("expected stop phase, got {:?}", other),
        }
    }

    #[test]
    fn hohmann_arming_fires_departure_and_alignment_burns() {
        let (mut sat, _) = orbiting_sat();
        let clock = SimClock::new(20.0);
        let mut controller = Controller::default();
        controller.request(ManeuverRequest::Hohmann { radius: 1.2e7 });
        controller.update(&mut sat, &clock);

        let transfer = controller.hohmann.as_ref().expect("maneuver armed");
        assert_eq!(transfer.phase, HohmannPhase::ReachElliptic);
        assert_eq!(transfer.plan.thruster, "main");
        assert!(transfer.transfer_time > 5000.0 && transfer.transfer_time < 6000.0);
        assert!(sat.thruster("main").unwrap().power > 0.0);
    }

    #[test]
    fn infeasible_hohmann_is_reported_and_cleared() {
        let earth = Planet::new("Earth", 6.371e6, 5.972e24);
        let r = 9.0e6;
        let v = OrbitalMechanics::circular_speed(earth.mass(), r);
        // No thrusters at all: the departure burn cannot be sized
        let mut sat = Satellite::new("bare", 1000.0, na::Vector3::new(3.0, 1.0, 1.0))
            .at(na::Vector3::new(r, 0.0, 0.0))
            .moving(na::Vector3::new(0.0, v, 0.0));
        sat.set_planet_ref(&earth);

        let clock = SimClock::new(20.0);
        let mut controller = Controller::default();
        controller.request(ManeuverRequest::Hohmann { radius: 1.2e7 });
        controller.update(&mut sat, &clock);
        assert!(controller.hohmann.is_none());
        assert!(controller.is_idle());
    }

    #[test]
    fn priority_advances_geo_before_sync_and_hohmann() {
        let (mut sat, _) = orbiting_sat();
        let clock = SimClock::new(20.0);
        let mut controller = Controller::default();
        controller.request(ManeuverRequest::Geo { radius: 9.5e6 });
        controller.request(ManeuverRequest::Synchronize);
        controller.update(&mut sat, &clock);
        assert!(controller.reach_geo.is_some());
        assert!(controller.reach_sync.is_some());

        // Sync must stay frozen in its stop phase while GEO is active
        let before = match &controller.reach_sync.as_ref().unwrap().phase {
            SyncPhase::Stop { iteration, .. } => *iteration,
            other => panic!("unexpected phase {:?}", other),
        };
        controller.update(&mut sat, &clock);
        let after = match &controller.reach_sync.as_ref().unwrap().phase {
            SyncPhase::Stop { iteration, .. } => *iteration,
            other => panic!("unexpected phase {:?}", other),
        };
        assert_eq!(before, after);
    }
}
