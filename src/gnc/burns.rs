use nalgebra as na;

use crate::constants::PI;
use crate::models::Satellite;
use crate::numerics::rotation::sign;

/// A sized burn: the power fraction to command, the number of ticks to hold
/// it, and the thruster to fire.
#[derive(Debug, Clone, PartialEq)]
pub struct BurnPlan {
    pub power: f64,
    pub iterations: u32,
    pub thruster: String,
}

/// Size a translational burn producing `delta_speed` along `direction`
/// (body frame).
///
/// Iteration counts are searched greedily from `start` up to a 20·start
/// ceiling; for each count every thruster with authority along the
/// direction is tried in list order, and the first combination whose power
/// fraction lands in [0, 1] wins. The greedy smallest-n, first-thruster
/// tie-break is part of the contract.
pub fn power_for_speed(
    sat: &Satellite,
    delta_speed: f64,
    direction: &na::Vector3<f64>,
    start: u32,
    dt: f64,
) -> Option<BurnPlan> {
    for n in start..20 * start {
        for thruster in sat.thrusters() {
            let available = thruster.max_thrust * thruster.direction().dot(direction);
            if available != 0.0 {
                let power = sat.body.mass * delta_speed / (n as f64 * dt * available);
                if (0.0..=1.0).contains(&power) {
                    return Some(BurnPlan {
                        power,
                        iterations: n,
                        thruster: thruster.name.clone(),
                    });
                }
            }
        }
    }
    None
}

/// Size a rotational burn spinning the satellite to one revolution per
/// `period` seconds about the given axis. A negative period selects the
/// opposite spin direction. Same greedy search as [`power_for_speed`], with
/// a 10·start ceiling.
pub fn power_for_rotation(
    sat: &Satellite,
    period: f64,
    axis: usize,
    start: u32,
    dt: f64,
) -> Option<BurnPlan> {
    for n in start..10 * start {
        for thruster in sat.thrusters() {
            let torque = thruster.max_torque[axis];
            if torque != 0.0 {
                let power = 2.0 * PI * sat.inertia[axis] / (n as f64 * dt * period * torque);
                if (0.0..=1.0).contains(&power) {
                    return Some(BurnPlan {
                        power,
                        iterations: n,
                        thruster: thruster.name.clone(),
                    });
                }
            }
        }
    }
    None
}

/// Size the burn that cancels the current angular velocity about the given
/// axis. The required single-tick torque is spread over however many whole
/// ticks the first sign-matched thruster needs.
pub fn power_to_cancel_rotation(sat: &Satellite, axis: usize, dt: f64) -> Option<BurnPlan> {
    let required = -sat.ang_vel[axis] * sat.inertia[axis] / dt;
    if required == 0.0 {
        // Nothing to cancel; a trivial plan keeps the caller's phase logic uniform.
        return sat.thrusters().first().map(|t| BurnPlan {
            power: 0.0,
            iterations: 1,
            thruster: t.name.clone(),
        });
    }
    for thruster in sat.thrusters() {
        let torque = thruster.max_torque[axis];
        if torque != 0.0 && sign(required) == sign(torque) {
            let fraction = required / torque;
            let iterations = fraction.ceil() as u32;
            return Some(BurnPlan {
                power: fraction / iterations as f64,
                iterations,
                thruster: thruster.name.clone(),
            });
        }
    }
    None
}
