use crate::constants::G;
use crate::models::{Body, Planet};
use nalgebra as na;

/// Pairwise Newtonian gravitational acceleration at `position`, summed over
/// every massive body except the one identified by `own_id`.
pub fn gravitational_acceleration(
    position: &na::Vector3<f64>,
    own_id: u32,
    bodies: &[Planet],
) -> na::Vector3<f64> {
    let mut acceleration = na::Vector3::zeros();
    for body in bodies {
        if body.id() == own_id {
            continue;
        }
        let d = position - body.position();
        let u = -d / d.norm();
        acceleration += u * (G * body.mass() / d.norm_squared());
    }
    acceleration
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use test_case::test_case;

    fn earth() -> Planet {
        Planet::new("Earth", 6.371e6, 5.972e24)
    }

    #[test_case(
        na::Vector3::new(6.371e6, 0.0, 0.0),
        na::Vector3::new(-9.81, 0.0, 0.0);
        "gravity at Earth's surface"
    )]
    #[test_case(
        na::Vector3::new(6.471e6, 0.0, 0.0),
        na::Vector3::new(-9.515, 0.0, 0.0);
        "gravity at 100 km altitude"
    )]
    #[test_case(
        na::Vector3::new(6.871e6, 0.0, 0.0),
        na::Vector3::new(-8.44, 0.0, 0.0);
        "gravity at 500 km altitude"
    )]
    fn acceleration_toward_the_planet(position: na::Vector3<f64>, expected: na::Vector3<f64>) {
        let planets = [earth()];
        let result = gravitational_acceleration(&position, u32::MAX, &planets);
        assert_abs_diff_eq!(result, expected, epsilon = 1e-2);
    }

    #[test]
    fn a_body_does_not_attract_itself() {
        let planet = earth();
        let planets = [planet.clone()];
        let result =
            gravitational_acceleration(&planet.position(), planet.id(), &planets);
        assert_eq!(result, na::Vector3::zeros());
    }

    #[test]
    fn two_planets_accumulate() {
        let a = earth();
        let b = earth().at(na::Vector3::new(2.0e7, 0.0, 0.0));
        let mid = na::Vector3::new(1.0e7, 0.0, 0.0);
        let result = gravitational_acceleration(&mid, u32::MAX, &[a, b]);
        // Symmetric pulls cancel at the midpoint
        assert_abs_diff_eq!(result, na::Vector3::zeros(), epsilon = 1e-9);
    }
}
