use super::body::{Body, BodyState};
use nalgebra as na;

/// A massive body with a collision surface. Planets are static for the
/// lifetime of a scenario; satellites hold a read-only [`PlanetRef`] copy.
#[derive(Debug, Clone)]
pub struct Planet {
    pub state: BodyState,
    pub radius: f64,
}

impl Planet {
    pub fn new(name: &str, radius: f64, mass: f64) -> Self {
        Planet {
            state: BodyState::new(name, mass),
            radius,
        }
    }

    pub fn at(mut self, position: na::Vector3<f64>) -> Self {
        self.state.position = position;
        self
    }

    pub fn reference(&self) -> PlanetRef {
        PlanetRef {
            name: self.state.name.clone(),
            id: self.state.id,
            mass: self.state.mass,
            radius: self.radius,
            position: self.state.position,
        }
    }
}

impl Body for Planet {
    fn state(&self) -> &BodyState {
        &self.state
    }
}

/// Read-only handle to a reference planet, copied into a satellite at link
/// time. Valid because planets never move during a scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanetRef {
    pub name: String,
    pub id: u32,
    pub mass: f64,
    pub radius: f64,
    pub position: na::Vector3<f64>,
}
