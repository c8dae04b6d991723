use nalgebra as na;
use rand::Rng;

/// Kinematic state shared by every simulated body.
///
/// Identity is a random tag drawn at construction; two bodies compare equal
/// when their tags match.
#[derive(Debug, Clone)]
pub struct BodyState {
    pub name: String,
    pub id: u32,
    pub mass: f64,
    pub position: na::Vector3<f64>,
    pub velocity: na::Vector3<f64>,
    pub acceleration: na::Vector3<f64>,
    pub alive: bool,
}

impl BodyState {
    pub fn new(name: &str, mass: f64) -> Self {
        BodyState {
            name: name.to_string(),
            id: rand::thread_rng().gen_range(0..100_000),
            mass,
            position: na::Vector3::zeros(),
            velocity: na::Vector3::zeros(),
            acceleration: na::Vector3::zeros(),
            alive: true,
        }
    }

    pub fn at(mut self, position: na::Vector3<f64>) -> Self {
        self.position = position;
        self
    }

    pub fn moving(mut self, velocity: na::Vector3<f64>) -> Self {
        self.velocity = velocity;
        self
    }
}

impl PartialEq for BodyState {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Seam shared by planets and satellites: the stepper and the gravity
/// accumulator only need mass, position and identity.
pub trait Body {
    fn state(&self) -> &BodyState;

    fn name(&self) -> &str {
        &self.state().name
    }

    fn id(&self) -> u32 {
        self.state().id
    }

    fn mass(&self) -> f64 {
        self.state().mass
    }

    fn position(&self) -> na::Vector3<f64> {
        self.state().position
    }

    fn is_alive(&self) -> bool {
        self.state().alive
    }
}
