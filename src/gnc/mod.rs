pub mod burns;
pub mod controller;
pub mod maneuver;

pub use burns::BurnPlan;
pub use controller::Controller;
pub use maneuver::ManeuverRequest;
