pub mod body;
pub mod planet;
pub mod satellite;
pub mod thruster;

pub use body::{Body, BodyState};
pub use planet::{Planet, PlanetRef};
pub use satellite::Satellite;
pub use thruster::{Thruster, ThrusterAxis};
