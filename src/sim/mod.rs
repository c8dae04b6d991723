pub mod clock;
pub mod commands;
pub mod simulator;

pub use clock::SimClock;
pub use commands::{Command, CommandError, CommandSchedule, ScheduledCommand, SimCommand};
pub use simulator::{Simulator, Snapshot, ThrusterPower};
