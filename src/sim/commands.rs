use std::error::Error;
use std::fmt;

use crate::gnc::maneuver::ManeuverRequest;

/// A command addressed to one satellite. The string key space used by
/// scenario front-ends (`thruster-<name>`, `ctr-run-<maneuver>`, bare
/// attribute names) parses into this closed set; anything else is rejected
/// up front instead of failing silently at dispatch time.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Set a named thruster to a power fraction.
    Thruster { name: String, power: f64 },
    /// Hand a maneuver request to the autonomous controller.
    Run(ManeuverRequest),
    SetLanded(bool),
    SetTakingOff(bool),
}

impl Command {
    /// Parse an external string key and numeric value. Maneuver keys take
    /// the target radius as their value where one is needed.
    pub fn parse(key: &str, value: f64) -> Result<Command, CommandError> {
        if let Some(name) = key.strip_prefix("thruster-") {
            return Ok(Command::Thruster {
                name: name.to_string(),
                power: value,
            });
        }
        if let Some(maneuver) = key.strip_prefix("ctr-run-") {
            let request = match maneuver {
                "geo" => ManeuverRequest::Geo { radius: value },
                "hohmann" => ManeuverRequest::Hohmann { radius: value },
                "synchronize" => ManeuverRequest::Synchronize,
                "takeoff" => ManeuverRequest::Takeoff,
                _ => return Err(CommandError::UnknownKey(key.to_string())),
            };
            return Ok(Command::Run(request));
        }
        match key {
            "landed" => Ok(Command::SetLanded(value != 0.0)),
            "taking_off" => Ok(Command::SetTakingOff(value != 0.0)),
            _ => Err(CommandError::UnknownKey(key.to_string())),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Thruster { name, power } => write!(f, "thruster {} to {:.3}", name, power),
            Command::Run(request) => write!(f, "run {:?}", request),
            Command::SetLanded(v) => write!(f, "landed = {}", v),
            Command::SetTakingOff(v) => write!(f, "taking_off = {}", v),
        }
    }
}

/// A command with its trigger time (simulated seconds).
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledCommand {
    pub at: f64,
    pub command: Command,
}

/// Ordered scripted-command table. Entries are consumed exactly once, in
/// temporal order, as their trigger times pass.
#[derive(Debug, Clone, Default)]
pub struct CommandSchedule {
    entries: Vec<ScheduledCommand>,
}

impl CommandSchedule {
    /// Insert keeping the list sorted by trigger time; equal times keep
    /// insertion order.
    pub fn push(&mut self, entry: ScheduledCommand) {
        let index = self
            .entries
            .partition_point(|existing| existing.at <= entry.at);
        self.entries.insert(index, entry);
    }

    /// Remove and return every entry whose trigger time has passed.
    pub fn drain_due(&mut self, now: f64) -> Vec<ScheduledCommand> {
        let split = self.entries.partition_point(|entry| entry.at <= now);
        self.entries.drain(..split).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Simulator-level scripted commands.
#[derive(Debug, Clone, PartialEq)]
pub enum SimCommand {
    /// Change the fixed integration step between ticks.
    SetTimeStep(f64),
}

#[derive(Debug)]
pub enum CommandError {
    UnknownKey(String),
    UnknownThruster(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::UnknownKey(key) => write!(f, "unknown command key '{}'", key),
            CommandError::UnknownThruster(name) => write!(f, "no thruster named '{}'", name),
        }
    }
}

impl Error for CommandError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_thruster_key() {
        let cmd = Command::parse("thruster-main", 0.7).unwrap();
        assert_eq!(
            cmd,
            Command::Thruster {
                name: "main".to_string(),
                power: 0.7
            }
        );
    }

    #[test]
    fn parse_maneuver_keys() {
        assert_eq!(
            Command::parse("ctr-run-geo", 9.0e6).unwrap(),
            Command::Run(ManeuverRequest::Geo { radius: 9.0e6 })
        );
        assert_eq!(
            Command::parse("ctr-run-takeoff", 0.0).unwrap(),
            Command::Run(ManeuverRequest::Takeoff)
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Command::parse("ctr-reach_geo", 1.0).is_err());
        assert!(Command::parse("warp-drive", 1.0).is_err());
    }

    #[test]
    fn schedule_drains_in_temporal_order_exactly_once() {
        let mut schedule = CommandSchedule::default();
        schedule.push(ScheduledCommand {
            at: 30.0,
            command: Command::SetLanded(false),
        });
        schedule.push(ScheduledCommand {
            at: 10.0,
            command: Command::SetTakingOff(true),
        });
        schedule.push(ScheduledCommand {
            at: 20.0,
            command: Command::SetTakingOff(false),
        });

        let due = schedule.drain_due(25.0);
        let times: Vec<f64> = due.iter().map(|e| e.at).collect();
        assert_eq!(times, vec![10.0, 20.0]);

        // Already-consumed entries never come back
        assert!(schedule.drain_due(25.0).is_empty());
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule.drain_due(30.0).len(), 1);
        assert!(schedule.is_empty());
    }

    #[test]
    fn equal_trigger_times_keep_insertion_order() {
        let mut schedule = CommandSchedule::default();
        schedule.push(ScheduledCommand {
            at: 5.0,
            command: Command::SetLanded(true),
        });
        schedule.push(ScheduledCommand {
            at: 5.0,
            command: Command::SetLanded(false),
        });
        let due = schedule.drain_due(5.0);
        assert_eq!(due[0].command, Command::SetLanded(true));
        assert_eq!(due[1].command, Command::SetLanded(false));
    }
}
