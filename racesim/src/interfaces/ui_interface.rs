use crate::core::conditions::SessionConditions;
use crate::core::driver::DriverRaceState;
use crate::core::race::{RaceSession, RaceSpeed, SessionStatus};
use crate::core::scheduler::Command;
use anyhow::{anyhow, Context};
use std::convert::TryFrom;

/// RaceState is the snapshot of a race session that is sent to the front end after every tick or
/// command.
#[derive(Debug, Clone)]
pub struct RaceState {
    pub race_name: Option<String>,
    pub cur_lap: u32,
    pub tot_no_laps: u32,
    pub status: SessionStatus,
    pub is_running: bool,
    pub speed: RaceSpeed,
    pub conditions: SessionConditions,
    pub drivers: Vec<DriverRaceState>,
    pub events: Vec<String>,
}

impl RaceState {
    /// get_race_prog returns the race progress in [0.0, 1.0].
    pub fn get_race_prog(&self) -> f64 {
        self.cur_lap as f64 / self.tot_no_laps.max(1) as f64
    }
}

impl From<&RaceSession> for RaceState {
    fn from(session: &RaceSession) -> Self {
        RaceState {
            race_name: session.race_name.to_owned(),
            cur_lap: session.cur_lap,
            tot_no_laps: session.tot_no_laps,
            status: session.status,
            is_running: session.is_running,
            speed: session.speed,
            conditions: session.conditions.to_owned(),
            drivers: session.drivers.to_owned(),
            events: session.events.to_owned(),
        }
    }
}

/// parse_command converts a line of the text front end into a scheduler command, e.g.
/// `speed 2`, `pit driver_1`, or `strategy driver_1 aggressive`.
pub fn parse_command(line: &str) -> anyhow::Result<Command> {
    let mut words = line.split_whitespace();
    let keyword = words.next().ok_or_else(|| anyhow!("Empty command!"))?;
    let args: Vec<&str> = words.collect();

    let command = match (keyword.to_lowercase().as_str(), args.as_slice()) {
        ("start", []) => Command::Start,
        ("pause", []) => Command::Pause,
        ("resume", []) => Command::Resume,
        ("reset", []) => Command::Reset,
        ("quit", []) | ("exit", []) => Command::Shutdown,
        ("speed", [multiplier]) => {
            let multiplier: u32 = multiplier
                .parse()
                .context(format!("Speed {} is not a number!", multiplier))?;
            Command::SetSpeed(RaceSpeed::try_from(multiplier)?)
        }
        ("pit", [driver_id]) => Command::PitStop(driver_id.to_string()),
        ("strategy", [driver_id, strategy_id]) => Command::ApplyStrategy {
            driver_id: driver_id.to_string(),
            strategy_id: strategy_id.to_lowercase(),
        },
        _ => {
            return Err(anyhow!(
                "Unknown command {}, use start, pause, resume, reset, speed N, pit DRIVER, \
                strategy DRIVER STRATEGY, or quit!",
                line.trim()
            ))
        }
    };

    Ok(command)
}
