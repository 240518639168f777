use crate::core::conditions::SessionConditions;
use crate::core::driver::{simulate_lap, DriverRaceState};
use crate::core::random::RandomSource;
use crate::core::tireset::TyreCompound;
use crate::post::race_result::Classification;
use crate::pre::read_sim_pars::SimPars;
use crate::store::records::{Driver, Race};
use serde::Deserialize;
use std::convert::TryFrom;
use std::fmt;
use std::time::Duration;

/// * `default_tot_no_laps` - Total number of laps if no race is available
/// * `grid_start` - Start position of the first driver of the lineup
/// * `position_change_prob` - Probability of a position change per lap
/// * `failure_prob` - Probability of a mechanical failure per lap
/// * `rain_penalty` - Reduction of the overtaking chance in the rain
/// * `fuel_rate` - (%/lap) Maximum random fuel consumption per lap
/// * `pit_position_loss` - Positions lost during a pit stop
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RacePars {
    pub default_tot_no_laps: u32,
    pub grid_start: u32,
    pub position_change_prob: f64,
    pub failure_prob: f64,
    pub rain_penalty: f64,
    pub fuel_rate: f64,
    pub pit_position_loss: u32,
}

impl Default for RacePars {
    fn default() -> Self {
        RacePars {
            default_tot_no_laps: 58,
            grid_start: 8,
            position_change_prob: 0.3,
            failure_prob: 0.001,
            rain_penalty: 0.1,
            fuel_rate: 1.5,
            pit_position_loss: 3,
        }
    }
}

/// `Qualifying` is known to the session but never entered by the race simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Preparation,
    Qualifying,
    Race,
    Finished,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SessionStatus::Preparation => write!(f, "preparation"),
            SessionStatus::Qualifying => write!(f, "qualifying"),
            SessionStatus::Race => write!(f, "race"),
            SessionStatus::Finished => write!(f, "finished"),
        }
    }
}

/// RaceSpeed determines how often the race is ticked in real time. It does not influence the
/// simulation itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceSpeed {
    X1,
    X2,
    X4,
}

impl RaceSpeed {
    pub fn multiplier(&self) -> u32 {
        match self {
            RaceSpeed::X1 => 1,
            RaceSpeed::X2 => 2,
            RaceSpeed::X4 => 4,
        }
    }

    /// tick_interval returns the real time between two ticks for the given interval at 1x speed.
    pub fn tick_interval(&self, t_tick_base: Duration) -> Duration {
        t_tick_base / self.multiplier()
    }
}

impl TryFrom<u32> for RaceSpeed {
    type Error = CommandError;

    fn try_from(multiplier: u32) -> Result<Self, Self::Error> {
        match multiplier {
            1 => Ok(RaceSpeed::X1),
            2 => Ok(RaceSpeed::X2),
            4 => Ok(RaceSpeed::X4),
            _ => Err(CommandError::InvalidSpeed(multiplier)),
        }
    }
}

/// CommandError is returned if a command cannot be executed in the current session state. A
/// rejected command never changes the session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Command {command} is not allowed in session status {status}")]
    InvalidStatus {
        command: &'static str,
        status: SessionStatus,
    },
    #[error("Unknown driver {0}")]
    UnknownDriver(String),
    #[error("Driver {0} is out of the race")]
    DriverRetired(String),
    #[error("Driver {0} is already in the pits")]
    DriverInPits(String),
    #[error("Unknown strategy {0}")]
    UnknownStrategy(String),
    #[error("Race speed must be 1, 2, or 4, but is {0}")]
    InvalidSpeed(u32),
}

/// * `id` - Strategy id used by the command interface
/// * `name` - Display name
/// * `description` - Short description
/// * `compound` - Tyre compound that is fitted
/// * `estimated_stops` - Planned number of pit stops
#[derive(Debug, Clone, PartialEq)]
pub struct Strategy {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub compound: TyreCompound,
    pub estimated_stops: u32,
}

pub const STRATEGY_OPTIONS: [Strategy; 3] = [
    Strategy {
        id: "aggressive",
        name: "Aggressive",
        description: "Soft tyres, early stops",
        compound: TyreCompound::Soft,
        estimated_stops: 2,
    },
    Strategy {
        id: "balanced",
        name: "Balanced",
        description: "Medium tyres, standard stops",
        compound: TyreCompound::Medium,
        estimated_stops: 1,
    },
    Strategy {
        id: "conservative",
        name: "Conservative",
        description: "Hard tyres, minimal stops",
        compound: TyreCompound::Hard,
        estimated_stops: 1,
    },
];

pub fn get_strategy(strategy_id: &str) -> Option<&'static Strategy> {
    STRATEGY_OPTIONS.iter().find(|s| s.id == strategy_id)
}

/// TickOutcome tells the caller what a tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The session is paused or not in race status.
    Idle,
    /// A lap was simulated, the race continues.
    Lap(u32),
    /// The final lap was simulated (or the laps were already exhausted), the race must be
    /// finalized.
    LapsExhausted,
}

/// RaceSession contains the live state of a race weekend session. It is owned by the simulator
/// and only changed through its methods.
#[derive(Debug, Clone)]
pub struct RaceSession {
    pub race_id: Option<String>,
    pub race_name: Option<String>,
    pub cur_lap: u32,
    pub tot_no_laps: u32,
    pub status: SessionStatus,
    pub conditions: SessionConditions,
    pub is_running: bool,
    pub speed: RaceSpeed,
    pub drivers: Vec<DriverRaceState>,
    pub events: Vec<String>,
    classification: Option<Classification>,
}

impl RaceSession {
    /// new creates a session in preparation status. Without a race, the default number of laps
    /// and default conditions are used.
    pub fn new(
        race: Option<&Race>,
        drivers: &[Driver],
        sim_pars: &SimPars,
        rng: &mut dyn RandomSource,
    ) -> RaceSession {
        let (tot_no_laps, conditions) = match race {
            Some(race) => (
                race.laps.max(1),
                SessionConditions {
                    weather: race.weather,
                    track_condition: race.track_condition,
                    temperature: race.temperature,
                },
            ),
            None => (
                sim_pars.race_pars.default_tot_no_laps,
                SessionConditions::default(),
            ),
        };

        RaceSession {
            race_id: race.map(|r| r.id.to_owned()),
            race_name: race.map(|r| r.name.to_owned()),
            cur_lap: 0,
            tot_no_laps,
            status: SessionStatus::Preparation,
            conditions,
            is_running: false,
            speed: RaceSpeed::X1,
            drivers: drivers
                .iter()
                .enumerate()
                .map(|(i, driver)| DriverRaceState::new(driver, i, sim_pars, rng))
                .collect(),
            events: vec![],
            classification: None,
        }
    }

    // ---------------------------------------------------------------------------------------------
    // COMMANDS ------------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    pub fn start(&mut self) -> Result<(), CommandError> {
        self.check_status("start", SessionStatus::Preparation)?;

        self.status = SessionStatus::Race;
        self.is_running = true;
        self.cur_lap = 0;
        self.events = vec![String::from("Race started! Lights out and away we go!")];
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), CommandError> {
        self.check_status("pause", SessionStatus::Race)?;
        self.is_running = false;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), CommandError> {
        self.check_status("resume", SessionStatus::Race)?;
        self.is_running = true;
        Ok(())
    }

    pub fn set_speed(&mut self, speed: RaceSpeed) {
        self.speed = speed
    }

    /// pit_stop fits fresh medium tyres. The driver loses positions and stays in the pits until
    /// release_from_pits is called.
    pub fn pit_stop(&mut self, driver_id: &str, pit_position_loss: u32) -> Result<(), CommandError> {
        self.check_status("pit stop", SessionStatus::Race)?;
        let driver = self.get_active_driver_mut(driver_id)?;

        if driver.is_in_pits {
            return Err(CommandError::DriverInPits(driver.name.to_owned()));
        }

        driver.is_in_pits = true;
        driver.pit_stop_count += 1;
        driver.tireset.change_tyres(TyreCompound::Medium);
        driver.shift_position(pit_position_loss as i64);

        let event = format!("{} pits for fresh tyres!", driver.name);
        self.events.push(event);
        Ok(())
    }

    /// release_from_pits ends the pit stop of a driver. It returns false if the driver was not in
    /// the pits (e.g. because the session was reset in the meantime).
    pub fn release_from_pits(&mut self, driver_id: &str) -> bool {
        match self.drivers.iter_mut().find(|d| d.driver_id == driver_id) {
            Some(driver) if driver.is_in_pits => {
                driver.is_in_pits = false;
                true
            }
            _ => false,
        }
    }

    /// apply_strategy switches the tyre compound of a driver to that of the given strategy preset.
    /// Retired drivers keep their compound.
    pub fn apply_strategy(
        &mut self,
        driver_id: &str,
        strategy_id: &str,
    ) -> Result<&'static Strategy, CommandError> {
        let strategy = get_strategy(strategy_id)
            .ok_or_else(|| CommandError::UnknownStrategy(strategy_id.to_owned()))?;
        let driver = self.get_active_driver_mut(driver_id)?;

        driver.tireset.compound = strategy.compound;

        let event = format!("{} switches to {} strategy!", driver.name, strategy.name);
        self.events.push(event);
        Ok(strategy)
    }

    // ---------------------------------------------------------------------------------------------
    // MAIN METHODS --------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// advance_lap simulates one lap if the session is running. Execution order:
    /// 1. If all laps were already driven, the race is due for finalization and nothing else
    /// happens. Otherwise, the lap counter is incremented.
    /// 2. Every driver that is still in the race is advanced by one lap.
    /// 3. If the incremented lap counter reached the total number of laps, the race is due for
    /// finalization.
    pub fn advance_lap(&mut self, sim_pars: &SimPars, rng: &mut dyn RandomSource) -> TickOutcome {
        if !self.is_ticking() {
            return TickOutcome::Idle;
        }

        if self.cur_lap >= self.tot_no_laps {
            return TickOutcome::LapsExhausted;
        }
        self.cur_lap += 1;

        for i in 0..self.drivers.len() {
            if self.drivers[i].did_not_finish {
                continue;
            }

            let outcome = simulate_lap(&self.drivers[i], &self.conditions, sim_pars, rng);
            self.drivers[i] = outcome.state;

            if let Some(event) = outcome.event {
                self.events.push(event)
            }
        }

        if self.cur_lap >= self.tot_no_laps {
            TickOutcome::LapsExhausted
        } else {
            TickOutcome::Lap(self.cur_lap)
        }
    }

    /// finish classifies the drivers, awards their points, and ends the session. It returns None
    /// if the session is not in race status, i.e. before the start or if it was already finished,
    /// such that points are never awarded twice.
    pub fn finish(&mut self) -> Option<Classification> {
        if self.status != SessionStatus::Race || self.classification.is_some() {
            return None;
        }

        let classification = Classification::classify(&self.drivers, self.tot_no_laps);

        for entry in classification.entries.iter() {
            if let Some(driver) = self
                .drivers
                .iter_mut()
                .find(|d| d.driver_id == entry.driver_id)
            {
                driver.points_awarded = entry.points
            }
        }

        self.status = SessionStatus::Finished;
        self.is_running = false;
        self.events.push(format!(
            "Race finished! Team scored {} points.",
            classification.total_points
        ));
        self.classification = Some(classification.to_owned());

        Some(classification)
    }

    // ---------------------------------------------------------------------------------------------
    // METHODS (HELPERS) ---------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// is_ticking is true while the timer should advance the race.
    pub fn is_ticking(&self) -> bool {
        self.is_running && self.status == SessionStatus::Race
    }

    pub fn get_classification(&self) -> Option<&Classification> {
        self.classification.as_ref()
    }

    pub fn get_driver(&self, driver_id: &str) -> Option<&DriverRaceState> {
        self.drivers.iter().find(|d| d.driver_id == driver_id)
    }

    fn check_status(
        &self,
        command: &'static str,
        required: SessionStatus,
    ) -> Result<(), CommandError> {
        if self.status != required {
            return Err(CommandError::InvalidStatus {
                command,
                status: self.status,
            });
        }
        Ok(())
    }

    fn get_active_driver_mut(
        &mut self,
        driver_id: &str,
    ) -> Result<&mut DriverRaceState, CommandError> {
        let driver = self
            .drivers
            .iter_mut()
            .find(|d| d.driver_id == driver_id)
            .ok_or_else(|| CommandError::UnknownDriver(driver_id.to_owned()))?;

        if driver.did_not_finish {
            return Err(CommandError::DriverRetired(driver.name.to_owned()));
        }
        Ok(driver)
    }
}
