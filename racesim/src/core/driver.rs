use crate::core::conditions::SessionConditions;
use crate::core::laptime::{calc_laptime, LapTime};
use crate::core::random::RandomSource;
use crate::core::tireset::{Tireset, TyreCompound};
use crate::pre::read_sim_pars::SimPars;
use crate::store::records::Driver;

pub const MIN_POSITION: u32 = 1;
pub const MAX_POSITION: u32 = 20;
pub const FULL_TANK: f64 = 100.0;

/// DriverRaceState contains the live race state of one of the team's drivers.
///
/// * `position` - Current race position in [1, 20] (not exclusive between drivers)
/// * `lap_time` - Time of the most recent lap
/// * `best_lap_time` - Fastest lap of the session
/// * `tireset` - Fitted tyre compound and its wear in [0, 100]%
/// * `fuel` - (%) Remaining fuel in [0, 100]
/// * `skill` - Driver skill in [0, 100]
/// * `did_not_finish` - Once set, the state is frozen for the rest of the session
/// * `points_awarded` - Championship points, set when the race is finalized
#[derive(Debug, Clone, PartialEq)]
pub struct DriverRaceState {
    pub driver_id: String,
    pub name: String,
    pub position: u32,
    pub lap_time: LapTime,
    pub best_lap_time: LapTime,
    pub tireset: Tireset,
    pub fuel: f64,
    pub is_in_pits: bool,
    pub pit_stop_count: u32,
    pub skill: u32,
    pub did_not_finish: bool,
    pub points_awarded: u32,
}

impl DriverRaceState {
    /// new creates the race state of a driver at the session start. Drivers start in the
    /// midfield, offset by their lineup index.
    pub fn new(
        driver: &Driver,
        lineup_idx: usize,
        sim_pars: &SimPars,
        rng: &mut dyn RandomSource,
    ) -> DriverRaceState {
        let skill = driver.skill.min(100);
        let lap_time = calc_laptime(skill, &sim_pars.laptime_pars, rng.uniform());
        let best_lap_time = calc_laptime(skill, &sim_pars.laptime_pars, rng.uniform());

        DriverRaceState {
            driver_id: driver.id.to_owned(),
            name: driver.name.to_owned(),
            position: clamp_position(sim_pars.race_pars.grid_start as i64 + lineup_idx as i64),
            lap_time,
            best_lap_time,
            tireset: Tireset::new(TyreCompound::Medium),
            fuel: FULL_TANK,
            is_in_pits: false,
            pit_stop_count: 0,
            skill,
            did_not_finish: false,
            points_awarded: 0,
        }
    }

    /// shift_position moves the driver by delta positions (negative is better) within [1, 20].
    pub fn shift_position(&mut self, delta: i64) {
        self.position = clamp_position(self.position as i64 + delta);
    }

    /// record_lap sets the current lap time and updates the best lap if applicable.
    pub fn record_lap(&mut self, lap_time: LapTime) {
        self.lap_time = lap_time;

        if lap_time < self.best_lap_time {
            self.best_lap_time = lap_time
        }
    }
}

fn clamp_position(position: i64) -> u32 {
    position.clamp(MIN_POSITION as i64, MAX_POSITION as i64) as u32
}

/// LapOutcome contains the driver state after a simulated lap and the race event it caused (if
/// any).
#[derive(Debug, Clone)]
pub struct LapOutcome {
    pub state: DriverRaceState,
    pub event: Option<String>,
}

/// simulate_lap advances a driver by one lap. Execution order:
/// 1. Retired drivers are returned unchanged.
/// 2. With the position change probability, a second draw decides whether the driver gains a
/// position (draw below skill factor minus weather and tyre penalties) or loses one.
/// 3. With the failure probability, the driver retires due to a mechanical failure. Nothing else
/// changes in that case.
/// 4. Otherwise, tyre wear and fuel consumption are applied, a new lap time is drawn, and the
/// position change from step 2 is applied.
pub fn simulate_lap(
    state: &DriverRaceState,
    conditions: &SessionConditions,
    sim_pars: &SimPars,
    rng: &mut dyn RandomSource,
) -> LapOutcome {
    let mut state = state.to_owned();

    if state.did_not_finish {
        return LapOutcome { state, event: None };
    }

    let race_pars = &sim_pars.race_pars;
    let skill_factor = state.skill as f64 / 100.0;
    let weather_penalty = conditions.weather_penalty(race_pars.rain_penalty);
    let tyre_penalty = state.tireset.pace_penalty(&sim_pars.tyre_pars);

    // position change
    let mut position_delta = 0;

    if rng.uniform() < race_pars.position_change_prob {
        position_delta = if rng.uniform() < skill_factor - weather_penalty - tyre_penalty {
            -1
        } else {
            1
        };
    }

    // mechanical failure
    if rng.uniform() < race_pars.failure_prob {
        state.did_not_finish = true;
        let event = format!("{} has a mechanical failure!", state.name);
        return LapOutcome {
            state,
            event: Some(event),
        };
    }

    // tyre wear, fuel consumption, and lap time
    state.tireset.drive_lap(&sim_pars.tyre_pars, rng.uniform());
    state.fuel = (state.fuel - rng.uniform() * race_pars.fuel_rate).max(0.0);
    let lap_time = calc_laptime(state.skill, &sim_pars.laptime_pars, rng.uniform());
    state.record_lap(lap_time);
    state.shift_position(position_delta);

    LapOutcome { state, event: None }
}
