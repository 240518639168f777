use crate::core::race::{CommandError, RaceSession, RaceSpeed, Strategy, TickOutcome};
use crate::core::random::RandomSource;
use crate::post::race_result::Classification;
use crate::pre::read_sim_pars::SimPars;
use crate::store::records::{Race, RaceResult};
use crate::store::RaceStore;
use helpers::ids::generate_id;
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Simulator owns the race session of a user and executes the commands of the front end on it.
/// The store is read when the session is (re)loaded and written when the race is finalized.
pub struct Simulator<S: RaceStore> {
    store: S,
    user_id: String,
    sim_pars: SimPars,
    rng: Box<dyn RandomSource + Send>,
    race: Option<Race>,
    session: RaceSession,
}

impl<S: RaceStore> Simulator<S> {
    pub fn new(
        mut store: S,
        user_id: &str,
        sim_pars: SimPars,
        mut rng: Box<dyn RandomSource + Send>,
    ) -> Simulator<S> {
        let (race, session) = load_session(&mut store, user_id, &sim_pars, rng.as_mut());

        Simulator {
            store,
            user_id: user_id.to_owned(),
            sim_pars,
            rng,
            race,
            session,
        }
    }

    // ---------------------------------------------------------------------------------------------
    // COMMANDS ------------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    pub fn start(&mut self) -> Result<(), CommandError> {
        self.session.start()?;
        info!(
            "Race started: {} ({} laps)",
            self.session.race_name.as_deref().unwrap_or("unnamed race"),
            self.session.tot_no_laps
        );
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), CommandError> {
        self.session.pause()
    }

    pub fn resume(&mut self) -> Result<(), CommandError> {
        self.session.resume()
    }

    pub fn set_speed(&mut self, speed: RaceSpeed) {
        self.session.set_speed(speed)
    }

    /// reset discards the current session and reloads team, drivers, and race from the store. The
    /// selected race speed is kept.
    pub fn reset(&mut self) {
        let speed = self.session.speed;
        let (race, session) = load_session(
            &mut self.store,
            &self.user_id,
            &self.sim_pars,
            self.rng.as_mut(),
        );

        self.race = race;
        self.session = session;
        self.session.set_speed(speed);
        info!("Race session was reset");
    }

    pub fn pit_stop(&mut self, driver_id: &str) -> Result<(), CommandError> {
        self.session
            .pit_stop(driver_id, self.sim_pars.race_pars.pit_position_loss)
    }

    pub fn release_from_pits(&mut self, driver_id: &str) -> bool {
        self.session.release_from_pits(driver_id)
    }

    pub fn apply_strategy(
        &mut self,
        driver_id: &str,
        strategy_id: &str,
    ) -> Result<&'static Strategy, CommandError> {
        self.session.apply_strategy(driver_id, strategy_id)
    }

    // ---------------------------------------------------------------------------------------------
    // MAIN METHODS --------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// tick advances the race by one lap and finalizes it as soon as all laps are driven.
    pub fn tick(&mut self) -> TickOutcome {
        let outcome = self
            .session
            .advance_lap(&self.sim_pars, self.rng.as_mut());

        match outcome {
            TickOutcome::Lap(lap) => debug!("Simulated lap {}/{}", lap, self.session.tot_no_laps),
            TickOutcome::LapsExhausted => {
                self.finalize();
            }
            TickOutcome::Idle => {}
        }

        outcome
    }

    /// finalize awards the points, stores a race result for every driver that scored, and adds the
    /// points to the team's championship points. It does nothing unless the race is running or
    /// paused, in particular if it was not started or was already finalized. Store errors are
    /// logged and otherwise ignored.
    pub fn finalize(&mut self) -> Option<Classification> {
        let classification = self.session.finish()?;
        info!(
            "Race finished after {} laps, team scored {} points",
            self.session.cur_lap, classification.total_points
        );

        let race_id = match self.race.as_ref() {
            Some(race) => race.id.to_owned(),
            None => {
                warn!("No race available, race results are not stored");
                return Some(classification);
            }
        };

        // result ids are drawn from the simulation's random source, seeded runs store equal ids
        let mut rng = StdRng::seed_from_u64((self.rng.uniform() * u64::MAX as f64) as u64);

        for entry in classification.entries.iter().filter(|e| e.scored()) {
            let result = RaceResult {
                id: generate_id(&mut rng),
                user_id: self.user_id.to_owned(),
                race_id: race_id.to_owned(),
                driver_id: entry.driver_id.to_owned(),
                position: entry.position,
                points: entry.points,
                best_lap: entry.best_lap.to_owned(),
                pit_stops: entry.pit_stops,
                dnf: entry.dnf,
            };

            if let Err(e) = self.store.append_race_result(&result) {
                error!(
                    "Failed to store race result of {}: {:#}",
                    entry.name,
                    anyhow::Error::new(e)
                );
            }
        }

        match self.store.read_team(&self.user_id) {
            Some(mut team) => {
                team.championship_points += classification.total_points;

                if let Err(e) = self.store.write_team(&team) {
                    error!(
                        "Failed to update championship points of team {}: {:#}",
                        team.name,
                        anyhow::Error::new(e)
                    );
                }
            }
            None => warn!(
                "No team found for user {}, championship points are not updated",
                self.user_id
            ),
        }

        Some(classification)
    }

    // ---------------------------------------------------------------------------------------------
    // METHODS (HELPERS) ---------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    pub fn session(&self) -> &RaceSession {
        &self.session
    }

    pub fn sim_pars(&self) -> &SimPars {
        &self.sim_pars
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

/// load_session reads the active race and the user's drivers from the store and creates a fresh
/// session from them.
fn load_session<S: RaceStore>(
    store: &mut S,
    user_id: &str,
    sim_pars: &SimPars,
    rng: &mut dyn RandomSource,
) -> (Option<Race>, RaceSession) {
    let race = store.read_active_race();
    let drivers = store.read_drivers(user_id);

    match race.as_ref() {
        Some(race) => debug!("Loaded race {} with {} drivers", race.name, drivers.len()),
        None => warn!("No active or upcoming race found, using default race settings"),
    }

    if drivers.is_empty() {
        warn!("User {} has no contracted drivers", user_id)
    }

    let session = RaceSession::new(race.as_ref(), &drivers, sim_pars, rng);
    (race, session)
}
