use crate::core::race::{RaceSession, TickOutcome};
use crate::core::random::RandomSource;
use crate::core::simulator::Simulator;
use crate::post::race_result::Classification;
use crate::pre::read_sim_pars::SimPars;
use crate::store::records::{Driver, Race};
use crate::store::RaceStore;
use anyhow::{anyhow, Context};
use log::info;

/// handle_race starts the loaded race of the simulator and ticks it without delay until it is
/// finished. The results are stored by the simulator.
pub fn handle_race<S: RaceStore>(simulator: &mut Simulator<S>) -> anyhow::Result<Classification> {
    simulator
        .start()
        .context("Failed to start the race!")?;

    loop {
        let outcome = simulator.tick();

        if simulator.session().cur_lap % 10 == 0 {
            info!(
                "Simulating... Current lap is {}/{}",
                simulator.session().cur_lap,
                simulator.session().tot_no_laps
            );
        }

        if outcome == TickOutcome::LapsExhausted || outcome == TickOutcome::Idle {
            break;
        }
    }

    simulator
        .session()
        .get_classification()
        .cloned()
        .ok_or_else(|| anyhow!("Race ended without classification!"))
}

/// simulate_race simulates a race on a detached session, i.e. nothing is read from or written to
/// a store. It is used for repeated simulation runs of the same race.
pub fn simulate_race(
    race: Option<&Race>,
    drivers: &[Driver],
    sim_pars: &SimPars,
    rng: &mut dyn RandomSource,
) -> anyhow::Result<Classification> {
    let mut session = RaceSession::new(race, drivers, sim_pars, rng);
    session.start().context("Failed to start the race!")?;

    while let TickOutcome::Lap(_) = session.advance_lap(sim_pars, rng) {}

    session
        .finish()
        .ok_or_else(|| anyhow!("Race was already finished!"))
}
