use crate::core::race::RaceSpeed;
use crate::pre::read_sim_pars::SimPars;
use crate::pre::sim_opts::SimOpts;
use anyhow::Context;
use helpers::general::InputValueError;
use std::convert::TryFrom;

/// check_sim_opts_pars assures that the inserted options and parameters are within reasonable
/// limits and raises an error if not.
pub fn check_sim_opts_pars(sim_opts: &SimOpts, sim_pars: &SimPars) -> anyhow::Result<()> {
    // PART 1: SIMULATION OPTIONS
    if sim_opts.no_sim_runs < 1 {
        return Err(InputValueError).context(format!(
            "no_sim_runs must be at least equal to one, but is {}!",
            sim_opts.no_sim_runs
        ));
    }

    if sim_opts.realtime && sim_opts.no_sim_runs != 1 {
        return Err(InputValueError)
            .context("If realtime is activated, no_sim_runs must be equal to one!");
    }

    RaceSpeed::try_from(sim_opts.speed)
        .map_err(|_| InputValueError)
        .context(format!(
            "speed must be 1, 2, or 4, but is {}!",
            sim_opts.speed
        ))?;

    if sim_opts.user_id.trim().is_empty() {
        return Err(InputValueError).context("user_id must not be empty!");
    }

    // PART 2: SIMULATION PARAMETERS
    check_sim_pars(sim_pars)
}

/// check_sim_pars checks the simulation parameters only, e.g. after reading a parameter file.
pub fn check_sim_pars(sim_pars: &SimPars) -> anyhow::Result<()> {
    // RACE ----------------------------------------------------------------------------------------
    let race_pars = &sim_pars.race_pars;

    for (name, prob) in [
        ("position_change_prob", race_pars.position_change_prob),
        ("failure_prob", race_pars.failure_prob),
        ("rain_penalty", race_pars.rain_penalty),
    ] {
        if !(0.0..=1.0).contains(&prob) {
            return Err(InputValueError).context(format!(
                "{} is {:.3}, which is not within the required range [0.0, 1.0]!",
                name, prob
            ));
        }
    }

    if race_pars.default_tot_no_laps < 1 {
        return Err(InputValueError).context("default_tot_no_laps must be at least one!");
    }

    if !(1..=20).contains(&race_pars.grid_start) {
        return Err(InputValueError).context(format!(
            "grid_start is {}, which is not within the required range [1, 20]!",
            race_pars.grid_start
        ));
    }

    if race_pars.fuel_rate < 0.0 {
        return Err(InputValueError).context("fuel_rate must not be negative!");
    }

    // TYRES ---------------------------------------------------------------------------------------
    let tyre_pars = &sim_pars.tyre_pars;

    if tyre_pars.wear_rate < 0.0 || tyre_pars.soft_wear_penalty < 0.0 {
        return Err(InputValueError)
            .context("wear_rate and soft_wear_penalty must not be negative!");
    }

    if !(0.0..=1.0).contains(&tyre_pars.wear_pace_penalty) {
        return Err(InputValueError)
            .context("wear_pace_penalty is not within the required range [0.0, 1.0]!");
    }

    // LAP TIME ------------------------------------------------------------------------------------
    let laptime_pars = &sim_pars.laptime_pars;

    if laptime_pars.t_base <= 0.0 || laptime_pars.t_per_skill_point < 0.0 || laptime_pars.t_spread < 0.0
    {
        return Err(InputValueError).context(
            "t_base must be positive, t_per_skill_point and t_spread must not be negative!",
        );
    }

    // SCHEDULER -----------------------------------------------------------------------------------
    let scheduler_pars = &sim_pars.scheduler_pars;

    if scheduler_pars.t_tick_base_ms < 4 || scheduler_pars.t_pit_stop_ms < 1 {
        return Err(InputValueError).context(format!(
            "t_tick_base_ms ({}ms) must be at least 4ms and t_pit_stop_ms ({}ms) at least 1ms!",
            scheduler_pars.t_tick_base_ms, scheduler_pars.t_pit_stop_ms
        ));
    }

    Ok(())
}
