use anyhow::Context;
use clap::Parser;
use log::{info, warn};
use racesim::core::handle_race::{handle_race, simulate_race};
use racesim::core::race::RaceSpeed;
use racesim::core::random::RandomSource;
use racesim::core::scheduler::{spawn_scheduler, Command};
use racesim::core::simulator::Simulator;
use racesim::interfaces::ui_interface::{parse_command, RaceState};
use racesim::post::race_result::Classification;
use racesim::pre::check_sim_opts_pars::check_sim_opts_pars;
use racesim::pre::read_sim_pars::{read_sim_pars, SimPars};
use racesim::pre::sim_opts::SimOpts;
use racesim::store::kv::{FileBackend, KvStore};
use racesim::store::seed::initialize_user_data;
use racesim::store::RaceStore;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::cmp::min;
use std::convert::TryFrom;
use std::io::{self, BufRead};
use std::thread;
use std::time::Instant;

// set maximum number of concurrently running jobs in case of running more than a single simulation
const MAX_NO_CONCURRENT_JOBS: u32 = 200;

fn main() -> anyhow::Result<()> {
    // PRE-PROCESSING ------------------------------------------------------------------------------
    // get simulation options from the command line arguments and read simulation parameters
    let sim_opts: SimOpts = SimOpts::parse();

    let log_level = if sim_opts.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let sim_pars = match sim_opts.parfile_path.as_ref() {
        Some(parfile_path) => read_sim_pars(parfile_path.as_path())?,
        None => SimPars::default(),
    };

    // check simulation options and parameters
    check_sim_opts_pars(&sim_opts, &sim_pars)?;

    // open the store and make sure that the user owns a team
    let mut store = KvStore::<FileBackend>::open(sim_opts.store_path.as_path())?;
    let (team, drivers) = initialize_user_data(&mut store, &sim_opts.user_id)
        .context("Failed to initialize the user's team!")?;

    info!(
        "Team {} ({} championship points) with drivers {}",
        team.name,
        team.championship_points,
        drivers
            .iter()
            .map(|d| d.name.as_str())
            .collect::<Vec<&str>>()
            .join(", ")
    );

    // EXECUTION -----------------------------------------------------------------------------------
    let t_start = Instant::now();

    if sim_opts.realtime {
        // REAL-TIME CASE --------------------------------------------------------------------------
        run_realtime(store, &sim_opts, sim_pars)?;
    } else if sim_opts.no_sim_runs == 1 {
        // SINGLE RUN ------------------------------------------------------------------------------
        let mut simulator = Simulator::new(store, &sim_opts.user_id, sim_pars, create_rng(&sim_opts));
        let classification = handle_race(&mut simulator)?;

        classification.print_classification();
        info!(
            "Execution time (total): {}ms",
            t_start.elapsed().as_millis()
        );
    } else {
        // MULTIPLE THREADS ------------------------------------------------------------------------
        // the runs are not stored, i.e. they only read race and drivers from the store
        let race = store.read_active_race();
        let drivers = store.read_drivers(&sim_opts.user_id);
        let base_seed = sim_opts.seed.unwrap_or_else(rand::random);

        let mut classifications: Vec<Classification> =
            Vec::with_capacity(sim_opts.no_sim_runs as usize);
        let mut no_races_left = sim_opts.no_sim_runs;

        while no_races_left > 0 {
            // calculate number of simulation runs to execute in current loop
            let tmp_no_sim_runs = min(no_races_left, MAX_NO_CONCURRENT_JOBS);
            let first_run = sim_opts.no_sim_runs - no_races_left;

            let tmp_classifications: anyhow::Result<Vec<Classification>> = (first_run
                ..first_run + tmp_no_sim_runs)
                .into_par_iter()
                .map(|run| {
                    let mut rng = ChaCha8Rng::seed_from_u64(base_seed.wrapping_add(run as u64));
                    simulate_race(race.as_ref(), &drivers, &sim_pars, &mut rng)
                })
                .collect();
            classifications.extend(tmp_classifications?);

            // reduce remaining simulation runs
            no_races_left -= tmp_no_sim_runs;
        }

        print_statistics(&classifications);
        info!(
            "Execution time (total): {}ms",
            t_start.elapsed().as_millis()
        );
    }

    Ok(())
}

/// create_rng returns a seeded random number generator if a seed was set, else it is seeded from
/// entropy.
fn create_rng(sim_opts: &SimOpts) -> Box<dyn RandomSource + Send> {
    match sim_opts.seed {
        Some(seed) => Box::new(ChaCha8Rng::seed_from_u64(seed)),
        None => Box::new(ChaCha8Rng::from_entropy()),
    }
}

/// run_realtime runs the race in a scheduler thread and forwards the commands read from stdin.
/// The race state is printed whenever it changes until the user quits.
fn run_realtime(
    store: KvStore<FileBackend>,
    sim_opts: &SimOpts,
    sim_pars: SimPars,
) -> anyhow::Result<()> {
    let scheduler_pars = sim_pars.scheduler_pars.to_owned();
    let mut simulator = Simulator::new(store, &sim_opts.user_id, sim_pars, create_rng(sim_opts));
    simulator.set_speed(RaceSpeed::try_from(sim_opts.speed)?);

    println!("INFO: Drivers:");
    for driver in simulator.session().drivers.iter() {
        println!("INFO:   {} ({})", driver.driver_id, driver.name);
    }
    println!(
        "INFO: Commands: start, pause, resume, reset, speed N, pit DRIVER, strategy DRIVER \
        STRATEGY (aggressive, balanced, conservative), quit"
    );

    // create channel for communication between scheduler and front end
    let (tx_state, rx_state) = flume::unbounded::<RaceState>();
    let handle = spawn_scheduler(simulator, scheduler_pars, Some(tx_state));

    // stdin is read in a separate thread such that race states are printed while waiting for input
    let tx_command = handle.command_sender();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let line = match line {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => line,
                Err(e) => {
                    warn!("Failed to read from stdin: {}", e);
                    break;
                }
            };

            match parse_command(&line) {
                Ok(command) => {
                    let quit = command == Command::Shutdown;
                    if tx_command.send(command).is_err() || quit {
                        return;
                    }
                }
                Err(e) => println!("{:#}", e),
            }
        }

        // stdin was closed
        let _ = tx_command.send(Command::Shutdown);
    });

    // the state channel is disconnected as soon as the scheduler thread stops
    let mut no_printed_events = 0;
    let mut last_lap = 0;

    for state in rx_state.iter() {
        // the event log is replaced on start and cleared on reset
        if state.events.len() < no_printed_events {
            no_printed_events = 0;
        }
        for event in state.events.iter().skip(no_printed_events) {
            println!("EVENT: {}", event);
        }
        no_printed_events = state.events.len();

        if state.cur_lap != last_lap {
            print_race_state(&state);
            last_lap = state.cur_lap;
        }
    }

    let simulator = handle.shutdown()?;

    if let Some(classification) = simulator.session().get_classification() {
        classification.print_classification();
    }

    Ok(())
}

fn print_race_state(state: &RaceState) {
    println!(
        "LAP {}/{} ({:.0}%), {} {}, {:.0}°C",
        state.cur_lap,
        state.tot_no_laps,
        state.get_race_prog() * 100.0,
        state.conditions.weather,
        state.conditions.track_condition,
        state.conditions.temperature
    );

    for driver in state.drivers.iter() {
        let position = if driver.did_not_finish {
            String::from("DNF")
        } else {
            format!("P{}", driver.position)
        };

        println!(
            "{:>4}  {:<20} last {}  best {}  {} {:>3.0}%  fuel {:>3.0}%{}",
            position,
            driver.name,
            driver.lap_time,
            driver.best_lap_time,
            driver.tireset.compound,
            driver.tireset.wear,
            driver.fuel,
            if driver.is_in_pits { "  IN PITS" } else { "" }
        );
    }
}

/// print_statistics prints the average team points and the retirement rate of multiple runs.
fn print_statistics(classifications: &[Classification]) {
    let no_runs = classifications.len().max(1) as f64;

    let mean_points = classifications
        .iter()
        .map(|c| c.total_points as f64)
        .sum::<f64>()
        / no_runs;

    let no_entries: usize = classifications.iter().map(|c| c.entries.len()).sum();
    let no_dnfs = classifications
        .iter()
        .flat_map(|c| c.entries.iter())
        .filter(|e| e.dnf)
        .count();

    println!("RESULT: Simulated {} races", classifications.len());
    println!("RESULT: Average team points per race: {:.2}", mean_points);
    println!(
        "RESULT: Retirement rate per driver: {:.2}%",
        no_dnfs as f64 / no_entries.max(1) as f64 * 100.0
    );
}
