pub mod core;
pub mod interfaces;
pub mod post;
pub mod pre;
pub mod store;






#[cfg(test)]
mod race_tests {
    use crate::core::race::{
        get_strategy, CommandError, RaceSession, RaceSpeed, SessionStatus, TickOutcome,
    };
    use crate::core::tireset::TyreCompound;
    use crate::pre::read_sim_pars::SimPars;
    use crate::store::records::Driver;
    use crate::test_helpers::SequenceSource;
    use std::convert::TryFrom;
    use std::time::Duration;

    fn driver(id: &str, name: &str, skill: u32) -> Driver {
        Driver {
            id: id.to_owned(),
            name: name.to_owned(),
            skill,
            contract_years: 1,
            salary: 1_000_000,
            age: 24,
            nationality: String::from("Italy"),
            experience: 2,
            specialties: vec![],
            is_available: false,
            team_id: Some(String::from("team_1")),
            user_id: String::from("user_1"),
        }
    }

    fn session(rng: &mut SequenceSource) -> RaceSession {
        let drivers = vec![driver("d1", "Alex Rodriguez", 78), driver("d2", "Marcus Chen", 74)];
        RaceSession::new(None, &drivers, &SimPars::default(), rng)
    }

    #[test]
    fn test_new_session() {
        let s = session(&mut SequenceSource::constant(0.5));
        assert_eq!(s.status, SessionStatus::Preparation);
        assert_eq!(s.cur_lap, 0);
        assert_eq!(s.tot_no_laps, 58);
        assert!(!s.is_running);
        assert_eq!(s.drivers[0].position, 8);
        assert_eq!(s.drivers[1].position, 9);
        assert_eq!(s.drivers[1].tireset.compound, TyreCompound::Medium);
        assert!(s.events.is_empty());
    }
    #[test]
    fn test_start_pause_resume() {
        let mut s = session(&mut SequenceSource::constant(0.5));
        assert!(s.pause().is_err());

        s.start().unwrap();
        assert_eq!(s.status, SessionStatus::Race);
        assert!(s.is_ticking());
        assert_eq!(s.events, vec!["Race started! Lights out and away we go!"]);

        s.pause().unwrap();
        assert!(!s.is_ticking());
        assert_eq!(s.status, SessionStatus::Race);

        s.resume().unwrap();
        assert!(s.is_ticking());

        assert_eq!(
            s.start(),
            Err(CommandError::InvalidStatus {
                command: "start",
                status: SessionStatus::Race
            })
        );
    }
    #[test]
    fn test_idle_tick_when_paused() {
        let mut rng = SequenceSource::constant(0.5);
        let mut s = session(&mut rng);
        assert_eq!(s.advance_lap(&SimPars::default(), &mut rng), TickOutcome::Idle);

        s.start().unwrap();
        s.pause().unwrap();
        assert_eq!(s.advance_lap(&SimPars::default(), &mut rng), TickOutcome::Idle);
        assert_eq!(s.cur_lap, 0);
    }
    #[test]
    fn test_lap_counter_until_exhausted() {
        let mut rng = SequenceSource::constant(0.99);
        let mut s = session(&mut rng);
        s.tot_no_laps = 3;
        s.start().unwrap();

        let sim_pars = SimPars::default();
        assert_eq!(s.advance_lap(&sim_pars, &mut rng), TickOutcome::Lap(1));
        assert_eq!(s.advance_lap(&sim_pars, &mut rng), TickOutcome::Lap(2));
        assert_eq!(s.advance_lap(&sim_pars, &mut rng), TickOutcome::LapsExhausted);
        assert_eq!(s.cur_lap, 3);

        // laps cannot exceed the total number of laps
        assert_eq!(s.advance_lap(&sim_pars, &mut rng), TickOutcome::LapsExhausted);
        assert_eq!(s.cur_lap, 3);
    }
    #[test]
    fn test_finish_only_once() {
        let mut s = session(&mut SequenceSource::constant(0.5));
        s.start().unwrap();
        s.drivers[0].position = 1;
        s.drivers[1].position = 2;

        let classification = s.finish().unwrap();
        assert_eq!(classification.total_points, 43);
        assert_eq!(s.status, SessionStatus::Finished);
        assert!(!s.is_running);
        assert_eq!(s.drivers[0].points_awarded, 25);
        assert_eq!(s.drivers[1].points_awarded, 18);
        assert_eq!(
            s.events.last().map(|e| e.as_str()),
            Some("Race finished! Team scored 43 points.")
        );

        assert!(s.finish().is_none());
        assert_eq!(s.get_classification(), Some(&classification));
        assert_eq!(
            s.events
                .iter()
                .filter(|e| e.starts_with("Race finished!"))
                .count(),
            1
        );
    }
    #[test]
    fn test_pit_stop() {
        let mut s = session(&mut SequenceSource::constant(0.5));
        assert!(s.pit_stop("d1", 3).is_err());

        s.start().unwrap();
        s.drivers[0].tireset.compound = TyreCompound::Soft;
        s.drivers[0].tireset.wear = 40.0;
        s.pit_stop("d1", 3).unwrap();

        let d = s.get_driver("d1").unwrap();
        assert!(d.is_in_pits);
        assert_eq!(d.pit_stop_count, 1);
        assert_eq!(d.tireset.wear, 0.0);
        assert_eq!(d.tireset.compound, TyreCompound::Medium);
        assert_eq!(d.position, 11);
        assert_eq!(
            s.events.last().map(|e| e.as_str()),
            Some("Alex Rodriguez pits for fresh tyres!")
        );

        assert!(s.release_from_pits("d1"));
        assert!(!s.get_driver("d1").unwrap().is_in_pits);
        assert!(!s.release_from_pits("d1"));
    }
    #[test]
    fn test_pit_stop_position_clamped() {
        let mut s = session(&mut SequenceSource::constant(0.5));
        s.start().unwrap();
        s.drivers[1].position = 19;
        s.pit_stop("d2", 3).unwrap();
        assert_eq!(s.get_driver("d2").unwrap().position, 20);
    }
    #[test]
    fn test_pit_stop_rejected_for_retired_driver() {
        let mut s = session(&mut SequenceSource::constant(0.5));
        s.start().unwrap();
        s.drivers[0].did_not_finish = true;
        let before = s.drivers[0].to_owned();

        assert_eq!(
            s.pit_stop("d1", 3),
            Err(CommandError::DriverRetired(String::from("Alex Rodriguez")))
        );
        assert_eq!(s.drivers[0], before);
        assert_eq!(
            s.pit_stop("unknown", 3),
            Err(CommandError::UnknownDriver(String::from("unknown")))
        );
    }
    #[test]
    fn test_apply_strategy() {
        let mut s = session(&mut SequenceSource::constant(0.5));
        s.drivers[0].tireset.wear = 30.0;

        let strategy = s.apply_strategy("d1", "aggressive").unwrap();
        assert_eq!(strategy.name, "Aggressive");
        assert_eq!(s.drivers[0].tireset.compound, TyreCompound::Soft);
        assert_eq!(s.drivers[0].tireset.wear, 30.0);
        assert_eq!(
            s.events.last().map(|e| e.as_str()),
            Some("Alex Rodriguez switches to Aggressive strategy!")
        );

        s.apply_strategy("d1", "conservative").unwrap();
        assert_eq!(s.drivers[0].tireset.compound, TyreCompound::Hard);

        assert!(s.apply_strategy("d1", "reckless").is_err());
        assert!(s.apply_strategy("d9", "balanced").is_err());
        assert_eq!(get_strategy("balanced").unwrap().estimated_stops, 1);
    }
    #[test]
    fn test_second_pit_stop_rejected_while_in_pits() {
        let mut s = session(&mut SequenceSource::constant(0.5));
        s.start().unwrap();
        s.pit_stop("d1", 3).unwrap();
        let in_pits = s.drivers[0].to_owned();

        assert_eq!(
            s.pit_stop("d1", 3),
            Err(CommandError::DriverInPits(String::from("Alex Rodriguez")))
        );
        assert_eq!(s.drivers[0], in_pits);
        assert_eq!(s.drivers[0].pit_stop_count, 1);
        assert_eq!(s.drivers[0].position, 11);

        // pitting again is possible after the release
        assert!(s.release_from_pits("d1"));
        s.pit_stop("d1", 3).unwrap();
        assert_eq!(s.drivers[0].pit_stop_count, 2);
        assert_eq!(s.drivers[0].position, 14);
    }
    #[test]
    fn test_strategy_rejected_for_retired_driver() {
        let mut rng = SequenceSource::constant(0.0);
        let mut s = session(&mut rng);
        let mut sim_pars = SimPars::default();
        sim_pars.race_pars.failure_prob = 1.0;
        s.start().unwrap();
        s.advance_lap(&sim_pars, &mut rng);
        assert!(s.drivers[0].did_not_finish);

        assert_eq!(
            s.apply_strategy("d1", "aggressive"),
            Err(CommandError::DriverRetired(String::from("Alex Rodriguez")))
        );
        assert_eq!(s.drivers[0].tireset.compound, TyreCompound::Medium);
        assert!(!s.events.iter().any(|e| e.contains("switches to")));
    }
    #[test]
    fn test_finish_requires_race_status() {
        let mut s = session(&mut SequenceSource::constant(0.5));
        assert!(s.finish().is_none());
        assert_eq!(s.status, SessionStatus::Preparation);
        assert!(s.get_classification().is_none());
        assert!(s.events.is_empty());
        assert!(s.drivers.iter().all(|d| d.points_awarded == 0));

        // a paused race can still be finished
        s.start().unwrap();
        s.pause().unwrap();
        assert!(s.finish().is_some());
        assert_eq!(s.status, SessionStatus::Finished);
    }
    #[test]
    fn test_race_speed() {
        assert_eq!(RaceSpeed::try_from(2), Ok(RaceSpeed::X2));
        assert_eq!(RaceSpeed::try_from(3), Err(CommandError::InvalidSpeed(3)));

        let t_base = Duration::from_millis(3000);
        assert_eq!(RaceSpeed::X1.tick_interval(t_base), Duration::from_millis(3000));
        assert_eq!(RaceSpeed::X2.tick_interval(t_base), Duration::from_millis(1500));
        assert_eq!(RaceSpeed::X4.tick_interval(t_base), Duration::from_millis(750));
    }
}


#[cfg(test)]
mod handle_race_tests {
    use crate::core::handle_race::{handle_race, simulate_race};
    use crate::core::race::SessionStatus;
    use crate::core::simulator::Simulator;
    use crate::pre::read_sim_pars::SimPars;
    use crate::store::RaceStore;
    use crate::test_helpers::{setup_store, USER};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_handle_race_persists_results() {
        let mut sim = Simulator::new(
            setup_store(20),
            USER,
            SimPars::default(),
            Box::new(ChaCha8Rng::seed_from_u64(11)),
        );
        let classification = handle_race(&mut sim).unwrap();

        assert_eq!(sim.session().status, SessionStatus::Finished);
        assert_eq!(classification.entries.len(), 2);
        assert_eq!(
            sim.store().read_team(USER).unwrap().championship_points,
            classification.total_points
        );
        let no_scored = classification.entries.iter().filter(|e| e.scored()).count();
        assert_eq!(sim.store().read_race_results(USER, None).len(), no_scored);

        // a finished race cannot be started again without reset
        assert!(handle_race(&mut sim).is_err());
    }
    #[test]
    fn test_simulate_race_is_reproducible() {
        let mut store = setup_store(40);
        let race = store.read_active_race().unwrap();
        let drivers = store.read_drivers(USER);
        let sim_pars = SimPars::default();

        let c1 = simulate_race(
            Some(&race),
            &drivers,
            &sim_pars,
            &mut ChaCha8Rng::seed_from_u64(5),
        )
        .unwrap();
        let c2 = simulate_race(
            Some(&race),
            &drivers,
            &sim_pars,
            &mut ChaCha8Rng::seed_from_u64(5),
        )
        .unwrap();

        assert_eq!(c1, c2);
        assert_eq!(c1.tot_no_laps, 40);
        // nothing was written to the store
        assert!(store.read_race_results(USER, None).is_empty());
    }
}

#[cfg(test)]
mod scheduler_tests {
    use crate::core::race::{RaceSpeed, SessionStatus};
    use crate::core::scheduler::{spawn_scheduler, Command, SchedulerPars};
    use crate::core::simulator::Simulator;
    use crate::interfaces::ui_interface::RaceState;
    use crate::store::RaceStore;
    use crate::test_helpers::{front_row_pars, setup_store, SequenceSource, USER};
    use flume::Receiver;
    use std::thread::sleep;
    use std::time::{Duration, Instant};

    fn wait_for<F: Fn(&RaceState) -> bool>(rx: &Receiver<RaceState>, cond: F) -> RaceState {
        let t_end = Instant::now() + Duration::from_secs(5);

        loop {
            let state = rx
                .recv_deadline(t_end)
                .expect("Expected race state was not received in time!");
            if cond(&state) {
                return state;
            }
        }
    }

    fn simulator(laps: u32) -> Simulator<crate::store::kv::KvStore<crate::store::kv::MemoryBackend>> {
        Simulator::new(
            setup_store(laps),
            USER,
            front_row_pars(),
            Box::new(SequenceSource::constant(0.99)),
        )
    }

    #[test]
    fn test_scheduler_runs_race_to_the_end() {
        let (tx, rx) = flume::unbounded();
        let pars = SchedulerPars {
            t_tick_base_ms: 40,
            t_pit_stop_ms: 3000,
        };
        let handle = spawn_scheduler(simulator(3), pars, Some(tx));

        handle.send(Command::SetSpeed(RaceSpeed::X4)).unwrap();
        handle.send(Command::Start).unwrap();
        let state = wait_for(&rx, |s| s.status == SessionStatus::Finished);

        assert_eq!(state.cur_lap, 3);
        assert!(!state.is_running);
        assert_eq!(
            state.events.last().map(|e| e.as_str()),
            Some("Race finished! Team scored 43 points.")
        );

        let sim = handle.shutdown().unwrap();
        assert_eq!(sim.store().read_team(USER).unwrap().championship_points, 43);
    }
    #[test]
    fn test_scheduler_pause_stops_ticks() {
        let pars = SchedulerPars {
            t_tick_base_ms: 1000,
            t_pit_stop_ms: 3000,
        };
        let handle = spawn_scheduler(simulator(3), pars, None);

        handle.send(Command::Start).unwrap();
        handle.send(Command::Pause).unwrap();
        sleep(Duration::from_millis(1200));

        let sim = handle.shutdown().unwrap();
        assert_eq!(sim.session().cur_lap, 0);
        assert_eq!(sim.session().status, SessionStatus::Race);
        assert!(!sim.session().is_running);
    }
    #[test]
    fn test_scheduler_pit_release_independent_of_ticks() {
        let (tx, rx) = flume::unbounded();
        let pars = SchedulerPars {
            t_tick_base_ms: 60_000,
            t_pit_stop_ms: 50,
        };
        let sim = simulator(3);
        let driver_id = sim.session().drivers[0].driver_id.to_owned();
        let handle = spawn_scheduler(sim, pars, Some(tx));

        handle.send(Command::Start).unwrap();
        handle.send(Command::PitStop(driver_id.to_owned())).unwrap();

        let in_pits = wait_for(&rx, |s| s.drivers[0].is_in_pits);
        assert_eq!(in_pits.drivers[0].pit_stop_count, 1);
        assert_eq!(in_pits.drivers[0].position, 4);

        let released = wait_for(&rx, |s| !s.drivers[0].is_in_pits);
        assert_eq!(released.cur_lap, 0);
        assert_eq!(released.drivers[0].pit_stop_count, 1);

        handle.shutdown().unwrap();
    }
    #[test]
    fn test_scheduler_reset() {
        let (tx, rx) = flume::unbounded();
        let pars = SchedulerPars {
            t_tick_base_ms: 20,
            t_pit_stop_ms: 3000,
        };
        let handle = spawn_scheduler(simulator(50), pars, Some(tx));

        handle.send(Command::Start).unwrap();
        wait_for(&rx, |s| s.cur_lap >= 2);
        handle.send(Command::Reset).unwrap();
        let state = wait_for(&rx, |s| s.status == SessionStatus::Preparation);

        assert_eq!(state.cur_lap, 0);
        assert!(state.events.is_empty());

        let sim = handle.shutdown().unwrap();
        assert_eq!(sim.session().cur_lap, 0);
        assert_eq!(sim.session().status, SessionStatus::Preparation);
    }
}

#[cfg(test)]
mod ui_interface_tests {
    use crate::core::race::{RaceSpeed, SessionStatus};
    use crate::core::scheduler::Command;
    use crate::interfaces::ui_interface::{parse_command, RaceState};
    use crate::test_helpers::{setup_store, SequenceSource, USER};
    use crate::core::simulator::Simulator;
    use crate::pre::read_sim_pars::SimPars;
    use approx::assert_ulps_eq;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_command("start").unwrap(), Command::Start);
        assert_eq!(parse_command("  Pause ").unwrap(), Command::Pause);
        assert_eq!(parse_command("quit").unwrap(), Command::Shutdown);
    }
    #[test]
    fn test_parse_commands_with_arguments() {
        assert_eq!(
            parse_command("speed 4").unwrap(),
            Command::SetSpeed(RaceSpeed::X4)
        );
        assert_eq!(
            parse_command("pit driver_1").unwrap(),
            Command::PitStop(String::from("driver_1"))
        );
        assert_eq!(
            parse_command("strategy driver_1 Aggressive").unwrap(),
            Command::ApplyStrategy {
                driver_id: String::from("driver_1"),
                strategy_id: String::from("aggressive")
            }
        );
    }
    #[test]
    fn test_parse_invalid_commands() {
        assert!(parse_command("").is_err());
        assert!(parse_command("speed 3").is_err());
        assert!(parse_command("speed fast").is_err());
        assert!(parse_command("pit").is_err());
        assert!(parse_command("overtake everybody").is_err());
    }
    #[test]
    fn test_race_state_snapshot() {
        let mut sim = Simulator::new(
            setup_store(4),
            USER,
            SimPars::default(),
            Box::new(SequenceSource::constant(0.99)),
        );
        sim.start().unwrap();
        sim.tick();

        let state = RaceState::from(sim.session());
        assert_eq!(state.status, SessionStatus::Race);
        assert_eq!(state.cur_lap, 1);
        assert_eq!(state.drivers.len(), 2);
        assert_ulps_eq!(state.get_race_prog(), 0.25);
    }
}

#[cfg(test)]
mod store_tests {
    use crate::core::conditions::Weather;
    use crate::store::kv::{FileBackend, KvBackend, KvStore, MemoryBackend, DRIVERS_KEY, RACES_KEY};
    use crate::store::records::{RaceResult, RaceStatus};
    use crate::store::seed::initialize_user_data;
    use crate::store::RaceStore;
    use crate::test_helpers::USER;
    use helpers::ids::generate_id;

    fn race_result(race_id: &str, user_id: &str) -> RaceResult {
        RaceResult {
            id: generate_id(&mut rand::thread_rng()),
            user_id: user_id.to_owned(),
            race_id: race_id.to_owned(),
            driver_id: String::from("d1"),
            position: 3,
            points: 15,
            best_lap: String::from("1:24.100"),
            pit_stops: 1,
            dnf: false,
        }
    }

    #[test]
    fn test_default_calendar_seeded() {
        let mut store = KvStore::in_memory();
        assert!(store.backend().get(RACES_KEY).is_none());

        let races = store.read_races();
        assert_eq!(races.len(), 23);
        assert_eq!(races[0].name, "Bahrain Grand Prix");
        assert_eq!(races[22].round_number, 23);
        assert_eq!(races[6].weather, Weather::Rain);
        assert!(store.backend().get(RACES_KEY).is_some());
    }
    #[test]
    fn test_active_race_fallback() {
        let mut store = KvStore::in_memory();
        assert_eq!(store.read_active_race().unwrap().id, "race_8");

        let mut monaco = store.read_active_race().unwrap();
        monaco.status = RaceStatus::Completed;
        store.write_race(&monaco).unwrap();
        assert_eq!(store.read_active_race().unwrap().id, "race_1");
        assert_eq!(store.read_races().len(), 23);
    }
    #[test]
    fn test_malformed_records_read_as_empty() {
        let mut backend = MemoryBackend::default();
        backend.set(DRIVERS_KEY, String::from("{not json")).unwrap();
        let store = KvStore::new(backend);

        assert!(store.read_drivers(USER).is_empty());
        assert!(store.read_team(USER).is_none());
        assert!(store.read_race_results(USER, None).is_empty());
    }
    #[test]
    fn test_initialize_user_data() {
        let mut store = KvStore::in_memory();
        let (team, drivers) = initialize_user_data(&mut store, USER).unwrap();

        assert_eq!(team.name, "Velocity Racing");
        assert_eq!(team.budget, 50_000_000);
        assert_eq!(team.championship_points, 0);
        assert_eq!(drivers.len(), 2);
        assert_eq!(drivers[0].name, "Alex Rodriguez");
        assert_eq!(drivers[0].skill, 78);
        assert_eq!(drivers[1].skill, 74);
        assert!(drivers.iter().all(|d| d.team_id.as_deref() == Some(team.id.as_str())));

        // initializing again keeps the existing records
        let (team_again, drivers_again) = initialize_user_data(&mut store, USER).unwrap();
        assert_eq!(team_again.id, team.id);
        assert_eq!(drivers_again, drivers);
        assert!(store.read_drivers("other_user").is_empty());
    }
    #[test]
    fn test_write_team_replaces_record() {
        let mut store = KvStore::in_memory();
        let (mut team, _) = initialize_user_data(&mut store, USER).unwrap();

        team.championship_points = 43;
        store.write_team(&team).unwrap();

        let stored = store.read_team(USER).unwrap();
        assert_eq!(stored.championship_points, 43);
        assert_eq!(stored.id, team.id);
    }
    #[test]
    fn test_race_results_filter() {
        let mut store = KvStore::in_memory();
        store.append_race_result(&race_result("race_1", USER)).unwrap();
        store.append_race_result(&race_result("race_2", USER)).unwrap();
        store
            .append_race_result(&race_result("race_1", "other_user"))
            .unwrap();

        assert_eq!(store.read_race_results(USER, None).len(), 2);
        assert_eq!(store.read_race_results(USER, Some("race_2")).len(), 1);
        assert_eq!(store.read_race_results("other_user", None).len(), 1);
    }
    #[test]
    fn test_records_camel_case() {
        let json = serde_json::to_string(&race_result("race_1", USER)).unwrap();
        assert!(json.contains("\"raceId\":\"race_1\""));
        assert!(json.contains("\"bestLap\":\"1:24.100\""));
    }
    #[test]
    fn test_file_backend_persists() {
        let path = std::env::temp_dir().join(format!(
            "f1mgr_store_test_{}.json",
            generate_id(&mut rand::thread_rng())
        ));

        {
            let mut store = KvStore::<FileBackend>::open(&path).unwrap();
            initialize_user_data(&mut store, USER).unwrap();
            store.append_race_result(&race_result("race_8", USER)).unwrap();
        }

        let mut store = KvStore::<FileBackend>::open(&path).unwrap();
        assert_eq!(store.read_team(USER).unwrap().name, "Velocity Racing");
        assert_eq!(store.read_drivers(USER).len(), 2);
        assert_eq!(store.read_race_results(USER, Some("race_8")).len(), 1);
        assert_eq!(store.read_races().len(), 23);

        std::fs::remove_file(&path).unwrap();
    }
    #[test]
    fn test_file_backend_malformed_file() {
        let path = std::env::temp_dir().join(format!(
            "f1mgr_store_test_{}.json",
            generate_id(&mut rand::thread_rng())
        ));
        std::fs::write(&path, "garbage").unwrap();

        let store = KvStore::<FileBackend>::open(&path).unwrap();
        assert!(store.read_team(USER).is_none());

        std::fs::remove_file(&path).unwrap();
    }
}
