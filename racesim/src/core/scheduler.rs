use crate::core::race::RaceSpeed;
use crate::core::simulator::Simulator;
use crate::interfaces::ui_interface::RaceState;
use crate::store::RaceStore;
use anyhow::anyhow;
use flume::{Receiver, RecvTimeoutError, Sender};
use log::{debug, warn};
use serde::Deserialize;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// * `t_tick_base_ms` - (ms) Real time between two ticks at 1x race speed
/// * `t_pit_stop_ms` - (ms) Real time a driver stays in the pits
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SchedulerPars {
    pub t_tick_base_ms: u64,
    pub t_pit_stop_ms: u64,
}

impl Default for SchedulerPars {
    fn default() -> Self {
        SchedulerPars {
            t_tick_base_ms: 3000,
            t_pit_stop_ms: 3000,
        }
    }
}

impl SchedulerPars {
    pub fn tick_interval(&self, speed: RaceSpeed) -> Duration {
        speed.tick_interval(Duration::from_millis(self.t_tick_base_ms))
    }

    pub fn pit_stop_duration(&self) -> Duration {
        Duration::from_millis(self.t_pit_stop_ms)
    }
}

/// Command contains the commands that a front end can send to a running race.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Pause,
    Resume,
    Reset,
    SetSpeed(RaceSpeed),
    PitStop(String),
    ApplyStrategy {
        driver_id: String,
        strategy_id: String,
    },
    Shutdown,
}

/// SchedulerHandle is returned when a race scheduler is spawned. The simulator is handed back on
/// shutdown.
pub struct SchedulerHandle<S: RaceStore> {
    tx: Sender<Command>,
    thread: JoinHandle<Simulator<S>>,
}

impl<S: RaceStore> SchedulerHandle<S> {
    pub fn send(&self, command: Command) -> anyhow::Result<()> {
        self.tx
            .send(command)
            .map_err(|_| anyhow!("Race scheduler is not running anymore!"))
    }

    /// command_sender returns a sender that can be moved into other threads, e.g. an input reader.
    pub fn command_sender(&self) -> Sender<Command> {
        self.tx.clone()
    }

    /// shutdown stops the scheduler thread and returns the simulator.
    pub fn shutdown(self) -> anyhow::Result<Simulator<S>> {
        // the thread may already have stopped if all senders were dropped
        let _ = self.tx.send(Command::Shutdown);
        self.thread
            .join()
            .map_err(|_| anyhow!("Race scheduler thread panicked!"))
    }
}

/// spawn_scheduler moves the simulator into a separate thread that ticks the race in real time
/// while it is running. A snapshot of the race is sent to tx_state (if inserted) after every tick
/// and every command.
pub fn spawn_scheduler<S>(
    simulator: Simulator<S>,
    scheduler_pars: SchedulerPars,
    tx_state: Option<Sender<RaceState>>,
) -> SchedulerHandle<S>
where
    S: RaceStore + Send + 'static,
{
    let (tx, rx) = flume::unbounded();

    let scheduler = RaceScheduler {
        simulator,
        scheduler_pars,
        tx_state,
        next_tick: None,
        pit_releases: vec![],
    };
    let thread = thread::spawn(move || scheduler.run(rx));

    SchedulerHandle { tx, thread }
}

/// RaceScheduler is the repeating timer of a race. The next tick is only scheduled while the
/// session is ticking, i.e. pausing drops it and resuming schedules a new one a full interval
/// later. Pit releases run on their own deadlines, independent of the tick cadence.
struct RaceScheduler<S: RaceStore> {
    simulator: Simulator<S>,
    scheduler_pars: SchedulerPars,
    tx_state: Option<Sender<RaceState>>,
    next_tick: Option<Instant>,
    pit_releases: Vec<(Instant, String)>,
}

impl<S: RaceStore> RaceScheduler<S> {
    fn run(mut self, rx: Receiver<Command>) -> Simulator<S> {
        self.publish();

        loop {
            let received = match self.get_next_deadline() {
                Some(deadline) => rx.recv_deadline(deadline),
                None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };

            match received {
                Ok(Command::Shutdown) => break,
                Ok(command) => self.handle_command(command),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    debug!("All command senders were dropped, stopping race scheduler");
                    break;
                }
            }

            self.handle_due_timers(Instant::now());
        }

        self.simulator
    }

    fn handle_command(&mut self, command: Command) {
        let was_ticking = self.simulator.session().is_ticking();
        let mut speed_changed = false;

        let result = match command {
            Command::Start => self.simulator.start(),
            Command::Pause => self.simulator.pause(),
            Command::Resume => self.simulator.resume(),
            Command::Reset => {
                self.simulator.reset();
                self.pit_releases.clear();
                Ok(())
            }
            Command::SetSpeed(speed) => {
                speed_changed = speed != self.simulator.session().speed;
                self.simulator.set_speed(speed);
                Ok(())
            }
            Command::PitStop(driver_id) => {
                self.simulator.pit_stop(&driver_id).map(|_| {
                    let release = Instant::now() + self.scheduler_pars.pit_stop_duration();
                    self.pit_releases.push((release, driver_id));
                })
            }
            Command::ApplyStrategy {
                driver_id,
                strategy_id,
            } => self
                .simulator
                .apply_strategy(&driver_id, &strategy_id)
                .map(|_| ()),
            Command::Shutdown => Ok(()),
        };

        if let Err(e) = result {
            warn!("Command rejected: {}", e)
        }

        // (re)schedule the next tick
        if !self.simulator.session().is_ticking() {
            self.next_tick = None;
        } else if !was_ticking || speed_changed || self.next_tick.is_none() {
            self.next_tick = Some(Instant::now() + self.get_tick_interval());
        }

        self.publish();
    }

    fn handle_due_timers(&mut self, now: Instant) {
        let mut changed = false;

        // release drivers whose pit stop is over
        let (due, pending): (Vec<_>, Vec<_>) = self
            .pit_releases
            .drain(..)
            .partition(|(release, _)| *release <= now);
        self.pit_releases = pending;

        for (_, driver_id) in due {
            changed |= self.simulator.release_from_pits(&driver_id);
        }

        // tick the race
        if let Some(t_tick) = self.next_tick {
            if t_tick <= now {
                self.simulator.tick();
                changed = true;

                self.next_tick = if self.simulator.session().is_ticking() {
                    Some(t_tick + self.get_tick_interval())
                } else {
                    None
                };
            }
        }

        if changed {
            self.publish()
        }
    }

    fn get_next_deadline(&self) -> Option<Instant> {
        self.pit_releases
            .iter()
            .map(|(release, _)| *release)
            .chain(self.next_tick)
            .min()
    }

    fn get_tick_interval(&self) -> Duration {
        self.scheduler_pars
            .tick_interval(self.simulator.session().speed)
    }

    fn publish(&mut self) {
        if let Some(tx_state) = self.tx_state.as_ref() {
            if tx_state
                .send(RaceState::from(self.simulator.session()))
                .is_err()
            {
                debug!("Front end stopped listening, race states are not sent anymore");
                self.tx_state = None;
            }
        }
    }
}
