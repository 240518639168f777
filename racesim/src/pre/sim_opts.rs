use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[clap(
    version = "0.1.0",
    author = "Alexander Heilmeier <alexander.heilmeier@tum.de>",
    name = "f1mgr",
    about = "Race weekend simulator of an F1 team manager game"
)]
pub struct SimOpts {
    // FLAGS ---------------------------------------------------------------------------------------
    /// Activate debug logging
    #[clap(short, long)]
    pub debug: bool,

    /// Control the race interactively in real-time (commands are read from stdin)
    #[clap(short, long)]
    pub realtime: bool,

    // OPTIONS -------------------------------------------------------------------------------------
    /// Set the user whose team is simulated
    #[clap(short, long, default_value = "local")]
    pub user_id: String,

    /// Set path to the JSON store file holding teams, drivers, races, and results
    #[clap(short, long, value_parser, default_value = "f1_manager_store.json")]
    pub store_path: PathBuf,

    /// Set path to an optional simulation parameter file (defaults are used otherwise)
    #[clap(short, long, value_parser)]
    pub parfile_path: Option<PathBuf>,

    /// Set seed of the random number generator (drawn from entropy if not set)
    #[clap(long)]
    pub seed: Option<u64>,

    /// Set race speed multiplier for the real-time simulation (1, 2, or 4)
    #[clap(long, default_value = "1")]
    pub speed: u32,

    /// Set number of simulation runs (results are only stored in case of a single run)
    #[clap(short, long, default_value = "1")]
    pub no_sim_runs: u32,
}
