use crate::core::laptime::LaptimePars;
use crate::core::race::RacePars;
use crate::core::scheduler::SchedulerPars;
use crate::core::tireset::TyrePars;
use anyhow::Context;
use serde::Deserialize;
use std::fs::OpenOptions;
use std::path::Path;

/// SimPars is used to store all other parameter structs. Every parameter that is missing in the
/// parameter file keeps its default value.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct SimPars {
    pub race_pars: RacePars,
    pub tyre_pars: TyrePars,
    pub laptime_pars: LaptimePars,
    pub scheduler_pars: SchedulerPars,
}

/// read_sim_pars reads the JSON file and decodes the JSON string into the simulation parameters
/// struct.
pub fn read_sim_pars(filepath: &Path) -> anyhow::Result<SimPars> {
    // open file
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!(
            "Failed to open parameter file {}!",
            filepath.display()
        ))?;

    // read and parse parameter file content
    let pars = serde_json::from_reader(&fh).context(format!(
        "Failed to parse parameter file {}!",
        filepath.display()
    ))?;
    Ok(pars)
}
