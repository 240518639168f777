pub mod kv;
pub mod records;
pub mod seed;

use crate::store::records::{Driver, Race, RaceResult, RaceStatus, Team};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to encode record collection {key}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to write store file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// RaceStore is the persistence collaborator of the race simulator. Reading never fails: absent
/// or malformed records are treated as no data. Writes of records with an already known id
/// replace the stored record, otherwise the record is appended.
pub trait RaceStore {
    fn read_team(&self, user_id: &str) -> Option<Team>;

    fn write_team(&mut self, team: &Team) -> Result<(), StoreError>;

    fn read_drivers(&self, user_id: &str) -> Vec<Driver>;

    fn write_driver(&mut self, driver: &Driver) -> Result<(), StoreError>;

    /// read_races returns the season calendar. The default calendar is stored on first access.
    fn read_races(&mut self) -> Vec<Race>;

    fn write_race(&mut self, race: &Race) -> Result<(), StoreError>;

    fn append_race_result(&mut self, result: &RaceResult) -> Result<(), StoreError>;

    fn read_race_results(&self, user_id: &str, race_id: Option<&str>) -> Vec<RaceResult>;

    /// read_active_race returns the first active race, else the first upcoming race.
    fn read_active_race(&mut self) -> Option<Race> {
        let races = self.read_races();

        races
            .iter()
            .find(|race| race.status == RaceStatus::Active)
            .or_else(|| {
                races
                    .iter()
                    .find(|race| race.status == RaceStatus::Upcoming)
            })
            .cloned()
    }
}
