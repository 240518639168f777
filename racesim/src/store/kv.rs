use crate::store::records::{Driver, Race, RaceResult, Team};
use crate::store::seed::default_races;
use crate::store::{RaceStore, StoreError};
use anyhow::Context;
use log::{debug, error, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub const TEAM_KEY: &str = "f1_manager_team";
pub const DRIVERS_KEY: &str = "f1_manager_drivers";
pub const RACES_KEY: &str = "f1_manager_races";
pub const RACE_RESULTS_KEY: &str = "f1_manager_race_results";

/// KvBackend is a flat key-value store holding one JSON string per key.
pub trait KvBackend {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: HashMap<String, String>,
}

impl KvBackend for MemoryBackend {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_owned(), value);
        Ok(())
    }
}

/// FileBackend keeps all entries in a single JSON object file. The file is rewritten completely on
/// every set.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileBackend {
    /// open reads the store file. A missing file results in an empty store, a malformed file is
    /// logged and treated as empty as well.
    pub fn open(path: &Path) -> anyhow::Result<FileBackend> {
        let entries = match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(
                        "Store file {} is malformed, starting with empty store: {}",
                        path.display(),
                        e
                    );
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Store file {} does not exist yet", path.display());
                BTreeMap::new()
            }
            Err(e) => {
                return Err(e).context(format!("Failed to read store file {}!", path.display()))
            }
        };

        Ok(FileBackend {
            path: path.to_owned(),
            entries,
        })
    }

    fn flush(&self) -> Result<(), StoreError> {
        let content =
            serde_json::to_string_pretty(&self.entries).map_err(|source| StoreError::Encode {
                key: self.path.display().to_string(),
                source,
            })?;

        // write to a temporary file first such that a crash cannot leave a truncated store behind
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, content)
            .and_then(|_| fs::rename(&tmp_path, &self.path))
            .map_err(|source| StoreError::Io {
                path: self.path.to_owned(),
                source,
            })
    }
}

impl KvBackend for FileBackend {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_owned(), value);
        self.flush()
    }
}

/// KvStore implements the race store on top of a key-value backend. Every record collection is
/// stored as a JSON array under a fixed key.
#[derive(Debug, Clone, Default)]
pub struct KvStore<B: KvBackend> {
    backend: B,
}

impl KvStore<MemoryBackend> {
    pub fn in_memory() -> KvStore<MemoryBackend> {
        KvStore {
            backend: MemoryBackend::default(),
        }
    }
}

impl KvStore<FileBackend> {
    pub fn open(path: &Path) -> anyhow::Result<KvStore<FileBackend>> {
        Ok(KvStore {
            backend: FileBackend::open(path)?,
        })
    }
}

impl<B: KvBackend> KvStore<B> {
    pub fn new(backend: B) -> KvStore<B> {
        KvStore { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// read_collection returns None if the key is absent or its content cannot be decoded.
    fn read_collection<T: DeserializeOwned>(&self, key: &str) -> Option<Vec<T>> {
        let stored = self.backend.get(key)?;

        match serde_json::from_str(&stored) {
            Ok(items) => Some(items),
            Err(e) => {
                warn!("Ignoring malformed record collection {}: {}", key, e);
                None
            }
        }
    }

    fn write_collection<T: Serialize>(&mut self, key: &str, items: &[T]) -> Result<(), StoreError> {
        let value = serde_json::to_string(items).map_err(|source| StoreError::Encode {
            key: key.to_owned(),
            source,
        })?;
        self.backend.set(key, value)
    }

    fn upsert<T, F>(&mut self, key: &str, item: &T, id_of: F) -> Result<(), StoreError>
    where
        T: Serialize + DeserializeOwned + Clone,
        F: Fn(&T) -> &str,
    {
        let mut items: Vec<T> = self.read_collection(key).unwrap_or_default();

        match items.iter().position(|x| id_of(x) == id_of(item)) {
            Some(idx) => items[idx] = item.clone(),
            None => items.push(item.clone()),
        }

        self.write_collection(key, &items)
    }
}

/// timestamp_now returns the current time as RFC 3339 string.
pub fn timestamp_now() -> String {
    humantime::format_rfc3339_millis(SystemTime::now()).to_string()
}

impl<B: KvBackend> RaceStore for KvStore<B> {
    fn read_team(&self, user_id: &str) -> Option<Team> {
        self.read_collection::<Team>(TEAM_KEY)?
            .into_iter()
            .find(|team| team.user_id == user_id)
    }

    fn write_team(&mut self, team: &Team) -> Result<(), StoreError> {
        let mut team = team.clone();
        team.updated_at = timestamp_now();
        self.upsert(TEAM_KEY, &team, |x: &Team| x.id.as_str())
    }

    fn read_drivers(&self, user_id: &str) -> Vec<Driver> {
        self.read_collection::<Driver>(DRIVERS_KEY)
            .unwrap_or_default()
            .into_iter()
            .filter(|driver| driver.user_id == user_id)
            .collect()
    }

    fn write_driver(&mut self, driver: &Driver) -> Result<(), StoreError> {
        self.upsert(DRIVERS_KEY, driver, |x: &Driver| x.id.as_str())
    }

    fn read_races(&mut self) -> Vec<Race> {
        if let Some(races) = self.read_collection(RACES_KEY) {
            return races;
        }

        let races = default_races();
        if let Err(e) = self.write_collection(RACES_KEY, &races) {
            error!("Failed to store default season calendar: {:#}", anyhow::Error::new(e));
        }
        races
    }

    fn write_race(&mut self, race: &Race) -> Result<(), StoreError> {
        // make sure that the calendar is seeded before a single race is written
        let _ = self.read_races();
        self.upsert(RACES_KEY, race, |x: &Race| x.id.as_str())
    }

    fn append_race_result(&mut self, result: &RaceResult) -> Result<(), StoreError> {
        let mut results: Vec<RaceResult> = self
            .read_collection(RACE_RESULTS_KEY)
            .unwrap_or_default();
        results.push(result.clone());
        self.write_collection(RACE_RESULTS_KEY, &results)
    }

    fn read_race_results(&self, user_id: &str, race_id: Option<&str>) -> Vec<RaceResult> {
        self.read_collection::<RaceResult>(RACE_RESULTS_KEY)
            .unwrap_or_default()
            .into_iter()
            .filter(|result| result.user_id == user_id)
            .filter(|result| race_id.map_or(true, |id| result.race_id == id))
            .collect()
    }
}
