use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::warn;

use crate::error::RecordError;
use crate::request::CheckRunId;

/// Check run ids published so far in one build, keyed by check name
///
/// Entries are only ever added; a name keeps the first id recorded for it.
pub trait PublishRecord: Send {
    /// Id of the check run already published under `name`
    fn get_id(&self, name: &str) -> Option<CheckRunId>;

    /// Record `id` under `name` unless the name is already known
    ///
    /// Returns `true` when a new entry was added.
    fn add_if_missing(&mut self, name: &str, id: CheckRunId) -> Result<bool, RecordError>;
}

/// Publish record living for the duration of the process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryPublishRecord {
    entries: BTreeMap<String, CheckRunId>,
}

impl InMemoryPublishRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &BTreeMap<String, CheckRunId> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PublishRecord for InMemoryPublishRecord {
    fn get_id(&self, name: &str) -> Option<CheckRunId> {
        self.entries.get(name).copied()
    }

    fn add_if_missing(&mut self, name: &str, id: CheckRunId) -> Result<bool, RecordError> {
        if self.entries.contains_key(name) {
            return Ok(false);
        }
        self.entries.insert(name.to_string(), id);
        Ok(true)
    }
}

/// Publish record persisted as JSON so separate invocations within one
/// build share it
#[derive(Debug, Clone)]
pub struct JsonFilePublishRecord {
    path: PathBuf,
    entries: BTreeMap<String, CheckRunId>,
}

impl JsonFilePublishRecord {
    /// Load the record at `path`, starting empty if the file does not exist
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RecordError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, entries })
    }

    /// Like [`open`](Self::open), but an unreadable record is logged and
    /// replaced by an empty one
    ///
    /// Names recorded in the lost file get a new check run on their next
    /// publish.
    pub fn open_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::open(path).unwrap_or_else(|e| {
            warn!(
                "Ignoring unreadable publish record {}: {}",
                path.display(),
                e
            );
            Self {
                path: path.to_path_buf(),
                entries: BTreeMap::new(),
            }
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &BTreeMap<String, CheckRunId> {
        &self.entries
    }

    /// Write to a temporary sibling, then rename over the record
    fn save(&self) -> Result<(), RecordError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut file = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut file, &self.entries)?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl PublishRecord for JsonFilePublishRecord {
    fn get_id(&self, name: &str) -> Option<CheckRunId> {
        self.entries.get(name).copied()
    }

    fn add_if_missing(&mut self, name: &str, id: CheckRunId) -> Result<bool, RecordError> {
        if self.entries.contains_key(name) {
            return Ok(false);
        }
        self.entries.insert(name.to_string(), id);
        self.save()?;
        Ok(true)
    }
}
