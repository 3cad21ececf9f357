//! # Persisted Configuration Modules
//!
//! The interchange format between a compile session and later programming
//! or testing sessions. One JSON document holds any number of accessors,
//! each named `<key>_config`:
//!
//! ```json
//! {
//!   "records": {
//!     "hello_config": { "msg": "HELLO", "prog": [31, 0, ...] }
//!   }
//! }
//! ```
//!
//! Loading re-validates every entry: the message must still compile and the
//! program must hold exactly one configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use pal_core::{ConfigWord, RecordError, TargetString};
use serde::{Deserialize, Serialize};

use crate::record::ConfigurationRecord;

/// One accessor's payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedRecord {
    /// Uppercased source string.
    pub msg: String,
    /// Configuration words.
    pub prog: Vec<ConfigWord>,
}

/// A persisted module: accessor name → record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedModule {
    /// Entries, ordered by accessor name.
    pub records: BTreeMap<String, PersistedRecord>,
}

impl PersistedModule {
    /// An empty module.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the accessor for `record`, returning its name.
    pub fn insert(&mut self, record: &ConfigurationRecord) -> String {
        let name = record.accessor_name();
        self.records.insert(
            name.clone(),
            PersistedRecord {
                msg: record.source().as_str().to_string(),
                prog: record.words().to_vec(),
            },
        );
        name
    }

    /// Rebuild the record behind accessor `name`, if present.
    pub fn get(&self, name: &str) -> Option<Result<ConfigurationRecord, RecordError>> {
        self.records.get(name).map(to_record)
    }

    /// Rebuild and validate every record, in accessor-name order.
    pub fn to_records(&self) -> Result<Vec<ConfigurationRecord>, RecordError> {
        self.records.values().map(to_record).collect()
    }

    /// Read a module from disk.
    pub fn read(path: &Path) -> Result<Self, RecordError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| RecordError::Persist(format!("cannot read {}: {e}", path.display())))?;
        serde_json::from_str(&text)
            .map_err(|e| RecordError::Persist(format!("cannot parse {}: {e}", path.display())))
    }

    /// Write the module to disk as pretty-printed JSON.
    pub fn write(&self, path: &Path) -> Result<(), RecordError> {
        let mut text = serde_json::to_string_pretty(self)
            .map_err(|e| RecordError::Persist(e.to_string()))?;
        text.push('\n');
        std::fs::write(path, text)
            .map_err(|e| RecordError::Persist(format!("cannot write {}: {e}", path.display())))?;
        tracing::info!(path = %path.display(), accessors = self.records.len(), "wrote persisted module");
        Ok(())
    }
}

fn to_record(entry: &PersistedRecord) -> Result<ConfigurationRecord, RecordError> {
    let source = TargetString::parse(&entry.msg)?;
    ConfigurationRecord::new(source, entry.prog.clone())
}

/// Where the module for an equation file is written: same stem, `.json`.
pub fn module_path_for(equations: &Path) -> PathBuf {
    equations.with_extension("json")
}
