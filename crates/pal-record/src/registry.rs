//! # Configuration Registry
//!
//! Maps stable numeric ids (and derived keys) to configuration records.
//! Populated once through [`RegistryBuilder`], then frozen into a
//! [`ConfigRegistry`] that only offers reads, so any number of conformance
//! runs can share it.
//!
//! ## Collision Policy
//!
//! Key derivation is lossy. Registering a second, different message whose
//! key is already taken fails with [`RegistryError::KeyCollision`]; nothing
//! is overwritten. Re-registering the same message under another id is
//! allowed and the key keeps pointing at the first id.

use std::collections::BTreeMap;
use std::path::Path;

use pal_core::{PalError, RegistryError};

use crate::persist::PersistedModule;
use crate::record::ConfigurationRecord;

/// Mutable registry under construction.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    by_id: BTreeMap<u32, ConfigurationRecord>,
    by_key: BTreeMap<String, u32>,
}

impl RegistryBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `record` under `id`.
    pub fn register(&mut self, id: u32, record: ConfigurationRecord) -> Result<(), RegistryError> {
        if self.by_id.contains_key(&id) {
            return Err(RegistryError::DuplicateId(id));
        }
        if let Some(existing) = self.by_key.get(record.key()).and_then(|i| self.by_id.get(i)) {
            if existing.source() != record.source() {
                return Err(RegistryError::KeyCollision {
                    key: record.key().to_string(),
                    existing: existing.source().to_string(),
                    incoming: record.source().to_string(),
                });
            }
        } else {
            self.by_key.insert(record.key().to_string(), id);
        }
        tracing::debug!(id, key = record.key(), "registered configuration");
        self.by_id.insert(id, record);
        Ok(())
    }

    /// Next unused id: one past the highest registered id.
    pub fn next_id(&self) -> u32 {
        self.by_id.keys().next_back().map_or(0, |id| id + 1)
    }

    /// Register every record of a module under consecutive ids, returning
    /// the ids assigned.
    pub fn register_module(&mut self, module: &PersistedModule) -> Result<Vec<u32>, PalError> {
        let mut ids = Vec::new();
        for record in module.to_records()? {
            let id = self.next_id();
            self.register(id, record)?;
            ids.push(id);
        }
        Ok(ids)
    }

    /// Register every `*.json` module in `dir`, in file-name order.
    pub fn register_dir(&mut self, dir: &Path) -> Result<Vec<u32>, PalError> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut ids = Vec::new();
        for path in paths {
            let module = PersistedModule::read(&path)?;
            ids.extend(self.register_module(&module)?);
        }
        Ok(ids)
    }

    /// Freeze into a read-only registry.
    pub fn build(self) -> ConfigRegistry {
        ConfigRegistry {
            by_id: self.by_id,
            by_key: self.by_key,
        }
    }
}

/// Read-only, id- and key-indexed configuration records.
#[derive(Debug, Default)]
pub struct ConfigRegistry {
    by_id: BTreeMap<u32, ConfigurationRecord>,
    by_key: BTreeMap<String, u32>,
}

impl ConfigRegistry {
    /// Record registered under `id`.
    pub fn get(&self, id: u32) -> Result<&ConfigurationRecord, RegistryError> {
        self.by_id
            .get(&id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    /// Record registered under a derived key.
    pub fn get_by_key(&self, key: &str) -> Result<&ConfigurationRecord, RegistryError> {
        self.by_key
            .get(key)
            .and_then(|id| self.by_id.get(id))
            .ok_or_else(|| RegistryError::NotFound(format!("{key:?}")))
    }

    /// Pick the record for a run: a registered id wins, otherwise the
    /// independently supplied record, otherwise not found.
    pub fn resolve<'a>(
        &'a self,
        id: Option<u32>,
        supplied: Option<&'a ConfigurationRecord>,
    ) -> Result<&'a ConfigurationRecord, RegistryError> {
        if let Some(record) = id.and_then(|id| self.by_id.get(&id)) {
            return Ok(record);
        }
        supplied.ok_or_else(|| {
            RegistryError::NotFound(id.map_or_else(|| "(none)".to_string(), |id| id.to_string()))
        })
    }

    /// All records in id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &ConfigurationRecord)> {
        self.by_id.iter().map(|(id, r)| (*id, r))
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the registry holds no records.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::sample_words;
    use pal_core::TargetString;

    fn record(msg: &str) -> ConfigurationRecord {
        ConfigurationRecord::new(TargetString::parse(msg).unwrap(), sample_words(msg.len() as u8))
            .unwrap()
    }

    #[test]
    fn lookup_by_id_and_key() {
        let mut b = RegistryBuilder::new();
        b.register(0, record("Hello World")).unwrap();
        b.register(1, record("Don't Panic")).unwrap();
        let reg = b.build();
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.get(1).unwrap().source().as_str(), "DON'T PANIC");
        assert_eq!(reg.get_by_key("hello_world").unwrap().source().as_str(), "HELLO WORLD");
        assert_eq!(reg.get(7), Err(RegistryError::NotFound("7".to_string())));
        assert!(reg.get_by_key("nope").is_err());
    }

    #[test]
    fn duplicate_id_rejected() {
        let mut b = RegistryBuilder::new();
        b.register(3, record("HI")).unwrap();
        assert_eq!(b.register(3, record("HO")), Err(RegistryError::DuplicateId(3)));
    }

    #[test]
    fn key_collision_rejected_without_overwrite() {
        let mut b = RegistryBuilder::new();
        b.register(0, record("DON'T")).unwrap();
        let err = b.register(1, record("DONT")).unwrap_err();
        assert!(matches!(err, RegistryError::KeyCollision { ref key, .. } if key == "dont"));
        let reg = b.build();
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get_by_key("dont").unwrap().source().as_str(), "DON'T");
    }

    #[test]
    fn same_message_twice_keeps_first_key() {
        let mut b = RegistryBuilder::new();
        b.register(0, record("HI")).unwrap();
        b.register(5, record("HI")).unwrap();
        let reg = b.build();
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.get_by_key("hi").unwrap(), reg.get(0).unwrap());
    }

    #[test]
    fn next_id_follows_highest() {
        let mut b = RegistryBuilder::new();
        assert_eq!(b.next_id(), 0);
        b.register(4, record("HI")).unwrap();
        assert_eq!(b.next_id(), 5);
    }

    #[test]
    fn resolve_prefers_registered_id() {
        let mut b = RegistryBuilder::new();
        b.register(0, record("HELLO")).unwrap();
        let reg = b.build();
        let supplied = record("CUSTOM");

        assert_eq!(reg.resolve(Some(0), Some(&supplied)).unwrap().source().as_str(), "HELLO");
        assert_eq!(reg.resolve(Some(9), Some(&supplied)).unwrap().source().as_str(), "CUSTOM");
        assert_eq!(reg.resolve(None, Some(&supplied)).unwrap().source().as_str(), "CUSTOM");
        assert_eq!(
            reg.resolve(Some(9), None),
            Err(RegistryError::NotFound("9".to_string()))
        );
    }

    #[test]
    fn register_dir_loads_modules_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = PersistedModule::new();
        a.insert(&record("HELLO"));
        a.write(&dir.path().join("a.json")).unwrap();
        let mut b = PersistedModule::new();
        b.insert(&record("NOPE!"));
        b.insert(&record("BYE"));
        b.write(&dir.path().join("b.json")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut builder = RegistryBuilder::new();
        let ids = builder.register_dir(dir.path()).unwrap();
        assert_eq!(ids, vec![0, 1, 2]);
        let reg = builder.build();
        assert_eq!(reg.get(0).unwrap().source().as_str(), "HELLO");
        assert_eq!(reg.get(1).unwrap().source().as_str(), "BYE");
        assert_eq!(reg.get(2).unwrap().source().as_str(), "NOPE!");
    }

    #[test]
    fn register_dir_surfaces_collisions() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = PersistedModule::new();
        a.insert(&record("A B"));
        a.write(&dir.path().join("a.json")).unwrap();
        let mut b = PersistedModule::new();
        b.insert(&record("A_B"));
        b.write(&dir.path().join("b.json")).unwrap();

        let err = RegistryBuilder::new().register_dir(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            PalError::Registry(RegistryError::KeyCollision { .. })
        ));
    }

    #[test]
    fn registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ConfigRegistry>();
    }
}
