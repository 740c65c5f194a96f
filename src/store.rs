//! Write-through in-memory stores over the delimited-record files.
//!
//! Each store rebuilds its cache by a full scan at load time and only
//! updates memory after the durable write has succeeded, so the cache never
//! gets ahead of the file.

use anyhow::Result;
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

use crate::event::Event;
use crate::recurrence::RecurrenceRule;
use crate::reminder::ReminderConfig;
use crate::storage::CsvStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("event id {0} is already present")]
    InvalidState(u32),
    #[error("event id {0} not found")]
    NotFound(u32),
    #[error(transparent)]
    Persistence(#[from] anyhow::Error),
}

/// Canonical set of base events plus the id sequence.
pub struct EventStore {
    files: Arc<CsvStore>,
    cache: HashMap<u32, Event>,
    next_id: u32,
}

impl EventStore {
    pub fn load(files: Arc<CsvStore>) -> Result<Self> {
        let mut cache = HashMap::new();
        for event in files.read_all::<Event>()? {
            // Duplicate ids in a hand-edited file: last one wins.
            cache.insert(event.id, event);
        }
        let next_id = cache.keys().max().copied().unwrap_or(0) + 1;
        debug!("Loaded {} events, next id {}", cache.len(), next_id);
        Ok(Self { files, cache, next_id })
    }

    /// Monotonic id sequence seeded from `max(existing ids) + 1`. Every
    /// call advances the counter, so consecutive calls yield distinct ids
    /// even before either is committed.
    pub fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn insert(&mut self, event: Event) -> Result<(), StoreError> {
        if self.cache.contains_key(&event.id) {
            return Err(StoreError::InvalidState(event.id));
        }
        self.files.append_one(&event)?;
        if event.id >= self.next_id {
            self.next_id = event.id + 1;
        }
        self.cache.insert(event.id, event);
        Ok(())
    }

    pub fn replace(&mut self, event: Event) -> Result<(), StoreError> {
        if !self.cache.contains_key(&event.id) {
            return Err(StoreError::NotFound(event.id));
        }
        let mut all: Vec<Event> = self
            .cache
            .values()
            .map(|e| if e.id == event.id { event.clone() } else { e.clone() })
            .collect();
        all.sort_by_key(|e| e.id);
        self.files.rewrite_all(&all)?;
        self.cache.insert(event.id, event);
        Ok(())
    }

    pub fn delete(&mut self, id: u32) -> Result<bool, StoreError> {
        if !self.cache.contains_key(&id) {
            return Ok(false);
        }
        self.files.delete_by_id::<Event>(id)?;
        self.cache.remove(&id);
        Ok(true)
    }

    pub fn get(&self, id: u32) -> Option<&Event> {
        self.cache.get(&id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.cache.contains_key(&id)
    }

    pub fn all(&self) -> Vec<Event> {
        self.cache.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

/// At most one recurrence rule per base event id.
pub struct RuleStore {
    files: Arc<CsvStore>,
    cache: HashMap<u32, RecurrenceRule>,
}

impl RuleStore {
    pub fn load(files: Arc<CsvStore>) -> Result<Self> {
        let mut cache = HashMap::new();
        for rule in files.read_all::<RecurrenceRule>()? {
            cache.insert(rule.event_id, rule);
        }
        Ok(Self { files, cache })
    }

    pub fn set(&mut self, rule: RecurrenceRule) -> Result<()> {
        self.files.delete_by_id::<RecurrenceRule>(rule.event_id)?;
        self.files.append_one(&rule)?;
        self.cache.insert(rule.event_id, rule);
        Ok(())
    }

    pub fn remove(&mut self, event_id: u32) -> Result<()> {
        self.files.delete_by_id::<RecurrenceRule>(event_id)?;
        self.cache.remove(&event_id);
        Ok(())
    }

    pub fn get(&self, event_id: u32) -> Option<&RecurrenceRule> {
        self.cache.get(&event_id)
    }
}

/// At most one reminder configuration per base event id.
pub struct ReminderStore {
    files: Arc<CsvStore>,
    cache: HashMap<u32, ReminderConfig>,
}

impl ReminderStore {
    pub fn load(files: Arc<CsvStore>) -> Result<Self> {
        let mut cache = HashMap::new();
        for config in files.read_all::<ReminderConfig>()? {
            cache.insert(config.event_id, config);
        }
        Ok(Self { files, cache })
    }

    pub fn set(&mut self, config: ReminderConfig) -> Result<()> {
        self.files.delete_by_id::<ReminderConfig>(config.event_id)?;
        self.files.append_one(&config)?;
        self.cache.insert(config.event_id, config);
        Ok(())
    }

    pub fn remove(&mut self, event_id: u32) -> Result<()> {
        self.files.delete_by_id::<ReminderConfig>(event_id)?;
        self.cache.remove(&event_id);
        Ok(())
    }

    pub fn get(&self, event_id: u32) -> Option<&ReminderConfig> {
        self.cache.get(&event_id)
    }

    pub fn all(&self) -> Vec<ReminderConfig> {
        self.cache.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::parse_datetime;
    use tempfile::tempdir;

    fn event(title: &str) -> Event {
        Event::new(
            title,
            parse_datetime("2026-01-10 09:00").unwrap(),
            parse_datetime("2026-01-10 10:00").unwrap(),
        )
    }

    #[test]
    fn test_next_id_is_monotonic_without_insert() -> Result<()> {
        let dir = tempdir()?;
        let files = Arc::new(CsvStore::at(dir.path())?);
        let mut store = EventStore::load(files)?;

        let a = store.next_id();
        let b = store.next_id();
        assert_eq!(a, 1);
        assert_eq!(b, 2);
        Ok(())
    }

    #[test]
    fn test_next_id_survives_reload() -> Result<()> {
        let dir = tempdir()?;
        let files = Arc::new(CsvStore::at(dir.path())?);

        let mut store = EventStore::load(files.clone())?;
        let mut e = event("First");
        e.id = store.next_id();
        store.insert(e)?;
        let mut e = event("Second");
        e.id = store.next_id();
        store.insert(e)?;

        // Fresh load from the same files must continue the sequence.
        let mut reloaded = EventStore::load(files)?;
        assert_eq!(reloaded.next_id(), 3);
        Ok(())
    }

    #[test]
    fn test_insert_duplicate_id_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        let files = Arc::new(CsvStore::at(dir.path())?);
        let mut store = EventStore::load(files)?;

        let mut e = event("First");
        e.id = 1;
        store.insert(e.clone())?;
        assert!(matches!(store.insert(e), Err(StoreError::InvalidState(1))));
        Ok(())
    }

    #[test]
    fn test_replace_missing_id_is_not_found() -> Result<()> {
        let dir = tempdir()?;
        let files = Arc::new(CsvStore::at(dir.path())?);
        let mut store = EventStore::load(files)?;

        let mut e = event("Ghost");
        e.id = 42;
        assert!(matches!(store.replace(e), Err(StoreError::NotFound(42))));
        Ok(())
    }

    #[test]
    fn test_delete_reports_removal() -> Result<()> {
        let dir = tempdir()?;
        let files = Arc::new(CsvStore::at(dir.path())?);
        let mut store = EventStore::load(files)?;

        let mut e = event("Doomed");
        e.id = 1;
        store.insert(e)?;
        assert!(store.delete(1)?);
        assert!(!store.delete(1)?);
        assert!(store.is_empty());
        Ok(())
    }

    #[test]
    fn test_rule_store_replaces_in_place() -> Result<()> {
        let dir = tempdir()?;
        let files = Arc::new(CsvStore::at(dir.path())?);
        let mut rules = RuleStore::load(files.clone())?;

        let mut rule = RecurrenceRule::every("1d").times(3);
        rule.event_id = 1;
        rules.set(rule)?;
        let mut rule = RecurrenceRule::every("1w").times(2);
        rule.event_id = 1;
        rules.set(rule)?;

        assert_eq!(rules.get(1).map(|r| r.interval.as_str()), Some("1w"));

        // Only one record on disk after the in-place replacement.
        let on_disk: Vec<RecurrenceRule> = files.read_all()?;
        assert_eq!(on_disk.len(), 1);
        Ok(())
    }
}
