//! The scheduling engine: create/update/delete with validation and
//! conflict checking, plus the expanded read model every consumer uses.

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::conflict::find_conflicts;
use crate::event::Event;
use crate::recurrence::{self, RecurrenceRule};
use crate::reminder::{self, ReminderConfig};
use crate::storage::CsvStore;
use crate::store::{EventStore, ReminderStore, RuleStore, StoreError};
use crate::validation::validate_event;

/// Error taxonomy for scheduling operations.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("invalid event: {0}")]
    Validation(String),
    #[error("event overlaps {} existing event(s)", .0.len())]
    Conflict(Vec<Event>),
    #[error("event id {0} not found")]
    NotFound(u32),
    #[error("persistence failure: {0}")]
    Persistence(#[from] anyhow::Error),
}

impl From<StoreError> for ScheduleError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidState(id) => {
                ScheduleError::Validation(format!("event id {} is already present", id))
            }
            StoreError::NotFound(id) => ScheduleError::NotFound(id),
            StoreError::Persistence(e) => ScheduleError::Persistence(e),
        }
    }
}

struct SchedulerState {
    events: EventStore,
    rules: RuleStore,
    reminders: ReminderStore,
}

impl SchedulerState {
    /// Base events plus all recurrence-generated occurrences, sorted by
    /// (start, id) so queries see a stable order.
    fn expanded(&self) -> Vec<Event> {
        let bases = self.events.all();
        let mut expanded = bases.clone();
        for base in &bases {
            if let Some(rule) = self.rules.get(base.id) {
                expanded.extend(recurrence::expand(base, rule));
            }
        }
        expanded.sort_by_key(|e| (e.start, e.id));
        expanded
    }
}

/// Orchestrates the stores behind a single lock: mutations are serialized
/// and reads snapshot under the same lock, so a reminder poll on a timer
/// thread never observes a torn write.
pub struct Scheduler {
    state: Mutex<SchedulerState>,
}

impl Scheduler {
    /// Open the scheduler over the default data directory (`~/.datebook`).
    pub fn new() -> Result<Self> {
        Self::with_store(CsvStore::new()?)
    }

    /// Open the scheduler over an explicit data directory.
    pub fn open(dir: &Path) -> Result<Self> {
        Self::with_store(CsvStore::at(dir)?)
    }

    fn with_store(files: CsvStore) -> Result<Self> {
        let files = Arc::new(files);
        let state = SchedulerState {
            events: EventStore::load(files.clone())?,
            rules: RuleStore::load(files.clone())?,
            reminders: ReminderStore::load(files)?,
        };
        Ok(Self { state: Mutex::new(state) })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SchedulerState> {
        // A panic mid-operation cannot leave the state torn: the stores
        // write durably before touching their caches, so a poisoned lock
        // still guards a usable state.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Create a new event, optionally with a recurrence rule. Nothing is
    /// persisted unless validation and the conflict check both pass.
    /// Returns the assigned id.
    pub fn create_event(
        &self,
        mut event: Event,
        rule: Option<RecurrenceRule>,
    ) -> Result<u32, ScheduleError> {
        let mut state = self.lock();

        if let Some(reason) = validate_event(&event) {
            return Err(ScheduleError::Validation(reason));
        }
        let conflicts = find_conflicts(&event, 0, &state.expanded());
        if !conflicts.is_empty() {
            debug!("Create of '{}' conflicts with {} event(s)", event.title, conflicts.len());
            return Err(ScheduleError::Conflict(conflicts));
        }

        if event.id == 0 {
            event.id = state.events.next_id();
        }
        let id = event.id;
        state.events.insert(event)?;

        if let Some(mut rule) = rule {
            if rule.enabled() {
                rule.event_id = id;
                state.rules.set(rule)?;
            }
        }
        info!("Created event {}", id);
        Ok(id)
    }

    /// Replace a stored event wholesale. The conflict check excludes the
    /// event's own id, so it may always keep its current slot. The stored
    /// recurrence rule is replaced when an enabled rule is supplied and
    /// removed otherwise.
    pub fn update_event(
        &self,
        event: Event,
        rule: Option<RecurrenceRule>,
    ) -> Result<(), ScheduleError> {
        let mut state = self.lock();

        if let Some(reason) = validate_event(&event) {
            return Err(ScheduleError::Validation(reason));
        }
        if event.id == 0 {
            return Err(ScheduleError::Validation("update requires a positive event id".into()));
        }
        if !state.events.contains(event.id) {
            return Err(ScheduleError::NotFound(event.id));
        }
        let conflicts = find_conflicts(&event, event.id, &state.expanded());
        if !conflicts.is_empty() {
            return Err(ScheduleError::Conflict(conflicts));
        }

        let id = event.id;
        state.events.replace(event)?;
        match rule {
            Some(mut rule) if rule.enabled() => {
                rule.event_id = id;
                state.rules.set(rule)?;
            }
            _ => state.rules.remove(id)?,
        }
        info!("Updated event {}", id);
        Ok(())
    }

    /// Remove a base event, cascading to its recurrence rule and reminder
    /// configuration. Deleting an unknown id reports not-found.
    pub fn delete_event(&self, id: u32) -> Result<(), ScheduleError> {
        let mut state = self.lock();

        if id == 0 {
            return Err(ScheduleError::Validation("delete requires a positive event id".into()));
        }
        if !state.events.delete(id)? {
            return Err(ScheduleError::NotFound(id));
        }
        state.rules.remove(id)?;
        state.reminders.remove(id)?;
        info!("Deleted event {}", id);
        Ok(())
    }

    /// The read model: base events plus all generated occurrences.
    pub fn expanded_events(&self) -> Vec<Event> {
        self.lock().expanded()
    }

    /// Base events only, without occurrences.
    pub fn base_events(&self) -> Vec<Event> {
        let mut events = self.lock().events.all();
        events.sort_by_key(|e| e.id);
        events
    }

    pub fn get_event(&self, id: u32) -> Option<Event> {
        self.lock().events.get(id).cloned()
    }

    /// Expanded events whose start falls on the given date.
    pub fn events_on_date(&self, date: NaiveDate) -> Vec<Event> {
        self.lock()
            .expanded()
            .into_iter()
            .filter(|e| e.start_date() == Some(date))
            .collect()
    }

    pub fn rule_for(&self, event_id: u32) -> Option<RecurrenceRule> {
        self.lock().rules.get(event_id).cloned()
    }

    /// Attach or replace a reminder configuration. The target event must
    /// exist.
    pub fn set_reminder(&self, config: ReminderConfig) -> Result<(), ScheduleError> {
        let mut state = self.lock();
        if config.event_id == 0 {
            return Err(ScheduleError::Validation("reminder requires a positive event id".into()));
        }
        if !state.events.contains(config.event_id) {
            return Err(ScheduleError::NotFound(config.event_id));
        }
        state.reminders.set(config)?;
        Ok(())
    }

    pub fn disable_reminder(&self, event_id: u32) -> Result<(), ScheduleError> {
        let mut state = self.lock();
        let mut config = match state.reminders.get(event_id) {
            Some(c) => c.clone(),
            None => return Err(ScheduleError::NotFound(event_id)),
        };
        config.enabled = false;
        state.reminders.set(config)?;
        Ok(())
    }

    pub fn reminder_for(&self, event_id: u32) -> Option<ReminderConfig> {
        self.lock().reminders.get(event_id).cloned()
    }

    /// Reminders due at `now`, over base events only.
    pub fn due_reminders(&self, now: NaiveDateTime) -> Vec<String> {
        let state = self.lock();
        reminder::due_reminders(now, &state.events.all(), &state.reminders.all())
    }
}
