//! Reminder configuration and the due-reminder evaluator.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::event::Event;

pub const DEFAULT_LEAD_MINUTES: i64 = 30;

/// At most one reminder per base event id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    pub event_id: u32,
    pub lead_minutes: i64,
    pub enabled: bool,
}

impl ReminderConfig {
    pub fn new(event_id: u32) -> Self {
        Self { event_id, lead_minutes: DEFAULT_LEAD_MINUTES, enabled: true }
    }

    pub fn with_lead(mut self, minutes: i64) -> Self {
        self.lead_minutes = minutes.max(0);
        self
    }
}

/// Compute the reminders due at `now`.
///
/// A reminder is due inside the window `[start - lead, start)`: it becomes
/// due exactly at the lead boundary and stops being due once the event
/// starts. Only base events are considered — recurrence occurrences do not
/// get independent reminders.
pub fn due_reminders(now: NaiveDateTime, events: &[Event], configs: &[ReminderConfig]) -> Vec<String> {
    let mut messages = Vec::new();

    for event in events {
        let config = match configs.iter().find(|c| c.event_id == event.id) {
            Some(c) if c.enabled => c,
            _ => continue,
        };
        let start = match event.start {
            Some(s) => s,
            None => continue,
        };

        let remind_at = start - Duration::minutes(config.lead_minutes);
        if now >= remind_at && now < start {
            let minutes_left = (start - now).num_minutes().max(0);
            messages.push(format!(
                "Your next event is coming up in {} minutes: {}",
                minutes_left, event.title
            ));
        }
    }
    messages
}
