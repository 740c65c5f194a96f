//! Recurrence rules and their expansion into concrete occurrences.
//!
//! Expansion is a pure function: the generated occurrences share the base
//! event's id, are never persisted, and regenerating from the same inputs
//! always yields the same sequence.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::event::Event;

static INTERVAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)([dw])$").unwrap());

/// Upper bound on a single step, in days. Ten years between occurrences is
/// already nonsense input; anything above it would also risk arithmetic
/// overflow when the step is multiplied out.
pub const MAX_STEP_DAYS: i64 = 3650;

/// At most one rule per base event id.
///
/// `count` wins over `end_date` when both are set: a positive `count`
/// generates exactly that many occurrences total (the base included),
/// otherwise generation continues while the shifted start date stays on or
/// before `end_date`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub event_id: u32,
    pub interval: String,
    pub count: u32,
    pub end_date: Option<NaiveDate>,
}

impl RecurrenceRule {
    pub fn every(interval: &str) -> Self {
        Self { interval: interval.to_string(), ..Default::default() }
    }

    pub fn times(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn until(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn enabled(&self) -> bool {
        !self.interval.trim().is_empty()
    }
}

/// Parse an interval token to a step in days: "Nd" is N days, "Nw" is 7*N
/// days. Anything else is rejected, unknown tokens do not fall back to
/// daily, they simply generate nothing. Steps above [`MAX_STEP_DAYS`] are
/// rejected the same way.
pub fn parse_interval_days(interval: &str) -> Option<i64> {
    let token = interval.trim().to_lowercase();
    let caps = INTERVAL_RE.captures(&token)?;
    let n: i64 = caps[1].parse().ok()?;
    if n <= 0 {
        return None;
    }
    let days = match &caps[2] {
        "d" => n,
        "w" => n.checked_mul(7)?,
        _ => return None,
    };
    if days > MAX_STEP_DAYS {
        return None;
    }
    Some(days)
}

/// Generate the recurrence occurrences for `base` under `rule`.
///
/// The base event itself is occurrence zero and is not included in the
/// returned list. Returns an empty list when the rule is disabled, the base
/// timestamps are missing, or the interval does not parse.
pub fn expand(base: &Event, rule: &RecurrenceRule) -> Vec<Event> {
    let mut occurrences = Vec::new();
    if !rule.enabled() || base.start.is_none() || base.end.is_none() {
        return occurrences;
    }
    let step = match parse_interval_days(&rule.interval) {
        Some(days) => days,
        None => return occurrences,
    };

    if rule.count > 0 {
        // Start from 1: occurrence 0 is the base event itself. A shift
        // that falls off the representable time range ends the sequence.
        for i in 1..rule.count as i64 {
            match base.shifted(i * step) {
                Some(occurrence) => occurrences.push(occurrence),
                None => break,
            }
        }
    } else if let Some(end_date) = rule.end_date {
        let mut i = 1;
        loop {
            let shifted = match base.shifted(i * step) {
                Some(shifted) => shifted,
                None => break,
            };
            match shifted.start_date() {
                Some(date) if date <= end_date => occurrences.push(shifted),
                _ => break,
            }
            i += 1;
        }
    }
    occurrences
}
