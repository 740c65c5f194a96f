//! Simple statistics over an event snapshot.

use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::HashMap;

use crate::event::Event;

/// The weekday with the most event starts, or `None` when no event has a
/// valid start.
pub fn busiest_weekday(events: &[Event]) -> Option<Weekday> {
    let mut counts: HashMap<Weekday, usize> = HashMap::new();
    for event in events {
        if let Some(start) = event.start {
            *counts.entry(start.weekday()).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .max_by_key(|(day, count)| (*count, std::cmp::Reverse(day.num_days_from_monday())))
        .map(|(day, _)| day)
}

/// Event counts per category; blank categories land in "(Uncategorized)".
pub fn category_distribution(events: &[Event]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for event in events {
        let category = if event.category.trim().is_empty() {
            "(Uncategorized)".to_string()
        } else {
            event.category.clone()
        };
        *counts.entry(category).or_insert(0) += 1;
    }
    counts
}

/// Count events starting in the month containing `month`.
pub fn monthly_count(events: &[Event], month: NaiveDate) -> usize {
    events
        .iter()
        .filter_map(|e| e.start)
        .filter(|s| s.year() == month.year() && s.month() == month.month())
        .count()
}

/// Mean duration in minutes over events with a valid time range, or 0.0.
pub fn average_duration_minutes(events: &[Event]) -> f64 {
    let durations: Vec<i64> = events.iter().filter_map(|e| e.duration_minutes()).collect();
    if durations.is_empty() {
        return 0.0;
    }
    durations.iter().sum::<i64>() as f64 / durations.len() as f64
}
