//! Search and filter helpers over an event snapshot.
//!
//! All functions are pure filters; callers pass the expanded event set so
//! recurrence occurrences are searchable too.

use chrono::NaiveDate;

use crate::event::Event;

/// Events whose start date equals `date`.
pub fn by_date(events: &[Event], date: NaiveDate) -> Vec<Event> {
    events.iter().filter(|e| e.start_date() == Some(date)).cloned().collect()
}

/// Events overlapping the inclusive date window `[from, to]` at date
/// granularity: the event's end date is on/after `from` and its start date
/// is on/before `to`.
pub fn by_date_range(events: &[Event], from: NaiveDate, to: NaiveDate) -> Vec<Event> {
    events
        .iter()
        .filter(|e| match (e.start, e.end) {
            (Some(s), Some(t)) => t.date() >= from && s.date() <= to,
            _ => false,
        })
        .cloned()
        .collect()
}

/// Case-insensitive title substring match.
pub fn by_title(events: &[Event], keyword: &str) -> Vec<Event> {
    let needle = keyword.trim().to_lowercase();
    events
        .iter()
        .filter(|e| e.title.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Case-insensitive exact category match.
pub fn by_category(events: &[Event], category: &str) -> Vec<Event> {
    let wanted = category.trim().to_lowercase();
    events
        .iter()
        .filter(|e| e.category.trim().to_lowercase() == wanted)
        .cloned()
        .collect()
}

/// Case-insensitive exact location match.
pub fn by_location(events: &[Event], location: &str) -> Vec<Event> {
    let wanted = location.trim().to_lowercase();
    events
        .iter()
        .filter(|e| e.location.trim().to_lowercase() == wanted)
        .cloned()
        .collect()
}

/// Events with an attendee whose name matches exactly, ignoring case.
pub fn by_attendee(events: &[Event], name: &str) -> Vec<Event> {
    let wanted = name.trim().to_lowercase();
    events
        .iter()
        .filter(|e| e.attendees.iter().any(|a| a.trim().to_lowercase() == wanted))
        .cloned()
        .collect()
}
