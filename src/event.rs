use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Timestamp format used everywhere: minute precision, naive local time.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A scheduled calendar event.
///
/// `id == 0` means the event has not been assigned an id yet; the scheduler
/// assigns one on successful creation. Recurrence-generated occurrences are
/// clones that keep the base event's id — they are projections, never
/// persisted on their own.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Event {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub location: String,
    pub category: String,
    pub attendees: Vec<String>,
}

impl Event {
    pub fn new(title: &str, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            title: title.to_string(),
            start: Some(start),
            end: Some(end),
            ..Default::default()
        }
    }

    /// Both timestamps present and strictly ordered.
    pub fn is_time_valid(&self) -> bool {
        match (self.start, self.end) {
            (Some(s), Some(e)) => s < e,
            _ => false,
        }
    }

    /// Clone shifted forward by whole days. Text fields and the id are
    /// copied verbatim; used to project recurrence occurrences. Returns
    /// `None` when the shift would leave the representable time range.
    pub fn shifted(&self, days: i64) -> Option<Self> {
        let delta = chrono::Duration::try_days(days)?;
        let shift = |t: Option<chrono::NaiveDateTime>| match t {
            Some(t) => t.checked_add_signed(delta).map(Some),
            None => Some(None),
        };
        Some(Self { start: shift(self.start)?, end: shift(self.end)?, ..self.clone() })
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start.map(|s| s.date())
    }

    pub fn duration_minutes(&self) -> Option<i64> {
        match (self.start, self.end) {
            (Some(s), Some(e)) if s < e => Some((e - s).num_minutes()),
            _ => None,
        }
    }
}

/// Parse a `YYYY-MM-DD HH:MM` timestamp, returning `None` on bad input so a
/// corrupt record degrades to a skipped field instead of an error.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(trimmed, DATETIME_FORMAT).ok()
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).ok()
}

pub fn format_datetime(value: Option<NaiveDateTime>) -> String {
    value.map(|v| v.format(DATETIME_FORMAT).to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        parse_datetime(s).unwrap()
    }

    #[test]
    fn test_time_valid_requires_strict_order() {
        let mut event = Event::new("Standup", dt("2026-01-10 09:00"), dt("2026-01-10 09:30"));
        assert!(event.is_time_valid());

        event.end = event.start;
        assert!(!event.is_time_valid());

        event.end = None;
        assert!(!event.is_time_valid());
    }

    #[test]
    fn test_shifted_keeps_id_and_fields() {
        let mut event = Event::new("Gym", dt("2026-01-10 18:00"), dt("2026-01-10 19:00"));
        event.id = 7;
        event.location = "Downtown".to_string();
        event.attendees = vec!["Ana".to_string()];

        let moved = event.shifted(3).unwrap();
        assert_eq!(moved.id, 7);
        assert_eq!(moved.location, "Downtown");
        assert_eq!(moved.attendees, vec!["Ana".to_string()]);
        assert_eq!(moved.start, Some(dt("2026-01-13 18:00")));
        assert_eq!(moved.end, Some(dt("2026-01-13 19:00")));
    }

    #[test]
    fn test_shifted_overflow_returns_none() {
        let event = Event::new("Far", dt("2026-01-10 09:00"), dt("2026-01-10 10:00"));
        assert!(event.shifted(i64::MAX).is_none());
        assert!(event.shifted(9_000_000_000_000_000_000).is_none());
        assert!(event.shifted(1).is_some());
    }

    #[test]
    fn test_parse_datetime_rejects_garbage() {
        assert!(parse_datetime("2026-01-10 09:00").is_some());
        assert!(parse_datetime("").is_none());
        assert!(parse_datetime("not a date").is_none());
        assert!(parse_datetime("2026-13-40 09:00").is_none());
    }
}
