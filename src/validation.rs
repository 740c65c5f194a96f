//! Validation rules for event fields, shared by create and update.
//
// The persistence layer reserves '|' as its field delimiter and ',' as the
// attendee sub-delimiter, so those characters are rejected up front.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::event::Event;

static DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());
static TIME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,2}:\d{2}$").unwrap());

pub const FIELD_DELIMITER: char = '|';
pub const ATTENDEE_DELIMITER: char = ',';

/// Validate fields for create/update. Returns `None` if valid, otherwise a
/// human-readable error message.
pub fn validate_event(event: &Event) -> Option<String> {
    if event.title.trim().is_empty() {
        return Some("Title cannot be empty".to_string());
    }
    if event.start.is_none() {
        return Some("Start time is missing or invalid".to_string());
    }
    if event.end.is_none() {
        return Some("End time is missing or invalid".to_string());
    }
    if !event.is_time_valid() {
        return Some("Start time must be earlier than end time".to_string());
    }

    for field in [&event.title, &event.description, &event.location, &event.category] {
        if field.contains(FIELD_DELIMITER) {
            return Some(format!(
                "Input cannot contain the '{}' character (reserved as file delimiter)",
                FIELD_DELIMITER
            ));
        }
    }
    for attendee in &event.attendees {
        if attendee.contains(FIELD_DELIMITER) || attendee.contains(ATTENDEE_DELIMITER) {
            return Some(format!(
                "Attendee name '{}' contains a reserved delimiter character",
                attendee
            ));
        }
    }
    None
}

/// Validate date string has format YYYY-MM-DD and is a real date.
pub fn validate_date_format(date: &str) -> bool {
    DATE_RE.is_match(date) && NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
}

/// Validate time string has format HH:MM with sane hour/minute values.
pub fn validate_time_format(time: &str) -> bool {
    if !TIME_RE.is_match(time) {
        return false;
    }
    let parts: Vec<&str> = time.split(':').collect();
    if parts.len() != 2 {
        return false;
    }
    if let (Ok(hours), Ok(minutes)) = (parts[0].parse::<u32>(), parts[1].parse::<u32>()) {
        return hours < 24 && minutes < 60;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::parse_datetime;

    fn valid_event() -> Event {
        Event::new(
            "Review",
            parse_datetime("2026-01-10 09:00").unwrap(),
            parse_datetime("2026-01-10 10:00").unwrap(),
        )
    }

    #[test]
    fn test_valid_event_passes() {
        assert_eq!(validate_event(&valid_event()), None);
    }

    #[test]
    fn test_blank_title_rejected() {
        let mut event = valid_event();
        event.title = "   ".to_string();
        assert!(validate_event(&event).is_some());
    }

    #[test]
    fn test_equal_start_end_rejected() {
        let mut event = valid_event();
        event.end = event.start;
        assert!(validate_event(&event).is_some());
    }

    #[test]
    fn test_delimiter_in_fields_rejected() {
        let mut event = valid_event();
        event.location = "room|3".to_string();
        assert!(validate_event(&event).is_some());

        let mut event = valid_event();
        event.attendees = vec!["Smith, John".to_string()];
        assert!(validate_event(&event).is_some());
    }

    #[test]
    fn test_date_and_time_formats() {
        assert!(validate_date_format("2026-01-10"));
        assert!(!validate_date_format("2026-1-10"));
        assert!(!validate_date_format("2026-13-40"));

        assert!(validate_time_format("09:30"));
        assert!(validate_time_format("9:30"));
        assert!(!validate_time_format("24:00"));
        assert!(!validate_time_format("09:61"));
        assert!(!validate_time_format("0930"));
    }
}
