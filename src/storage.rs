//! Delimited-record persistence for events, recurrence rules and reminders.
//!
//! Each record type maps to one line of a `|`-delimited file under the data
//! directory. Malformed lines are skipped with a diagnostic on read; a
//! single corrupt line never makes the rest of the file unreadable.

use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use log::warn;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::event::{format_datetime, parse_date, parse_datetime, Event};
use crate::recurrence::RecurrenceRule;
use crate::reminder::ReminderConfig;

const DATA_DIR: &str = ".datebook";
const EVENTS_FILE: &str = "events.csv";
const RECURRENCE_FILE: &str = "recurrence.csv";
const REMINDERS_FILE: &str = "reminders.csv";

pub const DELIMITER: u8 = b'|';

/// A type that can be persisted as one delimited line, keyed by event id.
pub trait Record: Sized {
    fn filename() -> &'static str;
    fn record_id(&self) -> u32;
    fn to_fields(&self) -> Vec<String>;
    /// Parse one line; `None` marks the line malformed and it is dropped.
    fn from_fields(record: &StringRecord) -> Option<Self>;
}

impl Record for Event {
    fn filename() -> &'static str {
        EVENTS_FILE
    }

    fn record_id(&self) -> u32 {
        self.id
    }

    fn to_fields(&self) -> Vec<String> {
        // id|title|description|start|end|location|category|attendees
        vec![
            self.id.to_string(),
            self.title.clone(),
            self.description.clone(),
            format_datetime(self.start),
            format_datetime(self.end),
            self.location.clone(),
            self.category.clone(),
            self.attendees.join(","),
        ]
    }

    fn from_fields(record: &StringRecord) -> Option<Self> {
        if record.len() < 7 {
            return None;
        }
        let id: u32 = record[0].trim().parse().ok()?;
        let start = parse_datetime(&record[3])?;
        let end = parse_datetime(&record[4])?;
        // Older files carry seven fields; attendees are a trailing extra.
        let attendees = match record.get(7) {
            Some(raw) if !raw.trim().is_empty() => {
                raw.split(',').map(|a| a.trim().to_string()).collect()
            }
            _ => Vec::new(),
        };
        Some(Event {
            id,
            title: record[1].to_string(),
            description: record[2].to_string(),
            start: Some(start),
            end: Some(end),
            location: record[5].to_string(),
            category: record[6].to_string(),
            attendees,
        })
    }
}

impl Record for RecurrenceRule {
    fn filename() -> &'static str {
        RECURRENCE_FILE
    }

    fn record_id(&self) -> u32 {
        self.event_id
    }

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.event_id.to_string(),
            self.interval.clone(),
            self.count.to_string(),
            self.end_date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
        ]
    }

    fn from_fields(record: &StringRecord) -> Option<Self> {
        if record.len() < 4 {
            return None;
        }
        let event_id: u32 = record[0].trim().parse().ok()?;
        let count: u32 = record[2].trim().parse().ok()?;
        Some(RecurrenceRule {
            event_id,
            interval: record[1].trim().to_string(),
            count,
            end_date: parse_date(&record[3]),
        })
    }
}

impl Record for ReminderConfig {
    fn filename() -> &'static str {
        REMINDERS_FILE
    }

    fn record_id(&self) -> u32 {
        self.event_id
    }

    fn to_fields(&self) -> Vec<String> {
        vec![self.event_id.to_string(), self.lead_minutes.to_string(), self.enabled.to_string()]
    }

    fn from_fields(record: &StringRecord) -> Option<Self> {
        if record.len() < 3 {
            return None;
        }
        let event_id: u32 = record[0].trim().parse().ok()?;
        let lead_minutes: i64 = record[1].trim().parse().ok()?;
        let enabled: bool = record[2].trim().parse().ok()?;
        Some(ReminderConfig { event_id, lead_minutes, enabled })
    }
}

/// File-backed store shared by all three record types.
pub struct CsvStore {
    data_dir: PathBuf,
}

impl CsvStore {
    pub fn new() -> Result<Self> {
        let home_dir = dirs::home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
        Self::at(&home_dir.join(DATA_DIR))
    }

    /// Open a store rooted at an explicit directory (used by tests and the
    /// config-level data directory override).
    pub fn at(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
        Ok(Self { data_dir: dir.to_path_buf() })
    }

    fn path_for<T: Record>(&self) -> PathBuf {
        self.data_dir.join(T::filename())
    }

    pub fn read_all<T: Record>(&self) -> Result<Vec<T>> {
        let path = self.path_for::<T>();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = ReaderBuilder::new()
            .delimiter(DELIMITER)
            .has_headers(false)
            .flexible(true)
            .from_path(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;

        let mut items = Vec::new();
        for (line, result) in reader.records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping unreadable line {} in {}: {}", line + 1, T::filename(), e);
                    continue;
                }
            };
            if record.len() == 1 && record[0].trim().is_empty() {
                continue;
            }
            match T::from_fields(&record) {
                Some(item) => items.push(item),
                None => {
                    warn!("Skipping malformed line {} in {}", line + 1, T::filename());
                }
            }
        }
        Ok(items)
    }

    pub fn append_one<T: Record>(&self, item: &T) -> Result<()> {
        let path = self.path_for::<T>();
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .with_context(|| format!("Failed to open {} for append", path.display()))?;
        let mut writer =
            WriterBuilder::new().delimiter(DELIMITER).has_headers(false).from_writer(file);
        writer.write_record(item.to_fields())?;
        writer.flush()?;
        Ok(())
    }

    pub fn rewrite_all<T: Record>(&self, items: &[T]) -> Result<()> {
        let path = self.path_for::<T>();
        let mut writer = WriterBuilder::new()
            .delimiter(DELIMITER)
            .has_headers(false)
            .from_path(&path)
            .with_context(|| format!("Failed to rewrite {}", path.display()))?;
        for item in items {
            writer.write_record(item.to_fields())?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Remove the record keyed by `id`, rewriting the file without it.
    /// Returns whether a record was removed.
    pub fn delete_by_id<T: Record>(&self, id: u32) -> Result<bool> {
        let mut items: Vec<T> = self.read_all()?;
        let before = items.len();
        items.retain(|item| item.record_id() != id);
        if items.len() == before {
            return Ok(false);
        }
        self.rewrite_all(&items)?;
        Ok(true)
    }
}
