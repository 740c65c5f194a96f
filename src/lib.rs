pub mod cli;
pub mod config;
pub mod conflict;
pub mod engine;
pub mod event;
pub mod recurrence;
pub mod reminder;
pub mod search;
pub mod stats;
pub mod storage;
pub mod store;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use engine::{ScheduleError, Scheduler};
pub use event::Event;
pub use recurrence::RecurrenceRule;
pub use reminder::ReminderConfig;
