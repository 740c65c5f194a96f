use clap::{Parser, Subcommand};

/// Datebook - terminal personal calendar with conflict detection,
/// recurring events and reminders
#[derive(Debug, Parser)]
#[command(name = "datebook")]
#[command(about = "Terminal personal calendar manager", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute (if not specified, enters interactive mode)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a new event
    #[command(alias = "create")]
    Add {
        /// Event title
        title: String,

        /// Event date (YYYY-MM-DD)
        date: String,

        /// Start time (HH:MM)
        start_time: String,

        /// End time (HH:MM)
        end_time: String,

        /// Event description
        #[arg(long)]
        notes: Option<String>,

        /// Event location
        #[arg(long)]
        location: Option<String>,

        /// Event category
        #[arg(long)]
        category: Option<String>,

        /// Attendee names
        #[arg(long, value_delimiter = ',')]
        attendees: Option<Vec<String>>,

        /// Recurrence interval, e.g. 1d (daily) or 2w (every two weeks)
        #[arg(long)]
        repeat: Option<String>,

        /// Total number of occurrences, the base event included
        #[arg(long, requires = "repeat")]
        count: Option<u32>,

        /// Last date an occurrence may start on (YYYY-MM-DD)
        #[arg(long, requires = "repeat", conflicts_with = "count")]
        until: Option<String>,

        /// Set a reminder this many minutes before the event starts
        #[arg(long)]
        remind: Option<i64>,
    },

    /// Replace an existing event
    #[command(alias = "update")]
    Edit {
        /// Id of the event to replace
        id: u32,

        /// Event title
        title: String,

        /// Event date (YYYY-MM-DD)
        date: String,

        /// Start time (HH:MM)
        start_time: String,

        /// End time (HH:MM)
        end_time: String,

        /// Event description
        #[arg(long)]
        notes: Option<String>,

        /// Event location
        #[arg(long)]
        location: Option<String>,

        /// Event category
        #[arg(long)]
        category: Option<String>,

        /// Attendee names
        #[arg(long, value_delimiter = ',')]
        attendees: Option<Vec<String>>,

        /// Recurrence interval; omit to drop an existing rule
        #[arg(long)]
        repeat: Option<String>,

        /// Total number of occurrences, the base event included
        #[arg(long, requires = "repeat")]
        count: Option<u32>,

        /// Last date an occurrence may start on (YYYY-MM-DD)
        #[arg(long, requires = "repeat", conflicts_with = "count")]
        until: Option<String>,
    },

    /// Delete an event (cascades to its rule and reminder)
    #[command(alias = "delete")]
    Remove {
        /// Id of the event to delete
        id: u32,
    },

    /// List all events, recurrence occurrences included
    List,

    /// Show events on a given date (YYYY-MM-DD)
    On {
        date: String,
    },

    /// Search events
    Search {
        /// Title keyword (case-insensitive)
        #[arg(long)]
        title: Option<String>,

        /// Exact category
        #[arg(long)]
        category: Option<String>,

        /// Exact location
        #[arg(long)]
        location: Option<String>,

        /// Attendee name
        #[arg(long)]
        attendee: Option<String>,

        /// Range start (YYYY-MM-DD), used with --to
        #[arg(long, requires = "to")]
        from: Option<String>,

        /// Range end (YYYY-MM-DD), used with --from
        #[arg(long, requires = "from")]
        to: Option<String>,
    },

    /// Show calendar statistics
    Stats,

    /// Manage reminders
    Remind {
        #[command(subcommand)]
        action: RemindActions,
    },
}

#[derive(Debug, Subcommand)]
pub enum RemindActions {
    /// Attach a reminder to an event
    Set {
        /// Event id
        id: u32,

        /// Minutes of lead time before the event starts
        #[arg(long, default_value_t = 30)]
        lead: i64,
    },

    /// Disable an event's reminder
    Off {
        /// Event id
        id: u32,
    },

    /// Show reminders due right now
    Due,
}
