use anyhow::{anyhow, bail, Result};
use chrono::Local;
use clap::Parser;
use env_logger::Env;
use log::{error, info};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use datebook::cli::{Cli, Commands, RemindActions};
use datebook::event::{format_datetime, parse_date, parse_datetime, Event};
use datebook::recurrence::{parse_interval_days, RecurrenceRule};
use datebook::reminder::ReminderConfig;
use datebook::validation::{validate_date_format, validate_time_format};
use datebook::{search, stats, Config, ScheduleError, Scheduler};

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "{} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let scheduler = match &config.calendar.data_dir {
        Some(dir) => Scheduler::open(dir)?,
        None => Scheduler::new()?,
    };

    match cli.command {
        Some(command) => run_command(&scheduler, &config, command),
        None => run_interactive(&scheduler, &config),
    }
}

fn run_interactive(scheduler: &Scheduler, config: &Config) -> Result<()> {
    info!("Starting Datebook terminal");
    let mut rl = DefaultEditor::new()?;
    println!("Welcome to Datebook! Type 'help' for commands, 'exit' to quit.");

    loop {
        let readline = rl.readline(">> ");
        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);
                if trimmed == "exit" || trimmed == "quit" {
                    break;
                }

                let words = split_line(trimmed);
                let parsed =
                    Cli::try_parse_from(std::iter::once("datebook".to_string()).chain(words));
                match parsed {
                    Ok(Cli { command: Some(command) }) => {
                        if let Err(err) = run_command(scheduler, config, command) {
                            error!("{:#}", err);
                        }
                    }
                    Ok(Cli { command: None }) => {}
                    Err(err) => {
                        // clap renders its own usage/help output.
                        println!("{}", err);
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                error!("Readline error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}

/// Quote-aware whitespace splitter for interactive input.
fn split_line(input: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in input.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                if !in_quotes && !current.is_empty() {
                    parts.push(current.clone());
                    current.clear();
                }
            }
            ' ' if !in_quotes => {
                if !current.is_empty() {
                    parts.push(current.clone());
                    current.clear();
                }
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

fn run_command(scheduler: &Scheduler, config: &Config, command: Commands) -> Result<()> {
    match command {
        Commands::Add {
            title,
            date,
            start_time,
            end_time,
            notes,
            location,
            category,
            attendees,
            repeat,
            count,
            until,
            remind,
        } => {
            let category = category.or_else(|| config.calendar.default_category.clone());
            let event = event_from_args(
                0, &title, &date, &start_time, &end_time, notes, location, category, attendees,
            )?;
            let rule = rule_from_args(repeat, count, until)?;

            let id = scheduler.create_event(event, rule).map_err(report)?;
            println!("Created event {}", id);

            if let Some(lead) = remind {
                scheduler.set_reminder(ReminderConfig::new(id).with_lead(lead)).map_err(report)?;
                println!("Reminder set {} minutes before start", lead.max(0));
            }
            Ok(())
        }
        Commands::Edit {
            id,
            title,
            date,
            start_time,
            end_time,
            notes,
            location,
            category,
            attendees,
            repeat,
            count,
            until,
        } => {
            let event = event_from_args(
                id, &title, &date, &start_time, &end_time, notes, location, category, attendees,
            )?;
            let rule = rule_from_args(repeat, count, until)?;
            scheduler.update_event(event, rule).map_err(report)?;
            println!("Updated event {}", id);
            Ok(())
        }
        Commands::Remove { id } => {
            scheduler.delete_event(id).map_err(report)?;
            println!("Deleted event {}", id);
            Ok(())
        }
        Commands::List => {
            print_events(&scheduler.expanded_events());
            Ok(())
        }
        Commands::On { date } => {
            let date = parse_date(&date).ok_or_else(|| anyhow!("Invalid date '{}'", date))?;
            print_events(&scheduler.events_on_date(date));
            Ok(())
        }
        Commands::Search { title, category, location, attendee, from, to } => {
            let events = scheduler.expanded_events();
            let hits = if let Some(keyword) = title {
                search::by_title(&events, &keyword)
            } else if let Some(category) = category {
                search::by_category(&events, &category)
            } else if let Some(location) = location {
                search::by_location(&events, &location)
            } else if let Some(name) = attendee {
                search::by_attendee(&events, &name)
            } else if let (Some(from), Some(to)) = (from, to) {
                let from =
                    parse_date(&from).ok_or_else(|| anyhow!("Invalid date '{}'", from))?;
                let to = parse_date(&to).ok_or_else(|| anyhow!("Invalid date '{}'", to))?;
                search::by_date_range(&events, from, to)
            } else {
                bail!("Specify one of --title, --category, --location, --attendee or --from/--to");
            };
            print_events(&hits);
            Ok(())
        }
        Commands::Stats => {
            let events = scheduler.expanded_events();
            match stats::busiest_weekday(&events) {
                Some(day) => println!("Busiest weekday: {:?}", day),
                None => println!("Busiest weekday: n/a"),
            }
            println!("Average duration: {:.1} minutes", stats::average_duration_minutes(&events));
            let mut distribution: Vec<_> =
                stats::category_distribution(&events).into_iter().collect();
            distribution.sort();
            println!("Events per category:");
            for (category, count) in distribution {
                println!("  {}: {}", category, count);
            }
            Ok(())
        }
        Commands::Remind { action } => match action {
            RemindActions::Set { id, lead } => {
                scheduler.set_reminder(ReminderConfig::new(id).with_lead(lead)).map_err(report)?;
                println!("Reminder set for event {}", id);
                Ok(())
            }
            RemindActions::Off { id } => {
                scheduler.disable_reminder(id).map_err(report)?;
                println!("Reminder disabled for event {}", id);
                Ok(())
            }
            RemindActions::Due => {
                let messages = scheduler.due_reminders(Local::now().naive_local());
                if messages.is_empty() {
                    println!("No reminders due.");
                } else {
                    for message in messages {
                        println!("{}", message);
                    }
                }
                Ok(())
            }
        },
    }
}

#[allow(clippy::too_many_arguments)]
fn event_from_args(
    id: u32,
    title: &str,
    date: &str,
    start_time: &str,
    end_time: &str,
    notes: Option<String>,
    location: Option<String>,
    category: Option<String>,
    attendees: Option<Vec<String>>,
) -> Result<Event> {
    if !validate_date_format(date) {
        bail!("Invalid date '{}', expected YYYY-MM-DD", date);
    }
    if !validate_time_format(start_time) || !validate_time_format(end_time) {
        bail!("Invalid time, expected HH:MM");
    }
    let start = parse_datetime(&format!("{} {}", date, start_time))
        .ok_or_else(|| anyhow!("Invalid start '{} {}'", date, start_time))?;
    let end = parse_datetime(&format!("{} {}", date, end_time))
        .ok_or_else(|| anyhow!("Invalid end '{} {}'", date, end_time))?;

    let mut event = Event::new(title, start, end);
    event.id = id;
    event.description = notes.unwrap_or_default();
    event.location = location.unwrap_or_default();
    event.category = category.unwrap_or_default();
    event.attendees = attendees.unwrap_or_default();
    Ok(event)
}

fn rule_from_args(
    repeat: Option<String>,
    count: Option<u32>,
    until: Option<String>,
) -> Result<Option<RecurrenceRule>> {
    let interval = match repeat {
        Some(interval) => interval,
        None => return Ok(None),
    };
    if parse_interval_days(&interval).is_none() {
        bail!("Invalid interval '{}', expected Nd (days) or Nw (weeks)", interval);
    }

    let mut rule = RecurrenceRule::every(&interval);
    if let Some(count) = count {
        rule = rule.times(count);
    } else if let Some(until) = until {
        let end_date =
            parse_date(&until).ok_or_else(|| anyhow!("Invalid date '{}'", until))?;
        rule = rule.until(end_date);
    } else {
        bail!("A recurrence needs either --count or --until");
    }
    Ok(Some(rule))
}

fn report(err: ScheduleError) -> anyhow::Error {
    if let ScheduleError::Conflict(ref conflicts) = err {
        println!("Time conflict with {} event(s):", conflicts.len());
        for event in conflicts {
            println!("  - {}", summary(event));
        }
    }
    anyhow::Error::new(err)
}

fn print_events(events: &[Event]) {
    if events.is_empty() {
        println!("No events.");
        return;
    }
    for event in events {
        println!("{}", summary(event));
    }
}

fn summary(event: &Event) -> String {
    let mut line = format!(
        "[{}] {} | {} -> {}",
        event.id,
        event.title,
        format_datetime(event.start),
        format_datetime(event.end)
    );
    if !event.location.is_empty() {
        line.push_str(&format!(" @ {}", event.location));
    }
    if !event.category.is_empty() {
        line.push_str(&format!(" ({})", event.category));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_line_respects_quotes() {
        let parts = split_line(r#"add "Team sync" 2026-01-10 09:00 10:00 --location "Room 4""#);
        assert_eq!(
            parts,
            vec!["add", "Team sync", "2026-01-10", "09:00", "10:00", "--location", "Room 4"]
        );
    }

    #[test]
    fn test_event_from_args_rejects_bad_formats() {
        assert!(event_from_args(0, "T", "2026-1-10", "09:00", "10:00", None, None, None, None)
            .is_err());
        assert!(event_from_args(0, "T", "2026-01-10", "25:00", "10:00", None, None, None, None)
            .is_err());
        assert!(event_from_args(0, "T", "2026-01-10", "09:00", "10:00", None, None, None, None)
            .is_ok());
    }

    #[test]
    fn test_rule_from_args_requires_termination() {
        assert!(rule_from_args(Some("1d".to_string()), None, None).is_err());
        assert!(rule_from_args(Some("1m".to_string()), Some(3), None).is_err());
        let rule = rule_from_args(Some("1w".to_string()), Some(3), None).unwrap().unwrap();
        assert_eq!(rule.count, 3);
        assert!(rule_from_args(None, None, None).unwrap().is_none());
    }
}
