use anyhow::Result;
use datebook::event::{parse_date, parse_datetime, Event};
use datebook::{RecurrenceRule, ReminderConfig, ScheduleError, Scheduler};
use tempfile::tempdir;

fn event(title: &str, start: &str, end: &str) -> Event {
    Event::new(title, parse_datetime(start).unwrap(), parse_datetime(end).unwrap())
}

#[test]
fn integration_conflict_and_touching_scenarios() -> Result<()> {
    let dir = tempdir()?;
    let scheduler = Scheduler::open(dir.path())?;

    // A occupies [09:00, 10:00).
    let a = scheduler
        .create_event(event("A", "2026-01-10 09:00", "2026-01-10 10:00"), None)
        .expect("create A");
    assert_eq!(a, 1);

    // B overlaps A and must be rejected without being persisted.
    let b = scheduler.create_event(event("B", "2026-01-10 09:30", "2026-01-10 10:30"), None);
    match b {
        Err(ScheduleError::Conflict(conflicts)) => {
            assert_eq!(conflicts.len(), 1);
            assert_eq!(conflicts[0].id, a);
        }
        other => panic!("expected conflict for B, got {:?}", other.map(|_| ())),
    }

    // C touches A's end exactly and must be accepted.
    let c = scheduler
        .create_event(event("C", "2026-01-10 10:00", "2026-01-10 11:00"), None)
        .expect("create C");
    assert_eq!(c, 2);
    assert_eq!(scheduler.base_events().len(), 2);

    // Deleting an unknown id reports not-found and changes nothing.
    assert!(matches!(scheduler.delete_event(999), Err(ScheduleError::NotFound(999))));
    assert_eq!(scheduler.base_events().len(), 2);
    Ok(())
}

#[test]
fn integration_state_survives_reopen() -> Result<()> {
    let dir = tempdir()?;

    {
        let scheduler = Scheduler::open(dir.path())?;
        scheduler
            .create_event(
                event("Standup", "2026-01-12 09:00", "2026-01-12 09:15"),
                Some(RecurrenceRule::every("1d").times(3)),
            )
            .expect("create standup");
        let id = scheduler
            .create_event(event("Lunch", "2026-01-12 12:00", "2026-01-12 13:00"), None)
            .expect("create lunch");
        scheduler.set_reminder(ReminderConfig::new(id).with_lead(10)).expect("set reminder");
    }

    // A fresh scheduler over the same directory sees everything and
    // continues the id sequence.
    let scheduler = Scheduler::open(dir.path())?;
    assert_eq!(scheduler.base_events().len(), 2);
    assert!(scheduler.rule_for(1).is_some());
    assert_eq!(scheduler.reminder_for(2).map(|c| c.lead_minutes), Some(10));

    // Expanded view: 3 standups + 1 lunch.
    assert_eq!(scheduler.expanded_events().len(), 4);

    let next = scheduler
        .create_event(event("Review", "2026-01-15 15:00", "2026-01-15 16:00"), None)
        .expect("create review");
    assert_eq!(next, 3);

    // Reminder window for the lunch event at 10 minutes of lead.
    let due = scheduler.due_reminders(parse_datetime("2026-01-12 11:50").unwrap());
    assert_eq!(due.len(), 1);
    assert!(due[0].contains("Lunch"));
    assert!(scheduler.due_reminders(parse_datetime("2026-01-12 11:49").unwrap()).is_empty());
    Ok(())
}

#[test]
fn integration_recurrence_occupies_future_slots() -> Result<()> {
    let dir = tempdir()?;
    let scheduler = Scheduler::open(dir.path())?;

    let end = parse_date("2026-01-24").unwrap();
    scheduler
        .create_event(
            event("Weekly sync", "2026-01-10 09:00", "2026-01-10 10:00"),
            Some(RecurrenceRule::every("1w").until(end)),
        )
        .expect("create weekly");

    // Occurrences on Jan 17 and Jan 24 exist only as projections, yet they
    // block conflicting creates.
    let clash = scheduler.create_event(event("Clash", "2026-01-17 09:30", "2026-01-17 10:30"), None);
    assert!(matches!(clash, Err(ScheduleError::Conflict(_))));

    // Past the rule's end date the slot is free.
    scheduler
        .create_event(event("Free", "2026-01-31 09:00", "2026-01-31 10:00"), None)
        .expect("create past end date");

    let on_date = scheduler.events_on_date(parse_date("2026-01-24").unwrap());
    assert_eq!(on_date.len(), 1);
    assert_eq!(on_date[0].title, "Weekly sync");
    Ok(())
}

#[test]
fn integration_delete_cascades_and_frees_slots() -> Result<()> {
    let dir = tempdir()?;
    let scheduler = Scheduler::open(dir.path())?;

    let id = scheduler
        .create_event(
            event("Series", "2026-01-10 09:00", "2026-01-10 10:00"),
            Some(RecurrenceRule::every("1d").times(5)),
        )
        .expect("create series");
    scheduler.set_reminder(ReminderConfig::new(id)).expect("set reminder");

    scheduler.delete_event(id).expect("delete series");
    assert!(scheduler.rule_for(id).is_none());
    assert!(scheduler.reminder_for(id).is_none());
    assert!(scheduler.base_events().is_empty());

    // The previously-occupied slot is free again.
    scheduler
        .create_event(event("New", "2026-01-12 09:00", "2026-01-12 10:00"), None)
        .expect("create in freed slot");
    Ok(())
}
