//! Overlap detection over the expanded event set.

use crate::event::Event;

/// Two events overlap when their half-open time ranges intersect. Events
/// that merely touch at an endpoint do not conflict.
pub fn overlaps(a: &Event, b: &Event) -> bool {
    match (a.start, a.end, b.start, b.end) {
        (Some(a_start), Some(a_end), Some(b_start), Some(b_end)) => {
            a_start < b_end && b_start < a_end
        }
        _ => false,
    }
}

/// Find every event in `expanded` that overlaps `candidate`.
///
/// `ignore_id == 0` ignores nothing (create); a positive `ignore_id`
/// excludes that id's occurrences (update, so an event never conflicts with
/// its own prior slot). Entries with missing timestamps are skipped. The
/// result is sorted by (id, start) so a fixed input yields a fixed order.
pub fn find_conflicts(candidate: &Event, ignore_id: u32, expanded: &[Event]) -> Vec<Event> {
    if candidate.start.is_none() || candidate.end.is_none() {
        return Vec::new();
    }

    let mut conflicts: Vec<Event> = expanded
        .iter()
        .filter(|existing| ignore_id == 0 || existing.id != ignore_id)
        .filter(|existing| overlaps(candidate, existing))
        .cloned()
        .collect();
    conflicts.sort_by_key(|e| (e.id, e.start));
    conflicts
}
