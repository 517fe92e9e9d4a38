use crate::models::{DayEntry, Period};

/// Group logged days into periods.
///
/// A period is a run of flow days on consecutive calendar dates. A none-flow
/// entry or a day with no entry at all ends the run. Output is sorted by start.
pub fn segment(entries: &[DayEntry]) -> Vec<Period> {
    let mut flow_days: Vec<_> = entries
        .iter()
        .filter(|e| e.flow.is_flow())
        .map(|e| e.date)
        .collect();
    flow_days.sort_unstable();
    flow_days.dedup();

    let Some((&first, rest)) = flow_days.split_first() else {
        return Vec::new();
    };

    let mut periods = Vec::new();
    let mut start = first;
    let mut end = first;

    for &day in rest {
        // flow_days is deduplicated, so the gap is at least one day
        if (day - end).num_days() == 1 {
            end = day;
        } else {
            periods.push(Period::new(start, end));
            start = day;
            end = day;
        }
    }
    periods.push(Period::new(start, end));

    periods
}
