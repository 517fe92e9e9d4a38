use chrono::{Duration, NaiveDate};

use crate::entry_log::EntryLog;
use crate::models::{CyclePrediction, DayMarker};

/// First and last day of a calendar month, `None` for an invalid month.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }?;
    Some((first, next - Duration::days(1)))
}

/// One marker per day in `first..=last`.
pub fn day_markers(
    entries: &EntryLog,
    prediction: Option<&CyclePrediction>,
    first: NaiveDate,
    last: NaiveDate,
) -> Vec<DayMarker> {
    first
        .iter_days()
        .take_while(|d| *d <= last)
        .map(|date| DayMarker {
            date,
            flow: entries.get(date).map(|e| e.flow),
            predicted_period: prediction.is_some_and(|p| p.is_predicted_period_start(date)),
            fertile: prediction.is_some_and(|p| p.is_fertile(date)),
            ovulation: prediction.is_some_and(|p| p.is_ovulation_day(date)),
        })
        .collect()
}
