use chrono::Duration;

use crate::models::{CyclePrediction, Period};

/// Days from ovulation to the next period start.
pub const LUTEAL_PHASE_DAYS: i64 = 14;
/// Fertile days before ovulation.
pub const FERTILE_DAYS_BEFORE_OVULATION: i64 = 5;
/// Fertile days after ovulation.
pub const FERTILE_DAYS_AFTER_OVULATION: i64 = 1;
/// Confidence points lost per day of cycle-length standard deviation.
const CONFIDENCE_PENALTY_PER_DAY: f64 = 10.0;

/// Predict the next period, ovulation and fertile window.
/// Requires at least 2 periods; `periods` must be sorted by start. Returns
/// `None` when the predicted dates fall outside the representable range.
pub fn predict(periods: &[Period]) -> Option<CyclePrediction> {
    let gaps = cycle_gaps(periods);
    if gaps.is_empty() {
        return None;
    }
    let last_start = periods.last()?.start;

    let avg_cycle = mean(&gaps).round() as i64;
    let next_period_start = last_start.checked_add_signed(Duration::days(avg_cycle))?;
    let ovulation_day = next_period_start.checked_sub_signed(Duration::days(LUTEAL_PHASE_DAYS))?;
    let fertile_window_start =
        ovulation_day.checked_sub_signed(Duration::days(FERTILE_DAYS_BEFORE_OVULATION))?;
    let fertile_window_end =
        ovulation_day.checked_add_signed(Duration::days(FERTILE_DAYS_AFTER_OVULATION))?;

    let std_dev = population_std_deviation(&gaps);
    let confidence = (100.0 - CONFIDENCE_PENALTY_PER_DAY * std_dev)
        .clamp(0.0, 100.0)
        .round() as u8;

    log::debug!(
        "event=predict module=prediction periods={} avg_cycle={} std_dev={:.2} confidence={}",
        periods.len(),
        avg_cycle,
        std_dev,
        confidence
    );

    Some(CyclePrediction {
        next_period_start,
        ovulation_day,
        fertile_window_start,
        fertile_window_end,
        confidence,
    })
}

/// Days between consecutive period starts.
pub fn cycle_gaps(periods: &[Period]) -> Vec<f64> {
    periods
        .windows(2)
        .map(|w| (w[1].start - w[0].start).num_days() as f64)
        .collect()
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population (not sample) standard deviation.
pub(crate) fn population_std_deviation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values);
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
