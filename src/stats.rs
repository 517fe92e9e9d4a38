use std::collections::HashMap;
use std::hash::Hash;

use crate::models::{CycleStatistics, DayEntry, Mood, Period, Symptom};
use crate::prediction::{cycle_gaps, mean};

const TOP_SYMPTOMS: usize = 3;

/// Compute descriptive statistics for the stats view.
/// `periods` must be the segmentation of `entries`, sorted by start.
pub fn compute_stats(entries: &[DayEntry], periods: &[Period]) -> CycleStatistics {
    let gaps = cycle_gaps(periods);
    let period_lengths: Vec<f64> = periods.iter().map(|p| p.length as f64).collect();

    CycleStatistics {
        average_cycle_length: mean(&gaps).round() as i64,
        average_period_length: mean(&period_lengths).round() as i64,
        top_symptoms: top_symptoms(entries),
        dominant_mood: dominant_mood(entries),
        total_periods: periods.len(),
        shortest_cycle: gaps.iter().map(|g| *g as i64).min(),
        longest_cycle: gaps.iter().map(|g| *g as i64).max(),
        last_period_start: periods.last().map(|p| p.start),
    }
}

/// Up to three most frequent symptoms, ties broken by vocabulary order.
pub fn top_symptoms(entries: &[DayEntry]) -> Vec<Symptom> {
    let counts = count(entries.iter().flat_map(|e| e.symptoms.iter().copied()));
    ranked(&Symptom::ALL, &counts)
        .into_iter()
        .take(TOP_SYMPTOMS)
        .collect()
}

/// Most frequent mood, ties broken by vocabulary order. `None` for an empty log.
pub fn dominant_mood(entries: &[DayEntry]) -> Option<Mood> {
    let counts = count(entries.iter().map(|e| e.mood));
    ranked(&Mood::ALL, &counts).into_iter().next()
}

fn count<T: Eq + Hash>(items: impl Iterator<Item = T>) -> HashMap<T, usize> {
    let mut counts = HashMap::new();
    for item in items {
        *counts.entry(item).or_insert(0) += 1;
    }
    counts
}

/// Tags with a non-zero count, most frequent first. The sort is stable, so
/// equal counts keep the order of `vocabulary`.
fn ranked<T: Copy + Eq + Hash>(vocabulary: &[T], counts: &HashMap<T, usize>) -> Vec<T> {
    let mut present: Vec<(T, usize)> = vocabulary
        .iter()
        .filter_map(|tag| counts.get(tag).map(|&n| (*tag, n)))
        .filter(|(_, n)| *n > 0)
        .collect();
    present.sort_by(|a, b| b.1.cmp(&a.1));
    present.into_iter().map(|(tag, _)| tag).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FlowLevel;
    use crate::segment::segment;
    use chrono::{Duration, NaiveDate};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn day(offset: i64) -> DayEntry {
        DayEntry::new(date("2024-01-01") + Duration::days(offset))
    }

    #[test]
    fn empty_log_yields_zeroes() {
        let stats = compute_stats(&[], &[]);
        assert_eq!(stats.average_cycle_length, 0);
        assert_eq!(stats.average_period_length, 0);
        assert!(stats.top_symptoms.is_empty());
        assert_eq!(stats.dominant_mood, None);
        assert_eq!(stats.total_periods, 0);
        assert_eq!(stats.shortest_cycle, None);
        assert_eq!(stats.last_period_start, None);
    }

    #[test]
    fn cycle_stats_computed() {
        let mut entries: Vec<DayEntry> = (0..5).map(|i| day(i).with_flow(FlowLevel::Heavy)).collect();
        entries.push(day(5));
        entries.extend((28..31).map(|i| day(i).with_flow(FlowLevel::Light)));

        let periods = segment(&entries);
        let stats = compute_stats(&entries, &periods);
        assert_eq!(stats.total_periods, 2);
        assert_eq!(stats.average_cycle_length, 28);
        assert_eq!(stats.average_period_length, 4);
        assert_eq!(stats.shortest_cycle, Some(28));
        assert_eq!(stats.longest_cycle, Some(28));
        assert_eq!(stats.last_period_start, Some(date("2024-01-29")));
    }

    #[test]
    fn single_period_has_no_cycle_length() {
        let entries: Vec<DayEntry> = (0..6).map(|i| day(i).with_flow(FlowLevel::Medium)).collect();
        let periods = segment(&entries);
        let stats = compute_stats(&entries, &periods);
        assert_eq!(stats.average_cycle_length, 0);
        assert_eq!(stats.average_period_length, 6);
        assert_eq!(stats.shortest_cycle, None);
    }

    #[test]
    fn average_cycle_length_rounds() {
        let periods = vec![
            Period::new(date("2024-01-01"), date("2024-01-04")),
            Period::new(date("2024-01-30"), date("2024-02-02")),
            Period::new(date("2024-02-25"), date("2024-02-27")),
        ];
        let stats = compute_stats(&[], &periods);
        assert_eq!(stats.average_cycle_length, 28);
        // lengths 4, 4, 3 -> 3.67
        assert_eq!(stats.average_period_length, 4);
        assert_eq!(stats.shortest_cycle, Some(26));
        assert_eq!(stats.longest_cycle, Some(29));
    }

    #[test]
    fn symptom_ties_follow_vocabulary_order() {
        let entries = vec![
            day(0).with_symptoms([Symptom::Headache]),
            day(1).with_symptoms([Symptom::Cramps]),
        ];
        assert_eq!(top_symptoms(&entries), vec![Symptom::Cramps, Symptom::Headache]);
    }

    #[test]
    fn top_symptoms_ranked_and_capped() {
        let entries = vec![
            day(0).with_symptoms([Symptom::Nausea, Symptom::Acne, Symptom::Other]),
            day(1).with_symptoms([Symptom::Nausea, Symptom::Backache]),
            day(2).with_symptoms([Symptom::Nausea, Symptom::Backache, Symptom::Fatigue]),
        ];
        assert_eq!(
            top_symptoms(&entries),
            vec![Symptom::Nausea, Symptom::Backache, Symptom::Fatigue]
        );
    }

    #[test]
    fn no_symptoms_logged() {
        let entries = vec![day(0), day(1)];
        assert!(top_symptoms(&entries).is_empty());
    }

    #[test]
    fn dominant_mood_by_count_then_vocabulary() {
        let entries = vec![
            day(0).with_mood(Mood::Tired),
            day(1).with_mood(Mood::Tired),
            day(2).with_mood(Mood::Sad),
        ];
        assert_eq!(dominant_mood(&entries), Some(Mood::Tired));

        let tied = vec![day(0).with_mood(Mood::Tired), day(1).with_mood(Mood::Happy)];
        assert_eq!(dominant_mood(&tied), Some(Mood::Happy));
    }
}
