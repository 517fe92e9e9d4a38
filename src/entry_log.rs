use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{DayEntry, FlowLevel, Mood, Symptom};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const MAX_NOTES_CHARS: usize = 2000;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EntryError {
    #[error("invalid date `{0}`, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("unknown {field} `{value}`")]
    UnknownTag { field: &'static str, value: String },
    #[error("notes are {0} characters long, limit is {}", MAX_NOTES_CHARS)]
    NotesTooLong(usize),
}

/// Parse a calendar date in `YYYY-MM-DD` form. Out-of-range days such as
/// `2024-02-30` are rejected.
pub fn parse_date(s: &str) -> Result<NaiveDate, EntryError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| EntryError::InvalidDate(s.to_string()))
}

/// Build a validated entry from raw user input.
pub fn parse_entry(
    date: &str,
    flow: &str,
    symptoms: &[String],
    mood: &str,
    notes: Option<String>,
) -> Result<DayEntry, EntryError> {
    let date = parse_date(date)?;
    let flow: FlowLevel = flow.parse()?;
    let mood: Mood = mood.parse()?;
    let symptoms = symptoms
        .iter()
        .map(|s| s.parse::<Symptom>())
        .collect::<Result<Vec<_>, _>>()?;

    let mut entry = DayEntry::new(date)
        .with_flow(flow)
        .with_symptoms(symptoms)
        .with_mood(mood);
    entry.notes = notes.filter(|n| !n.trim().is_empty());
    validate(&entry)?;
    Ok(entry)
}

fn validate(entry: &DayEntry) -> Result<(), EntryError> {
    if let Some(notes) = &entry.notes {
        let chars = notes.chars().count();
        if chars > MAX_NOTES_CHARS {
            return Err(EntryError::NotesTooLong(chars));
        }
    }
    Ok(())
}

/// Date-keyed collection of day entries, kept in insertion order.
/// At most one entry exists per date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<DayEntry>", into = "Vec<DayEntry>")]
pub struct EntryLog {
    entries: Vec<DayEntry>,
}

impl EntryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `entry.date`. Returns the replaced entry.
    pub fn upsert(&mut self, entry: DayEntry) -> Result<Option<DayEntry>, EntryError> {
        validate(&entry)?;
        match self.entries.iter_mut().find(|e| e.date == entry.date) {
            Some(existing) => Ok(Some(std::mem::replace(existing, entry))),
            None => {
                self.entries.push(entry);
                Ok(None)
            }
        }
    }

    pub fn remove(&mut self, date: NaiveDate) -> Option<DayEntry> {
        let index = self.entries.iter().position(|e| e.date == date)?;
        Some(self.entries.remove(index))
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DayEntry> {
        self.entries.iter().find(|e| e.date == date)
    }

    pub fn as_slice(&self) -> &[DayEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &DayEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries with `first <= date <= last`, sorted by date.
    pub fn between(&self, first: NaiveDate, last: NaiveDate) -> Vec<DayEntry> {
        let mut found: Vec<DayEntry> = self
            .entries
            .iter()
            .filter(|e| e.date >= first && e.date <= last)
            .cloned()
            .collect();
        found.sort_by_key(|e| e.date);
        found
    }
}

impl From<Vec<DayEntry>> for EntryLog {
    /// Later entries win when a date repeats.
    fn from(entries: Vec<DayEntry>) -> Self {
        let mut log = EntryLog::new();
        for entry in entries {
            match log.entries.iter_mut().find(|e| e.date == entry.date) {
                Some(existing) => *existing = entry,
                None => log.entries.push(entry),
            }
        }
        log
    }
}

impl From<EntryLog> for Vec<DayEntry> {
    fn from(log: EntryLog) -> Self {
        log.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn upsert_replaces_existing_date() {
        let mut log = EntryLog::new();
        log.upsert(DayEntry::new(date("2024-01-01")).with_flow(FlowLevel::Light))
            .unwrap();
        let replaced = log
            .upsert(DayEntry::new(date("2024-01-01")).with_flow(FlowLevel::Heavy))
            .unwrap();

        assert_eq!(log.len(), 1);
        assert_eq!(replaced.unwrap().flow, FlowLevel::Light);
        assert_eq!(log.get(date("2024-01-01")).unwrap().flow, FlowLevel::Heavy);
    }

    #[test]
    fn remove_deletes_only_that_date() {
        let mut log = EntryLog::new();
        log.upsert(DayEntry::new(date("2024-01-01"))).unwrap();
        log.upsert(DayEntry::new(date("2024-01-02"))).unwrap();

        assert!(log.remove(date("2024-01-01")).is_some());
        assert!(log.remove(date("2024-01-01")).is_none());
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn parse_entry_accepts_vocabulary() {
        let entry = parse_entry(
            "2024-03-05",
            "medium",
            &["cramps".into(), "fatigue".into(), "cramps".into()],
            "tired",
            Some("long day".into()),
        )
        .unwrap();
        assert_eq!(entry.flow, FlowLevel::Medium);
        assert_eq!(entry.symptoms.len(), 2);
        assert_eq!(entry.mood, Mood::Tired);
        assert_eq!(entry.notes.as_deref(), Some("long day"));
    }

    #[test]
    fn parse_entry_rejects_malformed_input() {
        assert_eq!(
            parse_entry("2024-02-30", "none", &[], "happy", None),
            Err(EntryError::InvalidDate("2024-02-30".into()))
        );
        assert!(matches!(
            parse_entry("2024-02-01", "gushing", &[], "happy", None),
            Err(EntryError::UnknownTag { field: "flow", .. })
        ));
        assert!(matches!(
            parse_entry("2024-02-01", "none", &["itch".into()], "happy", None),
            Err(EntryError::UnknownTag { field: "symptom", .. })
        ));
        assert!(matches!(
            parse_entry("2024-02-01", "none", &[], "bored", None),
            Err(EntryError::UnknownTag { field: "mood", .. })
        ));
    }

    #[test]
    fn overlong_notes_rejected_at_upsert() {
        let mut log = EntryLog::new();
        let notes = "x".repeat(MAX_NOTES_CHARS + 1);
        let result = log.upsert(DayEntry::new(date("2024-01-01")).with_notes(notes));
        assert_eq!(result, Err(EntryError::NotesTooLong(MAX_NOTES_CHARS + 1)));
        assert!(log.is_empty());
    }

    #[test]
    fn duplicate_dates_collapse_on_load() {
        let raw = r#"[
            {"date":"2024-01-01","flow":"light","symptoms":[],"mood":"happy"},
            {"date":"2024-01-01","flow":"heavy","symptoms":[],"mood":"sad"}
        ]"#;
        let log: EntryLog = serde_json::from_str(raw).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log.get(date("2024-01-01")).unwrap().flow, FlowLevel::Heavy);
    }

    #[test]
    fn between_is_sorted_and_inclusive() {
        let mut log = EntryLog::new();
        for d in ["2024-01-31", "2024-01-01", "2024-02-01", "2023-12-31"] {
            log.upsert(DayEntry::new(date(d))).unwrap();
        }
        let january = log.between(date("2024-01-01"), date("2024-01-31"));
        let dates: Vec<NaiveDate> = january.iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![date("2024-01-01"), date("2024-01-31")]);
    }
}
