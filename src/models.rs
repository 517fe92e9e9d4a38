use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entry_log::{EntryError, EntryLog};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum FlowLevel {
    #[default]
    None,
    Light,
    Medium,
    Heavy,
}

impl FlowLevel {
    pub const ALL: [FlowLevel; 4] = [
        FlowLevel::None,
        FlowLevel::Light,
        FlowLevel::Medium,
        FlowLevel::Heavy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FlowLevel::None => "none",
            FlowLevel::Light => "light",
            FlowLevel::Medium => "medium",
            FlowLevel::Heavy => "heavy",
        }
    }

    /// Any bleeding at all.
    pub fn is_flow(&self) -> bool {
        *self != FlowLevel::None
    }
}

/// Symptom vocabulary. Declaration order is the ranking tie-break order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Symptom {
    Cramps,
    Headache,
    Bloating,
    Fatigue,
    Acne,
    Backache,
    Nausea,
    Other,
}

impl Symptom {
    pub const ALL: [Symptom; 8] = [
        Symptom::Cramps,
        Symptom::Headache,
        Symptom::Bloating,
        Symptom::Fatigue,
        Symptom::Acne,
        Symptom::Backache,
        Symptom::Nausea,
        Symptom::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Symptom::Cramps => "cramps",
            Symptom::Headache => "headache",
            Symptom::Bloating => "bloating",
            Symptom::Fatigue => "fatigue",
            Symptom::Acne => "acne",
            Symptom::Backache => "backache",
            Symptom::Nausea => "nausea",
            Symptom::Other => "other",
        }
    }
}

/// Mood vocabulary. Declaration order is the ranking tie-break order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Irritable,
    Anxious,
    #[default]
    Neutral,
    Energetic,
    Tired,
}

impl Mood {
    pub const ALL: [Mood; 7] = [
        Mood::Happy,
        Mood::Sad,
        Mood::Irritable,
        Mood::Anxious,
        Mood::Neutral,
        Mood::Energetic,
        Mood::Tired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Irritable => "irritable",
            Mood::Anxious => "anxious",
            Mood::Neutral => "neutral",
            Mood::Energetic => "energetic",
            Mood::Tired => "tired",
        }
    }
}

macro_rules! vocabulary_str {
    ($ty:ty, $field:literal) => {
        impl FromStr for $ty {
            type Err = EntryError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let needle = s.trim().to_ascii_lowercase();
                <$ty>::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == needle)
                    .ok_or_else(|| EntryError::UnknownTag {
                        field: $field,
                        value: s.to_string(),
                    })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

vocabulary_str!(FlowLevel, "flow");
vocabulary_str!(Symptom, "symptom");
vocabulary_str!(Mood, "mood");

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayEntry {
    pub date: NaiveDate,
    #[serde(default)]
    pub flow: FlowLevel,
    #[serde(default)]
    pub symptoms: BTreeSet<Symptom>,
    #[serde(default)]
    pub mood: Mood,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl DayEntry {
    /// A blank entry: no flow, no symptoms, neutral mood.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            flow: FlowLevel::None,
            symptoms: BTreeSet::new(),
            mood: Mood::Neutral,
            notes: None,
        }
    }

    pub fn with_flow(mut self, flow: FlowLevel) -> Self {
        self.flow = flow;
        self
    }

    pub fn with_symptoms(mut self, symptoms: impl IntoIterator<Item = Symptom>) -> Self {
        self.symptoms = symptoms.into_iter().collect();
        self
    }

    pub fn with_mood(mut self, mood: Mood) -> Self {
        self.mood = mood;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// A maximal run of calendar-consecutive days with flow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub length: i64,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            length: (end - start).num_days() + 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CyclePrediction {
    pub next_period_start: NaiveDate,
    pub ovulation_day: NaiveDate,
    pub fertile_window_start: NaiveDate,
    pub fertile_window_end: NaiveDate,
    /// 0-100
    pub confidence: u8,
}

impl CyclePrediction {
    /// Inclusive on both ends.
    pub fn is_fertile(&self, date: NaiveDate) -> bool {
        date >= self.fertile_window_start && date <= self.fertile_window_end
    }

    pub fn is_ovulation_day(&self, date: NaiveDate) -> bool {
        date == self.ovulation_day
    }

    pub fn is_predicted_period_start(&self, date: NaiveDate) -> bool {
        date == self.next_period_start
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CycleStatistics {
    pub average_cycle_length: i64,
    pub average_period_length: i64,
    pub top_symptoms: Vec<Symptom>,
    pub dominant_mood: Option<Mood>,
    pub total_periods: usize,
    pub shortest_cycle: Option<i64>,
    pub longest_cycle: Option<i64>,
    pub last_period_start: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Period,
    Fertile,
    Ovulation,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 3] = [
        NotificationKind::Period,
        NotificationKind::Fertile,
        NotificationKind::Ovulation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Period => "period",
            NotificationKind::Fertile => "fertile",
            NotificationKind::Ovulation => "ovulation",
        }
    }
}

vocabulary_str!(NotificationKind, "notification kind");

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationSetting {
    pub kind: NotificationKind,
    pub lead_days: u32,
    pub enabled: bool,
}

/// Reminder configuration, exactly one setting per kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "Vec<NotificationSetting>", into = "Vec<NotificationSetting>")]
pub struct NotificationSettings(Vec<NotificationSetting>);

impl Default for NotificationSettings {
    fn default() -> Self {
        Self(vec![
            NotificationSetting {
                kind: NotificationKind::Period,
                lead_days: 2,
                enabled: true,
            },
            NotificationSetting {
                kind: NotificationKind::Fertile,
                lead_days: 1,
                enabled: true,
            },
            NotificationSetting {
                kind: NotificationKind::Ovulation,
                lead_days: 1,
                enabled: true,
            },
        ])
    }
}

impl NotificationSettings {
    pub fn get(&self, kind: NotificationKind) -> Option<&NotificationSetting> {
        self.0.iter().find(|s| s.kind == kind)
    }

    /// Replace the setting for `setting.kind`, keeping one entry per kind.
    pub fn set(&mut self, setting: NotificationSetting) {
        match self.0.iter_mut().find(|s| s.kind == setting.kind) {
            Some(existing) => *existing = setting,
            None => self.0.push(setting),
        }
    }

    pub fn as_slice(&self) -> &[NotificationSetting] {
        &self.0
    }
}

/// Later settings for an already seen kind replace the earlier one.
impl From<Vec<NotificationSetting>> for NotificationSettings {
    fn from(settings: Vec<NotificationSetting>) -> Self {
        let mut deduped = Self(Vec::with_capacity(settings.len()));
        for setting in settings {
            deduped.set(setting);
        }
        deduped
    }
}

impl From<NotificationSettings> for Vec<NotificationSetting> {
    fn from(settings: NotificationSettings) -> Self {
        settings.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationTrigger {
    pub kind: NotificationKind,
    pub message: String,
}

pub const DATA_VERSION: u32 = 1;

/// The persisted document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppData {
    #[serde(default = "data_version")]
    pub version: u32,
    #[serde(default)]
    pub entries: EntryLog,
    #[serde(default)]
    pub notifications: NotificationSettings,
}

fn data_version() -> u32 {
    DATA_VERSION
}

impl Default for AppData {
    fn default() -> Self {
        Self {
            version: DATA_VERSION,
            entries: EntryLog::default(),
            notifications: NotificationSettings::default(),
        }
    }
}

/// Everything derived from one snapshot of the entry log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insights {
    pub periods: Vec<Period>,
    pub prediction: Option<CyclePrediction>,
    pub stats: CycleStatistics,
}

/// One calendar day as seen by a month view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayMarker {
    pub date: NaiveDate,
    pub flow: Option<FlowLevel>,
    pub predicted_period: bool,
    pub fertile: bool,
    pub ovulation: bool,
}

/// Data returned for a month view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthData {
    pub year: i32,
    pub month: u32,
    pub entries: Vec<DayEntry>,
    pub days: Vec<DayMarker>,
    pub prediction: Option<CyclePrediction>,
    pub stats: CycleStatistics,
}
