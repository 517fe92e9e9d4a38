use chrono::NaiveDate;

use crate::calendar;
use crate::entry_log::EntryError;
use crate::models::*;
use crate::notify;
use crate::prediction;
use crate::segment;
use crate::stats;
use crate::storage::{StorageError, Store};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("invalid entry: {0}")]
    Entry(#[from] EntryError),
    #[error("no data found, run `init` first")]
    NotInitialized,
    #[error("data already exists")]
    AlreadyInitialized,
    #[error("invalid month {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },
}

/// Derive everything from one snapshot of the entry log.
pub fn derive_insights(entries: &[DayEntry]) -> Insights {
    let periods = segment::segment(entries);
    let prediction = prediction::predict(&periods);
    let stats = stats::compute_stats(entries, &periods);
    Insights {
        periods,
        prediction,
        stats,
    }
}

/// Owns the loaded data and its store. Every mutation is persisted before it
/// takes effect; derived values are recomputed on request and never cached.
pub struct Session<S: Store> {
    store: S,
    data: AppData,
}

impl<S: Store> Session<S> {
    /// First-time setup: write an empty document.
    pub fn create(store: S) -> Result<Self, SessionError> {
        if store.exists()? {
            return Err(SessionError::AlreadyInitialized);
        }
        let data = AppData::default();
        store.save_all(&data)?;
        log::info!("event=session_create module=session status=ok");
        Ok(Self { store, data })
    }

    pub fn open(store: S) -> Result<Self, SessionError> {
        let data = match store.load_all() {
            Ok(data) => data,
            Err(StorageError::NotFound) => return Err(SessionError::NotInitialized),
            Err(e) => return Err(e.into()),
        };
        log::info!(
            "event=session_open module=session status=ok entries={}",
            data.entries.len()
        );
        Ok(Self { store, data })
    }

    pub fn data(&self) -> &AppData {
        &self.data
    }

    pub fn entry(&self, date: NaiveDate) -> Option<&DayEntry> {
        self.data.entries.get(date)
    }

    /// Insert or replace the entry for its date.
    pub fn log_day(&mut self, entry: DayEntry) -> Result<(), SessionError> {
        let date = entry.date;
        let mut next = self.data.clone();
        let replaced = next.entries.upsert(entry)?;
        self.commit(next)?;
        log::info!(
            "event=entry_saved module=session date={} replaced={}",
            date,
            replaced.is_some()
        );
        Ok(())
    }

    /// Returns whether an entry existed for `date`.
    pub fn delete_day(&mut self, date: NaiveDate) -> Result<bool, SessionError> {
        let mut next = self.data.clone();
        if next.entries.remove(date).is_none() {
            return Ok(false);
        }
        self.commit(next)?;
        log::info!("event=entry_deleted module=session date={}", date);
        Ok(true)
    }

    pub fn insights(&self) -> Insights {
        derive_insights(self.data.entries.as_slice())
    }

    pub fn prediction(&self) -> Option<CyclePrediction> {
        self.insights().prediction
    }

    pub fn stats(&self) -> CycleStatistics {
        self.insights().stats
    }

    pub fn month(&self, year: i32, month: u32) -> Result<MonthData, SessionError> {
        let (first, last) =
            calendar::month_bounds(year, month).ok_or(SessionError::InvalidMonth { year, month })?;
        let insights = self.insights();
        let days = calendar::day_markers(&self.data.entries, insights.prediction.as_ref(), first, last);

        Ok(MonthData {
            year,
            month,
            entries: self.data.entries.between(first, last),
            days,
            prediction: insights.prediction,
            stats: insights.stats,
        })
    }

    pub fn notification_settings(&self) -> &NotificationSettings {
        &self.data.notifications
    }

    pub fn update_notification(&mut self, setting: NotificationSetting) -> Result<(), SessionError> {
        let mut next = self.data.clone();
        next.notifications.set(setting);
        self.commit(next)?;
        log::info!(
            "event=notification_updated module=session kind={} lead_days={} enabled={}",
            setting.kind.as_str(),
            setting.lead_days,
            setting.enabled
        );
        Ok(())
    }

    /// Reminders due on `today`. Calling twice on one day yields the same list.
    pub fn due_notifications(&self, today: NaiveDate) -> Vec<NotificationTrigger> {
        let prediction = self.prediction();
        let due = notify::evaluate(
            prediction.as_ref(),
            self.data.notifications.as_slice(),
            today,
        );
        log::debug!(
            "event=notifications_checked module=session today={} due={}",
            today,
            due.len()
        );
        due
    }

    pub fn export_json(&self) -> Result<String, SessionError> {
        serde_json::to_string_pretty(&self.data)
            .map_err(|e| SessionError::Storage(StorageError::Serialization(e)))
    }

    /// Delete all data permanently, consuming the session.
    pub fn wipe(self) -> Result<(), SessionError> {
        self.store.wipe()?;
        log::info!("event=session_wipe module=session status=ok");
        Ok(())
    }

    /// Save `next` and only then make it the current data. A failed save
    /// leaves the session as it was.
    fn commit(&mut self, next: AppData) -> Result<(), SessionError> {
        self.store.save_all(&next).map_err(|e| {
            log::error!("event=store_save module=session status=error err={}", e);
            SessionError::from(e)
        })?;
        self.data = next;
        Ok(())
    }
}
