//! On-device cycle tracking.
//!
//! Daily entries go into an [`EntryLog`]. From one snapshot of that log the
//! engine derives periods ([`segment()`]), statistics ([`compute_stats`]), a
//! forward prediction ([`predict`]) and the reminders due today ([`evaluate`]).
//! All four are pure functions; [`Session`] ties them to an encrypted store.

pub mod calendar;
pub mod config;
pub mod crypto;
pub mod entry_log;
pub mod logging;
pub mod models;
pub mod notify;
pub mod prediction;
pub mod segment;
pub mod session;
pub mod stats;
pub mod storage;

pub use config::Config;
pub use entry_log::{parse_date, parse_entry, EntryError, EntryLog};
pub use models::{
    AppData, CyclePrediction, CycleStatistics, DayEntry, FlowLevel, Insights, Mood,
    NotificationKind, NotificationSetting, NotificationSettings, NotificationTrigger, Period,
    Symptom,
};
pub use notify::evaluate;
pub use prediction::predict;
pub use segment::segment;
pub use session::{derive_insights, Session, SessionError};
pub use stats::compute_stats;
pub use storage::{EncryptedFileStore, MemoryStore, StorageError, Store};
