//! calai core library
//!
//! Day-by-day calorie ledger, quick-track presets, AI estimation and the
//! saved-state format shared by calai front ends.

pub mod catalog;
pub mod date;
pub mod error;
pub mod estimate;
pub mod ledger;
pub mod migration;
pub mod models;
pub mod state;
pub mod storage;

pub use catalog::PresetCatalog;
pub use date::{week_window, DateKey};
pub use error::LedgerError;
pub use estimate::{
    Attachment, Estimate, EstimateError, EstimateRequest, GroqClient, PendingEstimate,
};
pub use ledger::{
    recompute, DailyProgress, DayNutrition, DayStatus, DaySummary, Drift, Ledger, LineSource,
    MacroTotals, NutritionLine, ProgressStatus, WeeklyTotals, DEFAULT_MAINTENANCE_CALORIES,
};
pub use models::{
    DayLog, EntryItem, EntryKind, MealEntry, NewMealEntry, NewPreset, Preset, PresetPatch,
};
pub use state::{SavedState, Tracker};
pub use storage::{StateStorage, StorageError};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
