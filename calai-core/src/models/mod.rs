mod day_log;
mod meal_entry;
mod preset;

pub(crate) use day_log::clamp_non_negative;
pub use day_log::DayLog;
pub use meal_entry::{EntryItem, EntryKind, MealEntry, NewMealEntry};
pub use preset::{default_presets, NewPreset, Preset, PresetPatch, DEFAULT_EMOJI, DEFAULT_UNIT};
