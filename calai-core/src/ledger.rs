//! The per-day ledger: dated logs, cached totals and weekly summaries.
//!
//! Every mutation updates a day's cached `total_calories` in the same step as
//! the change itself, re-clamping at zero each time. Because of that clamp,
//! add-then-remove is not always a round trip: burning more than the current
//! total and then deleting the exercise entry leaves the day higher than it
//! started.
//!
//! Totals are never recomputed from scratch implicitly. [`recompute`],
//! [`Ledger::verify`] and [`Ledger::repair`] exist for explicit checks; they
//! count presets missing from the catalog as zero.

use chrono::Utc;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use crate::catalog::PresetCatalog;
use crate::date::{week_window, DateKey};
use crate::error::LedgerError;
use crate::models::{clamp_non_negative, DayLog, EntryKind, MealEntry, NewMealEntry};

pub const DEFAULT_MAINTENANCE_CALORIES: u32 = 2000;

/// Share of maintenance at which a day counts as "almost there".
const ALMOST_THERE_PERCENT: f64 = 90.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    day_logs: BTreeMap<DateKey, DayLog>,
    active_date: DateKey,
    maintenance_calories: u32,
}

impl Ledger {
    /// Empty ledger focused on `active_date` with the default target.
    pub fn new(active_date: DateKey) -> Self {
        Self {
            day_logs: BTreeMap::new(),
            active_date,
            maintenance_calories: DEFAULT_MAINTENANCE_CALORIES,
        }
    }

    pub fn with_day_logs(mut self, day_logs: BTreeMap<DateKey, DayLog>) -> Self {
        self.day_logs = day_logs;
        self
    }

    pub fn with_maintenance_calories(mut self, calories: u32) -> Result<Self, LedgerError> {
        self.set_maintenance_calories(calories)?;
        Ok(self)
    }

    pub fn active_date(&self) -> DateKey {
        self.active_date
    }

    pub fn set_active_date(&mut self, key: DateKey) {
        self.active_date = key;
    }

    pub fn maintenance_calories(&self) -> u32 {
        self.maintenance_calories
    }

    pub fn set_maintenance_calories(&mut self, calories: u32) -> Result<(), LedgerError> {
        if calories == 0 {
            return Err(LedgerError::InvalidSetting(
                "maintenance calories must be greater than 0".into(),
            ));
        }
        tracing::debug!(calories, "Setting maintenance calories");
        self.maintenance_calories = calories;
        Ok(())
    }

    /// Stored logs, including ones that have become empty.
    pub fn day_logs(&self) -> &BTreeMap<DateKey, DayLog> {
        &self.day_logs
    }

    /// The log for `key`, or an empty one. Reading never creates a log.
    pub fn day_log(&self, key: DateKey) -> Cow<'_, DayLog> {
        self.day_logs
            .get(&key)
            .map(Cow::Borrowed)
            .unwrap_or_default()
    }

    /// The log for the active date.
    pub fn current_day(&self) -> Cow<'_, DayLog> {
        self.day_log(self.active_date)
    }

    /// Changes a preset's quantity on the active date by `delta`, never going
    /// below zero.
    ///
    /// Returns the new quantity, or `None` (with nothing changed) when the
    /// preset is not in `catalog`.
    pub fn adjust_preset_quantity(
        &mut self,
        catalog: &PresetCatalog,
        preset_id: &str,
        delta: i64,
    ) -> Option<u32> {
        let Some(preset) = catalog.get(preset_id) else {
            tracing::debug!(preset_id, "Ignoring quantity change for unknown preset");
            return None;
        };

        let day = self.day_logs.entry(self.active_date).or_default();
        let old_qty = day.quantity(preset_id);
        let new_qty = clamp_non_negative(i64::from(old_qty).saturating_add(delta));
        let calorie_delta = preset.calories_for(new_qty) - preset.calories_for(old_qty);

        day.set_quantity(preset_id, new_qty);
        day.shift_total(calorie_delta);
        tracing::debug!(
            date = %self.active_date,
            preset_id,
            old_qty,
            new_qty,
            total = day.total_calories(),
            "Adjusted preset quantity"
        );
        Some(new_qty)
    }

    /// Stamps `entry` with the current time and appends it to the active date.
    pub fn add_entry(&mut self, entry: NewMealEntry) -> &MealEntry {
        let entry = entry.stamp(Utc::now());
        let delta = entry.signed_calories();
        let date = self.active_date;

        let day = self.day_logs.entry(date).or_default();
        day.push_entry(entry);
        day.shift_total(delta);
        tracing::debug!(date = %date, delta, total = day.total_calories(), "Added entry");

        let entries = day.entries();
        &entries[entries.len() - 1]
    }

    /// Removes the entry at `index` on the active date and reverses its
    /// contribution. Out-of-range indexes are a no-op returning `None`.
    pub fn remove_entry(&mut self, index: usize) -> Option<MealEntry> {
        let date = self.active_date;
        let day = self.day_logs.get_mut(&date)?;
        let entry = day.take_entry(index)?;
        day.shift_total(-entry.signed_calories());
        tracing::debug!(
            date = %date,
            index,
            total = day.total_calories(),
            "Removed entry"
        );
        Some(entry)
    }

    /// Seven days around `center`, each compared against maintenance.
    pub fn weekly_summary(&self, center: DateKey) -> Vec<DaySummary> {
        week_window(center)
            .into_iter()
            .map(|date| {
                DaySummary::new(
                    date,
                    self.day_log(date).total_calories(),
                    self.maintenance_calories,
                )
            })
            .collect()
    }

    /// Consumption against the target for one day.
    pub fn daily_progress(&self, key: DateKey) -> DailyProgress {
        let consumed = self.day_log(key).total_calories();
        let maintenance = self.maintenance_calories;
        let percentage =
            (f64::from(consumed) / f64::from(maintenance.max(1)) * 100.0).min(100.0);
        let status = if percentage >= 100.0 {
            ProgressStatus::OverLimit
        } else if percentage >= ALMOST_THERE_PERCENT {
            ProgressStatus::AlmostThere
        } else {
            ProgressStatus::OnTrack
        };

        DailyProgress {
            date: key,
            consumed,
            maintenance,
            remaining: i64::from(maintenance) - i64::from(consumed),
            percentage,
            status,
        }
    }

    /// Calories contributed by quick-tracked presets still in the catalog.
    pub fn preset_calories(&self, key: DateKey, catalog: &PresetCatalog) -> i64 {
        let day = self.day_log(key);
        catalog
            .list()
            .iter()
            .map(|p| p.calories_for(day.quantity(&p.id)))
            .sum()
    }

    /// Per-line macro breakdown for a day: presets first, then entries.
    pub fn day_nutrition(&self, key: DateKey, catalog: &PresetCatalog) -> DayNutrition {
        let day = self.day_log(key);
        let mut lines = Vec::new();

        for preset in catalog.list() {
            let qty = day.quantity(&preset.id);
            if qty == 0 {
                continue;
            }
            let units = f64::from(qty);
            let [protein, carbs, fats, fiber] = preset.macros_per_unit();
            lines.push(NutritionLine {
                label: format!("{} {} x {}", preset.emoji, preset.name, qty),
                source: LineSource::Preset,
                calories: preset.calories_for(qty),
                protein: units * protein,
                carbs: units * carbs,
                fats: units * fats,
                fiber: units * fiber,
            });
        }

        for entry in day.entries() {
            let [protein, carbs, fats, fiber] = entry.macros().map(f64::from);
            lines.push(NutritionLine {
                label: entry.description().to_string(),
                source: match entry.kind() {
                    EntryKind::Food => LineSource::Food,
                    EntryKind::Exercise => LineSource::Exercise,
                },
                calories: entry.signed_calories(),
                protein,
                carbs,
                fats,
                fiber,
            });
        }

        let totals = lines.iter().fold(MacroTotals::default(), |acc, line| MacroTotals {
            calories: acc.calories + line.calories,
            protein: acc.protein + line.protein,
            carbs: acc.carbs + line.carbs,
            fats: acc.fats + line.fats,
            fiber: acc.fiber + line.fiber,
        });

        DayNutrition { date: key, lines, totals }
    }

    /// Days whose cached total disagrees with a from-scratch recomputation.
    pub fn verify(&self, catalog: &PresetCatalog) -> Vec<Drift> {
        self.day_logs
            .iter()
            .filter_map(|(date, day)| Drift::detect(*date, day, catalog))
            .collect()
    }

    /// Overwrites the cached total for `key` with [`recompute`].
    ///
    /// Returns the drift that was repaired, if any.
    pub fn repair(&mut self, key: DateKey, catalog: &PresetCatalog) -> Option<Drift> {
        let day = self.day_logs.get_mut(&key)?;
        let drift = Drift::detect(key, day, catalog)?;
        tracing::warn!(
            date = %key,
            cached = drift.cached,
            recomputed = drift.recomputed,
            orphaned = drift.orphaned_presets.len(),
            "Repairing cached day total"
        );
        day.set_total(drift.recomputed);
        Some(drift)
    }
}

/// Net calories for a day computed from its entries and the current catalog.
///
/// Quantities for presets that no longer exist contribute nothing.
pub fn recompute(day: &DayLog, catalog: &PresetCatalog) -> u32 {
    let entries: i64 = day.entries().iter().map(MealEntry::signed_calories).sum();
    let presets: i64 = day
        .preset_quantities()
        .iter()
        .filter_map(|(id, qty)| catalog.get(id).map(|p| p.calories_for(*qty)))
        .sum();
    clamp_non_negative(entries + presets)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    Empty,
    Surplus,
    Deficit,
}

impl fmt::Display for DayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayStatus::Empty => write!(f, "empty"),
            DayStatus::Surplus => write!(f, "surplus"),
            DayStatus::Deficit => write!(f, "deficit"),
        }
    }
}

/// One row of the weekly summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub date: DateKey,
    pub total_calories: u32,
    pub maintenance: u32,
    pub difference: i64,
    pub status: DayStatus,
}

impl DaySummary {
    /// Zero means no data, so it is `Empty` whatever the target is.
    /// Exactly at maintenance counts as a deficit.
    pub fn new(date: DateKey, total_calories: u32, maintenance: u32) -> Self {
        let difference = i64::from(total_calories) - i64::from(maintenance);
        let status = if total_calories == 0 {
            DayStatus::Empty
        } else if difference > 0 {
            DayStatus::Surplus
        } else {
            DayStatus::Deficit
        };
        Self {
            date,
            total_calories,
            maintenance,
            difference,
            status,
        }
    }
}

/// Aggregate over the tracked days of a weekly summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyTotals {
    pub net_difference: i64,
    pub tracked_days: usize,
}

impl WeeklyTotals {
    pub fn from_summary(summary: &[DaySummary]) -> Self {
        let tracked = summary.iter().filter(|d| d.status != DayStatus::Empty);
        Self {
            net_difference: tracked.clone().map(|d| d.difference).sum(),
            tracked_days: tracked.count(),
        }
    }

    /// "Surplus" for a non-negative net, "Deficit" otherwise.
    pub fn label(&self) -> &'static str {
        if self.net_difference >= 0 {
            "Surplus"
        } else {
            "Deficit"
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    OnTrack,
    AlmostThere,
    OverLimit,
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressStatus::OnTrack => write!(f, "On Track"),
            ProgressStatus::AlmostThere => write!(f, "Almost There"),
            ProgressStatus::OverLimit => write!(f, "Over Limit"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyProgress {
    pub date: DateKey,
    pub consumed: u32,
    pub maintenance: u32,
    /// Negative once the target is exceeded.
    pub remaining: i64,
    /// Capped at 100.
    pub percentage: f64,
    pub status: ProgressStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineSource {
    Preset,
    Food,
    Exercise,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutritionLine {
    pub label: String,
    pub source: LineSource,
    pub calories: i64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub fiber: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MacroTotals {
    pub calories: i64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub fiber: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayNutrition {
    pub date: DateKey,
    pub lines: Vec<NutritionLine>,
    pub totals: MacroTotals,
}

/// A day whose cached total no longer matches its contents.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Drift {
    pub date: DateKey,
    pub cached: u32,
    pub recomputed: u32,
    /// Preset ids with a recorded quantity but no catalog entry.
    pub orphaned_presets: Vec<String>,
}

impl Drift {
    fn detect(date: DateKey, day: &DayLog, catalog: &PresetCatalog) -> Option<Self> {
        let recomputed = recompute(day, catalog);
        if recomputed == day.total_calories() {
            return None;
        }
        let orphaned_presets = day
            .preset_quantities()
            .iter()
            .filter(|(id, qty)| **qty > 0 && catalog.get(id).is_none())
            .map(|(id, _)| id.clone())
            .collect();
        Some(Self {
            date,
            cached: day.total_calories(),
            recomputed,
            orphaned_presets,
        })
    }
}
