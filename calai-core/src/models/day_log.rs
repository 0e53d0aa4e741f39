use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::meal_entry::MealEntry;

/// Everything logged for one calendar day.
///
/// `total_calories` is a cached net total. It is only written by the ledger,
/// in the same step as the change that invalidates it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayLog {
    #[serde(default, alias = "meals")]
    entries: Vec<MealEntry>,
    #[serde(default, alias = "buttonQuantities")]
    preset_quantities: BTreeMap<String, u32>,
    #[serde(default, deserialize_with = "crate::migration::rounded_calories")]
    total_calories: u32,
}

impl DayLog {
    pub fn entries(&self) -> &[MealEntry] {
        &self.entries
    }

    pub fn preset_quantities(&self) -> &BTreeMap<String, u32> {
        &self.preset_quantities
    }

    /// Quantity of a preset consumed this day (0 when never tracked).
    pub fn quantity(&self, preset_id: &str) -> u32 {
        self.preset_quantities.get(preset_id).copied().unwrap_or(0)
    }

    pub fn total_calories(&self) -> u32 {
        self.total_calories
    }

    /// No entries and no non-zero quantities: same as a missing day.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.preset_quantities.values().all(|q| *q == 0)
    }

    pub(crate) fn set_quantity(&mut self, preset_id: &str, quantity: u32) {
        self.preset_quantities.insert(preset_id.to_string(), quantity);
    }

    pub(crate) fn push_entry(&mut self, entry: MealEntry) {
        self.entries.push(entry);
    }

    pub(crate) fn take_entry(&mut self, index: usize) -> Option<MealEntry> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }

    /// Adds `delta` to the cached total, clamping at zero.
    pub(crate) fn shift_total(&mut self, delta: i64) {
        let shifted = i64::from(self.total_calories).saturating_add(delta);
        self.total_calories = clamp_non_negative(shifted);
    }

    pub(crate) fn set_total(&mut self, total: u32) {
        self.total_calories = total;
    }
}

/// Clamps a signed figure into `0..=u32::MAX`.
pub(crate) fn clamp_non_negative(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}
