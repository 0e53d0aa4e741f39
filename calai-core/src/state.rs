//! The persisted state blob and the context that owns it at runtime.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::PresetCatalog;
use crate::date::DateKey;
use crate::estimate::{EstimateRequest, PriorEntry, PresetUsage};
use crate::ledger::{Ledger, DEFAULT_MAINTENANCE_CALORIES};
use crate::migration::{deserialize_presets, rounded_calories};
use crate::models::{DayLog, Preset};

/// Everything written to disk, in the JSON shape older installs used.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedState {
    #[serde(default, alias = "dailyLogs")]
    pub day_logs: BTreeMap<DateKey, DayLog>,
    #[serde(
        default,
        alias = "buttons",
        deserialize_with = "deserialize_presets",
        skip_serializing_if = "Option::is_none"
    )]
    pub presets: Option<Vec<Preset>>,
    #[serde(default, deserialize_with = "optional_calories")]
    pub maintenance_calories: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groq_api_key: Option<String>,
}

fn optional_calories<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Rounded(#[serde(deserialize_with = "rounded_calories")] u32);

    Ok(Option::<Rounded>::deserialize(deserializer)?.map(|r| r.0))
}

/// Ledger, catalog and gateway credential for one session.
///
/// The CLI builds exactly one of these per invocation and routes every
/// mutation through it.
#[derive(Debug, Clone, PartialEq)]
pub struct Tracker {
    pub ledger: Ledger,
    pub catalog: PresetCatalog,
    groq_api_key: Option<String>,
}

impl Tracker {
    /// Fresh state: seed presets, no logs, default maintenance.
    pub fn new(active_date: DateKey) -> Self {
        Self {
            ledger: Ledger::new(active_date),
            catalog: PresetCatalog::with_defaults(),
            groq_api_key: None,
        }
    }

    /// Rebuilds the runtime state from a loaded blob.
    ///
    /// A missing or zero maintenance figure falls back to the default, and a
    /// missing preset list means the seed catalog.
    pub fn from_saved(saved: SavedState, active_date: DateKey) -> Self {
        let maintenance = saved
            .maintenance_calories
            .filter(|kcal| *kcal > 0)
            .unwrap_or(DEFAULT_MAINTENANCE_CALORIES);
        let catalog = match saved.presets {
            Some(presets) => PresetCatalog::new(presets),
            None => PresetCatalog::with_defaults(),
        };

        let mut ledger = Ledger::new(active_date).with_day_logs(saved.day_logs);
        // Filtered above, cannot be rejected.
        let _ = ledger.set_maintenance_calories(maintenance);

        tracing::debug!(
            days = ledger.day_logs().len(),
            presets = catalog.len(),
            maintenance,
            "Restored saved state"
        );

        Self {
            ledger,
            catalog,
            groq_api_key: saved.groq_api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    pub fn to_saved(&self) -> SavedState {
        SavedState {
            day_logs: self.ledger.day_logs().clone(),
            presets: Some(self.catalog.list().to_vec()),
            maintenance_calories: Some(self.ledger.maintenance_calories()),
            groq_api_key: self.groq_api_key.clone(),
        }
    }

    pub fn groq_api_key(&self) -> Option<&str> {
        self.groq_api_key.as_deref()
    }

    /// Stores the gateway credential; blank clears it.
    pub fn set_groq_api_key(&mut self, key: Option<String>) {
        self.groq_api_key = key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
    }

    /// Quick-track change on the active date.
    pub fn adjust_preset_quantity(&mut self, preset_id: &str, delta: i64) -> Option<u32> {
        self.ledger
            .adjust_preset_quantity(&self.catalog, preset_id, delta)
    }

    /// Builds a gateway request carrying what has been eaten on the active
    /// date so far.
    pub fn estimate_request(&self, description: Option<String>) -> EstimateRequest {
        let day = self.ledger.current_day();

        let presets = self
            .catalog
            .list()
            .iter()
            .filter_map(|preset| {
                let quantity = day.quantity(&preset.id);
                (quantity > 0).then(|| PresetUsage {
                    name: preset.name.clone(),
                    quantity,
                    calories_per_unit: preset.calories_per_unit,
                    unit: preset.unit.clone(),
                })
            })
            .collect();

        let prior_entries = day
            .entries()
            .iter()
            .map(|entry| PriorEntry {
                description: entry.description().to_string(),
                total_calories: entry.total_calories(),
            })
            .collect();

        EstimateRequest::new(description)
            .with_presets(presets)
            .with_prior_entries(prior_entries)
    }
}
