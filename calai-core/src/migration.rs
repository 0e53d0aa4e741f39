//! Upgrading presets saved before macros were tracked.
//!
//! Older state files stored presets with only calories. When such a preset is
//! loaded, its macros are filled from the seed table for the six built-in ids
//! and zeroed for anything else. A preset that already has `proteinPerUnit`
//! counts as migrated and is left alone, so loading twice changes nothing.

use serde::{Deserialize, Deserializer};

use crate::models::{clamp_non_negative, default_presets, Preset, DEFAULT_EMOJI, DEFAULT_UNIT};

/// A preset as found on disk, possibly missing its macro fields.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredPreset {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "rounded_calories")]
    pub calories_per_unit: u32,
    pub protein_per_unit: Option<f64>,
    pub carbs_per_unit: Option<f64>,
    pub fats_per_unit: Option<f64>,
    pub fiber_per_unit: Option<f64>,
}

impl StoredPreset {
    pub fn needs_migration(&self) -> bool {
        self.protein_per_unit.is_none()
    }
}

/// Macros for the built-in preset with this id, if it is one.
pub fn seed_macros(id: &str) -> Option<[f64; 4]> {
    default_presets()
        .into_iter()
        .find(|p| p.id == id)
        .map(|p| p.macros_per_unit())
}

/// Converts stored presets into catalog presets, filling missing macros.
pub fn migrate_presets(stored: Vec<StoredPreset>) -> Vec<Preset> {
    stored.into_iter().map(migrate_preset).collect()
}

fn migrate_preset(stored: StoredPreset) -> Preset {
    let [protein, carbs, fats, fiber] = if stored.needs_migration() {
        let macros = seed_macros(&stored.id).unwrap_or([0.0; 4]);
        tracing::warn!(id = %stored.id, name = %stored.name, "Migrating legacy preset macros");
        macros
    } else {
        [
            stored.protein_per_unit.unwrap_or(0.0),
            stored.carbs_per_unit.unwrap_or(0.0),
            stored.fats_per_unit.unwrap_or(0.0),
            stored.fiber_per_unit.unwrap_or(0.0),
        ]
    };

    Preset {
        id: stored.id,
        name: stored.name,
        emoji: stored.emoji.unwrap_or_else(|| DEFAULT_EMOJI.to_string()),
        unit: stored.unit.unwrap_or_else(|| DEFAULT_UNIT.to_string()),
        calories_per_unit: stored.calories_per_unit,
        protein_per_unit: protein.max(0.0),
        carbs_per_unit: carbs.max(0.0),
        fats_per_unit: fats.max(0.0),
        fiber_per_unit: fiber.max(0.0),
    }
}

/// Reads and migrates an optional preset list.
pub(crate) fn deserialize_presets<'de, D>(deserializer: D) -> Result<Option<Vec<Preset>>, D::Error>
where
    D: Deserializer<'de>,
{
    let stored: Option<Vec<StoredPreset>> = Option::deserialize(deserializer)?;
    Ok(stored.map(migrate_presets))
}

/// Accepts any JSON number for a stored calorie or gram figure, rounds it
/// and clamps it at zero. `null` reads as 0.
pub(crate) fn rounded_calories<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0);
    Ok(clamp_non_negative(value.round() as i64))
}
