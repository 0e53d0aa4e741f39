use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::LedgerError;

pub const DEFAULT_EMOJI: &str = "🍽️";
pub const DEFAULT_UNIT: &str = "serving";

/// A quick-track button: a food with fixed calories and macros per unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub unit: String,
    pub calories_per_unit: u32,
    pub protein_per_unit: f64,
    pub carbs_per_unit: f64,
    pub fats_per_unit: f64,
    pub fiber_per_unit: f64,
}

impl Preset {
    /// Calories for `quantity` units.
    pub fn calories_for(&self, quantity: u32) -> i64 {
        i64::from(quantity).saturating_mul(i64::from(self.calories_per_unit))
    }

    /// Per-unit macros in protein, carbs, fats, fiber order.
    pub fn macros_per_unit(&self) -> [f64; 4] {
        [
            self.protein_per_unit,
            self.carbs_per_unit,
            self.fats_per_unit,
            self.fiber_per_unit,
        ]
    }

    /// Applies a validated patch field by field. The id is never touched.
    pub(crate) fn apply(&mut self, patch: &ValidPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(emoji) = &patch.emoji {
            self.emoji = emoji.clone();
        }
        if let Some(unit) = &patch.unit {
            self.unit = unit.clone();
        }
        if let Some(calories) = patch.calories_per_unit {
            self.calories_per_unit = calories;
        }
        if let Some(protein) = patch.protein_per_unit {
            self.protein_per_unit = protein;
        }
        if let Some(carbs) = patch.carbs_per_unit {
            self.carbs_per_unit = carbs;
        }
        if let Some(fats) = patch.fats_per_unit {
            self.fats_per_unit = fats;
        }
        if let Some(fiber) = patch.fiber_per_unit {
            self.fiber_per_unit = fiber;
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {} kcal/{} (protein {}g, carbs {}g, fats {}g, fiber {}g)",
            self.emoji,
            self.name,
            self.calories_per_unit,
            self.unit,
            self.protein_per_unit,
            self.carbs_per_unit,
            self.fats_per_unit,
            self.fiber_per_unit
        )
    }
}

/// A preset that has not been added to a catalog yet (no id).
///
/// Calories are signed here so that bad input can be rejected with
/// [`LedgerError::InvalidPreset`] instead of failing to parse.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPreset {
    pub name: String,
    pub emoji: String,
    pub unit: String,
    pub calories_per_unit: i64,
    pub protein_per_unit: f64,
    pub carbs_per_unit: f64,
    pub fats_per_unit: f64,
    pub fiber_per_unit: f64,
}

impl NewPreset {
    pub fn new(name: impl Into<String>, calories_per_unit: i64) -> Self {
        Self {
            name: name.into(),
            emoji: DEFAULT_EMOJI.to_string(),
            unit: DEFAULT_UNIT.to_string(),
            calories_per_unit,
            protein_per_unit: 0.0,
            carbs_per_unit: 0.0,
            fats_per_unit: 0.0,
            fiber_per_unit: 0.0,
        }
    }

    pub fn with_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = emoji.into();
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_macros(mut self, protein: f64, carbs: f64, fats: f64, fiber: f64) -> Self {
        self.protein_per_unit = protein;
        self.carbs_per_unit = carbs;
        self.fats_per_unit = fats;
        self.fiber_per_unit = fiber;
        self
    }

    /// Checks the draft without adding it anywhere.
    pub fn validate(&self) -> Result<(), LedgerError> {
        self.clone().into_preset(String::new()).map(|_| ())
    }

    /// Validates and assigns `id`.
    pub(crate) fn into_preset(self, id: String) -> Result<Preset, LedgerError> {
        let name = validate_name(&self.name)?;
        let calories_per_unit = validate_calories(self.calories_per_unit)?;
        Ok(Preset {
            id,
            name,
            emoji: self.emoji,
            unit: self.unit,
            calories_per_unit,
            protein_per_unit: validate_grams("protein", self.protein_per_unit)?,
            carbs_per_unit: validate_grams("carbs", self.carbs_per_unit)?,
            fats_per_unit: validate_grams("fats", self.fats_per_unit)?,
            fiber_per_unit: validate_grams("fiber", self.fiber_per_unit)?,
        })
    }
}

/// Fields of a [`Preset`] that may be overridden by an update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresetPatch {
    pub name: Option<String>,
    pub emoji: Option<String>,
    pub unit: Option<String>,
    pub calories_per_unit: Option<i64>,
    pub protein_per_unit: Option<f64>,
    pub carbs_per_unit: Option<f64>,
    pub fats_per_unit: Option<f64>,
    pub fiber_per_unit: Option<f64>,
}

impl PresetPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub(crate) fn validate(&self) -> Result<ValidPatch, LedgerError> {
        let name = self.name.as_deref().map(validate_name).transpose()?;
        let calories_per_unit = self.calories_per_unit.map(validate_calories).transpose()?;
        let grams = |label: &str, value: Option<f64>| {
            value.map(|v| validate_grams(label, v)).transpose()
        };
        Ok(ValidPatch {
            name,
            emoji: self.emoji.clone(),
            unit: self.unit.clone(),
            calories_per_unit,
            protein_per_unit: grams("protein", self.protein_per_unit)?,
            carbs_per_unit: grams("carbs", self.carbs_per_unit)?,
            fats_per_unit: grams("fats", self.fats_per_unit)?,
            fiber_per_unit: grams("fiber", self.fiber_per_unit)?,
        })
    }
}

/// A patch whose values have passed validation.
#[derive(Debug)]
pub(crate) struct ValidPatch {
    name: Option<String>,
    emoji: Option<String>,
    unit: Option<String>,
    calories_per_unit: Option<u32>,
    protein_per_unit: Option<f64>,
    carbs_per_unit: Option<f64>,
    fats_per_unit: Option<f64>,
    fiber_per_unit: Option<f64>,
}

fn validate_name(name: &str) -> Result<String, LedgerError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::InvalidPreset("name cannot be empty".into()));
    }
    Ok(trimmed.to_string())
}

fn validate_calories(calories: i64) -> Result<u32, LedgerError> {
    u32::try_from(calories).map_err(|_| {
        LedgerError::InvalidPreset(format!(
            "calories per unit must be between 0 and {}, got {}",
            u32::MAX,
            calories
        ))
    })
}

fn validate_grams(label: &str, grams: f64) -> Result<f64, LedgerError> {
    if !grams.is_finite() || grams < 0.0 {
        return Err(LedgerError::InvalidPreset(format!(
            "{} per unit must be a non-negative number, got {}",
            label, grams
        )));
    }
    Ok(grams)
}

/// The six presets a fresh install starts with.
pub fn default_presets() -> Vec<Preset> {
    let seed = |id: &str, name: &str, emoji: &str, kcal: u32, unit: &str, m: [f64; 4]| Preset {
        id: id.to_string(),
        name: name.to_string(),
        emoji: emoji.to_string(),
        unit: unit.to_string(),
        calories_per_unit: kcal,
        protein_per_unit: m[0],
        carbs_per_unit: m[1],
        fats_per_unit: m[2],
        fiber_per_unit: m[3],
    };
    vec![
        seed("1", "Rice", "🍚", 200, "bowl", [4.0, 45.0, 0.5, 1.0]),
        seed("2", "Roti", "🫓", 120, "piece", [3.0, 20.0, 3.5, 2.0]),
        seed("3", "Dal", "🍲", 150, "bowl", [9.0, 20.0, 3.0, 4.0]),
        seed("4", "Chicken", "🍗", 250, "serving", [30.0, 0.0, 14.0, 0.0]),
        seed("5", "Egg", "🥚", 75, "piece", [6.0, 1.0, 5.0, 0.0]),
        seed("6", "Milk", "🥛", 150, "glass", [8.0, 12.0, 8.0, 0.0]),
    ]
}
