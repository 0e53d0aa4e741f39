//! Turning the model's reply into an estimate.
//!
//! Replies are supposed to be bare JSON but often arrive wrapped in code
//! fences or surrounded by prose. Fences are stripped first; if that still
//! doesn't parse, the outermost `{...}` span is tried before giving up.

use lazy_static::lazy_static;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::EstimateError;
use crate::models::{clamp_non_negative, EntryItem, EntryKind, NewMealEntry};

lazy_static! {
    static ref JSON_OBJECT_RE: Regex = Regex::new(r"(?s)\{.*\}").unwrap();
}

/// A parsed estimate, not yet in any day log.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Estimate {
    pub kind: EntryKind,
    pub total_calories: u32,
    pub total_protein: u32,
    pub total_carbs: u32,
    pub total_fats: u32,
    pub total_fiber: u32,
    pub items: Vec<EntryItem>,
    pub explanation: String,
}

impl Estimate {
    /// Calories with the sign the entry would contribute.
    pub fn signed_calories(&self) -> i64 {
        self.kind.sign() * i64::from(self.total_calories)
    }

    /// The entry this estimate becomes once confirmed.
    pub fn into_entry(self, description: impl Into<String>) -> NewMealEntry {
        NewMealEntry {
            kind: self.kind,
            description: description.into(),
            total_calories: self.total_calories,
            total_protein: self.total_protein,
            total_carbs: self.total_carbs,
            total_fats: self.total_fats,
            total_fiber: self.total_fiber,
            items: self.items,
            explanation: self.explanation,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawEstimate {
    #[serde(alias = "type")]
    kind: Option<String>,
    total_calories: Option<Value>,
    total_protein: Option<Value>,
    total_carbs: Option<Value>,
    total_fats: Option<Value>,
    total_fiber: Option<Value>,
    items: Option<Vec<RawItem>>,
    explanation: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawItem {
    name: Option<String>,
    calories: Option<Value>,
    protein: Option<Value>,
    carbs: Option<Value>,
    fats: Option<Value>,
    fiber: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCalories {
    calories: Option<Value>,
}

/// Rounds a JSON number (or numeric string) to whole units. Missing,
/// non-numeric and negative values become 0.
fn rounded(value: &Option<Value>) -> u32 {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match number {
        Some(n) if n.is_finite() => clamp_non_negative(n.round() as i64),
        _ => 0,
    }
}

fn strip_fences(text: &str) -> String {
    text.replace("```json", "")
        .replace("```JSON", "")
        .replace("```", "")
        .trim()
        .to_string()
}

fn extract_json<T: DeserializeOwned>(text: &str) -> Result<T, EstimateError> {
    let stripped = strip_fences(text);
    match serde_json::from_str(&stripped) {
        Ok(parsed) => Ok(parsed),
        Err(first) => {
            let Some(found) = JSON_OBJECT_RE.find(text) else {
                return Err(EstimateError::GatewayParseError(first.to_string()));
            };
            tracing::debug!("Falling back to embedded JSON object in reply");
            serde_json::from_str(found.as_str())
                .map_err(|e| EstimateError::GatewayParseError(e.to_string()))
        }
    }
}

/// Parses a meal/exercise estimate reply.
pub fn parse_estimate(text: &str) -> Result<Estimate, EstimateError> {
    let raw: RawEstimate = extract_json(text)?;

    let kind = raw
        .kind
        .as_deref()
        .and_then(|k| k.parse().ok())
        .unwrap_or_default();

    let items = raw
        .items
        .unwrap_or_default()
        .into_iter()
        .map(|item| EntryItem {
            name: item.name.unwrap_or_default(),
            calories: rounded(&item.calories),
            protein: rounded(&item.protein),
            carbs: rounded(&item.carbs),
            fats: rounded(&item.fats),
            fiber: rounded(&item.fiber),
        })
        .collect();

    Ok(Estimate {
        kind,
        total_calories: rounded(&raw.total_calories),
        total_protein: rounded(&raw.total_protein),
        total_carbs: rounded(&raw.total_carbs),
        total_fats: rounded(&raw.total_fats),
        total_fiber: rounded(&raw.total_fiber),
        items,
        explanation: raw.explanation.unwrap_or_default(),
    })
}

/// Parses a `{"calories": n, "note": "..."}` reply.
pub fn parse_calorie_answer(text: &str) -> Result<u32, EstimateError> {
    let raw: RawCalories = extract_json(text)?;
    Ok(rounded(&raw.calories))
}
