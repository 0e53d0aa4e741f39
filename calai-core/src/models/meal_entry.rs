use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether an entry adds calories (food) or burns them (exercise).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    #[default]
    Food,
    Exercise,
}

impl EntryKind {
    /// +1 for food, -1 for exercise.
    pub fn sign(&self) -> i64 {
        match self {
            EntryKind::Food => 1,
            EntryKind::Exercise => -1,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Food => write!(f, "food"),
            EntryKind::Exercise => write!(f, "exercise"),
        }
    }
}

impl FromStr for EntryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "food" | "meal" => Ok(EntryKind::Food),
            "exercise" | "workout" => Ok(EntryKind::Exercise),
            _ => Err(format!(
                "Invalid entry kind '{}'. Valid options: food, exercise",
                s
            )),
        }
    }
}

/// One line of an estimate breakdown, e.g. "2 parathas".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EntryItem {
    pub name: String,
    #[serde(deserialize_with = "crate::migration::rounded_calories")]
    pub calories: u32,
    #[serde(deserialize_with = "crate::migration::rounded_calories")]
    pub protein: u32,
    #[serde(deserialize_with = "crate::migration::rounded_calories")]
    pub carbs: u32,
    #[serde(deserialize_with = "crate::migration::rounded_calories")]
    pub fats: u32,
    #[serde(deserialize_with = "crate::migration::rounded_calories")]
    pub fiber: u32,
}

impl EntryItem {
    pub fn new(name: impl Into<String>, calories: u32) -> Self {
        Self {
            name: name.into(),
            calories,
            ..Default::default()
        }
    }
}

/// A logged food or exercise record. Immutable once stamped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MealEntry {
    #[serde(default, alias = "type")]
    kind: EntryKind,
    #[serde(default)]
    description: String,
    #[serde(default, deserialize_with = "crate::migration::rounded_calories")]
    total_calories: u32,
    #[serde(default, deserialize_with = "crate::migration::rounded_calories")]
    total_protein: u32,
    #[serde(default, deserialize_with = "crate::migration::rounded_calories")]
    total_carbs: u32,
    #[serde(default, deserialize_with = "crate::migration::rounded_calories")]
    total_fats: u32,
    #[serde(default, deserialize_with = "crate::migration::rounded_calories")]
    total_fiber: u32,
    #[serde(default)]
    items: Vec<EntryItem>,
    #[serde(default)]
    explanation: String,
    timestamp: DateTime<Utc>,
}

impl MealEntry {
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn total_calories(&self) -> u32 {
        self.total_calories
    }

    /// Calorie effect on the day total: positive for food, negative for exercise.
    pub fn signed_calories(&self) -> i64 {
        self.kind.sign() * i64::from(self.total_calories)
    }

    /// Protein, carbs, fats, fiber in grams.
    pub fn macros(&self) -> [u32; 4] {
        [
            self.total_protein,
            self.total_carbs,
            self.total_fats,
            self.total_fiber,
        ]
    }

    pub fn items(&self) -> &[EntryItem] {
        &self.items
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl fmt::Display for MealEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = match self.kind {
            EntryKind::Food => "+",
            EntryKind::Exercise => "-",
        };
        write!(
            f,
            "[{}] {} ({}{} kcal)",
            self.kind, self.description, sign, self.total_calories
        )
    }
}

/// An entry that has been confirmed but not yet appended to a day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewMealEntry {
    pub kind: EntryKind,
    pub description: String,
    pub total_calories: u32,
    pub total_protein: u32,
    pub total_carbs: u32,
    pub total_fats: u32,
    pub total_fiber: u32,
    pub items: Vec<EntryItem>,
    pub explanation: String,
}

impl NewMealEntry {
    pub fn food(description: impl Into<String>, total_calories: u32) -> Self {
        Self {
            kind: EntryKind::Food,
            description: description.into(),
            total_calories,
            ..Default::default()
        }
    }

    pub fn exercise(description: impl Into<String>, total_calories: u32) -> Self {
        Self {
            kind: EntryKind::Exercise,
            description: description.into(),
            total_calories,
            ..Default::default()
        }
    }

    pub fn with_macros(mut self, protein: u32, carbs: u32, fats: u32, fiber: u32) -> Self {
        self.total_protein = protein;
        self.total_carbs = carbs;
        self.total_fats = fats;
        self.total_fiber = fiber;
        self
    }

    pub fn with_items(mut self, items: Vec<EntryItem>) -> Self {
        self.items = items;
        self
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    /// Stamps the entry. Exercise entries never carry macros.
    pub(crate) fn stamp(self, timestamp: DateTime<Utc>) -> MealEntry {
        let macros = match self.kind {
            EntryKind::Food => [
                self.total_protein,
                self.total_carbs,
                self.total_fats,
                self.total_fiber,
            ],
            EntryKind::Exercise => [0; 4],
        };
        MealEntry {
            kind: self.kind,
            description: self.description,
            total_calories: self.total_calories,
            total_protein: macros[0],
            total_carbs: macros[1],
            total_fats: macros[2],
            total_fiber: macros[3],
            items: self.items,
            explanation: self.explanation,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_kind_from_str() {
        assert_eq!(EntryKind::from_str("FOOD").unwrap(), EntryKind::Food);
        assert_eq!(EntryKind::from_str("exercise").unwrap(), EntryKind::Exercise);
        assert!(EntryKind::from_str("nap").is_err());
    }

    #[test]
    fn test_signed_calories() {
        let now = Utc::now();
        let lunch = NewMealEntry::food("Thali", 650).stamp(now);
        let run = NewMealEntry::exercise("5k run", 320).stamp(now);
        assert_eq!(lunch.signed_calories(), 650);
        assert_eq!(run.signed_calories(), -320);
    }

    #[test]
    fn test_stamp_keeps_food_macros() {
        let entry = NewMealEntry::food("Paneer wrap", 420)
            .with_macros(18, 40, 20, 4)
            .with_items(vec![EntryItem::new("wrap", 420)])
            .with_explanation("One medium wrap")
            .stamp(Utc::now());
        assert_eq!(entry.macros(), [18, 40, 20, 4]);
        assert_eq!(entry.items().len(), 1);
        assert_eq!(entry.explanation(), "One medium wrap");
    }

    #[test]
    fn test_stamp_drops_exercise_macros() {
        let entry = NewMealEntry::exercise("Cycling", 300)
            .with_macros(5, 5, 5, 5)
            .stamp(Utc::now());
        assert_eq!(entry.macros(), [0, 0, 0, 0]);
    }

    #[test]
    fn test_display() {
        let run = NewMealEntry::exercise("Run", 200).stamp(Utc::now());
        assert_eq!(run.to_string(), "[exercise] Run (-200 kcal)");
    }

    #[test]
    fn test_legacy_json_without_kind_or_macros() {
        let json = r#"{
            "description": "2 parathas",
            "totalCalories": 520,
            "items": [{"name": "paratha", "calories": 260}],
            "explanation": "",
            "timestamp": "2025-01-01T08:30:00.000Z"
        }"#;
        let entry: MealEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.kind(), EntryKind::Food);
        assert_eq!(entry.total_calories(), 520);
        assert_eq!(entry.macros(), [0, 0, 0, 0]);
        assert_eq!(entry.items()[0].calories, 260);
        assert_eq!(entry.items()[0].protein, 0);
    }

    #[test]
    fn test_legacy_type_field_is_kind() {
        let json = r#"{"type": "exercise", "description": "Yoga", "totalCalories": 150,
            "timestamp": "2025-01-01T08:30:00Z"}"#;
        let entry: MealEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.kind(), EntryKind::Exercise);

        let out = serde_json::to_string(&entry).unwrap();
        assert!(out.contains("\"kind\":\"exercise\""));
    }

    #[test]
    fn test_legacy_fractional_and_negative_numbers() {
        let json = r#"{
            "type": "food", "description": "Dosa", "totalCalories": 249.6,
            "totalProtein": 6.4, "totalCarbs": -3, "totalFats": null,
            "items": [{"name": "Dosa", "calories": 249.6, "protein": -1, "fiber": 2.5}],
            "timestamp": "2024-01-15T09:00:00.000Z"
        }"#;
        let entry: MealEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.total_calories(), 250);
        assert_eq!(entry.macros(), [6, 0, 0, 0]);

        let item = &entry.items()[0];
        assert_eq!(item.calories, 250);
        assert_eq!(item.protein, 0);
        assert_eq!(item.carbs, 0);
        assert_eq!(item.fiber, 3);
    }
}
