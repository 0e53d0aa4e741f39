//! The quick-track preset catalog.

use uuid::Uuid;

use crate::error::LedgerError;
use crate::models::{default_presets, NewPreset, Preset, PresetPatch};

/// Ordered collection of presets, keyed by stable ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresetCatalog {
    presets: Vec<Preset>,
}

impl PresetCatalog {
    pub fn new(presets: Vec<Preset>) -> Self {
        Self { presets }
    }

    /// Catalog seeded with the six built-in presets.
    pub fn with_defaults() -> Self {
        Self::new(default_presets())
    }

    /// Validates and appends a preset, returning its freshly assigned id.
    pub fn add(&mut self, draft: NewPreset) -> Result<String, LedgerError> {
        let id = self.fresh_id();
        let preset = draft.into_preset(id.clone())?;
        tracing::debug!(id = %id, name = %preset.name, "Adding preset");
        self.presets.push(preset);
        Ok(id)
    }

    /// Overrides the fields named in `patch`. Nothing changes on error.
    pub fn update(&mut self, id: &str, patch: &PresetPatch) -> Result<(), LedgerError> {
        let valid = patch.validate()?;
        let preset = self
            .presets
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;
        preset.apply(&valid);
        tracing::debug!(id = %id, "Updated preset");
        Ok(())
    }

    /// Deletes a preset. Day logs that reference it are left as they are.
    pub fn remove(&mut self, id: &str) -> Result<Preset, LedgerError> {
        let index = self
            .presets
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;
        let removed = self.presets.remove(index);
        tracing::debug!(id = %id, name = %removed.name, "Removed preset");
        Ok(removed)
    }

    pub fn get(&self, id: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.id == id)
    }

    /// Looks up by id first, then by case-insensitive name.
    pub fn find(&self, identifier: &str) -> Option<&Preset> {
        self.get(identifier).or_else(|| {
            let wanted = identifier.trim().to_lowercase();
            self.presets.iter().find(|p| p.name.to_lowercase() == wanted)
        })
    }

    /// Presets in insertion order.
    pub fn list(&self) -> &[Preset] {
        &self.presets
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn into_presets(self) -> Vec<Preset> {
        self.presets
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_defaults() {
        let catalog = PresetCatalog::with_defaults();
        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog.get("3").unwrap().name, "Dal");
    }

    #[test]
    fn test_add_assigns_unique_ids_in_order() {
        let mut catalog = PresetCatalog::default();
        let a = catalog.add(NewPreset::new("Poha", 180)).unwrap();
        let b = catalog.add(NewPreset::new("Poha", 180)).unwrap();
        assert_ne!(a, b);
        let names: Vec<&str> = catalog.list().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(names, vec![a.as_str(), b.as_str()]);
    }

    #[test]
    fn test_add_invalid_leaves_catalog_unchanged() {
        let mut catalog = PresetCatalog::with_defaults();
        let before = catalog.clone();
        assert!(matches!(
            catalog.add(NewPreset::new("", 100)),
            Err(LedgerError::InvalidPreset(_))
        ));
        assert!(matches!(
            catalog.add(NewPreset::new("Samosa", -250)),
            Err(LedgerError::InvalidPreset(_))
        ));
        assert_eq!(catalog, before);
    }

    #[test]
    fn test_removed_id_is_not_reused() {
        let mut catalog = PresetCatalog::default();
        let first = catalog.add(NewPreset::new("Upma", 200)).unwrap();
        catalog.remove(&first).unwrap();
        let second = catalog.add(NewPreset::new("Upma", 200)).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_update() {
        let mut catalog = PresetCatalog::with_defaults();
        let patch = PresetPatch {
            calories_per_unit: Some(90),
            emoji: Some("🍳".into()),
            ..Default::default()
        };
        catalog.update("5", &patch).unwrap();

        let egg = catalog.get("5").unwrap();
        assert_eq!(egg.id, "5");
        assert_eq!(egg.calories_per_unit, 90);
        assert_eq!(egg.emoji, "🍳");
        assert_eq!(egg.name, "Egg");
    }

    #[test]
    fn test_update_unknown_id() {
        let mut catalog = PresetCatalog::with_defaults();
        let err = catalog.update("nope", &PresetPatch::default()).unwrap_err();
        assert_eq!(err, LedgerError::NotFound("nope".into()));
    }

    #[test]
    fn test_update_invalid_patch_changes_nothing() {
        let mut catalog = PresetCatalog::with_defaults();
        let before = catalog.clone();
        let patch = PresetPatch {
            name: Some("Rice 2".into()),
            fats_per_unit: Some(-1.0),
            ..Default::default()
        };
        assert!(matches!(
            catalog.update("1", &patch),
            Err(LedgerError::InvalidPreset(_))
        ));
        assert_eq!(catalog, before);
    }

    #[test]
    fn test_remove() {
        let mut catalog = PresetCatalog::with_defaults();
        let removed = catalog.remove("2").unwrap();
        assert_eq!(removed.name, "Roti");
        assert!(catalog.get("2").is_none());
        assert_eq!(catalog.len(), 5);
        assert_eq!(
            catalog.remove("2").unwrap_err(),
            LedgerError::NotFound("2".into())
        );
    }

    #[test]
    fn test_find_by_id_or_name() {
        let catalog = PresetCatalog::with_defaults();
        assert_eq!(catalog.find("4").unwrap().name, "Chicken");
        assert_eq!(catalog.find("milk").unwrap().id, "6");
        assert_eq!(catalog.find(" EGG ").unwrap().id, "5");
        assert!(catalog.find("pizza").is_none());
    }
}
