//! JSON file storage for the saved state.

use std::fs;
use std::io;
use std::path::PathBuf;

use crate::state::SavedState;

/// File name of the state blob inside the data directory.
pub const STATE_FILENAME: &str = "calai-state.json";

/// Reads and writes the state blob under a data directory.
#[derive(Debug, Clone)]
pub struct StateStorage {
    data_dir: PathBuf,
}

impl StateStorage {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    /// Full path of the state file.
    pub fn path(&self) -> PathBuf {
        self.data_dir.join(STATE_FILENAME)
    }

    pub fn exists(&self) -> bool {
        self.path().exists()
    }

    /// Loads the saved state.
    ///
    /// Returns `Ok(None)` if the file doesn't exist.
    /// Returns `Err` for other I/O or parsing errors.
    pub fn load(&self) -> Result<Option<SavedState>, StorageError> {
        let path = self.path();

        match fs::read_to_string(&path) {
            Ok(contents) => {
                let state = serde_json::from_str(&contents)
                    .map_err(|e| StorageError::ParseError(path.clone(), e))?;
                tracing::info!(path = %path.display(), "Loaded saved state");
                Ok(Some(state))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::IoError(path, e)),
        }
    }

    /// Loads the saved state, or an empty one if nothing was saved yet.
    pub fn load_or_default(&self) -> Result<SavedState, StorageError> {
        Ok(self.load()?.unwrap_or_default())
    }

    /// Writes the state as pretty JSON, creating the data directory if needed.
    pub fn save(&self, state: &SavedState) -> Result<(), StorageError> {
        fs::create_dir_all(&self.data_dir)
            .map_err(|e| StorageError::IoError(self.data_dir.clone(), e))?;

        let path = self.path();
        let json = serde_json::to_string_pretty(state)
            .map_err(|e| StorageError::ParseError(path.clone(), e))?;

        fs::write(&path, json).map_err(|e| StorageError::IoError(path.clone(), e))?;
        tracing::info!(path = %path.display(), "Saved state");

        Ok(())
    }

    /// Deletes the state file. A missing file is not an error.
    pub fn clear(&self) -> Result<(), StorageError> {
        let path = self.path();
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Cleared saved state");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::IoError(path, e)),
        }
    }
}

/// Errors that can occur while reading or writing the state file.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error reading or writing a file.
    IoError(PathBuf, io::Error),
    /// The file is not a valid state blob.
    ParseError(PathBuf, serde_json::Error),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::IoError(path, e) => {
                write!(f, "I/O error for {}: {}", path.display(), e)
            }
            StorageError::ParseError(path, e) => {
                write!(f, "Invalid state file {}: {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::IoError(_, e) => Some(e),
            StorageError::ParseError(_, e) => Some(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::DateKey;
    use crate::models::NewMealEntry;
    use crate::state::Tracker;
    use tempfile::TempDir;

    fn test_storage() -> (StateStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = StateStorage::new(temp_dir.path().to_path_buf());
        (storage, temp_dir)
    }

    #[test]
    fn test_storage_path() {
        let (storage, _temp) = test_storage();
        assert!(storage.path().ends_with("calai-state.json"));
    }

    #[test]
    fn test_load_nonexistent_returns_none() {
        let (storage, _temp) = test_storage();
        assert!(!storage.exists());
        assert!(storage.load().unwrap().is_none());
        assert_eq!(storage.load_or_default().unwrap(), SavedState::default());
    }

    #[test]
    fn test_save_and_load() {
        let (storage, _temp) = test_storage();
        let today: DateKey = "2024-06-01".parse().unwrap();

        let mut tracker = Tracker::new(today);
        tracker.adjust_preset_quantity("1", 1);
        tracker.ledger.add_entry(NewMealEntry::exercise("Swim", 300));
        storage.save(&tracker.to_saved()).unwrap();
        assert!(storage.exists());

        let loaded = storage.load().unwrap().unwrap();
        let restored = Tracker::from_saved(loaded, today);
        assert_eq!(restored, tracker);
        assert_eq!(restored.ledger.current_day().total_calories(), 0);
    }

    #[test]
    fn test_save_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        let storage = StateStorage::new(nested.clone());

        storage.save(&SavedState::default()).unwrap();
        assert!(nested.join(STATE_FILENAME).exists());
    }

    #[test]
    fn test_load_invalid_json() {
        let (storage, _temp) = test_storage();
        fs::write(storage.path(), "not json").unwrap();

        let err = storage.load().unwrap_err();
        assert!(matches!(err, StorageError::ParseError(_, _)));
        assert!(err.to_string().contains("Invalid state file"));
    }

    #[test]
    fn test_clear() {
        let (storage, _temp) = test_storage();
        storage.clear().unwrap();

        storage.save(&SavedState::default()).unwrap();
        storage.clear().unwrap();
        assert!(!storage.exists());
    }
}
