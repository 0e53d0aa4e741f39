//! Validation errors for the ledger and preset catalog.

use thiserror::Error;

/// Structural failures. State is left untouched when one is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Invalid preset: {0}")]
    InvalidPreset(String),

    #[error("Preset not found: {0}")]
    NotFound(String),

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),
}
