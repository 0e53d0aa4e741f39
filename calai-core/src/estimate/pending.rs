use super::response::Estimate;
use crate::models::NewMealEntry;

/// An estimate waiting for the user to accept or reject it.
///
/// Nothing reaches the ledger until [`confirm`](Self::confirm) is called.
/// Dropping the value discards it.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEstimate {
    description: String,
    estimate: Estimate,
}

impl PendingEstimate {
    pub fn new(description: impl Into<String>, estimate: Estimate) -> Self {
        Self {
            description: description.into(),
            estimate,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn estimate(&self) -> &Estimate {
        &self.estimate
    }

    /// Accepts the estimate, producing the entry to add.
    pub fn confirm(self) -> NewMealEntry {
        tracing::debug!(description = %self.description, "Confirmed estimate");
        self.estimate.into_entry(self.description)
    }

    pub fn discard(self) {
        tracing::debug!(description = %self.description, "Discarded estimate");
    }
}
