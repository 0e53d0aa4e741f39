use calai_core::{Preset, Tracker};
use clap::Args;

/// Quick-track a preset on the active date
#[derive(Args)]
pub struct TrackCommand {
    /// Preset ID or name
    pub preset: String,

    /// Units to add (negative to take away)
    #[arg(long, default_value_t = 1, allow_hyphen_values = true)]
    pub delta: i64,
}

/// Take a quick-tracked preset back off the active date
#[derive(Args)]
pub struct UntrackCommand {
    /// Preset ID or name
    pub preset: String,

    /// Units to remove
    #[arg(long, default_value_t = 1)]
    pub count: u32,
}

impl TrackCommand {
    pub fn run(&self, tracker: &mut Tracker) -> Result<(), Box<dyn std::error::Error>> {
        adjust(tracker, &self.preset, self.delta)
    }
}

impl UntrackCommand {
    pub fn run(&self, tracker: &mut Tracker) -> Result<(), Box<dyn std::error::Error>> {
        adjust(tracker, &self.preset, -i64::from(self.count))
    }
}

fn adjust(
    tracker: &mut Tracker,
    identifier: &str,
    delta: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    let preset: Preset = tracker
        .catalog
        .find(identifier)
        .cloned()
        .ok_or_else(|| format!("Preset not found: {}", identifier))?;

    let quantity = tracker
        .adjust_preset_quantity(&preset.id, delta)
        .ok_or_else(|| format!("Preset not found: {}", identifier))?;

    let day = tracker.ledger.current_day();
    println!(
        "{} {}: {} {} today ({} kcal)",
        preset.emoji,
        preset.name,
        quantity,
        preset.unit,
        preset.calories_for(quantity)
    );
    println!(
        "Day total: {} / {} kcal",
        day.total_calories(),
        tracker.ledger.maintenance_calories()
    );
    Ok(())
}
