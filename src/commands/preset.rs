use calai_core::{NewPreset, Preset, PresetPatch, Tracker};
use clap::{Args, Subcommand};

use super::{confirm, grams, OutputFormat};
use crate::config::Config;

#[derive(Args)]
pub struct PresetCommand {
    #[command(subcommand)]
    pub command: PresetSubcommand,
}

#[derive(Subcommand)]
pub enum PresetSubcommand {
    /// List quick-track presets
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a preset's details
    Show {
        /// Preset ID or name
        identifier: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Add a new preset
    Add {
        /// Name of the food
        name: String,

        /// Calories per unit (required unless --estimate)
        #[arg(long, allow_hyphen_values = true)]
        calories: Option<i64>,

        /// Ask the AI for the calories per unit
        #[arg(long, conflicts_with = "calories")]
        estimate: bool,

        /// Emoji shown next to the name
        #[arg(long)]
        emoji: Option<String>,

        /// Unit, e.g. bowl, piece, glass
        #[arg(long)]
        unit: Option<String>,

        /// Protein per unit in grams
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        protein: f64,

        /// Carbs per unit in grams
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        carbs: f64,

        /// Fats per unit in grams
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        fats: f64,

        /// Fiber per unit in grams
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        fiber: f64,
    },

    /// Update an existing preset
    Update {
        /// Preset ID or name
        identifier: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New emoji
        #[arg(long)]
        emoji: Option<String>,

        /// New unit
        #[arg(long)]
        unit: Option<String>,

        /// Calories per unit
        #[arg(long, allow_hyphen_values = true)]
        calories: Option<i64>,

        /// Protein per unit in grams
        #[arg(long, allow_hyphen_values = true)]
        protein: Option<f64>,

        /// Carbs per unit in grams
        #[arg(long, allow_hyphen_values = true)]
        carbs: Option<f64>,

        /// Fats per unit in grams
        #[arg(long, allow_hyphen_values = true)]
        fats: Option<f64>,

        /// Fiber per unit in grams
        #[arg(long, allow_hyphen_values = true)]
        fiber: Option<f64>,
    },

    /// Remove a preset. Logged days keep their totals.
    Remove {
        /// Preset ID or name
        identifier: String,

        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

impl PresetCommand {
    pub async fn run(
        &self,
        tracker: &mut Tracker,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            PresetSubcommand::List { format } => {
                let presets = tracker.catalog.list();
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(presets)?);
                    }
                    OutputFormat::Text => {
                        if presets.is_empty() {
                            println!("No presets. Add one with `calai preset add`.");
                            return Ok(());
                        }
                        let day = tracker.ledger.current_day();
                        println!(
                            "{:38} {:>8} {:>5}  {}",
                            "PRESET", "KCAL", "TODAY", "ID"
                        );
                        println!("{}", "-".repeat(90));
                        for preset in presets {
                            println!(
                                "{:38} {:>8} {:>5}  {}",
                                format!("{} {} ({})", preset.emoji, preset.name, preset.unit),
                                preset.calories_per_unit,
                                day.quantity(&preset.id),
                                preset.id
                            );
                        }
                        println!("\nTotal: {} preset(s)", presets.len());
                    }
                }
                Ok(())
            }

            PresetSubcommand::Show { identifier, format } => {
                let preset = find(tracker, identifier)?;
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(preset)?);
                    }
                    OutputFormat::Text => print_preset(preset),
                }
                Ok(())
            }

            PresetSubcommand::Add {
                name,
                calories,
                estimate,
                emoji,
                unit,
                protein,
                carbs,
                fats,
                fiber,
            } => {
                let mut draft = NewPreset::new(name.as_str(), 0)
                    .with_macros(*protein, *carbs, *fats, *fiber);
                if let Some(e) = emoji {
                    draft = draft.with_emoji(e.as_str());
                }
                if let Some(u) = unit {
                    draft = draft.with_unit(u.as_str());
                }

                // Reject a bad draft before asking the gateway for calories.
                draft.validate()?;

                draft.calories_per_unit = match (calories, estimate) {
                    (Some(kcal), _) => *kcal,
                    (None, true) => {
                        let client = config.groq_client(tracker.groq_api_key())?;
                        let kcal = client
                            .estimate_preset_calories(draft.name.trim(), &draft.unit)
                            .await?;
                        println!("Estimated {} kcal per {}", kcal, draft.unit);
                        i64::from(kcal)
                    }
                    (None, false) => {
                        return Err("--calories is required (or use --estimate)".into())
                    }
                };

                let id = tracker.catalog.add(draft)?;
                let preset = find(tracker, &id)?;
                println!("Added preset: {}", preset);
                println!("ID: {}", preset.id);
                Ok(())
            }

            PresetSubcommand::Update {
                identifier,
                name,
                emoji,
                unit,
                calories,
                protein,
                carbs,
                fats,
                fiber,
            } => {
                let id = find(tracker, identifier)?.id.clone();
                let patch = PresetPatch {
                    name: name.clone(),
                    emoji: emoji.clone(),
                    unit: unit.clone(),
                    calories_per_unit: *calories,
                    protein_per_unit: *protein,
                    carbs_per_unit: *carbs,
                    fats_per_unit: *fats,
                    fiber_per_unit: *fiber,
                };
                if patch.is_empty() {
                    return Err("Nothing to update. Pass at least one field, e.g. --calories".into());
                }

                tracker.catalog.update(&id, &patch)?;
                println!("Updated preset: {}", find(tracker, &id)?);
                if patch.calories_per_unit.is_some() {
                    println!("Days already logged keep their totals.");
                }
                Ok(())
            }

            PresetSubcommand::Remove { identifier, force } => {
                let preset = find(tracker, identifier)?.clone();

                if !force && !confirm(&format!("Remove preset '{}'?", preset.name))? {
                    println!("Removal cancelled.");
                    return Ok(());
                }

                tracker.catalog.remove(&preset.id)?;
                println!("Removed preset: {} {}", preset.emoji, preset.name);
                Ok(())
            }
        }
    }
}

fn find<'a>(tracker: &'a Tracker, identifier: &str) -> Result<&'a Preset, String> {
    tracker
        .catalog
        .find(identifier)
        .ok_or_else(|| format!("Preset not found: {}", identifier))
}

fn print_preset(preset: &Preset) {
    println!("{} {}", preset.emoji, preset.name);
    println!("{}", "=".repeat(40));
    println!("ID:       {}", preset.id);
    println!("Unit:     {}", preset.unit);
    println!("Calories: {} kcal", preset.calories_per_unit);
    println!("Protein:  {}g", grams(preset.protein_per_unit));
    println!("Carbs:    {}g", grams(preset.carbs_per_unit));
    println!("Fats:     {}g", grams(preset.fats_per_unit));
    println!("Fiber:    {}g", grams(preset.fiber_per_unit));
}
