use calai_core::{EntryKind, MealEntry, NewMealEntry, Tracker};
use clap::{Args, Subcommand};

use super::{format_macros, signed_kcal, OutputFormat};

#[derive(Args)]
pub struct LogCommand {
    #[command(subcommand)]
    pub command: LogSubcommand,
}

#[derive(Subcommand)]
pub enum LogSubcommand {
    /// Add a food or exercise entry by hand
    Add {
        /// What was eaten or done
        description: String,

        /// Calories eaten or burned
        #[arg(long)]
        calories: u32,

        /// Entry kind (food, exercise)
        #[arg(long, default_value = "food")]
        kind: EntryKind,

        /// Protein in grams
        #[arg(long, default_value_t = 0)]
        protein: u32,

        /// Carbs in grams
        #[arg(long, default_value_t = 0)]
        carbs: u32,

        /// Fats in grams
        #[arg(long, default_value_t = 0)]
        fats: u32,

        /// Fiber in grams
        #[arg(long, default_value_t = 0)]
        fiber: u32,

        /// Free-form note
        #[arg(long)]
        explanation: Option<String>,
    },

    /// Remove an entry by its number in `calai log show`
    Remove {
        /// Entry number (starting at 1)
        number: usize,

        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },

    /// List entries on the active date
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Check cached day totals against their contents
    Verify {
        /// Overwrite drifted totals with the recomputed value
        #[arg(long)]
        repair: bool,
    },
}

impl LogCommand {
    pub fn run(&self, tracker: &mut Tracker) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            LogSubcommand::Add {
                description,
                calories,
                kind,
                protein,
                carbs,
                fats,
                fiber,
                explanation,
            } => {
                let description = description.trim();
                if description.is_empty() {
                    return Err("Description cannot be empty".into());
                }

                let mut entry = NewMealEntry {
                    kind: *kind,
                    description: description.to_string(),
                    total_calories: *calories,
                    ..Default::default()
                }
                .with_macros(*protein, *carbs, *fats, *fiber);
                if let Some(note) = explanation {
                    entry = entry.with_explanation(note);
                }

                let added = tracker.ledger.add_entry(entry).clone();
                println!("Logged: {}", added);
                print_day_total(tracker);
                Ok(())
            }

            LogSubcommand::Remove { number, force } => {
                let index = number
                    .checked_sub(1)
                    .ok_or("Entry numbers start at 1")?;
                let description = tracker
                    .ledger
                    .current_day()
                    .entries()
                    .get(index)
                    .map(|e| e.to_string())
                    .ok_or_else(|| {
                        format!("No entry #{} on {}", number, tracker.ledger.active_date())
                    })?;

                if !force && !super::confirm(&format!("Remove {}?", description))? {
                    println!("Removal cancelled.");
                    return Ok(());
                }

                if let Some(removed) = tracker.ledger.remove_entry(index) {
                    println!("Removed: {}", removed);
                }
                print_day_total(tracker);
                Ok(())
            }

            LogSubcommand::Show { format } => {
                let day = tracker.ledger.current_day();
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(day.as_ref())?);
                    }
                    OutputFormat::Text => {
                        let date = tracker.ledger.active_date();
                        if day.entries().is_empty() {
                            println!("No entries for {}", date);
                        } else {
                            println!("{}", date);
                            println!("{}", "-".repeat(60));
                            for (i, entry) in day.entries().iter().enumerate() {
                                print_entry(i + 1, entry);
                            }
                        }
                        println!("\nDay total: {} kcal", day.total_calories());
                    }
                }
                Ok(())
            }

            LogSubcommand::Verify { repair } => {
                let drifts = tracker.ledger.verify(&tracker.catalog);
                if drifts.is_empty() {
                    println!(
                        "All {} day total(s) match their entries.",
                        tracker.ledger.day_logs().len()
                    );
                    return Ok(());
                }

                for drift in &drifts {
                    print!(
                        "{}: cached {} kcal, recomputed {} kcal",
                        drift.date, drift.cached, drift.recomputed
                    );
                    if !drift.orphaned_presets.is_empty() {
                        print!(" (deleted presets: {})", drift.orphaned_presets.join(", "));
                    }
                    println!();
                }

                if *repair {
                    for drift in &drifts {
                        tracker.ledger.repair(drift.date, &tracker.catalog);
                    }
                    println!("\nRepaired {} day(s).", drifts.len());
                } else {
                    println!("\nRun `calai log verify --repair` to fix.");
                }
                Ok(())
            }
        }
    }
}

fn print_entry(number: usize, entry: &MealEntry) {
    let [protein, carbs, fats, fiber] = entry.macros().map(f64::from);
    println!(
        "  {:>2}. {:10} {:30} {:>7} kcal  {}",
        number,
        format!("[{}]", entry.kind()),
        entry.description(),
        signed_kcal(entry.signed_calories()),
        format_macros(protein, carbs, fats, fiber)
    );
    for item in entry.items() {
        println!("        - {} ({} kcal)", item.name, item.calories);
    }
    if !entry.explanation().is_empty() {
        println!("        {}", entry.explanation());
    }
    println!(
        "        at {}",
        entry.timestamp().with_timezone(&chrono::Local).format("%H:%M")
    );
}

fn print_day_total(tracker: &Tracker) {
    println!(
        "Day total ({}): {} / {} kcal",
        tracker.ledger.active_date(),
        tracker.ledger.current_day().total_calories(),
        tracker.ledger.maintenance_calories()
    );
}
