use calai_core::{StateStorage, Tracker};
use clap::{Args, Subcommand};

use super::confirm;
use crate::config::{mask, Config};

#[derive(Args)]
pub struct SettingsCommand {
    #[command(subcommand)]
    pub command: SettingsSubcommand,
}

#[derive(Subcommand)]
pub enum SettingsSubcommand {
    /// Show saved settings
    Show {
        /// Print the API key in full
        #[arg(long)]
        reveal: bool,
    },

    /// Set the daily maintenance calorie target
    Maintenance {
        /// Calories per day
        calories: u32,
    },

    /// Save the Groq API key used for estimates
    ApiKey {
        /// Key from console.groq.com
        key: String,
    },

    /// Forget the saved Groq API key
    ClearApiKey,

    /// Delete all logged data, presets and settings
    Reset {
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

impl SettingsCommand {
    pub fn run(
        &self,
        tracker: &mut Tracker,
        storage: &StateStorage,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            SettingsSubcommand::Show { reveal } => {
                println!("Settings");
                println!("========\n");
                println!(
                    "Maintenance: {} kcal/day",
                    tracker.ledger.maintenance_calories()
                );

                let shown = |key: &str| if *reveal { key.to_string() } else { mask(key) };
                match (config.groq_api_key(), tracker.groq_api_key()) {
                    (Some(key), _) => println!("Groq API key: {} (from config)", shown(key)),
                    (None, Some(key)) => println!("Groq API key: {}", shown(key)),
                    (None, None) => println!("Groq API key: not set"),
                }

                println!("Presets: {}", tracker.catalog.len());
                println!("Days logged: {}", tracker.ledger.day_logs().len());
                println!("Data file: {}", storage.path().display());
                Ok(())
            }

            SettingsSubcommand::Maintenance { calories } => {
                tracker.ledger.set_maintenance_calories(*calories)?;
                println!("Maintenance set to {} kcal/day", calories);
                Ok(())
            }

            SettingsSubcommand::ApiKey { key } => {
                if key.trim().is_empty() {
                    return Err("API key cannot be empty".into());
                }
                tracker.set_groq_api_key(Some(key.clone()));
                println!("Saved Groq API key {}", mask(key.trim()));
                Ok(())
            }

            SettingsSubcommand::ClearApiKey => {
                tracker.set_groq_api_key(None);
                println!("Removed saved Groq API key");
                Ok(())
            }

            SettingsSubcommand::Reset { force } => {
                if !force
                    && !confirm("This will delete all your logged data. Are you sure?")?
                {
                    println!("Reset cancelled.");
                    return Ok(());
                }
                storage.clear()?;
                println!("All data deleted: {}", storage.path().display());
                Ok(())
            }
        }
    }
}
