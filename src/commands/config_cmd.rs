use clap::{Args, Subcommand};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use super::OutputFormat;
use crate::config::Config;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Initialize configuration file
    Init,
}

const DEFAULT_CONFIG: &str = r#"# calai configuration

# Directory holding calai-state.json (default: platform data dir + /calai)
# Relative paths are resolved against this file's directory.
# data_dir: ~/.local/share/calai

# Log level for calai itself (RUST_LOG overrides this)
log_level: warn

# AI estimation via Groq. The key can also be saved with
# `calai settings api-key <KEY>` or set in CALAI_GROQ_API_KEY.
groq:
  # api_key: gsk_...
  # base_url: https://api.groq.com/openai/v1
  # text_model: llama-3.3-70b-versatile
  # vision_model: meta-llama/llama-4-scout-17b-16e-instruct
"#;

impl ConfigCommand {
    pub fn run(
        &self,
        config: &Config,
        cli_config_path: Option<PathBuf>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            let path = cli_config_path.unwrap_or_else(Config::default_config_path);
                            println!("Config file: {} (not found)", path.display());
                        }
                        println!();

                        println!("data_dir: {}", config.data_dir.value.display());
                        println!("  source: {}", config.data_dir.source);
                        println!();

                        println!("log_level: {}", config.log_level.value);
                        println!("  source: {}", config.log_level.source);
                        println!();

                        let groq = &config.groq;
                        println!("groq:");
                        println!(
                            "  api_key: {}",
                            config
                                .groq_api_key()
                                .map(crate::config::mask)
                                .unwrap_or_else(|| "(saved in settings or unset)".into())
                        );
                        println!(
                            "  base_url: {}",
                            groq.base_url.as_deref().unwrap_or("(default)")
                        );
                        println!(
                            "  text_model: {}",
                            groq.text_model.as_deref().unwrap_or("(default)")
                        );
                        println!(
                            "  vision_model: {}",
                            groq.vision_model.as_deref().unwrap_or("(default)")
                        );
                    }
                }
                Ok(())
            }

            ConfigSubcommand::Init => {
                let config_path = cli_config_path.unwrap_or_else(Config::default_config_path);

                if config_path.exists() {
                    println!("Config file already exists: {}", config_path.display());
                    println!("Use 'calai config show' to view current configuration.");
                    return Ok(());
                }

                if let Some(parent) = config_path.parent() {
                    fs::create_dir_all(parent)?;
                }

                let mut file = fs::File::create(&config_path)?;
                file.write_all(DEFAULT_CONFIG.as_bytes())?;

                println!("Created config file: {}", config_path.display());
                println!("\nEdit this file to customize your settings.");
                Ok(())
            }
        }
    }
}
