use calai_core::{DateKey, StateStorage, Tracker};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::{
    ConfigCommand, EstimateCommand, LogCommand, LogSubcommand, PresetCommand, PresetSubcommand,
    SettingsCommand, SettingsSubcommand, TodayCommand, TrackCommand, UntrackCommand, WeekCommand,
};
use config::Config;

#[derive(Parser)]
#[command(name = "calai")]
#[command(version)]
#[command(about = "A personal calorie and macro tracker", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Day to work on (YYYY-MM-DD), defaults to today
    #[arg(long, short, global = true)]
    date: Option<DateKey>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the dashboard for the active date
    Today(TodayCommand),

    /// Quick-track a preset
    Track(TrackCommand),

    /// Take a quick-tracked preset back off
    Untrack(UntrackCommand),

    /// Add, remove and inspect logged entries
    Log(LogCommand),

    /// Estimate a meal or workout with AI
    Estimate(EstimateCommand),

    /// Manage quick-track presets
    Preset(PresetCommand),

    /// Show the seven days around the active date
    Week(WeekCommand),

    /// Maintenance target, API key and data reset
    Settings(SettingsCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Save config path for config commands
    let cli_config_path = cli.config.clone();

    let config = Config::load(cli.config)?;
    init_tracing(&config);

    let Some(command) = cli.command else {
        println!("Use --help to see available commands");
        return Ok(());
    };

    if let Commands::Config(cmd) = &command {
        return cmd.run(&config, cli_config_path);
    }

    let storage = StateStorage::new(config.data_dir.value.clone());
    let active_date = cli.date.unwrap_or_else(DateKey::today);
    let mut tracker = Tracker::from_saved(storage.load_or_default()?, active_date);
    tracing::debug!(
        date = %active_date,
        data_dir = %storage.data_dir().display(),
        "Loaded tracker"
    );

    execute_command(&command, &mut tracker, &storage, &config).await?;

    // Save once, only after a write command succeeded
    if is_write_command(&command) {
        storage.save(&tracker.to_saved())?;
    }

    Ok(())
}

fn init_tracing(config: &Config) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn execute_command(
    command: &Commands,
    tracker: &mut Tracker,
    storage: &StateStorage,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Today(cmd) => cmd.run(tracker),
        Commands::Track(cmd) => cmd.run(tracker),
        Commands::Untrack(cmd) => cmd.run(tracker),
        Commands::Log(cmd) => cmd.run(tracker),
        Commands::Estimate(cmd) => cmd.run(tracker, config).await,
        Commands::Preset(cmd) => cmd.run(tracker, config).await,
        Commands::Week(cmd) => cmd.run(tracker),
        Commands::Settings(cmd) => cmd.run(tracker, storage, config),
        Commands::Config(cmd) => cmd.run(config, None),
    }
}

/// Returns true if the command may change the saved state.
fn is_write_command(cmd: &Commands) -> bool {
    match cmd {
        Commands::Track(_) | Commands::Untrack(_) | Commands::Estimate(_) => true,
        Commands::Log(l) => match &l.command {
            LogSubcommand::Add { .. } | LogSubcommand::Remove { .. } => true,
            LogSubcommand::Verify { repair } => *repair,
            LogSubcommand::Show { .. } => false,
        },
        Commands::Preset(p) => matches!(
            p.command,
            PresetSubcommand::Add { .. }
                | PresetSubcommand::Update { .. }
                | PresetSubcommand::Remove { .. }
        ),
        Commands::Settings(s) => matches!(
            s.command,
            SettingsSubcommand::Maintenance { .. }
                | SettingsSubcommand::ApiKey { .. }
                | SettingsSubcommand::ClearApiKey
        ),
        Commands::Today(_) | Commands::Week(_) | Commands::Config(_) => false,
    }
}
