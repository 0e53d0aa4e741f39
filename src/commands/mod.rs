use clap::ValueEnum;
use std::io::{self, Write};

mod config_cmd;
mod estimate;
mod log;
mod preset;
mod settings;
mod today;
mod track;
mod week;

pub use config_cmd::ConfigCommand;
pub use estimate::EstimateCommand;
pub use log::{LogCommand, LogSubcommand};
pub use preset::{PresetCommand, PresetSubcommand};
pub use settings::{SettingsCommand, SettingsSubcommand};
pub use today::TodayCommand;
pub use track::{TrackCommand, UntrackCommand};
pub use week::WeekCommand;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Asks a yes/no question on stdin. Anything but "y" is a no.
pub(crate) fn confirm(question: &str) -> io::Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// "P 12g | C 40g | F 8g | Fi 3g"
pub(crate) fn format_macros(protein: f64, carbs: f64, fats: f64, fiber: f64) -> String {
    format!(
        "P {}g | C {}g | F {}g | Fi {}g",
        grams(protein),
        grams(carbs),
        grams(fats),
        grams(fiber)
    )
}

/// Whole grams print without decimals, halves keep one.
pub(crate) fn grams(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

/// Signed kcal with an explicit plus for positive values.
pub(crate) fn signed_kcal(value: i64) -> String {
    if value > 0 {
        format!("+{}", value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grams() {
        assert_eq!(grams(4.0), "4");
        assert_eq!(grams(0.5), "0.5");
        assert_eq!(grams(10.26), "10.3");
    }

    #[test]
    fn test_format_macros() {
        assert_eq!(
            format_macros(8.0, 90.0, 1.0, 2.0),
            "P 8g | C 90g | F 1g | Fi 2g"
        );
    }

    #[test]
    fn test_signed_kcal() {
        assert_eq!(signed_kcal(250), "+250");
        assert_eq!(signed_kcal(0), "0");
        assert_eq!(signed_kcal(-300), "-300");
    }
}
