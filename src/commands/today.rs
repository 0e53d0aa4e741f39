use calai_core::{DailyProgress, DayNutrition, LineSource, MacroTotals, Tracker};
use clap::Args;
use serde::Serialize;

use super::{format_macros, signed_kcal, OutputFormat};

/// Dashboard for the active date
#[derive(Args)]
pub struct TodayCommand {
    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TodayView {
    progress: DailyProgress,
    preset_calories: i64,
    nutrition: DayNutrition,
}

impl TodayCommand {
    pub fn run(&self, tracker: &Tracker) -> Result<(), Box<dyn std::error::Error>> {
        let date = tracker.ledger.active_date();
        let view = TodayView {
            progress: tracker.ledger.daily_progress(date),
            preset_calories: tracker.ledger.preset_calories(date, &tracker.catalog),
            nutrition: tracker.ledger.day_nutrition(date, &tracker.catalog),
        };

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&view)?);
            }
            OutputFormat::Text => print_dashboard(&view),
        }
        Ok(())
    }
}

fn print_dashboard(view: &TodayView) {
    let progress = &view.progress;
    let header = format!(
        "{}, {} ({})",
        progress.date.weekday_short(),
        progress.date.short_label(),
        progress.date
    );
    println!("{}", header);
    println!("{}", "=".repeat(header.chars().count()));
    println!();

    println!(
        "Consumed: {} / {} kcal ({:.0}%)  {}",
        progress.consumed, progress.maintenance, progress.percentage, progress.status
    );
    if progress.remaining >= 0 {
        println!("Remaining: {} kcal", progress.remaining);
    } else {
        println!("Over by: {} kcal", -progress.remaining);
    }

    let presets: Vec<_> = view
        .nutrition
        .lines
        .iter()
        .filter(|l| l.source == LineSource::Preset)
        .collect();
    let entries: Vec<_> = view
        .nutrition
        .lines
        .iter()
        .filter(|l| l.source != LineSource::Preset)
        .collect();

    if presets.is_empty() && entries.is_empty() {
        println!("\nNothing logged yet. Try `calai track rice` or `calai estimate \"2 idli\"`.");
        return;
    }

    if !presets.is_empty() {
        println!("\nQuick-tracked ({} kcal)", view.preset_calories);
        println!("{}", "-".repeat(60));
        for line in presets {
            println!(
                "  {:28} {:>7} kcal  {}",
                line.label,
                signed_kcal(line.calories),
                format_macros(line.protein, line.carbs, line.fats, line.fiber)
            );
        }
    }

    if !entries.is_empty() {
        println!("\nEntries");
        println!("{}", "-".repeat(60));
        for (i, line) in entries.iter().enumerate() {
            let label = match line.source {
                LineSource::Exercise => format!("{} (exercise)", line.label),
                _ => line.label.clone(),
            };
            println!(
                "  {:>2}. {:24} {:>7} kcal  {}",
                i + 1,
                label,
                signed_kcal(line.calories),
                format_macros(line.protein, line.carbs, line.fats, line.fiber)
            );
        }
    }

    println!("{}", "-".repeat(60));
    println!("{}", totals_row(&view.nutrition.totals, progress.consumed));
}

/// Net of the lines above. The day total never goes below zero, so the two
/// can disagree once exercise outweighs food.
fn totals_row(totals: &MacroTotals, consumed: u32) -> String {
    let mut row = format!(
        "  Net: {} kcal | {}",
        signed_kcal(totals.calories),
        format_macros(totals.protein, totals.carbs, totals.fats, totals.fiber)
    );
    if totals.calories != i64::from(consumed) {
        if totals.calories < 0 {
            row.push_str(&format!(
                "\n  (day total stays at {} kcal, it never goes below 0)",
                consumed
            ));
        } else {
            row.push_str(&format!(
                "\n  (day total is {} kcal, see `calai log verify`)",
                consumed
            ));
        }
    }
    row
}
