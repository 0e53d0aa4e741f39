use calai_core::{DateKey, DayStatus, DaySummary, Tracker, WeeklyTotals};
use clap::Args;
use serde::Serialize;

use super::{signed_kcal, OutputFormat};

/// Seven days around the active date against maintenance
#[derive(Args)]
pub struct WeekCommand {
    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WeekView {
    active_date: DateKey,
    days: Vec<DaySummary>,
    totals: WeeklyTotals,
}

impl WeekCommand {
    pub fn run(&self, tracker: &Tracker) -> Result<(), Box<dyn std::error::Error>> {
        let active_date = tracker.ledger.active_date();
        let days = tracker.ledger.weekly_summary(active_date);
        let totals = WeeklyTotals::from_summary(&days);
        let view = WeekView {
            active_date,
            days,
            totals,
        };

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&view)?);
            }
            OutputFormat::Text => print_week(&view, DateKey::today()),
        }
        Ok(())
    }
}

fn print_week(view: &WeekView, today: DateKey) {
    let navigator: Vec<String> = view
        .days
        .iter()
        .map(|d| {
            let label = format!("{} {}", d.date.weekday_short(), d.date.date().format("%d"));
            if d.date == view.active_date {
                format!("[{}]", label)
            } else {
                format!(" {} ", label)
            }
        })
        .collect();
    println!("{}", navigator.join(" "));
    println!();

    println!(
        "{:14} {:>8} {:>8} {:>8}  {}",
        "DATE", "KCAL", "TARGET", "DIFF", "STATUS"
    );
    println!("{}", "-".repeat(56));
    for day in &view.days {
        let marker = if day.date == today { " (today)" } else { "" };
        let label = format!("{}, {}", day.date.weekday_short(), day.date.short_label());
        match day.status {
            DayStatus::Empty => println!(
                "{:14} {:>8} {:>8} {:>8}  -{}",
                label, "-", day.maintenance, "-", marker
            ),
            status => println!(
                "{:14} {:>8} {:>8} {:>8}  {}{}",
                label,
                day.total_calories,
                day.maintenance,
                signed_kcal(day.difference),
                status,
                marker
            ),
        }
    }
    println!("{}", "-".repeat(56));

    let totals = &view.totals;
    if totals.tracked_days == 0 {
        println!("No days tracked this week.");
    } else {
        println!(
            "Weekly {}: {} kcal over {} tracked day(s)",
            totals.label(),
            signed_kcal(totals.net_difference),
            totals.tracked_days
        );
    }
}
