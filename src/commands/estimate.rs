use calai_core::estimate::{Attachment, Estimate, PendingEstimate};
use calai_core::Tracker;
use clap::Args;
use std::path::PathBuf;

use super::{confirm, signed_kcal};
use crate::config::Config;

/// Estimate a meal or workout with AI, then log it
#[derive(Args)]
pub struct EstimateCommand {
    /// Description, e.g. "2 aloo parathas with curd" or "30 min run"
    pub text: Option<String>,

    /// Photo of the meal (jpg, png, webp, gif, heic; up to 20 MB)
    #[arg(long, value_name = "PATH")]
    pub image: Option<PathBuf>,

    /// Log the estimate without asking
    #[arg(long, short)]
    pub yes: bool,
}

impl EstimateCommand {
    pub async fn run(
        &self,
        tracker: &mut Tracker,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        // Validate the photo before anything goes over the network.
        let attachment = match &self.image {
            Some(path) => Some(Attachment::from_path(path)?),
            None => None,
        };

        let mut request = tracker.estimate_request(self.text.clone());
        if let Some(image) = attachment {
            request = request.with_attachment(image);
        }

        let client = config.groq_client(tracker.groq_api_key())?;
        println!("Estimating...");
        let estimate = client.estimate(&request).await?;

        let description = request
            .description()
            .map(str::to_string)
            .unwrap_or_else(|| "Meal from photo".to_string());
        let pending = PendingEstimate::new(description, estimate);
        print_estimate(pending.description(), pending.estimate());

        if self.yes || confirm(&format!("Add to {}?", tracker.ledger.active_date()))? {
            let added = tracker.ledger.add_entry(pending.confirm()).clone();
            println!("Logged: {}", added);
            println!(
                "Day total: {} / {} kcal",
                tracker.ledger.current_day().total_calories(),
                tracker.ledger.maintenance_calories()
            );
        } else {
            pending.discard();
            println!("Discarded.");
        }
        Ok(())
    }
}

fn print_estimate(description: &str, estimate: &Estimate) {
    println!();
    println!("{} ({})", description, estimate.kind);
    println!("{}", "-".repeat(60));
    for item in &estimate.items {
        println!(
            "  {:30} {:>5} kcal  P {}g | C {}g | F {}g | Fi {}g",
            item.name, item.calories, item.protein, item.carbs, item.fats, item.fiber
        );
    }
    println!(
        "  Total: {} kcal | P {}g | C {}g | F {}g | Fi {}g",
        signed_kcal(estimate.signed_calories()),
        estimate.total_protein,
        estimate.total_carbs,
        estimate.total_fats,
        estimate.total_fiber
    );
    if !estimate.explanation.is_empty() {
        println!("\n  {}", estimate.explanation);
    }
    println!();
}
