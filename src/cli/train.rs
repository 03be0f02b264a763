use std::path::Path;

use colored::Colorize;

use super::App;
use crate::classifier::{NoModelReason, TrainOutcome};
use crate::error::Result;
use crate::learning::{bulk_label, load_label_file};

fn print_outcome(outcome: &TrainOutcome) {
    match outcome {
        TrainOutcome::Trained { samples, classes, generation } => println!(
            "{}",
            format!("Classifier trained on {samples} examples across {classes} categories (generation {generation}).")
                .green()
        ),
        TrainOutcome::Cleared(NoModelReason::EmptyCorpus) => {
            println!("{}", "No training data; classifier cleared.".yellow())
        }
        TrainOutcome::Cleared(NoModelReason::SingleLabel(label)) => println!(
            "{}",
            format!("All examples are labeled '{label}'; need at least two categories to train.").yellow()
        ),
    }
}

pub fn labels(app: &App, file: &Path, unverified: bool) -> Result<()> {
    let rows = load_label_file(file)?;
    let report = bulk_label(&app.conn, &app.classifier, &app.owner, &rows, !unverified)?;
    println!(
        "{} added, {} updated, {} already present, {} skipped",
        report.inserted, report.updated, report.unchanged, report.skipped
    );
    if !report.created_categories.is_empty() {
        println!("New categories: {}", report.created_categories.join(", "));
    }
    print_outcome(&report.retrain);
    Ok(())
}

pub fn retrain(app: &App) -> Result<()> {
    let outcome = app.classifier.retrain(&app.conn)?;
    print_outcome(&outcome);
    Ok(())
}
