use super::App;
use crate::classifier::ClassifierModel;
use crate::error::Result;
use crate::fmt::{format_bytes, money};
use crate::ledger::totals;
use crate::training::corpus_stats;

pub fn run(app: &App) -> Result<()> {
    let settings = &app.settings;
    let db_path = settings.db_path();

    println!("User:       {}", app.owner);
    println!("Data dir:   {}", settings.data_dir);
    println!("Database:   {}", db_path.display());
    if let Ok(meta) = std::fs::metadata(&db_path) {
        println!("DB size:    {}", format_bytes(meta.len()));
    }

    let t = totals(&app.conn, &app.owner)?;
    println!();
    println!("Transactions:   {}", t.records);
    println!("Uncategorized:  {}", t.uncategorized);
    println!("Income:         {}", money(t.income));
    println!("Expenses:       {}", money(t.expense));

    let stats = corpus_stats(&app.conn)?;
    println!();
    println!("Examples:       {} ({} verified)", stats.total, stats.verified);
    println!("Labels:         {}", stats.labels);

    let model_path = app.classifier.artifact_path();
    match ClassifierModel::load(model_path) {
        Ok(model) => println!(
            "Classifier:     generation {}, {} examples, {} categories, trained {}",
            model.generation(),
            model.sample_count(),
            model.labels().len(),
            model.trained_at()
        ),
        Err(_) if model_path.exists() => println!("Classifier:     unreadable (will retrain on next use)"),
        Err(_) => println!("Classifier:     not trained"),
    }
    Ok(())
}
