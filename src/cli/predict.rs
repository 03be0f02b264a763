use super::App;
use crate::categories::find_by_id;
use crate::error::Result;
use crate::fmt::percent;
use crate::training::examples_for_text;

pub fn run(app: &App, text: &str) -> Result<()> {
    let resolution = app.resolver().resolve(text)?;
    match (&resolution.category, &resolution.unresolved) {
        (Some(category), _) => println!(
            "{} ({}, {})",
            category.name,
            resolution.source.label(),
            percent(resolution.confidence)
        ),
        (None, Some(reason)) => println!("No category: {reason}"),
        (None, None) => println!("No category"),
    }

    let examples = examples_for_text(&app.conn, text)?;
    if !examples.is_empty() {
        println!();
        println!("Labeled examples with this text:");
        for ex in &examples {
            let name = find_by_id(&app.conn, ex.category_id)?
                .map(|c| c.name)
                .unwrap_or_else(|| format!("#{}", ex.category_id));
            let scope = ex.owner.as_deref().unwrap_or("shared");
            let mark = if ex.is_verified { "verified" } else { "unverified" };
            println!("  {:>4}  {} -> {name} ({scope}, {mark}, {})", ex.id, ex.text, ex.created_at);
        }
    }
    Ok(())
}
