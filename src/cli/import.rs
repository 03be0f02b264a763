use std::path::Path;

use super::entry::{finish, print_drafts, print_issues};
use super::App;
use crate::error::Result;
use crate::importer::{compute_checksum, is_duplicate_file, parse_file};
use crate::ledger::ImportSource;

pub fn run(app: &App, file: &Path, out: Option<&Path>, yes: bool) -> Result<()> {
    if is_duplicate_file(&app.conn, &app.owner, &compute_checksum(file)?)? {
        println!("This file has already been imported (duplicate checksum).");
        return Ok(());
    }

    let today = chrono::Local::now().date_naive();
    let mut parsed = parse_file(file, today, &app.settings.import_options())?;
    print_issues(&parsed.outcome.issues);
    if parsed.outcome.drafts.is_empty() {
        return Ok(());
    }

    let resolutions = app.resolver().resolve_drafts(&mut parsed.outcome.drafts)?;
    print_drafts(&parsed.outcome.drafts, &resolutions);
    println!(
        "{} entries parsed from {} file, {} skipped",
        parsed.outcome.drafts.len(),
        parsed.kind.label(),
        parsed.outcome.skipped()
    );

    let source = ImportSource {
        filename: parsed.filename,
        checksum: parsed.checksum,
    };
    finish(app, Some(source), parsed.outcome.drafts, out, yes)
}
