use std::io::Read;
use std::path::{Path, PathBuf};

use colored::Colorize;
use comfy_table::{Cell, Table};

use super::{parse_date_arg, App};
use crate::error::{MoneyError, Result};
use crate::fmt::{money, percent};
use crate::ledger::{confirm_proposal, ConfirmOutcome, ConfirmReport, ImportSource, Proposal, RawProposal};
use crate::ledger_parser::{parse_text, ParseIssue};
use crate::models::DraftEntry;
use crate::resolver::Resolution;

pub fn run(
    app: &App,
    text: Option<String>,
    file: Option<PathBuf>,
    date: Option<String>,
    out: Option<PathBuf>,
    yes: bool,
) -> Result<()> {
    let text = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)?,
        (None, None) => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let start = match date {
        Some(raw) => parse_date_arg(&raw)?,
        None => chrono::Local::now().date_naive(),
    };

    let mut outcome = parse_text(&text, start, &app.settings.entry_options());
    print_issues(&outcome.issues);
    if outcome.drafts.is_empty() {
        return Ok(());
    }

    let resolutions = app.resolver().resolve_drafts(&mut outcome.drafts)?;
    print_drafts(&outcome.drafts, &resolutions);
    finish(app, None, outcome.drafts, out.as_deref(), yes)
}

pub(crate) fn print_issues(issues: &[ParseIssue]) {
    for issue in issues {
        match issue {
            ParseIssue::NothingParsed => println!("{}", "No entries found.".yellow()),
            ParseIssue::IgnoredColumn(_) | ParseIssue::RowDateDefaulted { .. } => {
                println!("{} {issue}", "note:".dimmed())
            }
            _ => println!("{} {issue}", "skipped:".yellow()),
        }
    }
}

pub(crate) fn print_drafts(drafts: &[DraftEntry], resolutions: &[Resolution]) {
    let mut table = Table::new();
    table.set_header(vec!["#", "Date", "Description", "Amount", "Category", "Source", "Confidence"]);
    for (i, (draft, resolution)) in drafts.iter().zip(resolutions).enumerate() {
        let category = match (&draft.category, &resolution.unresolved) {
            (Some(cat), _) => cat.name.clone(),
            (None, Some(reason)) => format!("({reason})"),
            (None, None) => String::new(),
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(draft.date),
            Cell::new(&draft.description),
            Cell::new(money(draft.amount)),
            Cell::new(category),
            Cell::new(draft.category_source.label()),
            Cell::new(if draft.category.is_some() { percent(draft.confidence) } else { String::new() }),
        ]);
    }
    println!("{table}");
}

/// Save, write for review, or just explain how to do either.
pub(crate) fn finish(
    app: &App,
    import: Option<ImportSource>,
    drafts: Vec<DraftEntry>,
    out: Option<&Path>,
    yes: bool,
) -> Result<()> {
    let proposal = Proposal { import, entries: drafts };
    if yes {
        let raw: RawProposal = Proposal {
            import: proposal.import,
            entries: proposal
                .entries
                .iter()
                .map(serde_json::to_value)
                .collect::<std::result::Result<_, _>>()?,
        };
        let report = confirm_proposal(&app.conn, &app.owner, &raw)?;
        return print_confirm_report(&report, raw.entries.len());
    }

    if let Some(path) = out {
        std::fs::write(path, format!("{}\n", serde_json::to_string_pretty(&proposal)?))?;
        println!(
            "Proposal written to {}. Edit it if needed, then run `moneymind confirm {}`.",
            path.display(),
            path.display()
        );
    } else {
        println!("Nothing saved. Re-run with --yes to save, or --out FILE to review first.");
    }
    Ok(())
}

pub(crate) fn print_confirm_report(report: &ConfirmReport, submitted: usize) -> Result<()> {
    if report.duplicate_file {
        println!("{}", "This file has already been imported (duplicate checksum).".yellow());
        return Ok(());
    }
    for (entry, reason) in &report.rejected {
        println!("{} entry {entry}: {reason}", "skipped:".yellow());
    }
    match report.outcome() {
        ConfirmOutcome::AllSaved => {
            println!("{}", format!("Saved {} entries.", report.saved.len()).green());
            Ok(())
        }
        ConfirmOutcome::Partial => {
            println!(
                "{}",
                format!("Saved {} of {submitted} entries.", report.saved.len()).yellow()
            );
            Ok(())
        }
        ConfirmOutcome::NothingSaved if submitted == 0 => {
            println!("No entries to save.");
            Ok(())
        }
        ConfirmOutcome::NothingSaved => Err(MoneyError::InvalidInput(format!(
            "none of the {submitted} entries could be saved"
        ))),
    }
}
