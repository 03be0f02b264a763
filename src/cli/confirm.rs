use std::path::Path;

use super::entry::print_confirm_report;
use super::App;
use crate::error::{MoneyError, Result};
use crate::ledger::{confirm_proposal, RawProposal};

pub fn run(app: &App, file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)?;
    let proposal: RawProposal = serde_json::from_str(&content)
        .map_err(|e| MoneyError::InvalidInput(format!("{} is not a proposal file: {e}", file.display())))?;
    let report = confirm_proposal(&app.conn, &app.owner, &proposal)?;
    print_confirm_report(&report, proposal.entries.len())
}
