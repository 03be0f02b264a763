pub mod categories;
pub mod confirm;
pub mod entry;
pub mod import;
pub mod init;
pub mod predict;
pub mod records;
pub mod status;
pub mod template;
pub mod train;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use rusqlite::Connection;

use crate::classifier::TextClassifier;
use crate::db::{get_connection, init_db};
use crate::error::{MoneyError, Result};
use crate::resolver::CategoryResolver;
use crate::settings::{load_settings, Settings};

/// Everything a command needs: settings, an open database, the owner the
/// command acts for, and the classifier handle.
pub struct App {
    pub settings: Settings,
    pub conn: Connection,
    pub owner: String,
    pub classifier: TextClassifier,
}

impl App {
    pub fn open(user: Option<&str>) -> Result<Self> {
        let settings = load_settings();
        settings.validate()?;
        let conn = get_connection(&settings.db_path())?;
        init_db(&conn)?;
        Ok(Self {
            owner: settings.owner(user),
            classifier: TextClassifier::new(settings.model_path()),
            conn,
            settings,
        })
    }

    pub fn resolver(&self) -> CategoryResolver<'_> {
        CategoryResolver::new(&self.conn, &self.classifier, &self.owner)
            .with_threshold(self.settings.confidence_threshold)
    }
}

pub(crate) fn parse_date_arg(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| MoneyError::InvalidInput(format!("Invalid date '{raw}' (expected YYYY-MM-DD)")))
}

#[derive(Parser)]
#[command(name = "moneymind", version, about = "Free-text money tracking with learned categories.")]
pub struct Cli {
    /// Act as this user instead of the configured one
    #[arg(long, global = true)]
    pub user: Option<String>,
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up moneymind: choose a data directory and initialize the database.
    Init {
        /// Path for moneymind data (default: ~/Documents/moneymind)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Default user name
        #[arg(long = "name")]
        user_name: Option<String>,
    },
    /// Parse free text (one entry per line) and propose categorized entries.
    Entry {
        /// Text to parse; read from --file or stdin when omitted
        text: Option<String>,
        /// Read the text from a file
        #[arg(long)]
        file: Option<PathBuf>,
        /// Date for entries before the first date line: YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Write the proposal as JSON for review instead of printing only
        #[arg(long)]
        out: Option<PathBuf>,
        /// Save the proposed entries immediately
        #[arg(long)]
        yes: bool,
    },
    /// Import a .txt, .csv or spreadsheet file and propose categorized entries.
    Import {
        /// Path to the file
        file: PathBuf,
        /// Write the proposal as JSON for review instead of printing only
        #[arg(long)]
        out: Option<PathBuf>,
        /// Save the proposed entries immediately
        #[arg(long)]
        yes: bool,
    },
    /// Save a reviewed proposal file.
    Confirm {
        /// Proposal JSON written by `entry --out` or `import --out`
        file: PathBuf,
    },
    /// List, edit and delete saved transactions.
    Records {
        #[command(subcommand)]
        command: RecordsCommands,
    },
    /// Manage categories.
    Categories {
        #[command(subcommand)]
        command: CategoriesCommands,
    },
    /// Manage the classifier's training data.
    Train {
        #[command(subcommand)]
        command: TrainCommands,
    },
    /// Show how a description would be categorized.
    Predict {
        text: String,
    },
    /// Write a sample import file (.txt or .csv).
    Template {
        /// Output path
        file: PathBuf,
    },
    /// Show current database, corpus and classifier statistics.
    Status,
    /// Print shell completions.
    Completions {
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum RecordsCommands {
    /// List transactions, newest first.
    List {
        /// Month filter: YYYY-MM
        #[arg(long)]
        month: Option<String>,
        /// Only transactions without a category
        #[arg(long)]
        uncategorized: bool,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Edit a transaction. Assigning a category teaches the classifier.
    Edit {
        /// Transaction ID (shown in `moneymind records list`)
        id: i64,
        /// New date: YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// New signed amount
        #[arg(long, allow_hyphen_values = true)]
        amount: Option<String>,
        /// New category name
        #[arg(long, conflicts_with = "clear_category")]
        category: Option<String>,
        /// Remove the category
        #[arg(long = "clear-category")]
        clear_category: bool,
    },
    /// Delete a transaction.
    Delete {
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum CategoriesCommands {
    /// List global categories and your own.
    List,
    /// Add a category.
    Add {
        name: String,
        /// income or expense
        #[arg(long = "kind", default_value = "expense")]
        kind: String,
        /// Create it for everyone instead of only the current user
        #[arg(long)]
        global: bool,
    },
    /// Rename a category or change its kind.
    Edit {
        id: i64,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// income or expense
        #[arg(long = "kind")]
        kind: Option<String>,
        /// Allow editing a global category
        #[arg(long)]
        global: bool,
    },
    /// Delete a category. Its transactions become uncategorized.
    Delete {
        id: i64,
        /// Allow deleting a global category
        #[arg(long)]
        global: bool,
    },
}

#[derive(Subcommand)]
pub enum TrainCommands {
    /// Load a (text, category) table of labels and retrain once.
    Labels {
        /// CSV or spreadsheet with text and category columns
        file: PathBuf,
        /// Use the labels for training only, never for exact matching
        #[arg(long)]
        unverified: bool,
    },
    /// Refit the classifier from the whole corpus.
    Retrain,
}
