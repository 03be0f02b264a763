mod categories;
mod classifier;
mod cli;
mod db;
mod error;
mod fmt;
mod importer;
mod learning;
mod ledger;
mod ledger_parser;
mod models;
mod resolver;
mod segmenter;
mod settings;
mod tokenizer;
mod training;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use cli::{App, CategoriesCommands, Cli, Commands, RecordsCommands, TrainCommands};

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let user = cli.user.as_deref();
    let result = match cli.command {
        Commands::Init { data_dir, user_name } => cli::init::run(data_dir, user_name),
        Commands::Template { file } => cli::template::run(&file),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "moneymind", &mut std::io::stdout());
            Ok(())
        }
        command => App::open(user).and_then(|app| match command {
            Commands::Entry {
                text,
                file,
                date,
                out,
                yes,
            } => cli::entry::run(&app, text, file, date, out, yes),
            Commands::Import { file, out, yes } => cli::import::run(&app, &file, out.as_deref(), yes),
            Commands::Confirm { file } => cli::confirm::run(&app, &file),
            Commands::Records { command } => match command {
                RecordsCommands::List {
                    month,
                    uncategorized,
                    limit,
                } => cli::records::list(&app, month, uncategorized, limit),
                RecordsCommands::Edit {
                    id,
                    date,
                    description,
                    amount,
                    category,
                    clear_category,
                } => cli::records::edit(&app, id, date, description, amount, category, clear_category),
                RecordsCommands::Delete { id } => cli::records::delete(&app, id),
            },
            Commands::Categories { command } => match command {
                CategoriesCommands::List => cli::categories::list(&app),
                CategoriesCommands::Add { name, kind, global } => cli::categories::add(&app, &name, &kind, global),
                CategoriesCommands::Edit { id, name, kind, global } => {
                    cli::categories::edit(&app, id, name.as_deref(), kind.as_deref(), global)
                }
                CategoriesCommands::Delete { id, global } => cli::categories::delete(&app, id, global),
            },
            Commands::Train { command } => match command {
                TrainCommands::Labels { file, unverified } => cli::train::labels(&app, &file, unverified),
                TrainCommands::Retrain => cli::train::retrain(&app),
            },
            Commands::Predict { text } => cli::predict::run(&app, &text),
            Commands::Status => cli::status::run(&app),
            Commands::Init { .. } | Commands::Template { .. } | Commands::Completions { .. } => Ok(()),
        }),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
