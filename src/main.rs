//! Entry point for the vocabulary trainer.
//!
//! Responsibilities here are intentionally minimal:
//! - Parse command-line arguments.
//! - Load user configuration from `conf/config.toml`.
//! - Load the deck and its persisted progress via `session`.
//! - Dispatch one study command and print its result.

mod config;
mod deck;
mod identity;
mod normalizer;
mod progress;
mod session;
mod store;

use crate::config::load_config;
use crate::deck::Card;
use crate::session::StudySession;
use anyhow::{Result, anyhow, bail};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

const USAGE: &str = "Usage: vocab-deck <deck.csv> [stats | list [page] | search <query> | \
                     mark <id> | unmark <id> | show-studied <true|false> | clear --yes]";

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let cli = parse_args()?;
    let config = load_config(Path::new("conf/config.toml"));
    set_log_level(reload_handle, config.log_level.as_filter_str());
    info!(
        path = %cli.deck_path.display(),
        level = %config.log_level,
        "Starting vocabulary trainer"
    );

    let mut session = StudySession::load(cli.deck_path, &config)?;

    match cli.command {
        Command::Stats => print_stats(&session),
        Command::List { page } => print_page(&session, page),
        Command::Search { query } => print_search(&session, &query),
        Command::Mark { id } => {
            if session.mark(&id) {
                println!("Marked {id} as studied.");
            } else {
                println!("Nothing to do for {id}.");
            }
        }
        Command::Unmark { id } => {
            if session.unmark(&id) {
                println!("Unmarked {id}.");
            } else {
                println!("Nothing to do for {id}.");
            }
        }
        Command::ShowStudied { value } => {
            session.set_show_studied(value);
            println!(
                "Studied rows are now {}.",
                if value { "shown" } else { "hidden" }
            );
        }
        Command::Clear { confirmed } => {
            if !confirmed {
                bail!("Clearing all progress is irreversible; pass --yes to confirm");
            }
            session.clear_all();
            println!("Cleared all studied marks.");
        }
    }

    Ok(())
}

fn print_stats(session: &StudySession) {
    println!(
        "{} cards, {} studied, {} pages (studied rows {})",
        session.cards().len(),
        session.studied_count(),
        session.page_count(),
        if session.show_studied() {
            "shown"
        } else {
            "hidden"
        }
    );
}

fn print_page(session: &StudySession, page: usize) {
    let rows = session.page(page);
    if rows.is_empty() {
        println!("No cards to show.");
        return;
    }
    println!(
        "Page {}/{}",
        page.min(session.page_count() - 1) + 1,
        session.page_count()
    );
    for card in rows {
        print_card(session, card);
    }
}

fn print_search(session: &StudySession, query: &str) {
    let matches = session.search(query);
    if matches.is_empty() {
        println!("No matches for \"{query}\".");
        return;
    }
    for card in matches {
        print_card(session, card);
    }
}

fn print_card(session: &StudySession, card: &Card) {
    let mark = if session.is_studied(&card.id) {
        "x"
    } else {
        " "
    };
    println!("[{mark}] {}  {} - {}", card.id, card.korean, card.english);
}

struct CliArgs {
    deck_path: PathBuf,
    command: Command,
}

enum Command {
    Stats,
    List { page: usize },
    Search { query: String },
    Mark { id: String },
    Unmark { id: String },
    ShowStudied { value: bool },
    Clear { confirmed: bool },
}

fn parse_args() -> Result<CliArgs> {
    let mut args = env::args().skip(1);
    let path = args.next().ok_or_else(|| anyhow!(USAGE))?;

    let deck_path = PathBuf::from(path);
    if !deck_path.exists() {
        return Err(anyhow!("File not found: {}", deck_path.display()));
    }

    let command = match args.next().as_deref() {
        None | Some("stats") => Command::Stats,
        Some("list") => {
            // Pages are 1-based on the command line.
            let page = match args.next() {
                Some(raw) => raw
                    .parse::<usize>()
                    .map_err(|_| anyhow!("Invalid page number: {raw}"))?
                    .saturating_sub(1),
                None => 0,
            };
            Command::List { page }
        }
        Some("search") => {
            let query = args.next().ok_or_else(|| anyhow!(USAGE))?;
            Command::Search { query }
        }
        Some("mark") => Command::Mark {
            id: args.next().ok_or_else(|| anyhow!(USAGE))?,
        },
        Some("unmark") => Command::Unmark {
            id: args.next().ok_or_else(|| anyhow!(USAGE))?,
        },
        Some("show-studied") => {
            let value = match args.next().as_deref() {
                Some("true") => true,
                Some("false") => false,
                _ => return Err(anyhow!(USAGE)),
            };
            Command::ShowStudied { value }
        }
        Some("clear") => Command::Clear {
            confirmed: args.next().as_deref() == Some("--yes"),
        },
        Some(other) => {
            warn!(command = other, "Unknown command");
            return Err(anyhow!(USAGE));
        }
    };

    Ok(CliArgs { deck_path, command })
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from config: {err}");
    }
}
