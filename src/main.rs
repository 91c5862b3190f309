use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::DateTime;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use inkcards::app::App;
use inkcards::clock::{Clock, SystemClock};
use inkcards::config::Config;
use inkcards::event::TerminalInput;
use inkcards::store::{CardStore, JsonStore};
use inkcards::ui::TerminalDisplay;

#[derive(Parser)]
#[command(
    name = "inkcards",
    version,
    about = "Ambient flashcards with spaced repetition"
)]
struct Cli {
    #[arg(short, long, help = "Config file (default: <config dir>/inkcards/config.toml)")]
    config: Option<PathBuf>,

    #[arg(long, help = "Card file, overriding cards_path from the config")]
    cards: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show due cards on the terminal until q or Esc (default)
    Run,
    /// Forget all review history
    Reset,
    /// List every card with its schedule
    Stats,
}

fn log_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("inkcards")
        .join("inkcards.log")
}

/// Logs go to a file; the terminal belongs to the card display.
fn init_logging() -> Result<()> {
    let path = log_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    let writer = Mutex::new(file);

    let filter =
        EnvFilter::try_from_env("INKCARDS_LOG").unwrap_or_else(|_| "inkcards=info".into());
    let log_format = std::env::var("INKCARDS_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(writer))
            .init(),
        _ => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_ansi(false).with_writer(writer))
            .init(),
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("failed to load config")?;

    if let Some(cards) = &cli.cards {
        config.cards_path = cards.to_string_lossy().to_string();
    }
    for fix in config.validate() {
        tracing::warn!(fix = %fix, "config adjusted");
    }
    Ok(config)
}

fn run(config: &Config) -> Result<()> {
    let display = TerminalDisplay::new()?;
    let input = TerminalInput::new(config.poll_interval());
    let store = JsonStore::new(&config.cards_path);

    let mut app = App::from_config(SystemClock::new(), display, input, store, config);
    let result = app.run();
    // Leave the alternate screen before anything is printed.
    drop(app);
    result?;
    Ok(())
}

fn reset(config: &Config) -> Result<()> {
    let mut store = CardStore::try_load(
        JsonStore::new(&config.cards_path),
        config.min_interval_secs,
        config.max_interval_secs,
    )
    .context("refusing to reset an unreadable card file")?;
    store.reset_all(config.min_interval_secs);
    store.flush()?;
    println!("Reset {} cards in {}", store.len(), config.cards_path);
    Ok(())
}

fn stats(config: &Config) -> Result<()> {
    let store = CardStore::try_load(
        JsonStore::new(&config.cards_path),
        config.min_interval_secs,
        config.max_interval_secs,
    )?;
    let now = SystemClock::new().now().as_secs();

    println!(
        "{} cards, {} due ({})",
        store.len(),
        store.due_count(now),
        config.cards_path
    );
    for card in store.cards() {
        let last = card
            .last_review
            .and_then(|secs| DateTime::from_timestamp(secs as i64, 0))
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());
        let status = match card.last_review {
            _ if card.is_due(now) => "due".to_string(),
            Some(reviewed) => format!("in {}s", reviewed.saturating_add(card.interval).saturating_sub(now)),
            None => "due".to_string(),
        };
        println!(
            "{:<16} interval {:>8}s  reviews {:>4}  last {:<16}  {}",
            card.front_text(),
            card.interval,
            card.review_count,
            last,
            status
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;
    let config = load_config(&cli)?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(&config),
        Command::Reset => reset(&config),
        Command::Stats => stats(&config),
    }
}
