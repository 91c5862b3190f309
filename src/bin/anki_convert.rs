use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use inkcards::import::parse_anki_csv;
use inkcards::store::{CardPersistence, JsonStore};

#[derive(Parser)]
#[command(
    name = "anki_convert",
    version,
    about = "Convert an Anki vocabulary CSV export into an inkcards card file"
)]
struct Cli {
    /// Anki export (CSV, no header row)
    input: PathBuf,
    /// Card file to write
    output: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let file = File::open(&cli.input)
        .with_context(|| format!("cannot open {}", cli.input.display()))?;
    let records = parse_anki_csv(file)?;

    JsonStore::new(&cli.output).save(&records)?;

    println!(
        "Converted {} flashcards to {}",
        records.len(),
        cli.output.display()
    );
    Ok(())
}
