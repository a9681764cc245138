//! Print the header of a puzzle database and optionally look up positions.

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use solvedb::io_utils::db_cli_error;
use solvedb::DatabaseReader;

#[derive(Parser)]
struct Args {
    /// Database file
    input: PathBuf,
    /// Positions to look up
    positions: Vec<u64>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let mut reader =
        DatabaseReader::open(&args.input).map_err(|e| db_cli_error("Opening database failed", e))?;

    let header = reader.header();
    println!("puzzle: {}", header.puzzle);
    println!("options: {}", serde_json::to_string(&header.options)?);
    for field in &header.fields {
        println!("field: {} ({} bits)", field.name, field.bit_width);
    }
    println!("chunk bits: {}", header.chunk_bits);
    println!("header bytes: {}", reader.header_len());
    println!("chunk base: {}", reader.chunk_base());

    for position in args.positions {
        match reader
            .remoteness(position)
            .map_err(|e| db_cli_error("Lookup failed", e))?
        {
            Some(r) => println!("{position}: {r}"),
            None => println!("{position}: unwritten"),
        }
    }
    Ok(())
}
