use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use solvedb::io_utils::{db_cli_error, io_cli_error, simple_cli_error};
use solvedb::{write_database, PuzzleOptions, SearchResult, SolvedPositions, WriterConfig};

/// Write the solved positions of a puzzle to a sparse chunked database.
#[derive(Parser)]
#[command(name = "solvedb")]
struct Args {
    /// Puzzle identifier, used for the header and the database file name
    puzzle: Option<String>,
    /// CSV file of `position,remoteness` rows [default: <PUZZLE>.csv]
    #[arg(long)]
    positions: Option<PathBuf>,
    /// Largest position of the puzzle [default: largest listed position]
    #[arg(long)]
    max_hash: Option<u64>,
    /// log2 of the number of records per chunk
    #[arg(long, default_value_t = solvedb::DEFAULT_CHUNK_BITS)]
    chunk_bits: u8,
    /// Directory to create the database in
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    /// Puzzle option as KEY=VALUE; VALUE is parsed as JSON when possible
    #[arg(long = "option", value_name = "KEY=VALUE")]
    options: Vec<String>,
    /// Disable progress reports
    #[arg(long)]
    quiet: bool,
    /// Print the write summary as JSON on stdout
    #[arg(long)]
    json: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn parse_options(raw: &[String]) -> Result<PuzzleOptions, Box<dyn std::error::Error>> {
    let mut options = PuzzleOptions::new();
    for item in raw {
        let (key, value) = item
            .split_once('=')
            .ok_or_else(|| simple_cli_error(&format!("Invalid option '{item}', expected KEY=VALUE")))?;
        let value = serde_json::from_str(value)
            .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
        options.insert(key.to_string(), value);
    }
    Ok(options)
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let Some(puzzle) = args.puzzle.as_deref() else {
        eprintln!("{}", Args::command().render_usage());
        eprintln!("Arguments: puzzle identifier");
        return Ok(());
    };
    solvedb::validate_puzzle_id(puzzle).map_err(|e| db_cli_error("Invalid puzzle", e))?;
    let options = parse_options(&args.options)?;

    let positions = args
        .positions
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{puzzle}.csv")));
    let file =
        File::open(&positions).map_err(|e| io_cli_error("reading positions", &positions, e))?;
    let solved = SolvedPositions::from_csv(file, args.max_hash)
        .map_err(|e| db_cli_error("Loading solved positions failed", e))?;
    tracing::info!(
        puzzle,
        positions = solved.len(),
        max_hash = solved.max_hash(),
        "loaded solved positions"
    );

    let config = WriterConfig {
        chunk_bits: args.chunk_bits,
        progress_interval: Duration::from_millis(500),
        report_progress: !args.quiet,
        output_dir: args.out_dir.clone(),
    };
    let (path, summary) = write_database(puzzle, &options, &solved, &config)
        .map_err(|e| db_cli_error("Writing database failed", e))?;

    if args.json {
        let out = serde_json::json!({
            "path": path,
            "summary": summary,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        eprintln!(
            "Wrote {} of {} chunks to {}",
            summary.written_chunks,
            summary.total_chunks,
            path.display()
        );
    }
    Ok(())
}
