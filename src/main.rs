//! Command-line driver: bulk-load an id/weight file, then answer commands
//! read line by line from stdin.
//!
//! ```bash
//! tallytree input.txt < commands.txt
//! ```

use std::fs;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use tallytree::command::{Command, parse_entries};
use tallytree::tree::BulkLoader;

/// Ordered id counters with range sums and neighbour queries
#[derive(Parser, Debug)]
#[command(name = "tallytree")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// File holding an entry count followed by ascending `id weight` pairs
    input: PathBuf,

    /// Build subtrees concurrently down to this depth during the initial load
    #[arg(long, default_value_t = 2)]
    parallel_depth: u32,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let raw = fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;
    let entries = parse_entries(&raw)
        .with_context(|| format!("failed to parse {}", cli.input.display()))?;
    let mut tree = BulkLoader::new()
        .parallel_depth(cli.parallel_depth)
        .build(&entries)
        .with_context(|| format!("failed to load {}", cli.input.display()))?;
    tracing::info!("Loaded {} id(s) from {}", tree.len(), cli.input.display());

    let stdin = io::stdin();
    let mut out = BufWriter::new(io::stdout().lock());
    for (line_no, line) in stdin.lock().lines().enumerate() {
        let line = line.context("failed to read command")?;
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                tracing::warn!("line {}: {}", line_no + 1, err);
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }
        writeln!(out, "{}", command.execute(&mut tree))?;
        // Interactive use expects each answer before the next prompt.
        out.flush()?;
    }
    return Ok(());
}
