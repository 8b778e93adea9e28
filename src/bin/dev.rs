//! chatviz - Development entry point
//!
//! Runs a saved backend answer through the render pipeline without a server
//! and prints the resulting view as JSON.
//!
//! Usage:
//! ```bash
//! cargo run --bin dev -- answer.json
//! cargo run --bin dev -- answer.json --numbered --seed 7
//! ```

use anyhow::{Context, Result};
use chatviz::chat::ChatResponse;
use chatviz::pipeline;
use chatviz::viz::{ColorGenerator, SeriesLabels};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dev", about = "Render a saved chat answer to chart JSON")]
struct Args {
    /// File containing one backend answer
    path: PathBuf,

    /// Label line/bar categories "Item 1", "Item 2", ... (as history replays do)
    #[arg(long)]
    numbered: bool,

    /// Seed for the color generator, for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chatviz=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let start = Instant::now();

    let body = std::fs::read_to_string(&args.path)
        .with_context(|| format!("Failed to read {}", args.path.display()))?;
    let response: ChatResponse = serde_json::from_str(&body)
        .with_context(|| format!("Failed to decode {}", args.path.display()))?;

    if let Some(message) = &response.error_message {
        warn!(error = %message, "Answer carries an error message; nothing to render");
        anyhow::bail!("Backend error: {}", message);
    }

    let labels = if args.numbered {
        SeriesLabels::Numbered
    } else {
        SeriesLabels::Blank
    };
    let mut colors = match args.seed {
        Some(seed) => ColorGenerator::with_seed(seed),
        None => ColorGenerator::new(),
    };

    let view = pipeline::render(&response, labels, &mut colors).context("Failed to render answer")?;

    info!(
        mode = ?view.mode(),
        colors = colors.generated(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Rendered"
    );

    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}
