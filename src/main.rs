//! chatviz - Main entry point
//!
//! Sends natural-language questions to the data-chat backend and prints the
//! answer as a chart summary or table.
//!
//! Usage:
//! ```bash
//! export CHATVIZ_API_URL=http://localhost:8080
//! chatviz                                # interactive
//! chatviz --once "premiums by city"      # single question
//! chatviz --once "claims" --json         # chart structures as JSON
//! ```

use anyhow::{Context, Result};
use chatviz::chat::{ChatClient, ConversationMessage, HistoryPage};
use chatviz::config::ClientConfig;
use chatviz::pipeline::{ChartView, View};
use chatviz::session::{Outcome, QuerySession, Screen, SessionConfig};
use chatviz::viz::{ColorValue, HslColor, TableView};
use clap::Parser;
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[cfg(feature = "jemalloc")]
use tikv_jemallocator::Jemalloc;

#[cfg(feature = "jemalloc")]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

/// Server-side history page size
const HISTORY_PAGE_SIZE: u32 = 20;

#[derive(Parser, Debug)]
#[command(name = "chatviz", version, about = "Ask questions about your data and chart the answers")]
struct Args {
    /// Backend base URL (overrides CHATVIZ_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Use the endpoint of earlier backend revisions (/api/v1/chat)
    #[arg(long)]
    legacy_endpoint: bool,

    /// Request timeout in seconds (overrides CHATVIZ_TIMEOUT_SECS)
    #[arg(long)]
    timeout: Option<u64>,

    /// Ask one question and exit
    #[arg(long, value_name = "QUERY")]
    once: Option<String>,

    /// Print the display as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chatviz=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = ClientConfig::from_env();
    if let Some(url) = args.api_url {
        config.api_url = url;
    }
    if args.legacy_endpoint {
        config = config.use_legacy_endpoint();
    }
    if let Some(secs) = args.timeout {
        config.timeout = Duration::from_secs(secs.max(1));
    }

    let client = ChatClient::new(&config).context("Failed to create chat client")?;
    info!(url = client.message_url(), "chatviz v{}", env!("CARGO_PKG_VERSION"));

    let mut session = QuerySession::new(client, SessionConfig::from(&config));

    if let Some(query) = args.once {
        let outcome = session.submit(&query).await;
        print_outcome(&mut session, outcome, args.json)?;
        if outcome == Outcome::TransportFailed {
            anyhow::bail!("Error fetching data");
        }
        return Ok(());
    }

    run_interactive(&mut session, args.json).await
}

async fn run_interactive(session: &mut QuerySession<ChatClient>, json: bool) -> Result<()> {
    println!("Ask a question about your data. Commands: :new, :history, :replay N, :server-history [PAGE], :open ID, :quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };
        let line = line.trim();

        match line.split_once(' ').unwrap_or((line, "")) {
            (":quit", _) | (":q", _) => break,
            (":new", _) => {
                session.new_session();
                println!("New session started");
            }
            (":history", _) => {
                if session.history().is_empty() {
                    println!("No questions yet");
                }
                for entry in session.history() {
                    println!("  {:>3}  {}", entry.ordinal, entry.label());
                }
            }
            (":replay", arg) => match arg.trim().parse::<u64>() {
                Ok(ordinal) => {
                    let outcome = session.replay(ordinal).await;
                    if outcome == Outcome::Ignored {
                        println!("No history entry {}", ordinal);
                    } else {
                        print_outcome(session, outcome, json)?;
                    }
                }
                Err(_) => println!("Usage: :replay N"),
            },
            (":server-history", arg) => {
                let page = arg.trim().parse::<u32>().unwrap_or(0);
                match session.backend().fetch_history(page, HISTORY_PAGE_SIZE).await {
                    Ok(history) => print_server_history(&history),
                    Err(e) => eprintln!("Failed to fetch history: {}", e),
                }
            }
            (":open", id) if !id.trim().is_empty() => {
                let id = id.trim();
                match session.backend().fetch_conversation(id).await {
                    Ok(messages) => {
                        print_conversation(&messages);
                        session.resume(id);
                        println!("Continuing conversation {}", id);
                    }
                    Err(e) => eprintln!("Failed to open conversation: {}", e),
                }
            }
            (":open", _) => println!("Usage: :open ID"),
            _ if line.starts_with(':') => println!("Unknown command '{}'", line),
            _ => {
                let outcome = session.submit(line).await;
                print_outcome(session, outcome, json)?;
            }
        }
    }

    Ok(())
}

fn print_outcome(
    session: &mut QuerySession<ChatClient>,
    outcome: Outcome,
    json: bool,
) -> Result<()> {
    for note in session.take_notifications() {
        eprintln!("! {}", note);
    }

    match outcome {
        Outcome::TransportFailed => eprintln!("! Error fetching data"),
        Outcome::Ignored | Outcome::Stale | Outcome::Errored => {}
        Outcome::NoContent if !json => println!("(no data)"),
        Outcome::NoContent | Outcome::Rendered(_) => {
            if json {
                let text = serde_json::to_string_pretty(session.screen())
                    .context("Failed to serialize screen")?;
                println!("{}", text);
            } else {
                print_screen(session.screen());
            }
        }
    }
    Ok(())
}

fn print_screen(screen: &Screen) {
    if !screen.title.is_empty() {
        println!("\n{}", screen.title);
        println!("{}", "=".repeat(screen.title.chars().count()));
    }

    match &screen.view {
        View::Nothing => println!("(no data)"),
        View::Chart(chart) => print_chart(chart),
        View::Table(table) => print_table(table),
    }

    if let Some(explanation) = &screen.explanation {
        println!("\n{}", explanation);
    }
    if let Some(summary) = &screen.summary {
        let mut parts = Vec::new();
        if let Some(n) = summary.total_records {
            parts.push(format!("records: {}", n));
        }
        for (name, value) in [
            ("total", summary.total),
            ("average", summary.average),
            ("min", summary.min),
            ("max", summary.max),
        ] {
            if let Some(v) = value {
                parts.push(format!("{}: {}", name, v));
            }
        }
        if !parts.is_empty() {
            println!("{}", parts.join(", "));
        }
    }
    println!();
}

fn print_chart(chart: &ChartView) {
    if chart.data.is_empty() {
        println!("(nothing to plot)");
        return;
    }

    println!("[{:?} chart]", chart.kind);

    for dataset in &chart.data.datasets {
        match &dataset.background_color {
            // One color per slice
            Some(ColorValue::PerLabel(colors)) => {
                for ((label, value), color) in chart.data.labels.iter().zip(&dataset.data).zip(colors) {
                    println!("  {} {:<24} {}", swatch(color), label, format_value(*value));
                }
            }
            Some(ColorValue::Single(color)) => {
                let values: Vec<String> = dataset.data.iter().map(|v| format_value(*v)).collect();
                println!("  {} {:<24} {}", swatch(color), dataset.label, values.join("  "));
            }
            None => {
                let values: Vec<String> = dataset.data.iter().map(|v| format_value(*v)).collect();
                println!("  {:<27} {}", dataset.label, values.join("  "));
            }
        }
    }
}

fn print_table(table: &TableView) {
    let header = table.header();
    let cells = table.cells();

    let widths: Vec<usize> = header
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let format_row = |values: &[String]| {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<width$}", v, width = *w))
            .collect::<Vec<_>>()
            .join(" | ")
    };

    println!("{}", format_row(header));
    println!(
        "{}",
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-")
    );
    for row in &cells {
        println!("{}", format_row(row.as_slice()));
    }
}

fn print_server_history(history: &HistoryPage) {
    println!(
        "Conversations (page {} of {}, {} total):",
        history.number + 1,
        history.total_pages.max(1),
        history.total_elements
    );
    for conversation in &history.content {
        println!("  {}  {}", conversation.conversation_id, conversation.title);
    }
}

fn print_conversation(messages: &[ConversationMessage]) {
    if messages.is_empty() {
        println!("(empty conversation)");
    }
    for message in messages {
        let speaker = if message.is_user() { "you" } else { "backend" };
        println!("  {:>7}: {}", speaker, message.body());
    }
}

/// Two-cell block in the given color (24-bit ANSI)
fn swatch(color: &HslColor) -> String {
    let [r, g, b] = color.to_rgb();
    format!("\x1b[48;2;{};{};{}m  \x1b[0m", r, g, b)
}

fn format_value(value: f64) -> String {
    if value.is_finite() {
        value.to_string()
    } else {
        "-".to_string()
    }
}
