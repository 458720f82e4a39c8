//! Confluence CLI
//!
//! Usage:
//!   confluence analyze BTCUSDT
//!   confluence analyze BTCUSDT ETHUSDT --interval 1h
//!   confluence analyze SOLUSDT --json

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use confluence::config::AppConfig;
use confluence::{render_error, render_report, Analyzer};

#[derive(Parser, Debug)]
#[command(name = "confluence")]
#[command(about = "Technical confluence analysis for crypto pairs")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable JSON logging format
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze one or more trading pairs
    Analyze {
        /// Trading pairs, e.g. BTCUSDT
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Candle interval for the primary source (defaults to analysis.default_interval)
        #[arg(short, long)]
        interval: Option<String>,

        /// Print results as JSON instead of the text report
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.json_logs);

    let config = AppConfig::load()?;
    info!(config = %config.digest(), "🚀 Confluence starting");

    let analyzer = Analyzer::from_config(&config).context("Failed to build analyzer")?;

    match args.command {
        Command::Analyze {
            symbols,
            interval,
            json,
        } => {
            let interval = interval.unwrap_or_else(|| analyzer.default_interval().to_string());
            let requests: Vec<(String, String)> = symbols
                .into_iter()
                .map(|symbol| (symbol, interval.clone()))
                .collect();

            let outcomes = analyzer.analyze_many(&requests).await;
            let mut failed = 0usize;

            for ((symbol, _), outcome) in requests.iter().zip(outcomes) {
                match outcome {
                    Ok(result) if json => {
                        println!("{}", serde_json::to_string_pretty(&result)?);
                    }
                    Ok(result) => {
                        println!("{}\n", render_report(&result));
                    }
                    Err(e) => {
                        failed += 1;
                        error!(symbol = %symbol, error = %e, "Analysis failed");
                        if json {
                            let body = serde_json::json!({ "symbol": symbol, "error": e.to_string() });
                            println!("{}", serde_json::to_string_pretty(&body)?);
                        } else {
                            println!("{}\n", render_error(&e));
                        }
                    }
                }
            }

            if failed > 0 {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn init_logging(json_logs: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries the report; logs go to stderr
    if json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
