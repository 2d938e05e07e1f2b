//! # newsdeck
//!
//! A terminal client for a news dashboard backend. It queries the backend's
//! read API for cached articles matching a set of filters, renders the
//! results as text cards or JSON, and falls back to a single backend-side
//! refresh cycle when a query comes back empty.
//!
//! ## Features
//!
//! - Filters by country, category, language, date range, and page
//! - One-shot mode for scripts and an interactive mode for browsing
//! - Automatic fallback refresh: an empty page asks the backend to pull
//!   fresh articles, then re-queries once after a short delay
//! - Text-card output for terminals and pretty JSON for pipelines
//!
//! ## Usage
//!
//! ```sh
//! newsdeck --country gb --category technology
//! newsdeck -i --backend-url https://news.example.com
//! ```
//!
//! ## Architecture
//!
//! The client follows a command/event architecture:
//! 1. **Resolve**: CLI flags, environment, and the config file fold into one
//!    [`config::Config`] and an initial set of filters
//! 2. **Browse**: the pure [`browser::NewsBrowser`] core turns filter changes
//!    and backend completions into commands
//! 3. **Execute**: the [`session::Session`] shell runs those commands as
//!    spawned backend calls and an abortable retry timer
//! 4. **Render**: the settled view prints as cards or JSON

use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod api;
mod browser;
mod catalog;
mod cli;
mod config;
mod error;
mod models;
mod outputs;
mod session;
mod utils;

use api::{BackendClient, NewsBackend};
use browser::{NewsBrowser, ViewState};
use cli::Cli;
use config::Config;
use outputs::{cards, json};
use session::Session;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    info!("newsdeck starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.country, ?args.category, ?args.page, interactive = args.interactive, "Parsed CLI arguments");

    // --- Resolve configuration and initial filters ---
    let config = Config::resolve(&args)?;
    info!(backend_url = %config.backend_url, "Configuration resolved");
    let filters = args.filters(&config);
    debug!(?filters, "Initial filters");

    let backend: Arc<dyn NewsBackend> = Arc::new(BackendClient::new(&config)?);
    let browser = NewsBrowser::new(filters, config.retry_delay, !args.no_refresh);
    let mut session = Session::new(browser, backend);

    if args.interactive {
        session.run_interactive().await?;
    } else {
        let view = session.run_to_settled().await;

        if args.json {
            match &view.state {
                ViewState::Grid(articles) => println!("{}", json::render_articles(articles)?),
                ViewState::Error(message) => {
                    eprintln!("✗ {message}");
                    std::process::exit(1);
                }
                _ => println!("[]"),
            }
        } else {
            print!("{}", cards::render_view(&view));
            if matches!(view.state, ViewState::Error(_)) {
                std::process::exit(1);
            }
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
