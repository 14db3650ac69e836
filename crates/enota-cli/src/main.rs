//! enota - a terminal client for the E-nota notes service.
//!
//! Logs in against the notes REST API, keeps the issued tokens in the
//! configured token store, and lists, edits and exports notes.

mod app;
mod cli;
mod format;

use std::io;
use std::process;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use enota_core::{ApiError, Config};

use app::App;
use cli::Args;

/// Log directory inside the cache directory
const LOG_DIR: &str = "logs";

/// Initialize the tracing subscriber for logging.
///
/// Stderr gets `RUST_LOG` (default `warn`, or `debug` with `--verbose`);
/// a daily log file under the cache directory gets the same filter.
fn init_tracing(verbose: bool) -> Option<WorkerGuard> {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let file = Config::default().cache_dir().ok().and_then(|dir| {
        RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("enota")
            .filename_suffix("log")
            .build(dir.join(LOG_DIR))
            .ok()
    });
    let (file_layer, guard) = match file {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

async fn run(args: Args) -> Result<()> {
    let mut app = App::new(args.api_url.as_deref())?;
    app.run(args.command).await
}

#[tokio::main]
async fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    let guard = init_tracing(args.verbose);
    info!("enota starting");

    let code = match run(args).await {
        Ok(()) => 0,
        Err(e) => {
            debug!(error = %e, "Command failed");
            eprintln!("Error: {:#}", e);
            if e.downcast_ref::<ApiError>().is_some_and(ApiError::requires_login) {
                eprintln!("Your session has expired. Run `enota login` to sign in again.");
            }
            1
        }
    };

    // Flush the log file before exiting
    drop(guard);
    process::exit(code);
}
