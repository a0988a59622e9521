//! Focus Partner - goal-aware browsing companion
//!
//! Main entry point: wires the hub, page contexts and chat surfaces
//! in-process and drives them from the terminal.

mod browser;
mod cli;
mod cmd_chat;
mod register;

use clap::Parser;
use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use focus_config::{ConfigLoader, ConfigValidator};

use cli::{Cli, Commands, SurfaceChoice};
use cmd_chat::{handle_chat, handle_check, handle_complete};
use register::focuspartner_dir;

/// Initialize tracing with console and file output.
///
/// Log files are written to ~/.focuspartner/logs/ with daily rotation.
fn init_tracing() -> anyhow::Result<()> {
    let log_dir = focuspartner_dir().join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("focuspartner")
        .filename_suffix("log")
        .max_log_files(14)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The guard flushes the file writer on drop, so it lives for the whole run.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        // Console output goes to stderr so chat lines on stdout stay clean.
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(true)
                .with_writer(std::io::stderr),
        )
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let cli = Cli::parse();

    let config = ConfigLoader::load_or_default(&cli.config)?;
    let validation = ConfigValidator::validate(&config);
    for warning in &validation.warnings {
        warn!("Config {}: {}", warning.path, warning.message);
    }
    if let Some(error) = validation.into_error() {
        return Err(error.into());
    }
    info!(
        "Starting Focus Partner v{} (config {})",
        env!("CARGO_PKG_VERSION"),
        cli.config.display()
    );

    match cli.command {
        None => handle_chat(config, SurfaceChoice::Popup, "https://example.com", None).await,
        Some(Commands::Chat {
            surface,
            url,
            page_text,
        }) => handle_chat(config, surface, &url, page_text).await,
        Some(Commands::Check { goal, text }) => handle_check(config, &goal, &text).await,
        Some(Commands::Complete { prompt }) => handle_complete(config, &prompt).await,
    }
}
