use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use trackd::{
    config::ServerConfig, issues::storage::IssueStorage, rest, storage::Storage, AppContext,
};

#[derive(Parser)]
#[command(
    name = "trackd",
    about = "trackd — always-on issue tracking service",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port
    #[arg(long, env = "TRACKD_PORT")]
    port: Option<u16>,

    /// Data directory for config and the SQLite database
    #[arg(long, env = "TRACKD_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TRACKD_LOG")]
    log: Option<String>,

    /// Bind address for the HTTP server (default: 127.0.0.1; use 0.0.0.0 for LAN access)
    #[arg(long, env = "TRACKD_BIND")]
    bind_address: Option<String>,

    /// Write logs to this file path (rotated daily). Optional.
    #[arg(long, env = "TRACKD_LOG_FILE")]
    log_file: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the server (default when no subcommand given).
    ///
    /// Runs trackd in the foreground.
    ///
    /// Examples:
    ///   trackd serve
    ///   trackd
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    match args.command {
        Some(Command::Serve) | None => serve(args).await,
    }
}

async fn serve(args: Args) -> Result<()> {
    let config = Arc::new(ServerConfig::new(
        args.port,
        args.data_dir,
        args.log,
        args.bind_address,
    ));
    let _log_guard = init_tracing(&config, args.log_file.as_deref());

    info!(
        data_dir = %config.data_dir.display(),
        version = env!("CARGO_PKG_VERSION"),
        "starting trackd"
    );

    let storage = Arc::new(
        Storage::new_with_slow_query(
            &config.data_dir,
            config.observability.slow_query_threshold_ms,
        )
        .await
        .context("failed to open issue database")?,
    );
    let issues = Arc::new(IssueStorage::new(storage.pool()));

    let ctx = Arc::new(AppContext {
        config,
        storage,
        issues,
        started_at: std::time::Instant::now(),
    });

    rest::start_rest_server(ctx).await
}

/// Initialise the tracing subscriber from config.
///
/// Returns the appender worker guard when logging to a file; it must stay
/// alive for the lifetime of the process or buffered log lines are lost.
fn init_tracing(
    config: &ServerConfig,
    log_file: Option<&Path>,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_new(&config.log).unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .map(|f| f.to_os_string())
                .unwrap_or_else(|| "trackd.log".into());
            let appender = tracing_appender::rolling::daily(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let builder = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false);
            if config.log_format == "json" {
                builder.json().init();
            } else {
                builder.init();
            }
            Some(guard)
        }
        None => {
            let builder = tracing_subscriber::fmt().with_env_filter(filter);
            if config.log_format == "json" {
                builder.json().init();
            } else {
                builder.init();
            }
            None
        }
    }
}
