//! asistencia - command-line client for the attendance backend.
//!
//! Every command runs through the same request pipeline the kiosk and admin
//! screens use, so failures surface as queued notifications which are
//! printed to stderr before the process exits.

mod commands;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use asistencia_core::models::MarkType;
use asistencia_core::{
    ApiClient, Config, ExportFormat, FileStorage, KeyringStorage, NotificationQueue, SessionStorage, StorageKind,
};

#[derive(Parser, Debug)]
#[command(name = "asistencia", version, about = "Employee attendance client")]
struct Cli {
    /// Backend base URL, e.g. http://localhost:8080/api
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Write logs to daily-rotated files in this directory instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and persist the session
    Login {
        /// Defaults to the last username used
        username: Option<String>,
    },
    /// Discard the stored session
    Logout,
    /// Show the signed-in user
    Whoami {
        /// Ask the backend whether the token is still accepted
        #[arg(long)]
        check: bool,
    },
    /// Employee administration
    #[command(subcommand)]
    Employees(EmployeeCommand),
    /// Schedule administration
    #[command(subcommand)]
    Schedules(ScheduleCommand),
    /// Register an attendance mark for a DNI
    Mark { dni: String },
    /// Attendance report for a date range
    Report {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        size: Option<u32>,
    },
    /// Download the report as a document
    Export {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long, value_enum, default_value_t = FormatArg::Excel)]
        format: FormatArg,
        /// Destination file; defaults to reporte-asistencia.<ext>
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum EmployeeCommand {
    List,
    Show { id: i64 },
    Find { dni: String },
}

#[derive(Subcommand, Debug)]
enum ScheduleCommand {
    List {
        #[arg(long)]
        active: bool,
    },
}

#[derive(clap::Args, Debug, Clone)]
struct FilterArgs {
    /// First day, YYYY-MM-DD
    #[arg(long)]
    from: Option<chrono::NaiveDate>,
    /// Last day, YYYY-MM-DD
    #[arg(long)]
    to: Option<chrono::NaiveDate>,
    #[arg(long)]
    employee: Option<i64>,
    /// ENTRADA, SALIDA_ALMUERZO, RETORNO_ALMUERZO, SALIDA or FUERA_HORARIO
    #[arg(long, value_parser = parse_mark_type)]
    mark_type: Option<MarkType>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum FormatArg {
    Excel,
    Pdf,
}

impl From<FormatArg> for ExportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Excel => ExportFormat::Excel,
            FormatArg::Pdf => ExportFormat::Pdf,
        }
    }
}

fn parse_mark_type(s: &str) -> Result<MarkType, String> {
    MarkType::parse(s).ok_or_else(|| format!("unknown mark type '{}'", s))
}

/// Initialize the tracing subscriber for logging.
///
/// RUST_LOG controls the level (default `warn`). Logs go to stderr unless a
/// log directory is given. The returned guard must live until exit so
/// buffered file output is flushed.
fn init_tracing(log_dir: Option<&PathBuf>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, stderr_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "asistencia.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), None, Some(guard))
        }
        None => (None, Some(fmt::layer().with_writer(io::stderr)), None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

fn open_storage(config: &Config) -> Result<Arc<dyn SessionStorage>> {
    let storage: Arc<dyn SessionStorage> = match config.storage {
        StorageKind::File => {
            let dir = config.cache_dir().context("Could not locate cache directory")?;
            Arc::new(FileStorage::open(&dir).context("Could not open session file")?)
        }
        StorageKind::Keyring => Arc::new(KeyringStorage::default()),
    };
    Ok(storage)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_file.as_ref());

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(url) = &cli.base_url {
        config.base_url = url.clone();
    }
    info!(base_url = %config.normalized_base_url(), storage = ?config.storage, "asistencia starting");

    let notifications = NotificationQueue::new();
    let client = ApiClient::connect(&config, open_storage(&config)?, notifications.clone())
        .context("Failed to build HTTP client")?;
    client.session().initialize();

    let result = commands::run(&client, &mut config, cli.command).await;

    let pending = notifications.snapshot();
    debug!(count = pending.len(), "Flushing notifications");
    for notification in pending {
        eprintln!("[{}] {}", notification.kind, notification.message);
    }

    result
}
