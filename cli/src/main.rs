//! CLI for the Bundle Archiver.
//!
//! Checks every repository tracked for a host, archives the ones with new
//! history as git bundles in object storage, and records the archived commit.

use bundle_archiver::{
    ConfigError, GitCli, HealthError, HttpHostCheck, NotifierConfig, NotifyError, PgRegistry,
    RegistryError, RunSummary, Runner, RunnerConfig, RunnerError, S3Store, Settings,
    StorageConfig, StorageError, WebhookNotifier,
};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use url::Url;

/// Bundle Archiver - Archive changed git repositories as bundles in object storage.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Name of the host whose repositories are archived.
    #[arg(long, env = "HOST")]
    host: String,

    /// Postgres connection string for the repository registry.
    #[arg(long, env = "PG_URL", hide_env_values = true)]
    database_url: String,

    /// Object storage endpoint (host[:port] or full URL).
    #[arg(long, env = "STORAGE_ENDPOINT")]
    storage_endpoint: String,

    /// Object storage access key.
    #[arg(long, env = "STORAGE_KEY", hide_env_values = true)]
    storage_key: String,

    /// Object storage secret key.
    #[arg(long, env = "STORAGE_SECRET", hide_env_values = true)]
    storage_secret: String,

    /// Bucket receiving the bundles.
    #[arg(long, env = "STORAGE_BUCKET")]
    storage_bucket: String,

    /// Object storage region.
    #[arg(long, env = "STORAGE_REGION", default_value = bundle_archiver::storage::DEFAULT_REGION)]
    storage_region: String,

    /// Talk to the storage endpoint over plain HTTP.
    #[arg(long)]
    no_ssl: bool,

    /// Archive every reachable repository, changed or not.
    #[arg(long)]
    force: bool,

    /// Post a summary to the events endpoint when the run finishes.
    #[arg(long)]
    events: bool,

    /// Events endpoint receiving the run summary.
    #[arg(long, env = "EVENTS_END")]
    events_endpoint: Option<Url>,

    /// Authorization value sent to the events endpoint.
    #[arg(long, env = "EVENTS_KEY", hide_env_values = true)]
    events_key: Option<String>,

    /// Maximum concurrent remote HEAD queries. Overrides the settings file.
    #[arg(long)]
    concurrency: Option<usize>,

    /// Seconds to wait between archives. Overrides the settings file.
    #[arg(long)]
    pacing_secs: Option<u64>,

    /// Directory for clones and staged bundles. Overrides the settings file.
    #[arg(long)]
    workspace_dir: Option<PathBuf>,

    /// Path to the tuning settings file; defaults apply when it is missing.
    #[arg(long, default_value = "archiver.toml")]
    settings: PathBuf,
}

/// Failures that prevent a run from starting or completing.
#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Notify(#[from] NotifyError),

    #[error(transparent)]
    Health(#[from] HealthError),

    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error("--events requires --events-endpoint (EVENTS_END) and --events-key (EVENTS_KEY)")]
    MissingEventsConfig,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Both sqlx and reqwest pull in rustls; pick one provider for the process.
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    init_tracing();

    let args = Args::parse();

    match run(args).await {
        Ok(summary) => {
            print_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(2)
        }
    }
}

/// Initializes tracing with environment filter support.
///
/// Log levels are controlled by `RUST_LOG` and default to "info".
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Main execution logic.
async fn run(args: Args) -> Result<RunSummary, CliError> {
    let settings = Settings::load_or_default(&args.settings)?;

    let mut config = RunnerConfig::new(&args.host, args.force).with_settings(&settings);
    if let Some(concurrency) = args.concurrency {
        config = config.with_concurrency(concurrency);
    }
    if let Some(secs) = args.pacing_secs {
        config = config.with_pacing(std::time::Duration::from_secs(secs));
    }
    if let Some(dir) = args.workspace_dir {
        config = config.with_workspace_dir(dir);
    }

    let registry = PgRegistry::connect(&args.database_url).await?;
    let store = S3Store::from_config(&StorageConfig {
        endpoint: args.storage_endpoint,
        access_key: args.storage_key,
        secret_key: args.storage_secret,
        bucket: args.storage_bucket,
        region: args.storage_region,
        secure: !args.no_ssl,
    })?;
    let vcs = GitCli::new()
        .with_clone_depth(settings.clone_depth)
        .with_head_timeout(settings.head_timeout())
        .with_bundle_timeout(settings.bundle_timeout());

    let host_check = HttpHostCheck::new(settings.host_check_timeout())?;

    let mut runner = Runner::new(config, Arc::new(registry), Arc::new(vcs), Arc::new(store))
        .with_host_check(Arc::new(host_check));

    if args.events {
        let (Some(endpoint), Some(key)) = (args.events_endpoint, args.events_key) else {
            return Err(CliError::MissingEventsConfig);
        };
        let notifier = WebhookNotifier::new(
            NotifierConfig::new(endpoint, key).with_timeout(settings.notify_timeout()),
        )?;
        runner = runner.with_notifier(Arc::new(notifier));
    }

    spawn_ctrl_c_handler(runner.cancellation_token());

    Ok(runner.run().await?)
}

/// Cancels the run on Ctrl-C; the repository in progress is finished first.
fn spawn_ctrl_c_handler(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing current repository");
            token.cancel();
        }
    });
}

/// Prints the final run summary.
fn print_summary(summary: &RunSummary) {
    println!("\nSummary:");
    println!("  Mode: {}", if summary.forced { "Forced" } else { "Changed only" });
    println!("  Repositories scanned: {}", summary.total_scanned);
    println!("  Archived: {}", summary.total_updated);
    println!("  Unchanged: {}", summary.unchanged);
    println!("  Deleted: {}", summary.deleted);
    println!("  Skipped: {}", summary.skipped);
    println!("  Failed: {}", summary.failed);

    if summary.cancelled {
        println!("  Run was cancelled before all repositories were processed");
    }
}
