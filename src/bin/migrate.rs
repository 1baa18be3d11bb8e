use acadify_migrate::{dry_run, migrate, MigrateConfig};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(version = env!("CARGO_PKG_VERSION"), about = env!("CARGO_PKG_DESCRIPTION"))]
struct Opts {
    /// configuration file path, with `[src]` and `[dst]` tables.
    #[clap(short, long)]
    conf: Option<PathBuf>,
    /// source database uri, default to local acadify database.
    #[clap(short, long)]
    source_uri: Option<String>,
    /// log file path, if not specified, all log information will be output to stdout.
    #[clap(long)]
    log_path: Option<PathBuf>,
    /// only list collections that would be copied, nothing is written.
    #[clap(long)]
    dry_run: bool,
}

fn init_tracing(log_path: Option<&Path>) -> WorkerGuard {
    let (non_blocking, guard) = match log_path.and_then(|p| Some((p.parent()?, p.file_name()?))) {
        Some((dir_name, file_name)) => {
            let file_appender = tracing_appender::rolling::daily(dir_name, file_name);
            tracing_appender::non_blocking(file_appender)
        }
        None => tracing_appender::non_blocking(std::io::stdout()),
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(non_blocking)
        .init();
    guard
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let opts: Opts = Opts::parse();
    let _guard = init_tracing(opts.log_path.as_deref());

    let conf = match MigrateConfig::load(opts.conf.as_deref(), opts.source_uri.as_deref()) {
        Ok(conf) => conf,
        Err(e) => {
            error!(%e, detail = ?e, "Configuration error, nothing is migrated.");
            return ExitCode::from(1);
        }
    };

    if opts.dry_run {
        match dry_run(&conf).await {
            Ok(planned) => {
                for p in planned.iter() {
                    let action = if p.will_copy() { "copy" } else { "skip, empty" };
                    info!(coll = %p.name, documents = p.documents, action, "Planned.");
                }
                info!(total = planned.len(), "Dry run complete, nothing is written.");
            }
            Err(e) => error!(?e, "Dry run failed."),
        }
        return ExitCode::SUCCESS;
    }

    // runtime failures are logged, the process still exits normally.
    match migrate(&conf).await {
        Ok(report) => {
            for coll in report.skipped_reserved.iter() {
                warn!(%coll, "Reserved collection is not migrated.");
            }
            info!(
                collections = report.collections.len(),
                copied = report.copied_collections().len(),
                inserted = report.total_inserted(),
                elapsed_secs = report.elapsed_secs(),
                "Migration complete!"
            );
        }
        Err(e) => {
            error!(%e, detail = ?e, "Migration failed, destination may be partially migrated.");
        }
    }
    ExitCode::SUCCESS
}
