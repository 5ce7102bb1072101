//! relay - walks an offline request queue through a disconnect, flaky
//! uploads, reconnection and drain.
//!
//! Interrupt it (Ctrl-C) before the queue drains and run it again: the
//! leftover requests are revived from `<state-dir>/<name>.json`.

mod requests;
mod telemetry;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use relay_core::app::DEFAULT_QUEUE_NAME;
use relay_core::impls::{ManualConnectivity, TracingObserver};
use relay_core::{ConnectivityStatus, QueueConfig, QueueDirectory, QueueSnapshot};
use tracing::info;

use crate::requests::{FlakyApi, PhotoSpec, PhotoUpload, Visit, VisitRequest};

const COUNTRIES: &[&str] = &["Peru", "Chile", "Bolivia", "Ecuador", "Colombia"];

#[derive(Parser, Debug)]
#[command(name = "relay", about = "Offline request queue demo")]
struct Args {
    /// Directory holding the queue archives.
    #[arg(long, default_value = "relay-state")]
    state_dir: PathBuf,

    #[arg(long, default_value = DEFAULT_QUEUE_NAME)]
    name: String,

    /// Visit records to enqueue.
    #[arg(long, default_value_t = 3)]
    visits: usize,

    /// Photo uploads to enqueue.
    #[arg(long, default_value_t = 1)]
    uploads: usize,

    /// API calls that fail with a dropped connection before the server recovers.
    #[arg(long, default_value_t = 2)]
    network_failures: u32,

    /// API calls answered with HTTP 500 once the connection holds.
    #[arg(long, default_value_t = 1)]
    server_errors: u32,

    /// Seconds to stay offline before connecting.
    #[arg(long, default_value_t = 2)]
    offline_secs: u64,

    /// JSON queue config; defaults apply otherwise.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_logging();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => QueueConfig::from_json_file(path)
            .with_context(|| format!("loading queue config from {}", path.display()))?,
        None => QueueConfig::default().with_submission_interval(Duration::from_secs(1)),
    };

    let api = Arc::new(FlakyApi::new(
        args.network_failures,
        args.server_errors,
        Duration::from_millis(200),
    ));
    let registry = requests::registry(Arc::clone(&api))?;
    let monitor = ManualConnectivity::offline();
    let directory = QueueDirectory::new(&args.state_dir);

    let queue = directory
        .open(&args.name, |builder| {
            builder
                .config(config)
                .connectivity(Arc::new(monitor.clone()))
                .observer(Arc::new(TracingObserver::new(&args.name)))
                .factory(registry)
        })
        .with_context(|| format!("opening queue '{}'", args.name))?;

    let revived = queue.snapshot().await?.tasks.len();
    info!(queue = %args.name, revived, "queue opened");

    for i in 0..args.visits {
        let visit = Visit {
            country: COUNTRIES[i % COUNTRIES.len()].to_string(),
            note: format!("visit #{}", i + 1),
        };
        queue.enqueue(VisitRequest::new(visit, Arc::clone(&api)))?;
    }
    for i in 0..args.uploads {
        let spec = PhotoSpec {
            filename: format!("photo-{}.jpg", i + 1),
            chunks: 4,
        };
        queue.enqueue(PhotoUpload::new(spec, Arc::clone(&api)))?;
    }

    tokio::time::sleep(Duration::from_secs(args.offline_secs)).await;
    info!("connectivity restored");
    monitor.set(ConnectivityStatus::Connected);

    let mut poll = tokio::time::interval(Duration::from_millis(250));
    let last = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted; unfinished requests stay archived");
                break queue.snapshot().await?;
            }
            _ = poll.tick() => {
                let snapshot = queue.snapshot().await?;
                report(&snapshot);
                if snapshot.is_drained() {
                    break snapshot;
                }
            }
        }
    };

    println!("{}", serde_json::to_string_pretty(&last)?);
    directory.shutdown_all().await;
    Ok(())
}

fn report(snapshot: &QueueSnapshot) {
    info!(
        queue = %snapshot.name,
        progress = %format!("{:.0}%", snapshot.progress * 100.0),
        active = snapshot.active_count,
        pending = snapshot.pending_count,
        completed = snapshot.completed_count,
        connected = snapshot.connected,
        "queue status"
    );
    for task in &snapshot.tasks {
        info!(title = %task.title, subtitle = %task.subtitle, failures = task.failures, "  task");
    }
}
