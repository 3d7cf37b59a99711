mod render;

use std::time::Duration;

use anyhow::Result;
use diskhud_core::{scheduler, SystemProbe, VolumeSampler};
use tokio::sync::watch;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

const DEFAULT_REFRESH_SECS: u64 = 30;

fn refresh_interval() -> Duration {
    std::env::var("DISKHUD_REFRESH_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(DEFAULT_REFRESH_SECS))
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let sampler = VolumeSampler::enumerate(SystemProbe::new());

    // One-shot modes: print and exit.
    let mode = std::env::args().nth(1);
    match mode.as_deref() {
        Some("once") => {
            println!("{}", render::readout(&sampler.snapshot()));
            return Ok(());
        }
        Some("json") => {
            println!("{}", serde_json::to_string_pretty(&sampler.snapshot())?);
            return Ok(());
        }
        Some(other) => {
            anyhow::bail!("unknown mode {other:?}; expected no argument, \"once\" or \"json\"");
        }
        None => {}
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.send(true);
    })?;

    let (mut snapshots, refresh_loop) = scheduler::spawn(sampler, refresh_interval(), shutdown_rx);

    // Paint the enumeration snapshot right away, then once per notification.
    render::paint(&snapshots.borrow_and_update());
    while snapshots.changed().await.is_ok() {
        let snapshot = snapshots.borrow_and_update().clone();
        render::paint(&snapshot);
    }

    refresh_loop.await?;

    // Leave the readout line behind intact.
    println!();
    info!("diskhud exiting");

    Ok(())
}
