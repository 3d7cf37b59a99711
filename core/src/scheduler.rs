//! Background refresh loop.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::probe::CapacityProbe;
use crate::sampler::VolumeSampler;
use crate::volume::VolumeCollection;

/// Spawns the refresh loop: tick, sweep every volume, publish a fresh
/// snapshot. The watch channel doubles as the redraw signal; a burst of
/// publications before the reader wakes coalesces into one observation,
/// which is exactly what a repaint wants.
///
/// The returned receiver starts out holding the sampler's current snapshot,
/// so the first paint never waits for a tick. The loop is strictly
/// sequential and the ticker delays missed ticks, so consecutive sweep
/// starts are always at least `interval` apart.
///
/// The task stops when the shutdown signal turns true (or its sender is
/// dropped), or when every snapshot receiver is gone.
pub fn spawn<P>(
    mut sampler: VolumeSampler<P>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> (watch::Receiver<VolumeCollection>, JoinHandle<()>)
where
    P: CapacityProbe + Send + 'static,
{
    let (tx, rx) = watch::channel(sampler.snapshot());

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval_secs = interval.as_secs(), "refresh loop started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    sampler.refresh_all();
                    if tx.send(sampler.snapshot()).is_err() {
                        debug!("all snapshot readers gone; stopping refresh loop");
                        break;
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("refresh loop stopped");
    });

    (rx, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{CapacityProbe, CapacityReading, ProbeError};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    /// Probe whose readings the test can rewrite while the loop owns it.
    #[derive(Clone)]
    struct SharedProbe {
        mask: u32,
        readings: Arc<Mutex<HashMap<char, CapacityReading>>>,
        queries: Arc<AtomicU64>,
    }

    impl SharedProbe {
        fn new(mask: u32) -> Self {
            Self {
                mask,
                readings: Arc::new(Mutex::new(HashMap::new())),
                queries: Arc::new(AtomicU64::new(0)),
            }
        }

        fn set(&self, letter: char, total: u64, free: u64) {
            self.readings.lock().unwrap().insert(
                letter,
                CapacityReading {
                    total_bytes: total,
                    used_bytes: total - free,
                    free_bytes: free,
                },
            );
        }
    }

    impl CapacityProbe for SharedProbe {
        fn available(&mut self) -> u32 {
            self.mask
        }

        fn query(&mut self, letter: char) -> Result<CapacityReading, ProbeError> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            self.readings
                .lock()
                .unwrap()
                .get(&letter)
                .copied()
                .ok_or(ProbeError::Missing(letter))
        }
    }

    const INTERVAL: Duration = Duration::from_secs(30);

    #[tokio::test(start_paused = true)]
    async fn publishes_fresh_snapshots_each_tick() {
        let probe = SharedProbe::new(0b1);
        probe.set('A', 1000, 400);

        let sampler = VolumeSampler::enumerate(probe.clone());
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let (mut rx, _handle) = spawn(sampler, INTERVAL, shutdown_rx);

        // The channel starts with the enumeration snapshot.
        assert_eq!(rx.borrow_and_update().volumes[0].free_bytes, 400);

        probe.set('A', 1000, 100);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().volumes[0].free_bytes, 100);

        probe.set('A', 1000, 900);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().volumes[0].free_bytes, 900);
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_starts_are_spaced_by_the_interval() {
        let probe = SharedProbe::new(0b11);
        probe.set('A', 100, 50);
        probe.set('B', 100, 50);

        let sampler = VolumeSampler::enumerate(probe.clone());
        let enumeration_queries = probe.queries.load(Ordering::SeqCst);

        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let (mut rx, _handle) = spawn(sampler, INTERVAL, shutdown_rx);

        let start = Instant::now();
        for _ in 0..3 {
            rx.changed().await.unwrap();
        }

        // Three full sweeps over both volumes.
        let sweeps = probe.queries.load(Ordering::SeqCst) - enumeration_queries;
        assert_eq!(sweeps, 3 * 2);

        // First tick fires immediately; the next two are an interval apart.
        assert!(start.elapsed() >= 2 * INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_signal_stops_the_loop() {
        let probe = SharedProbe::new(0b1);
        probe.set('A', 100, 50);

        let sampler = VolumeSampler::enumerate(probe);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (_rx, handle) = spawn(sampler, INTERVAL, shutdown_rx);

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_shutdown_sender_also_stops_the_loop() {
        let probe = SharedProbe::new(0b1);
        probe.set('A', 100, 50);

        let sampler = VolumeSampler::enumerate(probe);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (_rx, handle) = spawn(sampler, INTERVAL, shutdown_rx);

        drop(shutdown_tx);
        handle.await.unwrap();
    }
}
