//! Volume discovery and refresh sweeps.

use tracing::{debug, info, warn};

use crate::probe::CapacityProbe;
use crate::volume::{VolumeCollection, VolumeRecord};

/// Owns the probe and the tracked volumes. The scheduler is the only writer;
/// everyone else reads cloned snapshots.
pub struct VolumeSampler<P> {
    probe: P,
    volumes: VolumeCollection,
    failed_probes: u64,
}

impl<P: CapacityProbe> VolumeSampler<P> {
    /// Reads the availability bitmask once and builds one record per set bit
    /// in ascending bit order, letter `'A' + bit`. Each record gets an
    /// initial update so the first paint shows real data.
    pub fn enumerate(mut probe: P) -> Self {
        let mask = probe.available();

        let mut volumes = Vec::new();
        for bit in 0..32u8 {
            if mask & (1 << bit) == 0 {
                continue;
            }

            let mut record = VolumeRecord::new((b'A' + bit) as char);
            record.update(&mut probe);
            volumes.push(record);
        }

        if volumes.is_empty() {
            // Valid state, not an error: the readout shows an empty line.
            info!("no volumes reported by the operating system");
        } else {
            info!(count = volumes.len(), "tracking volumes");
        }

        Self {
            probe,
            volumes: VolumeCollection { volumes },
            failed_probes: 0,
        }
    }

    /// Refreshes every tracked volume in order. A failing query keeps that
    /// volume's previous snapshot and never aborts the sweep.
    pub fn refresh_all(&mut self) {
        for record in &mut self.volumes.volumes {
            if !record.update(&mut self.probe) {
                self.failed_probes += 1;
                warn!(volume = %record.letter, "capacity query failed; keeping last snapshot");
            }
        }

        debug!(volumes = self.volumes.len(), "refresh sweep complete");
    }

    /// Clone of the current state, safe to hand to readers.
    pub fn snapshot(&self) -> VolumeCollection {
        self.volumes.clone()
    }

    /// Running count of failed capacity queries.
    pub fn failed_probes(&self) -> u64 {
        self.failed_probes
    }
}
