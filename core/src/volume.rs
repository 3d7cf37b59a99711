//! Tracked volumes and their capacity snapshots.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::probe::CapacityProbe;
use crate::units::narrow;

/// One tracked volume. The letter is assigned at discovery and never
/// changes; the capacity triple is replaced wholesale on each successful
/// probe query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VolumeRecord {
    pub letter: char,
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
}

impl VolumeRecord {
    pub fn new(letter: char) -> Self {
        Self {
            letter,
            total_bytes: 0,
            used_bytes: 0,
            free_bytes: 0,
        }
    }

    /// Refreshes the capacity triple from one probe query.
    ///
    /// All three fields come from the same query, so `used + free == total`
    /// holds after a successful update. A failed query leaves the previous
    /// snapshot in place and returns false.
    pub fn update<P: CapacityProbe>(&mut self, probe: &mut P) -> bool {
        match probe.query(self.letter) {
            Ok(reading) => {
                self.total_bytes = reading.total_bytes;
                self.used_bytes = reading.used_bytes;
                self.free_bytes = reading.free_bytes;
                true
            }
            Err(err) => {
                debug!(volume = %self.letter, "capacity query failed: {err}");
                false
            }
        }
    }

    /// Fraction of the volume still free, for the low-space highlight.
    /// A volume with zero reported capacity counts as not-low.
    pub fn free_ratio(&self) -> f32 {
        if self.total_bytes == 0 {
            return 1.0;
        }

        narrow(self.free_bytes) / self.total_bytes as f32
    }
}

/// Insertion-ordered set of tracked volumes, ascending letters. Built once
/// at startup; readers only ever see cloned snapshots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VolumeCollection {
    pub volumes: Vec<VolumeRecord>,
}

impl VolumeCollection {
    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VolumeRecord> {
        self.volumes.iter()
    }
}
