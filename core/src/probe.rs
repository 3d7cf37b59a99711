//! Capacity probe seam between the sampler and the operating system.

use std::path::{Path, PathBuf};

use sysinfo::Disks;
use thiserror::Error;
use tracing::warn;

/// One volume's capacity triple, taken from a single OS query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityReading {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("volume {0}: not reported by the operating system")]
    Missing(char),
}

/// How the sampler reaches the OS. Implemented by [`SystemProbe`] for real
/// hosts and by scripted probes in tests.
pub trait CapacityProbe {
    /// Bitmask of available volumes; bit `i` maps to letter `'A' + i`.
    /// Read once at startup.
    fn available(&mut self) -> u32;

    /// Fresh capacity triple for one volume.
    fn query(&mut self, letter: char) -> Result<CapacityReading, ProbeError>;
}

/// Real probe backed by the host's disk list.
///
/// Mount points that already look like drive letters (`C:\`) claim their own
/// bit. Every other mount point is assigned the lowest free letter in sorted
/// mount-point order, so the readout also works on hosts that name volumes
/// by path.
pub struct SystemProbe {
    disks: Disks,
    mounts: Vec<(char, PathBuf)>,
}

impl SystemProbe {
    pub fn new() -> Self {
        let disks = Disks::new_with_refreshed_list();
        let mounts = assign_letters(
            disks
                .list()
                .iter()
                .map(|d| d.mount_point().to_path_buf())
                .collect(),
        );

        Self { disks, mounts }
    }
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl CapacityProbe for SystemProbe {
    fn available(&mut self) -> u32 {
        let mut mask = 0u32;
        for (letter, _) in &self.mounts {
            mask |= 1 << (*letter as u8 - b'A');
        }
        mask
    }

    fn query(&mut self, letter: char) -> Result<CapacityReading, ProbeError> {
        let mount = self
            .mounts
            .iter()
            .find(|(l, _)| *l == letter)
            .map(|(_, m)| m.clone())
            .ok_or(ProbeError::Missing(letter))?;

        self.disks.refresh();

        let disk = self
            .disks
            .list()
            .iter()
            .find(|d| d.mount_point() == mount)
            .ok_or(ProbeError::Missing(letter))?;

        let total = disk.total_space();
        let free = disk.available_space();

        Ok(CapacityReading {
            total_bytes: total,
            used_bytes: total.saturating_sub(free),
            free_bytes: free,
        })
    }
}

/// Assigns one letter per mount point, ascending.
fn assign_letters(mut mount_points: Vec<PathBuf>) -> Vec<(char, PathBuf)> {
    mount_points.sort();
    mount_points.dedup();

    let mut taken = 0u32;
    let mut assigned = Vec::new();
    let mut unnamed = Vec::new();

    for mount in mount_points {
        match drive_letter(&mount) {
            Some(letter) if taken & (1 << (letter as u8 - b'A')) == 0 => {
                taken |= 1 << (letter as u8 - b'A');
                assigned.push((letter, mount));
            }
            _ => unnamed.push(mount),
        }
    }

    for mount in unnamed {
        match ('A'..='Z').find(|l| taken & (1 << (*l as u8 - b'A')) == 0) {
            Some(letter) => {
                taken |= 1 << (letter as u8 - b'A');
                assigned.push((letter, mount));
            }
            None => {
                warn!("more than 26 mount points; ignoring {}", mount.display());
            }
        }
    }

    assigned.sort_by_key(|(letter, _)| *letter);
    assigned
}

/// `C:\` style mount points carry their own letter.
fn drive_letter(mount: &Path) -> Option<char> {
    let text = mount.to_string_lossy();
    let mut chars = text.chars();
    let first = chars.next()?;

    if first.is_ascii_alphabetic() && chars.next() == Some(':') {
        Some(first.to_ascii_uppercase())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drive_letter_parses_windows_mounts() {
        assert_eq!(drive_letter(Path::new("C:\\")), Some('C'));
        assert_eq!(drive_letter(Path::new("d:\\")), Some('D'));
        assert_eq!(drive_letter(Path::new("/")), None);
        assert_eq!(drive_letter(Path::new("/mnt/data")), None);
    }

    #[test]
    fn lettered_mounts_keep_their_letter() {
        let assigned = assign_letters(vec![PathBuf::from("D:\\"), PathBuf::from("C:\\")]);
        let letters: Vec<char> = assigned.iter().map(|(l, _)| *l).collect();
        assert_eq!(letters, vec!['C', 'D']);
    }

    #[test]
    fn unnamed_mounts_take_lowest_free_letters_in_sorted_order() {
        let assigned = assign_letters(vec![
            PathBuf::from("/home"),
            PathBuf::from("/"),
            PathBuf::from("/mnt/data"),
        ]);

        assert_eq!(assigned[0], ('A', PathBuf::from("/")));
        assert_eq!(assigned[1], ('B', PathBuf::from("/home")));
        assert_eq!(assigned[2], ('C', PathBuf::from("/mnt/data")));
    }

    #[test]
    fn mixed_mounts_skip_claimed_letters() {
        let assigned = assign_letters(vec![PathBuf::from("A:\\"), PathBuf::from("/data")]);

        assert_eq!(assigned[0], ('A', PathBuf::from("A:\\")));
        assert_eq!(assigned[1], ('B', PathBuf::from("/data")));
    }
}
