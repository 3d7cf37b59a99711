//! Single-line readout formatting.

use std::io::{self, Write};

use diskhud_core::{humanize, VolumeCollection};

/// Free space below this fraction paints the value red.
const LOW_SPACE_RATIO: f32 = 0.05;

const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Plain readout, no colors: `C: 123.45 GB  D: 1.00 MB`.
pub fn readout(volumes: &VolumeCollection) -> String {
    if volumes.is_empty() {
        return "(no volumes)".to_string();
    }

    volumes
        .iter()
        .map(|v| format!("{}: {}", v.letter, humanize(v.free_bytes)))
        .collect::<Vec<_>>()
        .join("  ")
}

/// Repaints the readout in place on the current terminal line, dimming the
/// volume labels and flagging low free space in red.
pub fn paint(volumes: &VolumeCollection) {
    let mut line = String::new();

    if volumes.is_empty() {
        line.push_str("(no volumes)");
    } else {
        for (i, volume) in volumes.iter().enumerate() {
            if i > 0 {
                line.push_str("  ");
            }

            let color = if volume.free_ratio() < LOW_SPACE_RATIO {
                RED
            } else {
                RESET
            };

            line.push_str(&format!(
                "{DIM}{}:{RESET} {color}{}{RESET}",
                volume.letter,
                humanize(volume.free_bytes)
            ));
        }
    }

    // \x1b[K clears leftovers when the new line is shorter.
    print!("\r{line}\x1b[K");
    let _ = io::stdout().flush();
}
