//! Human-readable byte formatting.

use std::fmt;

const KIB: u64 = 1024;
const MIB: u64 = KIB * KIB;
const GIB: u64 = KIB * MIB;

/// Significant bits retained when narrowing a `u64` to `f32`.
const SIGNIFICANT_BITS: u32 = 31;

/// Narrows a 64-bit magnitude to `f32` without trusting the default
/// truncating cast.
///
/// Values wider than the significant-bit budget are rounded on the retained
/// integer first: the bits below the cutoff are zeroed, and the smallest
/// retained bit's weight is added iff the discarded remainder strictly
/// exceeds half that weight. An exact tie rounds down.
pub fn narrow(value: u64) -> f32 {
    if value == 0 {
        return 0.0;
    }

    let highest = 63 - value.leading_zeros();

    // Few enough significant bits: a direct cast is exact.
    if highest < SIGNIFICANT_BITS {
        return (value & !1) as f32;
    }

    let cutoff = highest - SIGNIFICANT_BITS;
    let weight = 1u64 << cutoff;
    let remainder = value & (weight - 1);

    let mut kept = value & !(weight - 1);
    if remainder > weight / 2 {
        kept += weight;
    }

    kept as f32
}

/// A magnitude scaled to a human unit, two decimals on display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Humanized {
    pub value: f32,
    pub unit: &'static str,
}

impl fmt::Display for Humanized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.value, self.unit)
    }
}

/// Scales a raw magnitude into the largest fitting 1024-based unit.
///
/// The unit is chosen on the raw integer; the division is applied to the
/// narrowed float so the displayed value carries the rounding of [`narrow`].
pub fn humanize(magnitude: u64) -> Humanized {
    let scaled = narrow(magnitude);

    if magnitude >= GIB {
        Humanized {
            value: scaled / GIB as f32,
            unit: "GB",
        }
    } else if magnitude >= MIB {
        Humanized {
            value: scaled / MIB as f32,
            unit: "MB",
        }
    } else if magnitude >= KIB {
        Humanized {
            value: scaled / KIB as f32,
            unit: "KB",
        }
    } else {
        Humanized {
            value: scaled,
            unit: "K",
        }
    }
}
