//! # diskhud core
//!
//! Volume sampling for the heads-up readout. Enumerates the host's storage
//! volumes once at startup, then refreshes free/used/total capacity on a
//! fixed interval from a background task and publishes immutable snapshots
//! to whoever wants to paint them.
//!
//! The OS is reached only through the [`CapacityProbe`] seam, so everything
//! above it can be driven by a scripted probe in tests.

pub mod probe;
pub mod sampler;
pub mod scheduler;
pub mod units;
pub mod volume;

pub use probe::{CapacityProbe, CapacityReading, ProbeError, SystemProbe};
pub use sampler::VolumeSampler;
pub use units::{humanize, Humanized};
pub use volume::{VolumeCollection, VolumeRecord};
