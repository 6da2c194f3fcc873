//! # Retrace Tracker
//!
//! The layout tracker plugin: discovers the live document into the shadow
//! mirror, upgrades placeholder layouts through time-sliced backfill,
//! ingests mutation batches, emits ordered layout events, and watches
//! scrollable elements and form controls for follow-up state.
//!
//! The tracker is the one component that drives a continuous feedback loop
//! between the live DOM and its shadow: every batch it applies is
//! re-checked against the live tree, and two consecutive divergences put
//! it into degraded mode, where mutations are still received but no
//! longer applied.

mod discover;
mod snapshot;
mod tracker;
mod watch;

#[cfg(test)]
pub(crate) mod testutil;

pub use snapshot::SnapshotPolicy;
pub use tracker::LayoutTracker;
