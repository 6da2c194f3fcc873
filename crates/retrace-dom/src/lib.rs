//! # Retrace DOM
//!
//! The live page model the agent observes: an arena document with mutation
//! journaling, a listener registry with queued event dispatch, viewport
//! state, and a performance timeline.
//!
//! This crate is the browser seam. The embedding host (or a test) owns a
//! [`PageHandle`] and drives it; the agent only ever observes through
//! mutation observers, listeners, and read accessors. The one write the
//! tracking side performs against live nodes is the out-of-band index
//! annotation, and that lives in the mirror's side-table, not here.

mod document;
mod geometry;
mod listener;
mod node;
mod observer;
mod page;
mod performance;

pub use document::Document;
pub use geometry::{BoundingBox, ScrollOffsets, Viewport};
pub use listener::{DomEvent, DomEventKind, ErrorDetail, EventDetail, ListenerId, PointerDetail};
pub use node::{Node, NodeId, NodeKind};
pub use observer::{MutationKind, MutationRecord, ObserverId};
pub use page::PageHandle;
pub use performance::PerformanceTimeline;
