//! # Retrace Protocols
//!
//! Core type definitions for the retrace session-replay engine.
//! Contains only data types and wire contracts - no implementations.
//!
//! ## Core Types
//!
//! - [`AgentEvent`] - A stamped, sequenced event flowing to the batcher
//! - [`LayoutState`] - A structured snapshot of one node at one instant
//! - [`Instrumentation`] - Diagnostic records riding the normal pipeline
//! - [`Envelope`] / [`UploadPayload`] - Batch framing for the collector
//! - [`wire`] - The positional-array projection of events

pub mod envelope;
pub mod error;
pub mod event;
pub mod instrument;
pub mod layout;
pub mod wire;

pub use envelope::{
    BatcherMessage, CompressedBatch, Envelope, SessionMetadata, UploadPayload,
};
pub use event::{
    AgentEvent, EventData, EventOrigin, EventType, PartialEvent, PointerKind, PointerState,
    ViewportState,
};
pub use instrument::{
    Instrumentation, InstrumentationKind, NavigationTiming, ResourceTimingEntry,
    RoutineDescriptor, RoutineKind, ShadowDomInconsistency,
};
pub use layout::{IndexTree, LayoutAction, LayoutData, LayoutSource, LayoutState, ScrollPosition};
pub use error::{AgentError, BatchError, PluginError, UploadError};
pub use wire::{from_wire, to_wire, WireError};
