//! Listener registry and queued event dispatch.

use crate::node::NodeId;

/// Handle to a registered listener; recorded by the pipeline so teardown
/// can unbind en masse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// Page event kinds the agent can listen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomEventKind {
    Scroll,
    Input,
    Change,
    Error,
    PointerMove,
    PointerDown,
    PointerUp,
    Click,
    Resize,
    VisibilityChange,
}

/// Payload of a captured page error.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorDetail {
    pub message: String,
    pub source: String,
    pub line: u32,
    pub column: u32,
}

/// Payload of a pointer event, in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerDetail {
    pub x: f64,
    pub y: f64,
    pub buttons: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventDetail {
    None,
    Error(ErrorDetail),
    Pointer(PointerDetail),
}

/// A dispatched page event, queued until the host pumps the session.
#[derive(Debug, Clone)]
pub struct DomEvent {
    pub target: NodeId,
    pub kind: DomEventKind,
    pub detail: EventDetail,
}

#[derive(Debug)]
pub(crate) struct Listener {
    pub(crate) id: ListenerId,
    pub(crate) target: NodeId,
    pub(crate) kind: DomEventKind,
    pub(crate) owner: String,
}
