//! Event model: stamped, sequenced records flowing to the batcher.

use serde::{Deserialize, Serialize};

use crate::instrument::Instrumentation;
use crate::layout::LayoutState;

/// Identity of the plugin an event originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventOrigin {
    Layout,
    Pointer,
    Viewport,
    Performance,
    Instrumentation,
}

/// Discriminant of the event payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Layout,
    Pointer,
    Viewport,
    Instrumentation,
}

/// Pointer interaction kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    Move,
    Down,
    Up,
    Click,
}

/// A pointer interaction in viewport coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerState {
    pub kind: PointerKind,
    pub x: f64,
    pub y: f64,
    pub buttons: u8,
}

/// A viewport change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewportState {
    Resize {
        width: u32,
        height: u32,
        device_pixel_ratio: f64,
    },
    Scroll {
        x: f64,
        y: f64,
    },
    Visibility {
        visible: bool,
    },
}

/// Typed event payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "state", rename_all = "snake_case")]
pub enum EventData {
    Layout(LayoutState),
    Pointer(PointerState),
    Viewport(ViewportState),
    Instrumentation(Instrumentation),
}

impl EventData {
    pub fn event_type(&self) -> EventType {
        match self {
            EventData::Layout(_) => EventType::Layout,
            EventData::Pointer(_) => EventType::Pointer,
            EventData::Viewport(_) => EventType::Viewport,
            EventData::Instrumentation(_) => EventType::Instrumentation,
        }
    }
}

/// A plugin-produced event before the pipeline stamps it.
///
/// The pipeline fills in the id, the origin, and - when `time` is unset -
/// the wall-clock timestamp.
#[derive(Debug, Clone)]
pub struct PartialEvent {
    pub time: Option<f64>,
    pub data: EventData,
}

impl PartialEvent {
    pub fn new(data: EventData) -> Self {
        Self { time: None, data }
    }

    pub fn at(time: f64, data: EventData) -> Self {
        Self {
            time: Some(time),
            data,
        }
    }
}

/// A completed event as it travels to the batcher and onto the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentEvent {
    /// Monotonically increasing per session; contiguous across a batch of
    /// `add_events`.
    pub id: u64,
    pub origin: EventOrigin,
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Wall-clock milliseconds.
    pub time: f64,
    pub data: EventData,
}

impl AgentEvent {
    /// True when this event is a lone-upload-failure diagnostic; the batcher
    /// refuses to ship a batch containing exactly one of these.
    pub fn is_xhr_error(&self) -> bool {
        matches!(
            self.data,
            EventData::Instrumentation(Instrumentation::XhrError { .. })
        )
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
