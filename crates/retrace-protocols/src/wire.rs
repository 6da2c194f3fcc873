//! Positional-array projection of events.
//!
//! Each event is either a structured object or its array projection
//! `[id, origin, type, time, data]`, with `data` itself array-projected.
//! The projection is bijective: `from_wire(to_wire(e)) == e`.

use serde_json::{json, Value};
use thiserror::Error;

use crate::event::{
    AgentEvent, EventData, EventOrigin, EventType, PointerKind, PointerState, ViewportState,
};
use crate::instrument::{Instrumentation, InstrumentationKind};
use crate::layout::{LayoutAction, LayoutData, LayoutSource, LayoutState, ScrollPosition};

/// Failure to reconstruct an event from its array projection.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("expected array of length {expected}, got {got}")]
    Shape { expected: usize, got: usize },

    #[error("unknown {field} code: {code}")]
    UnknownCode { field: &'static str, code: i64 },

    #[error("field {0} has the wrong type")]
    FieldType(&'static str),

    #[error("instrumentation payload: {0}")]
    Payload(#[from] serde_json::Error),
}

fn origin_code(origin: EventOrigin) -> i64 {
    match origin {
        EventOrigin::Layout => 0,
        EventOrigin::Pointer => 1,
        EventOrigin::Viewport => 2,
        EventOrigin::Performance => 3,
        EventOrigin::Instrumentation => 4,
    }
}

fn origin_from(code: i64) -> Result<EventOrigin, WireError> {
    Ok(match code {
        0 => EventOrigin::Layout,
        1 => EventOrigin::Pointer,
        2 => EventOrigin::Viewport,
        3 => EventOrigin::Performance,
        4 => EventOrigin::Instrumentation,
        code => return Err(WireError::UnknownCode { field: "origin", code }),
    })
}

fn type_code(event_type: EventType) -> i64 {
    match event_type {
        EventType::Layout => 0,
        EventType::Pointer => 1,
        EventType::Viewport => 2,
        EventType::Instrumentation => 3,
    }
}

fn type_from(code: i64) -> Result<EventType, WireError> {
    Ok(match code {
        0 => EventType::Layout,
        1 => EventType::Pointer,
        2 => EventType::Viewport,
        3 => EventType::Instrumentation,
        code => return Err(WireError::UnknownCode { field: "type", code }),
    })
}

fn source_code(source: LayoutSource) -> i64 {
    match source {
        LayoutSource::Discover => 0,
        LayoutSource::Mutation => 1,
        LayoutSource::Scroll => 2,
        LayoutSource::Input => 3,
    }
}

fn source_from(code: i64) -> Result<LayoutSource, WireError> {
    Ok(match code {
        0 => LayoutSource::Discover,
        1 => LayoutSource::Mutation,
        2 => LayoutSource::Scroll,
        3 => LayoutSource::Input,
        code => return Err(WireError::UnknownCode { field: "source", code }),
    })
}

fn action_code(action: LayoutAction) -> i64 {
    match action {
        LayoutAction::Insert => 0,
        LayoutAction::Update => 1,
        LayoutAction::Move => 2,
        LayoutAction::Remove => 3,
    }
}

fn action_from(code: i64) -> Result<LayoutAction, WireError> {
    Ok(match code {
        0 => LayoutAction::Insert,
        1 => LayoutAction::Update,
        2 => LayoutAction::Move,
        3 => LayoutAction::Remove,
        code => return Err(WireError::UnknownCode { field: "action", code }),
    })
}

fn pointer_code(kind: PointerKind) -> i64 {
    match kind {
        PointerKind::Move => 0,
        PointerKind::Down => 1,
        PointerKind::Up => 2,
        PointerKind::Click => 3,
    }
}

fn pointer_from(code: i64) -> Result<PointerKind, WireError> {
    Ok(match code {
        0 => PointerKind::Move,
        1 => PointerKind::Down,
        2 => PointerKind::Up,
        3 => PointerKind::Click,
        code => return Err(WireError::UnknownCode { field: "pointer", code }),
    })
}

fn instrumentation_code(kind: InstrumentationKind) -> i64 {
    match kind {
        InstrumentationKind::JsError => 0,
        InstrumentationKind::XhrError => 1,
        InstrumentationKind::ShadowDomInconsistent => 2,
        InstrumentationKind::AgentDuplicated => 3,
        InstrumentationKind::PerformanceStateError => 4,
        InstrumentationKind::NavigationTiming => 5,
        InstrumentationKind::ResourceTiming => 6,
    }
}

fn opt_i64(value: Option<i64>) -> Value {
    value.map(Value::from).unwrap_or(Value::Null)
}

fn layout_data_to_wire(layout: &LayoutData) -> Value {
    match layout {
        LayoutData::Box {
            x,
            y,
            width,
            height,
            scroll,
        } => {
            let (sx, sy) = match scroll {
                Some(ScrollPosition { x, y }) => (json!(x), json!(y)),
                None => (Value::Null, Value::Null),
            };
            json!([0, x, y, width, height, sx, sy])
        }
        LayoutData::Text { content } => json!([1, content]),
        LayoutData::Ignored => json!([2]),
    }
}

fn layout_state_to_wire(state: &LayoutState) -> Value {
    json!([
        state.index,
        opt_i64(state.parent),
        opt_i64(state.previous),
        opt_i64(state.next),
        source_code(state.source),
        action_code(state.action),
        state.tag,
        state.attributes,
        layout_data_to_wire(&state.layout),
        state.mutation_sequence.map(Value::from).unwrap_or(Value::Null),
    ])
}

/// Project an event onto its wire array.
pub fn to_wire(event: &AgentEvent) -> Value {
    let data = match &event.data {
        EventData::Layout(state) => layout_state_to_wire(state),
        EventData::Pointer(PointerState { kind, x, y, buttons }) => {
            json!([pointer_code(*kind), x, y, buttons])
        }
        EventData::Viewport(state) => match state {
            ViewportState::Resize {
                width,
                height,
                device_pixel_ratio,
            } => json!([0, width, height, device_pixel_ratio]),
            ViewportState::Scroll { x, y } => json!([1, x, y]),
            ViewportState::Visibility { visible } => json!([2, visible]),
        },
        EventData::Instrumentation(record) => {
            // The payload keeps its tagged-object form; whole index trees
            // ride inside inconsistency reports.
            json!([
                instrumentation_code(record.kind()),
                serde_json::to_value(record).expect("instrumentation serializes"),
            ])
        }
    };
    json!([
        event.id,
        origin_code(event.origin),
        type_code(event.event_type),
        event.time,
        data,
    ])
}

fn as_array<'a>(value: &'a Value, expected: usize) -> Result<&'a [Value], WireError> {
    let items = value.as_array().ok_or(WireError::FieldType("array"))?;
    if items.len() != expected {
        return Err(WireError::Shape {
            expected,
            got: items.len(),
        });
    }
    Ok(items)
}

fn get_i64(value: &Value, field: &'static str) -> Result<i64, WireError> {
    value.as_i64().ok_or(WireError::FieldType(field))
}

fn get_f64(value: &Value, field: &'static str) -> Result<f64, WireError> {
    value.as_f64().ok_or(WireError::FieldType(field))
}

fn get_str(value: &Value, field: &'static str) -> Result<String, WireError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or(WireError::FieldType(field))
}

fn get_opt_i64(value: &Value, field: &'static str) -> Result<Option<i64>, WireError> {
    if value.is_null() {
        Ok(None)
    } else {
        get_i64(value, field).map(Some)
    }
}

fn layout_data_from_wire(value: &Value) -> Result<LayoutData, WireError> {
    let items = value.as_array().ok_or(WireError::FieldType("layout"))?;
    let code = get_i64(items.first().unwrap_or(&Value::Null), "layout kind")?;
    match code {
        0 => {
            let items = as_array(value, 7)?;
            let scroll = if items[5].is_null() {
                None
            } else {
                Some(ScrollPosition {
                    x: get_f64(&items[5], "scroll x")?,
                    y: get_f64(&items[6], "scroll y")?,
                })
            };
            Ok(LayoutData::Box {
                x: get_f64(&items[1], "x")?,
                y: get_f64(&items[2], "y")?,
                width: get_f64(&items[3], "width")?,
                height: get_f64(&items[4], "height")?,
                scroll,
            })
        }
        1 => {
            let items = as_array(value, 2)?;
            Ok(LayoutData::Text {
                content: get_str(&items[1], "content")?,
            })
        }
        2 => Ok(LayoutData::Ignored),
        code => Err(WireError::UnknownCode { field: "layout", code }),
    }
}

fn layout_state_from_wire(value: &Value) -> Result<LayoutState, WireError> {
    let items = as_array(value, 10)?;
    Ok(LayoutState {
        index: get_i64(&items[0], "index")?,
        parent: get_opt_i64(&items[1], "parent")?,
        previous: get_opt_i64(&items[2], "previous")?,
        next: get_opt_i64(&items[3], "next")?,
        source: source_from(get_i64(&items[4], "source")?)?,
        action: action_from(get_i64(&items[5], "action")?)?,
        tag: get_str(&items[6], "tag")?,
        attributes: serde_json::from_value(items[7].clone())?,
        layout: layout_data_from_wire(&items[8])?,
        mutation_sequence: if items[9].is_null() {
            None
        } else {
            Some(get_i64(&items[9], "mutation_sequence")? as u64)
        },
    })
}

/// Reconstruct an event from its wire array.
pub fn from_wire(value: &Value) -> Result<AgentEvent, WireError> {
    let items = as_array(value, 5)?;
    let id = get_i64(&items[0], "id")? as u64;
    let origin = origin_from(get_i64(&items[1], "origin")?)?;
    let event_type = type_from(get_i64(&items[2], "type")?)?;
    let time = get_f64(&items[3], "time")?;

    let data = match event_type {
        EventType::Layout => EventData::Layout(layout_state_from_wire(&items[4])?),
        EventType::Pointer => {
            let fields = as_array(&items[4], 4)?;
            EventData::Pointer(PointerState {
                kind: pointer_from(get_i64(&fields[0], "pointer kind")?)?,
                x: get_f64(&fields[1], "x")?,
                y: get_f64(&fields[2], "y")?,
                buttons: get_i64(&fields[3], "buttons")? as u8,
            })
        }
        EventType::Viewport => {
            let fields = items[4].as_array().ok_or(WireError::FieldType("viewport"))?;
            let code = get_i64(fields.first().unwrap_or(&Value::Null), "viewport kind")?;
            EventData::Viewport(match code {
                0 => {
                    let fields = as_array(&items[4], 4)?;
                    ViewportState::Resize {
                        width: get_i64(&fields[1], "width")? as u32,
                        height: get_i64(&fields[2], "height")? as u32,
                        device_pixel_ratio: get_f64(&fields[3], "device_pixel_ratio")?,
                    }
                }
                1 => {
                    let fields = as_array(&items[4], 3)?;
                    ViewportState::Scroll {
                        x: get_f64(&fields[1], "x")?,
                        y: get_f64(&fields[2], "y")?,
                    }
                }
                2 => {
                    let fields = as_array(&items[4], 2)?;
                    ViewportState::Visibility {
                        visible: fields[1].as_bool().ok_or(WireError::FieldType("visible"))?,
                    }
                }
                code => return Err(WireError::UnknownCode { field: "viewport", code }),
            })
        }
        EventType::Instrumentation => {
            let fields = as_array(&items[4], 2)?;
            let record: Instrumentation = serde_json::from_value(fields[1].clone())?;
            let code = get_i64(&fields[0], "instrumentation kind")?;
            if code != instrumentation_code(record.kind()) {
                return Err(WireError::UnknownCode {
                    field: "instrumentation",
                    code,
                });
            }
            EventData::Instrumentation(record)
        }
    };

    Ok(AgentEvent {
        id,
        origin,
        event_type,
        time,
        data,
    })
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
