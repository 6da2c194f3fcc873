//! Instrumentation records: diagnostics that ride the normal event pipeline.
//!
//! No component raises recoverable failures to a caller; every anomaly
//! becomes one of these records and flows to the collector like any other
//! event.

use serde::{Deserialize, Serialize};

use crate::layout::IndexTree;

/// The closed set of instrumentation kinds referenced by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentationKind {
    JsError,
    XhrError,
    ShadowDomInconsistent,
    AgentDuplicated,
    PerformanceStateError,
    NavigationTiming,
    ResourceTiming,
}

/// Which routine last touched the shadow tree before a consistency check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutineKind {
    Discover,
    Mutation,
}

/// Descriptor of the last routine run before a consistency check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineDescriptor {
    pub kind: RoutineKind,
    /// Mutation sequence, when `kind` is `Mutation`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u64>,
    /// Number of records in the batch, when `kind` is `Mutation`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
}

impl RoutineDescriptor {
    pub fn discover() -> Self {
        Self {
            kind: RoutineKind::Discover,
            sequence: None,
            batch_size: None,
        }
    }

    pub fn mutation(sequence: u64, batch_size: usize) -> Self {
        Self {
            kind: RoutineKind::Mutation,
            sequence: Some(sequence),
            batch_size: Some(batch_size),
        }
    }
}

/// Diagnosis of a shadow/live divergence.
///
/// The second consecutive report carries the first in `first`, so the
/// collector sees the full picture even after the tracker degrades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadowDomInconsistency {
    /// Index tree built by traversing the live document.
    pub dom: IndexTree,
    /// Index tree built by traversing the shadow.
    pub shadow: IndexTree,
    /// The last tree the two sides agreed on, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_consistent: Option<IndexTree>,
    pub last_routine: RoutineDescriptor,
    /// The previous consecutive inconsistency, attached to the second report.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first: Option<Box<ShadowDomInconsistency>>,
}

/// Navigation timing marks, milliseconds from navigation start.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationTiming {
    pub fetch_start: f64,
    pub dom_interactive: f64,
    pub dom_content_loaded: f64,
    pub load_event_end: f64,
}

/// One completed resource fetch from the performance timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceTimingEntry {
    pub name: String,
    pub start_time: f64,
    pub response_end: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initiator: Option<String>,
}

/// An instrumentation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Instrumentation {
    JsError {
        message: String,
        source: String,
        line: u32,
        column: u32,
    },
    XhrError {
        status: u16,
        sequence_number: u64,
    },
    ShadowDomInconsistent(ShadowDomInconsistency),
    AgentDuplicated {
        impression_id: String,
    },
    PerformanceStateError {
        message: String,
    },
    NavigationTiming(NavigationTiming),
    ResourceTiming {
        entries: Vec<ResourceTimingEntry>,
    },
}

impl Instrumentation {
    pub fn kind(&self) -> InstrumentationKind {
        match self {
            Instrumentation::JsError { .. } => InstrumentationKind::JsError,
            Instrumentation::XhrError { .. } => InstrumentationKind::XhrError,
            Instrumentation::ShadowDomInconsistent(_) => {
                InstrumentationKind::ShadowDomInconsistent
            }
            Instrumentation::AgentDuplicated { .. } => InstrumentationKind::AgentDuplicated,
            Instrumentation::PerformanceStateError { .. } => {
                InstrumentationKind::PerformanceStateError
            }
            Instrumentation::NavigationTiming(_) => InstrumentationKind::NavigationTiming,
            Instrumentation::ResourceTiming { .. } => InstrumentationKind::ResourceTiming,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        let record = Instrumentation::JsError {
            message: "boom".to_string(),
            source: "f.js".to_string(),
            line: 1,
            column: 2,
        };
        assert_eq!(record.kind(), InstrumentationKind::JsError);

        let record = Instrumentation::XhrError {
            status: 500,
            sequence_number: 3,
        };
        assert_eq!(record.kind(), InstrumentationKind::XhrError);
    }

    #[test]
    fn routine_descriptors() {
        let discover = RoutineDescriptor::discover();
        assert_eq!(discover.kind, RoutineKind::Discover);
        assert!(discover.sequence.is_none());

        let mutation = RoutineDescriptor::mutation(4, 12);
        assert_eq!(mutation.kind, RoutineKind::Mutation);
        assert_eq!(mutation.sequence, Some(4));
        assert_eq!(mutation.batch_size, Some(12));
    }

    #[test]
    fn inconsistency_round_trips() {
        let report = ShadowDomInconsistency {
            dom: IndexTree::with_children(0, vec![IndexTree::leaf(1)]),
            shadow: IndexTree::leaf(0),
            last_consistent: Some(IndexTree::leaf(0)),
            last_routine: RoutineDescriptor::mutation(2, 1),
            first: None,
        };
        let json = serde_json::to_string(&report).unwrap();
        let back: ShadowDomInconsistency = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn second_report_carries_first() {
        let first = ShadowDomInconsistency {
            dom: IndexTree::leaf(0),
            shadow: IndexTree::leaf(0),
            last_consistent: None,
            last_routine: RoutineDescriptor::discover(),
            first: None,
        };
        let second = ShadowDomInconsistency {
            first: Some(Box::new(first.clone())),
            ..first.clone()
        };
        let json = serde_json::to_value(&second).unwrap();
        assert!(json.get("first").is_some());
    }
}
