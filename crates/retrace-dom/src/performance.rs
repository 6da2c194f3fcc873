//! Performance timeline: navigation marks and resource fetch entries.

use retrace_protocols::{NavigationTiming, ResourceTimingEntry};

/// The page's performance timeline, populated by the host as loads progress.
///
/// Entries accumulate append-only; an entry with `response_end == 0` is
/// still in flight. The performance plugin polls by index, so truncation
/// is an observable state error, not a silent reset.
#[derive(Debug, Default)]
pub struct PerformanceTimeline {
    navigation: Option<NavigationTiming>,
    resources: Vec<ResourceTimingEntry>,
}

impl PerformanceTimeline {
    pub fn set_navigation(&mut self, timing: NavigationTiming) {
        self.navigation = Some(timing);
    }

    pub fn navigation(&self) -> Option<&NavigationTiming> {
        self.navigation.as_ref()
    }

    pub fn push_resource(&mut self, entry: ResourceTimingEntry) {
        self.resources.push(entry);
    }

    /// Mark a pending entry complete.
    pub fn complete_resource(&mut self, name: &str, response_end: f64) {
        if let Some(entry) = self
            .resources
            .iter_mut()
            .find(|e| e.name == name && e.response_end == 0.0)
        {
            entry.response_end = response_end;
        }
    }

    pub fn resources(&self) -> &[ResourceTimingEntry] {
        &self.resources
    }

    /// Drop all entries, as `clearResourceTimings` would.
    pub fn clear_resources(&mut self) {
        self.resources.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, response_end: f64) -> ResourceTimingEntry {
        ResourceTimingEntry {
            name: name.to_string(),
            start_time: 1.0,
            response_end,
            initiator: None,
        }
    }

    #[test]
    fn resources_accumulate() {
        let mut timeline = PerformanceTimeline::default();
        timeline.push_resource(entry("/a.css", 2.0));
        timeline.push_resource(entry("/b.js", 0.0));
        assert_eq!(timeline.resources().len(), 2);

        timeline.complete_resource("/b.js", 9.0);
        assert_eq!(timeline.resources()[1].response_end, 9.0);
    }

    #[test]
    fn clear_empties_the_timeline() {
        let mut timeline = PerformanceTimeline::default();
        timeline.push_resource(entry("/a.css", 2.0));
        timeline.clear_resources();
        assert!(timeline.resources().is_empty());
    }
}
