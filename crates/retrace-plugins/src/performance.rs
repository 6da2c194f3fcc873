//! Performance timeline polling.

use tracing::debug;

use retrace_core::{Plugin, PluginContext};
use retrace_protocols::{EventOrigin, Instrumentation, PluginError};

/// Polls the page's performance timeline once per pump.
///
/// Navigation timing ships once, after the load event completes. Resource
/// entries ship in poll-sized groups: one `ResourceTiming` event carries
/// every entry that finished since the last poll. Entries are consumed in
/// timeline order, so an in-flight entry holds back the ones behind it
/// until it completes. A timeline that shrinks underneath the cursor is a
/// state error, reported and re-synced.
pub struct PerformancePlugin {
    cursor: usize,
    navigation_sent: bool,
}

impl PerformancePlugin {
    pub fn new() -> Self {
        Self {
            cursor: 0,
            navigation_sent: false,
        }
    }
}

impl Default for PerformancePlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for PerformancePlugin {
    fn name(&self) -> &'static str {
        "performance"
    }

    fn origin(&self) -> EventOrigin {
        EventOrigin::Performance
    }

    fn reset(&mut self) {
        self.cursor = 0;
        self.navigation_sent = false;
    }

    fn activate(&mut self, _ctx: &PluginContext) -> Result<(), PluginError> {
        Ok(())
    }

    fn teardown(&mut self, _ctx: &PluginContext) -> Result<(), PluginError> {
        Ok(())
    }

    fn tick(&mut self, ctx: &PluginContext) {
        let (navigation, fresh, state_error) = {
            let doc = ctx.page.lock();
            let timeline = doc.performance();

            let navigation = if !self.navigation_sent {
                timeline
                    .navigation()
                    .filter(|n| n.load_event_end > 0.0)
                    .cloned()
            } else {
                None
            };

            let resources = timeline.resources();
            if resources.len() < self.cursor {
                self.cursor = resources.len();
                (navigation, Vec::new(), true)
            } else {
                let mut fresh = Vec::new();
                while self.cursor < resources.len() {
                    let entry = &resources[self.cursor];
                    if entry.response_end <= 0.0 {
                        break;
                    }
                    fresh.push(entry.clone());
                    self.cursor += 1;
                }
                (navigation, fresh, false)
            }
        };

        if let Some(navigation) = navigation {
            self.navigation_sent = true;
            ctx.pipeline
                .instrument(Instrumentation::NavigationTiming(navigation));
        }
        if state_error {
            ctx.pipeline
                .instrument(Instrumentation::PerformanceStateError {
                    message: "resource timeline shrank below the poll cursor".to_string(),
                });
            return;
        }
        if !fresh.is_empty() {
            debug!(entries = fresh.len(), "resource timings collected");
            ctx.pipeline
                .instrument(Instrumentation::ResourceTiming { entries: fresh });
        }
    }
}

#[cfg(test)]
#[path = "performance_tests.rs"]
mod tests;
