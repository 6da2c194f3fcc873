use std::sync::Arc;

use parking_lot::Mutex;

use super::*;
use retrace_dom::{Document, DomEvent, DomEventKind};
use retrace_protocols::{EventData, EventOrigin, PartialEvent, PluginError, ViewportState};

#[derive(Default, Clone)]
struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

struct TestPlugin {
    log: CallLog,
    fail_activation: bool,
}

impl TestPlugin {
    fn new(log: CallLog) -> Self {
        Self {
            log,
            fail_activation: false,
        }
    }
}

impl Plugin for TestPlugin {
    fn name(&self) -> &'static str {
        "test"
    }

    fn origin(&self) -> EventOrigin {
        EventOrigin::Viewport
    }

    fn reset(&mut self) {
        self.log.push("reset");
    }

    fn activate(&mut self, ctx: &PluginContext) -> Result<(), PluginError> {
        self.log.push("activate");
        if self.fail_activation {
            return Err(PluginError::ActivationFailed("wired to fail".to_string()));
        }
        let root = ctx.page.lock().root();
        ctx.pipeline.bind(&ctx.page, root, DomEventKind::Resize, self.name());
        Ok(())
    }

    fn teardown(&mut self, _ctx: &PluginContext) -> Result<(), PluginError> {
        self.log.push("teardown");
        Ok(())
    }

    fn on_dom_event(&mut self, ctx: &PluginContext, event: &DomEvent) {
        self.log.push(format!("event:{:?}", event.kind));
        ctx.pipeline.add_event(
            self.origin(),
            PartialEvent::new(EventData::Viewport(ViewportState::Visibility {
                visible: true,
            })),
        );
    }
}

fn page() -> PageHandle {
    PageHandle::new(Document::new("https://example.test/"))
}

#[tokio::test]
async fn lifecycle_runs_reset_activate_teardown() {
    let log = CallLog::default();
    let mut session =
        Session::new(page(), AgentConfig::default()).with_plugin(TestPlugin::new(log.clone()));

    assert_eq!(session.state(), SessionState::Created);
    session.activate().await.unwrap();
    assert_eq!(session.state(), SessionState::Active);
    assert!(!session.impression_id().is_empty());

    session.stop().await.unwrap();
    assert_eq!(session.state(), SessionState::Stopped);
    assert_eq!(log.entries(), vec!["reset", "activate", "teardown"]);
}

#[tokio::test]
async fn stop_twice_errors_and_teardown_runs_once() {
    let log = CallLog::default();
    let mut session =
        Session::new(page(), AgentConfig::default()).with_plugin(TestPlugin::new(log.clone()));

    session.activate().await.unwrap();
    session.stop().await.unwrap();
    assert!(matches!(session.stop().await, Err(AgentError::NotActive)));
    assert_eq!(
        log.entries().iter().filter(|e| *e == "teardown").count(),
        1
    );
}

#[tokio::test]
async fn second_agent_on_a_page_refuses_and_reports() {
    let page = page();
    let mut first = Session::new(page.clone(), AgentConfig::default());
    first.activate().await.unwrap();

    let mut second = Session::new(page.clone(), AgentConfig::default());
    let result = second.activate().await;
    assert!(matches!(result, Err(AgentError::AlreadyActive)));
    assert_eq!(second.state(), SessionState::Created);

    let batches = second.drain_batches();
    assert_eq!(batches.len(), 1);
    assert!(batches[0].raw.contains("agent_duplicated"));

    first.stop().await.unwrap();
}

#[tokio::test]
async fn page_events_route_to_bound_plugins() {
    let log = CallLog::default();
    let page = page();
    let mut session =
        Session::new(page.clone(), AgentConfig::default()).with_plugin(TestPlugin::new(log.clone()));
    session.activate().await.unwrap();

    // Resize is bound; visibility is not.
    page.lock().set_viewport(800, 600, 1.0);
    page.lock().set_visibility(false);
    session.pump();

    assert_eq!(
        log.entries().last().map(String::as_str),
        Some("event:Resize")
    );

    session.stop().await.unwrap();
    let batches = session.drain_batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].event_count, 1);
}

#[tokio::test]
async fn failed_activation_rolls_back() {
    let log = CallLog::default();
    let page = page();
    let good = TestPlugin::new(log.clone());
    let mut bad = TestPlugin::new(log.clone());
    bad.fail_activation = true;

    let mut session = Session::new(page.clone(), AgentConfig::default())
        .with_plugin(good)
        .with_plugin(bad);

    assert!(session.activate().await.is_err());
    assert_eq!(session.state(), SessionState::Created);
    assert!(!page.lock().agent_active());
    // The successfully activated plugin was torn down again.
    assert_eq!(
        log.entries(),
        vec!["reset", "activate", "reset", "activate", "teardown"]
    );

    // The page is free again for a working session.
    let mut retry = Session::new(page.clone(), AgentConfig::default());
    retry.activate().await.unwrap();
    retry.stop().await.unwrap();
}

#[tokio::test]
async fn session_can_reactivate_with_a_fresh_impression() {
    let mut session = Session::new(page(), AgentConfig::default());
    session.activate().await.unwrap();
    let first_impression = session.impression_id().to_string();
    session.stop().await.unwrap();

    session.activate().await.unwrap();
    assert_ne!(session.impression_id(), first_impression);
    session.stop().await.unwrap();
}
