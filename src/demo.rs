//! The synthetic-session demo: builds a page, runs the full agent against
//! it, and ships the resulting batches to disk or to a collector.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use retrace_config::AgentConfig;
use retrace_core::{HttpCollector, Session};
use retrace_dom::{BoundingBox, Document, DomEventKind, NodeId, PageHandle};
use retrace_plugins::{JsErrorPlugin, PerformancePlugin, PointerPlugin, ViewportPlugin};
use retrace_protocols::{NavigationTiming, ResourceTimingEntry};
use retrace_tracker::LayoutTracker;

struct DemoPage {
    page: PageHandle,
    feed: NodeId,
    note: NodeId,
    headline: NodeId,
}

/// A small article page: header, scrollable feed, and a comment box.
fn build_page() -> DemoPage {
    let mut doc = Document::new("https://demo.retrace.test/article/42");
    doc.set_user_agent("retrace-demo/1.0");
    let root = doc.root();

    let body = doc.create_element("body");
    doc.append_child(root, body);

    let header = doc.create_element("header");
    let headline = doc.create_element("h1");
    let title = doc.create_text("Forty-two ways to mirror a tree");
    doc.set_layout(header, BoundingBox { x: 0.0, y: 0.0, width: 1280.0, height: 80.0 });
    doc.append_child(body, header);
    doc.append_child(header, headline);
    doc.append_child(headline, title);

    let feed = doc.create_element("main");
    doc.set_attribute(feed, "id", "feed");
    doc.set_layout(feed, BoundingBox { x: 0.0, y: 80.0, width: 1280.0, height: 560.0 });
    doc.set_scrollable(feed, 0.0, 0.0);
    doc.append_child(body, feed);
    for i in 0..4 {
        let item = doc.create_element("article");
        let text = doc.create_text(&format!("paragraph {i}"));
        doc.append_child(feed, item);
        doc.append_child(item, text);
    }

    let note = doc.create_element("textarea");
    doc.set_attribute(note, "placeholder", "add a comment");
    doc.append_child(body, note);

    doc.performance_mut().set_navigation(NavigationTiming {
        fetch_start: 2.0,
        dom_interactive: 160.0,
        dom_content_loaded: 180.0,
        load_event_end: 240.0,
    });

    DemoPage {
        page: PageHandle::new(doc),
        feed,
        note,
        headline,
    }
}

/// Script one step of user behaviour for the given pump iteration.
fn drive(page: &DemoPage, step: u32) {
    let mut doc = page.page.lock();
    match step {
        2 => {
            doc.performance_mut().push_resource(ResourceTimingEntry {
                name: "/styles/app.css".to_string(),
                start_time: 12.0,
                response_end: 48.0,
                initiator: Some("link".to_string()),
            });
            doc.performance_mut().push_resource(ResourceTimingEntry {
                name: "/img/hero.jpg".to_string(),
                start_time: 30.0,
                response_end: 95.0,
                initiator: Some("img".to_string()),
            });
        }
        4 => doc.fire_pointer(DomEventKind::PointerMove, 200.0, 160.0, 0),
        5 => {
            doc.fire_pointer(DomEventKind::PointerDown, 200.0, 160.0, 1);
            doc.fire_pointer(DomEventKind::Click, 200.0, 160.0, 0);
        }
        6 => doc.scroll_to(page.feed, 0.0, 240.0),
        8 => {
            let item = doc.create_element("article");
            let text = doc.create_text("fresh comment");
            doc.append_child(page.feed, item);
            doc.append_child(item, text);
        }
        10 => {
            doc.set_value(page.note, "nice write-up");
            doc.fire(page.note, DomEventKind::Input, retrace_dom::EventDetail::None);
        }
        12 => doc.set_attribute(page.headline, "data-read", "true"),
        14 => doc.emit_error("undefined is not a function", "widget.js", 128, 9),
        16 => doc.set_viewport(390, 844, 3.0),
        18 => doc.scroll_to(page.feed, 0.0, 480.0),
        _ => {}
    }
}

pub(crate) async fn run(
    config: AgentConfig,
    out_dir: &PathBuf,
    upload_url: Option<String>,
    pumps: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let demo = build_page();
    let upload_url = upload_url.or_else(|| config.upload_url.clone());

    let mut session = Session::new(demo.page.clone(), config)
        .with_plugin(LayoutTracker::new())
        .with_plugin(ViewportPlugin::new())
        .with_plugin(PointerPlugin::new())
        .with_plugin(PerformancePlugin::new())
        .with_plugin(JsErrorPlugin::new());
    if let Some(url) = &upload_url {
        info!(url, "uploading batches to collector");
        session = session.with_collector(Arc::new(HttpCollector::new(url)));
    }

    session.activate().await?;
    for step in 0..pumps {
        drive(&demo, step);
        session.pump();
        // Let the background context keep pace with the foreground.
        tokio::task::yield_now().await;
    }
    session.stop().await?;

    let batches = session.drain_batches();
    if upload_url.is_none() {
        fs::create_dir_all(out_dir)?;
        for batch in &batches {
            let path = out_dir.join(format!("batch-{:04}.json.gz", batch.sequence_number));
            fs::write(&path, &batch.compressed)?;
            info!(
                path = %path.display(),
                events = batch.event_count,
                bytes = batch.compressed.len(),
                "batch written"
            );
        }
        info!(
            impression = session.impression_id(),
            batches = batches.len(),
            "demo session complete"
        );
    }
    Ok(())
}
