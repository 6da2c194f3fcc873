//! One agent session on one page load.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use retrace_batcher::BatcherWorker;
use retrace_config::AgentConfig;
use retrace_dom::PageHandle;
use retrace_pipeline::{EventPipeline, SessionClock};
use retrace_protocols::{
    AgentError, CompressedBatch, Instrumentation, SessionMetadata,
};

use crate::plugin::{Plugin, PluginContext};
use crate::upload::{spawn_uploader, Collector};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Created,
    Active,
    Stopped,
}

struct Runtime {
    ctx: PluginContext,
    batcher: JoinHandle<()>,
    uploader: Option<JoinHandle<()>>,
}

/// One impression: owns the plugin list, the pipeline, and the background
/// batcher for a single page load.
///
/// The host drives the foreground by calling [`Session::pump`] from its
/// event loop; everything else is message passing. Without a collector,
/// the host drains finished batches itself via [`Session::drain_batches`].
pub struct Session {
    config: Arc<AgentConfig>,
    page: PageHandle,
    plugins: Vec<Box<dyn Plugin>>,
    collector: Option<Arc<dyn Collector>>,
    impression_id: String,
    state: SessionState,
    runtime: Option<Runtime>,
    batches: Option<mpsc::UnboundedReceiver<CompressedBatch>>,
    stray_batches: Vec<CompressedBatch>,
}

impl Session {
    pub fn new(page: PageHandle, config: AgentConfig) -> Self {
        Self {
            config: Arc::new(config),
            page,
            plugins: Vec::new(),
            collector: None,
            impression_id: String::new(),
            state: SessionState::Created,
            runtime: None,
            batches: None,
            stray_batches: Vec::new(),
        }
    }

    pub fn with_plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    pub fn with_collector(mut self, collector: Arc<dyn Collector>) -> Self {
        self.collector = Some(collector);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn impression_id(&self) -> &str {
        &self.impression_id
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// The live pipeline, while active.
    pub fn pipeline(&self) -> Option<Arc<EventPipeline>> {
        self.runtime.as_ref().map(|r| r.ctx.pipeline.clone())
    }

    /// Start the impression: mark the page, spawn the background batcher,
    /// then reset and activate every plugin in registration order.
    ///
    /// A second agent on the same page reports `AgentDuplicated` once and
    /// refuses to start.
    pub async fn activate(&mut self) -> Result<(), AgentError> {
        if self.state == SessionState::Active {
            return Err(AgentError::AlreadyActive);
        }
        self.impression_id = Uuid::new_v4().to_string();
        if self.page.lock().agent_active() {
            warn!(
                impression = %self.impression_id,
                "another agent is active on this page; refusing to start"
            );
            self.report_duplicate().await;
            return Err(AgentError::AlreadyActive);
        }
        self.page.lock().set_agent_active(true);

        let clock = SessionClock::start();
        let metadata = self.metadata(&clock);
        let (message_tx, message_rx) = mpsc::unbounded_channel();
        let (batch_tx, batch_rx) = mpsc::unbounded_channel();
        let batcher = BatcherWorker::spawn(
            self.impression_id.clone(),
            metadata,
            self.config.batch_limit_bytes,
            message_rx,
            batch_tx,
        );
        let pipeline = Arc::new(EventPipeline::new(clock, message_tx));
        let ctx = PluginContext {
            page: self.page.clone(),
            pipeline: pipeline.clone(),
            config: self.config.clone(),
        };

        for i in 0..self.plugins.len() {
            self.plugins[i].reset();
            if let Err(err) = self.plugins[i].activate(&ctx) {
                error!(plugin = self.plugins[i].name(), "activation failed: {err}");
                for plugin in self.plugins[..i].iter_mut().rev() {
                    let _ = plugin.teardown(&ctx);
                }
                pipeline.unbind_all(&self.page);
                self.page.lock().set_agent_active(false);
                pipeline.shutdown();
                let _ = batcher.await;
                return Err(err.into());
            }
            debug!(plugin = self.plugins[i].name(), "plugin activated");
        }

        let uploader = match &self.collector {
            Some(collector) => {
                let handle = spawn_uploader(collector.clone(), batch_rx, pipeline.clone());
                self.batches = None;
                Some(handle)
            }
            None => {
                self.batches = Some(batch_rx);
                None
            }
        };
        self.runtime = Some(Runtime {
            ctx,
            batcher,
            uploader,
        });
        self.state = SessionState::Active;
        info!(impression = %self.impression_id, "session activated");
        Ok(())
    }

    /// One foreground slice: give every plugin a tick, then deliver queued
    /// page events to the plugins that bound matching listeners.
    pub fn pump(&mut self) {
        let Some(runtime) = self.runtime.as_ref() else {
            return;
        };
        let ctx = runtime.ctx.clone();
        for plugin in &mut self.plugins {
            plugin.tick(&ctx);
        }

        let events = ctx.page.lock().drain_events();
        for event in events {
            let owners = ctx.page.lock().owners_for(event.target, event.kind);
            if owners.is_empty() {
                continue;
            }
            for plugin in &mut self.plugins {
                if owners.iter().any(|owner| owner == plugin.name()) {
                    plugin.on_dom_event(&ctx, &event);
                }
            }
        }
    }

    /// Stop the impression: tear plugins down in reverse order, unbind
    /// every recorded listener, then drain the background context.
    pub async fn stop(&mut self) -> Result<(), AgentError> {
        if self.state != SessionState::Active {
            return Err(AgentError::NotActive);
        }
        let runtime = self.runtime.take().expect("active session has a runtime");

        for plugin in self.plugins.iter_mut().rev() {
            if let Err(err) = plugin.teardown(&runtime.ctx) {
                warn!(plugin = plugin.name(), "teardown failed: {err}");
            }
        }
        runtime.ctx.pipeline.unbind_all(&self.page);
        self.page.lock().set_agent_active(false);

        runtime.ctx.pipeline.force_compression();
        runtime.ctx.pipeline.shutdown();
        if runtime.batcher.await.is_err() {
            warn!("batcher task panicked");
        }
        if let Some(uploader) = runtime.uploader {
            if uploader.await.is_err() {
                warn!("uploader task panicked");
            }
        }

        self.state = SessionState::Stopped;
        info!(impression = %self.impression_id, "session stopped");
        Ok(())
    }

    /// Take every finished batch the host has not consumed yet. Empty when
    /// a collector owns the upload path.
    pub fn drain_batches(&mut self) -> Vec<CompressedBatch> {
        let mut out = std::mem::take(&mut self.stray_batches);
        if let Some(rx) = self.batches.as_mut() {
            while let Ok(batch) = rx.try_recv() {
                out.push(batch);
            }
        }
        out
    }

    fn metadata(&self, clock: &SessionClock) -> SessionMetadata {
        let doc = self.page.lock();
        SessionMetadata {
            impression_id: self.impression_id.clone(),
            page_url: doc.url().to_string(),
            user_agent: doc.user_agent().to_string(),
            started_at: clock.started_at(),
            agent_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Ship the one `AgentDuplicated` report through an ephemeral pipeline
    /// and batcher, so the refusal is visible downstream.
    async fn report_duplicate(&mut self) {
        let clock = SessionClock::start();
        let metadata = self.metadata(&clock);
        let (message_tx, message_rx) = mpsc::unbounded_channel();
        let (batch_tx, mut batch_rx) = mpsc::unbounded_channel();
        let batcher = BatcherWorker::spawn(
            self.impression_id.clone(),
            metadata,
            self.config.batch_limit_bytes,
            message_rx,
            batch_tx,
        );
        let pipeline = EventPipeline::new(clock, message_tx);
        pipeline.instrument(Instrumentation::AgentDuplicated {
            impression_id: self.impression_id.clone(),
        });
        pipeline.shutdown();
        let _ = batcher.await;

        while let Some(batch) = batch_rx.recv().await {
            match &self.collector {
                Some(collector) => {
                    let _ = collector
                        .deliver(batch.sequence_number, &batch.compressed, true)
                        .await;
                }
                None => self.stray_batches.push(batch),
            }
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
