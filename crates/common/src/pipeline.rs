//! Host request pipeline and the plugin lifecycle it drives.
//!
//! A [`Pipeline`] owns an ordered list of [`Plugin`]s and fires four
//! notifications at them: plugin-init (once, at registration), yoga-init (the
//! per-request envelope accessor becomes available), schema-changed, and
//! request-received. During request-received a plugin may end the pipeline
//! with a response; later plugins then never see the request.

use std::sync::{
    Arc, RwLock,
    atomic::{AtomicU64, Ordering},
};

use {
    async_trait::async_trait,
    tracing::{debug, error, info, warn},
};

use crate::{
    context::{RawRequest, Response, ServerContext},
    envelope::GetEnveloped,
    error::{Error, Result},
};

// ── Plugin trait ────────────────────────────────────────────────────────────

/// Lifecycle hooks a plugin can implement. Every hook defaults to a no-op.
#[async_trait]
pub trait Plugin<S>: Send + Sync {
    /// A human-readable name for this plugin.
    fn name(&self) -> &str;

    /// Called once when the plugin is registered. Sub-plugins added here are
    /// placed directly after this plugin.
    fn on_plugin_init(&self, _init: &mut PluginInit<S>) {}

    /// Called once the host can hand out per-request envelopes.
    fn on_yoga_init(&self, _accessor: &Arc<dyn GetEnveloped>) {}

    /// Called whenever the schema is replaced, before any request is served
    /// against it.
    fn on_schema_change(&self, _schema: &Arc<S>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called for every inbound request until some plugin ends the response.
    async fn on_request(&self, _event: &mut RequestEvent) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Registration handle passed to [`Plugin::on_plugin_init`].
pub struct PluginInit<S> {
    added: Vec<Arc<dyn Plugin<S>>>,
}

impl<S: Send + Sync + 'static> PluginInit<S> {
    fn new() -> Self {
        Self { added: Vec::new() }
    }

    pub fn add_plugin(&mut self, plugin: Arc<dyn Plugin<S>>) {
        self.added.push(plugin);
    }
}

// ── RequestEvent ────────────────────────────────────────────────────────────

/// Per-request payload for [`Plugin::on_request`].
pub struct RequestEvent {
    request: Arc<RawRequest>,
    server_context: Arc<ServerContext>,
    response: Option<Response>,
}

impl RequestEvent {
    pub fn new(request: Arc<RawRequest>, server_context: Arc<ServerContext>) -> Self {
        Self {
            request,
            server_context,
            response: None,
        }
    }

    pub fn request(&self) -> &Arc<RawRequest> {
        &self.request
    }

    pub fn path(&self) -> &str {
        self.request.uri().path()
    }

    pub fn server_context(&self) -> &Arc<ServerContext> {
        &self.server_context
    }

    /// Stop the pipeline and answer with `response`.
    ///
    /// Only the first call wins; later calls are dropped.
    pub fn end_response(&mut self, response: Response) {
        if self.response.is_some() {
            warn!(
                request = self.server_context.id(),
                "response already ended, ignoring second response"
            );
            return;
        }
        self.response = Some(response);
    }

    pub fn is_ended(&self) -> bool {
        self.response.is_some()
    }

    pub fn into_response(self) -> Option<Response> {
        self.response
    }
}

// ── Pipeline ────────────────────────────────────────────────────────────────

/// Drives registered plugins through their lifecycle.
pub struct Pipeline<S> {
    plugins: Vec<Arc<dyn Plugin<S>>>,
    schema: RwLock<Option<Arc<S>>>,
    next_request: AtomicU64,
}

impl<S: Send + Sync + 'static> Default for Pipeline<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Send + Sync + 'static> Pipeline<S> {
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
            schema: RwLock::new(None),
            next_request: AtomicU64::new(1),
        }
    }

    /// Builder-style [`Pipeline::register`].
    pub fn with_plugin(mut self, plugin: Arc<dyn Plugin<S>>) -> Self {
        self.register(plugin);
        self
    }

    /// Register a plugin, then every sub-plugin it adds during plugin-init.
    pub fn register(&mut self, plugin: Arc<dyn Plugin<S>>) {
        let mut init = PluginInit::new();
        plugin.on_plugin_init(&mut init);
        info!(plugin = plugin.name(), "plugin registered");
        self.plugins.push(plugin);
        for sub in init.added {
            self.register(sub);
        }
    }

    /// Registered plugin names, in dispatch order.
    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Fire yoga-init with the host's envelope accessor.
    pub fn init(&self, accessor: Arc<dyn GetEnveloped>) {
        for plugin in &self.plugins {
            plugin.on_yoga_init(&accessor);
        }
        debug!(count = self.plugins.len(), "yoga-init dispatched");
    }

    /// Replace the schema and fire schema-changed in registration order.
    ///
    /// Stops at the first failing plugin. The plugins that already accepted
    /// the new schema are handed the previous one again, so every plugin and
    /// [`Pipeline::schema`] stay on the same schema. Before any schema was
    /// accepted there is nothing to restore.
    pub fn set_schema(&self, schema: Arc<S>) -> Result<()> {
        for (index, plugin) in self.plugins.iter().enumerate() {
            if let Err(e) = plugin.on_schema_change(&schema) {
                self.restore(&self.plugins[..index]);
                return Err(Error::plugin(plugin.name(), e));
            }
        }
        *self.schema.write().unwrap_or_else(|e| e.into_inner()) = Some(schema);
        info!(count = self.plugins.len(), "schema change dispatched");
        Ok(())
    }

    fn restore(&self, accepted: &[Arc<dyn Plugin<S>>]) {
        let Some(previous) = self.schema() else {
            return;
        };
        for plugin in accepted {
            if let Err(e) = plugin.on_schema_change(&previous) {
                error!(plugin = plugin.name(), error = %e, "failed to restore previous schema");
            }
        }
        warn!(count = accepted.len(), "schema change rolled back");
    }

    /// Schema accepted by the most recent successful [`Pipeline::set_schema`].
    pub fn schema(&self) -> Option<Arc<S>> {
        self.schema.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Dispatch request-received sequentially.
    ///
    /// Returns the response of the first plugin that ended the pipeline, or
    /// `None` when every plugin let the request through.
    pub async fn handle(&self, request: RawRequest) -> Result<Option<Response>> {
        let id = self.next_request.fetch_add(1, Ordering::Relaxed);
        let server_context = Arc::new(ServerContext::new(id));
        let mut event = RequestEvent::new(Arc::new(request), server_context);

        for plugin in &self.plugins {
            plugin
                .on_request(&mut event)
                .await
                .map_err(|e| Error::plugin(plugin.name(), e))?;
            if event.is_ended() {
                debug!(
                    plugin = plugin.name(),
                    request = id,
                    path = event.path(),
                    "plugin ended response"
                );
                break;
            }
        }

        Ok(event.into_response())
    }
}
