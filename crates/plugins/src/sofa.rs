//! REST bridge plugin.
//!
//! Rebuilds the REST handler on every schema change and offers each inbound
//! request to the current handler. Until the first schema arrives the plugin
//! is unready and requests fail fast.

use std::sync::{Arc, RwLock};

use {
    async_trait::async_trait,
    sofa_common::{GetEnveloped, Plugin, RequestEvent, ServerContext},
    sofa_config::SofaConfig,
    tracing::{debug, info},
};

use crate::{
    bridge::ExecutionBridge,
    engine::{EngineOptions, FnObserver, RestEngine, RestHandler, RouteInfo, RouteObserver, RouteSink},
    error::Error,
    registry::RequestRegistry,
};

pub struct SofaPlugin<S> {
    engine: Arc<dyn RestEngine<S>>,
    config: SofaConfig,
    bridge: Arc<ExecutionBridge>,
    observers: Vec<Arc<dyn RouteObserver>>,
    handler: RwLock<Option<Arc<dyn RestHandler>>>,
}

impl<S: Send + Sync + 'static> SofaPlugin<S> {
    pub fn new(engine: Arc<dyn RestEngine<S>>, config: SofaConfig) -> Self {
        Self {
            engine,
            config,
            bridge: Arc::new(ExecutionBridge::new()),
            observers: Vec::new(),
            handler: RwLock::new(None),
        }
    }

    /// Call `f` for every route registered during a rebuild. An error aborts
    /// the rebuild.
    pub fn on_route<F>(self, f: F) -> Self
    where
        F: Fn(&RouteInfo) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.with_observer(Arc::new(FnObserver(f)))
    }

    pub fn with_observer(mut self, observer: Arc<dyn RouteObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Place `observer` ahead of every user observer.
    pub(crate) fn observe_first(&mut self, observer: Arc<dyn RouteObserver>) {
        self.observers.insert(0, observer);
    }

    pub fn config(&self) -> &SofaConfig {
        &self.config
    }

    pub fn bridge(&self) -> &Arc<ExecutionBridge> {
        &self.bridge
    }

    /// Whether a handler has been built.
    pub fn is_ready(&self) -> bool {
        self.current_handler().is_some()
    }

    fn current_handler(&self) -> Option<Arc<dyn RestHandler>> {
        self.handler
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn rebuild(&self, schema: &Arc<S>) -> anyhow::Result<()> {
        let routes = RouteSink::new(self.observers.clone());
        let handler = self.engine.build(EngineOptions {
            schema: Arc::clone(schema),
            bridge: Arc::clone(&self.bridge),
            routes: routes.clone(),
            config: self.config.clone(),
        })?;

        // Requests already holding the previous handler finish on it.
        *self.handler.write().unwrap_or_else(|e| e.into_inner()) = Some(handler);
        routes.rebuilt();
        info!(base_path = %self.config.base_path, "rest handler rebuilt");
        Ok(())
    }
}

/// Keeps the raw request recallable while the handler runs.
struct RecordedRequest<'a> {
    registry: &'a RequestRegistry,
    server_context: Arc<ServerContext>,
}

impl Drop for RecordedRequest<'_> {
    fn drop(&mut self) {
        self.registry.forget(&self.server_context);
    }
}

#[async_trait]
impl<S: Send + Sync + 'static> Plugin<S> for SofaPlugin<S> {
    fn name(&self) -> &str {
        "sofa"
    }

    fn on_yoga_init(&self, accessor: &Arc<dyn GetEnveloped>) {
        self.bridge.set_accessor(Arc::clone(accessor));
    }

    fn on_schema_change(&self, schema: &Arc<S>) -> anyhow::Result<()> {
        self.rebuild(schema)
    }

    async fn on_request(&self, event: &mut RequestEvent) -> anyhow::Result<()> {
        let handler = self
            .current_handler()
            .ok_or(Error::not_ready("rest handler"))?;

        let request = Arc::clone(event.request());
        let server_context = Arc::clone(event.server_context());
        self.bridge
            .requests()
            .record(&server_context, Arc::clone(&request));
        let _recorded = RecordedRequest {
            registry: self.bridge.requests(),
            server_context: Arc::clone(&server_context),
        };

        if let Some(response) = handler.handle(request, server_context).await? {
            debug!(
                request = event.server_context().id(),
                status = %response.status(),
                "rest route answered"
            );
            event.end_response(response);
        }
        Ok(())
    }
}
