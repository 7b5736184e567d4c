//! Seams to the REST translation engine.
//!
//! The engine itself (path/verb routing, argument coercion, response shaping)
//! lives outside this crate. It is handed a schema, the [`ExecutionBridge`]
//! and a [`RouteSink`], and returns a [`RestHandler`] for that schema.

use std::{fmt, sync::Arc};

use {
    async_trait::async_trait,
    sofa_common::{RawRequest, Response, ServerContext},
    sofa_config::SofaConfig,
    tracing::debug,
};

use crate::bridge::ExecutionBridge;

/// One REST route the engine derived from a root field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    pub method: http::Method,
    /// Route path relative to the base path, with `:name` parameters.
    pub path: String,
    /// Name of the GraphQL operation the route runs.
    pub operation_name: String,
    /// GraphQL document the route runs.
    pub document: String,
    pub tags: Vec<String>,
    pub description: Option<String>,
}

impl RouteInfo {
    pub fn new(
        method: http::Method,
        path: impl Into<String>,
        operation_name: impl Into<String>,
        document: impl Into<String>,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            operation_name: operation_name.into(),
            document: document.into(),
            tags: Vec::new(),
            description: None,
        }
    }
}

// ── Route observers ─────────────────────────────────────────────────────────

/// Receives every route the engine registers while a handler is built.
pub trait RouteObserver: Send + Sync {
    fn on_route(&self, route: &RouteInfo) -> anyhow::Result<()>;

    /// Called once the handler built from these routes is current.
    fn on_rebuilt(&self) {}
}

/// Adapts a closure into a [`RouteObserver`].
pub struct FnObserver<F>(pub F);

impl<F> RouteObserver for FnObserver<F>
where
    F: Fn(&RouteInfo) -> anyhow::Result<()> + Send + Sync,
{
    fn on_route(&self, route: &RouteInfo) -> anyhow::Result<()> {
        (self.0)(route)
    }
}

/// Ordered fan-out of route registrations.
///
/// Observers run synchronously in registration order; the first error stops
/// the fan-out and is returned to the engine unchanged.
#[derive(Clone, Default)]
pub struct RouteSink {
    observers: Vec<Arc<dyn RouteObserver>>,
}

impl RouteSink {
    pub fn new(observers: Vec<Arc<dyn RouteObserver>>) -> Self {
        Self { observers }
    }

    pub fn emit(&self, route: &RouteInfo) -> anyhow::Result<()> {
        debug!(method = %route.method, path = %route.path, "route registered");
        for observer in &self.observers {
            observer.on_route(route)?;
        }
        Ok(())
    }

    pub(crate) fn rebuilt(&self) {
        for observer in &self.observers {
            observer.on_rebuilt();
        }
    }
}

impl fmt::Debug for RouteSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteSink")
            .field("observers", &self.observers.len())
            .finish()
    }
}

// ── Engine traits ───────────────────────────────────────────────────────────

/// Everything the engine gets to build a handler for one schema version.
pub struct EngineOptions<S> {
    pub schema: Arc<S>,
    pub bridge: Arc<ExecutionBridge>,
    pub routes: RouteSink,
    pub config: SofaConfig,
}

pub trait RestEngine<S>: Send + Sync {
    /// Build the handler for `options.schema`, reporting each route through
    /// `options.routes` before returning.
    fn build(&self, options: EngineOptions<S>) -> anyhow::Result<Arc<dyn RestHandler>>;
}

#[async_trait]
pub trait RestHandler: Send + Sync {
    /// `Ok(None)` means the request is not a REST route of this handler.
    async fn handle(
        &self,
        request: Arc<RawRequest>,
        server_context: Arc<ServerContext>,
    ) -> anyhow::Result<Option<Response>>;
}
