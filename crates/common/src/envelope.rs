//! The host's per-request execution machinery.
//!
//! An [`Envelope`] bundles the three operations a GraphQL server prepares for
//! one request: building a context value, executing an operation against it,
//! and subscribing. The host exposes envelopes through [`GetEnveloped`], which
//! plugins receive once at yoga-init.

use std::sync::Arc;

use {anyhow::Result, async_trait::async_trait, futures::stream::BoxStream};

use crate::context::{ContextValue, RawRequest, ServerContext};

pub type ResponseStream = BoxStream<'static, async_graphql::Response>;

/// Input to an envelope's context factory.
#[derive(Debug, Clone)]
pub struct ContextInit {
    pub request: Arc<RawRequest>,
}

/// One GraphQL operation plus the context value it runs against.
#[derive(Debug)]
pub struct ExecutionArgs {
    pub request: async_graphql::Request,
    pub context_value: ContextValue,
}

impl ExecutionArgs {
    pub fn new(request: impl Into<async_graphql::Request>, context_value: ContextValue) -> Self {
        Self {
            request: request.into(),
            context_value,
        }
    }
}

/// Execution bundle valid for a single in-flight request.
#[async_trait]
pub trait Envelope: Send + Sync {
    async fn context_factory(&self, init: ContextInit) -> Result<ContextValue>;

    async fn execute(&self, args: ExecutionArgs) -> Result<async_graphql::Response>;

    async fn subscribe(&self, args: ExecutionArgs) -> Result<ResponseStream>;
}

/// Host accessor producing the envelope for a request.
pub trait GetEnveloped: Send + Sync {
    fn get_enveloped(&self, server_context: &Arc<ServerContext>) -> Arc<dyn Envelope>;
}

impl<F> GetEnveloped for F
where
    F: Fn(&Arc<ServerContext>) -> Arc<dyn Envelope> + Send + Sync,
{
    fn get_enveloped(&self, server_context: &Arc<ServerContext>) -> Arc<dyn Envelope> {
        self(server_context)
    }
}
