//! Per-request execution bridge handed to the REST translation engine.
//!
//! The engine is built once per schema, outside of any request, yet it has to
//! build contexts and execute operations with the machinery the host prepared
//! for the request it is currently serving. The bridge closes that gap: the
//! context function recovers the request's envelope through the host accessor
//! and binds the resulting context value to it; execute and subscribe find the
//! envelope again from the context value alone.

use std::sync::{Arc, OnceLock};

use {
    sofa_common::{
        ContextInit, ContextValue, ExecutionArgs, GetEnveloped, ResponseStream, ServerContext,
    },
    tracing::{debug, warn},
};

use crate::{
    bindings::ExecutionBindings,
    error::{Error, Result},
    registry::RequestRegistry,
};

#[derive(Default)]
pub struct ExecutionBridge {
    accessor: OnceLock<Arc<dyn GetEnveloped>>,
    bindings: ExecutionBindings,
    requests: RequestRegistry,
}

impl ExecutionBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the host's envelope accessor. Only the first call has effect.
    pub fn set_accessor(&self, accessor: Arc<dyn GetEnveloped>) {
        if self.accessor.set(accessor).is_err() {
            warn!("envelope accessor already set, keeping the first one");
        }
    }

    pub fn requests(&self) -> &RequestRegistry {
        &self.requests
    }

    pub fn bindings(&self) -> &ExecutionBindings {
        &self.bindings
    }

    /// Build the context value for the request identified by `server_context`.
    pub async fn context(&self, server_context: &Arc<ServerContext>) -> Result<ContextValue> {
        let accessor = self
            .accessor
            .get()
            .ok_or(Error::not_ready("envelope accessor"))?;
        let envelope = accessor.get_enveloped(server_context);
        let request = self
            .requests
            .recall(server_context)
            .ok_or(Error::MissingRequest {
                request: server_context.id(),
            })?;

        let context_value = envelope.context_factory(ContextInit { request }).await?;
        self.bindings.bind(&context_value, envelope);
        debug!(request = server_context.id(), "context value bound");
        Ok(context_value)
    }

    pub async fn execute(&self, args: ExecutionArgs) -> Result<async_graphql::Response> {
        let envelope = self.bindings.lookup(&args.context_value)?;
        Ok(envelope.execute(args).await?)
    }

    pub async fn subscribe(&self, args: ExecutionArgs) -> Result<ResponseStream> {
        let envelope = self.bindings.lookup(&args.context_value)?;
        Ok(envelope.subscribe(args).await?)
    }
}
