//! Per-request envelope over a dynamic schema.

use std::sync::Arc;

use {
    async_graphql::dynamic::Schema,
    async_trait::async_trait,
    sofa_common::{ContextInit, ContextValue, Envelope, ExecutionArgs, ResponseStream, ServerContext},
    tracing::debug,
};

use crate::{
    context::RequestContext,
    error::{Error, Result},
};

/// Executes against the schema that was current when the request arrived.
pub struct SchemaEnvelope {
    schema: Option<Schema>,
    server_context: Arc<ServerContext>,
}

impl SchemaEnvelope {
    pub fn new(schema: Option<Schema>, server_context: Arc<ServerContext>) -> Self {
        Self {
            schema,
            server_context,
        }
    }

    fn schema(&self) -> Result<&Schema> {
        self.schema.as_ref().ok_or(Error::NoSchema)
    }
}

/// Attach the request context, and the context value itself, as data.
fn prepare(args: ExecutionArgs) -> Result<async_graphql::Request> {
    let context = args
        .context_value
        .downcast_ref::<RequestContext>()
        .ok_or(Error::ForeignContext)?
        .clone();
    Ok(args.request.data(context).data(args.context_value))
}

#[async_trait]
impl Envelope for SchemaEnvelope {
    async fn context_factory(&self, init: ContextInit) -> anyhow::Result<ContextValue> {
        debug!(
            request = self.server_context.id(),
            path = init.request.uri().path(),
            "building request context"
        );
        Ok(ContextValue::new(RequestContext {
            request: init.request,
            server_context: Arc::clone(&self.server_context),
        }))
    }

    async fn execute(&self, args: ExecutionArgs) -> anyhow::Result<async_graphql::Response> {
        let schema = self.schema()?;
        Ok(schema.execute(prepare(args)?).await)
    }

    async fn subscribe(&self, args: ExecutionArgs) -> anyhow::Result<ResponseStream> {
        let schema = self.schema()?.clone();
        Ok(Box::pin(schema.execute_stream(prepare(args)?)))
    }
}
