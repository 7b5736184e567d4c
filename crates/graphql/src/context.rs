//! Request context injected into every resolver via `Context::data()`.

use std::sync::Arc;

use sofa_common::{RawRequest, ServerContext};

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request: Arc<RawRequest>,
    pub server_context: Arc<ServerContext>,
}

impl RequestContext {
    /// The context of the operation `ctx` belongs to.
    pub fn from_resolver<'a>(
        ctx: &async_graphql::Context<'a>,
    ) -> async_graphql::Result<&'a RequestContext> {
        ctx.data::<RequestContext>()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.request.headers().get(name)?.to_str().ok()
    }

    pub fn path(&self) -> &str {
        self.request.uri().path()
    }
}
