//! Request handle → raw request associations.

use std::sync::Arc;

use sofa_common::{RawRequest, ServerContext};

use crate::weak_map::WeakKeyMap;

/// Lets the context function, which only sees the host's
/// [`ServerContext`], get back to the inbound request.
#[derive(Default)]
pub struct RequestRegistry {
    map: WeakKeyMap<ServerContext, Arc<RawRequest>>,
}

impl RequestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Must run before any context is built for `server_context`.
    pub fn record(&self, server_context: &Arc<ServerContext>, request: Arc<RawRequest>) {
        self.map.insert(server_context, request);
    }

    pub fn recall(&self, server_context: &Arc<ServerContext>) -> Option<Arc<RawRequest>> {
        self.map.get(server_context)
    }

    /// End-of-request cleanup.
    pub fn forget(&self, server_context: &Arc<ServerContext>) {
        self.map.remove(server_context);
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn purge(&self) -> usize {
        self.map.purge()
    }
}
