//! Context value → execution envelope associations.

use std::{any::Any, sync::Arc};

use sofa_common::{ContextValue, Envelope};

use crate::{
    error::{Error, Result},
    weak_map::WeakKeyMap,
};

/// Remembers which envelope produced each context value, so execute and
/// subscribe run against the same request's machinery.
#[derive(Default)]
pub struct ExecutionBindings {
    map: WeakKeyMap<dyn Any + Send + Sync, Arc<dyn Envelope>>,
}

impl ExecutionBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&self, context_value: &ContextValue, envelope: Arc<dyn Envelope>) {
        self.map.insert(context_value.as_arc(), envelope);
    }

    /// Envelope bound to `context_value`, or [`Error::IllegalInvocation`].
    pub fn lookup(&self, context_value: &ContextValue) -> Result<Arc<dyn Envelope>> {
        self.map
            .get(context_value.as_arc())
            .ok_or(Error::IllegalInvocation)
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
