//! Per-request values the host hands to plugins.

use std::{
    any::Any,
    fmt,
    sync::{Arc, Weak},
};

use bytes::Bytes;

/// An inbound request with its body already buffered.
pub type RawRequest = http::Request<Bytes>;

/// A response a plugin hands back to the host to end the pipeline.
pub type Response = http::Response<Bytes>;

/// The host's per-request bookkeeping handle.
///
/// A fresh one is allocated for every request and shared as
/// `Arc<ServerContext>`; plugins use the `Arc` identity as a lookup key, never
/// the id.
#[derive(Debug)]
pub struct ServerContext {
    id: u64,
}

impl ServerContext {
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    /// Sequence number of the request, for logging.
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Opaque per-request value produced by an envelope's context factory.
///
/// Cloning is cheap and keeps identity: two clones compare equal under
/// [`ContextValue::ptr_eq`], two separately created values never do.
#[derive(Clone)]
pub struct ContextValue(Arc<dyn Any + Send + Sync>);

impl ContextValue {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// The shared allocation backing this value, used as an identity key.
    pub fn as_arc(&self) -> &Arc<dyn Any + Send + Sync> {
        &self.0
    }

    pub fn downgrade(&self) -> Weak<dyn Any + Send + Sync> {
        Arc::downgrade(&self.0)
    }
}

impl fmt::Debug for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContextValue({:p})", Arc::as_ptr(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_identity() {
        let a = ContextValue::new(1_u32);
        let b = a.clone();
        let c = ContextValue::new(1_u32);
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }

    #[test]
    fn downcast_to_inner_type() {
        let value = ContextValue::new(String::from("ctx"));
        assert_eq!(value.downcast_ref::<String>().map(String::as_str), Some("ctx"));
        assert!(value.downcast_ref::<u32>().is_none());
    }

    #[test]
    fn weak_handle_dies_with_value() {
        let value = ContextValue::new(());
        let weak = value.downgrade();
        assert!(weak.upgrade().is_some());
        drop(value);
        assert!(weak.upgrade().is_none());
    }
}
