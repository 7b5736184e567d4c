//! Shared types used across all sofa crates: the host pipeline lifecycle,
//! the per-request execution envelope, and the common error type.

pub mod context;
pub mod envelope;
pub mod error;
pub mod pipeline;

pub use {
    context::{ContextValue, RawRequest, Response, ServerContext},
    envelope::{ContextInit, Envelope, ExecutionArgs, GetEnveloped, ResponseStream},
    error::{Error, FromMessage, Result},
    pipeline::{Pipeline, Plugin, PluginInit, RequestEvent},
};
