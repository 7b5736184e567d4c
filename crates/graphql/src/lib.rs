//! async-graphql host for the sofa plugins.
//!
//! [`SchemaHost`] tracks the current dynamic schema and hands out a
//! [`SchemaEnvelope`] per request: the context value it builds is a
//! [`RequestContext`], attached to every operation it executes so resolvers
//! can reach the inbound request.

pub mod context;
pub mod envelope;
pub mod error;
pub mod host;

pub use {
    context::RequestContext,
    envelope::SchemaEnvelope,
    error::{Error, Result},
    host::SchemaHost,
};
