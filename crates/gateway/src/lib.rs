//! HTTP adapter for the sofa plugin pipeline.
//!
//! Every request is buffered and handed to the [`Pipeline`](sofa_common::Pipeline);
//! the first plugin response is returned as is, unanswered requests get `404`.

pub mod config;
pub mod server;
pub mod telemetry;

pub use {
    config::load as load_config,
    server::{router, serve, start},
    telemetry::init_telemetry,
};
