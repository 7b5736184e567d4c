//! GraphQL-to-REST bridge plugins.
//!
//! [`SofaPlugin`] exposes a GraphQL schema as REST routes through a pluggable
//! [`RestEngine`], running every route through the host's per-request
//! execution envelope. [`SwaggerPlugin`] adds an OpenAPI description of those
//! routes and a Swagger UI viewer.

pub mod bindings;
pub mod bridge;
pub mod document;
pub mod engine;
pub mod error;
pub mod openapi;
pub mod registry;
pub mod sofa;
pub mod swagger;
pub mod swagger_ui;
pub mod weak_map;

pub use {
    bridge::ExecutionBridge,
    document::{AddRouteOptions, ApiDocument, DocumentGenerator, DocumentOptions},
    engine::{EngineOptions, FnObserver, RestEngine, RestHandler, RouteInfo, RouteObserver, RouteSink},
    error::{Error, Result},
    openapi::{OpenApiDocument, OpenApiGenerator},
    sofa::SofaPlugin,
    swagger::{DocumentController, SwaggerPlugin, bridge_plugin},
};
