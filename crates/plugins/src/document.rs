//! Seams to the API-description generator.

use std::{collections::BTreeMap, sync::Arc};

use {
    serde_json::Value,
    sofa_config::{OpenApiInfo, OpenApiServer},
};

use crate::engine::RouteInfo;

/// Static metadata plus the schema a document is generated from.
#[derive(Debug)]
pub struct DocumentOptions<S> {
    pub schema: Arc<S>,
    pub info: OpenApiInfo,
    pub servers: Vec<OpenApiServer>,
    pub components: Option<Value>,
    pub security: Option<Value>,
    pub tags: Option<Value>,
    pub custom_scalars: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddRouteOptions {
    pub base_path: String,
}

/// A description document being filled with routes.
pub trait ApiDocument: Send + Sync {
    fn add_route(&mut self, route: &RouteInfo, options: &AddRouteOptions);

    /// The document as JSON.
    fn get(&self) -> Value;
}

pub trait DocumentGenerator<S>: Send + Sync {
    type Document: ApiDocument + 'static;

    fn generate(&self, options: DocumentOptions<S>) -> anyhow::Result<Self::Document>;
}
