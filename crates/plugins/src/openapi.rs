//! Route-level OpenAPI 3.0 generator.
//!
//! Describes each registered route as a path item with its path parameters
//! and a generic JSON payload. Schema-derived component types are left to
//! richer generators plugged in through [`DocumentGenerator`].

use std::collections::BTreeMap;

use {
    http::Method,
    serde_json::{Map, Value, json},
    sofa_config::{OpenApiInfo, OpenApiServer},
    tracing::warn,
};

use crate::{
    document::{AddRouteOptions, ApiDocument, DocumentGenerator, DocumentOptions},
    engine::RouteInfo,
};

const OPENAPI_VERSION: &str = "3.0.3";

#[derive(Debug, Clone, Copy, Default)]
pub struct OpenApiGenerator;

impl<S> DocumentGenerator<S> for OpenApiGenerator {
    type Document = OpenApiDocument;

    fn generate(&self, options: DocumentOptions<S>) -> anyhow::Result<OpenApiDocument> {
        Ok(OpenApiDocument::new(options))
    }
}

#[derive(Debug, Clone)]
pub struct OpenApiDocument {
    info: OpenApiInfo,
    servers: Vec<OpenApiServer>,
    components: Map<String, Value>,
    security: Option<Value>,
    tags: Option<Value>,
    paths: BTreeMap<String, Map<String, Value>>,
}

impl OpenApiDocument {
    pub fn new<S>(options: DocumentOptions<S>) -> Self {
        let mut components = match options.components {
            Some(Value::Object(map)) => map,
            Some(other) => {
                warn!(components = %other, "components must be an object, ignoring");
                Map::new()
            },
            None => Map::new(),
        };

        if !options.custom_scalars.is_empty() {
            let schemas = components
                .entry("schemas")
                .or_insert_with(|| Value::Object(Map::new()));
            if let Some(schemas) = schemas.as_object_mut() {
                for (name, schema) in options.custom_scalars {
                    schemas.insert(name, schema);
                }
            }
        }

        Self {
            info: options.info,
            servers: options.servers,
            components,
            security: options.security,
            tags: options.tags,
            paths: BTreeMap::new(),
        }
    }

    /// Registered paths, sorted.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.keys().map(String::as_str)
    }
}

impl ApiDocument for OpenApiDocument {
    fn add_route(&mut self, route: &RouteInfo, options: &AddRouteOptions) {
        let mut operation = Map::new();
        operation.insert("operationId".into(), json!(route.operation_name));
        if let Some(description) = &route.description {
            operation.insert("description".into(), json!(description));
        }
        if !route.tags.is_empty() {
            operation.insert("tags".into(), json!(route.tags));
        }

        let parameters: Vec<Value> = path_params(&route.path)
            .map(|name| {
                json!({
                    "name": name,
                    "in": "path",
                    "required": true,
                    "schema": { "type": "string" },
                })
            })
            .collect();
        if !parameters.is_empty() {
            operation.insert("parameters".into(), Value::Array(parameters));
        }

        if [Method::POST, Method::PUT, Method::PATCH].contains(&route.method) {
            operation.insert(
                "requestBody".into(),
                json!({
                    "content": { "application/json": { "schema": { "type": "object" } } }
                }),
            );
        }
        operation.insert(
            "responses".into(),
            json!({
                "200": {
                    "description": "OK",
                    "content": { "application/json": { "schema": { "type": "object" } } }
                }
            }),
        );

        self.paths
            .entry(openapi_path(&options.base_path, &route.path))
            .or_default()
            .insert(
                route.method.as_str().to_ascii_lowercase(),
                Value::Object(operation),
            );
    }

    fn get(&self) -> Value {
        let mut doc = json!({
            "openapi": OPENAPI_VERSION,
            "info": self.info,
            "paths": self.paths,
        });
        if !self.servers.is_empty() {
            doc["servers"] = json!(self.servers);
        }
        if !self.components.is_empty() {
            doc["components"] = Value::Object(self.components.clone());
        }
        if let Some(security) = &self.security {
            doc["security"] = security.clone();
        }
        if let Some(tags) = &self.tags {
            doc["tags"] = tags.clone();
        }
        doc
    }
}

/// Join `base` and a route path, turning `:name` segments into `{name}`.
fn openapi_path(base: &str, path: &str) -> String {
    let joined = format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    joined
        .split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => format!("{{{name}}}"),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn path_params(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter_map(|segment| segment.strip_prefix(':'))
}
