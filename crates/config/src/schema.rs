/// Config schema types (server, REST bridge, description layer).
use std::collections::BTreeMap;

use {
    serde::{Deserialize, Serialize},
    serde_json::{Map, Value},
};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub server: ServerConfig,
    pub sofa: SofaConfig,
    pub swagger: SwaggerConfig,
}

/// HTTP adapter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to. Defaults to "127.0.0.1".
    pub bind: String,
    /// Port to listen on. Defaults to 4000.
    pub port: u16,
    /// Largest request body the adapter buffers before handing the request
    /// to the pipeline. Defaults to 2 MiB.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 4000,
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Options forwarded to the REST translation engine.
///
/// Keys the bridge does not know about are kept in `extra` and passed through
/// untouched, so engine-specific settings can live in the same section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SofaConfig {
    /// Prefix every generated route is mounted under. Defaults to "/rest".
    pub base_path: String,
    /// Maximum selection depth the engine generates for a route.
    pub depth_limit: Option<usize>,
    /// Root fields (`Type.field`) the engine must not expose.
    pub ignore: Vec<String>,
    /// Per-field overrides of the generated route, keyed by `Type.field`.
    pub routes: BTreeMap<String, RouteOverride>,
    /// JSON schema for each custom scalar, by scalar name.
    pub custom_scalars: BTreeMap<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for SofaConfig {
    fn default() -> Self {
        Self {
            base_path: "/rest".into(),
            depth_limit: None,
            ignore: Vec::new(),
            routes: BTreeMap::new(),
            custom_scalars: BTreeMap::new(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteOverride {
    pub method: Option<String>,
    pub path: Option<String>,
    pub tags: Vec<String>,
    pub description: Option<String>,
}

/// Path the OpenAPI document is always served on. Not configurable; the
/// viewer endpoint must not collide with it.
pub const DOCUMENT_PATH: &str = "/swagger.json";

/// Description layer (OpenAPI document + Swagger UI viewer).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SwaggerConfig {
    /// Whether the description layer is mounted. Defaults to false.
    pub enabled: bool,
    /// Path of the viewer page. Defaults to "/swagger".
    pub endpoint: String,
    pub info: OpenApiInfo,
    pub servers: Vec<OpenApiServer>,
    /// OpenAPI `components` object merged into the generated document.
    pub components: Option<Value>,
    /// OpenAPI `security` requirements.
    pub security: Option<Value>,
    /// OpenAPI `tags` list.
    pub tags: Option<Value>,
}

impl Default for SwaggerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "/swagger".into(),
            info: OpenApiInfo::default(),
            servers: Vec::new(),
            components: None,
            security: None,
            tags: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenApiInfo {
    pub title: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Default for OpenApiInfo {
    fn default() -> Self {
        Self {
            title: "REST API".into(),
            version: "1.0.0".into(),
            description: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenApiServer {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
