//! Configuration loading and validation for the REST bridge.
//!
//! Config files: `sofa.toml`, `sofa.yaml`, or `sofa.json`
//! Searched in `./` then `~/.config/sofa/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{config_dir, discover_and_load, load_config},
    schema::{
        BridgeConfig, DOCUMENT_PATH, OpenApiInfo, OpenApiServer, RouteOverride, ServerConfig,
        SofaConfig, SwaggerConfig,
    },
    validate::{Diagnostic, Severity, ValidationResult, validate},
};
