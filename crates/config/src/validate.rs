//! Semantic checks on a loaded [`BridgeConfig`].
//!
//! Parsing already enforces the shape of the file; this catches values that
//! parse fine but would make the bridge misbehave at runtime.

use serde_json::Value;

use crate::schema::{BridgeConfig, DOCUMENT_PATH};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted path, e.g. "swagger.endpoint"
    pub path: String,
    pub message: String,
}

/// Result of validating a configuration.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    fn push(&mut self, severity: Severity, path: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity,
            path: path.to_string(),
            message: message.into(),
        });
    }
}

pub fn validate(config: &BridgeConfig) -> ValidationResult {
    let mut result = ValidationResult::default();

    let base = &config.sofa.base_path;
    if !base.is_empty() && !base.starts_with('/') {
        result.push(
            Severity::Error,
            "sofa.base_path",
            format!("base path \"{base}\" must be empty or start with '/'"),
        );
    }
    if base.len() > 1 && base.ends_with('/') {
        result.push(
            Severity::Warning,
            "sofa.base_path",
            "trailing '/' produces double slashes in generated paths",
        );
    }

    for (field, route) in &config.sofa.routes {
        if !field.contains('.') {
            result.push(
                Severity::Error,
                &format!("sofa.routes.{field}"),
                "route overrides are keyed by `Type.field`",
            );
        }
        if let Some(method) = &route.method
            && http_method(method).is_none()
        {
            result.push(
                Severity::Error,
                &format!("sofa.routes.{field}.method"),
                format!("unknown HTTP method \"{method}\""),
            );
        }
    }

    for (name, schema) in &config.sofa.custom_scalars {
        if !schema.is_object() {
            result.push(
                Severity::Error,
                &format!("sofa.custom_scalars.{name}"),
                "custom scalar schema must be a table/object",
            );
        }
    }

    if config.swagger.enabled {
        validate_swagger(config, &mut result);
    }

    result
}

fn validate_swagger(config: &BridgeConfig, result: &mut ValidationResult) {
    let swagger = &config.swagger;
    if !swagger.endpoint.starts_with('/') {
        result.push(
            Severity::Error,
            "swagger.endpoint",
            "viewer endpoint must start with '/'",
        );
    }
    if swagger.endpoint == DOCUMENT_PATH {
        result.push(
            Severity::Error,
            "swagger.endpoint",
            format!("viewer endpoint collides with the document path {DOCUMENT_PATH}"),
        );
    }
    if swagger.info.title.trim().is_empty() {
        result.push(Severity::Warning, "swagger.info.title", "empty API title");
    }
    let checks: [(&str, &Option<Value>, fn(&Value) -> bool, &str); 3] = [
        ("swagger.components", &swagger.components, Value::is_object, "object"),
        ("swagger.security", &swagger.security, Value::is_array, "array"),
        ("swagger.tags", &swagger.tags, Value::is_array, "array"),
    ];
    for (path, value, ok, expected) in checks {
        if let Some(value) = value
            && !ok(value)
        {
            result.push(Severity::Error, path, format!("expected an {expected}"));
        }
    }
}

fn http_method(method: &str) -> Option<&'static str> {
    const METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE"];
    METHODS
        .iter()
        .copied()
        .find(|m| m.eq_ignore_ascii_case(method))
}
