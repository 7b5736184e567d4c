use std::path::Path;

use {
    sofa_config::{BridgeConfig, Severity, discover_and_load, load_config, validate},
    tracing::{error, warn},
};

/// Load the bridge config from `path`, or from the standard locations, and
/// refuse it when validation reports errors.
pub fn load(path: Option<&Path>) -> anyhow::Result<BridgeConfig> {
    let config = match path {
        Some(path) => load_config(path)?,
        None => discover_and_load(),
    };

    let result = validate(&config);
    for diagnostic in &result.diagnostics {
        match diagnostic.severity {
            Severity::Error => error!(path = %diagnostic.path, "{}", diagnostic.message),
            Severity::Warning => warn!(path = %diagnostic.path, "{}", diagnostic.message),
        }
    }
    if result.has_errors() {
        anyhow::bail!(
            "invalid configuration: {} error(s)",
            result.count(Severity::Error)
        );
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    fn write(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("sofa.toml");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn accepts_valid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "[sofa]\nbase_path = \"/api\"\n\n[swagger]\nenabled = true\n");
        let config = load(Some(&path)).unwrap();
        assert_eq!(config.sofa.base_path, "/api");
        assert!(config.swagger.enabled);
    }

    #[test]
    fn warnings_do_not_reject() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "[sofa]\nbase_path = \"/api/\"\n");
        assert!(load(Some(&path)).is_ok());
    }

    #[test]
    fn rejects_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "[swagger]\nenabled = true\nendpoint = \"/swagger.json\"\n");
        let err = load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("invalid configuration"));
    }
}
