use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::BridgeConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["sofa.toml", "sofa.yaml", "sofa.yml", "sofa.json"];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<BridgeConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./sofa.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/sofa/sofa.{toml,yaml,yml,json}` (user-global)
///
/// Returns `BridgeConfig::default()` if no config file is found or the file
/// found cannot be parsed.
pub fn discover_and_load() -> BridgeConfig {
    let Some(path) = find_config_file() else {
        debug!("no config file found, using defaults");
        return BridgeConfig::default();
    };
    debug!(path = %path.display(), "loading config");
    load_config(&path).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
        BridgeConfig::default()
    })
}

/// Returns the user-global config directory (`~/.config/sofa/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "sofa").map(|d| d.config_dir().to_path_buf())
}

fn find_config_file() -> Option<PathBuf> {
    let local = CONFIG_FILENAMES.iter().map(PathBuf::from);
    let global = config_dir()
        .into_iter()
        .flat_map(|dir| CONFIG_FILENAMES.iter().map(move |name| dir.join(name)));
    local.chain(global).find(|p| p.exists())
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<BridgeConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use {rstest::rstest, serde_json::json};

    use super::*;

    const TOML: &str = r#"
[server]
port = 8080

[sofa]
base_path = "/api"
depth_limit = 3
ignore = ["Query.secret"]
error_format = "graphql"

[sofa.routes."Query.user"]
method = "GET"
path = "/users/:id"

[sofa.custom_scalars.Date]
type = "string"
format = "date"

[swagger]
enabled = true
endpoint = "/docs"

[swagger.info]
title = "Shop API"
version = "2.0.0"

[[swagger.servers]]
url = "https://shop.example.com"
"#;

    const YAML: &str = r#"
sofa:
  base_path: /api
swagger:
  enabled: true
  info:
    title: Shop API
"#;

    const JSON: &str = r#"{"sofa": {"base_path": "/api"}, "swagger": {"enabled": true, "info": {"title": "Shop API"}}}"#;

    fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn loads_full_toml() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(&write(&dir, "sofa.toml", TOML)).unwrap();

        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.bind, "127.0.0.1");
        assert_eq!(cfg.sofa.base_path, "/api");
        assert_eq!(cfg.sofa.depth_limit, Some(3));
        assert_eq!(cfg.sofa.ignore, vec!["Query.secret"]);
        assert_eq!(cfg.sofa.routes["Query.user"].path.as_deref(), Some("/users/:id"));
        assert_eq!(
            cfg.sofa.custom_scalars["Date"],
            json!({"type": "string", "format": "date"})
        );
        assert_eq!(cfg.sofa.extra.get("error_format"), Some(&json!("graphql")));
        assert!(cfg.swagger.enabled);
        assert_eq!(cfg.swagger.endpoint, "/docs");
        assert_eq!(cfg.swagger.info.title, "Shop API");
        assert_eq!(cfg.swagger.servers[0].url, "https://shop.example.com");
    }

    #[rstest]
    #[case("sofa.yaml", YAML)]
    #[case("sofa.yml", YAML)]
    #[case("sofa.json", JSON)]
    fn loads_other_formats(#[case] name: &str, #[case] body: &str) {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(&write(&dir, name, body)).unwrap();
        assert_eq!(cfg.sofa.base_path, "/api");
        assert!(cfg.swagger.enabled);
        assert_eq!(cfg.swagger.info.title, "Shop API");
        assert_eq!(cfg.swagger.endpoint, "/swagger");
    }

    #[test]
    fn empty_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(&write(&dir, "sofa.toml", "")).unwrap();
        assert_eq!(cfg.sofa.base_path, "/rest");
        assert!(!cfg.swagger.enabled);
        assert_eq!(cfg.server.max_body_bytes, 2 * 1024 * 1024);
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&write(&dir, "sofa.ini", "")).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_config(Path::new("/definitely/not/here/sofa.toml")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here/sofa.toml"));
    }
}
