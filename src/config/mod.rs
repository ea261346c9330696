// ABOUTME: Layered settings - YAML defaults, per-environment YAML, then env vars.
// ABOUTME: Supplies the endpoint lists, workspace credentials, and log settings.

use std::path::Path;

use serde::Deserialize;
use serde_yaml::Value;

use crate::error::ConfigError;

/// Workspace connection settings.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabricksSettings {
    pub host: Option<String>,
    pub token: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl std::fmt::Debug for DatabricksSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabricksSettings")
            .field("host", &self.host)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "***"))
            .finish()
    }
}

/// MCP server endpoints, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct McpSettings {
    /// Servers behind the workspace proxy.
    pub managed_urls: Vec<String>,
    /// Independently hosted servers that need OAuth.
    pub custom_urls: Vec<String>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// All settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub environment: String,
    pub databricks: DatabricksSettings,
    pub mcp: McpSettings,
    pub logging: LogSettings,
}

impl Settings {
    /// Load settings from `dir` for `environment`, reading the process environment.
    pub fn load(dir: Option<&Path>, environment: Option<&str>) -> Result<Self, ConfigError> {
        Self::load_with(dir, environment, |key| std::env::var(key).ok())
    }

    /// Load settings with an injectable environment lookup.
    ///
    /// Order: `default.yaml`, then `<environment>.yaml`, then variables.
    /// The environment name falls back to `DEPLOYMENT_ENVIRONMENT`, then `dev`.
    pub fn load_with<F>(
        dir: Option<&Path>,
        environment: Option<&str>,
        lookup: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = environment
            .map(str::to_string)
            .or_else(|| lookup("DEPLOYMENT_ENVIRONMENT"))
            .unwrap_or_else(|| "dev".to_string());

        let mut merged = Value::Mapping(Default::default());
        if let Some(dir) = dir {
            for file in ["default.yaml".to_string(), format!("{}.yaml", environment)] {
                if let Some(layer) = read_yaml(&dir.join(file))? {
                    deep_merge(&mut merged, layer);
                }
            }
        }

        let mut settings: Settings = serde_yaml::from_value(merged)?;
        settings.environment = environment;
        settings.apply_env(lookup)?;

        tracing::debug!(
            environment = %settings.environment,
            managed = settings.mcp.managed_urls.len(),
            custom = settings.mcp.custom_urls.len(),
            "Settings loaded"
        );
        Ok(settings)
    }

    fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db = &mut self.databricks;
        for (key, slot) in [
            ("DATABRICKS_HOST", &mut db.host),
            ("DATABRICKS_TOKEN", &mut db.token),
            ("DATABRICKS_CLIENT_ID", &mut db.client_id),
            ("DATABRICKS_CLIENT_SECRET", &mut db.client_secret),
        ] {
            if let Some(value) = lookup(key) {
                *slot = Some(value);
            }
        }

        if let Some(raw) = lookup("MCP_MANAGED_URLS") {
            self.mcp.managed_urls = parse_url_list("MCP_MANAGED_URLS", &raw)?;
        }
        if let Some(raw) = lookup("MCP_CUSTOM_URLS") {
            self.mcp.custom_urls = parse_url_list("MCP_CUSTOM_URLS", &raw)?;
        }

        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level.to_lowercase();
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            self.logging.format = match format.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "pretty" | "text" => LogFormat::Pretty,
                other => {
                    return Err(ConfigError::InvalidValue {
                        key: "LOG_FORMAT".into(),
                        message: format!("unknown format '{}'", other),
                    });
                }
            };
        }

        Ok(())
    }
}

fn read_yaml(path: &Path) -> Result<Option<Value>, ConfigError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "Config file not found");
            return Ok(None);
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let value: Value = serde_yaml::from_str(&text)?;
    Ok(match value {
        Value::Null => None,
        other => Some(other),
    })
}

/// Merge `overlay` into `base`: mappings merge key by key, everything else replaces.
fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Accept a JSON array or a comma-separated list.
fn parse_url_list(key: &str, raw: &str) -> Result<Vec<String>, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        });
    }

    Ok(trimmed
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect())
}
