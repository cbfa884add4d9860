use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ConfigMap;
use crate::core::errors::{Error, Result};

/// Project name matching every project without an entry of its own.
pub const WILDCARD: &str = "*";

pub const DEFAULT_CHARSET: &str = "utf-8";

/// `@config` is the per-user config dir, e.g. `~/.config/search_bridge` on Linux.
pub const DEFAULT_INI_DIRECTORY: &str = "@config/ini";

/// Settings of a [`crate::ConnectionManager`].
///
/// JSON looks like:
/// ```json
/// {
///   "ini_directory": "@app/search",
///   "charset": "utf-8",
///   "configs": {
///     "*":    { "server.index": 8383, "server.search": 8384 },
///     "demo": { "server.index": "10.0.0.2:8383" }
///   },
///   "ini_overwrite": false,
///   "aliases": { "app": "/srv/app" }
/// }
/// ```
///
/// `configs` stays loosely typed until a project is opened: a malformed entry
/// only fails the projects that resolve to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Directory holding `{project}.ini` files. May start with an `@alias`.
    pub ini_directory: PathBuf,
    /// `None` skips both the overrides and the default charset.
    pub charset: Option<String>,
    /// Per-project overrides, keyed by project name or [`WILDCARD`].
    pub configs: HashMap<String, Value>,
    /// Whether overrides replace values already present in the INI file.
    pub ini_overwrite: bool,
    pub aliases: HashMap<String, PathBuf>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            ini_directory: PathBuf::from(DEFAULT_INI_DIRECTORY),
            charset: Some(DEFAULT_CHARSET.to_owned()),
            configs: HashMap::new(),
            ini_overwrite: false,
            aliases: HashMap::new(),
        }
    }
}

impl ConnectionConfig {
    pub fn new(ini_directory: impl Into<PathBuf>) -> Self {
        Self {
            ini_directory: ini_directory.into(),
            ..Self::default()
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| Error::Configuration(format!("invalid connection config: {e}")))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    pub fn with_charset(mut self, charset: Option<&str>) -> Self {
        self.charset = charset.map(str::to_owned);
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.ini_overwrite = overwrite;
        self
    }

    /// Set the overrides of one project (or [`WILDCARD`]).
    pub fn with_project_config(mut self, project: impl Into<String>, configs: Value) -> Self {
        self.configs.insert(project.into(), configs);
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.aliases.insert(alias.into(), path.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(charset) = &self.charset {
            if encoding_rs::Encoding::for_label(charset.as_bytes()).is_none() {
                return Err(Error::Configuration(format!("unknown charset '{charset}'")));
            }
        }
        if let Some(alias) = self.aliases.keys().find(|a| a.is_empty() || a.contains('/')) {
            return Err(Error::Configuration(format!("invalid alias name '{alias}'")));
        }
        Ok(())
    }

    /// Expand a leading `@alias` of `ini_directory`.
    pub fn resolve_ini_directory(&self) -> Result<PathBuf> {
        resolve_alias(&self.ini_directory, &self.aliases)
    }

    /// Overrides for `project`: its own entry, else the wildcard entry, else
    /// nothing. Entries are never merged key by key. `null` counts as absent.
    pub fn project_overrides(&self, project: &str) -> Result<ConfigMap> {
        let entry = self
            .configs
            .get(project)
            .filter(|v| !v.is_null())
            .map(|v| (project, v))
            .or_else(|| {
                self.configs
                    .get(WILDCARD)
                    .filter(|v| !v.is_null())
                    .map(|v| (WILDCARD, v))
            });

        match entry {
            None => Ok(ConfigMap::new()),
            Some((key, value)) => to_config_map(key, value),
        }
    }
}

fn to_config_map(key: &str, value: &Value) -> Result<ConfigMap> {
    let obj = value.as_object().ok_or_else(|| {
        Error::Configuration(format!("configs['{key}'] must be a key-value mapping"))
    })?;

    obj.iter()
        .map(|(name, v)| {
            let text = match v {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => {
                    return Err(Error::Configuration(format!(
                        "configs['{key}']['{name}'] must be a string, number or boolean"
                    )))
                }
            };
            Ok((name.clone(), text))
        })
        .collect()
}

fn resolve_alias(path: &Path, aliases: &HashMap<String, PathBuf>) -> Result<PathBuf> {
    let Some(text) = path.to_str().and_then(|p| p.strip_prefix('@')) else {
        return Ok(path.to_path_buf());
    };
    let (alias, rest) = text.split_once('/').unwrap_or((text, ""));

    let base = match aliases.get(alias) {
        Some(base) => base.clone(),
        None if alias == "config" => ProjectDirs::from("", "", "search_bridge")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or_else(|| Error::Configuration("unable to locate config dir".into()))?,
        None => return Err(Error::Configuration(format!("unknown path alias '@{alias}'"))),
    };

    Ok(if rest.is_empty() { base } else { base.join(rest) })
}
