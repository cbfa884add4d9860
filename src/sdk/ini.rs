//! Project INI files as consumed by search SDK clients.
//!
//! ```ini
//! project.name = demo
//! project.default_charset = utf-8
//! server.index = 8383
//!
//! [pid]
//! type = id
//!
//! [subject]
//! type = title
//! ```
//!
//! Top-level entries may carry dotted keys. Every `[section]` describes one
//! field of the project schema.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;

use super::errors::SdkError;
use crate::config::ConfigMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    globals: ConfigMap,
    sections: IndexMap<String, ConfigMap>,
}

impl IniDocument {
    pub fn load(path: &Path) -> Result<Self, SdkError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, SdkError> {
        let mut doc = Self::default();
        let mut current: Option<String> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(rest) = line.strip_prefix('[') {
                let name = rest.strip_suffix(']').ok_or_else(|| SdkError::Ini {
                    line: idx + 1,
                    message: "unterminated section header".into(),
                })?;
                let name = name.trim();
                if name.is_empty() {
                    return Err(SdkError::Ini {
                        line: idx + 1,
                        message: "empty section name".into(),
                    });
                }
                doc.sections.entry(name.to_owned()).or_default();
                current = Some(name.to_owned());
                continue;
            }

            let (key, value) = line.split_once('=').ok_or_else(|| SdkError::Ini {
                line: idx + 1,
                message: format!("expected `key = value`, got `{line}`"),
            })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(SdkError::Ini {
                    line: idx + 1,
                    message: "missing key".into(),
                });
            }
            let value = unquote(value.trim());

            let target = match &current {
                Some(section) => doc.sections.entry(section.clone()).or_default(),
                None => &mut doc.globals,
            };
            target.insert(key.to_owned(), value.to_owned());
        }

        Ok(doc)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.globals.get(key).map(String::as_str)
    }

    pub fn globals(&self) -> &ConfigMap {
        &self.globals
    }

    pub fn section(&self, name: &str) -> Option<&ConfigMap> {
        self.sections.get(name)
    }

    pub fn sections(&self) -> impl Iterator<Item = (&str, &ConfigMap)> {
        self.sections.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merge `overrides` into the top-level entries.
    pub fn apply(&mut self, overrides: &ConfigMap, overwrite: bool) {
        for (key, value) in overrides {
            if overwrite || !self.globals.contains_key(key) {
                self.globals.insert(key.clone(), value.clone());
            }
        }
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
