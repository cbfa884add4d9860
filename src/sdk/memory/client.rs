use std::sync::{Arc, RwLock};

use log::debug;
use serde_json::Value;

use super::arg_str;
use super::index::{MemoryIndex, Store};
use super::search::MemorySearch;
use crate::config::ConfigMap;
use crate::sdk::client::{Dispatch, IndexWriter, Reply, SearchClient, Searcher, Tokenizer};
use crate::sdk::errors::SdkError;
use crate::sdk::ini::IniDocument;

const OPERATIONS: &[&str] = &[
    "get_name",
    "get_config",
    "get_configs",
    "get_default_charset",
    "get_fields",
];

/// A project opened by [`super::MemoryDriver`].
pub struct MemoryClient {
    ini: IniDocument,
    charset: Option<String>,
    index: Arc<MemoryIndex>,
    search: Arc<MemorySearch>,
}

impl MemoryClient {
    pub fn new(ini: IniDocument, tokenizer: Arc<dyn Tokenizer>) -> Result<Self, SdkError> {
        let primary_key = ini
            .sections()
            .find(|(_, attrs)| attrs.get("type").map(String::as_str) == Some("id"))
            .map(|(name, _)| name.to_owned())
            .ok_or_else(|| SdkError::Other("missing the primary key field (type = id)".into()))?;

        let store = Arc::new(RwLock::new(Store {
            primary_key,
            docs: Vec::new(),
        }));
        let charset = ini.get("project.default_charset").map(str::to_owned);

        Ok(Self {
            index: Arc::new(MemoryIndex::new(store.clone())),
            search: Arc::new(MemorySearch::new(store, tokenizer)),
            ini,
            charset,
        })
    }

    pub fn name(&self) -> &str {
        self.ini.get("project.name").unwrap_or("")
    }

    pub fn config(&self, key: &str) -> Option<&str> {
        self.ini.get(key)
    }

    pub fn default_charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    pub fn fields(&self) -> Vec<&str> {
        self.ini.sections().map(|(name, _)| name).collect()
    }
}

impl SearchClient for MemoryClient {
    fn set_configs(&mut self, configs: &ConfigMap, overwrite: bool) -> Result<(), SdkError> {
        debug!(
            "Applying {} config overrides to '{}' (overwrite: {})",
            configs.len(),
            self.name(),
            overwrite
        );
        self.ini.apply(configs, overwrite);
        Ok(())
    }

    fn set_default_charset(&mut self, charset: &str) -> Result<(), SdkError> {
        if encoding_rs::Encoding::for_label(charset.as_bytes()).is_none() {
            return Err(SdkError::invalid_argument(format!("unknown charset '{charset}'")));
        }
        self.charset = Some(charset.to_owned());
        Ok(())
    }

    fn index(&self) -> Arc<dyn IndexWriter> {
        self.index.clone()
    }

    fn search(&self) -> Arc<dyn Searcher> {
        self.search.clone()
    }
}

impl Dispatch for MemoryClient {
    fn operations(&self) -> &[&'static str] {
        OPERATIONS
    }

    fn invoke(&self, operation: &str, args: &[Value]) -> Result<Reply, SdkError> {
        let reply = match operation {
            "get_name" => Value::from(self.name()),
            "get_config" => self
                .config(arg_str(args, 0, operation)?)
                .map_or(Value::Null, Value::from),
            "get_configs" => Value::Object(
                self.ini
                    .globals()
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::from(v.as_str())))
                    .collect(),
            ),
            "get_default_charset" => self.default_charset().map_or(Value::Null, Value::from),
            "get_fields" => Value::from(self.fields()),
            other => return Err(SdkError::Other(format!("unsupported client operation '{other}'"))),
        };
        Ok(Reply::Value(reply))
    }
}
