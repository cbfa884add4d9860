use std::sync::{Arc, PoisonError, RwLock};

use log::debug;
use serde_json::Value;

use super::arg_str;
use crate::sdk::client::{Dispatch, IndexWriter, Reply};
use crate::sdk::document::Document;
use crate::sdk::errors::SdkError;

/// Documents of one project plus the schema bits the index needs.
#[derive(Debug, Default)]
pub(super) struct Store {
    pub(super) primary_key: String,
    pub(super) docs: Vec<Document>,
}

pub(super) type SharedStore = Arc<RwLock<Store>>;

pub struct MemoryIndex {
    store: SharedStore,
}

const OPERATIONS: &[&str] = &["clean", "delete", "flush_index"];

impl MemoryIndex {
    pub(super) fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Drop every document of the project.
    pub fn clean(&self) {
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        debug!("Cleaning {} documents", store.docs.len());
        store.docs.clear();
    }

    /// Remove documents whose primary key is in `keys`; returns how many went.
    pub fn delete(&self, keys: &[&str]) -> usize {
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        let pk = store.primary_key.clone();
        let before = store.docs.len();
        store
            .docs
            .retain(|doc| doc.get(&pk).map_or(true, |v| !keys.contains(&v)));
        before - store.docs.len()
    }

    pub fn len(&self) -> usize {
        self.store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .docs
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IndexWriter for MemoryIndex {
    fn update(&self, doc: &Document, add: bool) -> Result<(), SdkError> {
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        let pk = store.primary_key.clone();
        let key = doc
            .get(&pk)
            .ok_or_else(|| SdkError::invalid_argument(format!("missing primary key field '{pk}'")))?
            .to_owned();

        if !add {
            store.docs.retain(|d| d.get(&pk) != Some(key.as_str()));
        }
        debug!("Indexing document {}={} (add: {})", pk, key, add);
        store.docs.push(doc.clone());
        Ok(())
    }
}

impl Dispatch for MemoryIndex {
    fn operations(&self) -> &[&'static str] {
        OPERATIONS
    }

    fn invoke(&self, operation: &str, args: &[Value]) -> Result<Reply, SdkError> {
        match operation {
            "clean" => {
                self.clean();
                Ok(Reply::This)
            }
            "delete" => {
                let keys = (0..args.len())
                    .map(|i| arg_str(args, i, operation))
                    .collect::<Result<Vec<_>, _>>()?;
                self.delete(&keys);
                Ok(Reply::This)
            }
            // nothing is buffered in memory
            "flush_index" => Ok(Reply::value(true)),
            other => Err(SdkError::Other(format!("unsupported index operation '{other}'"))),
        }
    }
}
