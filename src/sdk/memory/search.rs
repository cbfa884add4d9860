use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use log::debug;
use serde_json::Value;

use super::index::SharedStore;
use super::{arg_str, arg_usize};
use crate::sdk::client::{Dispatch, Reply, Searcher, Tokenizer};
use crate::sdk::document::Document;
use crate::sdk::errors::SdkError;

const DEFAULT_LIMIT: usize = 10;

const OPERATIONS: &[&str] = &["set_query", "set_limit", "search", "count"];

#[derive(Debug)]
struct SearchState {
    query: Option<String>,
    limit: usize,
    offset: usize,
}

/// Stateful searcher: `set_query` and `set_limit` configure the next `search`.
pub struct MemorySearch {
    store: SharedStore,
    tokenizer: Arc<dyn Tokenizer>,
    state: Mutex<SearchState>,
}

/// One query term, optionally scoped to a field.
#[derive(Debug, PartialEq)]
struct Term {
    field: Option<String>,
    tokens: Vec<String>,
}

impl MemorySearch {
    pub(super) fn new(store: SharedStore, tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self {
            store,
            tokenizer,
            state: Mutex::new(SearchState {
                query: None,
                limit: DEFAULT_LIMIT,
                offset: 0,
            }),
        }
    }

    pub fn set_limit(&self, limit: usize, offset: usize) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.limit = limit;
        state.offset = offset;
    }

    fn effective_query(&self, query: Option<&str>) -> String {
        match query {
            Some(q) => q.to_owned(),
            None => self
                .state
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .query
                .clone()
                .unwrap_or_default(),
        }
    }

    fn parse(&self, query: &str) -> Vec<Term> {
        query
            .split_whitespace()
            .filter(|word| *word != "AND")
            .filter_map(|word| {
                let (field, text) = match word.split_once(':') {
                    Some((field, text)) if !field.is_empty() => (Some(field.to_owned()), text),
                    _ => (None, word),
                };
                let tokens = self.tokenizer.tokenize(text);
                (!tokens.is_empty()).then_some(Term { field, tokens })
            })
            .collect()
    }

    fn matches(&self, doc: &Document, terms: &[Term]) -> bool {
        terms.iter().all(|term| {
            let haystack: HashSet<String> = match &term.field {
                Some(field) => doc
                    .get(field)
                    .map(|v| self.tokenizer.tokenize(v))
                    .unwrap_or_default()
                    .into_iter()
                    .collect(),
                None => doc
                    .iter()
                    .flat_map(|(_, v)| self.tokenizer.tokenize(v))
                    .collect(),
            };
            term.tokens.iter().all(|t| haystack.contains(t))
        })
    }

    fn matching(&self, query: &str) -> Vec<Document> {
        let terms = self.parse(query);
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        store
            .docs
            .iter()
            .filter(|doc| self.matches(doc, &terms))
            .cloned()
            .collect()
    }
}

impl Searcher for MemorySearch {
    fn set_query(&self, query: &str) -> Result<(), SdkError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.query = Some(query.to_owned());
        Ok(())
    }

    fn search(&self, query: Option<&str>) -> Result<Vec<Document>, SdkError> {
        let query = self.effective_query(query);
        let (limit, offset) = {
            let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            (state.limit, state.offset)
        };
        let hits: Vec<Document> = self
            .matching(&query)
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect();
        debug!("Query '{}' returned {} documents", query, hits.len());
        Ok(hits)
    }

    fn count(&self, query: Option<&str>) -> Result<u64, SdkError> {
        let query = self.effective_query(query);
        Ok(self.matching(&query).len() as u64)
    }
}

impl Dispatch for MemorySearch {
    fn operations(&self) -> &[&'static str] {
        OPERATIONS
    }

    fn invoke(&self, operation: &str, args: &[Value]) -> Result<Reply, SdkError> {
        let query = || match args.first() {
            None | Some(Value::Null) => Ok(None),
            Some(_) => arg_str(args, 0, operation).map(Some),
        };
        match operation {
            "set_query" => {
                self.set_query(arg_str(args, 0, operation)?)?;
                Ok(Reply::This)
            }
            "set_limit" => {
                let limit = arg_usize(args, 0, operation)?
                    .ok_or_else(|| SdkError::invalid_argument("set_limit: limit is required"))?;
                let offset = arg_usize(args, 1, operation)?.unwrap_or(0);
                self.set_limit(limit, offset);
                Ok(Reply::This)
            }
            "search" => {
                let docs = self.search(query()?)?;
                Ok(Reply::Value(Value::Array(
                    docs.iter().map(Document::to_json).collect(),
                )))
            }
            "count" => Ok(Reply::value(self.count(query()?)?)),
            other => Err(SdkError::Other(format!("unsupported search operation '{other}'"))),
        }
    }
}
