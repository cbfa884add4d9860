//! A deterministic **in-process stand-in** for a search SDK.
//!
//! * Every driver/client/index/search call is appended to a shared call log as
//!   a short string (`"open:demo"`, `"index.clean"`, ...), so tests can assert
//!   exactly which native object received what.
//! * Documents handed to the index writer are kept in `updates`.
//! * After `fail_opening(name)`, opening `name` fails like a missing INI file.
//! * After `reject_charset(c)`, clients refuse `set_default_charset(c)`.
//! * `hold_opening(name)` parks the next open of `name` until the returned
//!   sender fires or is dropped.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use search_bridge::sdk::{
    Dispatch, IndexWriter, Reply, SdkError, SearchClient, SearchDriver, Searcher, Tokenizer,
};
use search_bridge::{ConfigMap, Document};
use serde_json::Value;

pub type CallLog = Arc<Mutex<Vec<String>>>;
pub type Updates = Arc<Mutex<Vec<(Document, bool)>>>;

#[derive(Clone, Default)]
pub struct FakeSdk {
    pub version: Option<&'static str>,
    pub fail_on: Arc<Mutex<Option<String>>>,
    pub bad_charset: Arc<Mutex<Option<String>>>,
    pub held: Arc<Mutex<Option<(String, Receiver<()>)>>>,
    pub calls: CallLog,
    pub updates: Updates,
    pub tokenizers_built: Arc<AtomicUsize>,
}

impl FakeSdk {
    pub fn new() -> Self {
        Self {
            version: Some("1.4.9"),
            ..Self::default()
        }
    }

    /// Make every later open of `project` fail.
    pub fn fail_opening(&self, project: &str) {
        *self.fail_on.lock().unwrap() = Some(project.to_owned());
    }

    /// Make every later `set_default_charset(charset)` fail.
    pub fn reject_charset(&self, charset: &str) {
        *self.bad_charset.lock().unwrap() = Some(charset.to_owned());
    }

    /// Block the next open of `project` until the returned sender is used.
    pub fn hold_opening(&self, project: &str) -> Sender<()> {
        let (release, wait) = mpsc::channel();
        *self.held.lock().unwrap() = Some((project.to_owned(), wait));
        release
    }

    pub fn driver(&self) -> Arc<dyn SearchDriver> {
        Arc::new(self.clone())
    }

    /// Snapshot of the call log.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn updates(&self) -> Vec<(Document, bool)> {
        self.updates.lock().unwrap().clone()
    }
}

fn log(calls: &CallLog, entry: impl Into<String>) {
    calls.lock().unwrap().push(entry.into());
}

fn stem(ini_file: &Path) -> String {
    ini_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl SearchDriver for FakeSdk {
    fn version(&self) -> Option<&str> {
        self.version
    }

    fn open(&self, ini_file: &Path) -> Result<Box<dyn SearchClient>, SdkError> {
        let project = stem(ini_file);
        log(&self.calls, format!("open:{project}"));
        let held = {
            let mut held = self.held.lock().unwrap();
            match held.as_ref() {
                Some((name, _)) if *name == project => held.take(),
                _ => None,
            }
        };
        if let Some((_, wait)) = held {
            let _ = wait.recv();
        }
        if self.fail_on.lock().unwrap().as_deref() == Some(project.as_str()) {
            return Err(SdkError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not found", ini_file.display()),
            )));
        }
        Ok(Box::new(FakeClient {
            project,
            calls: self.calls.clone(),
            bad_charset: self.bad_charset.lock().unwrap().clone(),
            index: Arc::new(FakeIndex {
                calls: self.calls.clone(),
                updates: self.updates.clone(),
            }),
            search: Arc::new(FakeSearch {
                calls: self.calls.clone(),
            }),
        }))
    }

    fn tokenizer(&self) -> Arc<dyn Tokenizer> {
        self.tokenizers_built.fetch_add(1, Ordering::SeqCst);
        Arc::new(WhitespaceTokenizer)
    }
}

pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_owned).collect()
    }
}

pub struct FakeClient {
    project: String,
    calls: CallLog,
    bad_charset: Option<String>,
    index: Arc<FakeIndex>,
    search: Arc<FakeSearch>,
}

impl SearchClient for FakeClient {
    fn set_configs(&mut self, configs: &ConfigMap, overwrite: bool) -> Result<(), SdkError> {
        let pairs: Vec<String> = configs.iter().map(|(k, v)| format!("{k}={v}")).collect();
        log(
            &self.calls,
            format!("set_configs:{}:overwrite={overwrite}", pairs.join(",")),
        );
        Ok(())
    }

    fn set_default_charset(&mut self, charset: &str) -> Result<(), SdkError> {
        log(&self.calls, format!("set_default_charset:{charset}"));
        if self.bad_charset.as_deref() == Some(charset) {
            return Err(SdkError::invalid_argument(format!("unknown charset {charset}")));
        }
        Ok(())
    }

    fn index(&self) -> Arc<dyn IndexWriter> {
        self.index.clone()
    }

    fn search(&self) -> Arc<dyn Searcher> {
        self.search.clone()
    }

    fn close(&self) -> Result<(), SdkError> {
        log(&self.calls, format!("close:{}", self.project));
        Ok(())
    }
}

impl Dispatch for FakeClient {
    fn operations(&self) -> &[&'static str] {
        &["get_name", "reset", "shared", "fail"]
    }

    fn invoke(&self, operation: &str, args: &[Value]) -> Result<Reply, SdkError> {
        log(&self.calls, format!("client.{operation}"));
        match operation {
            "get_name" => Ok(Reply::value(self.project.as_str())),
            "reset" => Ok(Reply::This),
            "shared" => Ok(Reply::value("client")),
            "fail" => Err(SdkError::Other(format!("native failure {args:?}"))),
            _ => unreachable!("undeclared operation {operation}"),
        }
    }
}

pub struct FakeIndex {
    calls: CallLog,
    updates: Updates,
}

impl IndexWriter for FakeIndex {
    fn update(&self, doc: &Document, add: bool) -> Result<(), SdkError> {
        log(&self.calls, format!("index.update:add={add}"));
        self.updates.lock().unwrap().push((doc.clone(), add));
        Ok(())
    }
}

impl Dispatch for FakeIndex {
    fn operations(&self) -> &[&'static str] {
        &["clean", "flush_index", "shared"]
    }

    fn invoke(&self, operation: &str, _args: &[Value]) -> Result<Reply, SdkError> {
        log(&self.calls, format!("index.{operation}"));
        match operation {
            "clean" => Ok(Reply::This),
            "flush_index" => Ok(Reply::value(true)),
            "shared" => Ok(Reply::value("index")),
            _ => unreachable!("undeclared operation {operation}"),
        }
    }
}

pub struct FakeSearch {
    calls: CallLog,
}

impl Searcher for FakeSearch {
    fn set_query(&self, query: &str) -> Result<(), SdkError> {
        log(&self.calls, format!("search.set_query:{query}"));
        Ok(())
    }

    fn search(&self, _query: Option<&str>) -> Result<Vec<Document>, SdkError> {
        log(&self.calls, "search.search");
        Ok(Vec::new())
    }

    fn count(&self, _query: Option<&str>) -> Result<u64, SdkError> {
        log(&self.calls, "search.count");
        Ok(3)
    }
}

impl Dispatch for FakeSearch {
    fn operations(&self) -> &[&'static str] {
        &["set_query", "count", "shared"]
    }

    fn invoke(&self, operation: &str, _args: &[Value]) -> Result<Reply, SdkError> {
        log(&self.calls, format!("search.{operation}"));
        match operation {
            "set_query" => Ok(Reply::This),
            "count" => Ok(Reply::value(3)),
            "shared" => Ok(Reply::value("search")),
            _ => unreachable!("undeclared operation {operation}"),
        }
    }
}
