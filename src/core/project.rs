use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{Error, Result};
use crate::config::ConfigMap;
use crate::sdk::client::{IndexWriter, Reply, SearchClient, SearchDriver, Searcher, Tokenizer};
use crate::sdk::document::{Document, DocumentData, Fields};
use crate::sdk::errors::SdkError;

const TYPE_NAME: &str = "ProjectHandle";

/// Everything needed to open one project.
#[derive(Debug, Clone, Default)]
pub struct ProjectOptions {
    pub name: String,
    pub ini_file: PathBuf,
    pub charset: Option<String>,
    pub overrides: ConfigMap,
    pub overwrite: bool,
}

/// The part of a handle that survives serialization. Overrides and the
/// overwrite policy are not kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedHandleState {
    pub ini_file: PathBuf,
    pub charset: Option<String>,
}

/// Outcome of [`ProjectHandle::call`].
#[derive(Debug)]
pub enum Forwarded<'a> {
    /// The callee returned itself; the handle stands in for it so calls chain.
    Handle(&'a ProjectHandle),
    Value(Value),
}

impl Forwarded<'_> {
    pub fn is_handle(&self) -> bool {
        matches!(self, Forwarded::Handle(_))
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Forwarded::Value(v) => Some(v),
            Forwarded::Handle(_) => None,
        }
    }
}

/// One opened search project.
///
/// Wraps the SDK client and exposes its tokenizer, index writer and searcher.
/// Anything else is reached through [`ProjectHandle::call`], which tries the
/// client, then the index writer, then the searcher.
pub struct ProjectHandle {
    name: String,
    ini_file: PathBuf,
    charset: Option<String>,
    overrides: ConfigMap,
    driver: Arc<dyn SearchDriver>,
    client: Box<dyn SearchClient>,
    tokenizer: OnceCell<Arc<dyn Tokenizer>>,
    closed: AtomicBool,
}

impl ProjectHandle {
    /// Open the client for `options.ini_file`. When a charset is set, non-empty
    /// overrides are applied first, then the charset becomes the default.
    pub fn open(options: ProjectOptions, driver: Arc<dyn SearchDriver>) -> Result<Self> {
        let ProjectOptions {
            name,
            ini_file,
            charset,
            overrides,
            overwrite,
        } = options;

        let open_err = |source| Error::Open {
            ini_file: ini_file.clone(),
            source,
        };

        info!("Opening search project '{}' from {:?}", name, ini_file);
        let mut client = driver.open(&ini_file).map_err(open_err)?;
        if let Err(source) = configure(client.as_mut(), charset.as_deref(), &overrides, overwrite) {
            if let Err(e) = client.close() {
                warn!("Closing half-opened project '{}' failed: {}", name, e);
            }
            return Err(open_err(source));
        }

        Ok(Self {
            name,
            ini_file,
            charset,
            overrides,
            driver,
            client,
            tokenizer: OnceCell::new(),
            closed: AtomicBool::new(false),
        })
    }

    /// Reopen a handle from its persisted state. The project name is the INI
    /// file stem; no overrides are applied.
    pub fn restore(state: PersistedHandleState, driver: Arc<dyn SearchDriver>) -> Result<Self> {
        let name = project_name_of(&state.ini_file);
        Self::open(
            ProjectOptions {
                name,
                ini_file: state.ini_file,
                charset: state.charset,
                overrides: ConfigMap::new(),
                overwrite: false,
            },
            driver,
        )
    }

    pub fn persist(&self) -> PersistedHandleState {
        PersistedHandleState {
            ini_file: self.ini_file.clone(),
            charset: self.charset.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ini_file(&self) -> &Path {
        &self.ini_file
    }

    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    /// Overrides this handle was opened with.
    pub fn overrides(&self) -> &ConfigMap {
        &self.overrides
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(Error::Closed(self.name.clone()));
        }
        Ok(())
    }

    pub fn client(&self) -> Result<&dyn SearchClient> {
        self.ensure_open()?;
        Ok(self.client.as_ref())
    }

    /// The SDK's default tokenizer, built on first use.
    pub fn tokenizer(&self) -> Result<Arc<dyn Tokenizer>> {
        self.ensure_open()?;
        Ok(self.tokenizer.get_or_init(|| self.driver.tokenizer()).clone())
    }

    pub fn index_writer(&self) -> Result<Arc<dyn IndexWriter>> {
        self.ensure_open()?;
        Ok(self.client.index())
    }

    pub fn searcher(&self) -> Result<Arc<dyn Searcher>> {
        self.ensure_open()?;
        Ok(self.client.search())
    }

    /// A new document in this project's charset.
    pub fn create_document(&self, fields: Option<Fields>) -> Document {
        match fields {
            Some(fields) => Document::with_fields(fields, self.charset()),
            None => Document::new(self.charset()),
        }
    }

    /// Add a document without checking for primary key conflicts.
    pub fn add(&self, data: impl Into<DocumentData>) -> Result<()> {
        self.update(data, true)
    }

    /// Add or replace a document. Raw fields are wrapped with this project's
    /// charset first.
    pub fn update(&self, data: impl Into<DocumentData>, insert_only: bool) -> Result<()> {
        let index = self.index_writer()?;
        let doc = match data.into() {
            DocumentData::Document(doc) => doc,
            DocumentData::Fields(fields) => self.create_document(Some(fields)),
        };
        index.update(&doc, insert_only)?;
        Ok(())
    }

    /// Forward `operation` to the first of client, index writer and searcher
    /// that declares it.
    pub fn call(&self, operation: &str, args: &[Value]) -> Result<Forwarded<'_>> {
        self.ensure_open()?;

        let (target, reply) = if self.client.supports(operation) {
            ("client", self.client.invoke(operation, args)?)
        } else {
            let index = self.client.index();
            if index.supports(operation) {
                ("index", index.invoke(operation, args)?)
            } else {
                let search = self.client.search();
                if search.supports(operation) {
                    ("search", search.invoke(operation, args)?)
                } else {
                    return Err(Error::MethodNotFound {
                        type_name: TYPE_NAME,
                        operation: operation.to_owned(),
                    });
                }
            }
        };
        debug!("{}::{}() forwarded to {} of '{}'", TYPE_NAME, operation, target, self.name);

        Ok(match reply {
            Reply::This => Forwarded::Handle(self),
            Reply::Value(value) => Forwarded::Value(value),
        })
    }

    /// Release the client. Later calls fail with [`Error::Closed`].
    pub fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        info!("Closing search project '{}'", self.name);
        self.client.close()?;
        Ok(())
    }
}

impl Drop for ProjectHandle {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Closing project '{}' on drop failed: {}", self.name, e);
        }
    }
}

impl std::fmt::Debug for ProjectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(TYPE_NAME)
            .field("name", &self.name)
            .field("ini_file", &self.ini_file)
            .field("charset", &self.charset)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Apply overrides and the default charset to a freshly opened client. Both
/// are skipped when no charset is configured.
fn configure(
    client: &mut dyn SearchClient,
    charset: Option<&str>,
    overrides: &ConfigMap,
    overwrite: bool,
) -> std::result::Result<(), SdkError> {
    let Some(charset) = charset else {
        return Ok(());
    };
    if !overrides.is_empty() {
        client.set_configs(overrides, overwrite)?;
    }
    client.set_default_charset(charset)
}

fn project_name_of(ini_file: &Path) -> String {
    ini_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
