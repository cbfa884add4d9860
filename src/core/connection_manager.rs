use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};

use super::cache::ProjectCache;
use super::errors::{Error, Result};
use super::events::{OpenEvent, Observers};
use super::project::{ProjectHandle, ProjectOptions};
use crate::config::ConnectionConfig;
use crate::sdk::client::SearchDriver;

/// Manages the search projects of one application.
///
/// Projects are opened lazily from `{ini_directory}/{name}.ini` on first use and
/// cached by name. Cloning a `ConnectionManager` is cheap and the clones share
/// the cache, the observers and the driver, so one manager can be handed to
/// every request handler.
#[derive(Clone)]
pub struct ConnectionManager {
    config: Arc<ConnectionConfig>,
    ini_directory: PathBuf,
    driver: Arc<dyn SearchDriver>,
    cache: ProjectCache,
    observers: Observers,
}

impl ConnectionManager {
    /// Validate `config`, resolve its `@alias` and bind it to `driver`.
    pub fn new(config: ConnectionConfig, driver: Arc<dyn SearchDriver>) -> Result<Self> {
        config.validate()?;
        let ini_directory = config.resolve_ini_directory()?;
        info!("Search projects are read from {:?}", ini_directory);

        Ok(Self {
            config: Arc::new(config),
            ini_directory,
            driver,
            cache: ProjectCache::new(),
            observers: Observers::default(),
        })
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// INI directory with aliases expanded.
    pub fn ini_directory(&self) -> &Path {
        &self.ini_directory
    }

    pub fn ini_file(&self, name: &str) -> PathBuf {
        self.ini_directory.join(format!("{name}.ini"))
    }

    /// Version of the underlying SDK.
    pub fn version(&self) -> Result<String> {
        self.driver
            .version()
            .map(str::to_owned)
            .ok_or_else(|| Error::Configuration("search SDK version is not available".into()))
    }

    /// Register an observer for [`super::events::EVENT_BEFORE_OPEN`].
    ///
    /// Observers run on the opening thread before the handle exists. They may use
    /// this manager, but must not open the project being announced.
    pub fn on_before_open<F>(&self, observer: F)
    where
        F: Fn(&OpenEvent<'_>) + Send + Sync + 'static,
    {
        self.observers.subscribe(Arc::new(observer));
    }

    /// Shorthand for `get_project(name, false)`.
    pub fn project(&self, name: &str) -> Result<Arc<ProjectHandle>> {
        self.get_project(name, false)
    }

    /// Get the handle of project `name`, opening it if it is not cached yet.
    /// With `force_refresh` a new handle replaces the cached one, which is closed.
    pub fn get_project(&self, name: &str, force_refresh: bool) -> Result<Arc<ProjectHandle>> {
        self.cache
            .get_or_try_insert_with(name, force_refresh, || self.open_project(name, force_refresh))
    }

    /// The cached handle of `name`, without opening anything.
    pub fn cached(&self, name: &str) -> Option<Arc<ProjectHandle>> {
        self.cache.get(name)
    }

    /// Drop the cached handle of `name`. Returns whether one was cached.
    pub fn invalidate(&self, name: &str) -> bool {
        self.cache.invalidate(name)
    }

    pub fn project_names(&self) -> Vec<String> {
        self.cache.names()
    }

    /// Close every cached project.
    pub fn shutdown(&self) {
        debug!("Shutting down {} cached projects", self.cache.len());
        self.cache.clear();
    }

    fn open_project(&self, name: &str, refresh: bool) -> Result<ProjectHandle> {
        self.observers.notify(&OpenEvent {
            project: name,
            refresh,
        });

        let options = ProjectOptions {
            name: name.to_owned(),
            ini_file: self.ini_file(name),
            charset: self.config.charset.clone(),
            overrides: self.config.project_overrides(name)?,
            overwrite: self.config.ini_overwrite,
        };
        ProjectHandle::open(options, self.driver.clone())
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("ini_directory", &self.ini_directory)
            .field("projects", &self.cache.names())
            .field("observers", &self.observers)
            .finish()
    }
}
