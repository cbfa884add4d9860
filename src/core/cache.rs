use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, warn};

use super::errors::Result;
use super::project::ProjectHandle;

type Handles = HashMap<String, Arc<ProjectHandle>>;

/// Opened projects by name.
///
/// The maps sit behind `Arc`s so clones of the owning manager share one cache.
/// The handle map is only locked for lookups and inserts. Opens are serialised
/// per name by a separate open lock, so a name never has two live handles and
/// a slow open of one project does not hold up the others.
#[derive(Clone, Default)]
pub struct ProjectCache {
    handles: Arc<Mutex<Handles>>,
    opening: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl ProjectCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Handles> {
        self.handles.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn open_lock(&self, name: &str) -> Arc<Mutex<()>> {
        self.opening
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_owned())
            .or_default()
            .clone()
    }

    pub fn get(&self, name: &str) -> Option<Arc<ProjectHandle>> {
        self.lock().get(name).cloned()
    }

    /// Return the cached handle, or create one with `open`. With `refresh`
    /// set the cached handle is replaced and closed.
    ///
    /// `open` runs while the open lock of `name` is held, so it must not open
    /// `name` again.
    pub fn get_or_try_insert_with<F>(
        &self,
        name: &str,
        refresh: bool,
        open: F,
    ) -> Result<Arc<ProjectHandle>>
    where
        F: FnOnce() -> Result<ProjectHandle>,
    {
        if !refresh {
            if let Some(handle) = self.get(name) {
                debug!("Project '{}' served from cache", name);
                return Ok(handle);
            }
        }

        let slot = self.open_lock(name);
        let _opening = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if !refresh {
            // another caller may have finished opening while we waited
            if let Some(handle) = self.get(name) {
                return Ok(handle);
            }
        }

        let handle = Arc::new(open()?);
        let old = self.lock().insert(name.to_owned(), handle.clone());
        if let Some(old) = old {
            release(&old);
        }
        Ok(handle)
    }

    /// Remove and close the handle of `name`. Returns whether one was cached.
    pub fn invalidate(&self, name: &str) -> bool {
        let removed = self.lock().remove(name);
        match removed {
            Some(old) => {
                release(&old);
                true
            }
            None => false,
        }
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Close every handle and empty the cache.
    pub fn clear(&self) {
        let drained: Vec<_> = self.lock().drain().collect();
        for (_, handle) in drained {
            release(&handle);
        }
    }
}

fn release(handle: &ProjectHandle) {
    if let Err(e) = handle.close() {
        warn!("Closing project '{}' failed: {}", handle.name(), e);
    }
}
