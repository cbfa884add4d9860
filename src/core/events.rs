use std::sync::{Arc, PoisonError, RwLock};

/// Fired right before a project handle is created, refreshes included.
pub const EVENT_BEFORE_OPEN: &str = "beforeOpen";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenEvent<'a> {
    pub project: &'a str,
    pub refresh: bool,
}

impl OpenEvent<'_> {
    pub fn name(&self) -> &'static str {
        EVENT_BEFORE_OPEN
    }
}

pub type Observer = Arc<dyn Fn(&OpenEvent<'_>) + Send + Sync>;

/// Observers registered on a manager. Cloning shares the list.
#[derive(Clone, Default)]
pub struct Observers {
    inner: Arc<RwLock<Vec<Observer>>>,
}

impl Observers {
    pub fn subscribe(&self, observer: Observer) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    pub fn notify(&self, event: &OpenEvent<'_>) {
        // snapshot so observers may subscribe or use the manager
        let observers = self.inner.read().unwrap_or_else(PoisonError::into_inner).clone();
        for observer in &observers {
            observer(event);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers").field("len", &self.len()).finish()
    }
}
