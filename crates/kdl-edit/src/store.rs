use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::AccessError;
use crate::object::Editable;
use crate::path::ObjectPath;
use crate::reload::{reload, ReloadReport};

/// Shared owner of a live configuration graph.
///
/// Cloning the store clones the handle, not the configuration. Every access
/// takes the lock for the duration of one closure.
#[derive(Clone)]
pub struct ConfigStore {
    inner: Arc<Mutex<Box<dyn Editable>>>,
}

impl ConfigStore {
    pub fn new<T: Editable>(config: T) -> Self {
        Self::from_boxed(Box::new(config))
    }

    pub fn from_boxed(config: Box<dyn Editable>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(config)),
        }
    }

    pub fn with_root<R>(&self, f: impl FnOnce(&dyn Editable) -> R) -> R {
        let guard = self.inner.lock();
        f(&**guard)
    }

    pub fn with_root_mut<R>(&self, f: impl FnOnce(&mut dyn Editable) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut **guard)
    }

    /// Run `f` against the object `path` points at.
    pub fn with_object<R>(
        &self,
        path: &ObjectPath,
        f: impl FnOnce(&dyn Editable) -> R,
    ) -> Result<R, AccessError> {
        let guard = self.inner.lock();
        let root: &dyn Editable = &**guard;
        let object = root
            .resolve(path.segments())
            .ok_or_else(|| AccessError::unresolved(path))?;
        Ok(f(object))
    }

    pub fn with_object_mut<R>(
        &self,
        path: &ObjectPath,
        f: impl FnOnce(&mut dyn Editable) -> R,
    ) -> Result<R, AccessError> {
        let mut guard = self.inner.lock();
        let root: &mut dyn Editable = &mut **guard;
        let object = root
            .resolve_mut(path.segments())
            .ok_or_else(|| AccessError::unresolved(path))?;
        Ok(f(object))
    }

    /// Borrow the root as its concrete type.
    pub fn with_typed<T: Editable, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let guard = self.inner.lock();
        let root: &dyn Editable = &**guard;
        root.downcast_ref::<T>().map(f)
    }

    /// Copy every value of `fresh` into the live graph, keeping nested
    /// instances (and therefore every built command) in place.
    pub fn reload_from(&self, fresh: &dyn Editable) -> ReloadReport {
        let mut guard = self.inner.lock();
        reload(&mut **guard, fresh)
    }

    pub fn type_name(&self) -> &'static str {
        self.with_root(|root| root.type_name())
    }
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let type_name = self.inner.try_lock().map(|guard| guard.type_name());
        f.debug_struct("ConfigStore")
            .field("type_name", &type_name)
            .finish()
    }
}
