//! Accessors over a host shared behind `Arc<parking_lot::RwLock<_>>`.
//!
//! The accessors themselves assume exclusive access to the container they
//! mutate. `SharedRecord` provides that by holding the write lock for each
//! call; values leave the lock as owned strings, and group containers are
//! only reachable inside a closure run under the lock.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::compiler::AccessorSet;
use crate::container::Container;
use crate::error::Result;
use crate::host::Host;

#[derive(Debug, Default)]
pub struct SharedRecord<H> {
    inner: Arc<RwLock<H>>,
}

impl<H> Clone for SharedRecord<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H> SharedRecord<H>
where
    H: Host,
{
    pub fn new(host: H) -> Self {
        Self {
            inner: Arc::new(RwLock::new(host)),
        }
    }

    pub fn from_arc(inner: Arc<RwLock<H>>) -> Self {
        Self { inner }
    }

    pub fn lock(&self) -> &Arc<RwLock<H>> {
        &self.inner
    }

    /// Reads a leaf, cloning the string out of the lock.
    pub fn get(&self, accessors: &AccessorSet, name: &str) -> Result<Option<String>> {
        let mut host = self.inner.write();
        Ok(accessors.get(&mut *host, name)?.map(str::to_owned))
    }

    /// Reads a leaf under the read lock without creating missing groups.
    pub fn peek(&self, accessors: &AccessorSet, name: &str) -> Result<Option<String>> {
        let host = self.inner.read();
        Ok(accessors.peek(&*host, name)?.map(str::to_owned))
    }

    pub fn set<V>(&self, accessors: &AccessorSet, name: &str, value: V) -> Result<()>
    where
        V: ToString,
    {
        let mut host = self.inner.write();
        accessors.set(&mut *host, name, value)
    }

    /// Runs `f` on a group's live container while holding the write lock.
    pub fn with_group<F, T>(&self, accessors: &AccessorSet, name: &str, f: F) -> Result<T>
    where
        F: FnOnce(Container<'_>) -> T,
    {
        let mut host = self.inner.write();
        let container = accessors.group_mut(&mut *host, name)?;
        Ok(f(container))
    }
}
