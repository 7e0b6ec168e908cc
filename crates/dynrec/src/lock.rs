//! Lock discipline for [`Record`](crate::Record).

use std::ops::{Deref, DerefMut};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Which locks a record operation takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockMode {
    /// Only the record's own lock. Unrelated records never contend.
    #[default]
    PerInstance,
    /// The record's lock plus one process-wide lock shared by every record
    /// in this mode, so operations on different records are serialized too.
    Global,
}

static GLOBAL: RwLock<()> = parking_lot::const_rwlock(());

pub(crate) struct ReadGuard<'a, T> {
    // field order matters: the record lock is released before the global one
    inner: RwLockReadGuard<'a, T>,
    _global: Option<RwLockReadGuard<'static, ()>>,
}

pub(crate) struct WriteGuard<'a, T> {
    inner: RwLockWriteGuard<'a, T>,
    _global: Option<RwLockWriteGuard<'static, ()>>,
}

impl LockMode {
    pub(crate) fn read<T>(self, lock: &RwLock<T>) -> ReadGuard<'_, T> {
        let global = match self {
            LockMode::Global => Some(GLOBAL.read()),
            LockMode::PerInstance => None,
        };
        ReadGuard {
            inner: lock.read(),
            _global: global,
        }
    }

    pub(crate) fn write<T>(self, lock: &RwLock<T>) -> WriteGuard<'_, T> {
        let global = match self {
            LockMode::Global => Some(GLOBAL.write()),
            LockMode::PerInstance => None,
        };
        WriteGuard {
            inner: lock.write(),
            _global: global,
        }
    }
}

impl<T> Deref for ReadGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T> Deref for WriteGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T> DerefMut for WriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}
