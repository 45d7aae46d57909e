// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Async handle to the local registry database.
//!
//! rusqlite is synchronous, so the [`Database`] sits behind a tokio mutex.
//! Each method holds the lock only for its own statements, never across a
//! network call.
//!
//! A store opened with [`LocalStore::open_deferred`] touches the file only on
//! first use, so online work keeps going when the database is unusable.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use cr_core::{
    CachedRecord, Database, DeadLetter, Payload, PendingRegistration, RegistrationType, SyncLease,
};
use tokio::sync::Mutex;

use crate::error::Result;

/// Shared, cloneable handle to the local queue and cache.
#[derive(Clone)]
pub struct LocalStore {
    inner: Arc<Mutex<Handle>>,
}

struct Handle {
    db: Option<Database>,
    /// Where to open from while `db` is unset.
    path: Option<PathBuf>,
}

impl Handle {
    /// The open database, opening it first if needed.
    ///
    /// A failed open leaves the handle closed; the next call tries again.
    fn database(&mut self) -> cr_core::Result<&mut Database> {
        let db = match (self.db.take(), &self.path) {
            (Some(db), _) => db,
            (None, Some(path)) => Database::open(path)?,
            (None, None) => {
                return Err(cr_core::Error::InvalidInput(
                    "local store has no database".to_string(),
                ))
            }
        };
        Ok(self.db.insert(db))
    }
}

impl LocalStore {
    /// Open or create the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::from_database(Database::open(path)?))
    }

    /// A store that opens `path` on first use.
    ///
    /// Storage errors surface from the first operation instead of here.
    pub fn open_deferred(path: &Path) -> Self {
        LocalStore {
            inner: Arc::new(Mutex::new(Handle {
                db: None,
                path: Some(path.to_path_buf()),
            })),
        }
    }

    /// Wrap an already opened database.
    pub fn from_database(db: Database) -> Self {
        LocalStore {
            inner: Arc::new(Mutex::new(Handle {
                db: Some(db),
                path: None,
            })),
        }
    }

    /// An in-memory store (for testing).
    pub fn in_memory() -> Result<Self> {
        Ok(Self::from_database(Database::open_in_memory()?))
    }

    /// Run `op` against the database under the lock.
    async fn with_db<T>(
        &self,
        op: impl FnOnce(&mut Database) -> cr_core::Result<T> + Send,
    ) -> Result<T> {
        let mut handle = self.inner.lock().await;
        Ok(op(handle.database()?)?)
    }

    pub async fn enqueue(
        &self,
        kind: RegistrationType,
        payload: &Payload,
    ) -> Result<PendingRegistration> {
        self.with_db(|db| db.enqueue(kind, payload)).await
    }

    pub async fn list_pending(&self) -> Result<Vec<PendingRegistration>> {
        self.with_db(|db| db.list_pending()).await
    }

    pub async fn pending_count(&self) -> Result<usize> {
        self.with_db(|db| db.pending_count()).await
    }

    pub async fn remove_pending(&self, id: i64) -> Result<bool> {
        self.with_db(|db| db.remove_pending(id)).await
    }

    pub async fn record_rejection(&self, id: i64, error: &str) -> Result<u32> {
        self.with_db(|db| db.record_rejection(id, error)).await
    }

    pub async fn dead_letter(&self, id: i64, last_error: &str) -> Result<Option<DeadLetter>> {
        self.with_db(|db| db.dead_letter(id, last_error)).await
    }

    pub async fn list_dead_letters(&self) -> Result<Vec<DeadLetter>> {
        self.with_db(|db| db.list_dead_letters()).await
    }

    pub async fn requeue_dead_letter(&self, id: i64) -> Result<PendingRegistration> {
        self.with_db(|db| db.requeue_dead_letter(id)).await
    }

    pub async fn replace_cached(
        &self,
        kind: RegistrationType,
        records: &[CachedRecord],
    ) -> Result<()> {
        self.with_db(|db| db.replace_cached(kind, records)).await
    }

    pub async fn cached_by_type(&self, kind: RegistrationType) -> Result<Vec<CachedRecord>> {
        self.with_db(|db| db.cached_by_type(kind)).await
    }

    pub async fn has_cached(&self) -> Result<bool> {
        self.with_db(|db| db.has_cached()).await
    }

    pub async fn try_acquire_sync_lease(&self, holder: &str, lease: Duration) -> Result<bool> {
        self.with_db(|db| db.try_acquire_sync_lease(holder, lease)).await
    }

    pub async fn renew_sync_lease(&self, holder: &str, lease: Duration) -> Result<bool> {
        self.with_db(|db| db.renew_sync_lease(holder, lease)).await
    }

    pub async fn release_sync_lease(&self, holder: &str) -> Result<()> {
        self.with_db(|db| db.release_sync_lease(holder)).await
    }

    pub async fn current_sync_lease(&self) -> Result<Option<SyncLease>> {
        self.with_db(|db| db.current_sync_lease()).await
    }
}
