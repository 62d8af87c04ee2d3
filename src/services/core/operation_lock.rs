//! Global Operation Lock for pipelines touching the content directory.
//!
//! Extraction, packaging and build-dir resets all touch the same subtree, so a
//! single slot is shared by every kind: at most one of them runs at a time.
//! A request made while the slot is held is rejected, never queued.

use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::types::errors::AppError;

/// Operations that compete for the content directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum JobKind {
    Extraction,
    Packaging,
    Reset,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::Extraction => write!(f, "Extraction"),
            JobKind::Packaging => write!(f, "Packaging"),
            JobKind::Reset => write!(f, "Reset"),
        }
    }
}

pub struct OperationLock {
    lock: Arc<AsyncMutex<()>>,
    active: Arc<Mutex<Option<JobKind>>>,
}

/// Held for the lifetime of one job. Dropping it frees the slot.
pub struct OperationGuard {
    kind: JobKind,
    active: Arc<Mutex<Option<JobKind>>>,
    _guard: OwnedMutexGuard<()>,
}

impl OperationGuard {
    pub fn kind(&self) -> JobKind {
        self.kind
    }
}

impl Drop for OperationGuard {
    fn drop(&mut self) {
        *self
            .active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }
}

impl OperationLock {
    pub fn new() -> Self {
        Self {
            lock: Arc::new(AsyncMutex::new(())),
            active: Arc::new(Mutex::new(None)),
        }
    }
}

impl Default for OperationLock {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationLock {
    /// Claim the slot immediately or fail with `AppError::Busy` naming the
    /// job that currently holds it.
    pub fn try_acquire(&self, kind: JobKind) -> Result<OperationGuard, AppError> {
        match self.lock.clone().try_lock_owned() {
            Ok(guard) => Ok(self.register(kind, guard)),
            Err(_) => Err(self.busy_error()),
        }
    }

    /// Kind of the job currently holding the slot, if any.
    pub fn active(&self) -> Option<JobKind> {
        *self
            .active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn register(&self, kind: JobKind, guard: OwnedMutexGuard<()>) -> OperationGuard {
        *self
            .active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(kind);
        OperationGuard {
            kind,
            active: self.active.clone(),
            _guard: guard,
        }
    }

    fn busy_error(&self) -> AppError {
        let label = self
            .active()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "Operation".to_string());
        AppError::Busy(label)
    }
}

#[cfg(test)]
#[path = "tests/operation_lock_tests.rs"]
mod tests;
