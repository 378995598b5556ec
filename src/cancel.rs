// SPDX-License-Identifier: MIT OR Apache-2.0

//! Caller-initiated cancellation for catalog loads and searches

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::errors::{CatalogError, Result};

/// Cloneable flag shared between the caller and an in-flight operation
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub(crate) fn check(token: Option<&CancelToken>) -> Result<()> {
        match token {
            Some(token) if token.is_cancelled() => Err(CatalogError::Cancelled),
            _ => Ok(()),
        }
    }
}
