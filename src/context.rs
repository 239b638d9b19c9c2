//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zi.
//! The Zi project belongs to the Dunimd project team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Export Context
//!
//! Collaborators a job borrows from its host: where errors are reported,
//! the model loader whose lazy loading is paused while the grid is filled,
//! and a cancellation token. Nothing here is global; each job gets the
//! context it was built with and releases every scope it opened when it ends.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Receives error messages destined for the host.
pub trait ZiErrorReporter: Send + Sync {
    fn report(&self, message: &str, is_fatal: bool);
}

/// Reports through the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZiLogReporter;

impl ZiErrorReporter for ZiLogReporter {
    fn report(&self, message: &str, is_fatal: bool) {
        if is_fatal {
            log::error!("{}", message);
        } else {
            log::warn!("{}", message);
        }
    }
}

/// Host model layer whose lazy relation loading can be switched off.
pub trait ZiModelLoader: Send + Sync {
    fn lazy_loading(&self) -> bool;

    fn set_lazy_loading(&self, enabled: bool);
}

/// Cooperative cancellation flag shared between a job and its caller.
#[derive(Clone, Debug, Default)]
pub struct ZiCancellation(Arc<AtomicBool>);

impl ZiCancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Restores the loader's previous lazy-loading state on drop.
#[must_use = "lazy loading is restored as soon as the guard is dropped"]
pub struct ZiLazyLoadGuard {
    loader: Option<Arc<dyn ZiModelLoader>>,
    previous: bool,
}

impl Drop for ZiLazyLoadGuard {
    fn drop(&mut self) {
        if let Some(loader) = &self.loader {
            loader.set_lazy_loading(self.previous);
            log::debug!("lazy loading restored to {}", self.previous);
        }
    }
}

#[derive(Clone)]
pub struct ZiExportContext {
    reporter: Arc<dyn ZiErrorReporter>,
    loader: Option<Arc<dyn ZiModelLoader>>,
    cancellation: ZiCancellation,
}

impl Default for ZiExportContext {
    fn default() -> Self {
        Self {
            reporter: Arc::new(ZiLogReporter),
            loader: None,
            cancellation: ZiCancellation::new(),
        }
    }
}

impl ZiExportContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ZiErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_loader(mut self, loader: Arc<dyn ZiModelLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn with_cancellation(mut self, cancellation: ZiCancellation) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn cancellation(&self) -> &ZiCancellation {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub fn report(&self, message: &str, is_fatal: bool) {
        self.reporter.report(message, is_fatal);
    }

    /// Turns lazy loading off until the returned guard is dropped.
    pub fn suspend_lazy_loading(&self) -> ZiLazyLoadGuard {
        match &self.loader {
            Some(loader) => {
                let previous = loader.lazy_loading();
                loader.set_lazy_loading(false);
                log::debug!("lazy loading suspended");
                ZiLazyLoadGuard {
                    loader: Some(Arc::clone(loader)),
                    previous,
                }
            }
            None => ZiLazyLoadGuard {
                loader: None,
                previous: false,
            },
        }
    }
}

impl fmt::Debug for ZiExportContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZiExportContext")
            .field("has_loader", &self.loader.is_some())
            .field("cancelled", &self.cancellation.is_cancelled())
            .finish()
    }
}
