//! Ctrl-C handling: close whichever packet source is currently active.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use f1_telemetry_capture::CloseHandle;
use tracing::info;

use crate::error::CliError;

#[derive(Debug, Default)]
struct Inner {
    requested: AtomicBool,
    active: Mutex<Option<CloseHandle>>,
}

/// Shared shutdown request, set from the Ctrl-C handler.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    inner: Arc<Inner>,
}

impl Shutdown {
    /// Install the process Ctrl-C handler. Only one may be installed per
    /// process.
    ///
    /// # Errors
    ///
    /// [`CliError::Signal`] if a handler is already installed or the signal
    /// cannot be hooked.
    pub fn install() -> Result<Self, CliError> {
        let shutdown = Self::default();
        let handler = shutdown.clone();
        ctrlc::set_handler(move || {
            info!("interrupt received, closing source");
            handler.request();
        })?;
        Ok(shutdown)
    }

    pub fn request(&self) {
        self.inner.requested.store(true, Ordering::SeqCst);
        let active = self
            .inner
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = active.as_ref() {
            handle.close();
        }
    }

    pub fn is_requested(&self) -> bool {
        self.inner.requested.load(Ordering::SeqCst)
    }

    /// Close `handle` on the next request, replacing the previous one.
    /// Closes it at once if a request already happened.
    pub fn watch(&self, handle: CloseHandle) {
        let mut active = self
            .inner
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if self.is_requested() {
            handle.close();
        }
        *active = Some(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use f1_telemetry_capture::ReplaySource;

    fn handle() -> CloseHandle {
        ReplaySource::from_reader(std::io::empty()).close_handle()
    }

    #[test]
    fn request_closes_watched_handle() {
        let shutdown = Shutdown::default();
        let first = handle();
        let second = handle();
        shutdown.watch(first.clone());
        shutdown.watch(second.clone());
        shutdown.request();
        assert!(shutdown.is_requested());
        assert!(!first.is_closed(), "replaced handles are left alone");
        assert!(second.is_closed());
    }

    #[test]
    fn watch_after_request_closes_immediately() {
        let shutdown = Shutdown::default();
        shutdown.request();
        let late = handle();
        shutdown.watch(late.clone());
        assert!(late.is_closed());
    }
}
