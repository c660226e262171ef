//! Periodic reclamation of expired cache entries.
//!
//! Native hosts call [`CacheSweeper::poll`] from their own loop. Browser builds hand the timer
//! to the page with `CacheSweeper::install_interval`, which [`crate::HouseholdContext`] does
//! when it starts sweeping.

use std::{cell::Cell, rc::Rc};

use serde_json::Value;

use crate::store::ExpiringStore;

/// Emitted after each completed sweep with the number of removed entries.
pub const CACHE_SWEPT_EVENT: &str = "cache:swept";

/// Single, non-re-entrant, stoppable sweeper over one store.
pub struct CacheSweeper {
    store: Rc<ExpiringStore>,
    interval_ms: u64,
    last_run_ms: Cell<u64>,
    sweeping: Cell<bool>,
    stopped: Cell<bool>,
    #[cfg(target_arch = "wasm32")]
    interval: Cell<Option<leptos::IntervalHandle>>,
}

impl CacheSweeper {
    /// Creates a sweeper whose first tick is due one interval from now.
    pub fn new(store: Rc<ExpiringStore>, interval_ms: u64) -> Self {
        let now_ms = store.now_ms();
        Self {
            store,
            interval_ms,
            last_run_ms: Cell::new(now_ms),
            sweeping: Cell::new(false),
            stopped: Cell::new(false),
            #[cfg(target_arch = "wasm32")]
            interval: Cell::new(None),
        }
    }

    /// Returns the configured interval.
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Returns whether [`CacheSweeper::stop`] has been called.
    pub fn is_stopped(&self) -> bool {
        self.stopped.get()
    }

    /// Sweeps when a full interval has elapsed since the last sweep.
    ///
    /// Returns the removed count, or `None` when nothing ran.
    pub fn poll(&self) -> Option<usize> {
        let elapsed = self
            .store
            .now_ms()
            .saturating_sub(self.last_run_ms.get());
        if elapsed < self.interval_ms {
            return None;
        }
        self.sweep_now()
    }

    /// Sweeps immediately unless stopped or already sweeping.
    pub fn sweep_now(&self) -> Option<usize> {
        if self.stopped.get() {
            return None;
        }
        if self.sweeping.replace(true) {
            leptos::logging::warn!("cache sweep skipped: previous sweep still running");
            return None;
        }

        let removed = self.store.clean_expired_cache();
        self.last_run_ms.set(self.store.now_ms());
        self.store
            .notifier()
            .emit(CACHE_SWEPT_EVENT, &Value::from(removed));
        self.sweeping.set(false);
        Some(removed)
    }

    /// Stops the sweeper. Every later tick is a no-op.
    pub fn stop(&self) {
        self.stopped.set(true);
        #[cfg(target_arch = "wasm32")]
        {
            if let Some(handle) = self.interval.take() {
                handle.clear();
            }
        }
    }

    /// Sweeps on every tick of a browser interval until stopped.
    ///
    /// Ticks sweep unconditionally, so timer jitter cannot push a sweep to the next tick.
    /// Installing twice is a no-op. The interval holds only a weak reference, so dropping the
    /// last strong reference also ends sweeping.
    ///
    /// # Errors
    ///
    /// Returns an error when the browser refuses to schedule the interval.
    #[cfg(target_arch = "wasm32")]
    pub fn install_interval(self: &Rc<Self>) -> Result<(), String> {
        if self.stopped.get() {
            return Ok(());
        }
        if self.interval.get().is_some() {
            return Ok(());
        }

        let weak = Rc::downgrade(self);
        let handle = leptos::set_interval_with_handle(
            move || {
                if let Some(sweeper) = weak.upgrade() {
                    sweeper.sweep_now();
                }
            },
            std::time::Duration::from_millis(self.interval_ms),
        )
        .map_err(|err| format!("cache sweeper interval install failed: {err:?}"))?;
        self.interval.set(Some(handle));
        Ok(())
    }
}

impl Drop for CacheSweeper {
    fn drop(&mut self) {
        self.stop();
    }
}
