//! Debounce and throttle primitives driven by an injected clock.
//!
//! Nothing here sleeps or spawns; owners call `take_ready(now_ms)` from their
//! poll loop and act on whatever comes back.

/// Fires the latest queued value once `delay_ms` has passed without another
/// queue.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay_ms: u64,
    pending: Option<(T, u64)>,
}

impl<T> Debouncer<T> {
    pub const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    /// Queue `value`, replacing any pending one and restarting the quiet
    /// period.
    pub fn queue(&mut self, value: T, now_ms: u64) {
        self.pending = Some((value, now_ms));
    }

    pub fn take_ready(&mut self, now_ms: u64) -> Option<T> {
        let queued_at = self.pending.as_ref()?.1;
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending.take().map(|(value, _)| value)
        } else {
            None
        }
    }

    /// When the pending value becomes ready.
    pub fn deadline(&self) -> Option<u64> {
        self.pending
            .as_ref()
            .map(|(_, queued_at)| queued_at.saturating_add(self.delay_ms))
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Trailing-edge throttle: the first value opens a window of `interval_ms`,
/// later values only replace the payload, and the latest payload fires when
/// the window closes.
#[derive(Debug, Clone)]
pub struct Throttle<T> {
    interval_ms: u64,
    pending: Option<T>,
    fire_at: u64,
}

impl<T> Throttle<T> {
    pub const fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            pending: None,
            fire_at: 0,
        }
    }

    pub fn queue(&mut self, value: T, now_ms: u64) {
        if self.pending.is_none() {
            self.fire_at = now_ms.saturating_add(self.interval_ms);
        }
        self.pending = Some(value);
    }

    pub fn take_ready(&mut self, now_ms: u64) -> Option<T> {
        if now_ms >= self.fire_at {
            self.pending.take()
        } else {
            None
        }
    }

    pub fn deadline(&self) -> Option<u64> {
        self.pending.as_ref().map(|_| self.fire_at)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
