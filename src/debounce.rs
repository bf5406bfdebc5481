use std::time::{Duration, Instant};

/// Quiescence window for switching the active template: short, a click is a
/// deliberate action.
pub const TEMPLATE_SWITCH_WINDOW: Duration = Duration::from_millis(100);
/// Quiescence window for free-text input: longer, typing comes in bursts.
pub const TEXT_INPUT_WINDOW: Duration = Duration::from_millis(300);

/// A lagged copy of a fast-changing value.
///
/// `set` records a candidate and arms the window; another `set` before the
/// deadline replaces the candidate and re-arms. Updates are never queued, so
/// at most one is in flight and the settled value only ever reflects the most
/// recent stable state. `poll` promotes the candidate once the window has
/// elapsed. Time is passed in by the caller; there are no timers or threads
/// behind this.
#[derive(Clone, Debug)]
pub struct Debounced<T> {
    window: Duration,
    settled: T,
    pending: Option<Pending<T>>,
}

#[derive(Clone, Debug)]
struct Pending<T> {
    value: T,
    deadline: Instant,
}

impl<T: PartialEq> Debounced<T> {
    pub fn new(initial: T, window: Duration) -> Self {
        Self {
            window,
            settled: initial,
            pending: None,
        }
    }

    /// The settled value, lagging the source by at most one window per burst.
    pub fn value(&self) -> &T {
        &self.settled
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Record a new source value. Replaces any pending candidate and restarts
    /// the quiescence window from `now`.
    pub fn set(&mut self, value: T, now: Instant) {
        if value == self.settled {
            // Source returned to the settled state before the window elapsed;
            // nothing left to promote.
            self.pending = None;
            return;
        }
        self.pending = Some(Pending {
            value,
            deadline: now + self.window,
        });
    }

    /// Promote the pending candidate if its window has elapsed. Returns
    /// whether the settled value changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.pending.take_if(|pending| now >= pending.deadline) {
            Some(pending) => {
                let changed = pending.value != self.settled;
                self.settled = pending.value;
                changed
            }
            None => false,
        }
    }

    /// Promote immediately, window or not. For explicit actions (publish,
    /// open preview) that must not show stale text.
    pub fn flush(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) => {
                let changed = pending.value != self.settled;
                self.settled = pending.value;
                changed
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(100);

    #[test]
    fn holds_value_until_window_elapses() {
        let t0 = Instant::now();
        let mut debounced = Debounced::new(0, WINDOW);
        debounced.set(1, t0);

        assert!(!debounced.poll(t0 + Duration::from_millis(99)));
        assert_eq!(*debounced.value(), 0);

        assert!(debounced.poll(t0 + Duration::from_millis(100)));
        assert_eq!(*debounced.value(), 1);
        assert!(!debounced.is_pending());
    }

    #[test]
    fn replacement_restarts_the_window() {
        let t0 = Instant::now();
        let mut debounced = Debounced::new(0, WINDOW);
        debounced.set(1, t0);
        debounced.set(2, t0 + Duration::from_millis(80));

        // Original deadline has passed, the replacement's has not.
        assert!(!debounced.poll(t0 + Duration::from_millis(120)));
        assert_eq!(*debounced.value(), 0);

        assert!(debounced.poll(t0 + Duration::from_millis(180)));
        assert_eq!(*debounced.value(), 2);
    }

    #[test]
    fn only_the_latest_value_is_ever_promoted() {
        let t0 = Instant::now();
        let mut debounced = Debounced::new(0, WINDOW);
        for i in 1..=5 {
            debounced.set(i, t0 + Duration::from_millis(i as u64 * 10));
        }
        assert!(debounced.poll(t0 + Duration::from_secs(1)));
        assert_eq!(*debounced.value(), 5);
    }

    #[test]
    fn returning_to_settled_cancels_the_pending_update() {
        let t0 = Instant::now();
        let mut debounced = Debounced::new(0, WINDOW);
        debounced.set(1, t0);
        debounced.set(0, t0 + Duration::from_millis(50));

        assert!(!debounced.is_pending());
        assert!(!debounced.poll(t0 + Duration::from_secs(1)));
        assert_eq!(*debounced.value(), 0);
    }

    #[test]
    fn flush_promotes_immediately() {
        let t0 = Instant::now();
        let mut debounced = Debounced::new(0, WINDOW);
        debounced.set(7, t0);

        assert!(debounced.flush());
        assert_eq!(*debounced.value(), 7);
        assert!(!debounced.flush());
    }

    #[test]
    fn poll_without_pending_is_a_no_op() {
        let mut debounced = Debounced::new(0, WINDOW);
        assert!(!debounced.poll(Instant::now()));
        assert_eq!(*debounced.value(), 0);
    }
}
