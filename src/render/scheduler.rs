use std::time::{Duration, Instant};

/// Cooldown between renders while edits keep arriving.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(35);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Cooling,
}

/// Leading-edge throttle with a trailing flush.
///
/// The first notification of a burst renders immediately and arms a timer.
/// While the timer is armed, notifications only overwrite a single pending
/// slot. When the timer fires the pending payload (if any) is rendered and
/// the timer is rearmed; an empty slot returns the scheduler to idle.
///
/// The timer is a deadline the owner polls with [`RenderScheduler::poll`].
/// It is never cancelled.
#[derive(Debug)]
pub struct RenderScheduler<T> {
    cooldown: Duration,
    deadline: Option<Instant>,
    pending: Option<T>,
}

impl<T> RenderScheduler<T> {
    pub const fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            deadline: None,
            pending: None,
        }
    }

    pub const fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub const fn state(&self) -> SchedulerState {
        if self.deadline.is_some() {
            SchedulerState::Cooling
        } else {
            SchedulerState::Idle
        }
    }

    /// When the armed timer fires, if one is armed.
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub const fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Report an edit. Returns the payload to render right now, if any.
    pub fn notify(&mut self, now: Instant, payload: T) -> Option<T> {
        if self.deadline.is_some() {
            if self.pending.replace(payload).is_some() {
                tracing::trace!("render coalesced");
                crate::perf::log_event("scheduler.coalesce", "replaced pending render");
            }
            return None;
        }
        self.deadline = Some(now + self.cooldown);
        Some(payload)
    }

    /// Fire the timer if it is due. Returns the payload to render, if any.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        if let Some(payload) = self.pending.take() {
            self.deadline = Some(now + self.cooldown);
            Some(payload)
        } else {
            self.deadline = None;
            None
        }
    }

    /// Time left until the timer fires, zero if overdue.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}

impl<T> Default for RenderScheduler<T> {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}
