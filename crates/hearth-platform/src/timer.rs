use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Bookkeeping for the single pending idle-screen firing.
///
/// `deadline` is the instant every request is compared against. A weak
/// request re-arms the firing without moving it, so a weak caller can never
/// lock out a strong request that lands before the tracked deadline.
#[derive(Debug, Default)]
pub struct IdleTimer {
    deadline: Option<Instant>,
    pending: Option<JoinHandle<()>>,
    generation: u64,
}

impl IdleTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// True when `requested` falls before a deadline that has not passed
    /// yet. A passed deadline counts as no deadline.
    pub fn defers_to_existing(&self, now: Instant, requested: Instant) -> bool {
        matches!(self.deadline, Some(deadline) if deadline > now && requested < deadline)
    }

    /// Replace the pending firing with the one produced by `spawn`.
    ///
    /// `spawn` receives the generation the firing must report back through
    /// [`IdleTimer::fired`].
    pub fn arm<F>(&mut self, deadline: Instant, weak: bool, spawn: F)
    where
        F: FnOnce(u64) -> JoinHandle<()>,
    {
        self.abort_pending();
        if !weak {
            self.deadline = Some(deadline);
        }
        self.generation += 1;
        self.pending = Some(spawn(self.generation));
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
        self.abort_pending();
    }

    /// Record that a firing ran. Returns false for a firing that was
    /// superseded after it had already started.
    pub fn fired(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.pending = None;
        true
    }

    fn abort_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for IdleTimer {
    fn drop(&mut self) {
        self.abort_pending();
    }
}
