use std::time::{Duration, Instant};

/// Single-slot deferred commit.
///
/// Scheduling replaces whatever was pending, so only the latest payload
/// is ever committed.
#[derive(Debug, Clone)]
pub struct DeferredCommit<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> DeferredCommit<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Cancel the pending commit (if any) and schedule `payload` for `at + delay`
    pub fn schedule(&mut self, at: Instant, payload: T) {
        self.pending = Some((at + self.delay, payload));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The pending payload, left in place
    pub fn peek(&self) -> Option<&T> {
        self.pending.as_ref().map(|(_, payload)| payload)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }

    /// Take the payload if its deadline has passed
    pub fn poll(&mut self, at: Instant) -> Option<T> {
        match self.pending {
            Some((deadline, _)) if at >= deadline => {
                self.pending.take().map(|(_, payload)| payload)
            }
            _ => None,
        }
    }

    /// Take the payload immediately regardless of the deadline
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(_, payload)| payload)
    }

    /// Drop the pending payload without committing it
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commits_after_delay() {
        let start = Instant::now();
        let mut slot = DeferredCommit::new(Duration::from_secs(2));
        slot.schedule(start, "draft");

        assert_eq!(slot.poll(start + Duration::from_millis(1999)), None);
        assert_eq!(slot.poll(start + Duration::from_secs(2)), Some("draft"));
        assert!(!slot.is_pending());
        assert_eq!(slot.poll(start + Duration::from_secs(10)), None);
    }

    #[test]
    fn test_reschedule_supersedes_earlier_payload() {
        let start = Instant::now();
        let mut slot = DeferredCommit::new(Duration::from_secs(2));
        slot.schedule(start, 1);
        slot.schedule(start + Duration::from_secs(1), 2);
        slot.schedule(start + Duration::from_millis(1500), 3);

        // the first deadline has passed but it was superseded
        assert_eq!(slot.poll(start + Duration::from_secs(2)), None);
        assert_eq!(slot.deadline(), Some(start + Duration::from_millis(3500)));
        assert_eq!(slot.poll(start + Duration::from_millis(3500)), Some(3));
        assert_eq!(slot.poll(start + Duration::from_secs(60)), None);
    }

    #[test]
    fn test_flush_and_cancel() {
        let start = Instant::now();
        let mut slot = DeferredCommit::new(Duration::from_secs(2));
        slot.schedule(start, "a");
        assert_eq!(slot.flush(), Some("a"));

        slot.schedule(start, "b");
        slot.cancel();
        assert_eq!(slot.poll(start + Duration::from_secs(5)), None);
    }
}
