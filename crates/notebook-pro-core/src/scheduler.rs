/// Debounced snapshot capture.
///
/// A single-shot deadline per document. Every content change pushes the
/// deadline out by the quiet interval; the host's event loop polls it and
/// captures once the document has been quiet long enough. Nothing here
/// blocks or spawns: arming and cancelling only update a field.
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct CaptureScheduler {
    interval: Duration,
    deadline: Option<Instant>,
}

impl CaptureScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// (Re)starts the countdown from `now`, replacing any pending deadline.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.interval);
    }

    /// Drops the pending deadline, if any.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// When the pending capture is due.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns true exactly once when the deadline has passed, disarming the
    /// scheduler.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(400);

    #[test]
    fn test_idle_scheduler_never_fires() {
        let mut scheduler = CaptureScheduler::new(INTERVAL);
        assert!(!scheduler.is_armed());
        assert!(!scheduler.poll(Instant::now() + Duration::from_secs(60)));
    }

    #[test]
    fn test_fires_once_after_interval() {
        let t0 = Instant::now();
        let mut scheduler = CaptureScheduler::new(INTERVAL);
        scheduler.arm(t0);
        assert!(!scheduler.poll(t0 + Duration::from_millis(399)));
        assert!(scheduler.poll(t0 + INTERVAL));
        assert!(!scheduler.poll(t0 + Duration::from_secs(5)));
        assert!(!scheduler.is_armed());
    }

    #[test]
    fn test_rearm_pushes_deadline_out() {
        let t0 = Instant::now();
        let mut scheduler = CaptureScheduler::new(INTERVAL);
        scheduler.arm(t0);
        scheduler.arm(t0 + Duration::from_millis(300));
        assert!(!scheduler.poll(t0 + Duration::from_millis(500)));
        assert_eq!(
            scheduler.next_deadline(),
            Some(t0 + Duration::from_millis(700))
        );
        assert!(scheduler.poll(t0 + Duration::from_millis(700)));
    }

    #[test]
    fn test_burst_fires_once() {
        let t0 = Instant::now();
        let mut scheduler = CaptureScheduler::new(INTERVAL);
        for i in 0..20 {
            scheduler.arm(t0 + Duration::from_millis(i * 50));
        }
        let mut fired = 0;
        for step in 0..100 {
            if scheduler.poll(t0 + Duration::from_millis(step * 50)) {
                fired += 1;
            }
        }
        assert_eq!(fired, 1);
    }

    #[test]
    fn test_cancel_discards_pending_fire() {
        let t0 = Instant::now();
        let mut scheduler = CaptureScheduler::new(INTERVAL);
        scheduler.arm(t0);
        scheduler.cancel();
        assert!(!scheduler.poll(t0 + INTERVAL));
        assert_eq!(scheduler.next_deadline(), None);
    }
}
