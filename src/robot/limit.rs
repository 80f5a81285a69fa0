//! The robot endpoint accepts at most 20 messages per minute.
//!
//! Rather than tracking a true sliding window, sends are counted and every
//! 20th checks how long it's been since the last check. If that's under a
//! minute we hold off for the remainder before letting the send through.

use std::time::Duration;
use tracing::debug;

#[cfg(not(test))]
use std::time::Instant;

#[cfg(test)]
use mock_instant::Instant;

const SENDS_PER_WINDOW: u64 = 20;
const WINDOW: Duration = Duration::from_secs(60);

#[derive(Default)]
pub struct RateLimiter {
    sent: u64,
    /// Unset until the first check, which therefore never holds off.
    window_start: Option<Instant>,
}

impl RateLimiter {
    pub fn new() -> Self {
        RateLimiter {
            sent: 0,
            window_start: None,
        }
    }

    /// Wait, if necessary, until another message may be sent. The caller must
    /// hold exclusive access for the whole call so that concurrent sends are
    /// counted one at a time.
    pub async fn acquire(&mut self) {
        if !self.record() {
            return;
        }

        if let Some(wait) = self.remaining() {
            debug!("Sending messages too fast, holding off for {:?}", wait);
            tokio::time::sleep(wait).await;
        }

        self.restart();
    }

    /// Count a send, returning whether it's one that must check the window.
    fn record(&mut self) -> bool {
        self.sent += 1;
        self.sent % SENDS_PER_WINDOW == 0
    }

    /// How much of the current window is left, if any.
    fn remaining(&self) -> Option<Duration> {
        let elapsed = self.window_start?.elapsed();
        WINDOW.checked_sub(elapsed).filter(|d| !d.is_zero())
    }

    fn restart(&mut self) {
        self.window_start = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mock_instant::MockClock;

    #[test]
    fn test_checks_every_twentieth() {
        let mut l = RateLimiter::new();

        let mut checks = Vec::new();
        for _ in 0..60 {
            if l.record() {
                checks.push(l.sent);
            }
        }

        assert_eq!(checks, vec![20, 40, 60]);
    }

    #[test]
    fn test_first_check_never_waits() {
        let l = RateLimiter::new();
        assert_eq!(l.remaining(), None);
    }

    #[test]
    fn test_remaining_within_window() {
        let mut l = RateLimiter::new();
        l.restart();

        MockClock::advance(Duration::from_secs(45));
        assert_eq!(l.remaining(), Some(Duration::from_secs(15)));

        MockClock::advance(Duration::from_secs(15));
        assert_eq!(l.remaining(), None);

        MockClock::advance(Duration::from_secs(600));
        assert_eq!(l.remaining(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_holds_off_on_fast_sends() {
        let mut l = RateLimiter::new();

        let t0 = tokio::time::Instant::now();
        for _ in 0..39 {
            l.acquire().await;
        }
        assert_eq!(t0.elapsed(), Duration::ZERO);

        MockClock::advance(Duration::from_secs(20));
        l.acquire().await;

        // The mocked clock doesn't move with tokio's, so the full remainder
        // is slept.
        assert!(t0.elapsed() >= Duration::from_secs(40));
        assert_eq!(l.sent, 40);
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_passes_after_window() {
        let mut l = RateLimiter::new();

        for _ in 0..20 {
            l.acquire().await;
        }

        MockClock::advance(Duration::from_secs(61));

        let t0 = tokio::time::Instant::now();
        for _ in 0..20 {
            l.acquire().await;
        }
        assert_eq!(t0.elapsed(), Duration::ZERO);
    }
}
