use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};

pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Sliding-window limiter admitting at most `max_requests` per `window`.
///
/// The lock is held across prune, wait and append, so concurrent callers
/// queue behind one another and the window bound holds globally.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    admitted: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        let max_requests = (max_requests as usize).max(1);
        Self {
            max_requests,
            window,
            admitted: Mutex::new(VecDeque::with_capacity(max_requests)),
        }
    }

    pub fn per_minute(max_requests: u32) -> Self {
        Self::new(max_requests, DEFAULT_WINDOW)
    }

    /// Wait until one more request fits in the window, then record it.
    pub async fn acquire(&self) {
        let mut admitted = self.admitted.lock().await;
        self.prune(&mut admitted, Instant::now());

        if admitted.len() >= self.max_requests {
            if let Some(&oldest) = admitted.front() {
                let wake_at = oldest + self.window;
                if wake_at > Instant::now() {
                    tracing::debug!(
                        "Rate limit reached ({} requests per {:?}), waiting {:?}",
                        self.max_requests,
                        self.window,
                        wake_at - Instant::now()
                    );
                    sleep_until(wake_at).await;
                }
            }
            self.prune(&mut admitted, Instant::now());
        }

        admitted.push_back(Instant::now());
    }

    /// Requests admitted within the trailing window.
    pub async fn admitted_in_window(&self) -> usize {
        let mut admitted = self.admitted.lock().await;
        self.prune(&mut admitted, Instant::now());
        admitted.len()
    }

    fn prune(&self, admitted: &mut VecDeque<Instant>, now: Instant) {
        while let Some(&oldest) = admitted.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                admitted.pop_front();
            } else {
                break;
            }
        }
    }
}
