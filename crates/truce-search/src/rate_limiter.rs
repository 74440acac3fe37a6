//! Leaky-bucket rate limiting for the search/fetch toolset (§4.C1).
//!
//! Callers block cooperatively until the bucket has capacity; there are no
//! retries at this layer.

use std::sync::Mutex;
use std::time::{Duration, Instant};

struct State {
    tokens: f64,
    last_refill: Instant,
}

/// A token-bucket rate limiter shared across all tasks using a given
/// provider (§5 "Rate-limiters are shared across all tasks using a given
/// provider").
pub struct RateLimiter {
    rate_per_sec: f64,
    capacity: f64,
    state: Mutex<State>,
}

impl RateLimiter {
    /// Construct a limiter allowing `rate_per_sec` requests per second, with
    /// burst capacity equal to one second's worth of tokens.
    pub fn new(rate_per_sec: f64) -> Self {
        Self {
            rate_per_sec,
            capacity: rate_per_sec.max(1.0),
            state: Mutex::new(State {
                tokens: rate_per_sec.max(1.0),
                last_refill: Instant::now(),
            }),
        }
    }

    /// Block cooperatively until a token is available, then consume it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock().expect("rate limiter mutex poisoned");
                let now = Instant::now();
                let elapsed = now.duration_since(state.last_refill).as_secs_f64();
                state.tokens = (state.tokens + elapsed * self.rate_per_sec).min(self.capacity);
                state.last_refill = now;

                if state.tokens >= 1.0 {
                    state.tokens -= 1.0;
                    None
                } else {
                    let deficit = 1.0 - state.tokens;
                    Some(Duration::from_secs_f64(deficit / self.rate_per_sec))
                }
            };

            match wait {
                None => return,
                Some(duration) => tokio::time::sleep(duration).await,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn allows_burst_up_to_capacity() {
        let limiter = RateLimiter::new(2.0);
        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn throttles_beyond_capacity() {
        let limiter = RateLimiter::new(2.0);
        limiter.acquire().await;
        limiter.acquire().await;
        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(400));
    }
}
