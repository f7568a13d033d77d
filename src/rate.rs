//! Process-wide outbound rate gate for news searches.
//!
//! One token bucket with a single cell that refills every
//! `1s / calls_per_second`, so no more than `calls_per_second` calls start in
//! any one-second window, no matter how many requests share the gate.

use governor::{Quota, RateLimiter};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{DigestError, DigestResult};

type DirectLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

pub struct RateGate {
    limiter: DirectLimiter,
    calls_per_second: u32,
}

/// Shared handle; clone the `Arc`, never the gate.
pub type SharedRateGate = Arc<RateGate>;

impl RateGate {
    pub fn per_second(calls_per_second: u32) -> DigestResult<Self> {
        if calls_per_second == 0 {
            return Err(DigestError::Configuration(
                "news_calls_per_second must be > 0".into(),
            ));
        }
        let period = Duration::from_secs(1) / calls_per_second;
        let quota = Quota::with_period(period).ok_or_else(|| {
            DigestError::Configuration(format!("rate period too small: {period:?}"))
        })?;
        Ok(Self {
            limiter: RateLimiter::direct(quota),
            calls_per_second,
        })
    }

    pub fn shared(calls_per_second: u32) -> DigestResult<SharedRateGate> {
        Self::per_second(calls_per_second).map(Arc::new)
    }

    /// Wait until the next call may start.
    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
    }

    pub fn calls_per_second(&self) -> u32 {
        self.calls_per_second
    }
}

impl std::fmt::Debug for RateGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateGate")
            .field("calls_per_second", &self.calls_per_second)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rate_is_a_configuration_error() {
        assert!(matches!(
            RateGate::per_second(0),
            Err(DigestError::Configuration(_))
        ));
    }

    #[test]
    fn shared_gate_reports_its_rate() {
        let gate = RateGate::shared(5).unwrap();
        assert_eq!(gate.calls_per_second(), 5);
        assert_eq!(format!("{gate:?}"), "RateGate { calls_per_second: 5 }");
    }

    #[tokio::test]
    async fn second_call_waits_one_period() {
        let gate = RateGate::per_second(10).unwrap();
        let t0 = std::time::Instant::now();
        gate.acquire().await;
        gate.acquire().await;
        assert!(t0.elapsed() >= Duration::from_millis(90));
    }
}
