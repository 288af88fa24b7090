//! Circuit breaker around the landmark provider.
//!
//! A provider that keeps failing is skipped for a recovery period instead of
//! being called (and timing out) on every scheduled frame.

use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use tracing::{info, warn};

/// Circuit breaker states.
#[derive(Clone, Debug, PartialEq)]
pub enum CircuitState {
    /// Normal operation; counts consecutive failures
    Closed { failures: u32 },
    /// Failing fast
    Open { opened_at: Instant },
    /// Letting calls through to test recovery
    HalfOpen { success_count: u32 },
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed { .. } => "closed",
            CircuitState::Open { .. } => "open",
            CircuitState::HalfOpen { .. } => "half_open",
        }
    }
}

/// Shared breaker; clones observe the same state.
#[derive(Clone, Debug)]
pub struct CircuitBreaker {
    state: Arc<RwLock<CircuitState>>,
    failure_threshold: u32,
    recovery_timeout: Duration,
    success_threshold: u32,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, recovery_timeout: Duration, success_threshold: u32) -> Self {
        Self {
            state: Arc::new(RwLock::new(CircuitState::Closed { failures: 0 })),
            failure_threshold: failure_threshold.max(1),
            recovery_timeout,
            success_threshold: success_threshold.max(1),
        }
    }

    /// Whether a call may go through at `now`.
    pub fn allow(&self, now: Instant) -> bool {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        match *state {
            CircuitState::Closed { .. } | CircuitState::HalfOpen { .. } => true,
            CircuitState::Open { opened_at } => {
                if now.saturating_duration_since(opened_at) >= self.recovery_timeout {
                    info!("Inference circuit half-open, probing provider");
                    *state = CircuitState::HalfOpen { success_count: 0 };
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn success(&self) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        match *state {
            CircuitState::HalfOpen { success_count } => {
                let count = success_count + 1;
                if count >= self.success_threshold {
                    info!("Inference circuit closed");
                    *state = CircuitState::Closed { failures: 0 };
                } else {
                    *state = CircuitState::HalfOpen { success_count: count };
                }
            }
            CircuitState::Closed { failures } if failures > 0 => {
                *state = CircuitState::Closed { failures: 0 };
            }
            _ => {}
        }
    }

    pub fn failure(&self, now: Instant) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        match *state {
            CircuitState::Closed { failures } => {
                let failures = failures + 1;
                if failures >= self.failure_threshold {
                    warn!(
                        failures,
                        recovery_secs = self.recovery_timeout.as_secs_f64(),
                        "Inference circuit opened after repeated failures"
                    );
                    *state = CircuitState::Open { opened_at: now };
                } else {
                    *state = CircuitState::Closed { failures };
                }
            }
            CircuitState::HalfOpen { .. } => {
                warn!("Inference still failing, circuit reopened");
                *state = CircuitState::Open { opened_at: now };
            }
            CircuitState::Open { .. } => {}
        }
    }

    pub fn state(&self) -> CircuitState {
        self.state.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn reset(&self) {
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = CircuitState::Closed { failures: 0 };
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(5), 2)
    }
}
