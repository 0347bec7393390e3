//! Bounded polling wait for the reader to go idle.
//!
//! Configuration writes are refused by the reader while inventory runs. The
//! gate polls the shared busy flag at a fixed interval and gives up after a
//! fixed number of checks. There is no wake-up signal and no cancellation.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace};

use crate::state::SharedState;

/// Outcome of a readiness wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// The reader was idle at check number `attempt` (zero-based).
    Ready { attempt: u32 },

    /// The reader was busy at every one of `attempts` checks.
    TimedOut { attempts: u32 },
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

/// Read-only view of the busy flag with a bounded idle wait.
#[derive(Debug, Clone)]
pub struct ReadinessGate {
    state: Arc<SharedState>,
    max_attempts: u32,
    poll_interval: Duration,
}

impl ReadinessGate {
    /// Create a gate with a default polling policy.
    pub fn new(state: Arc<SharedState>, max_attempts: u32, poll_interval: Duration) -> Self {
        Self {
            state,
            max_attempts,
            poll_interval,
        }
    }

    /// Non-blocking read of the busy flag.
    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    /// Wait with the gate's default policy.
    pub async fn wait(&self) -> Readiness {
        self.wait_until_idle(self.max_attempts, self.poll_interval)
            .await
    }

    /// Poll the busy flag up to `max_attempts` times, sleeping
    /// `poll_interval` after every busy observation.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use std::time::Duration;
    /// use sledlink_session::readiness::{Readiness, ReadinessGate};
    /// use sledlink_session::state::SharedState;
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let gate = ReadinessGate::new(Arc::new(SharedState::new()), 10, Duration::from_millis(200));
    /// assert_eq!(gate.wait().await, Readiness::Ready { attempt: 0 });
    /// # }
    /// ```
    pub async fn wait_until_idle(&self, max_attempts: u32, poll_interval: Duration) -> Readiness {
        for attempt in 0..max_attempts {
            if !self.state.is_busy() {
                if attempt > 0 {
                    debug!("Reader idle after {} busy checks", attempt);
                }
                return Readiness::Ready { attempt };
            }
            trace!("Reader busy (check {}/{})", attempt + 1, max_attempts);
            tokio::time::sleep(poll_interval).await;
        }

        debug!(
            "Reader still busy after {} checks ({:?} apart)",
            max_attempts, poll_interval
        );
        Readiness::TimedOut {
            attempts: max_attempts,
        }
    }
}
