//! Retry policy for LLM calls.
//!
//! Pure state-transition logic, no I/O: the client reports each failed
//! attempt and the policy answers with a delay or exhaustion. Rate limits
//! and hard failures are distinct classes — a 429 costs an attempt but
//! does not grow the backoff multiplier, which scales with hard failures
//! only.

use std::time::Duration;

/// Classification of one failed LLM attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    /// HTTP 429 from the endpoint.
    RateLimited,
    /// Transport error, non-2xx status, or malformed/unparsable response.
    Failed(String),
}

impl std::fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimited => write!(f, "rate limited (HTTP 429)"),
            Self::Failed(msg) => write!(f, "{msg}"),
        }
    }
}

/// Progress through the attempt budget. Threaded through
/// [`RetryPolicy::on_failure`] so the policy itself stays stateless.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryState {
    /// Attempts completed so far (all classes).
    pub attempts_used: u32,
    /// Hard (non-rate-limit) failures so far; drives backoff growth.
    pub hard_failures: u32,
}

/// What follows a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep `delay`, then try again carrying `state` forward.
    Retry { delay: Duration, state: RetryState },
    /// The attempt budget is spent.
    Exhausted,
}

/// Retry policy parameters.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempt budget, rate-limited attempts included.
    pub max_attempts: u32,
    /// Base delay for hard failures; multiplied by the hard-failure count.
    pub backoff_base: Duration,
    /// Fixed cooldown after a rate limit.
    pub rate_limit_cooldown: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_secs(2),
            rate_limit_cooldown: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Evaluate a failed attempt: retry with a class-appropriate delay, or
    /// declare the budget exhausted.
    pub fn on_failure(&self, state: RetryState, failure: &AttemptFailure) -> RetryDecision {
        let attempts_used = state.attempts_used + 1;
        if attempts_used >= self.max_attempts {
            return RetryDecision::Exhausted;
        }

        match failure {
            AttemptFailure::RateLimited => RetryDecision::Retry {
                delay: self.rate_limit_cooldown,
                state: RetryState {
                    attempts_used,
                    hard_failures: state.hard_failures,
                },
            },
            AttemptFailure::Failed(_) => {
                let hard_failures = state.hard_failures + 1;
                RetryDecision::Retry {
                    delay: self.backoff_base * hard_failures,
                    state: RetryState {
                        attempts_used,
                        hard_failures,
                    },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hard() -> AttemptFailure {
        AttemptFailure::Failed("HTTP 500".into())
    }

    #[test]
    fn hard_failures_back_off_linearly() {
        let policy = RetryPolicy::default();

        let decision = policy.on_failure(RetryState::default(), &hard());
        let RetryDecision::Retry { delay, state } = decision else {
            panic!("expected retry");
        };
        assert_eq!(delay, Duration::from_secs(2));

        let decision = policy.on_failure(state, &hard());
        let RetryDecision::Retry { delay, .. } = decision else {
            panic!("expected retry");
        };
        assert_eq!(delay, Duration::from_secs(4));
    }

    #[test]
    fn budget_exhausts_at_max_attempts() {
        let policy = RetryPolicy::default();

        let mut state = RetryState::default();
        for _ in 0..2 {
            match policy.on_failure(state, &hard()) {
                RetryDecision::Retry { state: next, .. } => state = next,
                RetryDecision::Exhausted => panic!("exhausted too early"),
            }
        }
        assert_eq!(
            policy.on_failure(state, &hard()),
            RetryDecision::Exhausted
        );
    }

    #[test]
    fn rate_limits_use_fixed_cooldown() {
        let policy = RetryPolicy::default();

        let decision = policy.on_failure(RetryState::default(), &AttemptFailure::RateLimited);
        let RetryDecision::Retry { delay, state } = decision else {
            panic!("expected retry");
        };
        assert_eq!(delay, Duration::from_secs(10));
        assert_eq!(state.hard_failures, 0);

        // A second rate limit still sleeps the same fixed cooldown.
        let decision = policy.on_failure(state, &AttemptFailure::RateLimited);
        let RetryDecision::Retry { delay, .. } = decision else {
            panic!("expected retry");
        };
        assert_eq!(delay, Duration::from_secs(10));
    }

    #[test]
    fn rate_limits_do_not_grow_backoff() {
        let policy = RetryPolicy {
            max_attempts: 5,
            ..RetryPolicy::default()
        };

        // 429, then a hard failure: the hard failure is the FIRST of its
        // class, so it backs off at 1x base despite being attempt 2.
        let RetryDecision::Retry { state, .. } =
            policy.on_failure(RetryState::default(), &AttemptFailure::RateLimited)
        else {
            panic!("expected retry");
        };
        let RetryDecision::Retry { delay, .. } = policy.on_failure(state, &hard()) else {
            panic!("expected retry");
        };
        assert_eq!(delay, Duration::from_secs(2));
    }

    #[test]
    fn rate_limits_still_consume_the_budget() {
        let policy = RetryPolicy::default();

        let mut state = RetryState::default();
        for _ in 0..2 {
            match policy.on_failure(state, &AttemptFailure::RateLimited) {
                RetryDecision::Retry { state: next, .. } => state = next,
                RetryDecision::Exhausted => panic!("exhausted too early"),
            }
        }
        assert_eq!(
            policy.on_failure(state, &AttemptFailure::RateLimited),
            RetryDecision::Exhausted
        );
    }
}
