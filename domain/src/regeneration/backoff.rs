//! Backoff between regeneration attempts

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Delay schedule applied before asking the producer for another artifact.
///
/// The first regeneration of a session is never delayed; the schedule
/// applies from the second regeneration on.
///
/// # Example
///
/// ```
/// use supervisor_domain::regeneration::BackoffSchedule;
/// use std::time::Duration;
///
/// let backoff = BackoffSchedule::exponential(Duration::from_millis(100), 2.0, Duration::from_secs(1));
/// assert_eq!(backoff.delay_for(1), Duration::ZERO);
/// assert_eq!(backoff.delay_for(2), Duration::from_millis(100));
/// assert_eq!(backoff.delay_for(3), Duration::from_millis(200));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum BackoffSchedule {
    /// Regenerate immediately every time
    None,
    /// Same delay before every regeneration after the first
    Fixed { delay_ms: u64 },
    /// `initial * factor^(n-2)` before regeneration `n`, capped at `max`
    Exponential {
        initial_ms: u64,
        factor: f64,
        max_ms: u64,
    },
}

impl Default for BackoffSchedule {
    fn default() -> Self {
        BackoffSchedule::Exponential {
            initial_ms: 500,
            factor: 2.0,
            max_ms: 10_000,
        }
    }
}

impl BackoffSchedule {
    pub fn fixed(delay: Duration) -> Self {
        BackoffSchedule::Fixed {
            delay_ms: delay.as_millis() as u64,
        }
    }

    pub fn exponential(initial: Duration, factor: f64, max: Duration) -> Self {
        BackoffSchedule::Exponential {
            initial_ms: initial.as_millis() as u64,
            factor,
            max_ms: max.as_millis() as u64,
        }
    }

    /// Delay before the `regeneration`-th regeneration (1-indexed)
    pub fn delay_for(&self, regeneration: u32) -> Duration {
        if regeneration <= 1 {
            return Duration::ZERO;
        }
        match self {
            BackoffSchedule::None => Duration::ZERO,
            BackoffSchedule::Fixed { delay_ms } => Duration::from_millis(*delay_ms),
            BackoffSchedule::Exponential {
                initial_ms,
                factor,
                max_ms,
            } => {
                let factor = if factor.is_finite() && *factor >= 1.0 {
                    *factor
                } else {
                    1.0
                };
                let exponent = (regeneration - 2) as i32;
                let millis = (*initial_ms as f64) * factor.powi(exponent);
                let capped = millis.min(*max_ms as f64).max(0.0);
                Duration::from_millis(capped as u64)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_regeneration_is_never_delayed() {
        assert_eq!(BackoffSchedule::None.delay_for(1), Duration::ZERO);
        assert_eq!(
            BackoffSchedule::fixed(Duration::from_secs(3)).delay_for(1),
            Duration::ZERO
        );
        assert_eq!(BackoffSchedule::default().delay_for(1), Duration::ZERO);
        assert_eq!(BackoffSchedule::default().delay_for(0), Duration::ZERO);
    }

    #[test]
    fn test_fixed() {
        let backoff = BackoffSchedule::fixed(Duration::from_millis(250));
        assert_eq!(backoff.delay_for(2), Duration::from_millis(250));
        assert_eq!(backoff.delay_for(7), Duration::from_millis(250));
    }

    #[test]
    fn test_exponential_grows_and_caps() {
        let backoff = BackoffSchedule::exponential(
            Duration::from_millis(100),
            3.0,
            Duration::from_millis(1000),
        );
        assert_eq!(backoff.delay_for(2), Duration::from_millis(100));
        assert_eq!(backoff.delay_for(3), Duration::from_millis(300));
        assert_eq!(backoff.delay_for(4), Duration::from_millis(900));
        assert_eq!(backoff.delay_for(5), Duration::from_millis(1000));
    }

    #[test]
    fn test_exponential_with_shrinking_factor_stays_flat() {
        let backoff = BackoffSchedule::exponential(
            Duration::from_millis(100),
            0.5,
            Duration::from_millis(1000),
        );
        assert_eq!(backoff.delay_for(4), Duration::from_millis(100));
    }

    #[test]
    fn test_delays_never_decrease() {
        let backoff = BackoffSchedule::default();
        let delays: Vec<_> = (1..10).map(|n| backoff.delay_for(n)).collect();
        assert!(delays.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_serde_tagged() {
        let json = serde_json::to_value(BackoffSchedule::fixed(Duration::from_millis(5))).unwrap();
        assert_eq!(json["strategy"], "fixed");
        assert_eq!(json["delay_ms"], 5);
    }
}
