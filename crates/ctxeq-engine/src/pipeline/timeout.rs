//! Deadline/timeout utilities for equivalence checks.

use std::time::{Duration, Instant};

use ctxeq_smt::OracleError;

pub(crate) fn deadline_exceeded(deadline: Option<Instant>) -> bool {
    match deadline {
        Some(deadline) => Instant::now() >= deadline,
        None => false,
    }
}

pub fn overall_timeout_duration(timeout_secs: u64) -> Option<Duration> {
    if timeout_secs == 0 {
        None
    } else {
        Some(Duration::from_secs(timeout_secs))
    }
}

pub fn deadline_from_timeout_secs(timeout_secs: u64) -> Option<Instant> {
    overall_timeout_duration(timeout_secs).and_then(|t| Instant::now().checked_add(t))
}

/// Time left before `deadline`; `Some(Duration::ZERO)` once it has passed.
pub fn remaining_timeout(deadline: Option<Instant>) -> Option<Duration> {
    let deadline = deadline?;
    Some(deadline.saturating_duration_since(Instant::now()))
}

pub(crate) fn remaining_timeout_secs(deadline: Option<Instant>) -> Option<u64> {
    let remaining = remaining_timeout(deadline)?;
    if remaining.is_zero() {
        return Some(0);
    }
    let secs = remaining.as_secs();
    let rounded_up = if remaining.subsec_nanos() > 0 {
        secs.saturating_add(1)
    } else {
        secs
    };
    Some(rounded_up.max(1))
}

/// Budget for the next oracle call, or the timeout error once the overall
/// `timeout_secs` budget is spent.
pub(crate) fn oracle_budget(
    deadline: Option<Instant>,
    timeout_secs: u64,
) -> Result<Option<Duration>, OracleError> {
    if deadline_exceeded(deadline) {
        return Err(OracleError::Timeout { secs: timeout_secs });
    }
    Ok(remaining_timeout(deadline))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_exceeded_none_returns_false() {
        assert!(!deadline_exceeded(None));
    }

    #[test]
    fn deadline_exceeded_future_returns_false() {
        let future = Instant::now() + Duration::from_secs(60);
        assert!(!deadline_exceeded(Some(future)));
    }

    #[test]
    fn deadline_exceeded_past_returns_true() {
        let past = Instant::now() - Duration::from_secs(1);
        assert!(deadline_exceeded(Some(past)));
    }

    #[test]
    fn overall_timeout_duration_zero_returns_none() {
        assert!(overall_timeout_duration(0).is_none());
        assert_eq!(overall_timeout_duration(30), Some(Duration::from_secs(30)));
    }

    #[test]
    fn deadline_from_timeout_secs_zero_returns_none() {
        assert!(deadline_from_timeout_secs(0).is_none());
        assert!(deadline_from_timeout_secs(10).unwrap() > Instant::now());
    }

    #[test]
    fn remaining_timeout_past_deadline_is_zero() {
        let past = Instant::now() - Duration::from_secs(5);
        assert_eq!(remaining_timeout(Some(past)), Some(Duration::ZERO));
        assert_eq!(remaining_timeout_secs(Some(past)), Some(0));
        assert!(remaining_timeout(None).is_none());
    }

    #[test]
    fn remaining_timeout_secs_rounds_up_to_at_least_one() {
        let future = Instant::now() + Duration::from_secs(60);
        let secs = remaining_timeout_secs(Some(future)).unwrap();
        assert!((59..=61).contains(&secs));

        let close_future = Instant::now() + Duration::from_millis(50);
        assert!(remaining_timeout_secs(Some(close_future)).unwrap() >= 1);
    }

    #[test]
    fn oracle_budget_follows_deadline() {
        assert_eq!(oracle_budget(None, 0).unwrap(), None);

        let future = Instant::now() + Duration::from_secs(42);
        let budget = oracle_budget(Some(future), 42).unwrap().unwrap();
        assert!(budget <= Duration::from_secs(42));
        assert!(budget > Duration::from_secs(40));

        let past = Instant::now() - Duration::from_secs(5);
        let err = oracle_budget(Some(past), 7).unwrap_err();
        assert!(matches!(err, OracleError::Timeout { secs: 7 }));
    }
}
