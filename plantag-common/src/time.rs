//! Timestamp utilities

use chrono::{DateTime, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Return a timestamp that is never earlier than `previous`
///
/// Wall clocks can step backwards; record timestamps must not.
pub fn monotonic_after(previous: DateTime<Utc>) -> DateTime<Utc> {
    let current = now();
    if current < previous {
        previous
    } else {
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        // Should be a reasonable timestamp (after year 2000)
        assert!(timestamp.timestamp() > 946_684_800);
    }

    #[test]
    fn test_monotonic_after_past_advances() {
        let past = now() - Duration::hours(1);
        assert!(monotonic_after(past) > past);
    }

    #[test]
    fn test_monotonic_after_future_holds() {
        let future = now() + Duration::hours(1);
        assert_eq!(monotonic_after(future), future);
    }
}
