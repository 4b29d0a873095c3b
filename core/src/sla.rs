//! SLA deadlines and due-soon pressure.

use crate::{risk::Priority, types::Timestamp};
use chrono::Duration;

/// Cases with this many minutes or fewer remaining are "due soon".
pub const DUE_SOON_MINUTES: i64 = 30;

pub fn offset_minutes(priority: Priority) -> i64 {
    match priority {
        Priority::Critical => 60,
        Priority::High     => 120,
        Priority::Medium   => 240,
        Priority::Low      => 480,
    }
}

pub fn due_at(priority: Priority, now: Timestamp) -> Timestamp {
    now + Duration::minutes(offset_minutes(priority))
}

/// Whole minutes left before the deadline, floored at zero.
pub fn minutes_remaining(due: Timestamp, now: Timestamp) -> i64 {
    let millis = (due - now).num_milliseconds();
    millis.div_euclid(60_000).max(0)
}

/// Overdue cases also count as due soon.
pub fn is_due_soon(due: Timestamp, now: Timestamp) -> bool {
    minutes_remaining(due, now) <= DUE_SOON_MINUTES
}

pub fn is_overdue(due: Timestamp, now: Timestamp) -> bool {
    due < now
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap()
    }

    #[test]
    fn offsets_by_priority() {
        assert_eq!(due_at(Priority::Critical, t0()), t0() + Duration::minutes(60));
        assert_eq!(due_at(Priority::High, t0()), t0() + Duration::minutes(120));
        assert_eq!(due_at(Priority::Medium, t0()), t0() + Duration::minutes(240));
        assert_eq!(due_at(Priority::Low, t0()), t0() + Duration::minutes(480));
    }

    #[test]
    fn due_soon_boundary_is_thirty_whole_minutes() {
        let now = t0();
        assert!(is_due_soon(now + Duration::minutes(30), now));
        assert!(is_due_soon(now + Duration::seconds(30 * 60 + 59), now));
        assert!(!is_due_soon(now + Duration::minutes(31), now));
    }

    #[test]
    fn overdue_is_due_soon_with_zero_remaining() {
        let now = t0();
        let due = now - Duration::minutes(5);
        assert_eq!(minutes_remaining(due, now), 0);
        assert!(is_due_soon(due, now));
        assert!(is_overdue(due, now));
    }
}
