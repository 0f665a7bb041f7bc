//! Eisenhower-matrix quadrant classification.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timing::is_urgent;

/// One cell of the Eisenhower matrix. Exactly one label applies to any task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quadrant {
    /// Important and urgent: do first.
    Q1,
    /// Important, not urgent: schedule.
    Q2,
    /// Not important but urgent: delegate.
    Q3,
    /// Neither important nor urgent.
    Q4,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [Quadrant::Q1, Quadrant::Q2, Quadrant::Q3, Quadrant::Q4];

    pub fn as_str(&self) -> &'static str {
        match self {
            Quadrant::Q1 => "Q1",
            Quadrant::Q2 => "Q2",
            Quadrant::Q3 => "Q3",
            Quadrant::Q4 => "Q4",
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a task by its importance flag and deadline proximity.
///
/// Total over its inputs: a missing deadline is a valid "not urgent" value,
/// not an error.
pub fn classify(important: bool, deadline: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Quadrant {
    let urgent = is_urgent(deadline, now);
    match (important, urgent) {
        (true, true) => Quadrant::Q1,
        (true, false) => Quadrant::Q2,
        (false, true) => Quadrant::Q3,
        (false, false) => Quadrant::Q4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 21, 8, 30, 0).unwrap()
    }

    #[test]
    fn important_with_distant_deadline_is_q2() {
        let q = classify(true, Some(now() + Duration::days(5)), now());
        assert_eq!(q, Quadrant::Q2);
    }

    #[test]
    fn important_with_near_deadline_is_q1() {
        let q = classify(true, Some(now() + Duration::days(1)), now());
        assert_eq!(q, Quadrant::Q1);
    }

    #[test]
    fn unimportant_overdue_is_q3() {
        let q = classify(false, Some(now() - Duration::days(1)), now());
        assert_eq!(q, Quadrant::Q3);
    }

    #[test]
    fn no_deadline_is_never_urgent() {
        assert_eq!(classify(true, None, now()), Quadrant::Q2);
        assert_eq!(classify(false, None, now()), Quadrant::Q4);
    }

    #[test]
    fn classification_is_total_and_idempotent() {
        let deadlines = [None, Some(now() + Duration::days(2)), Some(now() - Duration::days(9))];
        for important in [true, false] {
            for deadline in deadlines {
                let first = classify(important, deadline, now());
                assert!(Quadrant::ALL.contains(&first));
                assert_eq!(first, classify(important, deadline, now()));
            }
        }
    }
}
