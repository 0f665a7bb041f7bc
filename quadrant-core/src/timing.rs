//! Deadline timing analysis: days remaining, urgency, and aggregate buckets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::quadrant::Quadrant;
use crate::task::Task;
use crate::timezone::UtcOffset;

/// A deadline at most this many days away makes a task urgent.
pub const URGENT_WITHIN_DAYS: i64 = 3;

/// Whole-day calendar difference between a deadline and `now`, both read on
/// the UTC calendar. Negative means overdue.
pub fn days_until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (deadline.date_naive() - now.date_naive()).num_days()
}

/// [`days_until`] lifted over optional deadlines; `None` means no deadline.
pub fn days_remaining(deadline: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<i64> {
    deadline.map(|d| days_until(d, now))
}

/// The same difference read on a user's local calendar.
///
/// Display framing only; storage-side analytics and the reminder window use
/// [`days_remaining`] in UTC. Picking the zone is the caller's job; mixing
/// the two silently is the main correctness trap in this module.
pub fn days_remaining_local(
    deadline: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    offset: UtcOffset,
) -> Option<i64> {
    deadline.map(|d| {
        let d_local = offset.utc_to_local(d).date();
        let now_local = offset.utc_to_local(now).date();
        (d_local - now_local).num_days()
    })
}

/// Urgency gate for classification: deadline within [`URGENT_WITHIN_DAYS`].
/// No deadline means never urgent.
pub fn is_urgent(deadline: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    matches!(days_remaining(deadline, now), Some(d) if d <= URGENT_WITHIN_DAYS)
}

/// Mutually exclusive timeliness counters over a task set at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingBuckets {
    pub completed_on_time: usize,
    pub completed_late: usize,
    pub on_plan_pending: usize,
    pub overdue_pending: usize,
}

impl TimingBuckets {
    pub fn total(&self) -> usize {
        self.completed_on_time + self.completed_late + self.on_plan_pending + self.overdue_pending
    }
}

/// Single pass classifying every task into at most one counter.
///
/// Policy: a completed task with no deadline counts as on-time; there was no
/// deadline to miss. An incomplete task with no deadline lands in neither
/// pending bucket.
pub fn bucketize(tasks: &[Task], now: DateTime<Utc>) -> TimingBuckets {
    let mut buckets = TimingBuckets::default();
    for task in tasks {
        if task.completed() {
            match (task.completed_at(), task.deadline()) {
                (Some(done), Some(deadline)) if done > deadline => buckets.completed_late += 1,
                _ => buckets.completed_on_time += 1,
            }
        } else if let Some(deadline) = task.deadline() {
            if deadline > now {
                buckets.on_plan_pending += 1;
            } else {
                buckets.overdue_pending += 1;
            }
        }
    }
    buckets
}

/// Aggregate quadrant and completion counts over a task set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    pub total: usize,
    pub q1: usize,
    pub q2: usize,
    pub q3: usize,
    pub q4: usize,
    pub completed: usize,
    pub pending: usize,
}

impl TaskStats {
    pub fn collect(tasks: &[Task]) -> Self {
        let mut stats = TaskStats::default();
        for task in tasks {
            stats.total += 1;
            match task.quadrant() {
                Quadrant::Q1 => stats.q1 += 1,
                Quadrant::Q2 => stats.q2 += 1,
                Quadrant::Q3 => stats.q3 += 1,
                Quadrant::Q4 => stats.q4 += 1,
            }
            if task.completed() {
                stats.completed += 1;
            } else {
                stats.pending += 1;
            }
        }
        stats
    }
}
