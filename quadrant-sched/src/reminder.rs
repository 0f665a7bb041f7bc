//! Reminder dispatch loop.
//!
//! One background task polls every registered session's pending deadlines
//! and sends at most one aggregate reminder per user per cooldown window.
//! Failure policy is swallow-and-retry-next-cycle: a broken session never
//! blocks the others and nothing here is fatal to the loop.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use futures_util::future::join_all;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use quadrant_core::{Clock, SessionRegistry, UserId};

use crate::notify::NotificationSink;
use crate::store::{DeadlineView, TaskStore};

/// Scheduler policy knobs, with the production defaults.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    /// Sleep between evaluation cycles.
    pub poll_interval: StdDuration,
    /// Minimum spacing between two reminders to the same user.
    pub cooldown: Duration,
    /// Inclusive days-left window: due yesterday through tomorrow by
    /// default, covering "just missed" and "due soon".
    pub window_min_days: i64,
    pub window_max_days: i64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval: StdDuration::from_secs(300),
            cooldown: Duration::hours(24),
            window_min_days: -1,
            window_max_days: 1,
        }
    }
}

/// What one evaluation cycle decided for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Cooldown still active; deadlines were not fetched.
    CoolingDown,
    /// Deadlines fetched, nothing inside the reminder window.
    NothingDue,
    /// Reminder delivered for this many tasks; cooldown stamped.
    Notified(usize),
    /// Deadline fetch failed; retried next cycle.
    StoreFailed,
    /// Send failed; cooldown deliberately not stamped.
    DeliveryFailed,
}

/// The polling scheduler. Generic over its collaborators so tests can pin
/// the clock and fake the store and transport.
pub struct ReminderScheduler<S, N, C> {
    store: S,
    sink: N,
    sessions: Arc<SessionRegistry>,
    clock: C,
    config: SchedulerConfig,
}

impl<S, N, C> ReminderScheduler<S, N, C>
where
    S: TaskStore,
    N: NotificationSink,
    C: Clock,
{
    pub fn new(
        store: S,
        sink: N,
        sessions: Arc<SessionRegistry>,
        clock: C,
        config: SchedulerConfig,
    ) -> Self {
        Self { store, sink, sessions, clock, config }
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    /// Poll until the stop signal flips to `true`. The first evaluation runs
    /// immediately; an in-flight cycle always finishes before exit.
    pub async fn run(&self, mut stop: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        info!(
            poll_secs = self.config.poll_interval.as_secs(),
            cooldown_hours = self.config.cooldown.num_hours(),
            "reminder scheduler started"
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let now = self.clock.now();
                    self.run_cycle(now).await;
                }
                changed = stop.changed() => {
                    // Sender dropped counts as a stop too.
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }
            }
        }

        info!("reminder scheduler stopped");
    }

    /// One evaluation pass over every registered session. Sessions are
    /// independent: fetches fan out concurrently and one slow or failing
    /// session cannot delay the rest. Public so tooling and tests can drive
    /// a cycle with a pinned instant.
    pub async fn run_cycle(&self, now: DateTime<Utc>) -> Vec<(UserId, SessionOutcome)> {
        let users = self.sessions.user_ids();
        debug!(sessions = users.len(), "evaluation cycle");

        let evaluations = users
            .into_iter()
            .map(|user| async move { (user, self.evaluate_session(user, now).await) });

        join_all(evaluations).await
    }

    async fn evaluate_session(&self, user: UserId, now: DateTime<Utc>) -> SessionOutcome {
        if self
            .sessions
            .cooldown_remaining(user, now, self.config.cooldown)
            .is_some()
        {
            return SessionOutcome::CoolingDown;
        }

        let deadlines = match self.store.pending_deadlines(user).await {
            Ok(views) => views,
            Err(e) => {
                warn!(user, error = %e, "deadline fetch failed; retrying next cycle");
                return SessionOutcome::StoreFailed;
            }
        };

        let due: Vec<&DeadlineView> = deadlines
            .iter()
            .filter(|view| {
                let days = view.days_left(now);
                (self.config.window_min_days..=self.config.window_max_days).contains(&days)
            })
            .collect();

        if due.is_empty() {
            return SessionOutcome::NothingDue;
        }

        let text = format_reminder(&due, now);
        match self.sink.send(user, &text).await {
            Ok(()) => {
                self.sessions.mark_reminded(user, now);
                info!(user, tasks = due.len(), "reminder sent");
                SessionOutcome::Notified(due.len())
            }
            Err(e) => {
                warn!(user, error = %e, "delivery failed; cooldown not stamped");
                SessionOutcome::DeliveryFailed
            }
        }
    }
}

/// One aggregate message per cycle: a header plus one line per due task.
fn format_reminder(due: &[&DeadlineView], now: DateTime<Utc>) -> String {
    let mut lines = vec!["Upcoming deadline reminder:".to_string()];
    for view in due {
        lines.push(format!("• {} — {} day(s) left", view.title, view.days_left(now)));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use chrono::TimeZone;
    use quadrant_core::Task;

    use crate::notify::DeliveryError;
    use crate::store::StoreError;

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    #[derive(Clone, Default)]
    struct FakeStore {
        deadlines: HashMap<UserId, Vec<DeadlineView>>,
        failing: HashSet<UserId>,
    }

    impl FakeStore {
        fn with_deadline(mut self, user: UserId, title: &str, deadline: DateTime<Utc>) -> Self {
            self.deadlines.entry(user).or_default().push(DeadlineView {
                title: title.to_string(),
                description: None,
                created_at: deadline - Duration::days(10),
                deadline,
            });
            self
        }

        fn failing_for(mut self, user: UserId) -> Self {
            self.failing.insert(user);
            self
        }
    }

    impl TaskStore for FakeStore {
        async fn pending_deadlines(&self, user: UserId) -> Result<Vec<DeadlineView>, StoreError> {
            if self.failing.contains(&user) {
                return Err(StoreError::Unavailable("store down".to_string()));
            }
            Ok(self.deadlines.get(&user).cloned().unwrap_or_default())
        }

        async fn tasks_for_user(&self, _user: UserId) -> Result<Vec<Task>, StoreError> {
            Ok(vec![])
        }

        async fn all_tasks(&self) -> Result<Vec<Task>, StoreError> {
            Ok(vec![])
        }
    }

    /// Clones share the sent log, so tests keep a handle after moving one
    /// into the scheduler.
    #[derive(Clone, Default)]
    struct RecordingSink {
        sent: Arc<Mutex<Vec<(UserId, String)>>>,
        fail: bool,
    }

    impl RecordingSink {
        fn sent(&self) -> Vec<(UserId, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl NotificationSink for RecordingSink {
        async fn send(&self, user: UserId, text: &str) -> Result<(), DeliveryError> {
            if self.fail {
                return Err(DeliveryError::Unreachable("telegram down".to_string()));
            }
            self.sent.lock().unwrap().push((user, text.to_string()));
            Ok(())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 21, 12, 0, 0).unwrap()
    }

    fn scheduler(
        store: FakeStore,
        sink: RecordingSink,
        registry: Arc<SessionRegistry>,
    ) -> ReminderScheduler<FakeStore, RecordingSink, FixedClock> {
        ReminderScheduler::new(
            store,
            sink,
            registry,
            FixedClock(now()),
            SchedulerConfig::default(),
        )
    }

    fn outcome_for(outcomes: &[(UserId, SessionOutcome)], user: UserId) -> SessionOutcome {
        outcomes
            .iter()
            .find(|(u, _)| *u == user)
            .map(|(_, o)| *o)
            .expect("user evaluated")
    }

    #[tokio::test]
    async fn cooldown_active_sends_nothing() {
        let registry = Arc::new(SessionRegistry::new());
        registry.register(1);
        registry.mark_reminded(1, now() - Duration::hours(23));

        let store = FakeStore::default().with_deadline(1, "due tomorrow", now() + Duration::days(1));
        let sink = RecordingSink::default();
        let sched = scheduler(store, sink.clone(), registry.clone());

        let outcomes = sched.run_cycle(now()).await;
        assert_eq!(outcome_for(&outcomes, 1), SessionOutcome::CoolingDown);
        assert!(sink.sent().is_empty());
        assert_eq!(registry.last_reminder_at(1), Some(now() - Duration::hours(23)));
    }

    #[tokio::test]
    async fn overdue_task_after_cooldown_sends_once_and_stamps() {
        let registry = Arc::new(SessionRegistry::new());
        registry.register(1);
        registry.mark_reminded(1, now() - Duration::hours(25));

        let store = FakeStore::default().with_deadline(1, "pay rent", now() - Duration::days(1));
        let sink = RecordingSink::default();
        let sched = scheduler(store, sink.clone(), registry.clone());

        let outcomes = sched.run_cycle(now()).await;
        assert_eq!(outcome_for(&outcomes, 1), SessionOutcome::Notified(1));

        let sent = sink.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, 1);
        assert!(sent[0].1.contains("pay rent"));
        assert!(sent[0].1.contains("-1 day(s) left"));
        assert_eq!(registry.last_reminder_at(1), Some(now()));
    }

    #[tokio::test]
    async fn window_is_inclusive_yesterday_through_tomorrow() {
        let registry = Arc::new(SessionRegistry::new());
        registry.register(1);

        let store = FakeStore::default()
            .with_deadline(1, "yesterday", now() - Duration::days(1))
            .with_deadline(1, "today", now())
            .with_deadline(1, "tomorrow", now() + Duration::days(1))
            .with_deadline(1, "too old", now() - Duration::days(2))
            .with_deadline(1, "too far", now() + Duration::days(2));
        let sink = RecordingSink::default();
        let sched = scheduler(store, sink.clone(), registry);

        let outcomes = sched.run_cycle(now()).await;
        assert_eq!(outcome_for(&outcomes, 1), SessionOutcome::Notified(3));

        let text = &sink.sent()[0].1;
        assert!(text.contains("yesterday") && text.contains("today") && text.contains("tomorrow"));
        assert!(!text.contains("too old") && !text.contains("too far"));
    }

    #[tokio::test]
    async fn nothing_due_leaves_state_untouched() {
        let registry = Arc::new(SessionRegistry::new());
        registry.register(1);

        let store = FakeStore::default().with_deadline(1, "far out", now() + Duration::days(5));
        let sink = RecordingSink::default();
        let sched = scheduler(store, sink.clone(), registry.clone());

        let outcomes = sched.run_cycle(now()).await;
        assert_eq!(outcome_for(&outcomes, 1), SessionOutcome::NothingDue);
        assert!(sink.sent().is_empty());
        assert_eq!(registry.last_reminder_at(1), None);
    }

    #[tokio::test]
    async fn store_failure_is_isolated_per_session() {
        let registry = Arc::new(SessionRegistry::new());
        registry.register(1);
        registry.register(2);

        let store = FakeStore::default()
            .failing_for(1)
            .with_deadline(2, "ship release", now() + Duration::days(1));
        let sink = RecordingSink::default();
        let sched = scheduler(store, sink.clone(), registry.clone());

        let outcomes = sched.run_cycle(now()).await;
        assert_eq!(outcome_for(&outcomes, 1), SessionOutcome::StoreFailed);
        assert_eq!(outcome_for(&outcomes, 2), SessionOutcome::Notified(1));
        assert_eq!(sink.sent().len(), 1);
        assert_eq!(registry.last_reminder_at(1), None);
    }

    #[tokio::test]
    async fn delivery_failure_keeps_session_eligible() {
        let registry = Arc::new(SessionRegistry::new());
        registry.register(1);

        let store = FakeStore::default().with_deadline(1, "due today", now());
        let sink = RecordingSink { fail: true, ..RecordingSink::default() };
        let sched = scheduler(store.clone(), sink.clone(), registry.clone());

        let outcomes = sched.run_cycle(now()).await;
        assert_eq!(outcome_for(&outcomes, 1), SessionOutcome::DeliveryFailed);
        assert_eq!(registry.last_reminder_at(1), None);

        // next cycle retries and succeeds
        let retry_sink = RecordingSink::default();
        let sched = scheduler(store, retry_sink.clone(), registry.clone());
        let outcomes = sched.run_cycle(now()).await;
        assert_eq!(outcome_for(&outcomes, 1), SessionOutcome::Notified(1));
        assert_eq!(registry.last_reminder_at(1), Some(now()));
    }

    #[tokio::test]
    async fn run_exits_on_stop_signal() {
        let registry = Arc::new(SessionRegistry::new());
        let sched = scheduler(FakeStore::default(), RecordingSink::default(), registry);

        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        tokio::time::timeout(StdDuration::from_secs(1), sched.run(rx))
            .await
            .expect("scheduler should stop promptly");
    }
}
