//! quadrant-sched: the reminder dispatch scheduler.
//!
//! Consumes read-only [`store::TaskStore`] views and pushes through a
//! [`notify::NotificationSink`]; all task state lives elsewhere.

pub mod notify;
pub mod reminder;
pub mod store;

pub use notify::{DeliveryError, NotificationSink};
pub use reminder::{ReminderScheduler, SchedulerConfig, SessionOutcome};
pub use store::{DeadlineView, StoreError, TaskStore};
