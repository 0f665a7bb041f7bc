//! Per-user session state shared between the reminder loop and command paths.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

use crate::timezone::{OffsetError, UtcOffset};

pub type UserId = i64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Stamped by the scheduler after a successful send; never rolled back
    /// on delivery failure.
    pub last_reminder_at: Option<DateTime<Utc>>,
    pub utc_offset: UtcOffset,
}

/// Registry of active sessions: the only mutable state shared between the
/// scheduler task and the request paths.
///
/// One coarse lock is enough at this write frequency; last writer wins per
/// key. Share it by `Arc` handle, never by copy.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<UserId, SessionState>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user with default state; re-registering keeps existing state so
    /// a re-login cannot reset the reminder cooldown.
    pub fn register(&self, user: UserId) {
        self.write().entry(user).or_default();
    }

    pub fn remove(&self, user: UserId) -> bool {
        self.write().remove(&user).is_some()
    }

    pub fn contains(&self, user: UserId) -> bool {
        self.read().contains_key(&user)
    }

    /// Snapshot of registered users, for one evaluation cycle.
    pub fn user_ids(&self) -> Vec<UserId> {
        self.read().keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Stored offset, or the policy default for unknown users.
    pub fn offset(&self, user: UserId) -> UtcOffset {
        self.read().get(&user).map(|s| s.utc_offset).unwrap_or_default()
    }

    /// Validate then overwrite unconditionally; no history is kept. State is
    /// unchanged when the offset is out of range.
    pub fn set_offset(&self, user: UserId, hours: i32) -> Result<UtcOffset, OffsetError> {
        let offset = UtcOffset::new(hours)?;
        self.write().entry(user).or_default().utc_offset = offset;
        Ok(offset)
    }

    pub fn local_to_utc(&self, user: UserId, local: NaiveDateTime) -> DateTime<Utc> {
        self.offset(user).local_to_utc(local)
    }

    pub fn utc_to_local(&self, user: UserId, utc: DateTime<Utc>) -> NaiveDateTime {
        self.offset(user).utc_to_local(utc)
    }

    pub fn last_reminder_at(&self, user: UserId) -> Option<DateTime<Utc>> {
        self.read().get(&user).and_then(|s| s.last_reminder_at)
    }

    /// Stamp the cooldown. Called by the scheduler only, right after a
    /// successful notification send.
    pub fn mark_reminded(&self, user: UserId, at: DateTime<Utc>) {
        self.write().entry(user).or_default().last_reminder_at = Some(at);
    }

    /// Time left before the user may be reminded again; `None` means
    /// eligible now. A user never reminded has infinite elapsed time.
    pub fn cooldown_remaining(
        &self,
        user: UserId,
        now: DateTime<Utc>,
        cooldown: Duration,
    ) -> Option<Duration> {
        let last = self.last_reminder_at(user)?;
        let elapsed = now - last;
        if elapsed < cooldown { Some(cooldown - elapsed) } else { None }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<UserId, SessionState>> {
        self.sessions.read().expect("session registry lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<UserId, SessionState>> {
        self.sessions.write().expect("session registry lock poisoned")
    }
}
