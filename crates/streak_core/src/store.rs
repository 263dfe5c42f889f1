use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::instant::RawInstant;
use crate::interval::StreakInterval;
use crate::journal::JournalEntry;
use crate::profile::{GoalConfig, PublicProfileSettings, UserProfile};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("malformed account snapshot: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("no interval is currently open")]
    NoOpenInterval,
    #[error("no record with id `{0}`")]
    MissingRecord(String),
}

pub trait IntervalStore: Send + Sync {
    fn intervals(&self) -> Result<Vec<StreakInterval>, StoreError>;
}

pub trait ProfileStore: Send + Sync {
    fn profile(&self) -> Result<UserProfile, StoreError>;
}

pub trait JournalStore: Send + Sync {
    fn entries(&self) -> Result<Vec<JournalEntry>, StoreError>;
}

impl<S: IntervalStore> IntervalStore for Arc<S> {
    fn intervals(&self) -> Result<Vec<StreakInterval>, StoreError> {
        (**self).intervals()
    }
}

impl<S: ProfileStore> ProfileStore for Arc<S> {
    fn profile(&self) -> Result<UserProfile, StoreError> {
        (**self).profile()
    }
}

impl<S: JournalStore> JournalStore for Arc<S> {
    fn entries(&self) -> Result<Vec<JournalEntry>, StoreError> {
        (**self).entries()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AccountSnapshot {
    #[serde(alias = "user")]
    pub profile: UserProfile,
    #[serde(alias = "logs")]
    pub intervals: Vec<StreakInterval>,
    pub journal: Vec<JournalEntry>,
}

/// In-memory store backing the app shell and tests. Mutations uphold the
/// one-open-interval rule at the point of write.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<AccountSnapshot>,
}

impl MemoryStore {
    pub fn new(snapshot: AccountSnapshot) -> Self {
        Self {
            state: RwLock::new(snapshot),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, StoreError> {
        let snapshot: AccountSnapshot = serde_json::from_str(raw)?;
        Ok(Self::new(snapshot))
    }

    pub fn snapshot(&self) -> AccountSnapshot {
        self.state.read().clone()
    }

    pub fn to_json_string(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(&*self.state.read())?)
    }

    pub fn start_interval(&self, id: impl Into<String>, start: impl Into<RawInstant>) {
        let start = start.into();
        let mut state = self.state.write();
        // anything left open is stamped closed without XP; reads recompute it
        for interval in state.intervals.iter_mut().filter(|i| i.is_open()) {
            interval.end = Some(start.clone());
        }
        state.intervals.push(StreakInterval::open(id, start));
    }

    pub fn end_active_interval(
        &self,
        end: impl Into<RawInstant>,
        final_xp: i64,
        goal_achieved: bool,
    ) -> Result<String, StoreError> {
        let end = end.into();
        let mut state = self.state.write();
        let Some(interval) = state.intervals.iter_mut().find(|i| i.is_open()) else {
            return Err(StoreError::NoOpenInterval);
        };
        interval.end = Some(end);
        interval.final_xp = final_xp;
        interval.goal_achieved = goal_achieved;
        Ok(interval.id.clone())
    }

    pub fn restart_interval(
        &self,
        new_id: impl Into<String>,
        at: impl Into<RawInstant>,
        final_xp: i64,
        goal_achieved: bool,
    ) -> Result<String, StoreError> {
        let at = at.into();
        let mut state = self.state.write();
        let Some(interval) = state.intervals.iter_mut().find(|i| i.is_open()) else {
            return Err(StoreError::NoOpenInterval);
        };
        interval.end = Some(at.clone());
        interval.final_xp = final_xp;
        interval.goal_achieved = goal_achieved;
        let closed_id = interval.id.clone();
        state.intervals.push(StreakInterval::open(new_id, at));
        Ok(closed_id)
    }

    pub fn delete_interval(&self, id: &str) -> Result<(), StoreError> {
        let mut state = self.state.write();
        let before = state.intervals.len();
        state.intervals.retain(|interval| interval.id != id);
        if state.intervals.len() == before {
            return Err(StoreError::MissingRecord(id.to_string()));
        }
        Ok(())
    }

    pub fn set_username(&self, username: impl Into<String>) {
        self.state.write().profile.username = Some(username.into());
    }

    pub fn set_goal(&self, goal: GoalConfig) {
        self.state.write().profile.goal = goal;
    }

    pub fn clear_goal(&self) {
        self.state.write().profile.goal = GoalConfig::default();
    }

    pub fn set_public_profile(&self, settings: PublicProfileSettings) {
        self.state.write().profile.public_profile = settings;
    }

    pub fn add_journal_entry(&self, entry: JournalEntry) {
        self.state.write().journal.push(entry);
    }

    pub fn toggle_journal_pin(&self, id: &str) -> Result<bool, StoreError> {
        let mut state = self.state.write();
        let Some(entry) = state.journal.iter_mut().find(|entry| entry.id == id) else {
            return Err(StoreError::MissingRecord(id.to_string()));
        };
        entry.pinned = !entry.pinned;
        Ok(entry.pinned)
    }

    pub fn delete_journal_entry(&self, id: &str) -> Result<(), StoreError> {
        let mut state = self.state.write();
        let before = state.journal.len();
        state.journal.retain(|entry| entry.id != id);
        if state.journal.len() == before {
            return Err(StoreError::MissingRecord(id.to_string()));
        }
        Ok(())
    }
}

impl IntervalStore for MemoryStore {
    fn intervals(&self) -> Result<Vec<StreakInterval>, StoreError> {
        Ok(self.state.read().intervals.clone())
    }
}

impl ProfileStore for MemoryStore {
    fn profile(&self) -> Result<UserProfile, StoreError> {
        Ok(self.state.read().profile.clone())
    }
}

impl JournalStore for MemoryStore {
    fn entries(&self) -> Result<Vec<JournalEntry>, StoreError> {
        Ok(self.state.read().journal.clone())
    }
}
