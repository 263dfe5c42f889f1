use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::instant::{self, RawInstant, Span};

/// One contiguous streak run; no end timestamp means still running.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StreakInterval {
    pub id: String,
    #[serde(default, alias = "startDate")]
    pub start: Option<RawInstant>,
    #[serde(default, alias = "endDate")]
    pub end: Option<RawInstant>,
    #[serde(default)]
    pub final_xp: i64,
    #[serde(default)]
    pub goal_achieved: bool,
}

impl StreakInterval {
    pub fn open(id: impl Into<String>, start: impl Into<RawInstant>) -> Self {
        Self {
            id: id.into(),
            start: Some(start.into()),
            end: None,
            final_xp: 0,
            goal_achieved: false,
        }
    }

    pub fn closed(
        id: impl Into<String>,
        start: impl Into<RawInstant>,
        end: impl Into<RawInstant>,
        final_xp: i64,
        goal_achieved: bool,
    ) -> Self {
        Self {
            id: id.into(),
            start: Some(start.into()),
            end: Some(end.into()),
            final_xp,
            goal_achieved,
        }
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    pub fn started_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        instant::normalize(self.start.as_ref(), now)
    }

    pub fn ended_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        instant::normalize(self.end.as_ref(), now)
    }

    pub fn span(&self, now: DateTime<Utc>) -> Span {
        instant::span_between(self.started_at(now), self.ended_at(now))
    }

    /// Close-time XP stamp; zero counts as unrecorded so readers recompute.
    pub fn recorded_final_xp(&self) -> Option<i64> {
        (self.final_xp > 0).then_some(self.final_xp)
    }
}

/// Most recent first. With more than one open interval in the data the
/// most recently started one wins every lookup.
pub fn sort_recent_first(intervals: &mut [StreakInterval], now: DateTime<Utc>) {
    intervals.sort_by_key(|interval| Reverse(interval.started_at(now)));
}

pub fn active(intervals: &[StreakInterval]) -> Option<&StreakInterval> {
    intervals.iter().find(|interval| interval.is_open())
}
