use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::achievements::AchievementMilestone;
use crate::interval::StreakInterval;
use crate::journal::JournalEntry;
use crate::profile::GoalConfig;
use crate::xp;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum EventKind {
    Started,
    Daily,
    Medal(String),
    Goal,
    Journal,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Started => write!(f, "STREAK STARTED"),
            EventKind::Daily => write!(f, "DAILY DISCIPLINE"),
            EventKind::Medal(name) => write!(f, "MEDAL: {name}"),
            EventKind::Goal => write!(f, "GOAL ACHIEVED"),
            EventKind::Journal => write!(f, "LOG ENTRY UPLOAD"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreakEvent {
    pub date: NaiveDate,
    pub kind: EventKind,
    pub xp: i64,
}

/// Replays an interval into its event ledger, most recent row first.
/// Nothing is stored per event; rows landing beyond `now` are suppressed.
pub fn reconstruct(
    interval: &StreakInterval,
    goal: &GoalConfig,
    milestones: &[AchievementMilestone],
    journal: &[JournalEntry],
    now: DateTime<Utc>,
) -> Vec<StreakEvent> {
    let start = interval.started_at(now);
    let total_days = interval.span(now).days;
    let mut events = Vec::new();

    for offset in 0..=total_days {
        let moment = start + Duration::days(offset);
        if moment > now {
            break;
        }
        let date = moment.date_naive();

        if offset == 0 {
            events.push(StreakEvent {
                date,
                kind: EventKind::Started,
                xp: 0,
            });
        } else {
            events.push(StreakEvent {
                date,
                kind: EventKind::Daily,
                xp: xp::DAILY_XP,
            });
        }

        for milestone in milestones {
            if milestone.days == Some(offset) && offset > 0 {
                events.push(StreakEvent {
                    date,
                    kind: EventKind::Medal(milestone.name.clone()),
                    xp: milestone.xp,
                });
            }
        }

        if goal.day_target() == Some(offset) {
            events.push(StreakEvent {
                date,
                kind: EventKind::Goal,
                xp: xp::GOAL_BONUS_XP,
            });
        }

        for entry in journal {
            if entry.written_at(now).date_naive() == date {
                events.push(StreakEvent {
                    date,
                    kind: EventKind::Journal,
                    xp: xp::JOURNAL_XP,
                });
            }
        }
    }

    // Stable, so rows within one day keep their emit order.
    events.sort_by(|a, b| b.date.cmp(&a.date));
    events
}
