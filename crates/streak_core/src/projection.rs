use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::achievements::AchievementMilestone;
use crate::levels::{self, RankLevel};
use crate::profile::GoalConfig;
use crate::xp;

pub const PROJECTION_CEILING_DAYS: i64 = 5000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RankEta {
    /// Reached after this many further days, landing on this calendar date.
    Within { days: i64, date: NaiveDate },
    Unreachable,
}

/// Simulates day-by-day accrual from `current_days` until `target_xp` is
/// met. Milestone rewards land on their exact day, so this is a walk.
pub fn estimate(
    current_days: i64,
    target_xp: i64,
    goal: &GoalConfig,
    milestones: &[AchievementMilestone],
    now: DateTime<Utc>,
) -> RankEta {
    let mut simulated = current_days.max(0);
    let mut needed = 0;
    while xp::active_xp(simulated, goal, milestones) < target_xp
        && needed < PROJECTION_CEILING_DAYS
    {
        simulated += 1;
        needed += 1;
    }
    if needed >= PROJECTION_CEILING_DAYS {
        return RankEta::Unreachable;
    }
    RankEta::Within {
        days: needed,
        date: (now + Duration::days(needed)).date_naive(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RankProjection {
    pub rank: RankLevel,
    pub eta: RankEta,
}

/// One row per rank above the current one, each simulated independently.
pub fn projections(
    current_days: i64,
    goal: &GoalConfig,
    ranks: &[RankLevel],
    milestones: &[AchievementMilestone],
    now: DateTime<Utc>,
) -> Vec<RankProjection> {
    let current_xp = xp::active_xp(current_days, goal, milestones);
    let current = levels::resolve(current_xp, ranks);
    ranks
        .iter()
        .filter(|rank| rank.level > current.level)
        .map(|rank| RankProjection {
            rank: rank.clone(),
            eta: estimate(current_days, rank.xp, goal, milestones, now),
        })
        .collect()
}
