use crate::achievements::AchievementMilestone;
use crate::profile::GoalConfig;

pub const DAILY_XP: i64 = 2;
pub const GOAL_BONUS_XP: i64 = 10;
pub const JOURNAL_XP: i64 = 3;

/// Daily accrual plus every day milestone already passed plus the goal
/// bonus once a day-count goal is met. Date-form goals never pay XP.
pub fn active_xp(days: i64, goal: &GoalConfig, milestones: &[AchievementMilestone]) -> i64 {
    let days = days.max(0);
    let mut xp = days * DAILY_XP;
    for milestone in milestones {
        if let Some(threshold) = milestone.days {
            if days >= threshold {
                xp += milestone.xp;
            }
        }
    }
    if let Some(target) = goal.day_target() {
        if days >= target {
            xp += GOAL_BONUS_XP;
        }
    }
    xp
}
