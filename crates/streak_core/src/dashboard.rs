use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::achievements::AchievementMilestone;
use crate::instant::Span;
use crate::interval::{self, StreakInterval};
use crate::levels::{self, RankLevel};
use crate::profile::GoalConfig;
use crate::projection::{self, RankEta};
use crate::xp;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Everything the status screen needs, derived in one pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardSnapshot {
    pub active: bool,
    pub session: Span,
    pub xp: i64,
    pub rank: RankLevel,
    pub next_rank: Option<RankLevel>,
    pub rank_progress_percent: i64,
    /// `None` once the top rank is held.
    pub rank_eta: Option<RankEta>,
    pub goal: GoalProgress,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoalProgress {
    pub label: String,
    pub percent: f64,
    pub detail: String,
}

pub fn build(
    intervals: &[StreakInterval],
    goal: &GoalConfig,
    ranks: &[RankLevel],
    milestones: &[AchievementMilestone],
    now: DateTime<Utc>,
) -> DashboardSnapshot {
    let active = interval::active(intervals);
    let session = active
        .map(|interval| interval.span(now))
        .unwrap_or_default();
    let xp = if active.is_some() {
        xp::active_xp(session.days, goal, milestones)
    } else {
        0
    };
    let rank = levels::resolve(xp, ranks).clone();
    let next_rank = levels::next_after(&rank, ranks).cloned();
    let rank_progress_percent = levels::progress_percent(xp, &rank, next_rank.as_ref());
    let rank_eta = next_rank
        .as_ref()
        .map(|next| projection::estimate(session.days, next.xp, goal, milestones, now));

    DashboardSnapshot {
        active: active.is_some(),
        session,
        xp,
        rank,
        next_rank,
        rank_progress_percent,
        rank_eta,
        goal: goal_progress(goal, active, session, now),
    }
}

/// The day-count form wins when both forms are present; the date form
/// measures the elapsed fraction of the start-to-target window.
pub fn goal_progress(
    goal: &GoalConfig,
    active: Option<&StreakInterval>,
    session: Span,
    now: DateTime<Utc>,
) -> GoalProgress {
    if let Some(target) = goal.day_target() {
        let percent = ((session.days as f64 / target as f64) * 100.0).min(100.0);
        return GoalProgress {
            label: format!("{target} DAYS"),
            percent,
            detail: format!("{} / {}", session.days, target),
        };
    }

    if let Some(date) = goal.target_date {
        let label = format!("UNTIL {}", date.format("%Y-%m-%d"));
        let Some(interval) = active else {
            return GoalProgress {
                label,
                percent: 0.0,
                detail: "-- / --".to_string(),
            };
        };
        let start = interval.started_at(now);
        let target = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
        let window = (target - start).num_milliseconds().max(1) as f64;
        let covered = (now - start).num_milliseconds().max(0) as f64;
        let percent = ((covered / window) * 100.0).min(100.0);
        let days_left =
            ((target - now).num_milliseconds() as f64 / MILLIS_PER_DAY).ceil() as i64;
        let detail = if days_left > 0 {
            format!("{days_left} DAYS LEFT")
        } else {
            "COMPLETED".to_string()
        };
        return GoalProgress {
            label,
            percent,
            detail,
        };
    }

    GoalProgress {
        label: "NO GOAL SET".to_string(),
        percent: 0.0,
        detail: "-- / --".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::default_milestones;
    use crate::levels::default_ranks;
    use chrono::NaiveDate;

    fn at(text: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(text)
            .expect("valid rfc3339 fixture")
            .with_timezone(&Utc)
    }

    fn build_default(
        intervals: &[StreakInterval],
        goal: &GoalConfig,
        now: DateTime<Utc>,
    ) -> DashboardSnapshot {
        build(
            intervals,
            goal,
            &default_ranks(),
            &default_milestones(),
            now,
        )
    }

    #[test]
    fn zero_state_reads_cleanly() {
        let now = at("2024-05-01T00:00:00Z");
        let snapshot = build_default(&[], &GoalConfig::default(), now);
        assert!(!snapshot.active);
        assert_eq!(snapshot.session, Span::default());
        assert_eq!(snapshot.xp, 0);
        assert_eq!(snapshot.rank.title, "NOVICE");
        assert_eq!(snapshot.rank_progress_percent, 0);
        assert_eq!(snapshot.goal.label, "NO GOAL SET");
        assert_eq!(snapshot.goal.detail, "-- / --");
    }

    #[test]
    fn running_streak_resolves_xp_rank_and_eta() {
        let now = at("2024-05-01T06:00:00Z");
        let intervals = vec![StreakInterval::open("cur", at("2024-03-31T00:00:00Z"))];
        let snapshot = build_default(&intervals, &GoalConfig::days(30), now);

        assert!(snapshot.active);
        assert_eq!(snapshot.session.days, 31);
        assert_eq!(snapshot.xp, 282);
        assert_eq!(snapshot.rank.title, "APPRENTICE");
        assert_eq!(
            snapshot.next_rank.as_ref().map(|rank| rank.title.as_str()),
            Some("JOURNEYMAN")
        );
        // 132 of the 250-wide band rounds to 53.
        assert_eq!(snapshot.rank_progress_percent, 53);
        let eta = snapshot.rank_eta.expect("a next rank exists");
        assert!(matches!(eta, RankEta::Within { days, .. } if days > 0));
    }

    #[test]
    fn day_goal_readout_caps_at_one_hundred() {
        let now = at("2024-05-01T00:00:00Z");
        let intervals = vec![StreakInterval::open("cur", at("2024-04-21T00:00:00Z"))];
        let snapshot = build_default(&intervals, &GoalConfig::days(20), now);
        assert_eq!(snapshot.goal.label, "20 DAYS");
        assert_eq!(snapshot.goal.detail, "10 / 20");
        assert!((snapshot.goal.percent - 50.0).abs() < 1e-9);

        let long_run = vec![StreakInterval::open("cur", at("2024-03-01T00:00:00Z"))];
        let capped = build_default(&long_run, &GoalConfig::days(20), now);
        assert_eq!(capped.goal.percent, 100.0);
        assert_eq!(capped.goal.detail, "61 / 20");
    }

    #[test]
    fn date_goal_measures_the_time_window() {
        let now = at("2024-05-06T00:00:00Z");
        let goal = GoalConfig::date(NaiveDate::from_ymd_opt(2024, 5, 11).expect("valid date"));
        let intervals = vec![StreakInterval::open("cur", at("2024-05-01T00:00:00Z"))];
        let snapshot = build_default(&intervals, &goal, now);

        assert_eq!(snapshot.goal.label, "UNTIL 2024-05-11");
        assert!((snapshot.goal.percent - 50.0).abs() < 1e-9);
        assert_eq!(snapshot.goal.detail, "5 DAYS LEFT");
    }

    #[test]
    fn passed_date_goal_reads_completed() {
        let now = at("2024-06-01T00:00:00Z");
        let goal = GoalConfig::date(NaiveDate::from_ymd_opt(2024, 5, 11).expect("valid date"));
        let intervals = vec![StreakInterval::open("cur", at("2024-05-01T00:00:00Z"))];
        let snapshot = build_default(&intervals, &goal, now);
        assert_eq!(snapshot.goal.detail, "COMPLETED");
        assert_eq!(snapshot.goal.percent, 100.0);
    }

    #[test]
    fn date_goal_without_a_running_streak_stays_blank() {
        let now = at("2024-05-06T00:00:00Z");
        let goal = GoalConfig::date(NaiveDate::from_ymd_opt(2024, 5, 11).expect("valid date"));
        let snapshot = build_default(&[], &goal, now);
        assert_eq!(snapshot.goal.percent, 0.0);
        assert_eq!(snapshot.goal.detail, "-- / --");
    }

    #[test]
    fn day_goal_wins_when_both_forms_are_present() {
        let now = at("2024-05-06T00:00:00Z");
        let goal = GoalConfig {
            target_days: Some(30),
            target_date: Some(NaiveDate::from_ymd_opt(2024, 5, 11).expect("valid date")),
        };
        let intervals = vec![StreakInterval::open("cur", at("2024-05-01T00:00:00Z"))];
        let snapshot = build_default(&intervals, &goal, now);
        assert_eq!(snapshot.goal.label, "30 DAYS");
    }
}
