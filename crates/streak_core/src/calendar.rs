use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::interval::{self, StreakInterval};
use crate::profile::GoalConfig;

/// Per-day activity classification, derived once and queried per day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarMarks {
    active: HashSet<NaiveDate>,
    starts: HashSet<NaiveDate>,
    ends: HashMap<NaiveDate, bool>,
    goal_target: Option<NaiveDate>,
    today: NaiveDate,
}

/// A single day can carry several flags, e.g. one streak ending where the
/// next begins.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub active: bool,
    pub started: bool,
    /// `Some(goal_achieved)` when an interval ended on this day.
    pub ended: Option<bool>,
    pub goal_target: bool,
    pub today: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    /// Blank cells before day 1 in a Sunday-first week row.
    pub leading_blanks: u32,
    pub days: Vec<DayCell>,
}

impl CalendarMarks {
    pub fn build(intervals: &[StreakInterval], goal: &GoalConfig, now: DateTime<Utc>) -> Self {
        let mut active = HashSet::new();
        let mut starts = HashSet::new();
        let mut ends = HashMap::new();

        for interval in intervals {
            let start_day = interval.started_at(now).date_naive();
            let end_day = interval.ended_at(now).date_naive();
            starts.insert(start_day);
            if !interval.is_open() {
                ends.insert(end_day, interval.goal_achieved);
            }

            let mut day = start_day;
            while day <= end_day {
                active.insert(day);
                let Some(next) = day.succ_opt() else { break };
                day = next;
            }
        }

        // An explicit target date wins; otherwise a day-count goal projects
        // forward from the running interval's start.
        let goal_target = goal.target_date.or_else(|| {
            let target = goal.day_target()?;
            let open = interval::active(intervals)?;
            let offset = Duration::try_days(target)?;
            open.started_at(now).date_naive().checked_add_signed(offset)
        });

        Self {
            active,
            starts,
            ends,
            goal_target,
            today: now.date_naive(),
        }
    }

    pub fn goal_target_day(&self) -> Option<NaiveDate> {
        self.goal_target
    }

    pub fn classify(&self, date: NaiveDate) -> DayCell {
        DayCell {
            date,
            active: self.active.contains(&date),
            started: self.starts.contains(&date),
            ended: self.ends.get(&date).copied(),
            goal_target: self.goal_target == Some(date),
            today: self.today == date,
        }
    }

    pub fn range_view(&self, from: NaiveDate, to: NaiveDate) -> Vec<DayCell> {
        let mut cells = Vec::new();
        let mut day = from;
        while day <= to {
            cells.push(self.classify(day));
            let Some(next) = day.succ_opt() else { break };
            day = next;
        }
        cells
    }

    pub fn month_view(&self, year: i32, month: u32) -> Option<MonthView> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next_first = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        let mut days = Vec::new();
        let mut day = first;
        while day < next_first {
            days.push(self.classify(day));
            day = day.succ_opt()?;
        }
        Some(MonthView {
            year,
            month,
            leading_blanks: first.weekday().num_days_from_sunday(),
            days,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(text: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(text)
            .expect("valid rfc3339 fixture")
            .with_timezone(&Utc)
    }

    fn day(text: &str) -> NaiveDate {
        NaiveDate::parse_from_str(text, "%Y-%m-%d").expect("valid date fixture")
    }

    #[test]
    fn fills_active_days_between_start_and_end() {
        let now = at("2024-05-20T00:00:00Z");
        let intervals = vec![StreakInterval::closed(
            "iv-1",
            at("2024-05-02T10:00:00Z"),
            at("2024-05-05T09:00:00Z"),
            0,
            false,
        )];
        let marks = CalendarMarks::build(&intervals, &GoalConfig::default(), now);

        assert!(marks.classify(day("2024-05-02")).started);
        for text in ["2024-05-02", "2024-05-03", "2024-05-04", "2024-05-05"] {
            assert!(marks.classify(day(text)).active, "{text} should be active");
        }
        assert_eq!(marks.classify(day("2024-05-05")).ended, Some(false));
        assert!(!marks.classify(day("2024-05-06")).active);
        assert!(marks.classify(day("2024-05-01")).ended.is_none());
    }

    #[test]
    fn open_interval_runs_through_today_without_an_end_flag() {
        let now = at("2024-05-20T18:00:00Z");
        let intervals = vec![StreakInterval::open("iv-2", at("2024-05-18T06:00:00Z"))];
        let marks = CalendarMarks::build(&intervals, &GoalConfig::default(), now);

        assert!(marks.classify(day("2024-05-20")).active);
        assert!(marks.classify(day("2024-05-20")).today);
        assert!(marks.classify(day("2024-05-20")).ended.is_none());
        assert!(!marks.classify(day("2024-05-21")).active);
    }

    #[test]
    fn turnover_day_carries_both_end_and_start_flags() {
        let now = at("2024-05-20T00:00:00Z");
        let turnover = at("2024-05-10T09:30:00Z");
        let intervals = vec![
            StreakInterval::closed("ended", at("2024-05-01T00:00:00Z"), turnover, 20, true),
            StreakInterval::open("restarted", turnover),
        ];
        let marks = CalendarMarks::build(&intervals, &GoalConfig::default(), now);

        let cell = marks.classify(day("2024-05-10"));
        assert!(cell.started);
        assert_eq!(cell.ended, Some(true));
        assert!(cell.active);
    }

    #[test]
    fn explicit_goal_date_beats_the_projected_day_goal() {
        let now = at("2024-05-10T00:00:00Z");
        let intervals = vec![StreakInterval::open("iv-3", at("2024-05-01T00:00:00Z"))];

        let both = GoalConfig {
            target_days: Some(30),
            target_date: Some(day("2024-07-04")),
        };
        let marks = CalendarMarks::build(&intervals, &both, now);
        assert_eq!(marks.goal_target_day(), Some(day("2024-07-04")));

        let projected = CalendarMarks::build(&intervals, &GoalConfig::days(30), now);
        assert_eq!(projected.goal_target_day(), Some(day("2024-05-31")));
        assert!(projected.classify(day("2024-05-31")).goal_target);
    }

    #[test]
    fn day_goal_without_an_open_interval_marks_nothing() {
        let now = at("2024-05-10T00:00:00Z");
        let intervals = vec![StreakInterval::closed(
            "done",
            at("2024-04-01T00:00:00Z"),
            at("2024-04-05T00:00:00Z"),
            0,
            false,
        )];
        let marks = CalendarMarks::build(&intervals, &GoalConfig::days(30), now);
        assert_eq!(marks.goal_target_day(), None);
    }

    #[test]
    fn month_view_has_the_right_shape() {
        let now = at("2024-05-10T00:00:00Z");
        let marks = CalendarMarks::build(&[], &GoalConfig::default(), now);
        let view = marks.month_view(2024, 5).expect("may 2024 exists");
        assert_eq!(view.days.len(), 31);
        // May 1st 2024 is a Wednesday.
        assert_eq!(view.leading_blanks, 3);
        assert_eq!(view.days[0].date, day("2024-05-01"));

        assert!(marks.month_view(2024, 13).is_none());
    }
}
