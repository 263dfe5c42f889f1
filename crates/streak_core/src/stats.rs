use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::achievements::AchievementMilestone;
use crate::instant::{self, Span};
use crate::interval::{self, StreakInterval};
use crate::levels::{self, RankLevel};
use crate::profile::GoalConfig;
use crate::xp;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Aggregate analytics across every interval an account has recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StreakStats {
    pub current: Span,
    pub record: Span,
    pub average_days: f64,
    pub ytd_days: f64,
    pub peak_xp: i64,
    pub peak_rank: RankLevel,
}

pub fn collect(
    intervals: &[StreakInterval],
    goal: &GoalConfig,
    ranks: &[RankLevel],
    milestones: &[AchievementMilestone],
    now: DateTime<Utc>,
) -> StreakStats {
    let (year_start, year_end) = calendar_year_bounds(now);

    let mut record = Span::default();
    let mut total_days = 0.0;
    let mut ytd_days = 0.0;
    let mut peak_xp: i64 = 0;

    for interval in intervals {
        let start = interval.started_at(now);
        let end = interval.ended_at(now);
        let elapsed = (end - start).max(Duration::zero());
        let span = instant::span_between(start, end);

        record = record.max(span);
        total_days += elapsed.num_seconds() as f64 / SECONDS_PER_DAY;

        let overlap_start = start.max(year_start);
        let overlap_end = end.min(year_end);
        if overlap_end > overlap_start {
            ytd_days += (overlap_end - overlap_start).num_seconds() as f64 / SECONDS_PER_DAY;
        }

        let interval_xp = interval
            .recorded_final_xp()
            .unwrap_or_else(|| xp::active_xp(span.days, goal, milestones));
        peak_xp = peak_xp.max(interval_xp);
    }

    let current = interval::active(intervals)
        .map(|interval| interval.span(now))
        .unwrap_or_default();
    let average_days = if intervals.is_empty() {
        0.0
    } else {
        total_days / intervals.len() as f64
    };

    StreakStats {
        current,
        record,
        average_days,
        ytd_days,
        peak_xp,
        peak_rank: levels::resolve(peak_xp, ranks).clone(),
    }
}

fn calendar_year_bounds(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let jan_first = NaiveDate::from_yo_opt(now.year(), 1).unwrap_or_else(|| now.date_naive());
    let next_jan_first =
        NaiveDate::from_yo_opt(now.year() + 1, 1).unwrap_or_else(|| now.date_naive());
    (
        Utc.from_utc_datetime(&jan_first.and_time(NaiveTime::MIN)),
        Utc.from_utc_datetime(&next_jan_first.and_time(NaiveTime::MIN)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::default_milestones;
    use crate::levels::default_ranks;

    fn at(text: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(text)
            .expect("valid rfc3339 fixture")
            .with_timezone(&Utc)
    }

    fn collect_default(intervals: &[StreakInterval], now: DateTime<Utc>) -> StreakStats {
        collect(
            intervals,
            &GoalConfig::default(),
            &default_ranks(),
            &default_milestones(),
            now,
        )
    }

    #[test]
    fn empty_history_yields_floor_stats() {
        let stats = collect_default(&[], at("2024-05-01T00:00:00Z"));
        assert_eq!(stats.current, Span::default());
        assert_eq!(stats.record, Span::default());
        assert_eq!(stats.average_days, 0.0);
        assert_eq!(stats.ytd_days, 0.0);
        assert_eq!(stats.peak_xp, 0);
        assert_eq!(stats.peak_rank.title, "NOVICE");
    }

    #[test]
    fn record_takes_the_longest_interval_current_takes_the_open_one() {
        let now = at("2024-05-11T00:00:00Z");
        let intervals = vec![
            StreakInterval::open("cur", at("2024-05-01T00:00:00Z")),
            StreakInterval::closed(
                "old",
                at("2024-02-01T00:00:00Z"),
                at("2024-02-22T12:00:00Z"),
                0,
                false,
            ),
        ];
        let stats = collect_default(&intervals, now);
        assert_eq!(stats.current, Span { days: 10, hours: 0 });
        assert_eq!(stats.record, Span { days: 21, hours: 12 });
        // (10 + 21.5) / 2 days.
        assert!((stats.average_days - 15.75).abs() < 1e-9);
    }

    #[test]
    fn ytd_counts_only_the_overlap_with_this_year() {
        let now = at("2024-01-10T00:00:00Z");
        let intervals = vec![
            // Spans the year boundary: only Jan 1 to Jan 10 counts.
            StreakInterval::open("span", at("2023-12-15T00:00:00Z")),
            // Entirely last year: contributes nothing.
            StreakInterval::closed(
                "past",
                at("2023-06-01T00:00:00Z"),
                at("2023-06-20T00:00:00Z"),
                0,
                false,
            ),
            // Fully inside this year.
            StreakInterval::closed(
                "inside",
                at("2024-01-02T00:00:00Z"),
                at("2024-01-05T12:00:00Z"),
                0,
                false,
            ),
        ];
        let stats = collect_default(&intervals, now);
        assert!((stats.ytd_days - (9.0 + 3.5)).abs() < 1e-9);
    }

    #[test]
    fn peak_prefers_the_stamped_snapshot_and_recomputes_otherwise() {
        let now = at("2024-05-11T00:00:00Z");
        let intervals = vec![
            // Stamped close-time XP wins even though the duration says less.
            StreakInterval::closed(
                "stamped",
                at("2024-03-01T00:00:00Z"),
                at("2024-03-03T00:00:00Z"),
                500,
                true,
            ),
            // Unstamped close: recomputed from its seven days.
            StreakInterval::closed(
                "bare",
                at("2024-04-01T00:00:00Z"),
                at("2024-04-08T00:00:00Z"),
                0,
                false,
            ),
        ];
        let stats = collect_default(&intervals, now);
        assert_eq!(stats.peak_xp, 500);
        assert_eq!(stats.peak_rank.title, "JOURNEYMAN");

        let without_stamp = collect_default(&intervals[1..], now);
        assert_eq!(
            without_stamp.peak_xp,
            xp::active_xp(7, &GoalConfig::default(), &default_milestones())
        );
        assert_eq!(without_stamp.peak_rank.title, "NOVICE");
    }

    #[test]
    fn open_interval_peak_tracks_the_running_total() {
        let now = at("2024-05-11T00:00:00Z");
        let intervals = vec![StreakInterval::open("cur", at("2024-05-01T00:00:00Z"))];
        let stats = collect_default(&intervals, now);
        // Ten days of accrual plus the day-1 and day-7 medals.
        assert_eq!(stats.peak_xp, 20 + 10 + 25);
    }
}
