use anyhow::{ensure, Context};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::achievements::{self, AchievementMilestone, MedalStatus};
use crate::calendar::{CalendarMarks, DayCell, MonthView};
use crate::dashboard::{self, DashboardSnapshot};
use crate::history::{self, StreakEvent};
use crate::instant::Span;
use crate::interval::{self, StreakInterval};
use crate::levels::{self, RankLevel};
use crate::oracle::{self, Oracle};
use crate::profile::UserProfile;
use crate::projection::{self, RankProjection};
use crate::stats::{self, StreakStats};
use crate::store::{IntervalStore, JournalStore, ProfileStore, StoreError};
use crate::xp;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("interval log unavailable")]
    Intervals(#[source] StoreError),
    #[error("profile unavailable")]
    Profile(#[source] StoreError),
    #[error("journal unavailable")]
    Journal(#[source] StoreError),
    #[error("no interval with id `{0}`")]
    UnknownInterval(String),
    #[error("no such calendar month: {year}-{month:02}")]
    InvalidMonth { year: i32, month: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IntervalSummary {
    pub id: String,
    pub started: DateTime<Utc>,
    pub ended: Option<DateTime<Utc>>,
    pub span: Span,
    pub goal_achieved: bool,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicSnapshot {
    pub username: Option<String>,
    pub stats: Option<StreakStats>,
    pub awards: Option<Vec<MedalStatus>>,
    pub calendar: Option<MonthView>,
}

pub struct StreakService {
    intervals: Box<dyn IntervalStore>,
    profiles: Box<dyn ProfileStore>,
    journal: Box<dyn JournalStore>,
    oracle: Option<Box<dyn Oracle>>,
    ranks: Vec<RankLevel>,
    milestones: Vec<AchievementMilestone>,
    clock_override: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for StreakService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreakService")
            .field("ranks", &self.ranks)
            .field("milestones", &self.milestones)
            .field("clock_override", &self.clock_override)
            .finish_non_exhaustive()
    }
}

pub struct StreakServiceBuilder {
    intervals: Option<Box<dyn IntervalStore>>,
    profiles: Option<Box<dyn ProfileStore>>,
    journal: Option<Box<dyn JournalStore>>,
    oracle: Option<Box<dyn Oracle>>,
    ranks: Vec<RankLevel>,
    milestones: Vec<AchievementMilestone>,
    clock_override: Option<DateTime<Utc>>,
}

impl StreakServiceBuilder {
    pub fn new() -> Self {
        Self {
            intervals: None,
            profiles: None,
            journal: None,
            oracle: None,
            ranks: levels::default_ranks(),
            milestones: achievements::default_milestones(),
            clock_override: None,
        }
    }

    pub fn with_intervals(mut self, store: impl IntervalStore + 'static) -> Self {
        self.intervals = Some(Box::new(store));
        self
    }

    pub fn with_profiles(mut self, store: impl ProfileStore + 'static) -> Self {
        self.profiles = Some(Box::new(store));
        self
    }

    pub fn with_journal(mut self, store: impl JournalStore + 'static) -> Self {
        self.journal = Some(Box::new(store));
        self
    }

    pub fn with_oracle(mut self, oracle: impl Oracle + 'static) -> Self {
        self.oracle = Some(Box::new(oracle));
        self
    }

    pub fn with_ranks(mut self, ranks: Vec<RankLevel>) -> Self {
        self.ranks = ranks;
        self
    }

    pub fn with_milestones(mut self, milestones: Vec<AchievementMilestone>) -> Self {
        self.milestones = milestones;
        self
    }

    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.clock_override = Some(now);
        self
    }

    pub fn build(self) -> anyhow::Result<StreakService> {
        let intervals = self.intervals.context("an interval store is required")?;
        let profiles = self.profiles.context("a profile store is required")?;
        let journal = self.journal.context("a journal store is required")?;

        ensure!(!self.ranks.is_empty(), "rank ladder must not be empty");
        ensure!(
            self.ranks[0].xp == 0,
            "rank ladder must start at a zero-XP floor"
        );
        ensure!(
            self.ranks
                .windows(2)
                .all(|pair| pair[0].xp <= pair[1].xp && pair[0].level < pair[1].level),
            "rank ladder must rise by level and threshold"
        );
        ensure!(
            self.milestones
                .iter()
                .all(|milestone| milestone.days.map_or(true, |days| days > 0)),
            "day milestones must use positive day thresholds"
        );

        Ok(StreakService {
            intervals,
            profiles,
            journal,
            oracle: self.oracle,
            ranks: self.ranks,
            milestones: self.milestones,
            clock_override: self.clock_override,
        })
    }
}

impl Default for StreakServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StreakService {
    pub fn builder() -> StreakServiceBuilder {
        StreakServiceBuilder::new()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock_override.unwrap_or_else(Utc::now)
    }

    pub fn ranks(&self) -> &[RankLevel] {
        &self.ranks
    }

    pub fn milestones(&self) -> &[AchievementMilestone] {
        &self.milestones
    }

    #[instrument(skip(self))]
    pub fn dashboard(&self) -> Result<DashboardSnapshot, ServiceError> {
        let now = self.now();
        let intervals = self.sorted_intervals(now)?;
        let profile = self.profile()?;
        Ok(dashboard::build(
            &intervals,
            &profile.goal,
            &self.ranks,
            &self.milestones,
            now,
        ))
    }

    pub fn intervals(&self) -> Result<Vec<IntervalSummary>, ServiceError> {
        let now = self.now();
        let intervals = self.sorted_intervals(now)?;
        let active_id = interval::active(&intervals).map(|interval| interval.id.clone());
        Ok(intervals
            .iter()
            .map(|interval| IntervalSummary {
                id: interval.id.clone(),
                started: interval.started_at(now),
                ended: (!interval.is_open()).then(|| interval.ended_at(now)),
                span: interval.span(now),
                goal_achieved: interval.goal_achieved,
                active: active_id.as_deref() == Some(interval.id.as_str()),
            })
            .collect())
    }

    /// Event ledger for one interval, most recent row first.
    #[instrument(skip(self))]
    pub fn history(&self, interval_id: &str) -> Result<Vec<StreakEvent>, ServiceError> {
        let now = self.now();
        let intervals = self.sorted_intervals(now)?;
        let profile = self.profile()?;
        let journal = self.journal.entries().map_err(ServiceError::Journal)?;
        let Some(interval) = intervals
            .iter()
            .find(|interval| interval.id == interval_id)
        else {
            return Err(ServiceError::UnknownInterval(interval_id.to_string()));
        };
        Ok(history::reconstruct(
            interval,
            &profile.goal,
            &self.milestones,
            &journal,
            now,
        ))
    }

    #[instrument(skip(self))]
    pub fn stats(&self) -> Result<StreakStats, ServiceError> {
        let now = self.now();
        let intervals = self.sorted_intervals(now)?;
        let profile = self.profile()?;
        Ok(stats::collect(
            &intervals,
            &profile.goal,
            &self.ranks,
            &self.milestones,
            now,
        ))
    }

    pub fn calendar(&self) -> Result<CalendarMarks, ServiceError> {
        let now = self.now();
        let intervals = self.sorted_intervals(now)?;
        let profile = self.profile()?;
        Ok(CalendarMarks::build(&intervals, &profile.goal, now))
    }

    pub fn calendar_month(&self, year: i32, month: u32) -> Result<MonthView, ServiceError> {
        self.calendar()?
            .month_view(year, month)
            .ok_or(ServiceError::InvalidMonth { year, month })
    }

    pub fn calendar_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DayCell>, ServiceError> {
        Ok(self.calendar()?.range_view(from, to))
    }

    pub fn projections(&self) -> Result<Vec<RankProjection>, ServiceError> {
        let now = self.now();
        let intervals = self.sorted_intervals(now)?;
        let profile = self.profile()?;
        let session = session_span(&intervals, now);
        Ok(projection::projections(
            session.days,
            &profile.goal,
            &self.ranks,
            &self.milestones,
            now,
        ))
    }

    pub fn achievements(&self) -> Result<Vec<MedalStatus>, ServiceError> {
        let now = self.now();
        let intervals = self.sorted_intervals(now)?;
        let profile = self.profile()?;
        Ok(self.medal_board(&intervals, &profile, now))
    }

    /// Share view, or `None` while sharing is disabled.
    #[instrument(skip(self))]
    pub fn public_view(&self) -> Result<Option<PublicSnapshot>, ServiceError> {
        let now = self.now();
        let profile = self.profile()?;
        if !profile.public_profile.enabled {
            debug!("public profile disabled");
            return Ok(None);
        }
        let intervals = self.sorted_intervals(now)?;
        let settings = profile.public_profile;

        let stats = settings.show_stats.then(|| {
            stats::collect(
                &intervals,
                &profile.goal,
                &self.ranks,
                &self.milestones,
                now,
            )
        });
        let awards = settings
            .show_awards
            .then(|| self.medal_board(&intervals, &profile, now));
        let calendar = settings
            .show_calendar
            .then(|| {
                CalendarMarks::build(&intervals, &profile.goal, now)
                    .month_view(now.year(), now.month())
            })
            .flatten();

        Ok(Some(PublicSnapshot {
            username: profile.username.clone(),
            stats,
            awards,
            calendar,
        }))
    }

    /// Always answers; a missing or failing oracle degrades to canned denials.
    pub fn oracle_verdict(&self) -> Result<String, ServiceError> {
        let now = self.now();
        let intervals = self.sorted_intervals(now)?;
        let profile = self.profile()?;
        let active = interval::active(&intervals);
        let session = active
            .map(|interval| interval.span(now))
            .unwrap_or_default();
        let current_xp = if active.is_some() {
            xp::active_xp(session.days, &profile.goal, &self.milestones)
        } else {
            0
        };
        let rank = levels::resolve(current_xp, &self.ranks);

        let verdict = match &self.oracle {
            None => oracle::canned_verdict(session.days).to_string(),
            Some(oracle) => match oracle.consult(session.days, &rank.title) {
                Ok(verdict) => verdict,
                Err(err) => {
                    warn!(%err, "oracle backend failed, answering offline");
                    oracle::OFFLINE_VERDICT.to_string()
                }
            },
        };
        Ok(verdict)
    }

    fn sorted_intervals(&self, now: DateTime<Utc>) -> Result<Vec<StreakInterval>, ServiceError> {
        let mut intervals = self
            .intervals
            .intervals()
            .map_err(ServiceError::Intervals)?;
        interval::sort_recent_first(&mut intervals, now);
        Ok(intervals)
    }

    fn profile(&self) -> Result<UserProfile, ServiceError> {
        self.profiles.profile().map_err(ServiceError::Profile)
    }

    fn medal_board(
        &self,
        intervals: &[StreakInterval],
        profile: &UserProfile,
        now: DateTime<Utc>,
    ) -> Vec<MedalStatus> {
        let active = interval::active(intervals);
        let session = active
            .map(|interval| interval.span(now))
            .unwrap_or_default();
        let goal_met = active.is_some()
            && profile
                .goal
                .day_target()
                .map_or(false, |target| session.days >= target);
        achievements::medal_statuses(&self.milestones, session.days, goal_met)
    }
}

fn session_span(intervals: &[StreakInterval], now: DateTime<Utc>) -> Span {
    interval::active(intervals)
        .map(|interval| interval.span(now))
        .unwrap_or_default()
}
