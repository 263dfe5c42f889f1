use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use streak_core::achievements::MedalStatus;
use streak_core::calendar::{DayCell, MonthView};
use streak_core::dashboard::DashboardSnapshot;
use streak_core::history::StreakEvent;
use streak_core::interval::StreakInterval;
use streak_core::journal::JournalEntry;
use streak_core::profile::{GoalConfig, PublicProfileSettings, UserProfile};
use streak_core::projection::{RankEta, RankProjection};
use streak_core::service::IntervalSummary;
use streak_core::stats::StreakStats;
use streak_core::store::{AccountSnapshot, MemoryStore};
use streak_core::StreakService;
use tracing::info;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub(crate) data_path: Option<PathBuf>,
    pub(crate) clock_override: Option<DateTime<Utc>>,
    pub(crate) calendar_months: u32,
    pub(crate) history_rows: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(path) = std::env::var("STREAK_DATA") {
            if !path.trim().is_empty() {
                config.data_path = Some(PathBuf::from(path));
            }
        }
        if let Ok(now) = std::env::var("STREAK_NOW") {
            if let Ok(instant) = DateTime::parse_from_rfc3339(now.trim()) {
                config.clock_override = Some(instant.with_timezone(&Utc));
            }
        }
        if let Ok(months) = std::env::var("STREAK_CALENDAR_MONTHS") {
            if let Ok(value) = months.trim().parse::<u32>() {
                if value > 0 {
                    config.calendar_months = value;
                }
            }
        }
        if let Ok(rows) = std::env::var("STREAK_HISTORY_ROWS") {
            if let Ok(value) = rows.trim().parse::<usize>() {
                if value > 0 {
                    config.history_rows = value;
                }
            }
        }
        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            clock_override: None,
            calendar_months: 3,
            history_rows: 7,
        }
    }
}

pub fn run(config: AppConfig) -> Result<()> {
    info!("rendering streak report");
    let report = render_report(&config)?;
    println!("{report}");
    Ok(())
}

/// Builds the whole terminal report as one string.
pub fn render_report(config: &AppConfig) -> Result<String> {
    let now = config.clock_override.unwrap_or_else(Utc::now);
    let store = Arc::new(load_store(config, now)?);
    let username = store.snapshot().profile.username;
    let service = StreakService::builder()
        .with_intervals(store.clone())
        .with_profiles(store.clone())
        .with_journal(store)
        .with_now(now)
        .build()?;

    let dashboard = service.dashboard()?;
    let summaries = service.intervals()?;
    let medals = service.achievements()?;
    let stats = service.stats()?;
    let outlook = service.projections()?;
    let verdict = service.oracle_verdict()?;

    let mut out = String::new();
    out.push_str("STREAKER\n========\n");
    if let Some(name) = username {
        out.push_str(&format!("Operative: {name}\n"));
    }
    out.push('\n');

    render_status(&mut out, &dashboard);
    render_goal(&mut out, &dashboard);
    render_medals(&mut out, &medals);
    render_stats(&mut out, &stats);
    render_outlook(&mut out, &outlook);
    render_calendars(&mut out, &service, now, config.calendar_months)?;
    render_history(&mut out, &service, &summaries, config.history_rows)?;
    render_intervals(&mut out, &summaries);

    out.push_str(&format!("THE ORACLE SAYS: {verdict}\n"));
    Ok(out)
}

fn load_store(config: &AppConfig, now: DateTime<Utc>) -> Result<MemoryStore> {
    let Some(path) = &config.data_path else {
        info!("no data file configured, rendering the built-in sample account");
        return Ok(MemoryStore::new(sample_snapshot(now)));
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read data file {}", path.display()))?;
    let store = MemoryStore::from_json_str(&raw)
        .with_context(|| format!("failed to decode account export {}", path.display()))?;
    info!(path = %path.display(), "loaded account snapshot");
    Ok(store)
}

/// Demo account used when no data file is configured, laid out relative
/// to `now`.
fn sample_snapshot(now: DateTime<Utc>) -> AccountSnapshot {
    let open_start = now - Duration::days(12) - Duration::hours(6);
    let closed_start = now - Duration::days(45);
    let closed_end = now - Duration::days(24);
    AccountSnapshot {
        profile: UserProfile {
            username: Some("DEMO OPERATIVE".to_string()),
            goal: GoalConfig::days(30),
            public_profile: PublicProfileSettings {
                enabled: true,
                show_stats: true,
                show_awards: true,
                show_calendar: false,
            },
        },
        intervals: vec![
            StreakInterval::open("sample-current", open_start),
            StreakInterval::closed("sample-previous", closed_start, closed_end, 127, false),
        ],
        journal: vec![
            JournalEntry {
                id: "sample-note-1".to_string(),
                text: "Back on the wagon.".to_string(),
                date: Some(open_start.into()),
                pinned: true,
            },
            JournalEntry::new(
                "sample-note-2",
                "One week down.",
                open_start + Duration::days(7),
            ),
        ],
    }
}

fn render_status(out: &mut String, dashboard: &DashboardSnapshot) {
    out.push_str("STATUS\n");
    if dashboard.active {
        out.push_str(&format!("  CURRENT STREAK: {}\n", dashboard.session));
    } else {
        out.push_str("  CURRENT STREAK: none\n");
    }
    out.push_str(&format!("  XP: {}\n", dashboard.xp));
    out.push_str(&format!(
        "  RANK: {} (level {})\n",
        dashboard.rank.title, dashboard.rank.level
    ));
    match (&dashboard.next_rank, &dashboard.rank_eta) {
        (Some(next), Some(eta)) => {
            out.push_str(&format!(
                "  NEXT: {} at {} XP {} {}%, {}\n",
                next.title,
                next.xp,
                progress_bar(dashboard.rank_progress_percent as f64, 10),
                dashboard.rank_progress_percent,
                eta_label(eta)
            ));
        }
        _ => out.push_str("  NEXT: top rank held\n"),
    }
    out.push('\n');
}

fn render_goal(out: &mut String, dashboard: &DashboardSnapshot) {
    out.push_str(&format!("GOAL: {}\n", dashboard.goal.label));
    out.push_str(&format!(
        "  {} {:.0}% ({})\n\n",
        progress_bar(dashboard.goal.percent, 10),
        dashboard.goal.percent,
        dashboard.goal.detail
    ));
}

fn render_medals(out: &mut String, medals: &[MedalStatus]) {
    let unlocked = medals.iter().filter(|medal| medal.unlocked).count();
    out.push_str(&format!("MEDALS ({unlocked}/{})\n", medals.len()));
    for medal in medals {
        let mark = if medal.unlocked { "x" } else { " " };
        let requirement = match medal.milestone.days {
            Some(days) => format!("{days} days"),
            None => medal
                .milestone
                .description
                .clone()
                .unwrap_or_else(|| "special".to_string()),
        };
        out.push_str(&format!(
            "  [{mark}] {} {} ({requirement}, +{} XP)\n",
            medal.milestone.icon, medal.milestone.name, medal.milestone.xp
        ));
    }
    out.push('\n');
}

fn render_stats(out: &mut String, stats: &StreakStats) {
    out.push_str("STATS\n");
    out.push_str(&format!(
        "  Current: {}   Record: {}\n",
        stats.current, stats.record
    ));
    out.push_str(&format!(
        "  Average: {:.1} days   This year: {:.1} days\n",
        stats.average_days, stats.ytd_days
    ));
    out.push_str(&format!(
        "  Peak: {} XP ({})\n\n",
        stats.peak_xp, stats.peak_rank.title
    ));
}

fn render_outlook(out: &mut String, outlook: &[RankProjection]) {
    out.push_str("RANK OUTLOOK\n");
    if outlook.is_empty() {
        out.push_str("  Top rank held. Nothing left to chase.\n");
    }
    for row in outlook {
        out.push_str(&format!(
            "  {} ({} XP): {}\n",
            row.rank.title,
            row.rank.xp,
            eta_label(&row.eta)
        ));
    }
    out.push('\n');
}

fn render_calendars(
    out: &mut String,
    service: &StreakService,
    now: DateTime<Utc>,
    months: u32,
) -> Result<()> {
    out.push_str("CALENDAR\n");
    for (year, month) in month_sequence(now, months) {
        let view = service.calendar_month(year, month)?;
        render_month(out, &view);
    }
    out.push_str("  # active  S start  E end  R restart  G goal  @ today\n\n");
    Ok(())
}

fn render_month(out: &mut String, view: &MonthView) {
    let title = NaiveDate::from_ymd_opt(view.year, view.month, 1)
        .map(|first| first.format("%B %Y").to_string())
        .unwrap_or_else(|| format!("{}-{:02}", view.year, view.month));
    out.push_str(&format!("  {title}\n"));
    out.push_str("  Su Mo Tu We Th Fr Sa\n");
    let mut cells: Vec<String> = vec![" ".to_string(); view.leading_blanks as usize];
    cells.extend(view.days.iter().map(|cell| day_marker(cell).to_string()));
    for week in cells.chunks(7) {
        out.push_str("   ");
        out.push_str(&week.join("  "));
        out.push('\n');
    }
}

fn day_marker(cell: &DayCell) -> char {
    if cell.goal_target {
        'G'
    } else if cell.started && cell.ended.is_some() {
        'R'
    } else if cell.started {
        'S'
    } else if cell.ended.is_some() {
        'E'
    } else if cell.today {
        '@'
    } else if cell.active {
        '#'
    } else {
        '.'
    }
}

fn render_history(
    out: &mut String,
    service: &StreakService,
    summaries: &[IntervalSummary],
    rows: usize,
) -> Result<()> {
    out.push_str("RECENT HISTORY\n");
    let Some(active) = summaries.iter().find(|summary| summary.active) else {
        out.push_str("  No streak running.\n\n");
        return Ok(());
    };
    let ledger = service.history(&active.id)?;
    for event in ledger.iter().take(rows) {
        render_event(out, event);
    }
    if ledger.len() > rows {
        out.push_str(&format!("  ... {} earlier rows\n", ledger.len() - rows));
    }
    out.push('\n');
    Ok(())
}

fn render_event(out: &mut String, event: &StreakEvent) {
    out.push_str(&format!(
        "  {}  {:<24} +{} XP\n",
        event.date, event.kind, event.xp
    ));
}

fn render_intervals(out: &mut String, summaries: &[IntervalSummary]) {
    out.push_str("STREAK LOG\n");
    if summaries.is_empty() {
        out.push_str("  Empty. Start a streak.\n");
    }
    for summary in summaries {
        let marker = if summary.active { "*" } else { " " };
        let ended = match summary.ended {
            Some(ended) => ended.date_naive().to_string(),
            None => "open".to_string(),
        };
        let goal = if summary.goal_achieved { "  goal met" } else { "" };
        out.push_str(&format!(
            "  {marker} {}  {} -> {}  {}{goal}\n",
            summary.id,
            summary.started.date_naive(),
            ended,
            summary.span
        ));
    }
    out.push('\n');
}

fn eta_label(eta: &RankEta) -> String {
    match eta {
        RankEta::Within { days, date } => format!("in {days} days ({date})"),
        RankEta::Unreachable => "> 13 YEARS".to_string(),
    }
}

fn progress_bar(percent: f64, width: usize) -> String {
    let clamped = percent.clamp(0.0, 100.0);
    let filled = (((clamped / 100.0) * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}

fn month_sequence(now: DateTime<Utc>, count: u32) -> Vec<(i32, u32)> {
    let mut months = Vec::new();
    let (mut year, mut month) = (now.year(), now.month());
    for _ in 0..count.max(1) {
        months.push((year, month));
        let (prev_year, prev_month) = previous_month(year, month);
        year = prev_year;
        month = prev_month;
    }
    months.reverse();
    months
}

fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_bar_covers_both_endpoints() {
        assert_eq!(progress_bar(0.0, 10), "[..........]");
        assert_eq!(progress_bar(100.0, 10), "[##########]");
        assert_eq!(progress_bar(250.0, 10), "[##########]");
        assert_eq!(progress_bar(53.0, 10), "[#####.....]");
    }

    #[test]
    fn month_walk_crosses_year_boundaries() {
        assert_eq!(previous_month(2024, 1), (2023, 12));
        assert_eq!(previous_month(2024, 5), (2024, 4));

        let now = DateTime::parse_from_rfc3339("2024-02-10T00:00:00Z")
            .expect("fixture instant")
            .with_timezone(&Utc);
        assert_eq!(
            month_sequence(now, 3),
            vec![(2023, 12), (2024, 1), (2024, 2)]
        );
        assert_eq!(month_sequence(now, 0), vec![(2024, 2)]);
    }

    #[test]
    fn eta_labels_spell_out_the_ceiling() {
        assert_eq!(eta_label(&RankEta::Unreachable), "> 13 YEARS");
        let within = RankEta::Within {
            days: 29,
            date: NaiveDate::from_ymd_opt(2024, 5, 30).expect("fixture date"),
        };
        assert_eq!(eta_label(&within), "in 29 days (2024-05-30)");
    }
}
