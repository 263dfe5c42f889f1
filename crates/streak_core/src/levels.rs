use serde::{Deserialize, Serialize};

/// One rung of the ladder; `xp` is the cumulative threshold for the title.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RankLevel {
    pub level: i64,
    pub xp: i64,
    pub title: String,
}

static BLANK_FLOOR: RankLevel = RankLevel {
    level: 0,
    xp: 0,
    title: String::new(),
};

fn rank(level: i64, xp: i64, title: &str) -> RankLevel {
    RankLevel {
        level,
        xp,
        title: title.to_string(),
    }
}

pub fn default_ranks() -> Vec<RankLevel> {
    vec![
        rank(1, 0, "NOVICE"),
        rank(2, 150, "APPRENTICE"),
        rank(3, 400, "JOURNEYMAN"),
        rank(4, 900, "EXPERT"),
        rank(5, 2500, "MASTER"),
        rank(6, 4500, "GRANDMASTER"),
        rank(7, 6500, "LEGEND"),
        rank(8, 8000, "DEMIGOD"),
    ]
}

/// Highest rank whose threshold fits within `xp`; the first entry is the
/// floor when nothing else qualifies, a blank rank if the ladder is empty.
pub fn resolve<'a>(xp: i64, ranks: &'a [RankLevel]) -> &'a RankLevel {
    ranks
        .iter()
        .rev()
        .find(|rank| xp >= rank.xp)
        .or_else(|| ranks.first())
        .unwrap_or(&BLANK_FLOOR)
}

pub fn next_after<'a>(current: &RankLevel, ranks: &'a [RankLevel]) -> Option<&'a RankLevel> {
    ranks.iter().find(|rank| rank.level == current.level + 1)
}

/// Whole-number percentage through the current rank band; 100 once the
/// top rank is held.
pub fn progress_percent(xp: i64, current: &RankLevel, next: Option<&RankLevel>) -> i64 {
    let Some(next) = next else {
        return 100;
    };
    let band = next.xp - current.xp;
    if band <= 0 {
        return 100;
    }
    (((xp - current.xp) as f64 / band as f64) * 100.0).round() as i64
}
