use serde::{Deserialize, Serialize};

/// One medal in the catalogue. Day-based medals carry a threshold in
/// elapsed days; the goal-type medal has none.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AchievementMilestone {
    pub name: String,
    pub icon: String,
    pub xp: i64,
    pub days: Option<i64>,
    pub description: Option<String>,
}

fn medal(days: i64, name: &str, icon: &str, xp: i64) -> AchievementMilestone {
    AchievementMilestone {
        name: name.to_string(),
        icon: icon.to_string(),
        xp,
        days: Some(days),
        description: None,
    }
}

pub fn default_milestones() -> Vec<AchievementMilestone> {
    let mut milestones = vec![AchievementMilestone {
        name: "Goal Getter".to_string(),
        icon: "🏁".to_string(),
        xp: 10,
        days: None,
        description: Some("Achieve your set goal in a streak.".to_string()),
    }];
    milestones.extend([
        medal(1, "Gotta Start Somewhere", "🌱", 10),
        medal(7, "7-Day Streak", "⭐", 25),
        medal(14, "2-Week Streak", "📅", 50),
        medal(30, "30-Day Streak", "🏆", 125),
        medal(60, "Two-Month Trekker", "🚶‍♂️", 200),
        medal(90, "Three-Month Shield", "🛡️", 300),
        medal(100, "100-Day Streak", "💯", 100),
        medal(120, "Four-Month Fortress", "🏰", 350),
        medal(150, "Five-Month Focus", "👁️", 400),
        medal(180, "Six-Month Soarer", "🕊️", 500),
        medal(210, "Seven-Month Samurai", "⚔️", 600),
        medal(240, "Eight-Month Elite", "💎", 700),
        medal(270, "Nine-Month Nirvana", "🧘‍♂️", 800),
        medal(300, "Ten-Month Titan", "🗿", 900),
        medal(330, "Eleven-Month Emperor", "👑", 950),
        medal(365, "One-Year Victor", "🏅", 1000),
    ]);
    milestones
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MedalStatus {
    pub milestone: AchievementMilestone,
    pub unlocked: bool,
}

/// Medals reflect the streak in progress only; nothing carries over from
/// closed intervals.
pub fn medal_statuses(
    milestones: &[AchievementMilestone],
    streak_days: i64,
    goal_met: bool,
) -> Vec<MedalStatus> {
    milestones
        .iter()
        .map(|milestone| MedalStatus {
            unlocked: match milestone.days {
                Some(threshold) => streak_days >= threshold,
                None => goal_met,
            },
            milestone: milestone.clone(),
        })
        .collect()
}
