use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(flatten)]
    pub goal: GoalConfig,
    #[serde(default)]
    pub public_profile: PublicProfileSettings,
}

/// Goal in one of two forms: reach a day count, or hold out until a
/// calendar date. Saving one form clears the other.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct GoalConfig {
    #[serde(alias = "goal")]
    pub target_days: Option<i64>,
    #[serde(alias = "goalDate")]
    pub target_date: Option<NaiveDate>,
}

impl GoalConfig {
    pub fn days(target_days: i64) -> Self {
        Self {
            target_days: Some(target_days),
            target_date: None,
        }
    }

    pub fn date(target_date: NaiveDate) -> Self {
        Self {
            target_days: None,
            target_date: Some(target_date),
        }
    }

    /// Day-count target; non-positive stored values count as no goal.
    pub fn day_target(&self) -> Option<i64> {
        self.target_days.filter(|days| *days > 0)
    }

    pub fn is_set(&self) -> bool {
        self.day_target().is_some() || self.target_date.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct PublicProfileSettings {
    pub enabled: bool,
    pub show_stats: bool,
    pub show_awards: bool,
    pub show_calendar: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_export_field_spellings() {
        let profile: UserProfile = serde_json::from_str(
            "{\"username\": \"kp\", \"goal\": 30, \"publicProfile\": {\"enabled\": true}}",
        )
        .expect("day goal export");
        assert_eq!(profile.username.as_deref(), Some("kp"));
        assert_eq!(profile.goal.day_target(), Some(30));
        assert!(profile.public_profile.enabled);
        assert!(!profile.public_profile.show_stats);

        let dated: UserProfile =
            serde_json::from_str("{\"goalDate\": \"2024-06-01\"}").expect("date goal export");
        assert_eq!(
            dated.goal.target_date,
            NaiveDate::from_ymd_opt(2024, 6, 1)
        );
        assert!(dated.goal.day_target().is_none());
    }

    #[test]
    fn zero_day_goal_behaves_unset() {
        let goal = GoalConfig::days(0);
        assert_eq!(goal.day_target(), None);
        assert!(!goal.is_set());

        let negative = GoalConfig::days(-5);
        assert_eq!(negative.day_target(), None);
    }

    #[test]
    fn empty_object_decodes_to_defaults() {
        let profile: UserProfile = serde_json::from_str("{}").expect("empty profile");
        assert_eq!(profile, UserProfile::default());
        assert!(!profile.goal.is_set());
    }
}
