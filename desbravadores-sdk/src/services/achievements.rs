use std::collections::HashSet;

use tracing::debug;

use crate::{
    client::ApiClient,
    errors::Result,
    models::{Achievement, UserProfile},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchievementView {
    pub achievement: Achievement,
    pub unlocked: bool,
}

impl Achievement {
    pub fn icon_url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.icon)
    }
}

/// Mark catalog entries the profile holds a badge for. Badges are matched
/// to achievements by exact name.
pub fn merge_unlocked(catalog: Vec<Achievement>, profile: &UserProfile) -> Vec<AchievementView> {
    let unlocked: HashSet<&str> = profile.badges.iter().map(|b| b.name.as_str()).collect();
    catalog
        .into_iter()
        .map(|achievement| {
            let unlocked = unlocked.contains(achievement.name.as_str());
            AchievementView {
                achievement,
                unlocked,
            }
        })
        .collect()
}

pub fn unlocked_xp(views: &[AchievementView]) -> u32 {
    views
        .iter()
        .filter(|v| v.unlocked)
        .map(|v| v.achievement.xp_reward)
        .sum()
}

/// Fetch the catalog and the caller's profile, then merge them.
pub async fn load_achievements(client: &ApiClient) -> Result<Vec<AchievementView>> {
    let (catalog, profile) = tokio::try_join!(client.achievements(), client.my_profile())?;
    debug!(
        "Loaded {} achievements, {} badges",
        catalog.len(),
        profile.badges.len()
    );
    Ok(merge_unlocked(catalog, &profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Badge;

    fn achievement(id: i64, name: &str, xp: u32) -> Achievement {
        Achievement {
            id,
            name: name.to_string(),
            description: String::new(),
            icon: format!("/icons/{}.png", id),
            xp_reward: xp,
        }
    }

    #[test]
    fn unlocks_by_name() {
        let profile = UserProfile {
            badges: vec![
                Badge { id: 90, name: "Primeiros Socorros".to_string() },
                Badge { id: 91, name: "Sem correspondência".to_string() },
            ],
        };
        let views = merge_unlocked(
            vec![
                achievement(1, "Primeiros Socorros", 50),
                achievement(2, "Nós e Amarras", 30),
                achievement(3, "primeiros socorros", 10),
            ],
            &profile,
        );

        let unlocked: Vec<bool> = views.iter().map(|v| v.unlocked).collect();
        assert_eq!(unlocked, vec![true, false, false]);
        assert_eq!(unlocked_xp(&views), 50);
    }

    #[test]
    fn icon_url_joins_base() {
        let a = achievement(4, "x", 0);
        assert_eq!(a.icon_url("http://host:8080/"), "http://host:8080/icons/4.png");
    }
}
