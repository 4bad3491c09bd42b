//! Streak milestone rewards.
//!
//! Ten fixed milestones (3, 7, 14, 30, 50, 100, 200, 365, 500, 1000
//! days), each bound to a named tier. A reward exists only for streak
//! counts that hit a milestone exactly; everything between milestones
//! yields nothing.

use serde::{Deserialize, Serialize};

use crate::xp;

/// Named reward bracket for a streak milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
    Master,
    Grandmaster,
    Legendary,
    Mythic,
    Immortal,
}

impl RewardTier {
    /// All tiers in ascending milestone order.
    pub const ALL: [RewardTier; 10] = [
        RewardTier::Bronze,
        RewardTier::Silver,
        RewardTier::Gold,
        RewardTier::Platinum,
        RewardTier::Diamond,
        RewardTier::Master,
        RewardTier::Grandmaster,
        RewardTier::Legendary,
        RewardTier::Mythic,
        RewardTier::Immortal,
    ];

    /// The streak count that triggers this tier.
    pub fn milestone_day(&self) -> u32 {
        match self {
            RewardTier::Bronze => 3,
            RewardTier::Silver => 7,
            RewardTier::Gold => 14,
            RewardTier::Platinum => 30,
            RewardTier::Diamond => 50,
            RewardTier::Master => 100,
            RewardTier::Grandmaster => 200,
            RewardTier::Legendary => 365,
            RewardTier::Mythic => 500,
            RewardTier::Immortal => 1000,
        }
    }

    /// Base bonus XP before log scaling.
    pub fn base_bonus_xp(&self) -> u32 {
        match self {
            RewardTier::Bronze => 50,
            RewardTier::Silver => 100,
            RewardTier::Gold => 250,
            RewardTier::Platinum => 500,
            RewardTier::Diamond => 1_000,
            RewardTier::Master => 2_500,
            RewardTier::Grandmaster => 5_000,
            RewardTier::Legendary => 10_000,
            RewardTier::Mythic => 25_000,
            RewardTier::Immortal => 50_000,
        }
    }

    /// Display title for the milestone.
    pub fn title(&self) -> &'static str {
        match self {
            RewardTier::Bronze => "Bronze Streak",
            RewardTier::Silver => "Silver Streak",
            RewardTier::Gold => "Gold Streak",
            RewardTier::Platinum => "Platinum Streak",
            RewardTier::Diamond => "Diamond Streak",
            RewardTier::Master => "Master Streak",
            RewardTier::Grandmaster => "Grandmaster Streak",
            RewardTier::Legendary => "Legendary Streak",
            RewardTier::Mythic => "Mythic Streak",
            RewardTier::Immortal => "Immortal Streak",
        }
    }

    /// Items granted at this milestone.
    pub fn item_ids(&self) -> &'static [&'static str] {
        match self {
            RewardTier::Bronze => &["bronze_streak_badge"],
            RewardTier::Silver => &["silver_streak_badge"],
            RewardTier::Gold => &["gold_streak_badge", "minor_xp_potion"],
            RewardTier::Platinum => &["platinum_streak_badge", "minor_xp_potion"],
            RewardTier::Diamond => &["diamond_streak_badge", "major_xp_potion"],
            RewardTier::Master => &["master_streak_crest", "major_xp_potion"],
            RewardTier::Grandmaster => &["grandmaster_streak_crest", "stat_reforge_token"],
            RewardTier::Legendary => &["legendary_streak_crown", "stat_reforge_token"],
            RewardTier::Mythic => &["mythic_streak_crown", "prismatic_xp_potion"],
            RewardTier::Immortal => &["immortal_streak_relic", "prismatic_xp_potion"],
        }
    }

    /// The tier for an exact milestone streak, if any.
    pub fn for_streak(streak_count: u32) -> Option<RewardTier> {
        RewardTier::ALL
            .into_iter()
            .find(|tier| tier.milestone_day() == streak_count)
    }
}

/// One-time reward granted when a streak hits a milestone exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakReward {
    pub milestone_day: u32,
    pub tier: RewardTier,
    /// `floor(tier_base * log10(streak + 1))`.
    pub bonus_xp: u32,
    pub bonus_item_ids: Vec<String>,
    /// The streak multiplier in effect at this milestone.
    pub multiplier: f64,
    pub achievement_ids: Vec<String>,
    pub title: String,
    pub description: String,
}

/// Reward for the given streak count, present only when the count is an
/// exact member of the milestone set.
pub fn streak_reward(streak_count: u32) -> Option<StreakReward> {
    let tier = RewardTier::for_streak(streak_count)?;

    let bonus_xp =
        (tier.base_bonus_xp() as f64 * ((streak_count + 1) as f64).log10()).floor() as u32;

    let mut achievement_ids = vec![format!("STREAK_{streak_count}_DAYS")];
    if streak_count >= 100 {
        achievement_ids.push("CENTURY_STREAK".to_string());
    }
    if tier == RewardTier::Legendary {
        achievement_ids.push("YEAR_STREAK_LEGEND".to_string());
    }
    if tier == RewardTier::Immortal {
        achievement_ids.push("ULTIMATE_DEDICATION".to_string());
    }

    Some(StreakReward {
        milestone_day: streak_count,
        tier,
        bonus_xp,
        bonus_item_ids: tier.item_ids().iter().map(|s| s.to_string()).collect(),
        multiplier: xp::streak_multiplier(streak_count),
        achievement_ids,
        title: tier.title().to_string(),
        description: format!("{streak_count} days of unbroken dedication"),
    })
}

/// The full milestone table, ascending. Static configuration baked into
/// the engine; exposed read-only for preview UIs.
pub fn milestones() -> [(u32, RewardTier); 10] {
    RewardTier::ALL.map(|tier| (tier.milestone_day(), tier))
}
