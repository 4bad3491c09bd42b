//! Character stats and stat-bonus value types.
//!
//! [`UserStats`] is the persistent record the caller owns; the engine
//! only ever produces new copies via pure transforms.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A character attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Strength,
    Wisdom,
    Agility,
    Endurance,
    Luck,
}

impl Stat {
    /// All stats, in canonical order.
    pub const ALL: [Stat; 5] = [
        Stat::Strength,
        Stat::Wisdom,
        Stat::Agility,
        Stat::Endurance,
        Stat::Luck,
    ];

    /// Stable lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Stat::Strength => "strength",
            Stat::Wisdom => "wisdom",
            Stat::Agility => "agility",
            Stat::Endurance => "endurance",
            Stat::Luck => "luck",
        }
    }

    /// Which stat a task category trains, if any.
    ///
    /// Lookup is case-insensitive; unknown categories train nothing.
    pub fn for_category(category: &str) -> Option<Stat> {
        match category.trim().to_ascii_lowercase().as_str() {
            "fitness" => Some(Stat::Strength),
            "learning" | "creative" | "mindfulness" | "skills" => Some(Stat::Wisdom),
            "social" | "hobby" => Some(Stat::Agility),
            "productivity" | "health" | "work" => Some(Stat::Endurance),
            _ => None,
        }
    }
}

/// Partial map of stat -> bonus points. Keys with zero bonus are omitted.
///
/// BTreeMap keeps serialization order deterministic.
pub type StatBonuses = BTreeMap<Stat, u32>;

/// Persistent character attributes. Defaults to 5 in every stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub strength: u32,
    pub wisdom: u32,
    pub agility: u32,
    pub endurance: u32,
    pub luck: u32,
}

impl Default for UserStats {
    fn default() -> Self {
        Self {
            strength: Self::BASE_VALUE,
            wisdom: Self::BASE_VALUE,
            agility: Self::BASE_VALUE,
            endurance: Self::BASE_VALUE,
            luck: Self::BASE_VALUE,
        }
    }
}

impl UserStats {
    /// Starting value of every stat for a fresh character.
    pub const BASE_VALUE: u32 = 5;

    /// Read a single stat.
    pub fn get(&self, stat: Stat) -> u32 {
        match stat {
            Stat::Strength => self.strength,
            Stat::Wisdom => self.wisdom,
            Stat::Agility => self.agility,
            Stat::Endurance => self.endurance,
            Stat::Luck => self.luck,
        }
    }

    /// Overwrite a single stat.
    pub fn set(&mut self, stat: Stat, value: u32) {
        match stat {
            Stat::Strength => self.strength = value,
            Stat::Wisdom => self.wisdom = value,
            Stat::Agility => self.agility = value,
            Stat::Endurance => self.endurance = value,
            Stat::Luck => self.luck = value,
        }
    }

    /// Sum of all allocated points.
    pub fn total(&self) -> u32 {
        Stat::ALL.iter().map(|s| self.get(*s)).sum()
    }

    /// Return a copy with each bonus added to its stat. Absent keys add
    /// zero. Pure and total.
    pub fn with_bonuses(&self, bonuses: &StatBonuses) -> UserStats {
        let mut next = *self;
        for (stat, points) in bonuses {
            next.set(*stat, next.get(*stat).saturating_add(*points));
        }
        next
    }
}
