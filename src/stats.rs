//! Immutable per-archetype stat templates.
//!
//! The built-in archetypes carry the default lineup's numbers; custom sets can
//! be loaded from a RON document with [`load_templates`].

use crate::errors::SetupError;
use serde::{Deserialize, Serialize};

/// Immutable per-archetype values. Characters hold a copy of their template;
/// the template never changes during a match.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StatsTemplate {
    pub name: String,
    pub max_health: u32,
    /// Movement budget granted at the start of each turn.
    pub speed: u32,
    pub melee_damage: u32,
    pub ranged_damage: u32,
    pub max_ranged_distance: u32,
    pub can_use_ranged: bool,
    pub heal_amount: u32,
    pub can_heal: bool,
    pub can_heal_others: bool,
    pub max_heal_distance: u32,
}

impl StatsTemplate {
    /// Whether any attack is usable at the given Chebyshev distance.
    pub fn can_attack_at(&self, distance: u32) -> bool {
        distance == 1 || (self.can_use_ranged && distance > 1 && distance <= self.max_ranged_distance)
    }

    /// Damage dealt at the given distance: melee at 1, ranged inside the
    /// ranged band, otherwise 0.
    pub fn attack_damage_at(&self, distance: u32) -> u32 {
        if distance == 1 {
            self.melee_damage
        } else if self.can_use_ranged && distance > 1 && distance <= self.max_ranged_distance {
            self.ranged_damage
        } else {
            0
        }
    }

    /// Melee bruiser with a small self-heal.
    pub fn fighter() -> Self {
        Self {
            name: "Fighter".to_string(),
            max_health: 20,
            speed: 3,
            melee_damage: 5,
            ranged_damage: 0,
            max_ranged_distance: 0,
            can_use_ranged: false,
            heal_amount: 2,
            can_heal: true,
            can_heal_others: false,
            max_heal_distance: 0,
        }
    }

    /// Support unit; the only archetype that heals others.
    pub fn healer() -> Self {
        Self {
            name: "Healer".to_string(),
            max_health: 15,
            speed: 2,
            melee_damage: 2,
            ranged_damage: 2,
            max_ranged_distance: 3,
            can_use_ranged: true,
            heal_amount: 5,
            can_heal: true,
            can_heal_others: true,
            max_heal_distance: 2,
        }
    }

    /// Fast skirmisher with effectively unlimited ranged reach.
    pub fn ranger() -> Self {
        Self {
            name: "Ranger".to_string(),
            max_health: 15,
            speed: 4,
            melee_damage: 1,
            ranged_damage: 3,
            max_ranged_distance: 99,
            can_use_ranged: true,
            heal_amount: 2,
            can_heal: true,
            can_heal_others: false,
            max_heal_distance: 0,
        }
    }

    pub fn enemy() -> Self {
        Self {
            name: "Enemy".to_string(),
            max_health: 10,
            speed: 1,
            melee_damage: 3,
            ranged_damage: 1,
            max_ranged_distance: 3,
            can_use_ranged: true,
            heal_amount: 0,
            can_heal: false,
            can_heal_others: false,
            max_heal_distance: 0,
        }
    }
}

/// Parses a RON document containing a list of templates.
pub fn load_templates(source: &str) -> Result<Vec<StatsTemplate>, SetupError> {
    ron::from_str(source).map_err(|err| SetupError::MalformedTemplates(err.to_string()))
}
