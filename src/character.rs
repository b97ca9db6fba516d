use crate::grid::Cell;
use crate::stats::StatsTemplate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable roster index of a character. Ids are assigned at match setup and
/// never reused within a match.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharacterId(pub u32);

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which side of the battle a character fights on.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }
}

/// Who drives a character's turns. Dispatched by the scheduler via matching,
/// never by virtual dispatch.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Waits for external try_move / try_execute_action calls.
    Human,
    /// Driven by the scheduler's turn policy after the pacing delay.
    Ai,
}

/// A combatant. Created at match setup and never reparented; death vacates
/// its grid cell and sets `is_dead`, but the record persists for UI/history.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub side: Side,
    pub control: Control,
    pub stats: StatsTemplate,
    pub current_health: u32,
    pub position: Cell,
    pub is_dead: bool,
    pub has_moved: bool,
    pub has_acted: bool,
}

impl Character {
    pub fn new(
        id: CharacterId,
        name: impl Into<String>,
        side: Side,
        control: Control,
        stats: StatsTemplate,
        position: Cell,
    ) -> Self {
        let current_health = stats.max_health;
        Self {
            id,
            name: name.into(),
            side,
            control,
            stats,
            current_health,
            position,
            is_dead: false,
            has_moved: false,
            has_acted: false,
        }
    }

    /// Both turn flags set: nothing left to do this turn.
    pub fn has_finished_turn(&self) -> bool {
        self.has_moved && self.has_acted
    }

    /// Applies damage, clamped at 0. Returns true iff the character died from
    /// this call. Dead characters ignore further damage.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        if self.is_dead {
            return false;
        }
        self.current_health = self.current_health.saturating_sub(amount);
        if self.current_health == 0 {
            self.is_dead = true;
            return true;
        }
        false
    }

    /// Restores health, clamped at max. Returns the amount actually restored.
    /// Dead characters cannot be healed.
    pub fn heal(&mut self, amount: u32) -> u32 {
        if self.is_dead {
            return 0;
        }
        let before = self.current_health;
        self.current_health = (self.current_health + amount).min(self.stats.max_health);
        self.current_health - before
    }

    /// Clears the per-turn flags at the start of this character's turn.
    pub fn start_turn(&mut self) {
        self.has_moved = false;
        self.has_acted = false;
    }

    /// Marks the turn as fully spent (used by forced turn ends).
    pub fn end_turn(&mut self) {
        self.has_moved = true;
        self.has_acted = true;
    }
}
