//! Shared builders for the combat integration tests.

use crate::character::{Character, CharacterId, Control, Side};
use crate::combat::ai::NearestFoePolicy;
use crate::combat::movement::MoveMode;
use crate::combat::orchestrator::CombatOrchestrator;
use crate::grid::{Cell, Grid};
use crate::roster::Roster;
use crate::setup::MatchConfig;
use crate::stats::StatsTemplate;
use std::time::Duration;

/// Builds a match with hand-placed characters and no AI pacing delay, so
/// tests drive everything synchronously.
pub struct MatchBuilder {
    width: i32,
    height: i32,
    placements: Vec<(StatsTemplate, Side, Control, Cell)>,
}

impl MatchBuilder {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            placements: Vec::new(),
        }
    }

    pub fn with(
        mut self,
        stats: StatsTemplate,
        side: Side,
        control: Control,
        cell: Cell,
    ) -> Self {
        self.placements.push((stats, side, control, cell));
        self
    }

    pub fn build(self) -> CombatOrchestrator {
        let mut grid = Grid::new(self.width, self.height);
        let mut characters = Vec::new();
        for (index, (stats, side, control, cell)) in self.placements.into_iter().enumerate() {
            let id = CharacterId(index as u32);
            assert!(grid.can_enter(cell), "placement {} overlaps", cell);
            grid.occupy(cell, id);
            characters.push(Character::new(
                id,
                format!("{} {}", stats.name, index),
                side,
                control,
                stats,
                cell,
            ));
        }
        let roster = Roster::new(characters).expect("valid test roster");
        let config = MatchConfig {
            grid_width: self.width,
            grid_height: self.height,
            ai_turn_delay: Duration::ZERO,
        };
        CombatOrchestrator::new(
            grid,
            roster,
            MoveMode::Path,
            Box::new(NearestFoePolicy::new()),
            &config,
        )
    }
}

/// Fighter and healer (human) against a single enemy, all far enough apart
/// that nothing starts in attack range.
pub fn standard_skirmish() -> CombatOrchestrator {
    MatchBuilder::new(6, 6)
        .with(StatsTemplate::fighter(), Side::Player, Control::Human, Cell::new(0, 0))
        .with(StatsTemplate::healer(), Side::Player, Control::Human, Cell::new(1, 0))
        .with(StatsTemplate::enemy(), Side::Enemy, Control::Human, Cell::new(0, 4))
        .build()
}
