//! Per-turn movement budgets and their enforcement.
//!
//! The ledger owns the remaining-budget table; the grid owns passability; the
//! roster owns positions. A move that fails validation changes none of them.

use crate::character::CharacterId;
use crate::errors::MovementError;
use crate::grid::{Cell, Grid};
use crate::pathfinding::{self, ORTHOGONAL_COST};
use crate::roster::Roster;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How a turn's movement budget may be spent.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveMode {
    /// Pathfind to any reachable cell; the whole path cost is deducted at once.
    Path,
    /// One orthogonal step at a time, cost 1 per step.
    SingleStep,
}

/// Tracks how much movement each character has left this round.
///
/// Budgets are granted at turn start (the character's speed), spent through
/// [`MovementLedger::try_move`], and zeroed when the turn ends. A character
/// with no entry simply has no budget.
#[derive(Debug, Clone)]
pub struct MovementLedger {
    mode: MoveMode,
    remaining: HashMap<CharacterId, u32>,
}

impl MovementLedger {
    pub fn new(mode: MoveMode) -> Self {
        Self {
            mode,
            remaining: HashMap::new(),
        }
    }

    pub fn mode(&self) -> MoveMode {
        self.mode
    }

    /// Grants the actor a fresh budget equal to its speed.
    pub fn start_turn(&mut self, actor_id: CharacterId, speed: u32) {
        self.remaining.insert(actor_id, speed);
    }

    /// Forfeits whatever budget the actor had left.
    pub fn end_turn(&mut self, actor_id: CharacterId) {
        if let Some(budget) = self.remaining.get_mut(&actor_id) {
            *budget = 0;
        }
    }

    pub fn remaining(&self, actor_id: CharacterId) -> u32 {
        self.remaining.get(&actor_id).copied().unwrap_or(0)
    }

    pub fn can_move_to(
        &self,
        grid: &Grid,
        roster: &Roster,
        actor_id: CharacterId,
        destination: Cell,
    ) -> bool {
        self.plan(grid, roster, actor_id, destination, self.mode).is_ok()
    }

    /// Single-step legality check, independent of the ledger's own mode.
    pub fn can_step(
        &self,
        grid: &Grid,
        roster: &Roster,
        actor_id: CharacterId,
        destination: Cell,
    ) -> bool {
        self.plan(grid, roster, actor_id, destination, MoveMode::SingleStep)
            .is_ok()
    }

    /// The cost a move to `destination` would deduct right now, or None when
    /// the move is currently illegal.
    pub fn movement_cost(
        &self,
        grid: &Grid,
        roster: &Roster,
        actor_id: CharacterId,
        destination: Cell,
    ) -> Option<u32> {
        self.plan(grid, roster, actor_id, destination, self.mode).ok()
    }

    /// Validates a move without mutating anything. Returns the cost it would
    /// deduct.
    fn plan(
        &self,
        grid: &Grid,
        roster: &Roster,
        actor_id: CharacterId,
        destination: Cell,
        mode: MoveMode,
    ) -> Result<u32, MovementError> {
        let actor = roster
            .get(actor_id)
            .ok_or(MovementError::UnknownActor(actor_id))?;
        if actor.is_dead {
            return Err(MovementError::ActorDead);
        }
        let remaining = self.remaining(actor_id);
        if remaining == 0 {
            return Err(MovementError::NoBudget);
        }
        if !grid.can_enter(destination) {
            return Err(MovementError::DestinationBlocked(destination));
        }

        match mode {
            MoveMode::Path => pathfinding::find_path(grid, actor.position, destination, remaining)
                .map(|path| path.cost)
                .ok_or(MovementError::NoPath),
            MoveMode::SingleStep => {
                if actor.position.manhattan_distance(destination) != 1 {
                    return Err(MovementError::NotAdjacent(destination));
                }
                Ok(ORTHOGONAL_COST)
            }
        }
    }

    /// Moves the actor to `destination`, deducting the path (or step) cost.
    /// Position, occupancy and budget are updated together; a spent budget
    /// marks the actor as having moved this turn. Returns the cost deducted.
    pub fn try_move(
        &mut self,
        grid: &mut Grid,
        roster: &mut Roster,
        actor_id: CharacterId,
        destination: Cell,
    ) -> Result<u32, MovementError> {
        let cost = self.plan(grid, roster, actor_id, destination, self.mode)?;
        self.apply(grid, roster, actor_id, destination, cost);
        Ok(cost)
    }

    /// Single-step variant of [`MovementLedger::try_move`]: one orthogonal
    /// cell for exactly one budget point, regardless of the ledger's mode.
    pub fn step(
        &mut self,
        grid: &mut Grid,
        roster: &mut Roster,
        actor_id: CharacterId,
        destination: Cell,
    ) -> Result<u32, MovementError> {
        let cost = self.plan(grid, roster, actor_id, destination, MoveMode::SingleStep)?;
        self.apply(grid, roster, actor_id, destination, cost);
        Ok(cost)
    }

    fn apply(
        &mut self,
        grid: &mut Grid,
        roster: &mut Roster,
        actor_id: CharacterId,
        destination: Cell,
        cost: u32,
    ) {
        grid.occupy(destination, actor_id);
        let actor = roster.character_mut(actor_id);
        actor.position = destination;

        let budget = self
            .remaining
            .get_mut(&actor_id)
            .expect("plan verified a budget exists");
        *budget = budget.saturating_sub(cost);
        if *budget == 0 {
            actor.has_moved = true;
        }
    }

    /// Every cell the actor could legally move to right now.
    pub fn reachable_cells(
        &self,
        grid: &Grid,
        roster: &Roster,
        actor_id: CharacterId,
    ) -> Vec<Cell> {
        let Some(actor) = roster.get(actor_id) else {
            return Vec::new();
        };
        let remaining = self.remaining(actor_id);
        if actor.is_dead || remaining == 0 {
            return Vec::new();
        }

        match self.mode {
            MoveMode::Path => {
                let mut cells: Vec<Cell> =
                    pathfinding::reachable_cells(grid, actor.position, remaining)
                        .into_iter()
                        .collect();
                cells.sort();
                cells
            }
            MoveMode::SingleStep => {
                let from = actor.position;
                [(0, 1), (0, -1), (1, 0), (-1, 0)]
                    .into_iter()
                    .filter_map(|(dx, dy)| grid.cell_at(from.x + dx, from.y + dy))
                    .filter(|&cell| grid.can_enter(cell))
                    .collect()
            }
        }
    }
}
