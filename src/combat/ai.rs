//! Turn policies for scheduler-driven characters.
//!
//! A policy only reads world state and proposes intents; the scheduler applies
//! them through the same validation every human intent goes through. Policies
//! are deliberately deterministic so scripted matches replay identically.

use crate::character::CharacterId;
use crate::combat::actions::{AbilityResolver, Action, ActionKind};
use crate::grid::{Cell, Grid};
use crate::pathfinding;
use crate::roster::Roster;

/// Decides what a scheduler-driven character does on its turn.
pub trait TurnPolicy {
    /// The cell to move to this turn, or None to stay put.
    fn choose_move(
        &self,
        grid: &Grid,
        roster: &Roster,
        actor_id: CharacterId,
        budget: u32,
    ) -> Option<Cell>;

    /// The action to take after moving, or None to just end the turn.
    fn choose_action(
        &self,
        roster: &Roster,
        resolver: &AbilityResolver,
        actor_id: CharacterId,
    ) -> Option<Action>;
}

/// Closes distance to the nearest living foe, then attacks the weakest foe in
/// range. All ties break on roster order or cell order, never on chance.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestFoePolicy;

impl NearestFoePolicy {
    pub fn new() -> Self {
        Self
    }
}

impl TurnPolicy for NearestFoePolicy {
    fn choose_move(
        &self,
        grid: &Grid,
        roster: &Roster,
        actor_id: CharacterId,
        budget: u32,
    ) -> Option<Cell> {
        let actor = roster.character(actor_id);
        let foe_side = actor.side.opponent();
        let foes: Vec<&crate::character::Character> = roster.living_on_side(foe_side).collect();
        if foes.is_empty() {
            return None;
        }

        // Already adjacent to a foe: no need to move.
        if foes
            .iter()
            .any(|foe| actor.position.chebyshev_distance(foe.position) == 1)
        {
            return None;
        }

        let mut cells: Vec<Cell> = pathfinding::reachable_cells(grid, actor.position, budget)
            .into_iter()
            .collect();
        cells.sort();
        if cells.is_empty() {
            return None;
        }

        // Prefer a cell that puts us in melee range of a foe, scanning foes in
        // roster order.
        for foe in &foes {
            if let Some(&cell) = cells
                .iter()
                .find(|c| c.chebyshev_distance(foe.position) == 1)
            {
                return Some(cell);
            }
        }

        // Otherwise take the cell that minimizes distance to the nearest foe,
        // even when no reachable cell improves on standing still.
        let distance_to_nearest = |cell: Cell| {
            foes.iter()
                .map(|foe| cell.chebyshev_distance(foe.position))
                .min()
                .unwrap_or(u32::MAX)
        };
        cells
            .iter()
            .copied()
            .min_by_key(|&cell| (distance_to_nearest(cell), cell))
    }

    fn choose_action(
        &self,
        roster: &Roster,
        resolver: &AbilityResolver,
        actor_id: CharacterId,
    ) -> Option<Action> {
        let foe_side = roster.character(actor_id).side.opponent();
        // Only attacks on the opposing side are candidates; the resolver
        // enumerates ally targets too.
        let attacks: Vec<Action> = resolver
            .available_actions(roster, actor_id)
            .into_iter()
            .filter(|action| {
                action.is_available
                    && matches!(
                        action.kind,
                        ActionKind::MeleeAttack | ActionKind::RangedAttack
                    )
                    && action
                        .target
                        .is_some_and(|id| roster.character(id).side == foe_side)
            })
            .collect();

        // Weakest target first; melee beats ranged on the same target.
        let target = attacks
            .iter()
            .filter_map(|action| action.target)
            .min_by_key(|&id| (roster.character(id).current_health, id))?;

        attacks
            .iter()
            .find(|a| a.target == Some(target) && a.kind == ActionKind::MeleeAttack)
            .or_else(|| attacks.iter().find(|a| a.target == Some(target)))
            .cloned()
    }
}
