//! Action enumeration, validation and execution.
//!
//! The resolver re-reads roster and grid state on every call; nothing about a
//! target's position or liveness is ever cached between calls. Execution
//! either fully applies or returns an error with no mutation.

use crate::character::CharacterId;
use crate::errors::ActionError;
use crate::grid::{Cell, Grid};
use crate::roster::Roster;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Move,
    MeleeAttack,
    RangedAttack,
    HealSelf,
    HealOther,
    EndTurn,
}

impl ActionKind {
    pub fn display_name(self) -> &'static str {
        match self {
            ActionKind::Move => "Move",
            ActionKind::MeleeAttack => "Melee Attack",
            ActionKind::RangedAttack => "Ranged Attack",
            ActionKind::HealSelf => "Heal Self",
            ActionKind::HealOther => "Heal Other",
            ActionKind::EndTurn => "End Turn",
        }
    }

    pub fn requires_target(self) -> bool {
        matches!(
            self,
            ActionKind::MeleeAttack | ActionKind::RangedAttack | ActionKind::HealOther
        )
    }
}

/// A discrete combat choice, with the distance it was evaluated at and a
/// derived "currently legal" flag.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub kind: ActionKind,
    /// Target character for attacks and HealOther.
    pub target: Option<CharacterId>,
    /// Destination cell for Move actions.
    pub target_cell: Option<Cell>,
    pub distance: u32,
    pub is_available: bool,
}

impl Action {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            target: None,
            target_cell: None,
            distance: 0,
            is_available: false,
        }
    }

    pub fn with_target(kind: ActionKind, target: CharacterId, distance: u32) -> Self {
        Self {
            kind,
            target: Some(target),
            target_cell: None,
            distance,
            is_available: true,
        }
    }

    pub fn move_to(cell: Cell) -> Self {
        Self {
            kind: ActionKind::Move,
            target: None,
            target_cell: Some(cell),
            distance: 0,
            is_available: true,
        }
    }

    pub fn end_turn() -> Self {
        Self {
            kind: ActionKind::EndTurn,
            target: None,
            target_cell: None,
            distance: 0,
            is_available: true,
        }
    }
}

/// An action kind plus the set of legal targets for it this turn.
/// Batched target-selection UIs rely on this grouping contract.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ActionGroup {
    pub kind: ActionKind,
    pub display_name: String,
    pub targets: Vec<CharacterId>,
    pub is_available: bool,
}

impl ActionGroup {
    fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            display_name: kind.display_name().to_string(),
            targets: Vec::new(),
            is_available: false,
        }
    }

    fn add_target(&mut self, target: CharacterId) {
        if !self.targets.contains(&target) {
            self.targets.push(target);
            self.is_available = true;
        }
    }
}

/// What an executed action did to the world.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    DamageDealt {
        target: CharacterId,
        amount: u32,
        remaining_health: u32,
        died: bool,
    },
    Healed {
        target: CharacterId,
        amount: u32,
        new_health: u32,
    },
    TurnPassed,
}

/// Enumerates, validates and applies combat actions against the roster.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbilityResolver;

impl AbilityResolver {
    pub fn new() -> Self {
        Self
    }

    /// Every action the actor could take this turn, with availability flags.
    /// EndTurn is always present and always last; targets are scanned in
    /// roster order, so the result is deterministic.
    pub fn available_actions(&self, roster: &Roster, actor_id: CharacterId) -> Vec<Action> {
        let actor = roster.character(actor_id);
        let mut actions = Vec::new();

        if actor.stats.can_heal {
            let mut heal_self = Action::new(ActionKind::HealSelf);
            heal_self.is_available = self.can_perform(roster, actor_id, &heal_self);
            actions.push(heal_self);
        }

        for target in roster.living() {
            if target.id == actor_id {
                continue;
            }
            let distance = actor.position.chebyshev_distance(target.position);

            if actor.stats.can_heal_others && distance <= actor.stats.max_heal_distance {
                let mut action = Action::with_target(ActionKind::HealOther, target.id, distance);
                action.is_available = self.can_perform(roster, actor_id, &action);
                actions.push(action);
            }
            if distance == 1 && actor.stats.melee_damage > 0 {
                let mut action = Action::with_target(ActionKind::MeleeAttack, target.id, distance);
                action.is_available = self.can_perform(roster, actor_id, &action);
                actions.push(action);
            }
            if actor.stats.can_use_ranged
                && distance > 1
                && distance <= actor.stats.max_ranged_distance
            {
                let mut action = Action::with_target(ActionKind::RangedAttack, target.id, distance);
                action.is_available = self.can_perform(roster, actor_id, &action);
                actions.push(action);
            }
        }

        let mut end_turn = Action::end_turn();
        end_turn.is_available = self.can_perform(roster, actor_id, &end_turn);
        actions.push(end_turn);
        actions
    }

    /// Groups the enumerated actions by kind for target-selection UIs.
    /// EndTurn is never grouped; a legal HealSelf marks its group available
    /// without targets.
    pub fn group_actions(&self, actions: &[Action]) -> Vec<ActionGroup> {
        let mut groups: Vec<ActionGroup> = Vec::new();

        for action in actions {
            if action.kind == ActionKind::EndTurn {
                continue;
            }
            if !groups.iter().any(|g| g.kind == action.kind) {
                groups.push(ActionGroup::new(action.kind));
            }
            let group = groups
                .iter_mut()
                .find(|g| g.kind == action.kind)
                .expect("group just inserted");

            if action.is_available {
                match action.target {
                    Some(target) => group.add_target(target),
                    None if action.kind == ActionKind::HealSelf => group.is_available = true,
                    None => {}
                }
            }
        }

        groups
    }

    pub fn can_perform(&self, roster: &Roster, actor_id: CharacterId, action: &Action) -> bool {
        self.validate(roster, actor_id, action).is_ok()
    }

    fn validate(
        &self,
        roster: &Roster,
        actor_id: CharacterId,
        action: &Action,
    ) -> Result<(), ActionError> {
        let actor = roster
            .get(actor_id)
            .ok_or(ActionError::UnknownActor(actor_id))?;
        if actor.is_dead {
            return Err(ActionError::ActorDead);
        }

        match action.kind {
            ActionKind::EndTurn => {
                if actor.has_finished_turn() {
                    return Err(ActionError::AlreadyActed);
                }
                Ok(())
            }
            ActionKind::Move => Err(ActionError::NotUsable(ActionKind::Move)),
            ActionKind::HealSelf => {
                if actor.has_acted {
                    return Err(ActionError::AlreadyActed);
                }
                if !actor.stats.can_heal || actor.current_health >= actor.stats.max_health {
                    return Err(ActionError::NotUsable(ActionKind::HealSelf));
                }
                Ok(())
            }
            ActionKind::HealOther => {
                if actor.has_acted {
                    return Err(ActionError::AlreadyActed);
                }
                let target = self.resolve_target(roster, action)?;
                if !actor.stats.can_heal_others
                    || target.id == actor_id
                    || target.current_health >= target.stats.max_health
                {
                    return Err(ActionError::NotUsable(ActionKind::HealOther));
                }
                let distance = actor.position.chebyshev_distance(target.position);
                if distance > actor.stats.max_heal_distance {
                    return Err(ActionError::NotUsable(ActionKind::HealOther));
                }
                Ok(())
            }
            ActionKind::MeleeAttack => {
                if actor.has_acted {
                    return Err(ActionError::AlreadyActed);
                }
                let target = self.resolve_target(roster, action)?;
                if actor.stats.melee_damage == 0 {
                    return Err(ActionError::NotUsable(ActionKind::MeleeAttack));
                }
                let distance = actor.position.chebyshev_distance(target.position);
                if distance != 1 {
                    return Err(ActionError::NotUsable(ActionKind::MeleeAttack));
                }
                Ok(())
            }
            ActionKind::RangedAttack => {
                if actor.has_acted {
                    return Err(ActionError::AlreadyActed);
                }
                let target = self.resolve_target(roster, action)?;
                if !actor.stats.can_use_ranged || actor.stats.ranged_damage == 0 {
                    return Err(ActionError::NotUsable(ActionKind::RangedAttack));
                }
                let distance = actor.position.chebyshev_distance(target.position);
                if distance <= 1 || distance > actor.stats.max_ranged_distance {
                    return Err(ActionError::NotUsable(ActionKind::RangedAttack));
                }
                Ok(())
            }
        }
    }

    fn resolve_target<'r>(
        &self,
        roster: &'r Roster,
        action: &Action,
    ) -> Result<&'r crate::character::Character, ActionError> {
        let target_id = action
            .target
            .ok_or(ActionError::MissingTarget(action.kind))?;
        let target = roster
            .get(target_id)
            .ok_or(ActionError::UnknownTarget(target_id))?;
        if target.is_dead {
            return Err(ActionError::TargetDead(target_id));
        }
        Ok(target)
    }

    /// Re-validates and applies the action. On success the actor is marked as
    /// having acted; a dead target is vacated from the grid. Validation
    /// failure performs no mutation at all.
    pub fn execute(
        &self,
        grid: &mut Grid,
        roster: &mut Roster,
        actor_id: CharacterId,
        action: &Action,
    ) -> Result<ActionOutcome, ActionError> {
        self.validate(roster, actor_id, action)?;

        let outcome = match action.kind {
            ActionKind::EndTurn => ActionOutcome::TurnPassed,
            ActionKind::HealSelf => {
                let actor = roster.character_mut(actor_id);
                let amount = actor.heal(actor.stats.heal_amount);
                ActionOutcome::Healed {
                    target: actor_id,
                    amount,
                    new_health: actor.current_health,
                }
            }
            ActionKind::HealOther => {
                let heal_amount = roster.character(actor_id).stats.heal_amount;
                let target_id = action.target.expect("validated");
                let target = roster.character_mut(target_id);
                let amount = target.heal(heal_amount);
                ActionOutcome::Healed {
                    target: target_id,
                    amount,
                    new_health: target.current_health,
                }
            }
            ActionKind::MeleeAttack | ActionKind::RangedAttack => {
                let amount = match action.kind {
                    ActionKind::MeleeAttack => roster.character(actor_id).stats.melee_damage,
                    _ => roster.character(actor_id).stats.ranged_damage,
                };
                let target_id = action.target.expect("validated");
                let target = roster.character_mut(target_id);
                let died = target.take_damage(amount);
                let remaining_health = target.current_health;
                if died {
                    grid.vacate(target_id);
                }
                ActionOutcome::DamageDealt {
                    target: target_id,
                    amount,
                    remaining_health,
                    died,
                }
            }
            ActionKind::Move => unreachable!("movement is validated above"),
        };

        roster.character_mut(actor_id).has_acted = true;
        Ok(outcome)
    }
}
