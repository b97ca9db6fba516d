//! Turn and round sequencing.
//!
//! The scheduler owns whose turn it is, when rounds roll over, and when the
//! match ends. It never touches wall-clock time itself; callers pass `now`
//! into [`TurnScheduler::poll`], which keeps scheduler-driven turns testable
//! with synthetic instants.

use crate::character::{CharacterId, Control, Side};
use crate::combat::actions::{AbilityResolver, Action, ActionKind, ActionOutcome};
use crate::combat::ai::TurnPolicy;
use crate::combat::events::{CombatEvent, EventBus, GameOutcome};
use crate::combat::movement::MovementLedger;
use crate::errors::{ActionError, MovementError};
use crate::grid::{Cell, Grid};
use crate::roster::Roster;
use std::time::{Duration, Instant};

/// Where the match currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    /// A living character holds the turn and may move and act.
    ActiveTurn,
    GameOver,
}

/// The mutable world the scheduler operates on. Borrowed per call so the
/// scheduler itself stays free of world state.
pub struct SchedulerContext<'a> {
    pub grid: &'a mut Grid,
    pub roster: &'a mut Roster,
    pub ledger: &'a mut MovementLedger,
    pub resolver: &'a AbilityResolver,
    pub policy: &'a dyn TurnPolicy,
    pub bus: &'a mut EventBus,
}

/// Drives the fixed roster-order turn cycle.
///
/// Turns are granted to living characters in id order; when the order is
/// exhausted the round ends, victory is checked, and the cycle restarts from
/// the top. Scheduler-driven characters act after a pacing delay observed via
/// `poll`; the delay is cosmetic and never affects outcomes.
pub struct TurnScheduler {
    phase: Phase,
    current: Option<CharacterId>,
    next_index: usize,
    round: u32,
    ai_delay: Duration,
    ai_deadline: Option<Instant>,
    outcome: Option<GameOutcome>,
}

impl TurnScheduler {
    pub fn new(ai_delay: Duration) -> Self {
        Self {
            phase: Phase::NotStarted,
            current: None,
            next_index: 0,
            round: 0,
            ai_delay,
            ai_deadline: None,
            outcome: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn current_actor(&self) -> Option<CharacterId> {
        self.current
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    /// Opens round 1 and hands the first living character its turn.
    pub fn start_game(&mut self, ctx: &mut SchedulerContext<'_>, now: Instant) {
        if self.phase != Phase::NotStarted {
            return;
        }
        self.round = 1;
        self.next_index = 0;
        ctx.bus.push(CombatEvent::RoundStarted { round: self.round });
        self.select_next(ctx, now);
    }

    /// Advances to the next living character in roster order, rolling the
    /// round over when the order is exhausted.
    fn select_next(&mut self, ctx: &mut SchedulerContext<'_>, now: Instant) {
        if self.outcome.is_some() {
            return;
        }

        while self.next_index < ctx.roster.len() {
            let id = CharacterId(self.next_index as u32);
            self.next_index += 1;
            if ctx.roster.character(id).is_dead {
                continue;
            }

            let actor = ctx.roster.character_mut(id);
            actor.start_turn();
            let speed = actor.stats.speed;
            let control = actor.control;
            ctx.ledger.start_turn(id, speed);

            self.current = Some(id);
            self.phase = Phase::ActiveTurn;
            self.ai_deadline = match control {
                Control::Ai => Some(now + self.ai_delay),
                Control::Human => None,
            };
            ctx.bus.push(CombatEvent::TurnStarted { actor: id });
            return;
        }

        self.round_check(ctx, now);
    }

    /// Round boundary: emit the round events, settle one-side-standing
    /// outcomes, otherwise restart the cycle from the top of the roster.
    fn round_check(&mut self, ctx: &mut SchedulerContext<'_>, now: Instant) {
        ctx.bus.push(CombatEvent::RoundEnded { round: self.round });

        let players = ctx.roster.side_alive_count(Side::Player);
        let enemies = ctx.roster.side_alive_count(Side::Enemy);
        match (players, enemies) {
            (0, 0) => return self.game_over(ctx, GameOutcome::Draw),
            (0, _) => return self.game_over(ctx, GameOutcome::Defeat),
            (_, 0) => {
                let survivor = ctx
                    .roster
                    .living_on_side(Side::Player)
                    .map(|c| c.id)
                    .next()
                    .expect("player count is nonzero");
                return self.game_over(ctx, GameOutcome::Victory(survivor));
            }
            _ => {}
        }

        self.round += 1;
        self.next_index = 0;
        ctx.bus.push(CombatEvent::RoundStarted { round: self.round });
        self.select_next(ctx, now);
    }

    fn game_over(&mut self, ctx: &mut SchedulerContext<'_>, outcome: GameOutcome) {
        if self.outcome.is_some() {
            return;
        }
        self.outcome = Some(outcome);
        self.phase = Phase::GameOver;
        self.current = None;
        self.ai_deadline = None;
        ctx.bus.push(CombatEvent::GameOver { outcome });
    }

    /// Ends the current actor's turn: flags set, leftover budget forfeited,
    /// the next character selected.
    pub fn end_turn(&mut self, ctx: &mut SchedulerContext<'_>, now: Instant) {
        let Some(actor_id) = self.current else {
            return;
        };
        ctx.roster.character_mut(actor_id).end_turn();
        ctx.ledger.end_turn(actor_id);
        ctx.bus.push(CombatEvent::MovementUpdated {
            actor: actor_id,
            remaining: 0,
        });
        ctx.bus.push(CombatEvent::TurnEnded { actor: actor_id });

        self.current = None;
        self.ai_deadline = None;
        self.select_next(ctx, now);
    }

    /// Moves the current actor, emitting movement events on success. The turn
    /// auto-ends when movement and action are both spent.
    pub fn execute_move(
        &mut self,
        ctx: &mut SchedulerContext<'_>,
        now: Instant,
        actor_id: CharacterId,
        destination: Cell,
    ) -> Result<u32, MovementError> {
        if self.phase != Phase::ActiveTurn || self.current != Some(actor_id) {
            return Err(MovementError::OutOfTurn(actor_id));
        }

        let from = ctx.roster.character(actor_id).position;
        let cost = ctx.ledger.try_move(ctx.grid, ctx.roster, actor_id, destination)?;
        ctx.bus.push(CombatEvent::CharacterMoved {
            actor: actor_id,
            from,
            to: destination,
            cost,
        });
        ctx.bus.push(CombatEvent::MovementUpdated {
            actor: actor_id,
            remaining: ctx.ledger.remaining(actor_id),
        });

        if ctx.roster.character(actor_id).has_finished_turn() {
            self.end_turn(ctx, now);
        }
        Ok(cost)
    }

    /// Executes an action for the current actor, emitting the outcome events
    /// and settling any death-triggered victory condition.
    pub fn execute_action(
        &mut self,
        ctx: &mut SchedulerContext<'_>,
        now: Instant,
        actor_id: CharacterId,
        action: &Action,
    ) -> Result<ActionOutcome, ActionError> {
        if self.phase != Phase::ActiveTurn || self.current != Some(actor_id) {
            return Err(ActionError::OutOfTurn(actor_id));
        }

        let outcome = ctx
            .resolver
            .execute(ctx.grid, ctx.roster, actor_id, action)?;
        ctx.bus.push(CombatEvent::ActionExecuted {
            actor: actor_id,
            action: action.clone(),
            outcome: outcome.clone(),
        });

        match &outcome {
            ActionOutcome::DamageDealt {
                target,
                remaining_health,
                died,
                ..
            } => {
                ctx.bus.push(CombatEvent::HealthChanged {
                    actor: *target,
                    health: *remaining_health,
                });
                if *died {
                    self.record_death(ctx, *target);
                }
            }
            ActionOutcome::Healed { target, new_health, .. } => {
                ctx.bus.push(CombatEvent::HealthChanged {
                    actor: *target,
                    health: *new_health,
                });
            }
            ActionOutcome::TurnPassed => {}
        }

        if self.phase == Phase::ActiveTurn && self.current == Some(actor_id) {
            if action.kind == ActionKind::EndTurn
                || ctx.roster.character(actor_id).has_finished_turn()
                || ctx.roster.character(actor_id).is_dead
            {
                self.end_turn(ctx, now);
            }
        }
        Ok(outcome)
    }

    /// Registers a death and settles the outcomes a death can decide on the
    /// spot. Losing any player while enemies remain is an immediate defeat;
    /// an enemy wipe with a single player left crowns that player without
    /// waiting for the round to end.
    fn record_death(&mut self, ctx: &mut SchedulerContext<'_>, victim: CharacterId) {
        ctx.bus.push(CombatEvent::CharacterDied { actor: victim });

        let victim_side = ctx.roster.character(victim).side;
        let players = ctx.roster.side_alive_count(Side::Player);
        let enemies = ctx.roster.side_alive_count(Side::Enemy);

        if victim_side == Side::Player && enemies > 0 {
            return self.game_over(ctx, GameOutcome::Defeat);
        }
        if enemies == 0 {
            match players {
                0 => self.game_over(ctx, GameOutcome::Draw),
                1 => {
                    let survivor = ctx
                        .roster
                        .living_on_side(Side::Player)
                        .map(|c| c.id)
                        .next()
                        .expect("player count is one");
                    self.game_over(ctx, GameOutcome::Victory(survivor));
                }
                // Multiple players still standing with the enemy side
                // cleared: settled at the round boundary.
                _ => {}
            }
        }
    }

    /// Runs pending scheduler-driven turns whose pacing delay has elapsed.
    /// Call this regularly with the current instant; it is a no-op for human
    /// turns and before the deadline.
    pub fn poll(&mut self, ctx: &mut SchedulerContext<'_>, now: Instant) {
        if self.phase != Phase::ActiveTurn {
            return;
        }
        let Some(deadline) = self.ai_deadline else {
            return;
        };
        if now < deadline {
            return;
        }
        self.ai_deadline = None;

        let Some(actor_id) = self.current else {
            return;
        };

        let budget = ctx.ledger.remaining(actor_id);
        if let Some(destination) = ctx.policy.choose_move(ctx.grid, ctx.roster, actor_id, budget) {
            // A rejected policy move is treated as standing still.
            let _ = self.execute_move(ctx, now, actor_id, destination);
        }
        if self.phase != Phase::ActiveTurn || self.current != Some(actor_id) {
            return;
        }
        ctx.roster.character_mut(actor_id).has_moved = true;

        if let Some(action) = ctx.policy.choose_action(ctx.roster, ctx.resolver, actor_id) {
            let _ = self.execute_action(ctx, now, actor_id, &action);
        }
        if self.phase != Phase::ActiveTurn || self.current != Some(actor_id) {
            return;
        }
        self.end_turn(ctx, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{Character, Control};
    use crate::combat::ai::NearestFoePolicy;
    use crate::combat::movement::MoveMode;
    use crate::stats::StatsTemplate;
    use pretty_assertions::assert_eq;

    struct World {
        grid: Grid,
        roster: Roster,
        ledger: MovementLedger,
        resolver: AbilityResolver,
        policy: NearestFoePolicy,
        bus: EventBus,
    }

    impl World {
        fn new(placements: Vec<(StatsTemplate, Side, Control, Cell)>) -> Self {
            let mut grid = Grid::new(6, 6);
            let mut characters = Vec::new();
            for (index, (stats, side, control, cell)) in placements.into_iter().enumerate() {
                let id = CharacterId(index as u32);
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
            Self {
                grid,
                roster: Roster::new(characters).unwrap(),
                ledger: MovementLedger::new(MoveMode::Path),
                resolver: AbilityResolver::new(),
                policy: NearestFoePolicy::new(),
                bus: EventBus::new(),
            }
        }

        fn ctx(&mut self) -> SchedulerContext<'_> {
            SchedulerContext {
                grid: &mut self.grid,
                roster: &mut self.roster,
                ledger: &mut self.ledger,
                resolver: &self.resolver,
                policy: &self.policy,
                bus: &mut self.bus,
            }
        }
    }

    fn two_humans_one_enemy() -> World {
        World::new(vec![
            (StatsTemplate::fighter(), Side::Player, Control::Human, Cell::new(0, 0)),
            (StatsTemplate::healer(), Side::Player, Control::Human, Cell::new(1, 0)),
            (StatsTemplate::enemy(), Side::Enemy, Control::Human, Cell::new(5, 5)),
        ])
    }

    #[test]
    fn test_turns_follow_roster_order_and_rounds_wrap() {
        let mut world = two_humans_one_enemy();
        let mut scheduler = TurnScheduler::new(Duration::from_secs(1));
        let now = Instant::now();

        scheduler.start_game(&mut world.ctx(), now);
        assert_eq!(scheduler.round(), 1);
        assert_eq!(scheduler.current_actor(), Some(CharacterId(0)));

        scheduler.end_turn(&mut world.ctx(), now);
        assert_eq!(scheduler.current_actor(), Some(CharacterId(1)));
        scheduler.end_turn(&mut world.ctx(), now);
        assert_eq!(scheduler.current_actor(), Some(CharacterId(2)));

        // Last turn of the round: the cycle restarts and the round advances.
        scheduler.end_turn(&mut world.ctx(), now);
        assert_eq!(scheduler.round(), 2);
        assert_eq!(scheduler.current_actor(), Some(CharacterId(0)));
    }

    #[test]
    fn test_dead_characters_are_skipped() {
        let mut world = two_humans_one_enemy();
        let mut scheduler = TurnScheduler::new(Duration::from_secs(1));
        let now = Instant::now();

        world.roster.character_mut(CharacterId(1)).take_damage(999);
        scheduler.start_game(&mut world.ctx(), now);
        scheduler.end_turn(&mut world.ctx(), now);
        assert_eq!(scheduler.current_actor(), Some(CharacterId(2)), "healer skipped");
    }

    #[test]
    fn test_turn_start_resets_flags_and_grants_budget() {
        let mut world = two_humans_one_enemy();
        let mut scheduler = TurnScheduler::new(Duration::from_secs(1));
        scheduler.start_game(&mut world.ctx(), Instant::now());

        let fighter = world.roster.character(CharacterId(0));
        assert!(!fighter.has_moved);
        assert!(!fighter.has_acted);
        assert_eq!(world.ledger.remaining(CharacterId(0)), 3);
    }

    #[test]
    fn test_turn_auto_ends_when_movement_and_action_are_spent() {
        let mut world = World::new(vec![
            (StatsTemplate::fighter(), Side::Player, Control::Human, Cell::new(0, 0)),
            (StatsTemplate::fighter(), Side::Player, Control::Human, Cell::new(5, 5)),
            (StatsTemplate::enemy(), Side::Enemy, Control::Human, Cell::new(0, 4)),
        ]);
        let mut scheduler = TurnScheduler::new(Duration::from_secs(1));
        let now = Instant::now();
        scheduler.start_game(&mut world.ctx(), now);

        // Spend the whole budget (speed 3) in one move.
        scheduler
            .execute_move(&mut world.ctx(), now, CharacterId(0), Cell::new(0, 3))
            .unwrap();
        assert!(world.roster.character(CharacterId(0)).has_moved);
        assert_eq!(scheduler.current_actor(), Some(CharacterId(0)), "still may act");

        // Acting with movement already spent ends the turn without EndTurn.
        let attack = Action::with_target(ActionKind::MeleeAttack, CharacterId(2), 1);
        scheduler
            .execute_action(&mut world.ctx(), now, CharacterId(0), &attack)
            .unwrap();
        assert_eq!(scheduler.current_actor(), Some(CharacterId(1)));
    }

    #[test]
    fn test_non_current_actor_is_rejected() {
        let mut world = two_humans_one_enemy();
        let mut scheduler = TurnScheduler::new(Duration::from_secs(1));
        let now = Instant::now();
        scheduler.start_game(&mut world.ctx(), now);

        let err = scheduler
            .execute_move(&mut world.ctx(), now, CharacterId(1), Cell::new(1, 1))
            .unwrap_err();
        assert_eq!(err, MovementError::OutOfTurn(CharacterId(1)));
    }

    #[test]
    fn test_killing_the_last_enemy_ends_the_game_for_a_lone_player() {
        let mut world = World::new(vec![
            (StatsTemplate::fighter(), Side::Player, Control::Human, Cell::new(0, 0)),
            (StatsTemplate::enemy(), Side::Enemy, Control::Human, Cell::new(0, 1)),
        ]);
        world.roster.character_mut(CharacterId(1)).current_health = 3;
        let mut scheduler = TurnScheduler::new(Duration::from_secs(1));
        let now = Instant::now();
        scheduler.start_game(&mut world.ctx(), now);

        let attack = Action::with_target(ActionKind::MeleeAttack, CharacterId(1), 1);
        scheduler
            .execute_action(&mut world.ctx(), now, CharacterId(0), &attack)
            .unwrap();

        assert_eq!(scheduler.phase(), Phase::GameOver);
        assert_eq!(scheduler.outcome(), Some(GameOutcome::Victory(CharacterId(0))));
        assert_eq!(scheduler.current_actor(), None);
    }

    #[test]
    fn test_enemy_wipe_with_two_players_settles_at_round_end() {
        let mut world = World::new(vec![
            (StatsTemplate::fighter(), Side::Player, Control::Human, Cell::new(0, 0)),
            (StatsTemplate::ranger(), Side::Player, Control::Human, Cell::new(5, 5)),
            (StatsTemplate::enemy(), Side::Enemy, Control::Human, Cell::new(0, 1)),
        ]);
        world.roster.character_mut(CharacterId(2)).current_health = 1;
        let mut scheduler = TurnScheduler::new(Duration::from_secs(1));
        let now = Instant::now();
        scheduler.start_game(&mut world.ctx(), now);

        let attack = Action::with_target(ActionKind::MeleeAttack, CharacterId(2), 1);
        scheduler
            .execute_action(&mut world.ctx(), now, CharacterId(0), &attack)
            .unwrap();
        assert_eq!(scheduler.phase(), Phase::ActiveTurn, "match continues");
        scheduler.end_turn(&mut world.ctx(), now);

        // Ranger's turn ends the round; the boundary check settles the win.
        scheduler.end_turn(&mut world.ctx(), now);
        assert_eq!(scheduler.phase(), Phase::GameOver);
        assert_eq!(scheduler.outcome(), Some(GameOutcome::Victory(CharacterId(0))));
    }

    #[test]
    fn test_a_player_death_with_enemies_alive_is_immediate_defeat() {
        let mut world = World::new(vec![
            (StatsTemplate::fighter(), Side::Player, Control::Human, Cell::new(0, 1)),
            (StatsTemplate::ranger(), Side::Player, Control::Human, Cell::new(5, 0)),
            (StatsTemplate::enemy(), Side::Enemy, Control::Human, Cell::new(0, 0)),
            (StatsTemplate::enemy(), Side::Enemy, Control::Human, Cell::new(5, 5)),
        ]);
        world.roster.character_mut(CharacterId(0)).current_health = 2;
        let mut scheduler = TurnScheduler::new(Duration::from_secs(1));
        let now = Instant::now();
        scheduler.start_game(&mut world.ctx(), now);
        scheduler.end_turn(&mut world.ctx(), now); // fighter passes
        scheduler.end_turn(&mut world.ctx(), now); // ranger passes

        let attack = Action::with_target(ActionKind::MeleeAttack, CharacterId(0), 1);
        scheduler
            .execute_action(&mut world.ctx(), now, CharacterId(2), &attack)
            .unwrap();

        // The ranger still lives, but losing a teammate loses the match.
        assert_eq!(scheduler.outcome(), Some(GameOutcome::Defeat));
        assert_eq!(scheduler.phase(), Phase::GameOver);
    }

    #[test]
    fn test_game_over_fires_exactly_once() {
        let mut world = World::new(vec![
            (StatsTemplate::fighter(), Side::Player, Control::Human, Cell::new(0, 0)),
            (StatsTemplate::enemy(), Side::Enemy, Control::Human, Cell::new(0, 1)),
        ]);
        world.roster.character_mut(CharacterId(1)).current_health = 1;
        let mut scheduler = TurnScheduler::new(Duration::from_secs(1));
        let now = Instant::now();
        scheduler.start_game(&mut world.ctx(), now);

        let attack = Action::with_target(ActionKind::MeleeAttack, CharacterId(1), 1);
        scheduler
            .execute_action(&mut world.ctx(), now, CharacterId(0), &attack)
            .unwrap();
        scheduler.end_turn(&mut world.ctx(), now);
        scheduler.poll(&mut world.ctx(), now + Duration::from_secs(10));

        let game_overs = world
            .bus
            .events()
            .iter()
            .filter(|e| matches!(e, CombatEvent::GameOver { .. }))
            .count();
        assert_eq!(game_overs, 1);
    }

    #[test]
    fn test_ai_turn_waits_for_the_pacing_delay() {
        let mut world = World::new(vec![
            (StatsTemplate::enemy(), Side::Enemy, Control::Ai, Cell::new(0, 0)),
            (StatsTemplate::fighter(), Side::Player, Control::Human, Cell::new(0, 3)),
        ]);
        let mut scheduler = TurnScheduler::new(Duration::from_secs(1));
        let start = Instant::now();
        scheduler.start_game(&mut world.ctx(), start);
        assert_eq!(scheduler.current_actor(), Some(CharacterId(0)));

        scheduler.poll(&mut world.ctx(), start + Duration::from_millis(500));
        assert_eq!(scheduler.current_actor(), Some(CharacterId(0)), "deadline not reached");

        scheduler.poll(&mut world.ctx(), start + Duration::from_secs(1));
        assert_eq!(scheduler.current_actor(), Some(CharacterId(1)), "turn ran and ended");

        let moved = world
            .bus
            .events()
            .iter()
            .any(|e| matches!(e, CombatEvent::CharacterMoved { actor, .. } if *actor == CharacterId(0)));
        assert!(moved, "enemy advanced toward the fighter");
    }

    #[test]
    fn test_ai_attacks_when_adjacent() {
        let mut world = World::new(vec![
            (StatsTemplate::enemy(), Side::Enemy, Control::Ai, Cell::new(0, 0)),
            (StatsTemplate::fighter(), Side::Player, Control::Human, Cell::new(0, 1)),
        ]);
        let mut scheduler = TurnScheduler::new(Duration::ZERO);
        let start = Instant::now();
        scheduler.start_game(&mut world.ctx(), start);
        scheduler.poll(&mut world.ctx(), start);

        assert_eq!(
            world.roster.character(CharacterId(1)).current_health,
            StatsTemplate::fighter().max_health - StatsTemplate::enemy().melee_damage
        );
    }
}
