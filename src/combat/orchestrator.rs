//! Top-level match facade.
//!
//! Owns the grid, roster, ledger and scheduler and exposes the full external
//! surface: intents (`try_move`, `try_execute_action`, `force_end_turn`),
//! queries, and the event stream. UI layers talk to this type and nothing
//! below it.

use crate::character::{CharacterId, Control};
use crate::combat::actions::{AbilityResolver, Action, ActionGroup, ActionKind, ActionOutcome};
use crate::combat::ai::{NearestFoePolicy, TurnPolicy};
use crate::combat::events::{CombatEvent, EventBus, GameOutcome};
use crate::combat::movement::{MoveMode, MovementLedger};
use crate::combat::scheduler::{Phase, SchedulerContext, TurnScheduler};
use crate::errors::{ActionError, MovementError, SetupError};
use crate::grid::{Cell, Grid};
use crate::roster::Roster;
use crate::setup::{spawn_characters, MatchConfig};
use rand::Rng;
use std::time::Instant;

pub struct CombatOrchestrator {
    grid: Grid,
    roster: Roster,
    ledger: MovementLedger,
    resolver: AbilityResolver,
    scheduler: TurnScheduler,
    policy: Box<dyn TurnPolicy>,
    bus: EventBus,
}

impl CombatOrchestrator {
    /// Assembles a match from pre-built parts. Setup code and tests inject
    /// whatever grid, roster and policy they need.
    pub fn new(
        grid: Grid,
        roster: Roster,
        mode: MoveMode,
        policy: Box<dyn TurnPolicy>,
        config: &MatchConfig,
    ) -> Self {
        Self {
            grid,
            roster,
            ledger: MovementLedger::new(mode),
            resolver: AbilityResolver::new(),
            scheduler: TurnScheduler::new(config.ai_turn_delay),
            policy,
            bus: EventBus::new(),
        }
    }

    /// The standard match: configured grid, default lineup spawned at
    /// shuffled cells, pathfinding movement, nearest-foe turn policy.
    pub fn with_default_setup(
        config: &MatchConfig,
        rng: &mut (impl Rng + ?Sized),
        player_control: Control,
    ) -> Result<Self, SetupError> {
        let mut grid = Grid::new(config.grid_width, config.grid_height);
        let roster = spawn_characters(&mut grid, rng, player_control)?;
        Ok(Self::new(
            grid,
            roster,
            MoveMode::Path,
            Box::new(NearestFoePolicy::new()),
            config,
        ))
    }

    fn parts(&mut self) -> (&mut TurnScheduler, SchedulerContext<'_>) {
        (
            &mut self.scheduler,
            SchedulerContext {
                grid: &mut self.grid,
                roster: &mut self.roster,
                ledger: &mut self.ledger,
                resolver: &self.resolver,
                policy: self.policy.as_ref(),
                bus: &mut self.bus,
            },
        )
    }

    pub fn start_game(&mut self, now: Instant) {
        let (scheduler, mut ctx) = self.parts();
        scheduler.start_game(&mut ctx, now);
    }

    /// Advances pending scheduler-driven turns. Call regularly; a no-op
    /// during human turns and after the match ends.
    pub fn poll(&mut self, now: Instant) {
        let (scheduler, mut ctx) = self.parts();
        scheduler.poll(&mut ctx, now);
    }

    /// Moves the current human-controlled actor. Rejected intents leave the
    /// world untouched and emit nothing.
    pub fn try_move(
        &mut self,
        actor_id: CharacterId,
        destination: Cell,
        now: Instant,
    ) -> Result<u32, MovementError> {
        if self.controlled_by_scheduler(actor_id) {
            return Err(MovementError::OutOfTurn(actor_id));
        }
        let (scheduler, mut ctx) = self.parts();
        scheduler.execute_move(&mut ctx, now, actor_id, destination)
    }

    /// Executes an action for the current human-controlled actor.
    pub fn try_execute_action(
        &mut self,
        actor_id: CharacterId,
        action: &Action,
        now: Instant,
    ) -> Result<ActionOutcome, ActionError> {
        if self.controlled_by_scheduler(actor_id) {
            return Err(ActionError::OutOfTurn(actor_id));
        }
        let (scheduler, mut ctx) = self.parts();
        scheduler.execute_action(&mut ctx, now, actor_id, action)
    }

    /// Convenience for targeted actions: builds the action from the actors'
    /// current positions and executes it.
    pub fn try_execute_on_target(
        &mut self,
        actor_id: CharacterId,
        kind: ActionKind,
        target_id: CharacterId,
        now: Instant,
    ) -> Result<ActionOutcome, ActionError> {
        let actor = self
            .roster
            .get(actor_id)
            .ok_or(ActionError::UnknownActor(actor_id))?;
        let target = self
            .roster
            .get(target_id)
            .ok_or(ActionError::UnknownTarget(target_id))?;
        let distance = actor.position.chebyshev_distance(target.position);
        let action = Action::with_target(kind, target_id, distance);
        self.try_execute_action(actor_id, &action, now)
    }

    /// Ends the current turn regardless of what budget or action remains.
    pub fn force_end_turn(&mut self, now: Instant) {
        let (scheduler, mut ctx) = self.parts();
        scheduler.end_turn(&mut ctx, now);
    }

    fn controlled_by_scheduler(&self, actor_id: CharacterId) -> bool {
        self.roster
            .get(actor_id)
            .is_some_and(|c| c.control == Control::Ai)
    }

    // Queries. All re-read live state; nothing here is cached.

    pub fn available_actions(&self, actor_id: CharacterId) -> Vec<Action> {
        self.resolver.available_actions(&self.roster, actor_id)
    }

    pub fn available_action_groups(&self, actor_id: CharacterId) -> Vec<ActionGroup> {
        let actions = self.available_actions(actor_id);
        self.resolver.group_actions(&actions)
    }

    pub fn remaining_movement(&self, actor_id: CharacterId) -> u32 {
        self.ledger.remaining(actor_id)
    }

    pub fn reachable_cells(&self, actor_id: CharacterId) -> Vec<Cell> {
        self.ledger.reachable_cells(&self.grid, &self.roster, actor_id)
    }

    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        self.bus.drain()
    }

    pub fn events(&self) -> &[CombatEvent] {
        self.bus.events()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn phase(&self) -> Phase {
        self.scheduler.phase()
    }

    pub fn round(&self) -> u32 {
        self.scheduler.round()
    }

    pub fn current_actor(&self) -> Option<CharacterId> {
        self.scheduler.current_actor()
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.scheduler.outcome()
    }

    pub fn is_over(&self) -> bool {
        self.scheduler.phase() == Phase::GameOver
    }
}
