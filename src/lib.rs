//! A deterministic, turn-based tactical combat engine on a small grid.
//!
//! The crate is organized around a few single-owner components:
//!
//! - [`grid::Grid`] owns cells and the occupancy index
//! - [`roster::Roster`] owns every [`character::Character`] in the match
//! - [`combat::movement::MovementLedger`] owns per-turn movement budgets
//! - [`combat::scheduler::TurnScheduler`] owns turn and round sequencing
//! - [`combat::orchestrator::CombatOrchestrator`] ties them together and is
//!   the only surface UI layers talk to
//!
//! All state flows through explicit intents that are validated against live
//! state and either fully applied or rejected. Observers read the
//! [`combat::events::CombatEvent`] stream; randomness (spawn shuffling) is
//! injected by the caller, so a seeded match replays identically.

pub mod character;
pub mod combat;
pub mod errors;
pub mod grid;
pub mod pathfinding;
pub mod roster;
pub mod setup;
pub mod stats;

pub use character::{Character, CharacterId, Control, Side};
pub use combat::actions::{AbilityResolver, Action, ActionGroup, ActionKind, ActionOutcome};
pub use combat::ai::{NearestFoePolicy, TurnPolicy};
pub use combat::events::{CombatEvent, EventBus, GameOutcome};
pub use combat::movement::{MoveMode, MovementLedger};
pub use combat::orchestrator::CombatOrchestrator;
pub use combat::scheduler::{Phase, TurnScheduler};
pub use errors::{ActionError, EngineError, EngineResult, MovementError, SetupError};
pub use grid::{Cell, Grid};
pub use roster::Roster;
pub use setup::MatchConfig;
pub use stats::StatsTemplate;
