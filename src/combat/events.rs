use crate::character::CharacterId;
use crate::combat::actions::{Action, ActionOutcome};
use crate::grid::Cell;
use crate::roster::Roster;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a finished match ended.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    /// The player side prevailed; carries the surviving player.
    Victory(CharacterId),
    Defeat,
    /// Both sides eliminated in the same exchange.
    Draw,
}

/// Everything collaborators may observe about the simulation.
///
/// Rendering/UI layers must not infer state from anything but these events
/// and the query methods; a rejected intent produces no event at all.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub enum CombatEvent {
    RoundStarted {
        round: u32,
    },
    RoundEnded {
        round: u32,
    },
    TurnStarted {
        actor: CharacterId,
    },
    TurnEnded {
        actor: CharacterId,
    },
    CharacterMoved {
        actor: CharacterId,
        from: Cell,
        to: Cell,
        cost: u32,
    },
    MovementUpdated {
        actor: CharacterId,
        remaining: u32,
    },
    ActionExecuted {
        actor: CharacterId,
        action: Action,
        outcome: ActionOutcome,
    },
    HealthChanged {
        actor: CharacterId,
        health: u32,
    },
    CharacterDied {
        actor: CharacterId,
    },
    GameOver {
        outcome: GameOutcome,
    },
}

impl CombatEvent {
    /// Formats the event into a human-readable string using roster context.
    /// Returns None for silent events that should not produce user-visible text.
    pub fn format(&self, roster: &Roster) -> Option<String> {
        let name = |id: &CharacterId| {
            roster
                .get(*id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| id.to_string())
        };

        match self {
            CombatEvent::RoundStarted { round } => Some(format!("=== Round {} ===", round)),
            CombatEvent::RoundEnded { .. } => None,
            CombatEvent::TurnStarted { actor } => Some(format!("{}'s turn.", name(actor))),
            CombatEvent::TurnEnded { .. } => None,
            CombatEvent::CharacterMoved { actor, to, cost, .. } => {
                Some(format!("{} moves to {} (cost {}).", name(actor), to, cost))
            }
            CombatEvent::MovementUpdated { .. } => None,
            CombatEvent::ActionExecuted { actor, action, outcome } => match outcome {
                ActionOutcome::DamageDealt { target, amount, .. } => Some(format!(
                    "{} hits {} with {} for {} damage!",
                    name(actor),
                    name(target),
                    action.kind.display_name(),
                    amount
                )),
                ActionOutcome::Healed { target, amount, .. } if target == actor => {
                    Some(format!("{} recovers {} health.", name(actor), amount))
                }
                ActionOutcome::Healed { target, amount, .. } => Some(format!(
                    "{} heals {} for {} health.",
                    name(actor),
                    name(target),
                    amount
                )),
                ActionOutcome::TurnPassed => Some(format!("{} ends the turn.", name(actor))),
            },
            CombatEvent::HealthChanged { .. } => None,
            CombatEvent::CharacterDied { actor } => Some(format!("{} falls!", name(actor))),
            CombatEvent::GameOver { outcome } => match outcome {
                GameOutcome::Victory(survivor) => {
                    Some(format!("Victory! {} stands alone.", name(survivor)))
                }
                GameOutcome::Defeat => Some("Defeat...".to_string()),
                GameOutcome::Draw => Some("The battle ends in a draw.".to_string()),
            },
        }
    }
}

/// Outbound event channel drained by collaborators each tick.
///
/// Delivery is at-least-once and in order; the core never requires its own
/// events for correctness.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    events: Vec<CombatEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: CombatEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[CombatEvent] {
        &self.events
    }

    /// Removes and returns all pending events, preserving order.
    pub fn drain(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Print all events in debug format with indentation.
    pub fn print_debug(&self) {
        for event in &self.events {
            println!("  {:?}", event);
        }
    }

    /// Print all events using their formatted text (when available).
    /// Falls back to debug format for silent events.
    pub fn print_formatted(&self, roster: &Roster) {
        for event in &self.events {
            match event.format(roster) {
                Some(formatted) => println!("  {}", formatted),
                None => println!("  {:?} (silent)", event),
            }
        }
    }
}

impl fmt::Display for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for event in &self.events {
            writeln!(f, "  {:?}", event)?;
        }
        Ok(())
    }
}
