//! Match assembly: grid sizing and the default character lineup.
//!
//! Spawn randomness is injected: the caller supplies the rng, the engine
//! never reaches for an ambient one.

use crate::character::{Character, CharacterId, Control, Side};
use crate::errors::SetupError;
use crate::grid::Grid;
use crate::roster::Roster;
use crate::stats::StatsTemplate;
use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Duration;

/// Tunables for a match. The AI delay is cosmetic pacing only and never
/// affects simulation correctness.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    pub grid_width: i32,
    pub grid_height: i32,
    pub ai_turn_delay: Duration,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            grid_width: 4,
            grid_height: 6,
            ai_turn_delay: Duration::from_secs(1),
        }
    }
}

/// The default lineup: Fighter, Healer and Ranger versus two enemies.
fn default_lineup(player_control: Control) -> Vec<(StatsTemplate, Side, Control)> {
    vec![
        (StatsTemplate::fighter(), Side::Player, player_control),
        (StatsTemplate::healer(), Side::Player, player_control),
        (StatsTemplate::ranger(), Side::Player, player_control),
        (StatsTemplate::enemy(), Side::Enemy, Control::Ai),
        (StatsTemplate::enemy(), Side::Enemy, Control::Ai),
    ]
}

/// Spawns the default lineup at shuffled free cells and registers everyone in
/// the occupancy index. Enemies get numbered names ("Enemy 1", "Enemy 2").
pub fn spawn_characters(
    grid: &mut Grid,
    rng: &mut (impl Rng + ?Sized),
    player_control: Control,
) -> Result<Roster, SetupError> {
    let lineup = default_lineup(player_control);

    let mut cells = grid.available_cells();
    if cells.len() < lineup.len() {
        return Err(SetupError::NotEnoughCells {
            needed: lineup.len(),
            available: cells.len(),
        });
    }
    cells.shuffle(rng);

    let mut characters = Vec::with_capacity(lineup.len());
    let mut enemy_count = 0;
    for (index, (stats, side, control)) in lineup.into_iter().enumerate() {
        let id = CharacterId(index as u32);
        let position = cells[index];
        let name = match side {
            Side::Player => stats.name.clone(),
            Side::Enemy => {
                enemy_count += 1;
                format!("{} {}", stats.name, enemy_count)
            }
        };
        grid.occupy(position, id);
        characters.push(Character::new(id, name, side, control, stats, position));
    }

    Roster::new(characters)
}
