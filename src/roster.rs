use crate::character::{Character, CharacterId, Side};
use crate::errors::SetupError;
use serde::{Deserialize, Serialize};

/// Id-indexed arena owning every character in the match.
///
/// Ids are slot indices; other components hold ids, never references, and
/// resolve them through the roster on every call. Dead characters stay in the
/// arena (their grid occupancy is vacated on death).
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Roster {
    characters: Vec<Character>,
}

impl Roster {
    /// Builds a roster, validating that it is non-empty and that every
    /// character's id matches its slot. Violations are setup defects.
    pub fn new(characters: Vec<Character>) -> Result<Self, SetupError> {
        if characters.is_empty() {
            return Err(SetupError::EmptyRoster);
        }
        for (index, character) in characters.iter().enumerate() {
            let expected = CharacterId(index as u32);
            if character.id != expected {
                return Err(SetupError::IdMismatch {
                    expected,
                    found: character.id,
                });
            }
        }
        Ok(Self { characters })
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn contains(&self, id: CharacterId) -> bool {
        (id.0 as usize) < self.characters.len()
    }

    pub fn get(&self, id: CharacterId) -> Option<&Character> {
        self.characters.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        self.characters.get_mut(id.0 as usize)
    }

    /// Resolves an id that internal callers have already validated.
    /// Panics on an unknown id: that is a programmer error, not game flow.
    pub fn character(&self, id: CharacterId) -> &Character {
        self.get(id)
            .unwrap_or_else(|| panic!("unknown character id {}", id))
    }

    /// Mutable variant of [`Roster::character`]; same unknown-id contract.
    pub fn character_mut(&mut self, id: CharacterId) -> &mut Character {
        self.get_mut(id)
            .unwrap_or_else(|| panic!("unknown character id {}", id))
    }

    /// All characters in id order, dead or alive.
    pub fn iter(&self) -> impl Iterator<Item = &Character> {
        self.characters.iter()
    }

    pub fn living(&self) -> impl Iterator<Item = &Character> {
        self.characters.iter().filter(|c| !c.is_dead)
    }

    pub fn living_on_side(&self, side: Side) -> impl Iterator<Item = &Character> + '_ {
        self.living().filter(move |c| c.side == side)
    }

    pub fn side_alive_count(&self, side: Side) -> usize {
        self.living_on_side(side).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::Control;
    use crate::grid::Cell;
    use crate::stats::StatsTemplate;
    use pretty_assertions::assert_eq;

    fn character(id: u32, side: Side) -> Character {
        Character::new(
            CharacterId(id),
            format!("C{}", id),
            side,
            Control::Human,
            StatsTemplate::fighter(),
            Cell::new(id as i32, 0),
        )
    }

    #[test]
    fn test_empty_roster_is_a_setup_defect() {
        assert_eq!(Roster::new(Vec::new()).unwrap_err(), SetupError::EmptyRoster);
    }

    #[test]
    fn test_id_slot_mismatch_is_a_setup_defect() {
        let err = Roster::new(vec![character(1, Side::Player)]).unwrap_err();
        assert_eq!(
            err,
            SetupError::IdMismatch {
                expected: CharacterId(0),
                found: CharacterId(1),
            }
        );
    }

    #[test]
    fn test_side_counts_skip_the_dead() {
        let mut roster = Roster::new(vec![
            character(0, Side::Player),
            character(1, Side::Player),
            character(2, Side::Enemy),
        ])
        .unwrap();

        assert_eq!(roster.side_alive_count(Side::Player), 2);
        assert_eq!(roster.side_alive_count(Side::Enemy), 1);

        roster.character_mut(CharacterId(1)).take_damage(999);
        assert_eq!(roster.side_alive_count(Side::Player), 1);
        assert_eq!(roster.len(), 3, "dead characters stay in the arena");
    }

    #[test]
    #[should_panic(expected = "unknown character id")]
    fn test_unknown_id_panics() {
        let roster = Roster::new(vec![character(0, Side::Player)]).unwrap();
        roster.character(CharacterId(42));
    }
}
