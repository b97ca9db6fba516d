use crate::character::CharacterId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A grid location. Cells have no identity beyond their coordinates.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// max(|dx|, |dy|), used for attack ranges and AI adjacency checks.
    pub fn chebyshev_distance(self, other: Cell) -> u32 {
        let dx = (self.x - other.x).unsigned_abs();
        let dy = (self.y - other.y).unsigned_abs();
        dx.max(dy)
    }

    /// |dx| + |dy|, used by the single-step movement mode, and as the exact
    /// lower bound on path cost (an orthogonal step covers 1 for cost 1, a
    /// diagonal step covers 2 for cost 2).
    pub fn manhattan_distance(self, other: Cell) -> u32 {
        let dx = (self.x - other.x).unsigned_abs();
        let dy = (self.y - other.y).unsigned_abs();
        dx + dy
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Fixed-size cell grid plus the occupancy index.
///
/// The occupancy index is the single source of truth for passability: at most
/// one occupant per cell, and a cell is enterable iff it is in bounds and has
/// no occupant. The grid knows nothing about character stats.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Grid {
    width: i32,
    height: i32,
    occupancy: HashMap<Cell, CharacterId>,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be positive");
        Self {
            width,
            height,
            occupancy: HashMap::new(),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn is_valid(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.is_valid(cell.x, cell.y)
    }

    /// The cell at (x, y), or None when out of range. Out-of-range coordinates
    /// are a normal negative result, never an error.
    pub fn cell_at(&self, x: i32, y: i32) -> Option<Cell> {
        if self.is_valid(x, y) {
            Some(Cell::new(x, y))
        } else {
            None
        }
    }

    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.occupancy.contains_key(&cell)
    }

    pub fn occupant(&self, cell: Cell) -> Option<CharacterId> {
        self.occupancy.get(&cell).copied()
    }

    /// In bounds and unoccupied.
    pub fn can_enter(&self, cell: Cell) -> bool {
        self.contains(cell) && !self.is_occupied(cell)
    }

    /// Places `id` on `cell`, removing any prior occupancy of `id` first.
    pub fn occupy(&mut self, cell: Cell, id: CharacterId) {
        self.vacate(id);
        self.occupancy.insert(cell, id);
    }

    /// Removes `id` from the occupancy index, wherever it is.
    pub fn vacate(&mut self, id: CharacterId) {
        if let Some(cell) = self.position_of(id) {
            self.occupancy.remove(&cell);
        }
    }

    pub fn position_of(&self, id: CharacterId) -> Option<Cell> {
        self.occupancy
            .iter()
            .find(|(_, &occupant)| occupant == id)
            .map(|(&cell, _)| cell)
    }

    /// All unoccupied cells, scanned column-major in a fixed order.
    pub fn available_cells(&self) -> Vec<Cell> {
        let mut cells = Vec::new();
        for x in 0..self.width {
            for y in 0..self.height {
                let cell = Cell::new(x, y);
                if !self.is_occupied(cell) {
                    cells.push(cell);
                }
            }
        }
        cells
    }
}
