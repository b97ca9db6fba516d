//! Cost-bounded shortest-path search over the grid.
//!
//! Movement is 8-directional: orthogonal steps cost 1, diagonal steps cost 2.
//! Because the edge costs differ, the frontier is ordered by accumulated cost
//! (uniform-cost search); a FIFO traversal would not guarantee minimum cost
//! once 1-cost and 2-cost edges are mixed.

use crate::grid::{Cell, Grid};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

pub const ORTHOGONAL_COST: u32 = 1;
pub const DIAGONAL_COST: u32 = 2;

/// Neighbor scan order: N, S, E, W, then the diagonals. Equal-cost paths are
/// tie-broken by discovery order under this scan, which keeps results
/// deterministic for testing.
const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (0, 1),
    (0, -1),
    (1, 0),
    (-1, 0),
    (1, 1),
    (-1, 1),
    (1, -1),
    (-1, -1),
];

/// A path from start to goal. `cells` excludes the start and ends at the goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    pub cells: Vec<Cell>,
    pub cost: u32,
}

/// Minimum-cost path from `start` to `goal` not exceeding `budget`, or None
/// when the goal is occupied, out of bounds, or unreachable within budget.
///
/// Occupied cells are impassable; the goal itself must also be unoccupied;
/// pathing never terminates on top of another character.
pub fn find_path(grid: &Grid, start: Cell, goal: Cell, budget: u32) -> Option<Path> {
    if start == goal || !grid.contains(start) || !grid.contains(goal) {
        return None;
    }
    if grid.is_occupied(goal) {
        return None;
    }
    // Manhattan distance is the exact lower bound on path cost here, so an
    // over-budget goal can be rejected without searching.
    if start.manhattan_distance(goal) > budget {
        return None;
    }

    let mut frontier: BinaryHeap<Reverse<(u32, u64, Cell)>> = BinaryHeap::new();
    let mut best_cost: HashMap<Cell, u32> = HashMap::new();
    let mut came_from: HashMap<Cell, Cell> = HashMap::new();
    let mut sequence: u64 = 0;

    frontier.push(Reverse((0, sequence, start)));
    best_cost.insert(start, 0);

    while let Some(Reverse((cost, _, current))) = frontier.pop() {
        if cost > best_cost.get(&current).copied().unwrap_or(u32::MAX) {
            continue; // stale frontier entry
        }
        if current == goal {
            return Some(reconstruct(&came_from, start, goal, cost));
        }

        for (dx, dy) in NEIGHBOR_OFFSETS {
            let Some(neighbor) = grid.cell_at(current.x + dx, current.y + dy) else {
                continue;
            };
            if grid.is_occupied(neighbor) {
                continue;
            }

            let step = if dx != 0 && dy != 0 {
                DIAGONAL_COST
            } else {
                ORTHOGONAL_COST
            };
            let next_cost = cost + step;
            if next_cost > budget {
                continue;
            }
            if next_cost >= best_cost.get(&neighbor).copied().unwrap_or(u32::MAX) {
                continue;
            }

            best_cost.insert(neighbor, next_cost);
            came_from.insert(neighbor, current);
            sequence += 1;
            frontier.push(Reverse((next_cost, sequence, neighbor)));
        }
    }

    None
}

fn reconstruct(came_from: &HashMap<Cell, Cell>, start: Cell, goal: Cell, cost: u32) -> Path {
    let mut cells = Vec::new();
    let mut current = goal;
    while current != start {
        cells.push(current);
        current = came_from[&current];
    }
    cells.reverse();
    Path { cells, cost }
}

/// All cells other than `start` with a valid bounded path from `start`.
///
/// Agrees exactly with `find_path`: a cell is in the set iff `find_path`
/// returns Some for it. Occupied cells and `start` itself are never included.
pub fn reachable_cells(grid: &Grid, start: Cell, budget: u32) -> HashSet<Cell> {
    let mut reachable = HashSet::new();
    let radius = budget as i32;

    for x in start.x - radius..=start.x + radius {
        for y in start.y - radius..=start.y + radius {
            let Some(cell) = grid.cell_at(x, y) else {
                continue;
            };
            if cell == start || start.manhattan_distance(cell) > budget {
                continue;
            }
            if find_path(grid, start, cell, budget).is_some() {
                reachable.insert(cell);
            }
        }
    }

    reachable
}
