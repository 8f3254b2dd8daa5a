//! Linked groups: same-colour components over 4-neighbour adjacency.

use crate::grid::{Direction, Grid};

/// Smallest group that keeps the game alive.
pub const MIN_ACTIVATABLE: usize = 3;

/// Component of `seed` under exact colour match (empty matches empty).
/// The seed comes first; an out-of-range seed yields an empty group.
pub fn linked_group(grid: &Grid, seed: usize) -> Vec<usize> {
    let mut visited = vec![false; grid.len()];
    collect_group(grid, seed, &mut visited)
}

fn collect_group(grid: &Grid, seed: usize, visited: &mut [bool]) -> Vec<usize> {
    let color = match grid.get(seed) {
        Some(cell) => cell.color,
        None => return Vec::new(),
    };
    let mut group = Vec::new();
    let mut stack = vec![seed];
    visited[seed] = true;

    while let Some(index) = stack.pop() {
        group.push(index);
        for dir in Direction::ALL {
            if let Some(n) = grid.neighbor(index, dir) {
                if !visited[n] && grid.get(n).is_some_and(|c| c.color == color) {
                    visited[n] = true;
                    stack.push(n);
                }
            }
        }
    }
    group
}

#[inline]
pub fn is_activatable(group: &[usize]) -> bool {
    group.len() >= MIN_ACTIVATABLE
}

/// True if any component of non-empty stones has at least `MIN_ACTIVATABLE` members.
pub fn has_activatable_group(grid: &Grid) -> bool {
    let mut visited = vec![false; grid.len()];
    for index in 0..grid.len() {
        if visited[index] || grid.get(index).is_none_or(|c| c.is_empty()) {
            continue;
        }
        if is_activatable(&collect_group(grid, index, &mut visited)) {
            return true;
        }
    }
    false
}

/// Sides on which a stone visually joins its neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sides {
    pub up: bool,
    pub right: bool,
    pub down: bool,
    pub left: bool,
}

impl Sides {
    pub fn any(&self) -> bool {
        self.up || self.right || self.down || self.left
    }

    fn set(&mut self, dir: Direction) {
        match dir {
            Direction::Up => self.up = true,
            Direction::Right => self.right = true,
            Direction::Down => self.down = true,
            Direction::Left => self.left = true,
        }
    }
}

/// Joined sides of a stone whose group is activatable; none otherwise.
pub fn joined_sides(grid: &Grid, index: usize) -> Sides {
    let mut sides = Sides::default();
    let Some(cell) = grid.get(index) else {
        return sides;
    };
    if cell.is_empty() || !is_activatable(&linked_group(grid, index)) {
        return sides;
    }
    for dir in Direction::ALL {
        if let Some(n) = grid.neighbor(index, dir) {
            if grid.get(n).is_some_and(|c| c.color == cell.color) {
                sides.set(dir);
            }
        }
    }
    sides
}
