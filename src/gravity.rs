//! Gravity and refill: close gaps downward, then spawn stones into what is left.

use crate::cell::{Cell, DisplayState};
use crate::grid::{Direction, Grid};
use rand::Rng;
use tracing::trace;

/// One stone moved from `from` down to `to` (same column).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fall {
    pub from: usize,
    pub to: usize,
}

/// Drop stones into the empty slots below them, bottom-up.
/// Afterwards no empty slot has a stone anywhere above it; a second call moves nothing.
pub fn settle(grid: &mut Grid) -> Vec<Fall> {
    let mut falls = Vec::new();
    for index in (0..grid.len()).rev() {
        if !grid.get(index).is_some_and(Cell::is_empty) {
            continue;
        }
        let mut above = grid.neighbor(index, Direction::Up);
        while let Some(from) = above {
            let Some(&cell) = grid.get(from) else { break };
            if !cell.is_empty() {
                grid.set(
                    index,
                    Cell {
                        state: DisplayState::Falling,
                        ..cell
                    },
                );
                grid.set(from, Cell::EMPTY);
                trace!(from, to = index, "stone falls");
                falls.push(Fall { from, to: index });
                break;
            }
            above = grid.neighbor(from, Direction::Up);
        }
    }
    falls
}

/// Fill every empty slot with a fresh spawning stone. Returns the filled slots.
pub fn refill<R: Rng + ?Sized>(grid: &mut Grid, rng: &mut R) -> Vec<usize> {
    let mut spawned = Vec::new();
    for index in 0..grid.len() {
        if grid.get(index).is_some_and(Cell::is_empty) {
            grid.set(index, Cell::spawned(rng));
            spawned.push(index);
        }
    }
    trace!(count = spawned.len(), "stones spawned");
    spawned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::StoneColor;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_settle_drops_to_bottom() {
        let mut grid: Grid = "g./s./..".parse().unwrap();
        let falls = settle(&mut grid);
        assert_eq!(grid.to_string(), "../g./s.");
        assert_eq!(falls, vec![Fall { from: 2, to: 4 }, Fall { from: 0, to: 2 }]);
        assert_eq!(grid.get(4).unwrap().state, DisplayState::Falling);
        assert_eq!(grid.get(2).unwrap().state, DisplayState::Falling);
    }

    #[test]
    fn test_settle_keeps_order_and_points() {
        let mut grid: Grid = "y/./g/./s".parse().unwrap();
        grid.get_mut(0).unwrap().points = 7;
        settle(&mut grid);
        assert_eq!(grid.to_string(), "././y/g/s");
        assert_eq!(grid.get(2).unwrap().points, 7);
    }

    #[test]
    fn test_settle_is_idempotent() {
        let mut grid: Grid = "gs./.y./s.g/..y".parse().unwrap();
        settle(&mut grid);
        let once = grid.clone();
        assert!(settle(&mut grid).is_empty());
        assert_eq!(grid, once);
    }

    #[test]
    fn test_full_grid_does_not_move() {
        let mut grid: Grid = "gs/yg".parse().unwrap();
        assert!(settle(&mut grid).is_empty());
    }

    #[test]
    fn test_refill_fills_every_gap() {
        let mut grid: Grid = "../g./s.".parse().unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let spawned = refill(&mut grid, &mut rng);
        assert_eq!(spawned, vec![0, 1, 3, 5]);
        assert_eq!(grid.empty_count(), 0);
        for i in spawned {
            let cell = grid.get(i).unwrap();
            assert_eq!(cell.points, 1);
            assert_eq!(cell.state, DisplayState::Spawning);
            assert!(StoneColor::SPAWNABLE.contains(&cell.color));
        }
        assert_eq!(grid.get(2).unwrap().state, DisplayState::Idle);
    }
}
