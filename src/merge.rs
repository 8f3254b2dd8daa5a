//! Activation scoring: accumulate a group into its seed, or cash in merged stones.

use crate::cell::{Cell, StoneColor};
use crate::grid::Grid;
use crate::linking::linked_group;
use tracing::debug;

/// What an activation did to the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No same-coloured neighbour, an empty slot, or out of range.
    Ignored,
    /// The seed absorbed its group's points; the other members were emptied.
    Accumulated {
        seed: usize,
        cleared: Vec<usize>,
        gained: u64,
    },
    /// A group of merged stones was emptied for `size * threshold`.
    Cashed { cleared: Vec<usize>, gained: u64 },
}

impl Resolution {
    pub fn gained(&self) -> u64 {
        match self {
            Self::Ignored => 0,
            Self::Accumulated { gained, .. } | Self::Cashed { gained, .. } => *gained,
        }
    }

    pub fn cleared(&self) -> &[usize] {
        match self {
            Self::Ignored => &[],
            Self::Accumulated { cleared, .. } | Self::Cashed { cleared, .. } => cleared,
        }
    }
}

/// Resolve an activation of `seed`. The caller adds `gained()` to the score and
/// runs `normalize` afterwards.
pub fn resolve(grid: &mut Grid, seed: usize, threshold: u32) -> Resolution {
    let Some(&cell) = grid.get(seed) else {
        return Resolution::Ignored;
    };
    if cell.is_empty() {
        return Resolution::Ignored;
    }
    let group = linked_group(grid, seed);
    if group.len() < 2 {
        return Resolution::Ignored;
    }

    if cell.is_merged(threshold) {
        let gained = group.len() as u64 * u64::from(threshold);
        for &i in &group {
            grid.set(i, Cell::EMPTY);
        }
        debug!(seed, size = group.len(), gained, "merged stones cashed");
        return Resolution::Cashed {
            cleared: group,
            gained,
        };
    }

    let sum: u64 = group
        .iter()
        .filter_map(|&i| grid.get(i))
        .map(|c| u64::from(c.points))
        .sum();
    let cleared: Vec<usize> = group.into_iter().filter(|&i| i != seed).collect();
    for &i in &cleared {
        grid.set(i, Cell::EMPTY);
    }
    grid.set(
        seed,
        Cell {
            points: u32::try_from(sum).unwrap_or(u32::MAX),
            ..cell
        },
    );
    debug!(seed, size = cleared.len() + 1, gained = sum, "group accumulated");
    Resolution::Accumulated {
        seed,
        cleared,
        gained: sum,
    }
}

/// Pin every stone at or above `threshold` to a merged stone. Returns the slots that changed.
///
/// Merged-coloured stones below the threshold only come from hand-written `m` stones in a
/// layout; play itself only produces merged stones by reaching the threshold.
pub fn normalize(grid: &mut Grid, threshold: u32) -> Vec<usize> {
    let mut converted = Vec::new();
    for index in 0..grid.len() {
        let Some(&cell) = grid.get(index) else { continue };
        if cell.is_empty() {
            continue;
        }
        let should_merge = cell.points >= threshold || cell.color == StoneColor::Merged;
        let merged = Cell::merged(threshold);
        if should_merge && cell != merged {
            grid.set(index, merged);
            converted.push(index);
        }
    }
    if !converted.is_empty() {
        debug!(count = converted.len(), "stones merged");
    }
    converted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isolated_is_ignored() {
        let mut grid: Grid = "gsg/sgs".parse().unwrap();
        let before = grid.clone();
        assert_eq!(resolve(&mut grid, 1, 50), Resolution::Ignored);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_empty_seed_is_ignored() {
        let mut grid: Grid = "..g".parse().unwrap();
        assert_eq!(resolve(&mut grid, 0, 50), Resolution::Ignored);
        assert_eq!(resolve(&mut grid, 9, 50), Resolution::Ignored);
    }

    #[test]
    fn test_pair_accumulates() {
        let mut grid: Grid = "ggs".parse().unwrap();
        let r = resolve(&mut grid, 1, 50);
        assert_eq!(
            r,
            Resolution::Accumulated {
                seed: 1,
                cleared: vec![0],
                gained: 2
            }
        );
        assert_eq!(grid.to_string(), ".gs");
        assert_eq!(grid.get(1).unwrap().points, 2);
    }

    #[test]
    fn test_sums_existing_points() {
        let mut grid: Grid = "yyy".parse().unwrap();
        grid.get_mut(0).unwrap().points = 10;
        grid.get_mut(2).unwrap().points = 5;
        let r = resolve(&mut grid, 2, 50);
        assert_eq!(r.gained(), 16);
        assert_eq!(grid.get(2).unwrap().points, 16);
        assert_eq!(grid.get(2).unwrap().color, StoneColor::Yellow);
    }

    #[test]
    fn test_merged_pair_is_cashed() {
        let mut grid: Grid = "mms".parse().unwrap();
        normalize(&mut grid, 50);
        let r = resolve(&mut grid, 0, 50);
        assert_eq!(
            r,
            Resolution::Cashed {
                cleared: vec![0, 1],
                gained: 100
            }
        );
        assert_eq!(grid.to_string(), "..s");
    }

    #[test]
    fn test_lone_merged_is_ignored() {
        let mut grid: Grid = "msm".parse().unwrap();
        normalize(&mut grid, 50);
        assert_eq!(resolve(&mut grid, 0, 50), Resolution::Ignored);
    }

    #[test]
    fn test_normalize_pins_overshoot() {
        let mut grid: Grid = "gg".parse().unwrap();
        grid.get_mut(0).unwrap().points = 30;
        grid.get_mut(1).unwrap().points = 30;
        resolve(&mut grid, 0, 50);
        assert_eq!(grid.get(0).unwrap().points, 60);
        assert_eq!(normalize(&mut grid, 50), vec![0]);
        assert_eq!(*grid.get(0).unwrap(), Cell::merged(50));
        assert!(normalize(&mut grid, 50).is_empty());
    }

    #[test]
    fn test_normalize_pins_layout_merged_stones() {
        let mut grid: Grid = "mg".parse().unwrap();
        assert_eq!(grid.get(0).unwrap().points, 1);
        assert_eq!(normalize(&mut grid, 50), vec![0]);
        assert_eq!(*grid.get(0).unwrap(), Cell::merged(50));
        assert_eq!(grid.get(1).unwrap().points, 1);
    }
}
