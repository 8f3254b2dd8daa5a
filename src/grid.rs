//! Grid: row-major stones addressed by linear index. Row 0 is the top.

use crate::cell::{Cell, DisplayState, StoneColor};
use crate::error::GridParseError;
use rand::Rng;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::Up, Self::Right, Self::Down, Self::Left];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    /// Always exactly `rows * cols` long.
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize, fill: Cell) -> Self {
        Self {
            rows,
            cols,
            cells: vec![fill; rows * cols],
        }
    }

    /// Fresh grid of single-point stones drawn from the spawn pool.
    pub fn random<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Self {
        let cells = (0..rows * cols)
            .map(|_| Cell::stone(StoneColor::random(rng)))
            .collect();
        Self { rows, cols, cells }
    }

    pub fn from_cells(rows: usize, cols: usize, cells: Vec<Cell>) -> Result<Self, GridParseError> {
        if rows.checked_mul(cols) != Some(cells.len()) {
            return Err(GridParseError::LengthMismatch {
                expected: rows.saturating_mul(cols),
                found: cells.len(),
            });
        }
        Ok(Self { rows, cols, cells })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Cell> {
        self.cells.get_mut(index)
    }

    #[inline]
    pub fn set(&mut self, index: usize, cell: Cell) {
        if let Some(slot) = self.cells.get_mut(index) {
            *slot = cell;
        }
    }

    /// (row, col) of a linear index.
    #[inline]
    pub fn position(&self, index: usize) -> (usize, usize) {
        let row = index / self.cols;
        (row, index - row * self.cols)
    }

    #[inline]
    pub fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }

    /// Neighbouring slot, or `None` across an edge. No wraparound.
    pub fn neighbor(&self, index: usize, direction: Direction) -> Option<usize> {
        if index >= self.cells.len() {
            return None;
        }
        let (row, col) = self.position(index);
        match direction {
            Direction::Up if row > 0 => Some(index - self.cols),
            Direction::Down if row + 1 < self.rows => Some(index + self.cols),
            Direction::Left if col > 0 => Some(index - 1),
            Direction::Right if col + 1 < self.cols => Some(index + 1),
            _ => None,
        }
    }

    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_empty()).count()
    }

    /// Clear every render hint back to `Idle`.
    pub fn reset_display(&mut self) {
        for cell in &mut self.cells {
            cell.state = DisplayState::Idle;
        }
    }
}

/// Text layout: one character per stone (`g`, `s`, `y`, `m`, `.`), rows split by `/` or newlines.
impl FromStr for Grid {
    type Err = GridParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines: Vec<&str> = s
            .split(['/', '\n'])
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        if lines.is_empty() {
            return Err(GridParseError::Empty);
        }
        let mut cells = Vec::new();
        let mut cols = 0;
        for (row, line) in lines.iter().enumerate() {
            let mut width = 0;
            for ch in line.chars().filter(|c| !c.is_whitespace()) {
                let color = StoneColor::from_symbol(ch).ok_or(GridParseError::UnknownStone {
                    row,
                    col: width,
                    ch,
                })?;
                cells.push(Cell::stone(color));
                width += 1;
            }
            if row == 0 {
                cols = width;
            } else if width != cols {
                return Err(GridParseError::RaggedRow {
                    row,
                    expected: cols,
                    found: width,
                });
            }
        }
        Self::from_cells(lines.len(), cols, cells)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, chunk) in self.cells.chunks(self.cols.max(1)).enumerate() {
            if row > 0 {
                f.write_str("/")?;
            }
            for cell in chunk {
                write!(f, "{}", cell.color.symbol())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors_respect_edges() {
        let grid = Grid::new(3, 4, Cell::EMPTY);
        // top-left corner
        assert_eq!(grid.neighbor(0, Direction::Up), None);
        assert_eq!(grid.neighbor(0, Direction::Left), None);
        assert_eq!(grid.neighbor(0, Direction::Right), Some(1));
        assert_eq!(grid.neighbor(0, Direction::Down), Some(4));
        // end of first row must not wrap to the next
        assert_eq!(grid.neighbor(3, Direction::Right), None);
        assert_eq!(grid.neighbor(4, Direction::Left), None);
        // bottom-right corner
        assert_eq!(grid.neighbor(11, Direction::Down), None);
        assert_eq!(grid.neighbor(11, Direction::Right), None);
        assert_eq!(grid.neighbor(11, Direction::Up), Some(7));
        assert_eq!(grid.neighbor(12, Direction::Up), None);
    }

    #[test]
    fn test_position_and_index() {
        let grid = Grid::new(3, 4, Cell::EMPTY);
        assert_eq!(grid.position(6), (1, 2));
        assert_eq!(grid.index(1, 2), Some(6));
        assert_eq!(grid.index(3, 0), None);
        assert_eq!(grid.index(0, 4), None);
    }

    #[test]
    fn test_parse_layout() {
        let grid: Grid = "gsy/m.g".parse().unwrap();
        assert_eq!((grid.rows(), grid.cols()), (2, 3));
        assert_eq!(grid.get(3).unwrap().color, StoneColor::Merged);
        assert!(grid.get(4).unwrap().is_empty());
        assert_eq!(grid.to_string(), "gsy/m.g");
    }

    #[test]
    fn test_parse_multiline_with_spaces() {
        let grid: Grid = "g s\n y y\n".parse().unwrap();
        assert_eq!((grid.rows(), grid.cols()), (2, 2));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Grid>(), Err(GridParseError::Empty));
        assert_eq!(
            "gg/g".parse::<Grid>(),
            Err(GridParseError::RaggedRow {
                row: 1,
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            "gx".parse::<Grid>(),
            Err(GridParseError::UnknownStone {
                row: 0,
                col: 1,
                ch: 'x'
            })
        );
    }

    #[test]
    fn test_from_cells_checks_length() {
        assert!(Grid::from_cells(2, 2, vec![Cell::EMPTY; 3]).is_err());
    }
}
