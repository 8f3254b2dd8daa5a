//! Game state: grid, score, turn phases and the snapshot stream.

use crate::cell::Cell;
use crate::config::GameConfig;
use crate::error::ConfigError;
use crate::gravity::{self, Fall};
use crate::grid::Grid;
use crate::linking::has_activatable_group;
use crate::merge::{self, Resolution};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, info};

/// Where the turn currently is. Every change is pushed to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Resolving,
    Settling,
    Refilling,
    AwaitingInput,
    GameOver,
}

/// Grid contents plus the observable counters at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<Cell>,
    pub score: u64,
    pub game_over: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub phase: Phase,
    pub snapshot: Snapshot,
}

/// Why an activation did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignored {
    GameOver,
    OutOfBounds,
    Empty,
    /// No same-coloured neighbour.
    Isolated,
}

/// Everything one resolved activation changed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Turn {
    pub gained: u64,
    /// Merged stones were cashed in rather than accumulated.
    pub cashed: bool,
    pub cleared: Vec<usize>,
    pub merged: Vec<usize>,
    pub falls: Vec<Fall>,
    pub spawned: Vec<usize>,
    pub game_over: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    Ignored(Ignored),
    Resolved(Turn),
}

#[derive(Debug)]
pub struct Game {
    config: GameConfig,
    grid: Grid,
    score: u64,
    phase: Phase,
    rng: StdRng,
    subscribers: Vec<Sender<Transition>>,
}

impl Game {
    /// Fresh random grid. Fails on a degenerate config; no grid is built then.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let grid = Grid::random(config.rows, config.cols, &mut rng);
        Ok(Self::assemble(config, grid, rng))
    }

    /// Start from a pre-seeded grid whose size must match `config`.
    pub fn with_grid(config: GameConfig, mut grid: Grid) -> Result<Self, ConfigError> {
        config.validate()?;
        if grid.rows() != config.rows || grid.cols() != config.cols {
            return Err(ConfigError::GridMismatch {
                rows: config.rows,
                cols: config.cols,
                found_rows: grid.rows(),
                found_cols: grid.cols(),
            });
        }
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        merge::normalize(&mut grid, config.merge_threshold);
        // holes in a hand-written layout are closed like any other turn
        if grid.empty_count() > 0 {
            gravity::settle(&mut grid);
            gravity::refill(&mut grid, &mut rng);
            grid.reset_display();
        }
        Ok(Self::assemble(config, grid, rng))
    }

    fn assemble(config: GameConfig, grid: Grid, rng: StdRng) -> Self {
        let mut game = Self {
            config,
            grid,
            score: 0,
            phase: Phase::Idle,
            rng,
            subscribers: Vec::new(),
        };
        game.phase = game.terminal_phase();
        if game.phase == Phase::GameOver {
            info!("no moves on the starting grid");
        }
        game
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            rows: self.grid.rows(),
            cols: self.grid.cols(),
            cells: self.grid.cells().to_vec(),
            score: self.score,
            game_over: self.is_game_over(),
        }
    }

    /// Receive every phase change from now on. Dropped receivers are pruned on the next send.
    pub fn subscribe(&mut self) -> Receiver<Transition> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// A stone at `index` was activated. Runs the whole turn before returning.
    pub fn activate(&mut self, index: usize) -> Activation {
        if self.is_game_over() {
            return Activation::Ignored(Ignored::GameOver);
        }
        let Some(cell) = self.grid.get(index) else {
            return Activation::Ignored(Ignored::OutOfBounds);
        };
        if cell.is_empty() {
            return Activation::Ignored(Ignored::Empty);
        }

        let threshold = self.config.merge_threshold;
        let resolution = merge::resolve(&mut self.grid, index, threshold);
        if resolution == Resolution::Ignored {
            debug!(index, "activation ignored: isolated stone");
            return Activation::Ignored(Ignored::Isolated);
        }

        self.grid.reset_display();
        self.score += resolution.gained();
        let merged = merge::normalize(&mut self.grid, threshold);
        self.transition(Phase::Resolving);

        let falls = gravity::settle(&mut self.grid);
        self.transition(Phase::Settling);

        let spawned = gravity::refill(&mut self.grid, &mut self.rng);
        self.transition(Phase::Refilling);

        self.transition(Phase::AwaitingInput);
        let next = self.terminal_phase();
        if next == Phase::GameOver {
            info!(score = self.score, "game over");
        }
        self.transition(next);

        Activation::Resolved(Turn {
            gained: resolution.gained(),
            cashed: matches!(resolution, Resolution::Cashed { .. }),
            cleared: resolution.cleared().to_vec(),
            merged,
            falls,
            spawned,
            game_over: next == Phase::GameOver,
        })
    }

    /// Replace the grid wholesale and zero the score.
    pub fn restart(&mut self) {
        self.grid = Grid::random(self.config.rows, self.config.cols, &mut self.rng);
        self.score = 0;
        info!("game restarted");
        let next = self.terminal_phase();
        self.transition(next);
    }

    fn terminal_phase(&self) -> Phase {
        if has_activatable_group(&self.grid) {
            Phase::Idle
        } else {
            Phase::GameOver
        }
    }

    fn transition(&mut self, phase: Phase) {
        self.phase = phase;
        if self.subscribers.is_empty() {
            return;
        }
        let transition = Transition {
            phase,
            snapshot: self.snapshot(),
        };
        self.subscribers
            .retain(|tx| tx.send(transition.clone()).is_ok());
    }
}
