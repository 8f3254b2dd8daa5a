//! Stonemerge core: grid, linked groups, gravity and refill, merge scoring and the turn loop.
//!
//! The terminal front-end in `main.rs` only calls [`Game::activate`], [`Game::restart`]
//! and reads the [`Transition`] stream from [`Game::subscribe`].

pub mod cell;
pub mod config;
pub mod error;
pub mod game;
pub mod gravity;
pub mod grid;
pub mod linking;
pub mod merge;

pub use cell::{Cell, DisplayState, StoneColor};
pub use config::GameConfig;
pub use error::{ConfigError, GridParseError};
pub use game::{Activation, Game, Ignored, Phase, Snapshot, Transition, Turn};
pub use grid::{Direction, Grid};
