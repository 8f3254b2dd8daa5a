//! Stonemerge: stone-merging tile puzzle in the terminal.

mod app;
mod input;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use stonemerge::{Game, GameConfig, Grid};
use tracing_subscriber::EnvFilter;

/// Front-end options that do not reach the core.
#[derive(Debug, Clone)]
pub struct ViewConfig {
    /// Time each stage (scored, fallen, refilled) stays on screen.
    pub stage_ms: u64,
    pub no_animation: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_default();

    let config = GameConfig {
        rows: args.rows,
        cols: args.cols,
        merge_threshold: args.merge_threshold,
        seed: args.seed,
    };
    let game = match args.layout.as_deref() {
        Some(layout) => {
            let grid: Grid = layout.parse().context("invalid --layout")?;
            let config = GameConfig {
                rows: grid.rows(),
                cols: grid.cols(),
                ..config
            };
            Game::with_grid(config, grid)?
        }
        None => Game::new(config)?,
    };
    let view = ViewConfig {
        stage_ms: args.stage_ms,
        no_animation: args.no_animation,
    };

    let mut app = App::new(game, view, theme);
    app.run()?;
    Ok(())
}

/// Structured logs go to a file; the terminal belongs to the board.
fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = std::fs::File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Stone-merging puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "stonemerge",
    version,
    about = "Stone-merging puzzle in the terminal. Join same-coloured stones, grow them into merged stones, cash them in.",
    long_about = "Stonemerge is a terminal tile-matching puzzle.\n\n\
        Activate a stone that touches at least one stone of its colour: the whole linked group \
        collapses into it and its points add up. Stones that reach the merge threshold become \
        merged stones; activating two or more linked merged stones cashes them in. Gaps fall \
        down and fresh stones drop in from the top. The game ends when no group of three is left.\n\n\
        CONTROLS:\n  Arrows / hjkl  Move cursor    Enter / Space  Activate\n  Mouse click    Activate       R  Restart     Q / Esc  Quit"
)]
pub struct Args {
    /// Grid height in stones.
    #[arg(long, default_value = "5", value_name = "ROWS")]
    pub rows: usize,

    /// Grid width in stones.
    #[arg(long, default_value = "5", value_name = "COLS")]
    pub cols: usize,

    /// Points at which a stone becomes a merged stone.
    #[arg(short, long, default_value = "50", value_name = "POINTS")]
    pub merge_threshold: u32,

    /// Fixed RNG seed for reproducible grids.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Starting grid, rows split by '/': g green, s grey, y yellow, m merged, . empty. Overrides --rows/--cols.
    #[arg(long, value_name = "LAYOUT")]
    pub layout: Option<String>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// How long each turn stage (scored, fallen, refilled) is shown, in ms.
    #[arg(long, default_value = "250", value_name = "MS")]
    pub stage_ms: u64,

    /// Disable fall/spawn effects and stage delays.
    #[arg(long)]
    pub no_animation: bool,

    /// Write logs to this file (filter with RUST_LOG, default info).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["stonemerge"]).unwrap();
        assert_eq!((args.rows, args.cols, args.merge_threshold), (5, 5, 50));
        assert_eq!(args.stage_ms, 250);
        assert_eq!(args.palette, Palette::Normal);
    }

    #[test]
    fn test_palette_alias() {
        let args = Args::try_parse_from(["stonemerge", "--palette", "colourblind"]).unwrap();
        assert_eq!(args.palette, Palette::Colorblind);
    }
}
