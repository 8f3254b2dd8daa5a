//! App: terminal init, main loop, stage play-back and input handling.

use crate::ViewConfig;
use crate::input::{Action, key_to_action, mouse_to_action};
use crate::theme::Theme;
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use ratatui::layout::Rect;
use std::collections::VecDeque;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};
use stonemerge::linking::{Sides, joined_sides};
use stonemerge::{Activation, Game, Grid, Phase, Snapshot, Transition};
use tachyonfx::Effect;
use tracing::{debug, warn};

pub struct App {
    game: Game,
    view: ViewConfig,
    theme: Theme,
    transitions: Receiver<Transition>,
    /// Stages received from the game, not yet on screen.
    pending: VecDeque<Transition>,
    /// Snapshot currently on screen; lags the game while stages play back.
    shown: Snapshot,
    shown_phase: Phase,
    joined: Vec<Sides>,
    stage_started: Option<Instant>,
    stage_effect: Option<Effect>,
    stage_effect_process_time: Option<Instant>,
    cursor: usize,
    /// Best score this session.
    best: u64,
    last_gain: Option<u64>,
    /// Board rect from the last frame, for mouse hits.
    board: Rect,
}

impl App {
    pub fn new(mut game: Game, view: ViewConfig, theme: Theme) -> Self {
        let transitions = game.subscribe();
        let shown = game.snapshot();
        let joined = joined_for(&shown);
        let cursor = shown.cells.len() / 2;
        Self {
            shown_phase: game.phase(),
            best: shown.score,
            game,
            view,
            theme,
            transitions,
            pending: VecDeque::new(),
            shown,
            joined,
            stage_started: None,
            stage_effect: None,
            stage_effect_process_time: None,
            cursor,
            last_gain: None,
            board: Rect::default(),
        }
    }

    /// Stages are still being played back; activations wait for this to clear.
    fn busy(&self) -> bool {
        !self.pending.is_empty() || self.stage_started.is_some()
    }

    fn show(&mut self, transition: Transition) {
        if transition.phase == Phase::Resolving {
            self.last_gain = Some(transition.snapshot.score.saturating_sub(self.shown.score));
        }
        self.best = self.best.max(transition.snapshot.score);
        self.joined = joined_for(&transition.snapshot);
        self.shown = transition.snapshot;
        self.shown_phase = transition.phase;
        self.stage_effect = None;
        self.stage_effect_process_time = None;
    }

    /// Move queued stages onto the screen, holding each animated stage for `stage_ms`.
    fn advance_playback(&mut self, now: Instant) {
        self.pending.extend(self.transitions.try_iter());

        if self.view.no_animation {
            let drained: Vec<_> = self.pending.drain(..).collect();
            let scored = drained.iter().find(|t| t.phase == Phase::Resolving);
            let gain = scored.map(|t| t.snapshot.score.saturating_sub(self.shown.score));
            if let Some(last) = drained.into_iter().last() {
                self.show(last);
            }
            if gain.is_some() {
                self.last_gain = gain;
            }
            self.stage_started = None;
            return;
        }

        let hold = Duration::from_millis(self.view.stage_ms);
        loop {
            if let Some(started) = self.stage_started {
                if now.saturating_duration_since(started) < hold {
                    return;
                }
                self.stage_started = None;
            }
            let Some(next) = self.pending.pop_front() else {
                return;
            };
            let held = matches!(
                next.phase,
                Phase::Resolving | Phase::Settling | Phase::Refilling
            );
            self.show(next);
            if held {
                self.stage_started = Some(now);
            }
        }
    }

    fn activate(&mut self, index: usize) {
        if self.busy() {
            return;
        }
        match self.game.activate(index) {
            Activation::Ignored(reason) => debug!(index, ?reason, "activation ignored"),
            Activation::Resolved(turn) => debug!(
                index,
                gained = turn.gained,
                cashed = turn.cashed,
                "turn resolved"
            ),
        }
    }

    fn restart(&mut self) {
        // stale stages from the abandoned turn
        self.transitions.try_iter().for_each(drop);
        self.pending.clear();
        self.stage_started = None;
        self.last_gain = None;
        self.game.restart();
    }

    fn move_cursor(&mut self, action: Action) {
        let (rows, cols) = (self.shown.rows, self.shown.cols);
        if rows == 0 || cols == 0 {
            return;
        }
        let (row, col) = (self.cursor / cols, self.cursor % cols);
        let (row, col) = match action {
            Action::Up => (row.saturating_sub(1), col),
            Action::Down => ((row + 1).min(rows - 1), col),
            Action::Left => (row, col.saturating_sub(1)),
            Action::Right => (row, (col + 1).min(cols - 1)),
            _ => (row, col),
        };
        self.cursor = row * cols + col;
    }

    /// Returns false when the app should exit.
    fn apply_action(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return false,
            Action::Restart => self.restart(),
            Action::Up | Action::Down | Action::Left | Action::Right => self.move_cursor(action),
            Action::Activate => self.activate(self.cursor),
            Action::Click(x, y) => {
                if let Some(index) =
                    crate::ui::cell_at(self.board, self.shown.rows, self.shown.cols, x, y)
                {
                    self.cursor = index;
                    self.activate(index);
                }
            }
            Action::None => {}
        }
        true
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{DisableMouseCapture, EnableMouseCapture},
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        if let Err(err) = execute!(stdout, EnableMouseCapture) {
            warn!(%err, "mouse capture unavailable");
        }

        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        // Restore
        let _ = execute!(std::io::stdout(), DisableMouseCapture);
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            self.advance_playback(now);

            let busy = self.busy();
            let view = crate::ui::View {
                snapshot: &self.shown,
                phase: self.shown_phase,
                joined: &self.joined,
                cursor: self.cursor,
                best: self.best,
                last_gain: self.last_gain,
                merge_threshold: self.game.config().merge_threshold,
                busy,
            };
            let theme = &self.theme;
            let effect = &mut self.stage_effect;
            let process_time = &mut self.stage_effect_process_time;
            let (stage_ms, no_animation) = (self.view.stage_ms, self.view.no_animation);
            let mut board = self.board;
            terminal.draw(|f| {
                let area = f.area();
                board = crate::ui::board_rect(area, view.snapshot.rows, view.snapshot.cols);
                crate::ui::draw(
                    f,
                    &view,
                    theme,
                    area,
                    effect,
                    process_time,
                    now,
                    stage_ms,
                    no_animation,
                );
            })?;
            self.board = board;

            // ~60 FPS
            let timeout = Duration::from_millis(16).saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    let action = match event::read()? {
                        Event::Key(key) if key.kind == KeyEventKind::Press => key_to_action(key),
                        Event::Mouse(mouse) => mouse_to_action(mouse),
                        _ => Action::None,
                    };
                    if !self.apply_action(action) {
                        return Ok(());
                    }
                }
            }
        }
    }
}

/// Joined sides for every slot of a snapshot.
fn joined_for(snapshot: &Snapshot) -> Vec<Sides> {
    match Grid::from_cells(snapshot.rows, snapshot.cols, snapshot.cells.clone()) {
        Ok(grid) => (0..grid.len()).map(|i| joined_sides(&grid, i)).collect(),
        Err(_) => vec![Sides::default(); snapshot.cells.len()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stonemerge::GameConfig;

    fn app(layout: &str, no_animation: bool) -> App {
        let grid: Grid = layout.parse().unwrap();
        let config = GameConfig {
            rows: grid.rows(),
            cols: grid.cols(),
            seed: Some(3),
            ..GameConfig::default()
        };
        let game = Game::with_grid(config, grid).unwrap();
        let view = ViewConfig {
            stage_ms: 250,
            no_animation,
        };
        App::new(game, view, Theme::default())
    }

    #[test]
    fn test_stages_are_held_then_drained() {
        let mut app = app("gggy/ysys/sysy", false);
        let start = Instant::now();
        app.activate(0);
        app.advance_playback(start);
        assert_eq!(app.shown_phase, Phase::Resolving);
        assert_eq!(app.last_gain, Some(3));
        assert!(app.busy());

        // input is held back while stages play
        let before = app.game.score();
        app.activate(0);
        assert_eq!(app.game.score(), before);

        app.advance_playback(start + Duration::from_millis(250));
        assert_eq!(app.shown_phase, Phase::Settling);
        app.advance_playback(start + Duration::from_millis(500));
        assert_eq!(app.shown_phase, Phase::Refilling);
        app.advance_playback(start + Duration::from_millis(750));
        assert!(!app.busy());
        assert_eq!(app.shown, app.game.snapshot());
    }

    #[test]
    fn test_no_animation_shows_final_state_at_once() {
        let mut app = app("gggy/ysys/sysy", true);
        app.activate(0);
        app.advance_playback(Instant::now());
        assert!(!app.busy());
        assert_eq!(app.shown, app.game.snapshot());
        assert_eq!(app.best, app.game.score());
        assert_eq!(app.last_gain, Some(3));
    }

    #[test]
    fn test_cursor_stays_on_board() {
        let mut app = app("gggy/ysys/sysy", true);
        app.cursor = 0;
        app.move_cursor(Action::Up);
        app.move_cursor(Action::Left);
        assert_eq!(app.cursor, 0);
        for _ in 0..10 {
            app.move_cursor(Action::Right);
            app.move_cursor(Action::Down);
        }
        assert_eq!(app.cursor, 11);
    }

    #[test]
    fn test_restart_drops_queued_stages() {
        let mut app = app("gggy/ysys/sysy", false);
        app.activate(0);
        app.restart();
        app.advance_playback(Instant::now());
        assert!(!app.busy());
        assert_eq!(app.shown.score, 0);
        assert_eq!(app.last_gain, None);
    }

    #[test]
    fn test_quit_stops_the_loop() {
        let mut app = app("gggy/ysys/sysy", true);
        assert!(!app.apply_action(Action::Quit));
        assert!(app.apply_action(Action::None));
    }
}
