//! Layout and drawing: board, joined stones, cursor, sidebar, game over.

use crate::theme::Theme;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use std::collections::HashSet;
use std::time::Instant;
use stonemerge::linking::Sides;
use stonemerge::{DisplayState, Phase, Snapshot, StoneColor};
use tachyonfx::{
    CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count,
};

/// Terminal cells per stone.
const STONE_W: u16 = 6;
const STONE_H: u16 = 2;
/// Gap between stones; filled in when two stones are joined.
const GAP: u16 = 1;

const SIDEBAR_WIDTH: u16 = 24;

/// Everything the board needs for one frame.
pub struct View<'a> {
    pub snapshot: &'a Snapshot,
    pub phase: Phase,
    /// Joined sides per slot of `snapshot`.
    pub joined: &'a [Sides],
    pub cursor: usize,
    pub best: u64,
    pub last_gain: Option<u64>,
    pub merge_threshold: u32,
    /// Turn stages are still being played back.
    pub busy: bool,
}

/// Board size in terminal cells (no border).
fn board_size(rows: usize, cols: usize) -> (u16, u16) {
    let side = |n: usize, stone: u16| {
        let n = u16::try_from(n).unwrap_or(u16::MAX);
        n.saturating_mul(stone)
            .saturating_add(n.saturating_sub(1).saturating_mul(GAP))
    };
    (side(cols, STONE_W), side(rows, STONE_H))
}

/// Playfield size in terminal cells (border + board).
fn playfield_pixel_size(rows: usize, cols: usize) -> (u16, u16) {
    let (w, h) = board_size(rows, cols);
    (w.saturating_add(2), h.saturating_add(2))
}

/// Playfield (with border) and sidebar, centred together in `area`.
fn game_layout(area: Rect, rows: usize, cols: usize) -> (Rect, Rect) {
    let (pw, ph) = playfield_pixel_size(rows, cols);
    let total_w = pw.saturating_add(SIDEBAR_WIDTH);
    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(ph.max(16)),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(pw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);
    let playfield = Rect {
        height: ph.min(inner[0].height),
        ..inner[0]
    };
    (playfield, inner[1])
}

/// Board rect (inside the border) for the given frame area; matches `draw`.
pub fn board_rect(area: Rect, rows: usize, cols: usize) -> Rect {
    let (playfield, _) = game_layout(area, rows, cols);
    let (w, h) = board_size(rows, cols);
    Rect {
        x: playfield.x + 1,
        y: playfield.y + 1,
        width: w.min(playfield.width.saturating_sub(2)),
        height: h.min(playfield.height.saturating_sub(2)),
    }
}

/// Slot under a terminal position, if it lands on a stone (not a gap).
pub fn cell_at(board: Rect, rows: usize, cols: usize, x: u16, y: u16) -> Option<usize> {
    if !board.contains(Position { x, y }) {
        return None;
    }
    let (dx, dy) = (x - board.x, y - board.y);
    let (px, py) = (STONE_W + GAP, STONE_H + GAP);
    if dx % px >= STONE_W || dy % py >= STONE_H {
        return None;
    }
    let (col, row) = ((dx / px) as usize, (dy / py) as usize);
    (row < rows && col < cols).then(|| row * cols + col)
}

fn stone_rect(board: Rect, cols: usize, index: usize) -> Rect {
    let (row, col) = ((index / cols) as u16, (index % cols) as u16);
    Rect {
        x: board.x + col * (STONE_W + GAP),
        y: board.y + row * (STONE_H + GAP),
        width: STONE_W,
        height: STONE_H,
    }
}

/// Slots the current stage animates: cleared, fallen or spawned stones.
fn stage_cells(phase: Phase, snapshot: &Snapshot) -> Vec<usize> {
    let wanted = |i: usize| {
        let cell = &snapshot.cells[i];
        match phase {
            Phase::Resolving => cell.is_empty(),
            Phase::Settling => cell.state == DisplayState::Falling,
            Phase::Refilling => cell.state == DisplayState::Spawning,
            _ => false,
        }
    };
    (0..snapshot.cells.len()).filter(|&i| wanted(i)).collect()
}

/// Buffer positions covered by the given stones.
fn stage_buffer_positions(board: Rect, cols: usize, cells: &[usize]) -> HashSet<(u16, u16)> {
    let mut set = HashSet::new();
    for &i in cells {
        let r = stone_rect(board, cols, i);
        for bx in r.x..r.right().min(board.right()) {
            for by in r.y..r.bottom().min(board.bottom()) {
                set.insert((bx, by));
            }
        }
    }
    set
}

/// Create or update the stage effect (flash on clear, fade-in on fall and spawn) and process it.
fn apply_stage_effect(
    frame: &mut Frame,
    view: &View,
    theme: &Theme,
    board: Rect,
    stage_ms: u32,
    effect: &mut Option<Effect>,
    process_time: &mut Option<Instant>,
    now: Instant,
) {
    let delta = process_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    *process_time = Some(now);

    if effect.is_none() {
        let cells = stage_cells(view.phase, view.snapshot);
        if cells.is_empty() {
            return;
        }
        let positions = stage_buffer_positions(board, view.snapshot.cols, &cells);
        let filter = CellFilter::PositionFn(ref_count(move |pos: Position| {
            positions.contains(&(pos.x, pos.y))
        }));
        let fx = match view.phase {
            Phase::Resolving => {
                fx::fade_from(Color::White, Color::White, (stage_ms, Interpolation::Linear))
            }
            _ => fx::fade_from(theme.bg, theme.bg, (stage_ms, Interpolation::QuadOut)),
        };
        *effect = Some(fx.with_filter(filter).with_area(board));
    }

    if let Some(effect) = effect {
        frame.render_effect(effect, board, TfxDuration::from_millis(delta_ms));
    }
}

/// Draw the board and sidebar, the running stage effect, and the game-over box once play-back is done.
pub fn draw(
    frame: &mut Frame,
    view: &View,
    theme: &Theme,
    area: Rect,
    stage_effect: &mut Option<Effect>,
    stage_process_time: &mut Option<Instant>,
    now: Instant,
    stage_ms: u64,
    no_animation: bool,
) {
    let snapshot = view.snapshot;
    let (playfield, sidebar) = game_layout(area, snapshot.rows, snapshot.cols);
    let board = board_rect(area, snapshot.rows, snapshot.cols);

    draw_playfield(frame, view, theme, playfield, board);
    draw_sidebar(frame, view, theme, sidebar);

    if !no_animation {
        let ms = stage_ms.min(u32::MAX as u64) as u32;
        apply_stage_effect(
            frame,
            view,
            theme,
            board,
            ms,
            stage_effect,
            stage_process_time,
            now,
        );
    }
    if snapshot.game_over && !view.busy {
        draw_game_over(frame, view, theme, playfield);
    }
}

fn draw_playfield(frame: &mut Frame, view: &View, theme: &Theme, area: Rect, board: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" Stonemerge ", theme.title));
    block.render(area, frame.buffer_mut());

    let buf = frame.buffer_mut();
    fill(buf, board, Style::default().bg(theme.bg), " ");

    let snapshot = view.snapshot;
    for (index, cell) in snapshot.cells.iter().enumerate() {
        let rect = stone_rect(board, snapshot.cols, index);
        let color = theme.stone_color(cell.color);

        if cell.is_empty() {
            let dot = Position {
                x: rect.x + STONE_W / 2,
                y: rect.y + STONE_H / 2,
            };
            if board.contains(dot) {
                buf[(dot.x, dot.y)]
                    .set_symbol("·")
                    .set_style(Style::default().fg(theme.div_line).bg(theme.bg));
            }
        } else {
            let symbol = if index == view.cursor { "░" } else { " " };
            fill(
                buf,
                rect.intersection(board),
                Style::default().fg(theme.title).bg(color),
                symbol,
            );
            // joined stones bleed into the gap between them
            let sides = view.joined.get(index).copied().unwrap_or_default();
            if sides.right {
                let gap = Rect {
                    x: rect.right(),
                    width: GAP,
                    ..rect
                };
                fill(buf, gap.intersection(board), Style::default().bg(color), " ");
            }
            if sides.down {
                let gap = Rect {
                    y: rect.bottom(),
                    height: GAP,
                    ..rect
                };
                fill(buf, gap.intersection(board), Style::default().bg(color), " ");
            }
            let label = if cell.color == StoneColor::Merged {
                format!("★{}", cell.points)
            } else {
                cell.points.to_string()
            };
            let lx = rect.x + STONE_W.saturating_sub(label.chars().count() as u16) / 2;
            if board.contains(Position { x: lx, y: rect.y }) {
                buf.set_string(
                    lx,
                    rect.y,
                    label,
                    Style::default().fg(theme.bg).bg(color).bold(),
                );
            }
        }

        if index == view.cursor && cell.is_empty() {
            fill(
                buf,
                rect.intersection(board),
                Style::default().fg(theme.inactive_fg).bg(theme.bg),
                "░",
            );
        }
    }
}

fn fill(buf: &mut Buffer, rect: Rect, style: Style, symbol: &str) {
    for y in rect.y..rect.bottom() {
        for x in rect.x..rect.right() {
            buf[(x, y)].set_symbol(symbol).set_style(style);
        }
    }
}

fn draw_sidebar(frame: &mut Frame, view: &View, theme: &Theme, area: Rect) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Stats
            Constraint::Length(1), // gap
            Constraint::Length(4), // Colours
            Constraint::Length(1), // gap
            Constraint::Length(4), // Status
        ])
        .split(area);

    // --- Stats: Score, Best, Last, Merge threshold ---
    let stats_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);
    let stats_inner = stats_block.inner(chunks[0]);
    stats_block.render(chunks[0], frame.buffer_mut());
    let last = view
        .last_gain
        .map_or_else(|| "-".to_string(), |g| format!("+{g}"));
    let stats_lines = vec![
        Line::from(vec![
            Span::styled("Score: ", title_style),
            Span::styled(view.snapshot.score.to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Best: ", title_style),
            Span::styled(view.best.to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Last: ", title_style),
            Span::styled(last, fg_style),
        ]),
        Line::from(vec![
            Span::styled("Merge at: ", title_style),
            Span::styled(view.merge_threshold.to_string(), fg_style),
        ]),
    ];
    Paragraph::new(ratatui::text::Text::from(stats_lines)).render(stats_inner, frame.buffer_mut());

    // --- Colours ---
    let colours_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);
    let colours_inner = colours_block.inner(chunks[2]);
    colours_block.render(chunks[2], frame.buffer_mut());
    let colours_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(colours_inner);
    Paragraph::new(Line::from(Span::styled("Colours", title_style)))
        .render(colours_layout[0], frame.buffer_mut());
    draw_colour_strip(frame, theme, colours_layout[1]);

    // --- Status ---
    let status_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);
    let status_inner = status_block.inner(chunks[4]);
    status_block.render(chunks[4], frame.buffer_mut());
    let status = match view.phase {
        _ if view.snapshot.game_over && !view.busy => "No moves left",
        Phase::Resolving => "Scoring…",
        Phase::Settling => "Falling…",
        Phase::Refilling => "Refilling…",
        _ => "Your move",
    };
    let lines = vec![
        Line::from(Span::styled(status, title_style)),
        Line::from(Span::styled("⏎ activate  r  q", fg_style)),
    ];
    Paragraph::new(ratatui::text::Text::from(lines)).render(status_inner, frame.buffer_mut());
}

/// Row of stone colours, merged last.
fn draw_colour_strip(frame: &mut Frame, theme: &Theme, area: Rect) {
    let colors = [
        StoneColor::Green,
        StoneColor::Grey,
        StoneColor::Yellow,
        StoneColor::Merged,
    ];
    let block_w = (area.width / colors.len() as u16).max(1);
    for (i, color) in colors.into_iter().enumerate() {
        let r = Rect {
            x: area.x + (i as u16) * block_w,
            y: area.y,
            width: block_w.saturating_sub(1).max(1),
            height: area.height.min(1),
        };
        let c = theme.stone_color(color);
        Paragraph::new("██")
            .style(Style::default().fg(c).bg(c))
            .render(r.intersection(area), frame.buffer_mut());
    }
}

fn draw_game_over(frame: &mut Frame, view: &View, theme: &Theme, playfield: Rect) {
    let popup_w = 26u16.min(playfield.width);
    let popup_h = 9u16.min(playfield.height);
    let popup = Rect {
        x: playfield.x + playfield.width.saturating_sub(popup_w) / 2,
        y: playfield.y + playfield.height.saturating_sub(popup_h) / 2,
        width: popup_w,
        height: popup_h,
    };
    fill(frame.buffer_mut(), popup, Style::default().bg(theme.bg), " ");
    let lines = vec![
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Score: {} ", view.snapshot.score),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(Span::styled(
            format!(" Best: {} ", view.best),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " R: Restart  Q: Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}
