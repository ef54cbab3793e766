//! Rendering layer.  All terminal I/O lives here.
//!
//! The renderer listens to board events and keeps a [`Canvas`]; `present`
//! then translates the pending changes into terminal commands.  No game
//! logic is performed here.
pub mod canvas;

use std::io::Write;
use std::time::Duration;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};

use crate::controllers::Overlay;
use crate::entities::{Position, PowerUpKind};
use crate::error::GameError;
use crate::events::{EventKind, GameEvent, Listener};

pub use canvas::{Canvas, Dirty, Glyph};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_EFFECT: Color = Color::Cyan;
const C_HEAD: Color = Color::Green;
const C_BODY: Color = Color::DarkGreen;
const C_FOOD: Color = Color::Red;
const C_SLOW: Color = Color::Blue;
const C_SHRINK: Color = Color::Yellow;
const C_GHOST: Color = Color::Magenta;
const C_HINT: Color = Color::DarkGrey;
const C_OVERLAY: Color = Color::White;

/// Terminal columns per grid cell; keeps cells roughly square.
pub const CELL_WIDTH: u16 = 2;

// ── Surface layout ────────────────────────────────────────────────────────────

/// Where the board sits inside the terminal.
///
/// Rows, top to bottom: HUD, top border, `rows` board rows, bottom border,
/// controls hint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    pub origin_x: u16,
    pub origin_y: u16,
    pub width: u16,
    pub height: u16,
}

/// Terminal size needed for a `cols × rows` board.
pub fn required_size(cols: i32, rows: i32) -> (u16, u16) {
    let width = cols.max(0) as u16 * CELL_WIDTH + 2;
    let height = rows.max(0) as u16 + 4;
    (width, height)
}

/// Centre the board in a `term_w × term_h` terminal.
pub fn fit(cols: i32, rows: i32, term_w: u16, term_h: u16) -> Result<Layout, GameError> {
    let (width, height) = required_size(cols, rows);
    if term_w < width || term_h < height {
        return Err(GameError::SurfaceTooSmall {
            need_cols: width,
            need_rows: height,
            have_cols: term_w,
            have_rows: term_h,
        });
    }
    Ok(Layout {
        origin_x: (term_w - width) / 2,
        origin_y: (term_h - height) / 2,
        width,
        height,
    })
}

impl Layout {
    fn cell(&self, pos: Position) -> (u16, u16) {
        (
            self.origin_x + 1 + pos.x as u16 * CELL_WIDTH,
            self.origin_y + 2 + pos.y as u16,
        )
    }
}

// ── Per-frame inputs ──────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hud {
    pub score: u32,
    pub difficulty: f64,
    /// Running effect and its time left.
    pub effect: Option<(PowerUpKind, Duration)>,
}

/// Everything `present` needs besides the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub hud: Hud,
    pub overlay: Option<Overlay>,
}

// ── Renderer ──────────────────────────────────────────────────────────────────

pub struct Renderer {
    canvas: Canvas,
    /// `None` while the terminal is too small for the board.
    layout: Option<Layout>,
    last_hud: Option<Hud>,
    last_overlay: Option<Overlay>,
}

impl Renderer {
    /// Fails when the surface cannot hold the board.
    pub fn new(cols: i32, rows: i32, term_w: u16, term_h: u16) -> Result<Self, GameError> {
        let layout = fit(cols, rows, term_w, term_h)?;
        Ok(Self {
            canvas: Canvas::new(cols, rows),
            layout: Some(layout),
            last_hud: None,
            last_overlay: None,
        })
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn layout(&self) -> Option<Layout> {
        self.layout
    }

    /// Re-centre after a terminal resize.  A terminal that became too small
    /// shows a notice until it grows again.
    pub fn resize(&mut self, term_w: u16, term_h: u16) {
        self.layout = match fit(self.canvas.cols(), self.canvas.rows(), term_w, term_h) {
            Ok(layout) => Some(layout),
            Err(err) => {
                tracing::warn!(%err, "terminal too small");
                None
            }
        };
        self.canvas.mark_full_redraw();
        self.last_hud = None;
    }

    /// Paint whatever changed since the previous call.
    pub fn present<W: Write>(&mut self, out: &mut W, frame: &Frame) -> std::io::Result<()> {
        let Some(layout) = self.layout else {
            return draw_too_small(out);
        };

        let dirty = self.canvas.take_dirty();
        let full = dirty.is_full()
            || self.last_overlay != frame.overlay
            || (frame.overlay.is_some() && !dirty.is_empty());

        if full {
            out.queue(terminal::Clear(terminal::ClearType::All))?;
            draw_border(out, &layout)?;
            for y in 0..self.canvas.rows() {
                for x in 0..self.canvas.cols() {
                    self.draw_cell(out, &layout, Position::new(x, y))?;
                }
            }
            draw_controls_hint(out, &layout)?;
        } else if let Dirty::Cells(cells) = &dirty {
            for &pos in cells {
                self.draw_cell(out, &layout, pos)?;
            }
        }

        if full || self.last_hud != Some(frame.hud) {
            draw_hud(out, &layout, &frame.hud)?;
            self.last_hud = Some(frame.hud);
        }

        if full {
            if let Some(overlay) = &frame.overlay {
                draw_overlay(out, &layout, overlay)?;
            }
            self.last_overlay = frame.overlay.clone();
        }

        // Park cursor in a harmless spot and flush
        out.queue(style::ResetColor)?;
        out.queue(cursor::MoveTo(layout.origin_x, layout.origin_y + layout.height - 1))?;
        out.flush()
    }

    fn draw_cell<W: Write>(&self, out: &mut W, layout: &Layout, pos: Position) -> std::io::Result<()> {
        let Some(glyph) = self.canvas.glyph(pos) else {
            return Ok(());
        };
        let (col, row) = layout.cell(pos);
        out.queue(cursor::MoveTo(col, row))?;
        let (text, color) = match glyph {
            Glyph::Empty => ("  ", C_HINT),
            Glyph::Head => ("██", C_HEAD),
            Glyph::Body => ("▓▓", C_BODY),
            Glyph::Food => ("●", C_FOOD),
            Glyph::PowerUp(kind) => ("◆", powerup_color(kind)),
        };
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(format!("{:<2}", text)))?;
        Ok(())
    }
}

impl Listener for Renderer {
    const NAME: &'static str = "renderer";
    const INTERESTS: &'static [EventKind] = &[
        EventKind::GameStart,
        EventKind::StateChanged,
        EventKind::SnakeInit,
        EventKind::SnakeMove,
        EventKind::SnakeShrunk,
        EventKind::FoodSpawn,
        EventKind::PowerUpSpawn,
    ];

    fn on_event(&mut self, event: &GameEvent) -> Vec<GameEvent> {
        self.canvas.apply(event);
        Vec::new()
    }
}

fn powerup_color(kind: PowerUpKind) -> Color {
    match kind {
        PowerUpKind::Slow => C_SLOW,
        PowerUpKind::Shrink => C_SHRINK,
        PowerUpKind::Ghost => C_GHOST,
    }
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, layout: &Layout) -> std::io::Result<()> {
    let inner = layout.width.saturating_sub(2) as usize;
    let top = layout.origin_y + 1;
    let bottom = layout.origin_y + layout.height - 2;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(layout.origin_x, top))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(inner))))?;

    out.queue(cursor::MoveTo(layout.origin_x, bottom))?;
    out.queue(Print(format!("└{}┘", "─".repeat(inner))))?;

    for row in top + 1..bottom {
        out.queue(cursor::MoveTo(layout.origin_x, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(layout.origin_x + layout.width - 1, row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (first row) ───────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, layout: &Layout, hud: &Hud) -> std::io::Result<()> {
    let width = layout.width as usize;

    out.queue(cursor::MoveTo(layout.origin_x, layout.origin_y))?;
    out.queue(Print(" ".repeat(width)))?;

    out.queue(cursor::MoveTo(layout.origin_x + 1, layout.origin_y))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("Score:{:>6}  x{:.2}", hud.score, hud.difficulty)))?;

    if let Some((kind, remaining)) = hud.effect {
        let secs = remaining.as_millis().div_ceil(1000);
        let tag = format!("[{} {:>2}s]", kind.label(), secs);
        let x = layout.origin_x + layout.width.saturating_sub(tag.chars().count() as u16 + 1);
        out.queue(cursor::MoveTo(x, layout.origin_y))?;
        out.queue(style::SetForegroundColor(C_HUD_EFFECT))?;
        out.queue(Print(tag))?;
    }

    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, layout: &Layout) -> std::io::Result<()> {
    let hint = "←↑↓→ / WASD : Move   SPACE : Pause   Q : Quit";
    let x = layout.origin_x + 1;
    out.queue(cursor::MoveTo(x, layout.origin_y + layout.height - 1))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    let room = layout.width.saturating_sub(2) as usize;
    out.queue(Print(hint.chars().take(room).collect::<String>()))?;
    Ok(())
}

// ── Overlay box ───────────────────────────────────────────────────────────────

fn draw_overlay<W: Write>(out: &mut W, layout: &Layout, overlay: &Overlay) -> std::io::Result<()> {
    let inner = overlay
        .lines
        .iter()
        .map(|l| l.chars().count())
        .chain(std::iter::once(overlay.title.chars().count()))
        .max()
        .unwrap_or(0)
        + 4;

    let mut rows = Vec::with_capacity(overlay.lines.len() + 4);
    rows.push(format!("╔{}╗", "═".repeat(inner)));
    rows.push(format!("║{:^inner$}║", overlay.title));
    rows.push(format!("╟{}╢", "─".repeat(inner)));
    for line in &overlay.lines {
        rows.push(format!("║{:^inner$}║", line));
    }
    rows.push(format!("╚{}╝", "═".repeat(inner)));

    let cx = layout.origin_x + layout.width / 2;
    let cy = layout.origin_y + layout.height / 2;
    let start_row = cy.saturating_sub(rows.len() as u16 / 2);
    let col = cx.saturating_sub((inner as u16 + 2) / 2);

    out.queue(style::SetForegroundColor(C_OVERLAY))?;
    for (i, row) in rows.iter().enumerate() {
        out.queue(cursor::MoveTo(col, start_row + i as u16))?;
        out.queue(Print(row))?;
    }
    Ok(())
}

fn draw_too_small<W: Write>(out: &mut W) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    out.queue(cursor::MoveTo(0, 0))?;
    out.queue(style::SetForegroundColor(C_OVERLAY))?;
    out.queue(Print("Terminal too small, please enlarge it"))?;
    out.queue(style::ResetColor)?;
    out.flush()
}
