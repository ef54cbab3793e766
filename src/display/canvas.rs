//! Off-screen model of the board: what each cell shows and which cells
//! changed since the last paint.

use std::collections::HashSet;

use crate::entities::{Position, PowerUpKind};
use crate::events::GameEvent;

/// Past this many changed cells a full repaint is cheaper.
pub const FULL_REDRAW_THRESHOLD: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Glyph {
    Empty,
    Head,
    Body,
    Food,
    PowerUp(PowerUpKind),
}

/// Cells to repaint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dirty {
    Full,
    /// Sorted row-major.
    Cells(Vec<Position>),
}

impl Dirty {
    pub fn is_full(&self) -> bool {
        matches!(self, Dirty::Full)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Dirty::Cells(cells) if cells.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct Canvas {
    cols: i32,
    rows: i32,
    cells: Vec<Glyph>,
    dirty: HashSet<Position>,
    full_redraw: bool,
    /// Snake segments per cell; a self-overlapping ghost stacks several.
    occupancy: Vec<u16>,
    head: Option<Position>,
}

impl Canvas {
    pub fn new(cols: i32, rows: i32) -> Self {
        Self {
            cols,
            rows,
            cells: vec![Glyph::Empty; (cols * rows).max(0) as usize],
            dirty: HashSet::new(),
            full_redraw: true,
            occupancy: vec![0; (cols * rows).max(0) as usize],
            head: None,
        }
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    fn index(&self, pos: Position) -> Option<usize> {
        pos.in_bounds(self.cols, self.rows)
            .then(|| (pos.y * self.cols + pos.x) as usize)
    }

    /// `None` off the board.
    pub fn glyph(&self, pos: Position) -> Option<Glyph> {
        self.index(pos).map(|i| self.cells[i])
    }

    /// Off-board cells are ignored; unchanged cells are not marked.
    pub fn set(&mut self, pos: Position, glyph: Glyph) {
        let Some(i) = self.index(pos) else { return };
        if self.cells[i] != glyph {
            self.cells[i] = glyph;
            if !self.full_redraw {
                self.dirty.insert(pos);
            }
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(Glyph::Empty);
        self.occupancy.fill(0);
        self.head = None;
        self.mark_full_redraw();
    }

    pub fn mark_full_redraw(&mut self) {
        self.full_redraw = true;
        self.dirty.clear();
    }

    pub fn needs_full_redraw(&self) -> bool {
        self.full_redraw || self.dirty.len() > FULL_REDRAW_THRESHOLD
    }

    fn occupy(&mut self, pos: Position) {
        if let Some(i) = self.index(pos) {
            self.occupancy[i] += 1;
        }
    }

    /// One segment leaves `pos`; the cell is blanked once the last one has.
    fn vacate(&mut self, pos: Position) {
        let Some(i) = self.index(pos) else { return };
        self.occupancy[i] = self.occupancy[i].saturating_sub(1);
        if self.occupancy[i] == 0 {
            self.set(pos, Glyph::Empty);
        }
    }

    /// Hand over the pending repaint and start a new one.
    pub fn take_dirty(&mut self) -> Dirty {
        let dirty = if self.needs_full_redraw() {
            Dirty::Full
        } else {
            let mut cells: Vec<Position> = self.dirty.iter().copied().collect();
            cells.sort_by_key(|p| (p.y, p.x));
            Dirty::Cells(cells)
        };
        self.full_redraw = false;
        self.dirty.clear();
        dirty
    }

    /// Mirror one bus event onto the board.
    pub fn apply(&mut self, event: &GameEvent) {
        match event {
            GameEvent::GameStart { .. } => self.clear(),
            GameEvent::SnakeInit { segments } => {
                for y in 0..self.rows {
                    for x in 0..self.cols {
                        let pos = Position::new(x, y);
                        if self.index(pos).is_some_and(|i| self.occupancy[i] > 0) {
                            self.set(pos, Glyph::Empty);
                        }
                    }
                }
                self.occupancy.fill(0);
                for &segment in segments {
                    self.occupy(segment);
                    self.set(segment, Glyph::Body);
                }
                self.head = segments.first().copied();
                if let Some(head) = self.head {
                    self.set(head, Glyph::Head);
                }
            }
            GameEvent::SnakeMove { head, tail } => {
                // Old head first: on a one-cell snake it is also the tail.
                if let Some(old) = self.head {
                    self.set(old, Glyph::Body);
                }
                self.occupy(*head);
                if let Some(tail) = tail {
                    self.vacate(*tail);
                }
                self.set(*head, Glyph::Head);
                self.head = Some(*head);
            }
            GameEvent::SnakeShrunk { removed } => {
                for &cell in removed {
                    self.vacate(cell);
                }
            }
            GameEvent::FoodSpawn { position } => self.set(*position, Glyph::Food),
            GameEvent::PowerUpSpawn { position, kind } => self.set(*position, Glyph::PowerUp(*kind)),
            GameEvent::StateChanged { .. } => self.mark_full_redraw(),
            _ => {}
        }
    }
}
