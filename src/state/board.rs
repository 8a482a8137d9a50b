//! Board state and the tile-elimination engine.
//!
//! A board is a `height x width` grid of tile types. Clicking a tile selects
//! its 4-connected group of equal tiles; committing the selection removes the
//! group, lets the remaining tiles fall down and packs non-empty columns to
//! the left.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A single cell value: a tile type in `[0, num_tile_types)` or [`EMPTY`].
pub type Cell = u8;

/// Sentinel for a cell with no tile. Encoded as `10` on the wire.
pub const EMPTY: Cell = 10;

/// Grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Orthogonal neighbours that fall inside a `height x width` grid.
    pub fn neighbors(self, height: usize, width: usize) -> impl Iterator<Item = Position> {
        let Position { row, col } = self;
        let up = row.checked_sub(1).map(|r| Position::new(r, col));
        let down = (row + 1 < height).then(|| Position::new(row + 1, col));
        let left = col.checked_sub(1).map(|c| Position::new(row, c));
        let right = (col + 1 < width).then(|| Position::new(row, col + 1));
        [up, down, left, right].into_iter().flatten()
    }
}

/// Board shape errors (only reachable through [`Board::from_rows`]).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("board has no rows")]
    NoRows,

    #[error("board has no columns")]
    NoColumns,

    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Tile grid indexed `[row][col]`, row 0 at the top.
///
/// Serializes as a nested array of rows so clients can round-trip it as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Cell>>", into = "Vec<Vec<Cell>>")]
pub struct Board {
    width: usize,
    height: usize,
    /// Row-major cells
    cells: Vec<Cell>,
}

impl Board {
    /// Create a board with every cell empty. Zero dimensions become 1.
    pub fn empty(width: usize, height: usize) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            cells: vec![EMPTY; width * height],
        }
    }

    /// Build a board from rows, rejecting empty or ragged input.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self, BoardError> {
        let height = rows.len();
        let width = rows.first().map(Vec::len).ok_or(BoardError::NoRows)?;
        if width == 0 {
            return Err(BoardError::NoColumns);
        }

        let mut cells = Vec::with_capacity(width * height);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != width {
                return Err(BoardError::Ragged {
                    row,
                    expected: width,
                    found: values.len(),
                });
            }
            cells.extend(values);
        }

        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        (pos.row < self.height && pos.col < self.width).then(|| pos.row * self.width + pos.col)
    }

    /// Get the cell at a position, `None` when out of bounds.
    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.index(pos).map(|i| self.cells[i])
    }

    /// Set the cell at a position. Out-of-bounds writes are ignored.
    pub fn set(&mut self, pos: Position, cell: Cell) {
        if let Some(i) = self.index(pos) {
            self.cells[i] = cell;
        }
    }

    /// Check if a position holds no tile (out of bounds counts as empty).
    pub fn is_empty_at(&self, pos: Position) -> bool {
        self.get(pos).map_or(true, |c| c == EMPTY)
    }

    /// Rows as nested vectors, the wire shape.
    pub fn rows(&self) -> Vec<Vec<Cell>> {
        self.cells.chunks(self.width).map(<[Cell]>::to_vec).collect()
    }

    /// Number of tiles left on the board.
    pub fn remaining(&self) -> usize {
        self.cells.iter().filter(|c| **c != EMPTY).count()
    }

    /// Check if every cell is empty.
    pub fn is_cleared(&self) -> bool {
        self.cells.iter().all(|c| *c == EMPTY)
    }

    /// Count remaining tiles per type. Values outside `[0, num_types)` are skipped.
    pub fn tile_counts(&self, num_types: usize) -> Vec<usize> {
        let mut counts = vec![0; num_types];
        for cell in &self.cells {
            if let Some(slot) = counts.get_mut(*cell as usize) {
                *slot += 1;
            }
        }
        counts
    }

    /// Check if every cell holds EMPTY or a tile type below `num_types`.
    pub fn values_within(&self, num_types: u8) -> bool {
        self.cells.iter().all(|c| *c == EMPTY || *c < num_types)
    }

    /// Check the gravity and left-packing invariants.
    pub fn is_settled(&self) -> bool {
        let mut seen_empty_column = false;
        for col in 0..self.width {
            let column_empty = (0..self.height).all(|row| self.is_empty_at(Position::new(row, col)));
            if column_empty {
                seen_empty_column = true;
                continue;
            }
            if seen_empty_column {
                return false;
            }

            let mut seen_tile = false;
            for row in 0..self.height {
                let empty = self.is_empty_at(Position::new(row, col));
                if !empty {
                    seen_tile = true;
                } else if seen_tile {
                    return false;
                }
            }
        }
        true
    }

    /// Select the connected group containing `(row, col)`.
    ///
    /// Clicking an empty or out-of-range cell keeps `current` unchanged. A
    /// group of fewer than two tiles is discarded and yields an empty
    /// selection. The selection's `len()` is the selected count.
    pub fn flood_select(&self, current: &Selection, row: usize, col: usize) -> Selection {
        let start = Position::new(row, col);
        let value = match self.get(start) {
            Some(v) if v != EMPTY => v,
            _ => return current.clone(),
        };

        let mut cells = HashSet::from([start]);
        let mut stack = vec![start];
        while let Some(pos) = stack.pop() {
            for next in pos.neighbors(self.height, self.width) {
                if self.get(next) == Some(value) && cells.insert(next) {
                    stack.push(next);
                }
            }
        }

        if cells.len() < 2 {
            return Selection::default();
        }

        Selection {
            value: Some(value),
            cells,
        }
    }

    /// Remove the selected tiles, then settle the board.
    ///
    /// Only cells that still hold the selection's tile type are removed;
    /// out-of-range positions are ignored. Returns the number removed.
    pub fn commit_selection(&mut self, selection: &Selection) -> usize {
        let Some(value) = selection.value else {
            return 0;
        };

        let mut removed = 0;
        for pos in &selection.cells {
            if self.get(*pos) == Some(value) {
                self.set(*pos, EMPTY);
                removed += 1;
            }
        }

        if removed > 0 {
            self.apply_gravity();
            self.compact_columns();
        }
        removed
    }

    /// Slide tiles in each column down, keeping their order.
    fn apply_gravity(&mut self) {
        for col in 0..self.width {
            let tiles: Vec<Cell> = (0..self.height)
                .filter_map(|row| self.get(Position::new(row, col)))
                .filter(|c| *c != EMPTY)
                .collect();
            let gap = self.height - tiles.len();
            for row in 0..self.height {
                let cell = if row < gap { EMPTY } else { tiles[row - gap] };
                self.set(Position::new(row, col), cell);
            }
        }
    }

    /// Shift non-empty columns left over any fully empty column.
    fn compact_columns(&mut self) {
        let kept: Vec<Vec<Cell>> = (0..self.width)
            .map(|col| {
                (0..self.height)
                    .map(|row| self.cells[row * self.width + col])
                    .collect::<Vec<_>>()
            })
            .filter(|column| column.iter().any(|c| *c != EMPTY))
            .collect();

        for col in 0..self.width {
            for row in 0..self.height {
                let cell = kept.get(col).map_or(EMPTY, |column| column[row]);
                self.set(Position::new(row, col), cell);
            }
        }
    }

    /// True iff some tile has an orthogonal neighbour of the same type.
    pub fn has_valid_moves(&self) -> bool {
        for row in 0..self.height {
            for col in 0..self.width {
                let value = self.cells[row * self.width + col];
                if value == EMPTY {
                    continue;
                }
                let right = Position::new(row, col + 1);
                let down = Position::new(row + 1, col);
                if self.get(right) == Some(value) || self.get(down) == Some(value) {
                    return true;
                }
            }
        }
        false
    }
}

impl TryFrom<Vec<Vec<Cell>>> for Board {
    type Error = BoardError;

    fn try_from(rows: Vec<Vec<Cell>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl From<Board> for Vec<Vec<Cell>> {
    fn from(board: Board) -> Self {
        board.rows()
    }
}

/// The currently highlighted group. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    value: Option<Cell>,
    cells: HashSet<Position>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of selected tiles.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.cells.contains(&pos)
    }

    /// Tile type of the selected group.
    pub fn value(&self) -> Option<Cell> {
        self.value
    }

    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.cells.iter()
    }

    pub fn clear(&mut self) {
        self.value = None;
        self.cells.clear();
    }
}

/// Points for removing a group of `removed` tiles.
///
/// Base of 2, plus `2(k - 3) + 2` for every k-th tile from the second on.
/// Groups below two tiles are never removable; they still score the base.
pub fn score(removed: usize) -> u32 {
    let mut points: i64 = 2;
    for k in 2..=removed as i64 {
        points += 2 * (k - 3) + 2;
    }
    points as u32
}
