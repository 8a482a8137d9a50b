//! Local play on one player's board copy.
//!
//! [`PlayState`] drives the two-click interaction a client runs between
//! submissions: the first click highlights a group, a second click inside
//! the highlight removes it. When [`PlayState::turn_complete`] turns true the
//! client submits its board and score to the session.

use serde::Serialize;

use super::board::{score, Board, Position, Selection};

/// Result of a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClickOutcome {
    /// Empty or out-of-range cell, lone tile, or game over
    Ignored,
    /// A group is highlighted; `points` previews its removal
    Selected { count: usize, points: u32 },
    /// The highlighted group was removed
    Removed { count: usize, points: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct UndoStep {
    board: Board,
    points: u32,
    moves_used: u32,
}

/// One player's local game.
#[derive(Debug, Clone)]
pub struct PlayState {
    board: Board,
    selection: Selection,
    score: i64,
    last_removal: Option<u32>,
    undo: Option<UndoStep>,
    moves_per_turn: u32,
    moves_used: u32,
}

impl PlayState {
    pub fn new(board: Board, moves_per_turn: u32) -> Self {
        Self {
            board,
            selection: Selection::default(),
            score: 0,
            last_removal: None,
            undo: None,
            moves_per_turn: moves_per_turn.max(1),
            moves_used: 0,
        }
    }

    /// Resume with a known score, e.g. after reloading session state.
    pub fn with_score(mut self, score: i64) -> Self {
        self.score = score;
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    /// Points from the most recent removal.
    pub fn last_removal(&self) -> Option<u32> {
        self.last_removal
    }

    pub fn moves_used(&self) -> u32 {
        self.moves_used
    }

    pub fn moves_remaining(&self) -> u32 {
        self.moves_per_turn.saturating_sub(self.moves_used)
    }

    /// Check if no group of two or more remains.
    pub fn is_over(&self) -> bool {
        !self.board.has_valid_moves()
    }

    /// Moves used up, or nothing left to play.
    pub fn turn_complete(&self) -> bool {
        self.moves_used >= self.moves_per_turn || self.is_over()
    }

    pub fn can_undo(&self) -> bool {
        self.undo.is_some() && !self.is_over()
    }

    /// Handle a click on `(row, col)`.
    pub fn click(&mut self, row: usize, col: usize) -> ClickOutcome {
        if self.is_over() || self.moves_used >= self.moves_per_turn {
            return ClickOutcome::Ignored;
        }

        let pos = Position::new(row, col);
        if self.selection.contains(pos) {
            return self.commit();
        }

        if self.board.is_empty_at(pos) {
            return ClickOutcome::Ignored;
        }
        self.selection = self.board.flood_select(&self.selection, row, col);
        if self.selection.is_empty() {
            ClickOutcome::Ignored
        } else {
            let count = self.selection.len();
            ClickOutcome::Selected {
                count,
                points: score(count),
            }
        }
    }

    fn commit(&mut self) -> ClickOutcome {
        let before = self.board.clone();
        let count = self.board.commit_selection(&self.selection);
        self.selection.clear();
        if count == 0 {
            return ClickOutcome::Ignored;
        }

        let points = score(count);
        self.undo = Some(UndoStep {
            board: before,
            points,
            moves_used: self.moves_used,
        });
        self.score += i64::from(points);
        self.last_removal = Some(points);
        self.moves_used += 1;
        ClickOutcome::Removed { count, points }
    }

    /// Revert the last removal. Returns false if there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        let Some(step) = self.undo.take() else {
            return false;
        };
        self.board = step.board;
        self.score -= i64::from(step.points);
        self.moves_used = step.moves_used;
        self.last_removal = None;
        self.selection.clear();
        true
    }

    /// Adopt the board from the session at the start of a turn.
    pub fn start_turn(&mut self, board: Board) {
        self.board = board;
        self.selection.clear();
        self.undo = None;
        self.moves_used = 0;
    }
}
