//! Terminal-state evaluation.
//!
//! The session layer only needs to know whether a submitted board can still
//! be played, so it depends on [`MoveValidator`] rather than on the board
//! engine's mutation API.

use super::board::Board;

/// Decides whether a board still has a legal move.
pub trait MoveValidator: Send + Sync {
    fn has_valid_moves(&self, board: &Board) -> bool;
}

/// Default validator: a move exists iff two orthogonal neighbours match.
#[derive(Debug, Clone, Copy, Default)]
pub struct GameValidator;

impl MoveValidator for GameValidator {
    fn has_valid_moves(&self, board: &Board) -> bool {
        board.has_valid_moves()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::board::EMPTY;

    #[test]
    fn test_validator_matches_engine() {
        let playable = Board::from_rows(vec![vec![1, 1], vec![0, 2]]).unwrap();
        let stuck = Board::from_rows(vec![vec![1, 0], vec![0, 1]]).unwrap();
        let cleared = Board::from_rows(vec![vec![EMPTY, EMPTY]]).unwrap();

        let validator: &dyn MoveValidator = &GameValidator;
        assert!(validator.has_valid_moves(&playable));
        assert!(!validator.has_valid_moves(&stuck));
        assert!(!validator.has_valid_moves(&cleared));
    }
}
