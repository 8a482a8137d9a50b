//! Game session state.
//!
//! One [`GameSession`] is one two-player match: who is seated, whose turn it
//! is, the scores and the authoritative boards.
//!
//! # Lifecycle
//!
//! ```text
//! ┌─────────┐  join   ┌──────────────┐  turn done   ┌──────────────┐
//! │ waiting │────────▶│ player1_turn │◀────────────▶│ player2_turn │
//! └─────────┘         └──────┬───────┘              └──────┬───────┘
//!                            │     no valid moves left      │
//!                            ▼                              ▼
//!                         ┌─────────────────────────────────┐
//!                         │            completed            │
//!                         └─────────────────────────────────┘
//!        restart (completed, or both seats taken) ──▶ playerN_turn
//! ```
//!
//! Every transition validates first and mutates last, so a rejected call
//! leaves the session exactly as it was.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::board::Board;
use super::code::SessionCode;
use super::config::{GameConfig, TimerMode};
use super::error::SessionError;
use super::generator::GridGenerator;
use super::player::{roll_die, DiceOutcome, PlayerNumber, PlayerSeat, SessionToken};
use super::validator::MoveValidator;

/// Session status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    /// Created, waiting for the second player
    #[default]
    Waiting,
    Player1Turn,
    Player2Turn,
    /// No valid moves remain
    Completed,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Player1Turn => "player1_turn",
            Self::Player2Turn => "player2_turn",
            Self::Completed => "completed",
        }
    }

    /// Active-turn status for a player.
    pub fn turn_of(player: PlayerNumber) -> Self {
        match player {
            PlayerNumber::One => Self::Player1Turn,
            PlayerNumber::Two => Self::Player2Turn,
        }
    }

    /// Check if moves can be submitted.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Player1Turn | Self::Player2Turn)
    }

    /// The player whose turn it is, if a turn is in progress.
    pub fn turn_owner(&self) -> Option<PlayerNumber> {
        match self {
            Self::Player1Turn => Some(PlayerNumber::One),
            Self::Player2Turn => Some(PlayerNumber::Two),
            Self::Waiting | Self::Completed => None,
        }
    }
}

/// Result of an accepted move submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveOutcome {
    pub score: i64,
    pub moves_remaining: u32,
    /// The submitter's turn ended (moves used up, or game over)
    pub turn_complete: bool,
    pub next_player: Option<PlayerNumber>,
    pub game_complete: bool,
    pub has_valid_moves: bool,
}

/// Result of a restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartOutcome {
    pub board: Board,
    pub first_player: PlayerNumber,
    pub dice: DiceOutcome,
}

/// Result of a manual dice roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiceRoll {
    pub dice_roll: u8,
    pub player_number: PlayerNumber,
    pub player1_roll: Option<u8>,
    pub player2_roll: Option<u8>,
    pub both_rolled: bool,
    pub is_tie: bool,
}

/// Session state as seen by one player.
///
/// Carries the requester's own board only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub game_code: SessionCode,
    pub player_number: PlayerNumber,
    pub player1_name: String,
    pub player2_name: Option<String>,
    pub player1_score: i64,
    pub player2_score: i64,
    pub opponent_score: i64,
    pub current_player: PlayerNumber,
    pub game_status: GameStatus,
    pub moves_per_turn: u32,
    pub current_move_count: u32,
    pub num_tile_types: u8,
    pub grid_width: usize,
    pub grid_height: usize,
    pub tile_set: String,
    pub tile_type_multiplier_enabled: bool,
    pub timer_enabled: bool,
    pub timer_seconds: u32,
    pub timer_mode: TimerMode,
    pub auto_select_enabled: bool,
    pub your_grid: Option<Board>,
    pub player1_dice_roll: Option<u8>,
    pub player2_dice_roll: Option<u8>,
}

/// A two-player match.
///
/// Stored records are checked on load; see [`SessionRecordError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SessionRecord")]
pub struct GameSession {
    code: SessionCode,

    player1: PlayerSeat,

    /// Empty until someone joins
    player2: Option<PlayerSeat>,

    status: GameStatus,

    /// Turn owner; after completion, the player who moved last
    current_player: PlayerNumber,

    /// Moves used in the current turn
    move_count: u32,

    config: GameConfig,

    /// Per-player boards; identical content, stored separately
    player1_board: Option<Board>,
    player2_board: Option<Board>,

    created_at: DateTime<Utc>,

    expires_at: DateTime<Utc>,
}

/// Errors that reject a stored session record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionRecordError {
    #[error("status {status} does not match current player {current}")]
    TurnMismatch {
        status: &'static str,
        current: PlayerNumber,
    },

    #[error("status {0} requires a second player")]
    MissingPlayer(&'static str),

    #[error("status waiting with a second player seated")]
    FullWhileWaiting,
}

/// Session fields as persisted, before consistency checks.
#[derive(Deserialize)]
struct SessionRecord {
    code: SessionCode,
    player1: PlayerSeat,
    player2: Option<PlayerSeat>,
    status: GameStatus,
    current_player: PlayerNumber,
    move_count: u32,
    config: GameConfig,
    player1_board: Option<Board>,
    player2_board: Option<Board>,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl TryFrom<SessionRecord> for GameSession {
    type Error = SessionRecordError;

    fn try_from(record: SessionRecord) -> Result<Self, Self::Error> {
        if let Some(owner) = record.status.turn_owner() {
            if owner != record.current_player {
                return Err(SessionRecordError::TurnMismatch {
                    status: record.status.as_str(),
                    current: record.current_player,
                });
            }
        }
        match (record.status, record.player2.is_some()) {
            (GameStatus::Waiting, true) => return Err(SessionRecordError::FullWhileWaiting),
            (status, false) if status != GameStatus::Waiting => {
                return Err(SessionRecordError::MissingPlayer(status.as_str()))
            }
            _ => {}
        }

        Ok(Self {
            code: record.code,
            player1: record.player1,
            player2: record.player2,
            status: record.status,
            current_player: record.current_player,
            move_count: record.move_count,
            config: record.config,
            player1_board: record.player1_board,
            player2_board: record.player2_board,
            created_at: record.created_at,
            expires_at: record.expires_at,
        })
    }
}

impl GameSession {
    /// Create a session in `waiting` with only player 1 seated.
    pub fn new(
        code: SessionCode,
        player1: PlayerSeat,
        config: GameConfig,
        created_at: DateTime<Utc>,
        lifetime: chrono::Duration,
    ) -> Self {
        Self {
            code,
            player1,
            player2: None,
            status: GameStatus::Waiting,
            current_player: PlayerNumber::One,
            move_count: 0,
            config,
            player1_board: None,
            player2_board: None,
            created_at,
            expires_at: created_at + lifetime,
        }
    }

    pub fn code(&self) -> &SessionCode {
        &self.code
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn current_player(&self) -> PlayerNumber {
        self.current_player
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Check if the session can no longer be played.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Get a seat, `None` for an empty player 2 seat.
    pub fn player(&self, number: PlayerNumber) -> Option<&PlayerSeat> {
        match number {
            PlayerNumber::One => Some(&self.player1),
            PlayerNumber::Two => self.player2.as_ref(),
        }
    }

    fn player_mut(&mut self, number: PlayerNumber) -> Option<&mut PlayerSeat> {
        match number {
            PlayerNumber::One => Some(&mut self.player1),
            PlayerNumber::Two => self.player2.as_mut(),
        }
    }

    /// Check if both seats are taken.
    pub fn is_full(&self) -> bool {
        self.player2.is_some()
    }

    /// Board stored for a player.
    pub fn board_for(&self, number: PlayerNumber) -> Option<&Board> {
        match number {
            PlayerNumber::One => self.player1_board.as_ref(),
            PlayerNumber::Two => self.player2_board.as_ref(),
        }
    }

    fn score_of(&self, number: PlayerNumber) -> i64 {
        self.player(number).map_or(0, |p| p.score)
    }

    /// Resolve a presented token to a seat.
    pub fn seat_for_token(&self, token: &str) -> Option<PlayerNumber> {
        if self.player1.token.matches(token) {
            Some(PlayerNumber::One)
        } else if self.player2.as_ref().is_some_and(|p| p.token.matches(token)) {
            Some(PlayerNumber::Two)
        } else {
            None
        }
    }

    /// Resolve a token and reject expired sessions.
    ///
    /// Unknown tokens report `NotFound` so a code alone reveals nothing.
    fn authorize(&self, token: &str, now: DateTime<Utc>) -> Result<PlayerNumber, SessionError> {
        let seat = self.seat_for_token(token).ok_or(SessionError::NotFound)?;
        if self.is_expired(now) {
            return Err(SessionError::Expired);
        }
        Ok(seat)
    }

    fn set_turn(&mut self, player: PlayerNumber) {
        self.current_player = player;
        self.status = GameStatus::turn_of(player);
    }

    fn set_boards(&mut self, board: Board) {
        self.player1_board = Some(board.clone());
        self.player2_board = Some(board);
    }

    fn generator(&self) -> GridGenerator {
        GridGenerator::new(
            self.config.grid_width,
            self.config.grid_height,
            self.config.num_tile_types,
        )
    }

    /// Record a die roll for a seat.
    pub fn set_dice_roll(&mut self, number: PlayerNumber, roll: u8) {
        if let Some(seat) = self.player_mut(number) {
            seat.dice_roll = Some(roll);
        }
    }

    /// Seat player 2, deal the board and roll for the first turn.
    pub fn join<R: Rng + ?Sized>(
        &mut self,
        player2: PlayerSeat,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<DiceOutcome, SessionError> {
        if self.is_expired(now) {
            return Err(SessionError::NotFound);
        }
        if self.status != GameStatus::Waiting || self.player2.is_some() {
            return Err(SessionError::Conflict(
                "Game is not waiting for players".into(),
            ));
        }

        let board = self.generator().generate(rng);
        let dice = DiceOutcome::roll(rng);

        self.player2 = Some(player2);
        self.set_boards(board);
        self.player1.dice_roll = Some(dice.player1_roll);
        self.set_dice_roll(PlayerNumber::Two, dice.player2_roll);
        self.move_count = 0;
        self.set_turn(dice.first_player());

        tracing::info!(
            code = %self.code,
            first = %self.current_player,
            player1_roll = dice.player1_roll,
            player2_roll = dice.player2_roll,
            rerolls = dice.rerolls,
            "player 2 joined"
        );
        Ok(dice)
    }

    /// Accept one turn-step from the turn owner.
    pub fn submit_move(
        &mut self,
        token: &str,
        score: i64,
        board: Board,
        validator: &dyn MoveValidator,
        now: DateTime<Utc>,
    ) -> Result<MoveOutcome, SessionError> {
        let seat = self.authorize(token, now)?;
        if !self.status.is_active() {
            return Err(SessionError::Conflict(format!(
                "Game is not in progress ({})",
                self.status.as_str()
            )));
        }
        if seat != self.current_player {
            return Err(SessionError::Forbidden("Not your turn".into()));
        }
        if score < 0 {
            return Err(SessionError::Validation("Invalid score".into()));
        }
        if board.width() != self.config.grid_width || board.height() != self.config.grid_height {
            return Err(SessionError::Validation(format!(
                "Board must be {}x{} (width x height), got {}x{}",
                self.config.grid_width,
                self.config.grid_height,
                board.width(),
                board.height()
            )));
        }
        if !board.values_within(self.config.num_tile_types) {
            return Err(SessionError::Validation(
                "Board holds an unknown tile type".into(),
            ));
        }

        let has_valid_moves = validator.has_valid_moves(&board);
        let new_count = self.move_count + 1;
        let moves_per_turn = self.config.moves_per_turn;
        let game_complete = !has_valid_moves;
        let turn_complete = new_count >= moves_per_turn || game_complete;

        if let Some(player) = self.player_mut(seat) {
            player.score = score;
        }
        self.set_boards(board);

        if game_complete {
            self.status = GameStatus::Completed;
            self.move_count = 0;
            tracing::info!(
                code = %self.code,
                player1_score = self.player1.score,
                player2_score = self.score_of(PlayerNumber::Two),
                "game completed"
            );
        } else if turn_complete {
            self.move_count = 0;
            self.set_turn(seat.other());
            tracing::info!(code = %self.code, next = %self.current_player, "turn passed");
        } else {
            self.move_count = new_count;
            tracing::debug!(code = %self.code, moves = new_count, "move accepted");
        }

        Ok(MoveOutcome {
            score,
            moves_remaining: if turn_complete {
                0
            } else {
                moves_per_turn - new_count
            },
            turn_complete,
            next_player: turn_complete.then_some(seat.other()),
            game_complete,
            has_valid_moves,
        })
    }

    /// Deal a new board, zero the scores and roll for the first turn.
    pub fn restart<R: Rng + ?Sized>(
        &mut self,
        token: &str,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<RestartOutcome, SessionError> {
        self.authorize(token, now)?;
        if self.status != GameStatus::Completed && self.player2.is_none() {
            return Err(SessionError::Conflict(
                "Both players must be in the game before restarting".into(),
            ));
        }

        let board = self.generator().generate(rng);
        let dice = DiceOutcome::roll(rng);

        self.player1.score = 0;
        self.player1.dice_roll = Some(dice.player1_roll);
        if let Some(player2) = self.player2.as_mut() {
            player2.score = 0;
            player2.dice_roll = Some(dice.player2_roll);
        }
        self.set_boards(board.clone());
        self.move_count = 0;
        self.set_turn(dice.first_player());

        tracing::info!(code = %self.code, first = %self.current_player, "game restarted");
        Ok(RestartOutcome {
            board,
            first_player: self.current_player,
            dice,
        })
    }

    /// Re-roll the requester's die.
    pub fn roll_dice<R: Rng + ?Sized>(
        &mut self,
        token: &str,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<DiceRoll, SessionError> {
        let seat = self.authorize(token, now)?;
        let roll = roll_die(rng);
        self.set_dice_roll(seat, roll);

        let player1_roll = self.player1.dice_roll;
        let player2_roll = self.player2.as_ref().and_then(|p| p.dice_roll);
        let both_rolled = player1_roll.is_some() && player2_roll.is_some();
        Ok(DiceRoll {
            dice_roll: roll,
            player_number: seat,
            player1_roll,
            player2_roll,
            both_rolled,
            is_tie: both_rolled && player1_roll == player2_roll,
        })
    }

    /// Build the requester's view.
    pub fn view(&self, token: &str, now: DateTime<Utc>) -> Result<SessionView, SessionError> {
        let seat = self.authorize(token, now)?;
        let timer = &self.config.timer;
        Ok(SessionView {
            game_code: self.code.clone(),
            player_number: seat,
            player1_name: self.player1.name.clone(),
            player2_name: self.player2.as_ref().map(|p| p.name.clone()),
            player1_score: self.player1.score,
            player2_score: self.score_of(PlayerNumber::Two),
            opponent_score: self.score_of(seat.other()),
            current_player: self.current_player,
            game_status: self.status,
            moves_per_turn: self.config.moves_per_turn,
            current_move_count: self.move_count,
            num_tile_types: self.config.num_tile_types,
            grid_width: self.config.grid_width,
            grid_height: self.config.grid_height,
            tile_set: self.config.tile_set.clone(),
            tile_type_multiplier_enabled: self.config.tile_type_multiplier_enabled,
            timer_enabled: timer.enabled,
            timer_seconds: timer.seconds,
            timer_mode: timer.mode,
            auto_select_enabled: timer.auto_select,
            your_grid: self.board_for(seat).cloned(),
            player1_dice_roll: self.player1.dice_roll,
            player2_dice_roll: self.player2.as_ref().and_then(|p| p.dice_roll),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::board::Cell;
    use crate::state::config::ThemeCatalog;
    use crate::state::validator::GameValidator;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const W: usize = 20;
    const H: usize = 10;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn config(moves_per_turn: u32) -> GameConfig {
        GameConfig {
            grid_width: W,
            grid_height: H,
            moves_per_turn,
            ..GameConfig::default()
        }
        .clamped(&ThemeCatalog::default())
    }

    fn seat(name: &str, token: &str) -> PlayerSeat {
        PlayerSeat::new(name.to_string(), SessionToken::from(token.to_string()))
    }

    fn waiting(moves_per_turn: u32) -> GameSession {
        GameSession::new(
            SessionCode::parse("ABCDEF").unwrap(),
            seat("Alice", "tok-1"),
            config(moves_per_turn),
            now(),
            chrono::Duration::hours(24),
        )
    }

    fn joined(moves_per_turn: u32, seed: u64) -> GameSession {
        let mut session = waiting(moves_per_turn);
        session
            .join(seat("Bob", "tok-2"), &mut StdRng::seed_from_u64(seed), now())
            .unwrap();
        session
    }

    fn token_of(player: PlayerNumber) -> &'static str {
        match player {
            PlayerNumber::One => "tok-1",
            PlayerNumber::Two => "tok-2",
        }
    }

    /// Every tile the same type: always playable.
    fn playable() -> Board {
        Board::from_rows(vec![vec![0; W]; H]).unwrap()
    }

    /// Checkerboard of two types: no moves left.
    fn stuck() -> Board {
        let rows = (0..H)
            .map(|r| (0..W).map(|c| ((r + c) % 2) as Cell).collect())
            .collect();
        Board::from_rows(rows).unwrap()
    }

    #[test]
    fn test_new_session_waits() {
        let session = waiting(1);
        assert_eq!(session.status(), GameStatus::Waiting);
        assert!(!session.is_full());
        assert!(session.board_for(PlayerNumber::One).is_none());
        assert_eq!(session.expires_at(), now() + chrono::Duration::hours(24));
    }

    #[test]
    fn test_join_starts_turns_with_identical_boards() {
        let session = joined(1, 3);
        let owner = session.status().turn_owner().unwrap();
        assert_eq!(owner, session.current_player());
        assert_eq!(session.move_count(), 0);

        let b1 = session.board_for(PlayerNumber::One).unwrap();
        let b2 = session.board_for(PlayerNumber::Two).unwrap();
        assert_eq!(b1, b2);
        assert_eq!((b1.width(), b1.height()), (W, H));
        assert_eq!(b1.remaining(), W * H);

        let r1 = session.player(PlayerNumber::One).unwrap().dice_roll.unwrap();
        let r2 = session.player(PlayerNumber::Two).unwrap().dice_roll.unwrap();
        assert_ne!(r1, r2);
        assert_eq!(owner == PlayerNumber::One, r1 > r2);
    }

    #[test]
    fn test_second_join_rejected_unchanged() {
        let mut session = joined(1, 3);
        let before = session.clone();
        let err = session
            .join(seat("Eve", "tok-3"), &mut StdRng::seed_from_u64(1), now())
            .unwrap_err();
        assert!(matches!(err, SessionError::Conflict(_)));
        assert_eq!(session, before);
    }

    #[test]
    fn test_join_expired_is_not_found() {
        let mut session = waiting(1);
        let later = now() + chrono::Duration::hours(25);
        let err = session
            .join(seat("Bob", "tok-2"), &mut StdRng::seed_from_u64(1), later)
            .unwrap_err();
        assert_eq!(err, SessionError::NotFound);
        assert_eq!(session.status(), GameStatus::Waiting);
    }

    #[test]
    fn test_wrong_player_submit_rejected_unchanged() {
        let mut session = joined(1, 3);
        let idle = session.current_player().other();
        let before = session.clone();

        let err = session
            .submit_move(token_of(idle), 40, playable(), &GameValidator, now())
            .unwrap_err();
        assert_eq!(err, SessionError::Forbidden("Not your turn".into()));
        assert_eq!(session, before);
    }

    #[test]
    fn test_unknown_token_is_not_found() {
        let mut session = joined(1, 3);
        let err = session
            .submit_move("nope", 1, playable(), &GameValidator, now())
            .unwrap_err();
        assert_eq!(err, SessionError::NotFound);
        assert_eq!(session.view("", now()).unwrap_err(), SessionError::NotFound);
    }

    #[test]
    fn test_turn_passes_after_last_move() {
        let mut session = joined(1, 3);
        let mover = session.current_player();

        let outcome = session
            .submit_move(token_of(mover), 8, playable(), &GameValidator, now())
            .unwrap();
        assert_eq!(
            outcome,
            MoveOutcome {
                score: 8,
                moves_remaining: 0,
                turn_complete: true,
                next_player: Some(mover.other()),
                game_complete: false,
                has_valid_moves: true,
            }
        );
        assert_eq!(session.current_player(), mover.other());
        assert_eq!(session.status(), GameStatus::turn_of(mover.other()));
        assert_eq!(session.move_count(), 0);
        assert_eq!(session.player(mover).unwrap().score, 8);
    }

    #[test]
    fn test_multi_move_turn_keeps_owner() {
        let mut session = joined(3, 4);
        let mover = session.current_player();

        let first = session
            .submit_move(token_of(mover), 2, playable(), &GameValidator, now())
            .unwrap();
        assert!(!first.turn_complete);
        assert_eq!(first.moves_remaining, 2);
        assert_eq!(first.next_player, None);
        assert_eq!(session.move_count(), 1);
        assert_eq!(session.current_player(), mover);

        session
            .submit_move(token_of(mover), 4, playable(), &GameValidator, now())
            .unwrap();
        assert_eq!(session.move_count(), 2);
        assert_eq!(session.status(), GameStatus::turn_of(mover));

        let last = session
            .submit_move(token_of(mover), 8, playable(), &GameValidator, now())
            .unwrap();
        assert!(last.turn_complete);
        assert_eq!(session.move_count(), 0);
        assert_eq!(session.current_player(), mover.other());
    }

    #[test]
    fn test_stuck_board_completes_game_mid_turn() {
        let mut session = joined(5, 4);
        let mover = session.current_player();

        let outcome = session
            .submit_move(token_of(mover), 120, stuck(), &GameValidator, now())
            .unwrap();
        assert!(outcome.game_complete);
        assert!(outcome.turn_complete);
        assert!(!outcome.has_valid_moves);
        assert_eq!(outcome.moves_remaining, 0);
        assert_eq!(session.status(), GameStatus::Completed);
        assert_eq!(session.current_player(), mover);

        // no further moves
        let err = session
            .submit_move(token_of(mover), 130, playable(), &GameValidator, now())
            .unwrap_err();
        assert!(matches!(err, SessionError::Conflict(_)));
        assert_eq!(session.player(mover).unwrap().score, 120);
    }

    #[test]
    fn test_submit_updates_both_boards() {
        let mut session = joined(1, 5);
        let mover = session.current_player();
        let mut board = playable();
        board.set(crate::state::board::Position::new(0, 0), 1);

        session
            .submit_move(token_of(mover), 2, board.clone(), &GameValidator, now())
            .unwrap();
        assert_eq!(session.board_for(PlayerNumber::One), Some(&board));
        assert_eq!(session.board_for(PlayerNumber::Two), Some(&board));
    }

    #[test]
    fn test_submit_validation() {
        let mut session = joined(1, 3);
        let mover = session.current_player();
        let before = session.clone();

        let err = session
            .submit_move(token_of(mover), -1, playable(), &GameValidator, now())
            .unwrap_err();
        assert_eq!(err, SessionError::Validation("Invalid score".into()));

        let small = Board::from_rows(vec![vec![0; 3]; 3]).unwrap();
        let err = session
            .submit_move(token_of(mover), 1, small, &GameValidator, now())
            .unwrap_err();
        assert!(matches!(err, SessionError::Validation(_)));

        let bad = Board::from_rows(vec![vec![9; W]; H]).unwrap();
        let err = session
            .submit_move(token_of(mover), 1, bad, &GameValidator, now())
            .unwrap_err();
        assert!(matches!(err, SessionError::Validation(_)));

        assert_eq!(session, before);
    }

    #[test]
    fn test_submit_while_waiting_is_conflict() {
        let mut session = waiting(1);
        let err = session
            .submit_move("tok-1", 1, playable(), &GameValidator, now())
            .unwrap_err();
        assert!(matches!(err, SessionError::Conflict(_)));
    }

    #[test]
    fn test_restart_from_completed() {
        let mut session = joined(1, 6);
        let mover = session.current_player();
        session
            .submit_move(token_of(mover), 50, stuck(), &GameValidator, now())
            .unwrap();
        assert_eq!(session.status(), GameStatus::Completed);

        let outcome = session
            .restart("tok-2", &mut StdRng::seed_from_u64(77), now())
            .unwrap();
        assert!(session.status().is_active());
        assert_eq!(session.status().turn_owner(), Some(outcome.first_player));
        assert_eq!(session.player(PlayerNumber::One).unwrap().score, 0);
        assert_eq!(session.player(PlayerNumber::Two).unwrap().score, 0);
        assert_eq!(session.move_count(), 0);
        assert_eq!(session.board_for(PlayerNumber::One), Some(&outcome.board));
        assert_eq!(outcome.board.remaining(), W * H);
        assert_ne!(session.board_for(PlayerNumber::Two), Some(&stuck()));
    }

    #[test]
    fn test_restart_mid_game_allowed_when_full() {
        let mut session = joined(2, 6);
        assert!(session
            .restart("tok-1", &mut StdRng::seed_from_u64(1), now())
            .is_ok());
    }

    #[test]
    fn test_restart_while_waiting_rejected() {
        let mut session = waiting(1);
        let before = session.clone();
        let err = session
            .restart("tok-1", &mut StdRng::seed_from_u64(1), now())
            .unwrap_err();
        assert!(matches!(err, SessionError::Conflict(_)));
        assert_eq!(session, before);
    }

    #[test]
    fn test_expired_session_rejects_everything() {
        let mut session = joined(1, 3);
        let later = session.expires_at();
        let mover = session.current_player();
        let before = session.clone();

        assert_eq!(
            session
                .submit_move(token_of(mover), 2, playable(), &GameValidator, later)
                .unwrap_err(),
            SessionError::Expired
        );
        assert_eq!(
            session
                .restart("tok-1", &mut StdRng::seed_from_u64(1), later)
                .unwrap_err(),
            SessionError::Expired
        );
        assert_eq!(session.view("tok-2", later).unwrap_err(), SessionError::Expired);
        assert_eq!(session, before);
    }

    #[test]
    fn test_view_is_scoped_to_requester() {
        let mut session = joined(1, 3);
        let mover = session.current_player();
        session
            .submit_move(token_of(mover), 14, playable(), &GameValidator, now())
            .unwrap();

        let view = session.view(token_of(mover), now()).unwrap();
        assert_eq!(view.player_number, mover);
        assert_eq!(view.opponent_score, 0);
        assert_eq!(view.your_grid.as_ref(), session.board_for(mover));
        assert_eq!(view.player1_name, "Alice");
        assert_eq!(view.player2_name.as_deref(), Some("Bob"));

        let other = session.view(token_of(mover.other()), now()).unwrap();
        assert_eq!(other.player_number, mover.other());
        assert_eq!(other.opponent_score, 14);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["game_status"], GameStatus::turn_of(mover.other()).as_str());
        assert_eq!(json["timer_mode"], "per_move");
        assert_eq!(json["your_grid"].as_array().unwrap().len(), H);
    }

    #[test]
    fn test_roll_dice() {
        let mut session = waiting(1);
        let roll = session
            .roll_dice("tok-1", &mut StdRng::seed_from_u64(2), now())
            .unwrap();
        assert_eq!(roll.player_number, PlayerNumber::One);
        assert!((1..=6).contains(&roll.dice_roll));
        assert_eq!(roll.player1_roll, Some(roll.dice_roll));
        assert!(!roll.both_rolled);
        assert!(!roll.is_tie);
    }

    #[test]
    fn test_record_with_mismatched_turn_rejected() {
        let session = joined(1, 3);
        let mut record = serde_json::to_value(&session).unwrap();
        record["status"] = "player1_turn".into();
        record["current_player"] = 2.into();

        let err = serde_json::from_value::<GameSession>(record).unwrap_err();
        assert!(err
            .to_string()
            .contains("status player1_turn does not match current player player2"));
    }

    #[test]
    fn test_record_seats_must_match_status() {
        let mut record = serde_json::to_value(waiting(1)).unwrap();
        record["status"] = "completed".into();
        assert!(serde_json::from_value::<GameSession>(record).is_err());

        let mut record = serde_json::to_value(joined(1, 3)).unwrap();
        record["status"] = "waiting".into();
        assert!(serde_json::from_value::<GameSession>(record).is_err());
    }

    #[test]
    fn test_status_round_trips_through_json() {
        let session = joined(2, 9);
        let text = serde_json::to_string(&session).unwrap();
        let back: GameSession = serde_json::from_str(&text).unwrap();
        assert_eq!(back, session);
        assert_eq!(
            serde_json::to_string(&GameStatus::Player2Turn).unwrap(),
            "\"player2_turn\""
        );
    }
}
