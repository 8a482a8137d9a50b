//! State management for two-player SameGame.
//!
//! - `board` - Board grid, flood selection, removal, gravity and scoring
//! - `generator` - Random board generation
//! - `validator` - Terminal-state check used by the session layer
//! - `play` - Client-side two-click play and undo on one board copy
//! - `code` - Shareable session codes
//! - `player` - Seats, session tokens and the first-turn dice roll
//! - `config` - Per-game configuration and lobby settings
//! - `game` - The session state machine
//! - `store` - Per-session locked storage
//! - `lobby` - The service that ties it together
//! - `error` - Error classes and failure responses
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                                Lobby                                  │
//! │                                                                       │
//! │  ┌───────────────┐   ┌────────────────────┐   ┌────────────────────┐ │
//! │  │ CodeGenerator │   │   SessionStore     │   │   MoveValidator    │ │
//! │  │               │   │                    │   │                    │ │
//! │  │ unique codes  │   │ code →             │   │ board →            │ │
//! │  │ among live    │   │   Mutex<Session>   │   │   has valid moves  │ │
//! │  │ sessions      │   │                    │   │                    │ │
//! │  └───────────────┘   └─────────┬──────────┘   └────────────────────┘ │
//! │                                │                                      │
//! │  ┌─────────────────────────────▼──────────────────────────────────┐  │
//! │  │                      GameSession (per code)                     │  │
//! │  │                                                                 │  │
//! │  │   waiting ──▶ player1_turn ◀──▶ player2_turn ──▶ completed      │  │
//! │  │                     ▲                                  │        │  │
//! │  │                     └────────────── restart ───────────┘        │  │
//! │  └─────────────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────────────┘
//!
//!        client: GridGenerator ─▶ Board ─▶ PlayState ─▶ submit_move
//! ```

pub mod board;
pub mod code;
pub mod config;
pub mod error;
pub mod game;
pub mod generator;
pub mod lobby;
pub mod play;
pub mod player;
pub mod store;
pub mod validator;

// Re-export commonly used types
pub use board::{score, Board, BoardError, Cell, Position, Selection, EMPTY};
pub use code::{CodeError, CodeGenerator, SessionCode};
pub use config::{ConfigError, GameConfig, LobbySettings, ThemeCatalog, TimerConfig, TimerMode};
pub use error::{ErrorKind, SessionError};
pub use game::{
    DiceRoll, GameSession, GameStatus, MoveOutcome, RestartOutcome, SessionRecordError, SessionView,
};
pub use generator::GridGenerator;
pub use lobby::{
    respond, success_json, Clock, CreateRequest, CreateResponse, JoinRequest, JoinResponse,
    Lobby, RestartResponse, SubmitRequest, SystemClock,
};
pub use play::{ClickOutcome, PlayState};
pub use player::{DiceOutcome, PlayerNumber, PlayerSeat, SessionToken};
pub use store::{MemoryStore, SessionStore, SharedSession};
pub use validator::{GameValidator, MoveValidator};
