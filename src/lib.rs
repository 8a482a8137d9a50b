//! SameGame State Library
//!
//! This crate provides the board engine and session state for a
//! two-player, turn-based SameGame.
//!
//! # Overview
//!
//! - **Board Engine** - Flood selection of same-type groups, removal with
//!   gravity and column compaction, scoring, and the terminal-state check.
//!
//! - **Local Play** - The two-click select/remove interaction with undo
//!   that a client runs on its own board copy.
//!
//! - **Sessions** - Create, join, submit, restart and view, with status and
//!   turn owner kept consistent and every rejected call leaving the session
//!   untouched.
//!
//! - **Lobby** - Unique short codes, per-player tokens, expiry, and
//!   per-session locking over a pluggable store.
//!
//! # Design Principles
//!
//! 1. **Validate, then mutate** - A transition either fully applies or
//!    returns an error.
//!
//! 2. **Injected randomness and time** - Seeded RNGs and manual clocks make
//!    every flow reproducible.
//!
//! 3. **No networking** - This crate is pure state, no WebSocket or HTTP.
//!
//! 4. **Serialization-ready** - Requests and responses map to JSON for clients.
//!
//! # Example
//!
//! ```rust
//! use samegame_state::state::{
//!     ClickOutcome, CreateRequest, JoinRequest, Lobby, LobbySettings, PlayState, SubmitRequest,
//! };
//!
//! let lobby = Lobby::with_seed(LobbySettings::default(), 7).unwrap();
//!
//! // Host opens a game, a friend joins with the code
//! let created = lobby
//!     .create_session(CreateRequest {
//!         player_name: "Alice".to_string(),
//!         ..Default::default()
//!     })
//!     .unwrap();
//! let joined = lobby
//!     .join_session(JoinRequest {
//!         game_code: created.game_code.to_string(),
//!         player_name: "Bob".to_string(),
//!     })
//!     .unwrap();
//!
//! // Whoever won the dice roll plays first
//! let code = created.game_code.as_str();
//! let view = lobby.get_state(code, created.session_token.as_str()).unwrap();
//! let token = if view.current_player == view.player_number {
//!     created.session_token.as_str()
//! } else {
//!     joined.session_token.as_str()
//! };
//!
//! let board = view.your_grid.clone().unwrap();
//! let mut play = PlayState::new(board, view.moves_per_turn);
//! 'pick: for row in 0..play.board().height() {
//!     for col in 0..play.board().width() {
//!         if let ClickOutcome::Selected { .. } = play.click(row, col) {
//!             play.click(row, col);
//!             break 'pick;
//!         }
//!     }
//! }
//!
//! let outcome = lobby
//!     .submit_move(SubmitRequest {
//!         game_code: code.to_string(),
//!         session_token: token.to_string(),
//!         score: play.score(),
//!         grid: play.board().clone(),
//!     })
//!     .unwrap();
//! assert!(outcome.turn_complete);
//! ```

pub mod state;

// Re-export everything from state module at crate root
pub use state::*;
