//! Lobby service.
//!
//! [`Lobby`] is the entry point for every session operation: create, join,
//! submit, view, restart and dice rolls. It resolves codes and tokens,
//! takes the per-session lock for the whole operation and hands off to
//! [`GameSession`] for the transition itself.
//!
//! Randomness and time are injected so tests can run with a seeded RNG and
//! a manual clock.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::board::Board;
use super::code::{CodeError, CodeGenerator, SessionCode, MAX_CODE_ATTEMPTS};
use super::config::{ConfigError, GameConfig, LobbySettings, ThemeCatalog};
use super::error::{ErrorKind, SessionError};
use super::game::{DiceRoll, GameSession, MoveOutcome, SessionView};
use super::player::{normalize_name, roll_die, PlayerNumber, PlayerSeat, SessionToken};
use super::store::{MemoryStore, SessionStore, SharedSession};
use super::validator::{GameValidator, MoveValidator};

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Request to open a new session.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateRequest {
    pub player_name: String,
    #[serde(flatten)]
    pub config: GameConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JoinRequest {
    pub game_code: String,
    pub player_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRequest {
    pub game_code: String,
    pub session_token: String,
    pub score: i64,
    pub grid: Board,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateResponse {
    pub game_code: SessionCode,
    pub session_token: SessionToken,
    pub player_number: PlayerNumber,
    pub config: GameConfig,
    pub dice_roll: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinResponse {
    pub game_code: SessionCode,
    pub session_token: SessionToken,
    pub player_name: String,
    pub player_number: PlayerNumber,
    pub opponent_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestartResponse {
    pub message: String,
    pub new_grid: Board,
    pub current_player: PlayerNumber,
    pub player1_dice_roll: u8,
    pub player2_dice_roll: u8,
}

/// Wrap a serializable response in the success envelope.
pub fn success_json<T: Serialize>(body: &T) -> serde_json::Value {
    match serde_json::to_value(body) {
        Ok(serde_json::Value::Object(mut map)) => {
            map.insert("success".into(), true.into());
            serde_json::Value::Object(map)
        }
        Ok(other) => serde_json::json!({ "success": true, "data": other }),
        Err(err) => serde_json::json!({
            "success": false,
            "error": err.to_string(),
            "kind": ErrorKind::Internal.as_str()
        }),
    }
}

/// Envelope for an operation result.
pub fn respond<T: Serialize>(result: &Result<T, SessionError>) -> serde_json::Value {
    match result {
        Ok(body) => success_json(body),
        Err(err) => err.to_json(),
    }
}

/// Session service.
pub struct Lobby {
    settings: LobbySettings,
    themes: ThemeCatalog,
    codes: CodeGenerator,
    store: Box<dyn SessionStore>,
    validator: Box<dyn MoveValidator>,
    clock: Arc<dyn Clock>,
    rng: Mutex<StdRng>,
}

impl std::fmt::Debug for Lobby {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lobby")
            .field("settings", &self.settings)
            .field("sessions", &self.store.len())
            .finish_non_exhaustive()
    }
}

impl Lobby {
    /// Create a lobby with an in-memory store and an OS-seeded RNG.
    pub fn new(settings: LobbySettings) -> Result<Self, ConfigError> {
        Self::build(settings, StdRng::from_os_rng())
    }

    /// Create a lobby with a deterministic RNG.
    pub fn with_seed(settings: LobbySettings, seed: u64) -> Result<Self, ConfigError> {
        Self::build(settings, StdRng::seed_from_u64(seed))
    }

    fn build(settings: LobbySettings, rng: StdRng) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self {
            themes: settings.theme_catalog(),
            codes: CodeGenerator::new(settings.code_len),
            settings,
            store: Box::new(MemoryStore::new()),
            validator: Box::new(GameValidator),
            clock: Arc::new(SystemClock),
            rng: Mutex::new(rng),
        })
    }

    pub fn with_store(mut self, store: impl SessionStore + 'static) -> Self {
        self.store = Box::new(store);
        self
    }

    pub fn with_validator(mut self, validator: impl MoveValidator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &LobbySettings {
        &self.settings
    }

    pub fn session_count(&self) -> usize {
        self.store.len()
    }

    /// Split off an operation-local RNG so the shared one is never held
    /// across a session lock.
    fn fork_rng(&self) -> StdRng {
        StdRng::from_rng(&mut *self.rng.lock())
    }

    /// Look up a session by client-supplied code and token.
    ///
    /// Returns the token with surrounding whitespace removed; sessions
    /// compare tokens exactly.
    fn open<'t>(&self, code: &str, token: &'t str) -> Result<(SharedSession, &'t str), SessionError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(SessionError::Validation("session token is required".into()));
        }
        let code = parse_code(code)?;
        let shared = self.store.get(&code).ok_or(SessionError::NotFound)?;
        Ok((shared, token))
    }

    /// Open a new session with player 1 seated.
    #[instrument(skip(self, request))]
    pub fn create_session(&self, request: CreateRequest) -> Result<CreateResponse, SessionError> {
        let now = self.clock.now();
        let mut rng = self.fork_rng();
        let config = request.config.clamped(&self.themes);
        let name = normalize_name(&request.player_name, PlayerNumber::One);
        let token = SessionToken::generate(&mut rng);
        let dice_roll = roll_die(&mut rng);

        // one budget covers both code collisions and lost insert races
        for _ in 0..MAX_CODE_ATTEMPTS {
            let Some(code) = self
                .codes
                .draw(&mut rng, |c| self.store.contains_live(c, now))
            else {
                continue;
            };
            let mut session = GameSession::new(
                code.clone(),
                PlayerSeat::new(name.clone(), token.clone()),
                config.clone(),
                now,
                self.settings.session_lifetime(),
            );
            session.set_dice_roll(PlayerNumber::One, dice_roll);

            match self.store.insert_new(session, now) {
                Ok(_) => {
                    tracing::info!(%code, width = config.grid_width, height = config.grid_height, "game created");
                    return Ok(CreateResponse {
                        game_code: code,
                        session_token: token,
                        player_number: PlayerNumber::One,
                        config,
                        dice_roll,
                    });
                }
                Err(lost) => tracing::debug!(code = %lost.code(), "code claimed concurrently"),
            }
        }

        tracing::warn!(attempts = MAX_CODE_ATTEMPTS, "code space exhausted");
        Err(SessionError::GenerationExhausted {
            attempts: MAX_CODE_ATTEMPTS,
        })
    }

    /// Seat a second player and start the game.
    #[instrument(skip(self, request), fields(code = %request.game_code))]
    pub fn join_session(&self, request: JoinRequest) -> Result<JoinResponse, SessionError> {
        let code = parse_code(&request.game_code)?;
        let shared = self.store.get(&code).ok_or(SessionError::NotFound)?;
        let mut rng = self.fork_rng();
        let now = self.clock.now();

        let mut session = shared.lock();
        let name = normalize_name(&request.player_name, PlayerNumber::Two);
        let token = SessionToken::generate(&mut rng);
        session
            .join(PlayerSeat::new(name.clone(), token.clone()), &mut rng, now)
            .inspect_err(|err| tracing::warn!(%err, "join rejected"))?;

        let opponent_name = session
            .player(PlayerNumber::One)
            .map(|p| p.name.clone())
            .unwrap_or_default();
        Ok(JoinResponse {
            game_code: code,
            session_token: token,
            player_name: name,
            player_number: PlayerNumber::Two,
            opponent_name,
        })
    }

    /// Record a turn-step from the player whose turn it is.
    #[instrument(skip(self, request), fields(code = %request.game_code, score = request.score))]
    pub fn submit_move(&self, request: SubmitRequest) -> Result<MoveOutcome, SessionError> {
        let (shared, token) = self.open(&request.game_code, &request.session_token)?;
        let now = self.clock.now();

        let mut session = shared.lock();
        session
            .submit_move(
                token,
                request.score,
                request.grid,
                self.validator.as_ref(),
                now,
            )
            .inspect_err(|err| tracing::warn!(%err, "move rejected"))
    }

    /// The requester's view of a session.
    #[instrument(skip(self, token))]
    pub fn get_state(&self, code: &str, token: &str) -> Result<SessionView, SessionError> {
        let (shared, token) = self.open(code, token)?;
        let now = self.clock.now();
        let session = shared.lock();
        session.view(token, now)
    }

    /// Deal a fresh board and reset scores.
    #[instrument(skip(self, token))]
    pub fn restart_session(&self, code: &str, token: &str) -> Result<RestartResponse, SessionError> {
        let (shared, token) = self.open(code, token)?;
        let mut rng = self.fork_rng();
        let now = self.clock.now();

        let mut session = shared.lock();
        let outcome = session
            .restart(token, &mut rng, now)
            .inspect_err(|err| tracing::warn!(%err, "restart rejected"))?;
        Ok(RestartResponse {
            message: "Game restarted".into(),
            new_grid: outcome.board,
            current_player: outcome.first_player,
            player1_dice_roll: outcome.dice.player1_roll,
            player2_dice_roll: outcome.dice.player2_roll,
        })
    }

    /// Re-roll the requester's die.
    #[instrument(skip(self, token))]
    pub fn roll_dice(&self, code: &str, token: &str) -> Result<DiceRoll, SessionError> {
        let (shared, token) = self.open(code, token)?;
        let mut rng = self.fork_rng();
        let now = self.clock.now();

        let mut session = shared.lock();
        session.roll_dice(token, &mut rng, now)
    }

    /// Known board themes, sorted.
    pub fn list_board_themes(&self) -> Vec<String> {
        self.themes.list().to_vec()
    }

    /// Drop expired sessions.
    pub fn purge_expired(&self) -> usize {
        self.store.purge_expired(self.clock.now())
    }
}

/// Normalize a client-supplied code.
///
/// A code with characters outside the alphabet cannot name a session.
fn parse_code(code: &str) -> Result<SessionCode, SessionError> {
    SessionCode::parse(code).map_err(|err| match err {
        CodeError::InvalidCharacter { .. } => SessionError::NotFound,
        other => other.into(),
    })
}
