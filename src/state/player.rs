//! Players, session tokens and the dice tie-break.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Maximum display-name length in characters.
pub const MAX_NAME_LEN: usize = 50;

/// Random bytes behind a session token (hex-encoded, so twice as many chars).
pub const TOKEN_BYTES: usize = 32;

/// Which seat a player occupies. Encoded as `1` or `2` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum PlayerNumber {
    One,
    Two,
}

impl PlayerNumber {
    pub fn other(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }

    /// Default display name for the seat.
    pub fn default_name(self) -> &'static str {
        match self {
            Self::One => "Player 1",
            Self::Two => "Player 2",
        }
    }
}

impl From<PlayerNumber> for u8 {
    fn from(number: PlayerNumber) -> Self {
        number.as_u8()
    }
}

impl TryFrom<u8> for PlayerNumber {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(format!("invalid player number {other}")),
        }
    }
}

impl fmt::Display for PlayerNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player{}", self.as_u8())
    }
}

/// Opaque per-player secret.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Draw a fresh random token.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        rng.fill(&mut bytes[..]);
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compare exactly against a token presented by a client.
    pub fn matches(&self, presented: &str) -> bool {
        !presented.is_empty() && self.0 == presented
    }
}

impl From<String> for SessionToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

/// Trim a requested display name, cap its length and fall back to the
/// seat's default when nothing is left.
pub fn normalize_name(requested: &str, seat: PlayerNumber) -> String {
    let name: String = requested.trim().chars().take(MAX_NAME_LEN).collect();
    let name = name.trim_end();
    if name.is_empty() {
        seat.default_name().to_string()
    } else {
        name.to_string()
    }
}

/// One occupied seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSeat {
    pub name: String,
    pub token: SessionToken,
    pub score: i64,
    /// Most recent die roll
    pub dice_roll: Option<u8>,
}

impl PlayerSeat {
    pub fn new(name: String, token: SessionToken) -> Self {
        Self {
            name,
            token,
            score: 0,
            dice_roll: None,
        }
    }
}

/// Roll a six-sided die.
pub fn roll_die<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    rng.random_range(1..=6)
}

/// Outcome of the first-turn dice roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceOutcome {
    pub player1_roll: u8,
    pub player2_roll: u8,
    /// Number of tied rounds that were rerolled
    pub rerolls: u32,
}

impl DiceOutcome {
    /// Both players roll; ties reroll until the rolls differ.
    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut rerolls = 0;
        loop {
            let player1_roll = roll_die(rng);
            let player2_roll = roll_die(rng);
            if player1_roll != player2_roll {
                return Self {
                    player1_roll,
                    player2_roll,
                    rerolls,
                };
            }
            rerolls += 1;
        }
    }

    /// The higher roll starts.
    pub fn first_player(&self) -> PlayerNumber {
        if self.player1_roll > self.player2_roll {
            PlayerNumber::One
        } else {
            PlayerNumber::Two
        }
    }
}
