//! Shareable session codes.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Code characters. `0/O` and `1/I` are left out so codes read back cleanly.
pub const CODE_ALPHABET: &str = "ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Default code length.
pub const DEFAULT_CODE_LEN: usize = 6;

/// Attempts before generation gives up.
pub const MAX_CODE_ATTEMPTS: usize = 50;

/// Code errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodeError {
    #[error("game code is required")]
    Empty,

    #[error("invalid character '{ch}' at position {index}")]
    InvalidCharacter { ch: char, index: usize },

    #[error("failed to generate unique game code after {attempts} attempts")]
    Exhausted { attempts: usize },
}

/// A session code, normalised to upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionCode(String);

impl SessionCode {
    /// Parse user input: trims, upper-cases and checks the alphabet.
    pub fn parse(value: &str) -> Result<Self, CodeError> {
        let normalized = value.trim().to_ascii_uppercase();
        if normalized.is_empty() {
            return Err(CodeError::Empty);
        }
        for (index, ch) in normalized.chars().enumerate() {
            if !CODE_ALPHABET.contains(ch) {
                return Err(CodeError::InvalidCharacter { ch, index });
            }
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for SessionCode {
    type Err = CodeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

/// Generates codes that are not already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeGenerator {
    len: usize,
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_LEN)
    }
}

impl CodeGenerator {
    pub fn new(len: usize) -> Self {
        Self { len: len.max(1) }
    }

    pub fn code_len(&self) -> usize {
        self.len
    }

    /// Draw a code for which `exists` returns false.
    ///
    /// `exists` should only report live (unexpired) sessions.
    pub fn generate<R, F>(&self, rng: &mut R, exists: F) -> Result<SessionCode, CodeError>
    where
        R: Rng + ?Sized,
        F: Fn(&str) -> bool,
    {
        for _ in 0..MAX_CODE_ATTEMPTS {
            if let Some(code) = self.draw(rng, &exists) {
                return Ok(code);
            }
        }
        Err(CodeError::Exhausted {
            attempts: MAX_CODE_ATTEMPTS,
        })
    }

    /// Draw a single code; `None` when `exists` reports it taken.
    ///
    /// Callers that retry for other reasons use this to keep one attempt
    /// budget.
    pub fn draw<R, F>(&self, rng: &mut R, exists: F) -> Option<SessionCode>
    where
        R: Rng + ?Sized,
        F: Fn(&str) -> bool,
    {
        let code = self.random_code(rng);
        if exists(&code) {
            tracing::debug!(%code, "game code collision");
            None
        } else {
            Some(SessionCode(code))
        }
    }

    fn random_code<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let alphabet = CODE_ALPHABET.as_bytes();
        (0..self.len)
            .map(|_| alphabet[rng.random_range(0..alphabet.len())] as char)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::RefCell;
    use std::collections::HashSet;

    #[test]
    fn test_generated_code_shape() {
        let mut rng = StdRng::seed_from_u64(5);
        let code = CodeGenerator::default().generate(&mut rng, |_| false).unwrap();
        assert_eq!(code.as_str().len(), DEFAULT_CODE_LEN);
        assert!(code.as_str().chars().all(|c| CODE_ALPHABET.contains(c)));
        for banned in ['0', 'O', '1', 'I'] {
            assert!(!CODE_ALPHABET.contains(banned));
        }
    }

    #[test]
    fn test_never_returns_existing_code() {
        let mut rng = StdRng::seed_from_u64(11);
        // two-char codes over 32 symbols: collisions happen quickly
        let generator = CodeGenerator::new(2);
        let taken = RefCell::new(HashSet::<String>::new());
        for _ in 0..200 {
            let code = generator
                .generate(&mut rng, |c| taken.borrow().contains(c))
                .unwrap();
            assert!(taken.borrow_mut().insert(code.as_str().to_string()));
        }
    }

    #[test]
    fn test_exhaustion_is_an_error() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = CodeGenerator::default().generate(&mut rng, |_| true);
        assert_eq!(
            result,
            Err(CodeError::Exhausted {
                attempts: MAX_CODE_ATTEMPTS
            })
        );
    }

    #[test]
    fn test_parse_normalises() {
        assert_eq!(SessionCode::parse("  ab3k7z ").unwrap().as_str(), "AB3K7Z");
        assert_eq!(SessionCode::parse("   "), Err(CodeError::Empty));
        assert_eq!(
            SessionCode::parse("AB0"),
            Err(CodeError::InvalidCharacter { ch: '0', index: 2 })
        );
    }
}
