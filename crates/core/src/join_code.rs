//! Store join codes.
//!
//! Codes are short, uppercase and free of look-alike characters (no `I`,
//! `O`, `0`, `1`) so they can be read aloud or copied from a poster.

use std::sync::LazyLock;

use regex::Regex;

pub const ALPHABET: &[u8; 32] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const DEFAULT_LENGTH: usize = 6;
pub const MIN_LENGTH: usize = 4;
pub const MAX_LENGTH: usize = 12;

static WELL_FORMED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-HJ-NP-Z2-9]{4,12}$").expect("join code pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JoinCodeError {
    #[error("join code length must be between 4 and 12, got {0}")]
    InvalidLength(usize),
    #[error("'{0}' is not a valid join code")]
    Malformed(String),
}

/// Generate a random code of `len` characters.
pub fn generate(len: usize) -> Result<String, JoinCodeError> {
    if !(MIN_LENGTH..=MAX_LENGTH).contains(&len) {
        return Err(JoinCodeError::InvalidLength(len));
    }
    // Byte 6 of a v4 uuid carries the version nibble; skip it.
    let entropy = uuid::Uuid::new_v4().into_bytes();
    let code = entropy
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != 6)
        .take(len)
        .map(|(_, b)| ALPHABET[usize::from(b & 0x1f)] as char)
        .collect();
    Ok(code)
}

/// Canonical form of user input: uppercase, no whitespace or dashes.
pub fn normalize(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .flat_map(char::to_uppercase)
        .collect()
}

pub fn is_well_formed(code: &str) -> bool {
    WELL_FORMED.is_match(code)
}

/// Normalize and check a code typed by a user.
pub fn parse(input: &str) -> Result<String, JoinCodeError> {
    let code = normalize(input);
    if is_well_formed(&code) {
        Ok(code)
    } else {
        Err(JoinCodeError::Malformed(input.trim().to_string()))
    }
}
