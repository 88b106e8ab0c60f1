use crate::core::{Key, Result, WardenError};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

const CURSOR_VERSION: u8 = 1;

/// Resumable position within an ordered key stream. Resuming a query from a
/// position continues strictly after `last_key`, so re-running with the same
/// ordering and filters neither skips nor duplicates a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub last_key: Key,
}

#[derive(Serialize, Deserialize)]
struct Token {
    v: u8,
    last: Key,
}

/// Encodes a position as an opaque, URL-safe token.
pub fn encode_cursor(position: &Position) -> String {
    let token = Token {
        v: CURSOR_VERSION,
        last: position.last_key.clone(),
    };
    // tree-shaped struct, serialization cannot fail
    let json = serde_json::to_vec(&token).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

/// Decodes a previously issued token. Anything else — truncated input,
/// foreign data, an unknown version — is a [`WardenError::MalformedCursor`]
/// and must surface to the caller.
pub fn decode_cursor(cursor: &str) -> Result<Position> {
    let bytes = URL_SAFE_NO_PAD
        .decode(cursor)
        .map_err(|err| WardenError::MalformedCursor(err.to_string()))?;
    let token: Token = serde_json::from_slice(&bytes)
        .map_err(|err| WardenError::MalformedCursor(err.to_string()))?;
    if token.v != CURSOR_VERSION {
        return Err(WardenError::MalformedCursor(format!(
            "unsupported cursor version {}",
            token.v
        )));
    }
    Ok(Position { last_key: token.last })
}
