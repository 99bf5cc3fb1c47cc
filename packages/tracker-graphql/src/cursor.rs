//! Opaque edge cursors.
//!
//! A cursor is the padded, URL-safe base64 encoding of `<connection>:<key>`.
//! Connection names never contain `:`; keys may.

use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use thiserror::Error;

pub type Cursor = String;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MalformedCursor {
    #[error("Cursor is not valid base64.")]
    Encoding,
    #[error("Cursor is not valid UTF-8.")]
    Utf8,
    #[error("Cursor does not name a connection.")]
    MissingSeparator,
    #[error("Cursor does not name a record.")]
    EmptyKey,
    #[error("Cursor belongs to the `{0}` connection.")]
    ForeignConnection(String),
}

/// A decoded cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorParts {
    pub connection: String,
    pub key: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CursorCodec;

impl CursorCodec {
    pub fn encode(connection: &str, key: &str) -> Cursor {
        debug_assert!(
            !connection.contains(':'),
            "connection names must not contain `:`"
        );
        URL_SAFE.encode(format!("{connection}:{key}"))
    }

    /// Recover the record key from a cursor.
    pub fn decode(cursor: &str) -> Result<String, MalformedCursor> {
        Self::decode_parts(cursor).map(|parts| parts.key)
    }

    pub fn decode_parts(cursor: &str) -> Result<CursorParts, MalformedCursor> {
        let bytes = URL_SAFE
            .decode(cursor.trim())
            .map_err(|_| MalformedCursor::Encoding)?;
        let text = String::from_utf8(bytes).map_err(|_| MalformedCursor::Utf8)?;
        let (connection, key) = text
            .split_once(':')
            .ok_or(MalformedCursor::MissingSeparator)?;

        if connection.is_empty() {
            return Err(MalformedCursor::MissingSeparator);
        }
        if key.is_empty() {
            return Err(MalformedCursor::EmptyKey);
        }

        Ok(CursorParts {
            connection: connection.to_string(),
            key: key.to_string(),
        })
    }

    /// Decode a cursor that must have been issued by `connection`.
    pub fn decode_for(connection: &str, cursor: &str) -> Result<String, MalformedCursor> {
        let parts = Self::decode_parts(cursor)?;
        if parts.connection != connection {
            return Err(MalformedCursor::ForeignConnection(parts.connection));
        }
        Ok(parts.key)
    }
}
