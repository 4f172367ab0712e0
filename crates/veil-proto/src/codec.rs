//! Strict CBOR helpers shared by every wire structure.

use serde::{Serialize, de::DeserializeOwned};

use crate::errors::{ProtocolError, Result};

/// Largest input any decoder will look at
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Serialize `value` as a single CBOR item.
///
/// # Errors
///
/// - `ProtocolError::CborEncode` if serialization fails
pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    ciborium::ser::into_writer(value, &mut out)
        .map_err(|e| ProtocolError::CborEncode(e.to_string()))?;
    Ok(out)
}

/// Deserialize exactly one CBOR item from `bytes`.
///
/// The size check runs before any parsing.
///
/// # Errors
///
/// - `ProtocolError::MessageTooLarge` if `bytes` exceeds [`MAX_MESSAGE_SIZE`]
/// - `ProtocolError::CborDecode` if the item is not valid CBOR for `T`
/// - `ProtocolError::TrailingBytes` if anything follows the item
pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    if bytes.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge { size: bytes.len(), max: MAX_MESSAGE_SIZE });
    }

    let mut reader = bytes;
    let value = ciborium::de::from_reader(&mut reader)
        .map_err(|e| ProtocolError::CborDecode(e.to_string()))?;

    if !reader.is_empty() {
        return Err(ProtocolError::TrailingBytes { count: reader.len() });
    }

    Ok(value)
}
