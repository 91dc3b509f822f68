//! Code cache format produced and consumed by [`ScanEngine`](super::ScanEngine).

use serde::{Deserialize, Serialize};

/// Magic bytes at the start of every scan-engine code cache.
const UNIT_MAGIC: [u8; 4] = *b"HSCU";

/// Version of the cached unit layout. Increment on breaking changes.
const UNIT_FORMAT_VERSION: u32 = 1;

/// Serialized form of one compiled function.
///
/// Records the engine flags the cache was built under, the length of the
/// source text and the parameter list the function was compiled over. None of
/// these identify the text itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct CachedUnit {
    pub magic: [u8; 4],
    pub format_version: u32,
    pub flag_hash: u64,
    pub source_length: u32,
    pub parameters: Vec<String>,
    pub token_count: u32,
}

/// Why a blob was refused when consuming it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rejection {
    Malformed,
    FormatVersion,
    FlagMismatch,
    LengthMismatch,
    ParameterMismatch,
}

impl CachedUnit {
    pub fn new(flag_hash: u64, source_length: u32, parameters: Vec<String>, token_count: u32) -> Self {
        Self {
            magic: UNIT_MAGIC,
            format_version: UNIT_FORMAT_VERSION,
            flag_hash,
            source_length,
            parameters,
            token_count,
        }
    }

    pub fn encode(&self) -> Option<Vec<u8>> {
        bincode::serde::encode_to_vec(self, bincode::config::standard()).ok()
    }

    /// Decodes a blob and checks it against the engine flags, the source length
    /// and the requested parameter list.
    pub fn decode_checked(
        data: &[u8],
        flag_hash: u64,
        source_length: u32,
        parameters: &[String],
    ) -> Result<Self, Rejection> {
        let (unit, _): (CachedUnit, usize) =
            bincode::serde::decode_from_slice(data, bincode::config::standard())
                .map_err(|_| Rejection::Malformed)?;
        if unit.magic != UNIT_MAGIC {
            return Err(Rejection::Malformed);
        }
        if unit.format_version != UNIT_FORMAT_VERSION {
            return Err(Rejection::FormatVersion);
        }
        if unit.flag_hash != flag_hash {
            return Err(Rejection::FlagMismatch);
        }
        if unit.source_length != source_length {
            return Err(Rejection::LengthMismatch);
        }
        if unit.parameters != parameters {
            return Err(Rejection::ParameterMismatch);
        }
        Ok(unit)
    }
}
