//! Opaque source-text fingerprints shared by the build step and the loader.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::hash::ContentHash;

/// A fingerprint of module source text.
///
/// The loader treats digests as exact-match keys and never looks inside them.
/// It also never recomputes them: the build step that embeds the source and
/// code cache tables records one digest next to each source text and one next
/// to each cache blob, and the loader only compares the two.
///
/// The digest function is trusted to be collision-resistant. Two different
/// texts with equal digests would let a stale blob through; nothing here tries
/// to detect that.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Digest(String);

impl Digest {
    /// Wraps an already-computed digest string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Computes the digest the bundled tooling uses: hex XXH3-128 of the text.
    pub fn of_text(text: &str) -> Self {
        Self(ContentHash::from_bytes(text.as_bytes()).to_string())
    }

    /// Returns the digest as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.0)
    }
}
