//! Single-file persistence for [`BuildArtifacts`].
//!
//! A bundle is a 4-byte little-endian header length, a bincode header, and a
//! bincode payload. The header carries magic bytes, the bundle format version,
//! the version of the tool that produced it, and a checksum of the payload.
//! Reading is strict: the embedded artifacts are required for the loader to
//! start, so any problem is an error rather than a silent miss.

use std::path::Path;

use hearth_common::ContentHash;
use serde::{Deserialize, Serialize};

use crate::artifacts::BuildArtifacts;
use crate::error::BundleError;

/// Magic bytes identifying a Hearth artifact bundle.
const BUNDLE_MAGIC: [u8; 4] = *b"HRTH";

/// Current bundle format version. Increment on breaking changes to the header
/// or payload format.
const BUNDLE_FORMAT_VERSION: u32 = 1;

/// Header prepended to every bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleHeader {
    /// Magic bytes: must be `b"HRTH"`.
    pub magic: [u8; 4],

    /// Bundle format version.
    pub format_version: u32,

    /// Version of the tool that wrote this bundle.
    pub producer_version: String,

    /// Content hash of the payload bytes.
    pub checksum: ContentHash,
}

/// Serializes artifacts into bundle bytes.
pub fn encode_bundle(
    artifacts: &BuildArtifacts,
    producer_version: &str,
) -> Result<Vec<u8>, BundleError> {
    let payload = bincode::serde::encode_to_vec(artifacts, bincode::config::standard())
        .map_err(|e| BundleError::Serialization {
            reason: e.to_string(),
        })?;

    let header = BundleHeader {
        magic: BUNDLE_MAGIC,
        format_version: BUNDLE_FORMAT_VERSION,
        producer_version: producer_version.to_string(),
        checksum: ContentHash::from_bytes(&payload),
    };
    let header_bytes = bincode::serde::encode_to_vec(&header, bincode::config::standard())
        .map_err(|e| BundleError::Serialization {
            reason: e.to_string(),
        })?;

    let header_len = header_bytes.len() as u32;
    let mut output = Vec::with_capacity(4 + header_bytes.len() + payload.len());
    output.extend_from_slice(&header_len.to_le_bytes());
    output.extend_from_slice(&header_bytes);
    output.extend_from_slice(&payload);
    Ok(output)
}

/// Parses bundle bytes, validating the header and payload checksum.
pub fn decode_bundle(raw: &[u8]) -> Result<(BundleHeader, BuildArtifacts), BundleError> {
    if raw.len() < 4 {
        return Err(BundleError::InvalidHeader {
            reason: "missing header length".to_string(),
        });
    }
    let mut len_bytes = [0u8; 4];
    len_bytes.copy_from_slice(&raw[..4]);
    let header_len = u32::from_le_bytes(len_bytes) as usize;
    if raw.len() < 4 + header_len {
        return Err(BundleError::InvalidHeader {
            reason: format!("header length {header_len} exceeds bundle size"),
        });
    }

    let (header, _): (BundleHeader, usize) =
        bincode::serde::decode_from_slice(&raw[4..4 + header_len], bincode::config::standard())
            .map_err(|e| BundleError::InvalidHeader {
                reason: e.to_string(),
            })?;

    if header.magic != BUNDLE_MAGIC {
        return Err(BundleError::InvalidHeader {
            reason: "missing magic bytes".to_string(),
        });
    }
    if header.format_version != BUNDLE_FORMAT_VERSION {
        return Err(BundleError::VersionMismatch {
            expected: BUNDLE_FORMAT_VERSION,
            actual: header.format_version,
        });
    }

    let payload = &raw[4 + header_len..];
    let actual = ContentHash::from_bytes(payload);
    if actual != header.checksum {
        return Err(BundleError::ChecksumMismatch {
            expected: header.checksum.to_string(),
            actual: actual.to_string(),
        });
    }

    let (artifacts, _): (BuildArtifacts, usize) =
        bincode::serde::decode_from_slice(payload, bincode::config::standard()).map_err(|e| {
            BundleError::Serialization {
                reason: e.to_string(),
            }
        })?;
    Ok((header, artifacts))
}

/// Writes artifacts to a bundle file, creating parent directories as needed.
pub fn write_bundle(
    path: &Path,
    artifacts: &BuildArtifacts,
    producer_version: &str,
) -> Result<(), BundleError> {
    let bytes = encode_bundle(artifacts, producer_version)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| BundleError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::write(path, bytes).map_err(|e| BundleError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Reads and validates a bundle file.
pub fn read_bundle(path: &Path) -> Result<BuildArtifacts, BundleError> {
    let raw = std::fs::read(path).map_err(|e| BundleError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    decode_bundle(&raw).map(|(_, artifacts)| artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_common::Digest;

    fn sample() -> BuildArtifacts {
        let mut artifacts = BuildArtifacts::new();
        artifacts.add_source("internal/bootstrap/loaders", "const a = 1;", Digest::new("D1"));
        artifacts.add_code_cache("internal/bootstrap/loaders", vec![0, 1, 2, 255], Digest::new("D1"));
        artifacts.add_source_digested("fs", "module.exports = {};");
        artifacts
    }

    fn frame(header: &BundleHeader, payload: &[u8]) -> Vec<u8> {
        let header_bytes =
            bincode::serde::encode_to_vec(header, bincode::config::standard()).unwrap();
        let mut output = Vec::new();
        output.extend_from_slice(&(header_bytes.len() as u32).to_le_bytes());
        output.extend_from_slice(&header_bytes);
        output.extend_from_slice(payload);
        output
    }

    #[test]
    fn write_and_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("hearth.bundle");
        write_bundle(&path, &sample(), "0.1.0").unwrap();
        assert_eq!(read_bundle(&path).unwrap(), sample());
    }

    #[test]
    fn header_records_producer() {
        let bytes = encode_bundle(&sample(), "9.9.9").unwrap();
        let (header, _) = decode_bundle(&bytes).unwrap();
        assert_eq!(header.producer_version, "9.9.9");
        assert_eq!(header.magic, BUNDLE_MAGIC);
    }

    #[test]
    fn read_missing_file() {
        let err = read_bundle(Path::new("/nonexistent/hearth.bundle")).unwrap_err();
        assert!(matches!(err, BundleError::Io { .. }));
    }

    #[test]
    fn truncated_header() {
        let err = decode_bundle(b"AB").unwrap_err();
        assert!(matches!(err, BundleError::InvalidHeader { .. }));

        let err = decode_bundle(&[200, 0, 0, 0, 1, 2]).unwrap_err();
        assert!(matches!(err, BundleError::InvalidHeader { .. }));
    }

    #[test]
    fn wrong_magic() {
        let header = BundleHeader {
            magic: *b"BAAD",
            format_version: BUNDLE_FORMAT_VERSION,
            producer_version: "0.1.0".to_string(),
            checksum: ContentHash::from_bytes(b"data"),
        };
        let err = decode_bundle(&frame(&header, b"data")).unwrap_err();
        assert!(matches!(err, BundleError::InvalidHeader { .. }));
    }

    #[test]
    fn wrong_version() {
        let header = BundleHeader {
            magic: BUNDLE_MAGIC,
            format_version: 999,
            producer_version: "0.1.0".to_string(),
            checksum: ContentHash::from_bytes(b"data"),
        };
        let err = decode_bundle(&frame(&header, b"data")).unwrap_err();
        assert!(matches!(
            err,
            BundleError::VersionMismatch {
                expected: 1,
                actual: 999
            }
        ));
    }

    #[test]
    fn tampered_payload() {
        let mut bytes = encode_bundle(&sample(), "0.1.0").unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        let err = decode_bundle(&bytes).unwrap_err();
        assert!(matches!(err, BundleError::ChecksumMismatch { .. }));
    }
}
