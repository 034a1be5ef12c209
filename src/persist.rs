//! Artifact persistence.
//!
//! The model artifact is a small binary container: a 16-byte header (magic,
//! version, payload size, CRC32) followed by a Postcard-encoded payload.
//! Encoder artifacts are plain text, one label per line in code order.
//! All writes go through a temporary file and a rename.
//!
//! # Header layout
//!
//! ```text
//! Offset  Size  Field
//! ------  ----  -----
//! 0       4     Magic ("CCRF")
//! 4       1     Version major
//! 5       1     Version minor
//! 6       2     Reserved
//! 8       4     Payload size (bytes)
//! 12      4     CRC32 checksum of payload
//! ```

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::encoding::LabelEncoder;
use crate::forest::RandomForest;

/// Magic bytes identifying a carboncast model file.
pub const MAGIC: &[u8; 4] = b"CCRF";

/// Current format version (major).
pub const CURRENT_VERSION_MAJOR: u8 = 1;

/// Current format version (minor).
pub const CURRENT_VERSION_MINOR: u8 = 0;

/// Size of the model file header in bytes.
pub const HEADER_SIZE: usize = 16;

/// Errors from reading or writing persisted artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("not a carboncast model file")]
    NotAModel,

    #[error("model requires format version {major}.{minor} or later")]
    UnsupportedVersion { major: u8, minor: u8 },

    #[error("checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("file truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("corrupt artifact: {0}")]
    Corrupt(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("encoding error: {0}")]
    Encoding(#[from] postcard::Error),
}

/// Write `bytes` to `path` through a sibling temp file and a rename.
pub(crate) fn atomic_write(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = match path.file_name() {
        Some(name) => {
            let mut tmp_name = name.to_os_string();
            tmp_name.push(".tmp");
            path.with_file_name(tmp_name)
        }
        None => return Err(io::Error::new(io::ErrorKind::InvalidInput, "path has no file name")),
    };

    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn encode_header(payload: &[u8]) -> [u8; HEADER_SIZE] {
    let mut buf = [0u8; HEADER_SIZE];
    buf[0..4].copy_from_slice(MAGIC);
    buf[4] = CURRENT_VERSION_MAJOR;
    buf[5] = CURRENT_VERSION_MINOR;
    buf[8..12].copy_from_slice(&(payload.len() as u32).to_le_bytes());
    buf[12..16].copy_from_slice(&crc32fast::hash(payload).to_le_bytes());
    buf
}

/// Save a fitted forest to `path`.
pub fn save_model(path: impl AsRef<Path>, forest: &RandomForest) -> Result<(), ArtifactError> {
    let payload = postcard::to_allocvec(forest)?;

    let mut bytes = Vec::with_capacity(HEADER_SIZE + payload.len());
    bytes.extend_from_slice(&encode_header(&payload));
    bytes.extend_from_slice(&payload);

    atomic_write(path.as_ref(), &bytes)?;
    Ok(())
}

/// Load a fitted forest from `path`.
pub fn load_model(path: impl AsRef<Path>) -> Result<RandomForest, ArtifactError> {
    let bytes = fs::read(path.as_ref())?;

    if bytes.len() < HEADER_SIZE {
        return Err(ArtifactError::Truncated {
            expected: HEADER_SIZE,
            actual: bytes.len(),
        });
    }
    if &bytes[0..4] != MAGIC {
        return Err(ArtifactError::NotAModel);
    }
    if bytes[4] > CURRENT_VERSION_MAJOR {
        return Err(ArtifactError::UnsupportedVersion {
            major: bytes[4],
            minor: bytes[5],
        });
    }

    let payload_size = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
    let expected_checksum = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);

    let payload = &bytes[HEADER_SIZE..];
    if payload.len() < payload_size {
        return Err(ArtifactError::Truncated {
            expected: HEADER_SIZE + payload_size,
            actual: bytes.len(),
        });
    }
    if payload.len() > payload_size {
        return Err(ArtifactError::Corrupt(format!(
            "payload is {} bytes but the header declares {payload_size}",
            payload.len()
        )));
    }

    let actual_checksum = crc32fast::hash(payload);
    if actual_checksum != expected_checksum {
        return Err(ArtifactError::ChecksumMismatch {
            expected: expected_checksum,
            actual: actual_checksum,
        });
    }

    Ok(postcard::from_bytes(payload)?)
}

/// Save an encoder's ordered label list to `path`, one label per line.
pub fn save_encoder(path: impl AsRef<Path>, encoder: &LabelEncoder) -> Result<(), ArtifactError> {
    let mut text = String::new();
    for class in encoder.classes() {
        text.push_str(class);
        text.push('\n');
    }
    atomic_write(path.as_ref(), text.as_bytes())?;
    Ok(())
}

/// Load an encoder for `field` from its ordered label list at `path`.
pub fn load_encoder(path: impl AsRef<Path>, field: &str) -> Result<LabelEncoder, ArtifactError> {
    let text = fs::read_to_string(path.as_ref())?;
    let classes: Vec<String> = text.lines().map(str::to_string).collect();

    if classes.is_empty() {
        return Err(ArtifactError::Corrupt(format!(
            "encoder artifact for {field} has no labels"
        )));
    }
    if !classes.windows(2).all(|w| w[0] < w[1]) {
        return Err(ArtifactError::Corrupt(format!(
            "encoder artifact for {field} is not a sorted label list"
        )));
    }

    Ok(LabelEncoder::from_classes(field, classes))
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use crate::data::matrix::FeatureMatrix;
    use crate::forest::{ForestParams, TreeParams};

    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("carboncast_persist_{name}"))
    }

    fn small_forest() -> RandomForest {
        let matrix = FeatureMatrix::from_vec(
            vec![1.0, 10.0, 2.0, 20.0, 3.0, 30.0, 4.0, 40.0],
            4,
            2,
        );
        let targets = [0.0, 0.0, 10.0, 10.0];
        let params = ForestParams {
            n_trees: 5,
            tree: TreeParams {
                max_depth: 3,
                min_samples_split: 2,
            },
            seed: 42,
        };
        RandomForest::fit(&matrix, &targets, &params).unwrap()
    }

    #[test]
    fn model_roundtrip() {
        let forest = small_forest();
        let path = temp_path("model_roundtrip.ccrf");

        save_model(&path, &forest).unwrap();
        let loaded = load_model(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded, forest);
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let path = temp_path("wrong_magic.ccrf");
        fs::write(&path, b"XXXX0000000000000000").unwrap();
        let result = load_model(&path);
        fs::remove_file(&path).ok();
        assert!(matches!(result, Err(ArtifactError::NotAModel)));
    }

    #[test]
    fn corrupt_payload_fails_checksum() {
        let forest = small_forest();
        let path = temp_path("corrupt.ccrf");
        save_model(&path, &forest).unwrap();

        let mut bytes = fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        fs::write(&path, &bytes).unwrap();

        let result = load_model(&path);
        fs::remove_file(&path).ok();
        assert!(matches!(result, Err(ArtifactError::ChecksumMismatch { .. })));
    }

    #[test]
    fn truncated_file_is_rejected() {
        let forest = small_forest();
        let path = temp_path("truncated.ccrf");
        save_model(&path, &forest).unwrap();

        let bytes = fs::read(&path).unwrap();
        fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

        let result = load_model(&path);
        fs::remove_file(&path).ok();
        assert!(matches!(result, Err(ArtifactError::Truncated { .. })));
    }

    #[test]
    fn trailing_bytes_are_corrupt_not_truncated() {
        let forest = small_forest();
        let path = temp_path("trailing.ccrf");
        save_model(&path, &forest).unwrap();

        let mut bytes = fs::read(&path).unwrap();
        bytes.extend_from_slice(&[0u8; 8]);
        fs::write(&path, &bytes).unwrap();

        let result = load_model(&path);
        fs::remove_file(&path).ok();
        assert!(matches!(result, Err(ArtifactError::Corrupt(_))));
    }

    #[test]
    fn future_version_is_rejected() {
        let forest = small_forest();
        let path = temp_path("future.ccrf");
        save_model(&path, &forest).unwrap();

        let mut bytes = fs::read(&path).unwrap();
        bytes[4] = 99;
        fs::write(&path, &bytes).unwrap();

        let result = load_model(&path);
        fs::remove_file(&path).ok();
        assert!(matches!(
            result,
            Err(ArtifactError::UnsupportedVersion { major: 99, .. })
        ));
    }

    #[test]
    fn encoder_roundtrip_preserves_order() {
        let encoder = LabelEncoder::fit("fuel_type", ["Petrol", "CNG", "Diesel"]);
        let path = temp_path("encoder_fuel.txt");

        save_encoder(&path, &encoder).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "CNG\nDiesel\nPetrol\n");

        let loaded = load_encoder(&path, "fuel_type").unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(loaded, encoder);
    }

    #[test]
    fn unsorted_encoder_file_is_corrupt() {
        let path = temp_path("encoder_unsorted.txt");
        fs::write(&path, "Petrol\nCNG\n").unwrap();
        let result = load_encoder(&path, "fuel_type");
        fs::remove_file(&path).ok();
        assert!(matches!(result, Err(ArtifactError::Corrupt(_))));
    }

    #[test]
    fn empty_encoder_file_is_corrupt() {
        let path = temp_path("encoder_empty.txt");
        fs::write(&path, "").unwrap();
        let result = load_encoder(&path, "fuel_type");
        fs::remove_file(&path).ok();
        assert!(matches!(result, Err(ArtifactError::Corrupt(_))));
    }
}
