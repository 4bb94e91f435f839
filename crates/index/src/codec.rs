use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::de::DeserializeOwned;
use serde::Serialize;
use zstd::{decode_all, encode_all};

use crate::IndexError;

/// Zstd level used for every persisted artifact.
pub const ZSTD_LEVEL: i32 = 3;

/// bincode (serde, standard config), then zstd.
pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, IndexError> {
    let encoded = encode_to_vec(value, standard())?;
    encode_all(encoded.as_slice(), ZSTD_LEVEL).map_err(|e| IndexError::Compression(e.to_string()))
}

/// Inflate, then bincode decode.
pub(crate) fn decode<T: DeserializeOwned>(data: &[u8]) -> Result<T, IndexError> {
    let decompressed = decode_all(data).map_err(|e| IndexError::Compression(e.to_string()))?;
    let (value, _) = decode_from_slice(&decompressed, standard())?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        id: String,
        values: Vec<f32>,
    }

    #[test]
    fn decodes_its_own_output() {
        let sample = Sample {
            id: "chunk-1".into(),
            values: vec![0.25; 64],
        };
        let bytes = encode(&sample).unwrap();
        assert!(bytes.len() < 64 * 4);
        let back: Sample = decode(&bytes).unwrap();
        assert_eq!(back, sample);
    }

    #[test]
    fn garbage_is_rejected() {
        let err = decode::<Sample>(b"not zstd at all").unwrap_err();
        assert!(matches!(err, IndexError::Compression(_)));
    }
}
