//! Byte-level persistence of fitted parameters.
//!
//! Implementors hold only plain data (`Vec<f64>`, strings, scalars), never
//! live model objects.

use std::error::Error;

/// Parameter representations that can be written to and read from bytes.
pub trait SerializableParams: Sized {
    type Error: Error + Send + Sync + 'static;

    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error>;

    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error>;
}

impl<T> SerializableParams for T
where
    T: serde::Serialize + for<'de> serde::Deserialize<'de>,
{
    type Error = bincode::Error;

    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error> {
        bincode::serialize(self)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error> {
        bincode::deserialize(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Params {
        weights: Vec<f64>,
        label: String,
    }

    #[test]
    fn test_bytes_round_trip() {
        let params = Params {
            weights: vec![0.5, -1.25],
            label: "ok".into(),
        };
        let bytes = params.to_bytes().unwrap();
        assert_eq!(Params::from_bytes(&bytes).unwrap(), params);
    }

    #[test]
    fn test_truncated_bytes_fail() {
        let bytes = Params {
            weights: vec![1.0; 4],
            label: "x".into(),
        }
        .to_bytes()
        .unwrap();
        assert!(Params::from_bytes(&bytes[..bytes.len() / 2]).is_err());
    }
}
