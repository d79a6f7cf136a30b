//! Encode/decode pairs for values JSON cannot carry natively.
//!
//! Each non-native type gets one [`Codec`] impl. The stored document is built
//! by composing these field by field, so adding a new field type only needs a
//! new impl here.

use std::str::FromStr as _;

use alloy::primitives::{hex, Address, Bytes, U256};
use serde::{de::DeserializeOwned, Serialize};

use super::error::ConfigStoreError;

pub trait Codec: Sized {
    type Encoded: Serialize + DeserializeOwned;

    fn encode(&self) -> Self::Encoded;

    /// `field` names the document path of the value, used in error messages.
    fn decode(field: &str, encoded: Self::Encoded) -> Result<Self, ConfigStoreError>;
}

impl Codec for Address {
    type Encoded = String;

    fn encode(&self) -> String {
        self.to_checksum(None)
    }

    fn decode(field: &str, encoded: String) -> Result<Self, ConfigStoreError> {
        Address::from_str(&encoded).map_err(|_| ConfigStoreError::MalformedAddress {
            field: field.to_string(),
            value: encoded,
        })
    }
}

impl Codec for U256 {
    type Encoded = String;

    fn encode(&self) -> String {
        self.to_string()
    }

    fn decode(field: &str, encoded: String) -> Result<Self, ConfigStoreError> {
        U256::from_str_radix(&encoded, 10).map_err(|e| ConfigStoreError::MalformedValue {
            field: field.to_string(),
            value: encoded,
            reason: e.to_string(),
        })
    }
}

// Key bytes are stored as bare hex; a 0x prefix is tolerated on load.
impl Codec for Bytes {
    type Encoded = String;

    fn encode(&self) -> String {
        hex::encode(self)
    }

    fn decode(field: &str, encoded: String) -> Result<Self, ConfigStoreError> {
        match hex::decode(&encoded) {
            Ok(bytes) => Ok(Bytes::from(bytes)),
            Err(e) => Err(ConfigStoreError::MalformedValue {
                field: field.to_string(),
                value: encoded,
                reason: e.to_string(),
            }),
        }
    }
}

impl<T: Codec> Codec for Vec<T> {
    type Encoded = Vec<T::Encoded>;

    fn encode(&self) -> Self::Encoded {
        self.iter().map(Codec::encode).collect()
    }

    fn decode(field: &str, encoded: Self::Encoded) -> Result<Self, ConfigStoreError> {
        encoded
            .into_iter()
            .enumerate()
            .map(|(i, item)| T::decode(&format!("{field}[{i}]"), item))
            .collect()
    }
}

impl<T: Codec> Codec for Option<T> {
    type Encoded = Option<T::Encoded>;

    fn encode(&self) -> Self::Encoded {
        self.as_ref().map(Codec::encode)
    }

    fn decode(field: &str, encoded: Self::Encoded) -> Result<Self, ConfigStoreError> {
        encoded.map(|value| T::decode(field, value)).transpose()
    }
}
