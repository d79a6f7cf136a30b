use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use super::{codec::Codec, error::ConfigStoreError};

pub const ETH_ASSET_ID: u32 = 0;
pub const DAI_ASSET_ID: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeConfig {
    pub bridge_address_id: u32,
    pub num_txs: u32,
    pub gas: u64,
    pub rollup_frequency: u32,
}

// Every field is JSON-native, so the record is stored as is.
impl Codec for BridgeConfig {
    type Encoded = BridgeConfig;

    fn encode(&self) -> BridgeConfig {
        self.clone()
    }

    fn decode(_field: &str, encoded: BridgeConfig) -> Result<Self, ConfigStoreError> {
        Ok(encoded)
    }
}

/// Anonymity set target: `users` deposits of `value` units of `asset_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivacySet {
    pub asset_id: u32,
    pub value: U256,
    pub users: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacySetRecord {
    pub asset_id: u32,
    pub value: String,
    pub users: u32,
}

impl Codec for PrivacySet {
    type Encoded = PrivacySetRecord;

    fn encode(&self) -> PrivacySetRecord {
        PrivacySetRecord {
            asset_id: self.asset_id,
            value: self.value.encode(),
            users: self.users,
        }
    }

    fn decode(field: &str, encoded: PrivacySetRecord) -> Result<Self, ConfigStoreError> {
        Ok(PrivacySet {
            asset_id: encoded.asset_id,
            value: U256::decode(&format!("{field}.value"), encoded.value)?,
            users: encoded.users,
        })
    }
}

impl PrivacySet {
    pub fn new(asset_id: u32, value: U256, users: u32) -> Self {
        Self {
            asset_id,
            value,
            users,
        }
    }

    /// Default anonymity sets for ETH and DAI, both 18 decimals.
    pub fn default_sets() -> Vec<PrivacySet> {
        // (asset, power of ten in base units, users)
        const SETS: [(u32, u64, u32); 8] = [
            (ETH_ASSET_ID, 16, 5),
            (ETH_ASSET_ID, 17, 10),
            (ETH_ASSET_ID, 18, 10),
            (ETH_ASSET_ID, 19, 10),
            (DAI_ASSET_ID, 19, 5),
            (DAI_ASSET_ID, 20, 10),
            (DAI_ASSET_ID, 21, 10),
            (DAI_ASSET_ID, 22, 10),
        ];
        SETS.iter()
            .map(|&(asset_id, exp, users)| {
                PrivacySet::new(asset_id, U256::from(10).pow(U256::from(exp)), users)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sets_cover_both_assets() {
        let sets = PrivacySet::default_sets();
        assert!(sets.iter().any(|s| s.asset_id == ETH_ASSET_ID));
        assert!(sets.iter().any(|s| s.asset_id == DAI_ASSET_ID));
        assert_eq!(sets[2].value, U256::from(1_000_000_000_000_000_000u64));
    }

    #[test]
    fn test_privacy_set_value_is_decimal_string() {
        let set = PrivacySet::new(DAI_ASSET_ID, U256::from(10).pow(U256::from(22)), 10);
        let record = set.encode();
        assert_eq!(record.value, "10000000000000000000000");
        assert_eq!(PrivacySet::decode("privacySets[0]", record).unwrap(), set);
    }

    #[test]
    fn test_privacy_set_bad_value_names_field() {
        let record = PrivacySetRecord {
            asset_id: 0,
            value: "1e18".to_string(),
            users: 1,
        };
        match PrivacySet::decode("privacySets[3]", record) {
            Err(ConfigStoreError::MalformedValue { field, .. }) => {
                assert_eq!(field, "privacySets[3].value")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
