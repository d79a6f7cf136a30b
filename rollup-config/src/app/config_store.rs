use std::{
    fs,
    path::{Path, PathBuf},
};

use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

use super::{
    codec::Codec,
    error::ConfigStoreError,
    records::{BridgeConfig, PrivacySet},
    types::{ConfVars, RuntimeConfig, StartupConfig},
};

pub const DEFAULT_CONFIG_PATH: &str = "./data/config.json";

type Stored<T> = <T as Codec>::Encoded;

fn field_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredStartupConfig {
    pub port: u16,
    pub db_url: String,
    pub rollup_contract_address: Stored<Address>,
    pub permit_helper_contract_address: Stored<Address>,
    pub price_feed_contract_addresses: Stored<Vec<Address>>,
    pub ethereum_host: String,
    pub ethereum_poll_interval: u64,
    pub proof_generator_mode: String,
    pub private_key: Stored<Bytes>,
    pub num_inner_rollup_txs: u32,
    pub num_outer_rollup_proofs: u32,
    pub api_prefix: String,
    pub server_auth_token: String,
    pub min_confirmation: u32,
    #[serde(rename = "minConfirmationEHW")]
    pub min_confirmation_ehw: u32,
    pub db_logging: bool,
    pub proverless: bool,
    pub rollup_call_data_limit: u64,
}

impl Codec for StartupConfig {
    type Encoded = StoredStartupConfig;

    fn encode(&self) -> StoredStartupConfig {
        StoredStartupConfig {
            port: self.port,
            db_url: self.db_url.clone(),
            rollup_contract_address: self.rollup_contract_address.encode(),
            permit_helper_contract_address: self.permit_helper_contract_address.encode(),
            price_feed_contract_addresses: self.price_feed_contract_addresses.encode(),
            ethereum_host: self.ethereum_host.clone(),
            ethereum_poll_interval: self.ethereum_poll_interval,
            proof_generator_mode: self.proof_generator_mode.clone(),
            private_key: self.private_key.encode(),
            num_inner_rollup_txs: self.num_inner_rollup_txs,
            num_outer_rollup_proofs: self.num_outer_rollup_proofs,
            api_prefix: self.api_prefix.clone(),
            server_auth_token: self.server_auth_token.clone(),
            min_confirmation: self.min_confirmation,
            min_confirmation_ehw: self.min_confirmation_ehw,
            db_logging: self.db_logging,
            proverless: self.proverless,
            rollup_call_data_limit: self.rollup_call_data_limit,
        }
    }

    fn decode(prefix: &str, stored: StoredStartupConfig) -> Result<Self, ConfigStoreError> {
        let path = |name: &str| field_path(prefix, name);
        Ok(StartupConfig {
            port: stored.port,
            db_url: stored.db_url,
            rollup_contract_address: Address::decode(
                &path("rollupContractAddress"),
                stored.rollup_contract_address,
            )?,
            permit_helper_contract_address: Address::decode(
                &path("permitHelperContractAddress"),
                stored.permit_helper_contract_address,
            )?,
            price_feed_contract_addresses: Vec::<Address>::decode(
                &path("priceFeedContractAddresses"),
                stored.price_feed_contract_addresses,
            )?,
            ethereum_host: stored.ethereum_host,
            ethereum_poll_interval: stored.ethereum_poll_interval,
            proof_generator_mode: stored.proof_generator_mode,
            private_key: Bytes::decode(&path("privateKey"), stored.private_key)?,
            num_inner_rollup_txs: stored.num_inner_rollup_txs,
            num_outer_rollup_proofs: stored.num_outer_rollup_proofs,
            api_prefix: stored.api_prefix,
            server_auth_token: stored.server_auth_token,
            min_confirmation: stored.min_confirmation,
            min_confirmation_ehw: stored.min_confirmation_ehw,
            db_logging: stored.db_logging,
            proverless: stored.proverless,
            rollup_call_data_limit: stored.rollup_call_data_limit,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRuntimeConfig {
    pub accepting_txs: bool,
    pub use_key_cache: bool,
    pub publish_interval: u64,
    pub flush_after_idle: u64,
    pub gas_limit: u64,
    pub verification_gas: u64,
    pub max_fee_gas_price: Stored<U256>,
    pub fee_gas_price_multiplier: f64,
    pub fee_round_up_significant_figures: u32,
    pub max_fee_per_gas: Stored<U256>,
    pub max_priority_fee_per_gas: Stored<U256>,
    pub max_unsettled_txs: u64,
    #[serde(rename = "defaultDeFiBatchSize")]
    pub default_defi_batch_size: u32,
    pub fee_paying_asset_ids: Vec<u32>,
    pub bridge_configs: Stored<Vec<BridgeConfig>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy_sets: Stored<Option<Vec<PrivacySet>>>,
    pub deposit_limit: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollup_beneficiary: Stored<Option<Address>>,
    #[serde(default)]
    pub blocklist: Stored<Vec<Address>>,
}

impl Codec for RuntimeConfig {
    type Encoded = StoredRuntimeConfig;

    fn encode(&self) -> StoredRuntimeConfig {
        StoredRuntimeConfig {
            // a restarted process always resumes accepting txs
            accepting_txs: true,
            use_key_cache: self.use_key_cache,
            publish_interval: self.publish_interval,
            flush_after_idle: self.flush_after_idle,
            gas_limit: self.gas_limit,
            verification_gas: self.verification_gas,
            max_fee_gas_price: self.max_fee_gas_price.encode(),
            fee_gas_price_multiplier: self.fee_gas_price_multiplier,
            fee_round_up_significant_figures: self.fee_round_up_significant_figures,
            max_fee_per_gas: self.max_fee_per_gas.encode(),
            max_priority_fee_per_gas: self.max_priority_fee_per_gas.encode(),
            max_unsettled_txs: self.max_unsettled_txs,
            default_defi_batch_size: self.default_defi_batch_size,
            fee_paying_asset_ids: self.fee_paying_asset_ids.clone(),
            bridge_configs: self.bridge_configs.encode(),
            privacy_sets: Some(self.privacy_sets.encode()),
            deposit_limit: self.deposit_limit,
            rollup_beneficiary: self.rollup_beneficiary.encode(),
            blocklist: self.blocklist.encode(),
        }
    }

    fn decode(prefix: &str, stored: StoredRuntimeConfig) -> Result<Self, ConfigStoreError> {
        let path = |name: &str| field_path(prefix, name);
        let privacy_sets =
            Option::<Vec<PrivacySet>>::decode(&path("privacySets"), stored.privacy_sets)?
                .unwrap_or_else(PrivacySet::default_sets);
        Ok(RuntimeConfig {
            accepting_txs: stored.accepting_txs,
            use_key_cache: stored.use_key_cache,
            publish_interval: stored.publish_interval,
            flush_after_idle: stored.flush_after_idle,
            gas_limit: stored.gas_limit,
            verification_gas: stored.verification_gas,
            max_fee_gas_price: U256::decode(&path("maxFeeGasPrice"), stored.max_fee_gas_price)?,
            fee_gas_price_multiplier: stored.fee_gas_price_multiplier,
            fee_round_up_significant_figures: stored.fee_round_up_significant_figures,
            max_fee_per_gas: U256::decode(&path("maxFeePerGas"), stored.max_fee_per_gas)?,
            max_priority_fee_per_gas: U256::decode(
                &path("maxPriorityFeePerGas"),
                stored.max_priority_fee_per_gas,
            )?,
            max_unsettled_txs: stored.max_unsettled_txs,
            default_defi_batch_size: stored.default_defi_batch_size,
            fee_paying_asset_ids: stored.fee_paying_asset_ids,
            bridge_configs: Vec::<BridgeConfig>::decode(
                &path("bridgeConfigs"),
                stored.bridge_configs,
            )?,
            privacy_sets,
            deposit_limit: stored.deposit_limit,
            rollup_beneficiary: Option::<Address>::decode(
                &path("rollupBeneficiary"),
                stored.rollup_beneficiary,
            )?,
            blocklist: Vec::<Address>::decode(&path("blocklist"), stored.blocklist)?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredConfVars {
    #[serde(flatten)]
    pub startup: StoredStartupConfig,
    pub runtime_config: StoredRuntimeConfig,
}

impl Codec for ConfVars {
    type Encoded = StoredConfVars;

    fn encode(&self) -> StoredConfVars {
        StoredConfVars {
            startup: self.startup.encode(),
            runtime_config: self.runtime_config.encode(),
        }
    }

    fn decode(prefix: &str, stored: StoredConfVars) -> Result<Self, ConfigStoreError> {
        Ok(ConfVars {
            startup: StartupConfig::decode(prefix, stored.startup)?,
            runtime_config: RuntimeConfig::decode(
                &field_path(prefix, "runtimeConfig"),
                stored.runtime_config,
            )?,
        })
    }
}

/// Persists a single [`ConfVars`] snapshot as pretty-printed JSON.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_PATH)
    }
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ConfigStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn load(&self) -> Result<ConfVars, ConfigStoreError> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            ConfigStoreError::ReadError(format!("{}: {}", self.path.display(), e))
        })?;
        let stored: StoredConfVars = serde_json::from_str(&content).map_err(|e| {
            ConfigStoreError::StoreCorrupt(format!("{}: {}", self.path.display(), e))
        })?;
        ConfVars::decode("", stored)
    }

    pub fn save(&self, conf_vars: &ConfVars) -> Result<(), ConfigStoreError> {
        // serde_json writes non-finite floats as null, which would not load back
        let multiplier = conf_vars.runtime_config.fee_gas_price_multiplier;
        if !multiplier.is_finite() {
            return Err(ConfigStoreError::MalformedValue {
                field: "runtimeConfig.feeGasPriceMultiplier".to_string(),
                value: multiplier.to_string(),
                reason: "not a finite number".to_string(),
            });
        }
        if let Some(dir_path) = self.path.parent() {
            if !dir_path.as_os_str().is_empty() && !dir_path.is_dir() {
                fs::create_dir_all(dir_path).map_err(|e| {
                    ConfigStoreError::DirectoryUnavailable(format!(
                        "{}: {}",
                        dir_path.display(),
                        e
                    ))
                })?;
            }
        }
        let content = serde_json::to_string_pretty(&conf_vars.encode())
            .map_err(|e| ConfigStoreError::SerializeError(e.to_string()))?;

        // write a sibling file first so a crash never leaves a half-written snapshot
        let temp_path = self.temp_path();
        fs::write(&temp_path, content).map_err(|e| {
            ConfigStoreError::WriteError(format!("{}: {}", temp_path.display(), e))
        })?;
        fs::rename(&temp_path, &self.path).map_err(|e| {
            ConfigStoreError::WriteError(format!("{}: {}", self.path.display(), e))
        })?;
        log::debug!("Saved config snapshot to {}", self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut file_name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        file_name.push(".tmp");
        self.path.with_file_name(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn sample_conf_vars() -> ConfVars {
        let mut conf_vars = ConfVars::default();
        conf_vars.startup.port = 9000;
        conf_vars.startup.rollup_contract_address = Address::repeat_byte(0xaa);
        conf_vars.startup.price_feed_contract_addresses =
            vec![Address::repeat_byte(0x01), Address::repeat_byte(0x02)];
        conf_vars.startup.private_key = Bytes::from(vec![0x00, 0x7f, 0xff, 0x10]);
        conf_vars.runtime_config.max_fee_gas_price = U256::MAX;
        conf_vars.runtime_config.max_fee_per_gas = U256::from(u128::MAX) + U256::from(1);
        conf_vars.runtime_config.bridge_configs = vec![BridgeConfig {
            bridge_address_id: 3,
            num_txs: 10,
            gas: 150_000,
            rollup_frequency: 2,
        }];
        conf_vars.runtime_config.rollup_beneficiary = Some(Address::repeat_byte(0xbe));
        conf_vars.runtime_config.blocklist = vec![Address::repeat_byte(0xde)];
        conf_vars
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("nested/deeper/config.json"));
        assert!(!store.exists());

        let conf_vars = sample_conf_vars();
        store.save(&conf_vars).unwrap();
        assert!(store.exists());
        assert!(!store.temp_path().exists());

        let loaded = store.load().unwrap();
        assert_eq!(loaded, conf_vars);
        assert_eq!(loaded.startup.private_key.len(), 4);
    }

    #[test]
    fn test_accepting_txs_is_forced_on_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("config.json"));

        let mut conf_vars = sample_conf_vars();
        conf_vars.runtime_config.accepting_txs = false;
        store.save(&conf_vars).unwrap();

        let loaded = store.load().unwrap();
        assert!(loaded.runtime_config.accepting_txs);
    }

    #[test]
    fn test_document_shape() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("config.json"));
        store.save(&sample_conf_vars()).unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        let doc: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(doc["port"], 9000);
        assert_eq!(doc["privateKey"], "007fff10");
        assert_eq!(
            doc["rollupContractAddress"],
            Address::repeat_byte(0xaa).to_checksum(None)
        );
        assert_eq!(
            doc["runtimeConfig"]["maxFeePerGas"],
            "340282366920938463463374607431768211456"
        );
        assert!(doc["runtimeConfig"]["blocklist"].is_array());
        assert_eq!(doc["runtimeConfig"]["bridgeConfigs"][0]["bridgeAddressId"], 3);
    }

    fn saved_document() -> (tempfile::TempDir, ConfigStore, Value) {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("config.json"));
        store.save(&sample_conf_vars()).unwrap();
        let doc = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        (dir, store, doc)
    }

    fn rewrite(store: &ConfigStore, doc: &Value) {
        fs::write(store.path(), serde_json::to_string(doc).unwrap()).unwrap();
    }

    #[test]
    fn test_missing_contract_address_is_corrupt() {
        let (_dir, store, mut doc) = saved_document();
        doc.as_object_mut().unwrap().remove("rollupContractAddress");
        rewrite(&store, &doc);

        let result = store.load();
        assert!(matches!(result, Err(ConfigStoreError::StoreCorrupt(_))));
    }

    #[test]
    fn test_wrong_shape_is_corrupt() {
        let (_dir, store, mut doc) = saved_document();
        doc["runtimeConfig"]["gasLimit"] = Value::String("lots".to_string());
        rewrite(&store, &doc);
        assert!(matches!(
            store.load(),
            Err(ConfigStoreError::StoreCorrupt(_))
        ));

        fs::write(store.path(), "{ not json").unwrap();
        assert!(matches!(
            store.load(),
            Err(ConfigStoreError::StoreCorrupt(_))
        ));
    }

    #[test]
    fn test_malformed_blocklist_address() {
        let (_dir, store, mut doc) = saved_document();
        doc["runtimeConfig"]["blocklist"] = serde_json::json!(["0xnothex"]);
        rewrite(&store, &doc);

        match store.load() {
            Err(ConfigStoreError::MalformedAddress { field, value }) => {
                assert_eq!(field, "runtimeConfig.blocklist[0]");
                assert_eq!(value, "0xnothex");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_absent_optional_fields_decode_to_defaults() {
        let (_dir, store, mut doc) = saved_document();
        let runtime = doc["runtimeConfig"].as_object_mut().unwrap();
        runtime.remove("blocklist");
        runtime.remove("privacySets");
        runtime.remove("rollupBeneficiary");
        rewrite(&store, &doc);

        let loaded = store.load().unwrap();
        assert!(loaded.runtime_config.blocklist.is_empty());
        assert_eq!(loaded.runtime_config.rollup_beneficiary, None);
        assert_eq!(
            loaded.runtime_config.privacy_sets,
            PrivacySet::default_sets()
        );
    }

    #[test]
    fn test_multiplier_survives_save_and_load_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("config.json"));

        let mut multipliers = vec![
            0.1,
            1.1,
            0.30000000000000004,
            1.0715660391465826e-75,
            2.2250738585072014e-308,
            5e-324,
            f64::MAX,
        ];
        // xorshift over raw bit patterns reaches values the list above misses
        let mut bits: u64 = 0x9e37_79b9_7f4a_7c15;
        while multipliers.len() < 300 {
            bits ^= bits << 13;
            bits ^= bits >> 7;
            bits ^= bits << 17;
            let value = f64::from_bits(bits);
            if value.is_finite() {
                multipliers.push(value);
            }
        }

        let mut conf_vars = sample_conf_vars();
        for multiplier in multipliers {
            conf_vars.runtime_config.fee_gas_price_multiplier = multiplier;
            store.save(&conf_vars).unwrap();
            let loaded = store.load().unwrap();
            assert_eq!(
                loaded.runtime_config.fee_gas_price_multiplier.to_bits(),
                multiplier.to_bits(),
                "multiplier {multiplier:e}"
            );
        }
    }

    #[test]
    fn test_non_finite_multiplier_is_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("config.json"));

        for multiplier in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let mut conf_vars = sample_conf_vars();
            conf_vars.runtime_config.fee_gas_price_multiplier = multiplier;
            match store.save(&conf_vars) {
                Err(ConfigStoreError::MalformedValue { field, .. }) => {
                    assert_eq!(field, "runtimeConfig.feeGasPriceMultiplier");
                }
                other => panic!("unexpected result: {other:?}"),
            }
            assert!(!store.exists());
        }
    }

    #[test]
    fn test_hand_edited_lowercase_address_loads() {
        let (_dir, store, mut doc) = saved_document();
        doc["rollupContractAddress"] =
            Value::String("0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb".to_string());
        rewrite(&store, &doc);

        let loaded = store.load().unwrap();
        assert_eq!(
            loaded.startup.rollup_contract_address,
            Address::repeat_byte(0xbb)
        );
    }
}
