use alloy::primitives::{Address, Bytes, U256};

use super::records::{BridgeConfig, PrivacySet};

pub const GWEI: u64 = 1_000_000_000;

/// Fields fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq)]
pub struct StartupConfig {
    pub port: u16,
    pub db_url: String,
    pub rollup_contract_address: Address,
    pub permit_helper_contract_address: Address,
    pub price_feed_contract_addresses: Vec<Address>,
    pub ethereum_host: String,
    /// milliseconds
    pub ethereum_poll_interval: u64,
    pub proof_generator_mode: String,
    pub private_key: Bytes,
    pub num_inner_rollup_txs: u32,
    pub num_outer_rollup_proofs: u32,
    pub api_prefix: String,
    pub server_auth_token: String,
    pub min_confirmation: u32,
    pub min_confirmation_ehw: u32,
    pub db_logging: bool,
    pub proverless: bool,
    /// bytes
    pub rollup_call_data_limit: u64,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            port: 8081,
            db_url: "sqlite://data/db.sqlite".to_string(),
            rollup_contract_address: Address::ZERO,
            permit_helper_contract_address: Address::ZERO,
            price_feed_contract_addresses: vec![],
            ethereum_host: "http://localhost:8545".to_string(),
            ethereum_poll_interval: 10_000,
            proof_generator_mode: "normal".to_string(),
            private_key: Bytes::new(),
            num_inner_rollup_txs: 1,
            num_outer_rollup_proofs: 1,
            api_prefix: String::new(),
            server_auth_token: "!changeme#".to_string(),
            min_confirmation: 1,
            min_confirmation_ehw: 12,
            db_logging: false,
            proverless: false,
            rollup_call_data_limit: 120 * 1024,
        }
    }
}

/// Fields that can be adjusted while the process runs.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub accepting_txs: bool,
    pub use_key_cache: bool,
    /// seconds
    pub publish_interval: u64,
    /// seconds
    pub flush_after_idle: u64,
    pub gas_limit: u64,
    pub verification_gas: u64,
    pub max_fee_gas_price: U256,
    pub fee_gas_price_multiplier: f64,
    pub fee_round_up_significant_figures: u32,
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
    pub max_unsettled_txs: u64,
    pub default_defi_batch_size: u32,
    pub fee_paying_asset_ids: Vec<u32>,
    pub bridge_configs: Vec<BridgeConfig>,
    pub privacy_sets: Vec<PrivacySet>,
    pub deposit_limit: u64,
    pub rollup_beneficiary: Option<Address>,
    pub blocklist: Vec<Address>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            accepting_txs: true,
            use_key_cache: false,
            publish_interval: 0,
            flush_after_idle: 0,
            gas_limit: 12_000_000,
            verification_gas: 500_000,
            max_fee_gas_price: U256::from(250 * GWEI),
            fee_gas_price_multiplier: 1.0,
            fee_round_up_significant_figures: 2,
            max_fee_per_gas: U256::from(250 * GWEI),
            max_priority_fee_per_gas: U256::from(5 * GWEI / 2),
            max_unsettled_txs: 10_000,
            default_defi_batch_size: 5,
            fee_paying_asset_ids: vec![0],
            bridge_configs: vec![],
            privacy_sets: PrivacySet::default_sets(),
            deposit_limit: 10,
            rollup_beneficiary: None,
            blocklist: vec![],
        }
    }
}

/// The complete resolved configuration, persisted as one snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfVars {
    pub startup: StartupConfig,
    pub runtime_config: RuntimeConfig,
}
