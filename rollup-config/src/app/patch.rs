use alloy::primitives::{Address, Bytes, U256};

use super::{
    records::{BridgeConfig, PrivacySet},
    types::{RuntimeConfig, StartupConfig},
};

/// A partial config: `None` fields leave the underlying value untouched.
pub trait Overlay: Sized {
    type Patch;

    fn overlay(self, patch: &Self::Patch) -> Self;
}

/// Applies `layers` over `base` in order, so later layers win.
pub fn resolve<T: Overlay>(base: T, layers: &[&T::Patch]) -> T {
    layers.iter().fold(base, |acc, patch| acc.overlay(patch))
}

fn set<T: Clone>(target: &mut T, value: &Option<T>) {
    if let Some(value) = value {
        *target = value.clone();
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StartupConfigPatch {
    pub port: Option<u16>,
    pub db_url: Option<String>,
    pub rollup_contract_address: Option<Address>,
    pub permit_helper_contract_address: Option<Address>,
    pub price_feed_contract_addresses: Option<Vec<Address>>,
    pub ethereum_host: Option<String>,
    pub ethereum_poll_interval: Option<u64>,
    pub proof_generator_mode: Option<String>,
    pub private_key: Option<Bytes>,
    pub num_inner_rollup_txs: Option<u32>,
    pub num_outer_rollup_proofs: Option<u32>,
    pub api_prefix: Option<String>,
    pub server_auth_token: Option<String>,
    pub min_confirmation: Option<u32>,
    pub min_confirmation_ehw: Option<u32>,
    pub db_logging: Option<bool>,
    pub proverless: Option<bool>,
    pub rollup_call_data_limit: Option<u64>,
}

impl Overlay for StartupConfig {
    type Patch = StartupConfigPatch;

    fn overlay(mut self, patch: &StartupConfigPatch) -> Self {
        set(&mut self.port, &patch.port);
        set(&mut self.db_url, &patch.db_url);
        set(
            &mut self.rollup_contract_address,
            &patch.rollup_contract_address,
        );
        set(
            &mut self.permit_helper_contract_address,
            &patch.permit_helper_contract_address,
        );
        set(
            &mut self.price_feed_contract_addresses,
            &patch.price_feed_contract_addresses,
        );
        set(&mut self.ethereum_host, &patch.ethereum_host);
        set(&mut self.ethereum_poll_interval, &patch.ethereum_poll_interval);
        set(&mut self.proof_generator_mode, &patch.proof_generator_mode);
        set(&mut self.private_key, &patch.private_key);
        set(&mut self.num_inner_rollup_txs, &patch.num_inner_rollup_txs);
        set(
            &mut self.num_outer_rollup_proofs,
            &patch.num_outer_rollup_proofs,
        );
        set(&mut self.api_prefix, &patch.api_prefix);
        set(&mut self.server_auth_token, &patch.server_auth_token);
        set(&mut self.min_confirmation, &patch.min_confirmation);
        set(&mut self.min_confirmation_ehw, &patch.min_confirmation_ehw);
        set(&mut self.db_logging, &patch.db_logging);
        set(&mut self.proverless, &patch.proverless);
        set(&mut self.rollup_call_data_limit, &patch.rollup_call_data_limit);
        self
    }
}

/// A saved config overrides every field.
impl From<StartupConfig> for StartupConfigPatch {
    fn from(config: StartupConfig) -> Self {
        Self {
            port: Some(config.port),
            db_url: Some(config.db_url),
            rollup_contract_address: Some(config.rollup_contract_address),
            permit_helper_contract_address: Some(config.permit_helper_contract_address),
            price_feed_contract_addresses: Some(config.price_feed_contract_addresses),
            ethereum_host: Some(config.ethereum_host),
            ethereum_poll_interval: Some(config.ethereum_poll_interval),
            proof_generator_mode: Some(config.proof_generator_mode),
            private_key: Some(config.private_key),
            num_inner_rollup_txs: Some(config.num_inner_rollup_txs),
            num_outer_rollup_proofs: Some(config.num_outer_rollup_proofs),
            api_prefix: Some(config.api_prefix),
            server_auth_token: Some(config.server_auth_token),
            min_confirmation: Some(config.min_confirmation),
            min_confirmation_ehw: Some(config.min_confirmation_ehw),
            db_logging: Some(config.db_logging),
            proverless: Some(config.proverless),
            rollup_call_data_limit: Some(config.rollup_call_data_limit),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuntimeConfigPatch {
    pub accepting_txs: Option<bool>,
    pub use_key_cache: Option<bool>,
    pub publish_interval: Option<u64>,
    pub flush_after_idle: Option<u64>,
    pub gas_limit: Option<u64>,
    pub verification_gas: Option<u64>,
    pub max_fee_gas_price: Option<U256>,
    pub fee_gas_price_multiplier: Option<f64>,
    pub fee_round_up_significant_figures: Option<u32>,
    pub max_fee_per_gas: Option<U256>,
    pub max_priority_fee_per_gas: Option<U256>,
    pub max_unsettled_txs: Option<u64>,
    pub default_defi_batch_size: Option<u32>,
    pub fee_paying_asset_ids: Option<Vec<u32>>,
    pub bridge_configs: Option<Vec<BridgeConfig>>,
    pub privacy_sets: Option<Vec<PrivacySet>>,
    pub deposit_limit: Option<u64>,
    pub rollup_beneficiary: Option<Address>,
    pub blocklist: Option<Vec<Address>>,
}

impl Overlay for RuntimeConfig {
    type Patch = RuntimeConfigPatch;

    fn overlay(mut self, patch: &RuntimeConfigPatch) -> Self {
        set(&mut self.accepting_txs, &patch.accepting_txs);
        set(&mut self.use_key_cache, &patch.use_key_cache);
        set(&mut self.publish_interval, &patch.publish_interval);
        set(&mut self.flush_after_idle, &patch.flush_after_idle);
        set(&mut self.gas_limit, &patch.gas_limit);
        set(&mut self.verification_gas, &patch.verification_gas);
        set(&mut self.max_fee_gas_price, &patch.max_fee_gas_price);
        set(
            &mut self.fee_gas_price_multiplier,
            &patch.fee_gas_price_multiplier,
        );
        set(
            &mut self.fee_round_up_significant_figures,
            &patch.fee_round_up_significant_figures,
        );
        set(&mut self.max_fee_per_gas, &patch.max_fee_per_gas);
        set(
            &mut self.max_priority_fee_per_gas,
            &patch.max_priority_fee_per_gas,
        );
        set(&mut self.max_unsettled_txs, &patch.max_unsettled_txs);
        set(
            &mut self.default_defi_batch_size,
            &patch.default_defi_batch_size,
        );
        set(&mut self.fee_paying_asset_ids, &patch.fee_paying_asset_ids);
        set(&mut self.bridge_configs, &patch.bridge_configs);
        set(&mut self.privacy_sets, &patch.privacy_sets);
        set(&mut self.deposit_limit, &patch.deposit_limit);
        if patch.rollup_beneficiary.is_some() {
            self.rollup_beneficiary = patch.rollup_beneficiary;
        }
        set(&mut self.blocklist, &patch.blocklist);
        self
    }
}

/// A saved config overrides every field, except that an unset beneficiary
/// does not clear one supplied by a lower layer.
impl From<RuntimeConfig> for RuntimeConfigPatch {
    fn from(config: RuntimeConfig) -> Self {
        Self {
            accepting_txs: Some(config.accepting_txs),
            use_key_cache: Some(config.use_key_cache),
            publish_interval: Some(config.publish_interval),
            flush_after_idle: Some(config.flush_after_idle),
            gas_limit: Some(config.gas_limit),
            verification_gas: Some(config.verification_gas),
            max_fee_gas_price: Some(config.max_fee_gas_price),
            fee_gas_price_multiplier: Some(config.fee_gas_price_multiplier),
            fee_round_up_significant_figures: Some(config.fee_round_up_significant_figures),
            max_fee_per_gas: Some(config.max_fee_per_gas),
            max_priority_fee_per_gas: Some(config.max_priority_fee_per_gas),
            max_unsettled_txs: Some(config.max_unsettled_txs),
            default_defi_batch_size: Some(config.default_defi_batch_size),
            fee_paying_asset_ids: Some(config.fee_paying_asset_ids),
            bridge_configs: Some(config.bridge_configs),
            privacy_sets: Some(config.privacy_sets),
            deposit_limit: Some(config.deposit_limit),
            rollup_beneficiary: config.rollup_beneficiary,
            blocklist: Some(config.blocklist),
        }
    }
}
