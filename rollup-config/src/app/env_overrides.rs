use crate::EnvVar;

use super::{
    error::ConfiguratorError,
    patch::{RuntimeConfigPatch, StartupConfigPatch},
};

/// Environment-sourced partial configs. Only variables that are actually set
/// show up as `Some`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvOverrides {
    pub startup: StartupConfigPatch,
    pub runtime: RuntimeConfigPatch,
}

impl EnvOverrides {
    /// Reads the process environment, loading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfiguratorError> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Variables set to an empty string count as unset.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfiguratorError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars = vars.into_iter().filter(|(_, value)| !value.is_empty());
        let env: EnvVar =
            envy::from_iter(vars).map_err(|e| ConfiguratorError::MalformedValue(e.to_string()))?;
        Ok(env.into())
    }
}

impl From<EnvVar> for EnvOverrides {
    fn from(env: EnvVar) -> Self {
        let startup = StartupConfigPatch {
            port: env.port,
            db_url: env.db_url,
            rollup_contract_address: env.rollup_contract_address,
            permit_helper_contract_address: env.permit_helper_contract_address,
            price_feed_contract_addresses: env.price_feed_contract_addresses,
            ethereum_host: env.ethereum_host,
            ethereum_poll_interval: env.ethereum_poll_interval,
            proof_generator_mode: env.proof_generator_mode,
            private_key: env.private_key,
            num_inner_rollup_txs: env.num_inner_rollup_txs,
            num_outer_rollup_proofs: env.num_outer_rollup_proofs,
            api_prefix: env.api_prefix,
            server_auth_token: env.server_auth_token,
            min_confirmation: env.min_confirmation,
            min_confirmation_ehw: env.min_confirmation_escape_hatch_window,
            db_logging: env.db_logging,
            proverless: env.proverless,
            rollup_call_data_limit: env.rollup_call_data_limit,
        };
        let runtime = RuntimeConfigPatch {
            // not settable from the environment
            accepting_txs: None,
            use_key_cache: env.use_key_cache,
            publish_interval: env.publish_interval,
            flush_after_idle: env.flush_after_idle,
            gas_limit: env.gas_limit,
            verification_gas: env.verification_gas,
            max_fee_gas_price: env.max_fee_gas_price,
            fee_gas_price_multiplier: env.fee_gas_price_multiplier,
            fee_round_up_significant_figures: env.fee_round_up_significant_figures,
            max_fee_per_gas: env.max_fee_per_gas,
            max_priority_fee_per_gas: env.max_priority_fee_per_gas,
            max_unsettled_txs: env.max_unsettled_txs,
            default_defi_batch_size: env.default_defi_batch_size,
            fee_paying_asset_ids: env.fee_paying_asset_ids,
            bridge_configs: None,
            privacy_sets: None,
            deposit_limit: env.deposit_limit,
            rollup_beneficiary: env.rollup_beneficiary,
            blocklist: env.blocklist,
        };
        EnvOverrides { startup, runtime }
    }
}
