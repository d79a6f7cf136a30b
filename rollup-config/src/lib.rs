use alloy::primitives::{Address, Bytes, U256};
use serde::{de::Error as _, Deserialize, Deserializer};
use serde_with::{serde_as, DisplayFromStr};

pub mod app;

/// Environment overrides. Every field is optional: an unset variable defers to
/// the next source instead of falling back to a zero value.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct EnvVar {
    // startup
    pub port: Option<u16>,
    pub db_url: Option<String>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub rollup_contract_address: Option<Address>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub permit_helper_contract_address: Option<Address>,
    #[serde_as(as = "Option<Vec<DisplayFromStr>>")]
    pub price_feed_contract_addresses: Option<Vec<Address>>,
    pub ethereum_host: Option<String>,
    pub ethereum_poll_interval: Option<u64>,
    pub proof_generator_mode: Option<String>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub private_key: Option<Bytes>,
    pub num_inner_rollup_txs: Option<u32>,
    pub num_outer_rollup_proofs: Option<u32>,
    pub api_prefix: Option<String>,
    pub server_auth_token: Option<String>,
    pub min_confirmation: Option<u32>,
    pub min_confirmation_escape_hatch_window: Option<u32>,
    #[serde(default, deserialize_with = "literal_true")]
    pub db_logging: Option<bool>,
    #[serde(default, deserialize_with = "literal_true")]
    pub proverless: Option<bool>,
    pub rollup_call_data_limit: Option<u64>,

    // runtime
    #[serde(default, deserialize_with = "literal_true")]
    pub use_key_cache: Option<bool>,
    pub publish_interval: Option<u64>,
    pub flush_after_idle: Option<u64>,
    pub gas_limit: Option<u64>,
    pub verification_gas: Option<u64>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub max_fee_gas_price: Option<U256>,
    #[serde(default, deserialize_with = "finite_f64")]
    pub fee_gas_price_multiplier: Option<f64>,
    pub fee_round_up_significant_figures: Option<u32>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub max_fee_per_gas: Option<U256>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub max_priority_fee_per_gas: Option<U256>,
    pub max_unsettled_txs: Option<u64>,
    pub default_defi_batch_size: Option<u32>,
    pub fee_paying_asset_ids: Option<Vec<u32>>,
    pub deposit_limit: Option<u64>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub rollup_beneficiary: Option<Address>,
    #[serde_as(as = "Option<Vec<DisplayFromStr>>")]
    pub blocklist: Option<Vec<Address>>,
}

// Only the exact string "true" enables a flag; any other value disables it.
fn literal_true<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(Some(value == "true"))
}

// JSON has no representation for inf or NaN, so they never reach the snapshot.
fn finite_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() {
        return Err(D::Error::custom(format!(
            "expected a finite number, got {value}"
        )));
    }
    Ok(Some(value))
}
