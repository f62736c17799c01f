//! Configuration file management.
//!
//! Configuration is loaded from TOML files, but all configuration values have sensible defaults.
//! Running the binary with `generate-config` dumps the defaults for editing:
//! ```text
//! disperse-client generate-config > config.toml
//! ```
//!
//! # Adding a configuration section
//!
//! When adding a section to the configuration, ensure that
//!
//! * it has an entry in the root configuration [`Config`],
//! * `Default` is implemented (derived or manually) with sensible defaults,
//! * it is completely documented.
//! * it is annotated with `#[serde(deny_unknown_fields)]` to ensure config files contain valid
//!   keys.

use std::{fs, path::Path};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use disperse_types::{Address, TimeDiff, TxHash};

use crate::{asset::NATIVE_UNIT_COUNT, logging::LoggingConfig};

/// Distributor contract deployed at the same address on the supported chains.
const DEFAULT_CONTRACT_ADDRESS: Address = Address::new([
    0x11, 0x07, 0x69, 0xe1, 0x21, 0x55, 0xd2, 0xd1, 0x87, 0x5d, 0x42, 0xdc, 0xf6, 0x6d, 0x7d, 0x92,
    0xac, 0xa1, 0xe2, 0x07,
]);
const DEFAULT_CONFIRMATION_TIMEOUT_SECONDS: u32 = 120;
const DEFAULT_EXPLORER_TX_URL: &str = "https://basescan.org/tx/";

/// Root configuration.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Logging configuration.
    pub log: LoggingConfig,
    /// Distributor contract and chain settings.
    pub distributor: DistributorConfig,
}

/// Distributor contract and chain settings.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DistributorConfig {
    /// Address of the distributor contract, also the spender of token authorizations.
    pub contract_address: Address,
    /// Unit count of the chain's native coin.
    pub native_decimals: u8,
    /// How long to wait for a broadcast transaction to be included.
    pub confirmation_timeout: TimeDiff,
    /// Block explorer URL prefix, followed by the transaction hash.
    pub explorer_tx_url: String,
}

impl Default for DistributorConfig {
    fn default() -> Self {
        DistributorConfig {
            contract_address: DEFAULT_CONTRACT_ADDRESS,
            native_decimals: NATIVE_UNIT_COUNT,
            confirmation_timeout: TimeDiff::from_seconds(DEFAULT_CONFIRMATION_TIMEOUT_SECONDS),
            explorer_tx_url: DEFAULT_EXPLORER_TX_URL.to_string(),
        }
    }
}

impl DistributorConfig {
    /// Link to `tx_hash` on the block explorer.
    pub fn explorer_link(&self, tx_hash: &TxHash) -> String {
        format!("{}{}", self.explorer_tx_url, tx_hash)
    }
}

/// Loads a TOML-formatted configuration from a given file.
pub fn load_from_file<P: AsRef<Path>>(config_path: P) -> anyhow::Result<Config> {
    let path_ref = config_path.as_ref();
    let contents = fs::read_to_string(path_ref)
        .with_context(|| format!("failed to read configuration file {}", path_ref.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("failed to parse configuration file {}", path_ref.display()))
}

/// Creates a TOML-formatted string from a given configuration.
pub fn to_string(cfg: &Config) -> anyhow::Result<String> {
    toml::to_string_pretty(cfg).with_context(|| "failed to serialize configuration")
}
