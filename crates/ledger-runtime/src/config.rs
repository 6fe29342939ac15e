//! # Ledger Configuration
//!
//! Signing domain, sovereign delay and withdrawal policies.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LEDGER_CHAIN_ID` | `1` | Chain id bound into every signed digest |
//! | `LEDGER_VERIFYING_CONTRACT` | zero address | Ledger identity bound into every signed digest |
//! | `LEDGER_SOVEREIGN_DELAY_SECS` | `604800` | Sovereign withdrawal delay, at least one day |
//! | `LEDGER_CLAMP_WITHDRAWALS` | `true` | Clamp batched over-withdrawals to the balance |
//! | `LEDGER_WITHDRAWAL_ROLLBACK` | `disabled` | `disabled` or `compensate` |

use cl_03_sovereign_withdrawal::MIN_SOVEREIGN_DELAY;
use serde::{Deserialize, Serialize};
use shared_types::Address;
use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Default sovereign delay: one week.
pub const DEFAULT_SOVEREIGN_DELAY: u64 = 7 * 24 * 60 * 60;

/// Whether the operator may reverse the most recent withdrawal batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalRollbackPolicy {
    #[default]
    Disabled,
    /// Re-credit senders and reclaim fees from the fee account.
    Compensate,
}

impl FromStr for WithdrawalRollbackPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "disabled" | "off" | "false" => Ok(Self::Disabled),
            "compensate" => Ok(Self::Compensate),
            other => Err(ConfigError::InvalidValue {
                key: "LEDGER_WITHDRAWAL_ROLLBACK",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Sovereign delay {requested}s is below the {minimum}s minimum")]
    DelayBelowMinimum { requested: u64, minimum: u64 },

    #[error("Invalid configuration document: {0}")]
    Parse(String),
}

/// Ledger configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Signing domain name.
    pub domain_name: String,
    /// Signing domain version.
    pub domain_version: String,
    pub chain_id: u64,
    pub verifying_contract: Address,
    /// Seconds between a sovereign request and its completion.
    pub sovereign_delay_secs: u64,
    /// Clamp batched withdrawals that exceed the balance.
    pub clamp_withdrawals: bool,
    pub withdrawal_rollback: WithdrawalRollbackPolicy,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            domain_name: "CustodyLedger".to_string(),
            domain_version: "1".to_string(),
            chain_id: 1,
            verifying_contract: [0u8; 20],
            sovereign_delay_secs: DEFAULT_SOVEREIGN_DELAY,
            clamp_withdrawals: true,
            withdrawal_rollback: WithdrawalRollbackPolicy::Disabled,
        }
    }
}

impl LedgerConfig {
    /// Read overrides from the environment on top of the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(value) = env::var("LEDGER_CHAIN_ID") {
            config.chain_id = parse_number("LEDGER_CHAIN_ID", &value)?;
        }
        if let Ok(value) = env::var("LEDGER_VERIFYING_CONTRACT") {
            config.verifying_contract = parse_address("LEDGER_VERIFYING_CONTRACT", &value)?;
        }
        if let Ok(value) = env::var("LEDGER_SOVEREIGN_DELAY_SECS") {
            config.sovereign_delay_secs = parse_number("LEDGER_SOVEREIGN_DELAY_SECS", &value)?;
        }
        if let Ok(value) = env::var("LEDGER_CLAMP_WITHDRAWALS") {
            config.clamp_withdrawals = value.to_lowercase() != "false" && value != "0";
        }
        if let Ok(value) = env::var("LEDGER_WITHDRAWAL_ROLLBACK") {
            config.withdrawal_rollback = value.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json(document: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(document).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sovereign_delay_secs < MIN_SOVEREIGN_DELAY {
            return Err(ConfigError::DelayBelowMinimum {
                requested: self.sovereign_delay_secs,
                minimum: MIN_SOVEREIGN_DELAY,
            });
        }
        Ok(())
    }
}

fn parse_number(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

/// Parse a 20-byte hex address, with or without `0x`.
pub fn parse_address(key: &'static str, value: &str) -> Result<Address, ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    };
    let trimmed = value.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytes = hex::decode(digits).map_err(|_| invalid())?;
    bytes.try_into().map_err(|_| invalid())
}
