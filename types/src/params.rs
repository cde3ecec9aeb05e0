//! Immutable configuration for the token ledger and the registry.
//!
//! Both structs are set once at initialization. Defaults reproduce the
//! reference deployment ("DemoToken" / "DemoTcr").

use crate::error::TypesError;
use serde::{Deserialize, Serialize};

/// Registry timing and deposit parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryParams {
    /// Smallest deposit accepted by `propose`.
    #[serde(default = "default_min_deposit", with = "crate::amount")]
    pub min_deposit: u128,

    /// Seconds an unchallenged application waits before it can be whitelisted.
    #[serde(default = "default_period_secs")]
    pub application_period_secs: u64,

    /// Seconds of a commit stage. Carried for configuration compatibility only:
    /// votes are tallied directly, there is no commit/reveal split.
    #[serde(default = "default_period_secs")]
    pub commit_period_secs: u64,

    /// Seconds a challenge stays open for voting.
    #[serde(default = "default_period_secs")]
    pub voting_period_secs: u64,
}

fn default_min_deposit() -> u128 {
    100
}

fn default_period_secs() -> u64 {
    60
}

impl RegistryParams {
    pub fn new(min_deposit: u128, application_period_secs: u64, voting_period_secs: u64) -> Self {
        Self {
            min_deposit,
            application_period_secs,
            commit_period_secs: voting_period_secs,
            voting_period_secs,
        }
    }

    /// Reject configurations that would make the game degenerate.
    pub fn validate(&self) -> Result<(), TypesError> {
        if self.min_deposit == 0 {
            return Err(TypesError::InvalidParams("min_deposit must be non-zero".into()));
        }
        if self.application_period_secs == 0 {
            return Err(TypesError::InvalidParams(
                "application_period_secs must be non-zero".into(),
            ));
        }
        if self.voting_period_secs == 0 {
            return Err(TypesError::InvalidParams(
                "voting_period_secs must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for RegistryParams {
    fn default() -> Self {
        Self::new(default_min_deposit(), default_period_secs(), default_period_secs())
    }
}

/// Metadata and fixed supply of the fungible token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenParams {
    #[serde(default = "default_token_name")]
    pub name: String,

    #[serde(default = "default_token_symbol")]
    pub symbol: String,

    #[serde(default)]
    pub decimals: u8,

    /// Minted once to the genesis holder; never changes afterwards.
    #[serde(default = "default_total_supply", with = "crate::amount")]
    pub total_supply: u128,
}

fn default_token_name() -> String {
    "DemoToken".to_string()
}

fn default_token_symbol() -> String {
    "DTK".to_string()
}

fn default_total_supply() -> u128 {
    21_000_000
}

impl Default for TokenParams {
    fn default() -> Self {
        Self {
            name: default_token_name(),
            symbol: default_token_symbol(),
            decimals: 0,
            total_supply: default_total_supply(),
        }
    }
}
