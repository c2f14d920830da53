use super::{ExchangeRateTable, StakeEntry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletKind {
    MetaMask,
    Keplr,
}

impl fmt::Display for WalletKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletKind::MetaMask => f.write_str("MetaMask"),
            WalletKind::Keplr => f.write_str("Keplr"),
        }
    }
}

impl FromStr for WalletKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "metamask" => Ok(WalletKind::MetaMask),
            "keplr" => Ok(WalletKind::Keplr),
            other => Err(format!("unknown wallet {}", other)),
        }
    }
}

/// What a provider hands back on connect. Each variant only carries the
/// fields that provider actually reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WalletSnapshot {
    MetaMask {
        address: String,
    },
    Keplr {
        address: String,
        name: Option<String>,
        exchange_rates: ExchangeRateTable,
    },
}

impl WalletSnapshot {
    pub fn kind(&self) -> WalletKind {
        match self {
            WalletSnapshot::MetaMask { .. } => WalletKind::MetaMask,
            WalletSnapshot::Keplr { .. } => WalletKind::Keplr,
        }
    }

    pub fn address(&self) -> &str {
        match self {
            WalletSnapshot::MetaMask { address } => address,
            WalletSnapshot::Keplr { address, .. } => address,
        }
    }

    pub fn exchange_rates(&self) -> Option<&ExchangeRateTable> {
        match self {
            WalletSnapshot::Keplr { exchange_rates, .. } => Some(exchange_rates),
            WalletSnapshot::MetaMask { .. } => None,
        }
    }

    pub fn has_balances(&self) -> bool {
        matches!(self, WalletSnapshot::Keplr { .. })
    }
}

/// Balances in display units (decimal strings), replaced wholesale on refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub available_amount: String,
    pub staked_amount: String,
    pub claimable_reward: String,
    pub portfolio_value: String,
    pub validator_info: Vec<StakeEntry>,
    pub fetched_at: DateTime<Utc>,
}
