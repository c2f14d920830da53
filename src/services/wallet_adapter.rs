use crate::errors::DashboardError;
use crate::models::{BalanceSnapshot, StakeEntry, WalletKind, WalletSnapshot};
use crate::services::http::HttpFetcher;
use crate::services::keybase::KeybaseClient;
use crate::services::price_feed::PriceFeed;
use crate::utils::helpers::{parse_token_count, settle_all, to_display_units};
use async_trait::async_trait;
use chrono::Utc;
use log::{info, warn};
use num_bigint::BigUint;
use num_traits::Zero;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletAdapter: Send + Sync {
    async fn connect(&self, kind: WalletKind) -> Result<WalletSnapshot, DashboardError>;
    async fn fetch_balances(&self, address: &str) -> Result<BalanceSnapshot, DashboardError>;
}

/// Addresses the wallet front end would otherwise hand us.
#[derive(Debug, Clone, Default)]
pub struct WalletIdentity {
    pub keplr_address: Option<String>,
    pub keplr_name: Option<String>,
    pub metamask_address: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Denomination {
    pub bech32_prefix: String,
    pub denom: String,
    pub exponent: u32,
}

/// Wallet backed by public Cosmos REST queries for a known address.
pub struct CosmosRestWallet {
    fetcher: Arc<dyn HttpFetcher>,
    rest_url: String,
    prices: PriceFeed,
    keybase: KeybaseClient,
    identity: WalletIdentity,
    denomination: Denomination,
    parallel_limit: usize,
}

struct Delegation {
    validator_address: String,
    amount: BigUint,
}

impl CosmosRestWallet {
    pub fn new(
        fetcher: Arc<dyn HttpFetcher>,
        rest_url: &str,
        prices: PriceFeed,
        keybase: KeybaseClient,
        identity: WalletIdentity,
        denomination: Denomination,
        parallel_limit: usize,
    ) -> Self {
        Self {
            fetcher,
            rest_url: rest_url.trim_end_matches('/').to_string(),
            prices,
            keybase,
            identity,
            denomination,
            parallel_limit,
        }
    }

    async fn query(&self, path: &str) -> Result<Value, DashboardError> {
        let url = format!("{}{}", self.rest_url, path);
        self.fetcher.get_json(&url).await.map_err(|e| {
            DashboardError::wallet(format!("Failed to fetch wallet balances: {}", e))
        })
    }

    fn display(&self, base: &BigUint) -> String {
        to_display_units(base, self.denomination.exponent)
    }

    fn connect_keplr_address(&self) -> Result<String, DashboardError> {
        let address = self
            .identity
            .keplr_address
            .clone()
            .ok_or_else(|| DashboardError::wallet("Keplr is not available: no address configured"))?;
        let expected = format!("{}1", self.denomination.bech32_prefix);
        if !address.starts_with(&expected) {
            return Err(DashboardError::wallet(format!(
                "{} is not a {} address",
                address, self.denomination.bech32_prefix
            )));
        }
        Ok(address)
    }

    fn connect_metamask_address(&self) -> Result<String, DashboardError> {
        let address = self
            .identity
            .metamask_address
            .clone()
            .ok_or_else(|| DashboardError::wallet("MetaMask is not installed"))?;
        let hex = address.strip_prefix("0x").unwrap_or_default();
        if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DashboardError::wallet(format!(
                "{} is not an Ethereum address",
                address
            )));
        }
        Ok(address)
    }

    async fn stake_entries(
        &self,
        delegations: Vec<Delegation>,
        rewards: &HashMap<String, BigUint>,
    ) -> Vec<StakeEntry> {
        let outcomes = settle_all(delegations, self.parallel_limit, move |delegation| async move {
            let reward = rewards
                .get(&delegation.validator_address)
                .cloned()
                .unwrap_or_else(BigUint::zero);
            let mut entry = StakeEntry {
                validator_name: delegation.validator_address.clone(),
                validator_address: delegation.validator_address,
                staked_amount: self.display(&delegation.amount),
                claimable_reward: self.display(&reward),
                thumbnail: None,
            };

            let path = format!("/cosmos/staking/v1beta1/validators/{}", entry.validator_address);
            match self.query(&path).await {
                Ok(body) => {
                    if let Some(moniker) = body
                        .pointer("/validator/description/moniker")
                        .and_then(Value::as_str)
                    {
                        entry.validator_name = moniker.to_string();
                    }
                    let identity = body
                        .pointer("/validator/description/identity")
                        .and_then(Value::as_str)
                        .unwrap_or_default();
                    match self.keybase.fetch_avatar(identity).await {
                        Ok(thumbnail) => entry.thumbnail = thumbnail,
                        Err(e) => warn!("{}", e),
                    }
                }
                Err(e) => warn!(
                    "No details for validator {}: {}",
                    entry.validator_address, e
                ),
            }
            Ok::<_, DashboardError>(entry)
        })
        .await;

        outcomes.into_iter().flatten().collect()
    }
}

/// Sum of the `amount`s in a coin list that match `denom`.
fn coin_total(coins: &Value, denom: &str) -> BigUint {
    coins
        .as_array()
        .map(|coins| {
            coins
                .iter()
                .filter(|coin| coin["denom"].as_str() == Some(denom))
                .map(|coin| parse_token_count(coin["amount"].as_str().unwrap_or("0")))
                .sum()
        })
        .unwrap_or_else(BigUint::zero)
}

fn delegations_of(body: &Value, denom: &str) -> Vec<Delegation> {
    body["delegation_responses"]
        .as_array()
        .map(|responses| {
            responses
                .iter()
                .filter(|r| r["balance"]["denom"].as_str() == Some(denom))
                .map(|r| Delegation {
                    validator_address: r["delegation"]["validator_address"]
                        .as_str()
                        .unwrap_or_default()
                        .to_string(),
                    amount: parse_token_count(r["balance"]["amount"].as_str().unwrap_or("0")),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn rewards_by_validator(body: &Value, denom: &str) -> HashMap<String, BigUint> {
    body["rewards"]
        .as_array()
        .map(|rewards| {
            rewards
                .iter()
                .filter_map(|r| {
                    let validator = r["validator_address"].as_str()?;
                    Some((validator.to_string(), coin_total(&r["reward"], denom)))
                })
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl WalletAdapter for CosmosRestWallet {
    async fn connect(&self, kind: WalletKind) -> Result<WalletSnapshot, DashboardError> {
        info!("Connecting to {}...", kind);
        let snapshot = match kind {
            WalletKind::MetaMask => WalletSnapshot::MetaMask {
                address: self.connect_metamask_address()?,
            },
            WalletKind::Keplr => {
                let address = self.connect_keplr_address()?;
                let exchange_rates = self.prices.fetch_rates().await.map_err(|e| {
                    DashboardError::wallet(format!("Failed to fetch exchange rates: {}", e))
                })?;
                WalletSnapshot::Keplr {
                    address,
                    name: self.identity.keplr_name.clone(),
                    exchange_rates,
                }
            }
        };
        info!("Connected to {} as {}", kind, snapshot.address());
        Ok(snapshot)
    }

    async fn fetch_balances(&self, address: &str) -> Result<BalanceSnapshot, DashboardError> {
        let denom = self.denomination.denom.as_str();
        let bank_path = format!("/cosmos/bank/v1beta1/balances/{}", address);
        let delegations_path = format!("/cosmos/staking/v1beta1/delegations/{}", address);
        let rewards_path = format!("/cosmos/distribution/v1beta1/delegators/{}/rewards", address);

        let (bank, delegations, rewards) = futures::try_join!(
            self.query(&bank_path),
            self.query(&delegations_path),
            self.query(&rewards_path),
        )?;

        let available = coin_total(&bank["balances"], denom);
        let delegations = delegations_of(&delegations, denom);
        let staked: BigUint = delegations.iter().map(|d| &d.amount).sum();
        let claimable = coin_total(&rewards["total"], denom);
        let per_validator = rewards_by_validator(&rewards, denom);
        let portfolio = &available + &staked + &claimable;

        info!(
            "Balances for {}: available {}, staked {} across {} validators",
            address,
            available,
            staked,
            delegations.len()
        );

        Ok(BalanceSnapshot {
            available_amount: self.display(&available),
            staked_amount: self.display(&staked),
            claimable_reward: self.display(&claimable),
            portfolio_value: self.display(&portfolio),
            validator_info: self.stake_entries(delegations, &per_validator).await,
            fetched_at: Utc::now(),
        })
    }
}
