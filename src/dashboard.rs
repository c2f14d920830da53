use crate::app_state::AppState;
use crate::models::WalletKind;
use crate::services::validator_directory::ValidatorDirectoryClient;
use crate::services::wallet_adapter::WalletAdapter;
use log::{error, info};
use std::sync::Arc;

/// Runs the fetches a user action asks for and folds every outcome back into
/// the application state. Nothing returned from here is an error: failures
/// become messages with a retry.
pub struct Dashboard {
    wallet: Arc<dyn WalletAdapter>,
    directory: ValidatorDirectoryClient,
    state: AppState,
}

impl Dashboard {
    pub fn new(wallet: Arc<dyn WalletAdapter>, directory: ValidatorDirectoryClient) -> Self {
        Self {
            wallet,
            directory,
            state: AppState::new(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    /// Connects, then loads balances and the validator list side by side.
    pub async fn connect(&mut self, kind: WalletKind) {
        if !self.state.begin_connect(kind) {
            info!("Ignoring connect to {}: already connected or connecting", kind);
            return;
        }

        match self.wallet.connect(kind).await {
            Ok(snapshot) => self.state.connect_succeeded(snapshot),
            Err(e) => {
                error!("Connection error: {}", e);
                self.state.connect_failed(&e);
                return;
            }
        }

        let balance_ticket = self.state.begin_balance_refresh();
        let directory_generation = self.state.begin_directory_load();

        let wallet = &self.wallet;
        let balances = async {
            match &balance_ticket {
                Some(ticket) => Some(wallet.fetch_balances(&ticket.address).await),
                None => None,
            }
        };
        let (balances, validators) =
            tokio::join!(balances, self.directory.fetch_validator_directory());

        if let (Some(ticket), Some(result)) = (balance_ticket, balances) {
            if let Err(e) = &result {
                error!("Failed to fetch balances: {}", e);
            }
            self.state.balances_loaded(ticket.generation, result);
        }
        if let Err(e) = &validators {
            error!("Failed to load validators: {}", e);
        }
        self.state.directory_loaded(directory_generation, validators);
    }

    /// Re-runs the balance fetch from scratch.
    pub async fn refresh_balances(&mut self) {
        let Some(ticket) = self.state.begin_balance_refresh() else {
            return;
        };
        let result = self.wallet.fetch_balances(&ticket.address).await;
        if let Err(e) = &result {
            error!("Failed to fetch balances: {}", e);
        }
        self.state.balances_loaded(ticket.generation, result);
    }

    /// Re-runs the validator directory fetch from scratch.
    pub async fn load_validators(&mut self) {
        let generation = self.state.begin_directory_load();
        let result = self.directory.fetch_validator_directory().await;
        if let Err(e) = &result {
            error!("Failed to load validators: {}", e);
        }
        self.state.directory_loaded(generation, result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_state::{LoadState, Session, DIRECTORY_ERROR};
    use crate::errors::{DashboardError, FetchError};
    use crate::models::{BalanceSnapshot, ExchangeRateTable, WalletSnapshot};
    use crate::services::http::testing::serve;
    use crate::services::http::{HttpFetcher, MockHttpFetcher};
    use crate::services::keybase::KeybaseClient;
    use crate::services::wallet_adapter::MockWalletAdapter;
    use chrono::Utc;
    use mockall::predicate::eq;
    use mockall::Sequence;
    use serde_json::{json, Value};

    const VALIDATORS_URL: &str = "https://rest.test/cosmos/staking/v1beta1/validators?status=BOND_STATUS_BONDED&pagination.limit=200";

    fn keplr_snapshot() -> WalletSnapshot {
        WalletSnapshot::Keplr {
            address: "cosmos1me".into(),
            name: Some("main".into()),
            exchange_rates: ExchangeRateTable {
                usd: 10.0,
                eur: 9.0,
                fetched_at: Utc::now(),
            },
        }
    }

    fn balances() -> BalanceSnapshot {
        BalanceSnapshot {
            available_amount: "1.5".into(),
            staked_amount: "2".into(),
            claimable_reward: "0.1".into(),
            portfolio_value: "3.6".into(),
            validator_info: Vec::new(),
            fetched_at: Utc::now(),
        }
    }

    fn validator_page() -> Value {
        json!({"validators": [
            {"operator_address": "v1", "description": {"moniker": "Alpha", "identity": ""}, "tokens": "100"},
            {"operator_address": "v2", "description": {"moniker": "Beta", "identity": ""}, "tokens": "300"}
        ]})
    }

    fn directory(fetcher: MockHttpFetcher) -> ValidatorDirectoryClient {
        let fetcher: Arc<dyn HttpFetcher> = Arc::new(fetcher);
        ValidatorDirectoryClient::new(
            fetcher.clone(),
            KeybaseClient::new(fetcher, "https://keybase.test"),
            "https://rest.test",
            200,
            4,
        )
    }

    fn serving_directory() -> ValidatorDirectoryClient {
        let mut fetcher = MockHttpFetcher::new();
        serve(&mut fetcher, VALIDATORS_URL, validator_page());
        directory(fetcher)
    }

    fn keplr_wallet(balance_fetches: usize) -> MockWalletAdapter {
        let mut wallet = MockWalletAdapter::new();
        wallet
            .expect_connect()
            .with(eq(WalletKind::Keplr))
            .times(1)
            .returning(|_| Ok(keplr_snapshot()));
        wallet
            .expect_fetch_balances()
            .with(eq("cosmos1me".to_string()))
            .times(balance_fetches)
            .returning(|_| Ok(balances()));
        wallet
    }

    #[tokio::test]
    async fn keplr_connect_loads_balances_and_validators() {
        let mut dashboard = Dashboard::new(Arc::new(keplr_wallet(1)), serving_directory());

        dashboard.connect(WalletKind::Keplr).await;

        let state = dashboard.state();
        let session = state.connected().unwrap();
        assert_eq!(session.balances.loaded().unwrap().portfolio_value, "3.6");
        assert_eq!(state.visible_validators().len(), 2);
    }

    #[tokio::test]
    async fn metamask_connect_skips_balances() {
        let mut wallet = MockWalletAdapter::new();
        wallet
            .expect_connect()
            .with(eq(WalletKind::MetaMask))
            .times(1)
            .returning(|_| {
                Ok(WalletSnapshot::MetaMask {
                    address: "0xfeed".into(),
                })
            });
        wallet.expect_fetch_balances().times(0);
        let mut dashboard = Dashboard::new(Arc::new(wallet), serving_directory());

        dashboard.connect(WalletKind::MetaMask).await;

        assert_eq!(dashboard.state().connected().unwrap().balances, LoadState::Idle);
    }

    #[tokio::test]
    async fn rejected_connect_stays_disconnected() {
        let mut wallet = MockWalletAdapter::new();
        wallet.expect_connect().times(1).returning(|_| {
            Err(DashboardError::WalletConnection("user rejected the request".into()))
        });
        wallet.expect_fetch_balances().times(0);
        let mut fetcher = MockHttpFetcher::new();
        fetcher.expect_get_json().times(0);
        let mut dashboard = Dashboard::new(Arc::new(wallet), directory(fetcher));

        dashboard.connect(WalletKind::Keplr).await;

        assert_eq!(dashboard.state().session, Session::Disconnected);
        assert!(dashboard.state().error.is_some());
    }

    #[tokio::test]
    async fn directory_outage_keeps_the_session_and_retry_recovers() {
        let mut fetcher = MockHttpFetcher::new();
        let mut seq = Sequence::new();
        fetcher
            .expect_get_json()
            .with(eq(VALIDATORS_URL.to_string()))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(FetchError::Status(500)));
        fetcher
            .expect_get_json()
            .with(eq(VALIDATORS_URL.to_string()))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(validator_page()));
        let mut dashboard = Dashboard::new(Arc::new(keplr_wallet(1)), directory(fetcher));

        dashboard.connect(WalletKind::Keplr).await;
        assert!(dashboard.state().is_connected());
        assert_eq!(
            dashboard.state().directory,
            LoadState::Failed(DIRECTORY_ERROR.to_string())
        );

        dashboard.load_validators().await;
        assert_eq!(dashboard.state().visible_validators().len(), 2);
    }

    #[tokio::test]
    async fn refresh_balances_refetches() {
        let mut dashboard = Dashboard::new(Arc::new(keplr_wallet(2)), serving_directory());

        dashboard.connect(WalletKind::Keplr).await;
        dashboard.refresh_balances().await;

        assert!(dashboard.state().connected().unwrap().balances.loaded().is_some());
    }
}
