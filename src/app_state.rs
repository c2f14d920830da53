use crate::errors::DashboardError;
use crate::models::{BalanceSnapshot, Currency, ValidatorRecord, WalletKind, WalletSnapshot};
use crate::view_model::{project, SortKey, ViewState};
use log::info;

pub const BALANCE_ERROR: &str = "Failed to fetch wallet balances. Please try again.";
pub const DIRECTORY_ERROR: &str =
    "Failed to load validators. Please check your internet connection and try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Dashboard,
    Validators,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadState<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> LoadState<T> {
    pub fn loaded(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectedSession {
    pub wallet: WalletSnapshot,
    pub balances: LoadState<BalanceSnapshot>,
    pub page: Page,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Session {
    #[default]
    Disconnected,
    Connecting(WalletKind),
    Connected(ConnectedSession),
}

/// Handle for an in-flight fetch. Results carrying an older generation than
/// the latest one issued are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceTicket {
    pub generation: u64,
    pub address: String,
}

/// Everything the front end renders, changed only through the methods below.
#[derive(Debug, Default)]
pub struct AppState {
    pub session: Session,
    pub currency: Currency,
    pub directory: LoadState<Vec<ValidatorRecord>>,
    pub view: ViewState,
    pub error: Option<String>,
    balance_generation: u64,
    directory_generation: u64,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connected(&self) -> Option<&ConnectedSession> {
        match &self.session {
            Session::Connected(session) => Some(session),
            _ => None,
        }
    }

    fn connected_mut(&mut self) -> Option<&mut ConnectedSession> {
        match &mut self.session {
            Session::Connected(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected().is_some()
    }

    pub fn page(&self) -> Page {
        self.connected().map(|s| s.page).unwrap_or_default()
    }

    /// Only a disconnected session may start connecting.
    pub fn begin_connect(&mut self, kind: WalletKind) -> bool {
        if !matches!(self.session, Session::Disconnected) {
            return false;
        }
        self.session = Session::Connecting(kind);
        self.error = None;
        true
    }

    pub fn connect_succeeded(&mut self, wallet: WalletSnapshot) {
        if !matches!(self.session, Session::Connecting(_)) {
            info!("Dropping connection result for {}: no connect pending", wallet.address());
            return;
        }
        self.session = Session::Connected(ConnectedSession {
            wallet,
            balances: LoadState::Idle,
            page: Page::Dashboard,
        });
    }

    pub fn connect_failed(&mut self, error: &DashboardError) {
        if matches!(self.session, Session::Connecting(_)) {
            self.session = Session::Disconnected;
            self.error = Some(error.to_string());
        }
    }

    pub fn disconnect(&mut self) {
        self.session = Session::Disconnected;
        self.error = None;
        self.balance_generation += 1;
    }

    pub fn navigate(&mut self, page: Page) -> bool {
        match self.connected_mut() {
            Some(session) => {
                session.page = page;
                true
            }
            None => false,
        }
    }

    pub fn select_currency(&mut self, currency: Currency) {
        self.currency = currency;
    }

    /// Starts a balance refresh for wallets that report balances.
    pub fn begin_balance_refresh(&mut self) -> Option<BalanceTicket> {
        let generation = self.balance_generation + 1;
        let session = self.connected_mut()?;
        if !session.wallet.has_balances() {
            return None;
        }
        session.balances = LoadState::Loading;
        let address = session.wallet.address().to_string();
        self.balance_generation = generation;
        Some(BalanceTicket {
            generation,
            address,
        })
    }

    pub fn balances_loaded(
        &mut self,
        generation: u64,
        result: Result<BalanceSnapshot, DashboardError>,
    ) {
        if generation != self.balance_generation {
            info!("Discarding stale balance response (generation {})", generation);
            return;
        }
        if let Some(session) = self.connected_mut() {
            session.balances = match result {
                Ok(balances) => LoadState::Loaded(balances),
                Err(_) => LoadState::Failed(BALANCE_ERROR.to_string()),
            };
        }
    }

    pub fn begin_directory_load(&mut self) -> u64 {
        self.directory_generation += 1;
        self.directory = LoadState::Loading;
        self.directory_generation
    }

    pub fn directory_loaded(
        &mut self,
        generation: u64,
        result: Result<Vec<ValidatorRecord>, DashboardError>,
    ) {
        if generation != self.directory_generation {
            info!("Discarding stale validator list (generation {})", generation);
            return;
        }
        self.directory = match result {
            Ok(records) => LoadState::Loaded(records),
            Err(_) => LoadState::Failed(DIRECTORY_ERROR.to_string()),
        };
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.view.set_search(term);
    }

    pub fn select_sort(&mut self, key: SortKey) {
        self.view.select_sort(key);
    }

    /// Current validator rows, recomputed from the latest list and view state.
    pub fn visible_validators(&self) -> Vec<&ValidatorRecord> {
        match &self.directory {
            LoadState::Loaded(records) => project(records, &self.view),
            _ => Vec::new(),
        }
    }
}
