use dotenv::dotenv;
use log::info;
use std::sync::Arc;
use tokio::io::{self, AsyncBufReadExt, BufReader};

mod app_state;
mod config;
mod dashboard;
mod errors;
mod models;
mod services;
mod utils;
mod view_model;

use crate::app_state::{AppState, LoadState, Page};
use crate::config::Config;
use crate::dashboard::Dashboard;
use crate::models::{Currency, WalletKind, WalletSnapshot};
use crate::services::http::{HttpFetcher, ReqwestFetcher};
use crate::services::keybase::KeybaseClient;
use crate::services::price_feed::PriceFeed;
use crate::services::validator_directory::ValidatorDirectoryClient;
use crate::services::wallet_adapter::{CosmosRestWallet, Denomination, WalletIdentity};
use crate::utils::format::{format_card_value, format_currency, format_tokens};
use crate::view_model::SortKey;

const HELP: &str = "commands: connect <keplr|metamask>, disconnect, dashboard, validators, \
currency <usd|eur>, search [term], sort <name|power>, retry, show, help, quit";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::init();

    info!("Starting Cosmos dashboard");
    let config = Config::from_env()?;

    let fetcher: Arc<dyn HttpFetcher> = Arc::new(ReqwestFetcher::new(config.http_timeout_secs)?);
    let keybase = KeybaseClient::new(fetcher.clone(), &config.keybase_url);
    let directory = ValidatorDirectoryClient::new(
        fetcher.clone(),
        keybase.clone(),
        &config.cosmos_rest_url,
        config.validator_page_limit,
        config.enrichment_parallel_limit,
    );
    let wallet = CosmosRestWallet::new(
        fetcher.clone(),
        &config.cosmos_rest_url,
        PriceFeed::new(fetcher.clone(), &config.price_api_url, &config.price_asset_id),
        keybase,
        WalletIdentity {
            keplr_address: config.keplr_address.clone(),
            keplr_name: config.keplr_name.clone(),
            metamask_address: config.metamask_address.clone(),
        },
        Denomination {
            bech32_prefix: config.bech32_prefix.clone(),
            denom: config.native_denom.clone(),
            exponent: config.denom_exponent,
        },
        config.enrichment_parallel_limit,
    );
    let mut dashboard = Dashboard::new(Arc::new(wallet), directory);

    println!("Crypto Wallet Connector. {}", HELP);
    render(dashboard.state());

    let mut lines = BufReader::new(io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, argument) = match line.split_once(' ') {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command.to_ascii_lowercase().as_str() {
            "" => continue,
            "quit" | "exit" => break,
            "help" => {
                println!("{}", HELP);
                continue;
            }
            "connect" => match argument.parse::<WalletKind>() {
                Ok(kind) => {
                    println!("Connecting to wallet...");
                    dashboard.connect(kind).await;
                }
                Err(e) => println!("{}", e),
            },
            "disconnect" => dashboard.state_mut().disconnect(),
            "dashboard" => navigate(&mut dashboard, Page::Dashboard),
            "validators" => navigate(&mut dashboard, Page::Validators),
            "currency" => match argument.parse::<Currency>() {
                Ok(currency) => dashboard.state_mut().select_currency(currency),
                Err(e) => println!("{}", e),
            },
            "search" => dashboard.state_mut().set_search(argument),
            "sort" => match argument.to_ascii_lowercase().as_str() {
                "name" => dashboard.state_mut().select_sort(SortKey::Name),
                "power" | "votingpower" => dashboard.state_mut().select_sort(SortKey::VotingPower),
                other => println!("unknown sort column {:?}", other),
            },
            "retry" => retry(&mut dashboard).await,
            "show" => {}
            other => {
                println!("unknown command {:?}. {}", other, HELP);
                continue;
            }
        }
        render(dashboard.state());
    }

    info!("Bye");
    Ok(())
}

fn navigate(dashboard: &mut Dashboard, page: Page) {
    if !dashboard.state_mut().navigate(page) {
        println!("Connect a wallet first");
    }
}

/// Retries whatever failed on the current page.
async fn retry(dashboard: &mut Dashboard) {
    if !dashboard.state().is_connected() {
        println!("Connect a wallet first");
        return;
    }
    match dashboard.state().page() {
        Page::Validators => dashboard.load_validators().await,
        Page::Dashboard => {
            let balances_failed = dashboard
                .state()
                .connected()
                .map(|s| matches!(s.balances, LoadState::Failed(_)))
                .unwrap_or(false);
            if balances_failed {
                dashboard.refresh_balances().await;
            }
            if matches!(dashboard.state().directory, LoadState::Failed(_)) {
                dashboard.load_validators().await;
            }
        }
    }
}

fn render(state: &AppState) {
    if let Some(error) = &state.error {
        println!("Error: {}", error);
    }
    let Some(session) = state.connected() else {
        println!("Not connected to any wallet");
        return;
    };

    match session.page {
        Page::Dashboard => render_dashboard(state, &session.wallet, &session.balances),
        Page::Validators => render_validators(state),
    }
}

fn render_dashboard(
    state: &AppState,
    wallet: &WalletSnapshot,
    balances: &LoadState<models::BalanceSnapshot>,
) {
    println!("== Dashboard ==");
    println!("Connected to: {}", wallet.kind());
    if let WalletSnapshot::Keplr { name: Some(name), .. } = wallet {
        println!("Name: {}", name);
    }
    println!("Address: {}", wallet.address());

    let Some(rates) = wallet.exchange_rates() else {
        return;
    };
    println!("1 ATOM = {}", format_currency(rates.usd, Currency::Usd));
    println!("1 ATOM = {}", format_currency(rates.eur, Currency::Eur));

    let currency = state.currency;
    if balances.is_loading() {
        println!("Fetching balances...");
        return;
    }
    match balances {
        LoadState::Idle | LoadState::Loading => {}
        LoadState::Failed(message) => println!("{} (type `retry`)", message),
        LoadState::Loaded(b) => {
            let value = |amount: &str| format_card_value(rates.convert(amount, currency), currency);
            println!("Total Wallet Value:     {}", value(&b.portfolio_value));
            println!("Total Available Value:  {}", value(&b.available_amount));
            println!("Total Staking Value:    {}", value(&b.staked_amount));
            if !b.validator_info.is_empty() {
                println!("-- Staking Details --");
            }
            for entry in &b.validator_info {
                println!(
                    "{:<24} {:>16} staked {:>16} rewards",
                    entry.validator_name,
                    format_currency(rates.convert(&entry.staked_amount, currency), currency),
                    format_currency(rates.convert(&entry.claimable_reward, currency), currency),
                );
            }
        }
    }
}

fn render_validators(state: &AppState) {
    println!("== Cosmos Hub Validators ==");
    let Some(records) = state.directory.loaded() else {
        match &state.directory {
            LoadState::Loading => println!("Loading validators..."),
            LoadState::Failed(message) => println!("{} (type `retry`)", message),
            _ => println!("No validators loaded (type `retry`)"),
        }
        return;
    };

    let view = &state.view;
    let arrow = |key: SortKey| {
        if view.sort_key == key {
            view.sort_direction.arrow()
        } else {
            ""
        }
    };
    let rows = state.visible_validators();
    if !view.search_term.is_empty() {
        println!("Search: {:?} ({} of {})", view.search_term, rows.len(), records.len());
    }
    println!(
        "{:<32} {:>28}",
        format!("Name {}", arrow(SortKey::Name)),
        format!("Voting Power {}", arrow(SortKey::VotingPower))
    );
    for record in rows {
        println!(
            "{:<32} {:>28}  {}",
            record.moniker,
            format_tokens(&record.voting_power()),
            record.avatar_url.as_deref().unwrap_or("")
        );
    }
}
