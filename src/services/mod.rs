pub mod http;
pub mod keybase;
pub mod price_feed;
pub mod validator_directory;
pub mod wallet_adapter;
