mod exchange_rates;
mod stake_entry;
mod validator_record;
mod wallet;

pub use exchange_rates::{Currency, ExchangeRateTable};
pub use stake_entry::StakeEntry;
pub use validator_record::ValidatorRecord;
pub use wallet::{BalanceSnapshot, WalletKind, WalletSnapshot};
