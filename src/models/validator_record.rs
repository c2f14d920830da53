use crate::utils::helpers::parse_token_count;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorRecord {
    pub operator_address: String,
    pub moniker: String,
    pub identity: String,
    pub bonded_tokens: String, // integer token count, as served upstream
    pub avatar_url: Option<String>,
}

impl ValidatorRecord {
    /// Bonded tokens as an integer; malformed counts read as zero.
    pub fn voting_power(&self) -> BigUint {
        parse_token_count(&self.bonded_tokens)
    }
}
