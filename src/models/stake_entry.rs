use serde::{Deserialize, Serialize};

/// One delegation held by the connected wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakeEntry {
    pub validator_address: String,
    pub validator_name: String,
    pub staked_amount: String,
    pub claimable_reward: String,
    pub thumbnail: Option<String>,
}
