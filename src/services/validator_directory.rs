use crate::errors::{DashboardError, FetchError};
use crate::models::ValidatorRecord;
use crate::services::http::HttpFetcher;
use crate::services::keybase::KeybaseClient;
use crate::utils::helpers::settle_all;
use log::{error, info, warn};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct ValidatorsResponse {
    validators: Vec<RestValidator>,
}

#[derive(Debug, Deserialize)]
struct RestValidator {
    operator_address: String,
    #[serde(default)]
    description: RestDescription,
    #[serde(default)]
    tokens: String,
}

#[derive(Debug, Default, Deserialize)]
struct RestDescription {
    #[serde(default)]
    moniker: String,
    #[serde(default)]
    identity: String,
}

impl From<RestValidator> for ValidatorRecord {
    fn from(v: RestValidator) -> Self {
        ValidatorRecord {
            operator_address: v.operator_address,
            moniker: v.description.moniker,
            identity: v.description.identity,
            bonded_tokens: v.tokens,
            avatar_url: None,
        }
    }
}

/// Fetches the bonded validator set from a Cosmos REST gateway and attaches
/// Keybase avatars on a best-effort basis.
#[derive(Clone)]
pub struct ValidatorDirectoryClient {
    fetcher: Arc<dyn HttpFetcher>,
    keybase: KeybaseClient,
    rest_url: String,
    page_limit: usize,
    parallel_limit: usize,
}

impl ValidatorDirectoryClient {
    pub fn new(
        fetcher: Arc<dyn HttpFetcher>,
        keybase: KeybaseClient,
        rest_url: &str,
        page_limit: usize,
        parallel_limit: usize,
    ) -> Self {
        Self {
            fetcher,
            keybase,
            rest_url: rest_url.trim_end_matches('/').to_string(),
            page_limit,
            parallel_limit,
        }
    }

    pub fn validators_url(&self) -> String {
        format!(
            "{}/cosmos/staking/v1beta1/validators?status=BOND_STATUS_BONDED&pagination.limit={}",
            self.rest_url, self.page_limit
        )
    }

    /// One page of bonded validators in upstream order. Fails as a whole only
    /// when the primary listing fails; avatar lookups never fail it.
    pub async fn fetch_validator_directory(&self) -> Result<Vec<ValidatorRecord>, DashboardError> {
        let url = self.validators_url();
        info!("Fetching bonded validators from {}", url);

        let body = self.fetcher.get_json(&url).await.map_err(|e| {
            error!("Failed to fetch validators: {}", e);
            DashboardError::network(e)
        })?;
        let page: ValidatorsResponse = serde_json::from_value(body).map_err(|e| {
            error!("Unexpected validator list format: {}", e);
            DashboardError::network(FetchError::Decode(e.to_string()))
        })?;

        info!("Fetched {} bonded validators", page.validators.len());
        let records: Vec<ValidatorRecord> =
            page.validators.into_iter().map(ValidatorRecord::from).collect();

        Ok(self.enrich(records).await)
    }

    async fn enrich(&self, records: Vec<ValidatorRecord>) -> Vec<ValidatorRecord> {
        let keybase = &self.keybase;
        let outcomes = settle_all(records, self.parallel_limit, move |mut record| async move {
            match keybase.fetch_avatar(&record.identity).await {
                Ok(avatar) => record.avatar_url = avatar,
                Err(e) => warn!("{} ({})", e, record.moniker),
            }
            Ok::<_, DashboardError>(record)
        })
        .await;

        let enriched: Vec<ValidatorRecord> = outcomes.into_iter().flatten().collect();
        info!(
            "Attached avatars to {} of {} validators",
            enriched.iter().filter(|r| r.avatar_url.is_some()).count(),
            enriched.len()
        );
        enriched
    }
}
