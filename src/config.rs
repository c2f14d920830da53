use crate::errors::DashboardError;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub cosmos_rest_url: String,
    pub keybase_url: String,
    pub price_api_url: String,
    pub price_asset_id: String,
    pub validator_page_limit: usize,
    pub enrichment_parallel_limit: usize,
    pub http_timeout_secs: u64,
    pub keplr_address: Option<String>,
    pub keplr_name: Option<String>,
    pub metamask_address: Option<String>,
    pub bech32_prefix: String,
    pub native_denom: String,
    pub denom_exponent: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, DashboardError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, DashboardError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            cosmos_rest_url: trim_slash(text(
                "COSMOS_REST_URL",
                "https://rest.cosmos.directory/cosmoshub",
            )),
            keybase_url: trim_slash(text("KEYBASE_URL", "https://keybase.io")),
            price_api_url: trim_slash(text("PRICE_API_URL", "https://api.coingecko.com")),
            price_asset_id: text("PRICE_ASSET_ID", "cosmos"),
            validator_page_limit: parse_var(&lookup, "VALIDATOR_PAGE_LIMIT", 200)?,
            enrichment_parallel_limit: parse_var(&lookup, "ENRICHMENT_PARALLEL_LIMIT", 200)?,
            http_timeout_secs: parse_var(&lookup, "HTTP_TIMEOUT_SECS", 15)?,
            keplr_address: optional("KEPLR_ADDRESS"),
            keplr_name: optional("KEPLR_NAME"),
            metamask_address: optional("METAMASK_ADDRESS"),
            bech32_prefix: text("BECH32_PREFIX", "cosmos"),
            native_denom: text("NATIVE_DENOM", "uatom"),
            denom_exponent: parse_var(&lookup, "DENOM_EXPONENT", 6)?,
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T, DashboardError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| DashboardError::Config(format!("{} must be a number, got {:?}", key, raw))),
        _ => Ok(default),
    }
}

fn trim_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, DashboardError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.cosmos_rest_url, "https://rest.cosmos.directory/cosmoshub");
        assert_eq!(config.keybase_url, "https://keybase.io");
        assert_eq!(config.validator_page_limit, 200);
        assert_eq!(config.denom_exponent, 6);
        assert!(config.keplr_address.is_none());
    }

    #[test]
    fn overrides_and_trailing_slashes() {
        let config = config_from(&[
            ("COSMOS_REST_URL", "http://localhost:1317/"),
            ("VALIDATOR_PAGE_LIMIT", "50"),
            ("KEPLR_ADDRESS", "cosmos1abc"),
        ])
        .unwrap();
        assert_eq!(config.cosmos_rest_url, "http://localhost:1317");
        assert_eq!(config.validator_page_limit, 50);
        assert_eq!(config.keplr_address.as_deref(), Some("cosmos1abc"));
    }

    #[test]
    fn malformed_number_is_a_config_error() {
        let err = config_from(&[("HTTP_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(matches!(err, DashboardError::Config(_)));
    }
}
