//! Storefront configuration.

use serde::Deserialize;
use std::time::Duration;

/// Configuration for the storefront server.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "defaults::bind_address")]
    pub bind_address: String,

    /// Brand shown in the "The {brand} NFT Market Place" heading.
    #[serde(default = "defaults::brand")]
    pub brand: String,

    #[serde(default = "defaults::content_project_id")]
    pub content_project_id: String,

    #[serde(default = "defaults::content_dataset")]
    pub content_dataset: String,

    #[serde(default = "defaults::content_api_version")]
    pub content_api_version: String,

    #[serde(default)]
    pub content_token: Option<String>,

    #[serde(default = "defaults::content_use_cdn")]
    pub content_use_cdn: bool,

    /// Overrides the query host derived from the project id.
    #[serde(default)]
    pub content_api_url: Option<String>,

    #[serde(default = "defaults::rpc_url")]
    pub rpc_url: String,

    #[serde(default = "defaults::fallback_rpc_url")]
    pub fallback_rpc_url: String,

    /// Wallet endpoint that owns the session accounts and signs transactions.
    #[serde(default = "defaults::wallet_rpc_url")]
    pub wallet_rpc_url: String,

    #[serde(default = "defaults::mint_load_timeout_ms")]
    pub mint_load_timeout_ms: u64,

    #[serde(default = "defaults::request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: defaults::bind_address(),
            brand: defaults::brand(),
            content_project_id: defaults::content_project_id(),
            content_dataset: defaults::content_dataset(),
            content_api_version: defaults::content_api_version(),
            content_token: None,
            content_use_cdn: defaults::content_use_cdn(),
            content_api_url: None,
            rpc_url: defaults::rpc_url(),
            fallback_rpc_url: defaults::fallback_rpc_url(),
            wallet_rpc_url: defaults::wallet_rpc_url(),
            mint_load_timeout_ms: defaults::mint_load_timeout_ms(),
            request_timeout_secs: defaults::request_timeout_secs(),
        }
    }
}

impl Config {
    pub fn mint_load_timeout(&self) -> Duration {
        Duration::from_millis(self.mint_load_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Base URL for content queries, e.g. `https://abc123.apicdn.sanity.io`.
    pub fn content_base_url(&self) -> String {
        if let Some(url) = self.content_api_url.as_deref().filter(|u| !u.is_empty()) {
            return url.trim_end_matches('/').to_string();
        }
        // Authenticated reads bypass the CDN.
        let host = if self.content_use_cdn && self.content_token.is_none() {
            "apicdn.sanity.io"
        } else {
            "api.sanity.io"
        };
        format!("https://{}.{host}", self.content_project_id)
    }
}

mod defaults {
    fn network() -> String {
        std::env::var("STOREFRONT_NETWORK").unwrap_or_else(|_| "sepolia".into())
    }

    pub fn bind_address() -> String {
        "0.0.0.0:3000".into()
    }

    pub fn brand() -> String {
        "KYUMHO".into()
    }

    pub fn content_project_id() -> String {
        "storefront".into()
    }

    pub fn content_dataset() -> String {
        "production".into()
    }

    pub fn content_api_version() -> String {
        "2021-10-21".into()
    }

    pub fn content_use_cdn() -> bool {
        true
    }

    pub fn rpc_url() -> String {
        if network().contains("mainnet") {
            "https://ethereum-rpc.publicnode.com".into()
        } else {
            "https://ethereum-sepolia-rpc.publicnode.com".into()
        }
    }

    pub fn fallback_rpc_url() -> String {
        if network().contains("mainnet") {
            "https://eth.llamarpc.com".into()
        } else {
            "https://rpc.sepolia.org".into()
        }
    }

    pub fn wallet_rpc_url() -> String {
        "http://127.0.0.1:1248".into()
    }

    pub fn mint_load_timeout_ms() -> u64 {
        10_000
    }

    pub fn request_timeout_secs() -> u64 {
        30
    }
}
