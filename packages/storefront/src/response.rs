//! Response types for the JSON API.

use drop_types::{Address, MintAvailability, MintStatus};
use serde::Serialize;
use serde_json::Value;

/// Response from the mint endpoint.
#[derive(Serialize)]
pub struct MintResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MintResponse {
    pub fn ok(tx_hash: String) -> Self {
        Self {
            success: true,
            tx_hash: Some(tx_hash),
            error: None,
        }
    }
}

/// Response from the status endpoint.
#[derive(Serialize)]
pub struct StatusResponse {
    pub slug: String,
    pub address: Address,
    pub status: MintStatus,
    pub availability: MintAvailability,
    pub label: String,
}

/// Response from the tx status endpoint.
#[derive(Serialize)]
pub struct TxStatusResponse {
    pub status: &'static str,
    pub tx_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<Value>,
}

/// Response from the health endpoint.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_secs: u64,
    pub requests: u64,
    pub active_rpc: String,
    pub failovers: u64,
    pub wallet_connected: bool,
}
