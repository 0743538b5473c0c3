//! Ethereum JSON-RPC client with primary → fallback failover.
//!
//! Reads retry with exponential backoff and fail over through a circuit
//! breaker. Writes (`eth_sendTransaction`) go to the active provider once.

use alloy_primitives::{Address, Bytes};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::ChainError;
use crate::metrics::METRICS;

/// Consecutive failures before the circuit breaker opens.
const CIRCUIT_BREAKER_THRESHOLD: u64 = 5;
/// How long (ms) before a tripped breaker retries the primary.
const CIRCUIT_BREAKER_WINDOW_MS: u64 = 30_000;
/// Max retry attempts per provider.
const MAX_RETRIES: u32 = 2;
/// Base delay for exponential backoff (ms).
const BASE_DELAY_MS: u64 = 200;
const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

struct CircuitState {
    failures: u64,
    last_failure_ms: u64,
    open: bool,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// JSON-RPC client with primary → fallback failover.
pub struct RpcClient {
    http: reqwest::Client,
    primary_url: String,
    fallback_url: String,
    circuit: Mutex<CircuitState>,
    total_failovers: AtomicU64,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(primary_url: &str, fallback_url: &str) -> Self {
        info!(
            primary = primary_url,
            fallback = fallback_url,
            "RPC client initialized with failover"
        );
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            primary_url: primary_url.to_string(),
            fallback_url: fallback_url.to_string(),
            circuit: Mutex::new(CircuitState {
                failures: 0,
                last_failure_ms: 0,
                open: false,
            }),
            total_failovers: AtomicU64::new(0),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn primary_url(&self) -> &str {
        &self.primary_url
    }

    pub fn fallback_url(&self) -> &str {
        &self.fallback_url
    }

    // --- Transport ---

    /// Read-only call with retry and failover.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, ChainError> {
        let use_fallback = self.is_circuit_open();
        let first = self.try_with_retries(method, &params, use_fallback).await;
        let value = match first {
            Ok(value) => {
                if !use_fallback {
                    self.record_success();
                }
                value
            }
            // The node answered; another provider will not change the verdict.
            Err(e @ ChainError::Rpc { .. }) => return Err(e),
            Err(e) if use_fallback || self.primary_url == self.fallback_url => return Err(e),
            Err(primary_err) => {
                self.record_failure();
                warn!(method, error = %primary_err, "Primary RPC failed, trying fallback");
                self.try_with_retries(method, &params, true).await?
            }
        };
        decode_result(method, value)
    }

    /// State-changing call: one attempt on the active provider, no retry.
    pub async fn request_once<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, ChainError> {
        let url = self.active_url().to_string();
        let value = self.send(&url, method, &params).await?;
        decode_result(method, value)
    }

    async fn try_with_retries(
        &self,
        method: &str,
        params: &Value,
        use_fallback: bool,
    ) -> Result<Value, ChainError> {
        let url = if use_fallback {
            &self.fallback_url
        } else {
            &self.primary_url
        };
        let mut last_err = ChainError::Transport("no attempt made".into());
        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let delay = Self::retry_delay(attempt - 1);
                warn!(method, attempt, delay_ms = delay.as_millis() as u64, "Retrying RPC call");
                tokio::time::sleep(delay).await;
            }
            match self.send(url, method, params).await {
                Ok(value) => return Ok(value),
                Err(e @ ChainError::Rpc { .. }) => return Err(e),
                Err(e) => last_err = e,
            }
        }
        Err(last_err)
    }

    async fn send(&self, url: &str, method: &str, params: &Value) -> Result<Value, ChainError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(method, id, url, "RPC request");
        let body = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });

        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                METRICS.rpc_errors.fetch_add(1, Ordering::Relaxed);
                ChainError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            METRICS.rpc_errors.fetch_add(1, Ordering::Relaxed);
            return Err(ChainError::Transport(format!("HTTP {status} from {url}")));
        }

        let parsed: RpcResponse = response
            .json()
            .await
            .map_err(|e| ChainError::Transport(format!("invalid JSON-RPC response: {e}")))?;

        if let Some(err) = parsed.error {
            return Err(ChainError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        Ok(parsed.result.unwrap_or(Value::Null))
    }

    // --- Ethereum methods ---

    /// `eth_call` against the latest block; returns raw return data.
    pub async fn call(&self, to: &Address, data: Vec<u8>) -> Result<Bytes, ChainError> {
        self.request(
            "eth_call",
            json!([{ "to": to, "data": Bytes::from(data) }, "latest"]),
        )
        .await
    }

    pub async fn get_code(&self, address: &Address) -> Result<Bytes, ChainError> {
        self.request("eth_getCode", json!([address, "latest"]))
            .await
    }

    /// Submits an unsigned transaction for the endpoint's wallet to sign.
    pub async fn send_transaction(&self, tx: Value) -> Result<String, ChainError> {
        self.request_once("eth_sendTransaction", json!([tx])).await
    }

    /// `None` while the transaction is still pending.
    pub async fn transaction_receipt(&self, tx_hash: &str) -> Result<Option<Value>, ChainError> {
        self.request("eth_getTransactionReceipt", json!([tx_hash]))
            .await
    }

    pub async fn accounts(&self) -> Result<Vec<Address>, ChainError> {
        self.request("eth_accounts", json!([])).await
    }

    /// Prompts the wallet for account access. Not retried.
    pub async fn request_accounts(&self) -> Result<Vec<Address>, ChainError> {
        self.request_once("eth_requestAccounts", json!([])).await
    }

    // --- Circuit breaker ---

    /// Record a successful primary call; resets the circuit.
    pub fn record_success(&self) {
        let mut circuit = self.circuit.lock().unwrap_or_else(|e| e.into_inner());
        if circuit.failures > 0 {
            info!(primary = %self.primary_url, "Primary RPC recovered");
            circuit.failures = 0;
            circuit.open = false;
        }
    }

    /// Record a failed primary call; may open the circuit.
    pub fn record_failure(&self) {
        let mut circuit = self.circuit.lock().unwrap_or_else(|e| e.into_inner());
        circuit.failures += 1;
        circuit.last_failure_ms = now_ms();
        if circuit.failures >= CIRCUIT_BREAKER_THRESHOLD && !circuit.open {
            circuit.open = true;
            self.total_failovers.fetch_add(1, Ordering::Relaxed);
            METRICS.rpc_failovers.fetch_add(1, Ordering::Relaxed);
            warn!(
                failures = circuit.failures,
                fallback = %self.fallback_url,
                "Circuit breaker opened, routing to fallback"
            );
        }
    }

    /// Check if primary circuit is open (should use fallback).
    pub fn is_circuit_open(&self) -> bool {
        let mut circuit = self.circuit.lock().unwrap_or_else(|e| e.into_inner());
        if !circuit.open {
            return false;
        }
        // Half-open: retry primary after window
        if now_ms().saturating_sub(circuit.last_failure_ms) > CIRCUIT_BREAKER_WINDOW_MS {
            circuit.open = false;
            circuit.failures = 0;
            info!(primary = %self.primary_url, "Circuit breaker half-open, retrying primary");
            return false;
        }
        true
    }

    /// Total number of failover events (for health endpoint).
    pub fn failover_count(&self) -> u64 {
        self.total_failovers.load(Ordering::Relaxed)
    }

    /// Which URL is currently active.
    pub fn active_url(&self) -> &str {
        if self.is_circuit_open() {
            &self.fallback_url
        } else {
            &self.primary_url
        }
    }

    /// Retry delay for attempt n (0-indexed).
    pub fn retry_delay(attempt: u32) -> Duration {
        Duration::from_millis(BASE_DELAY_MS * 2u64.pow(attempt))
    }
}

fn decode_result<T: DeserializeOwned>(method: &str, value: Value) -> Result<T, ChainError> {
    serde_json::from_value(value)
        .map_err(|e| ChainError::Decode(format!("unexpected {method} result: {e}")))
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
