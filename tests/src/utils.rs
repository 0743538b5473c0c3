//! Fake upstream servers (content store, chain + wallet JSON-RPC) and a
//! harness that runs the real storefront router against them.

use anyhow::Result;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use alloy_primitives::{hex, U256};
use alloy_sol_types::{SolCall, SolValue};
use drop_types::Address;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use storefront::chain::drop_contract::NATIVE_TOKEN;
use storefront::chain::{ClaimCondition, IDropERC721};
use storefront::{create_router, AppState, Config};
use tokio::sync::Notify;

pub const DROP_ADDRESS: &str = "0x1234567890abcdef1234567890abcdef12345678";
pub const EMPTY_ADDRESS: &str = "0x00000000000000000000000000000000000000ee";
pub const WALLET_ADDRESS: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub const PRICE_WEI: u64 = 10_000_000_000_000_000;
pub const TX_HASH: &str = "0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060";

/// Bind an ephemeral port and serve `router` in the background.
pub async fn spawn(router: Router) -> Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://{addr}"))
}

pub fn collection_json(slug: &str, title: &str, address: &str) -> Value {
    json!({
        "_id": format!("collection-{slug}"),
        "title": title,
        "description": format!("{title} description"),
        "nftCollectionName": format!("{title} Series"),
        "address": address,
        "mainImage": { "asset": { "_ref": format!("image-main{slug}-800x600-png"), "_type": "reference" } },
        "previewImage": { "asset": { "_ref": format!("image-prev{slug}-400x400-jpg"), "_type": "reference" } },
        "slug": { "current": slug },
        "creator": {
            "_id": "creator-1",
            "name": "Sonny",
            "address": "0x00000000000000000000000000000000000000aa",
            "slug": { "current": "sonny" }
        }
    })
}

// ── Fake content store ──────────────────────────────────────────────

#[derive(Default)]
pub struct ContentScript {
    pub collections: Vec<Value>,
    pub fail_with: Option<u16>,
    /// Query parameters of every request received.
    pub requests: Vec<HashMap<String, String>>,
}

pub type FakeContent = Arc<Mutex<ContentScript>>;

async fn content_query(
    State(script): State<FakeContent>,
    Query(params): Query<HashMap<String, String>>,
) -> (axum::http::StatusCode, Json<Value>) {
    let mut script = script.lock().unwrap();
    script.requests.push(params.clone());
    if let Some(code) = script.fail_with {
        let status = axum::http::StatusCode::from_u16(code).unwrap();
        return (status, Json(json!({ "error": "scripted failure" })));
    }
    let result = match params.get("$id") {
        Some(raw) => {
            let slug: String = serde_json::from_str(raw).unwrap();
            script
                .collections
                .iter()
                .find(|c| c["slug"]["current"] == slug.as_str())
                .cloned()
                .unwrap_or(Value::Null)
        }
        None => Value::Array(script.collections.clone()),
    };
    (axum::http::StatusCode::OK, Json(json!({ "ms": 1, "result": result })))
}

pub async fn spawn_content(script: FakeContent) -> Result<String> {
    let router = Router::new()
        .route("/{version}/data/query/{dataset}", get(content_query))
        .with_state(script);
    spawn(router).await
}

// ── Fake chain + wallet ─────────────────────────────────────────────

pub struct ChainScript {
    pub claimed: u64,
    pub total: u64,
    pub price_wei: u64,
    /// Addresses with deployed code.
    pub deployed: Vec<String>,
    pub accounts: Vec<String>,
    pub request_accounts_unsupported: bool,
    pub reject_send: bool,
    pub receipts: HashMap<String, Value>,
    pub sent: Vec<Value>,
    pub methods: Vec<String>,
    /// When set, `eth_sendTransaction` waits for a permit before answering.
    pub send_gate: Option<Arc<Notify>>,
}

impl Default for ChainScript {
    fn default() -> Self {
        Self {
            claimed: 13,
            total: 21,
            price_wei: PRICE_WEI,
            deployed: vec![DROP_ADDRESS.to_string()],
            accounts: vec![WALLET_ADDRESS.to_string()],
            request_accounts_unsupported: false,
            reject_send: false,
            receipts: HashMap::new(),
            sent: Vec::new(),
            methods: Vec::new(),
            send_gate: None,
        }
    }
}

pub type FakeChain = Arc<Mutex<ChainScript>>;

fn encoded_condition(price_wei: u64, total: u64, claimed: u64) -> Vec<u8> {
    ClaimCondition {
        startTimestamp: U256::ZERO,
        maxClaimableSupply: U256::from(total),
        supplyClaimed: U256::from(claimed),
        quantityLimitPerWallet: U256::ZERO,
        merkleRoot: Default::default(),
        pricePerToken: U256::from(price_wei),
        currency: NATIVE_TOKEN,
        metadata: String::new(),
    }
    .abi_encode()
}

fn rpc_ok(id: &Value, result: Value) -> Json<Value> {
    Json(json!({ "jsonrpc": "2.0", "id": id, "result": result }))
}

fn rpc_err(id: &Value, code: i64, message: &str) -> Json<Value> {
    Json(json!({ "jsonrpc": "2.0", "id": id, "error": { "code": code, "message": message } }))
}

async fn chain_rpc(State(script): State<FakeChain>, Json(body): Json<Value>) -> Json<Value> {
    let method = body["method"].as_str().unwrap_or_default().to_string();
    let gate = {
        let mut script = script.lock().unwrap();
        script.methods.push(method.clone());
        script.send_gate.clone()
    };
    if let (Some(gate), "eth_sendTransaction") = (gate, method.as_str()) {
        gate.notified().await;
    }

    let mut script = script.lock().unwrap();
    let id = body["id"].clone();
    let params = body["params"].clone();

    match method.as_str() {
        "eth_getCode" => {
            let address = params[0].as_str().unwrap_or_default().to_lowercase();
            let code = if script.deployed.contains(&address) { "0x6080604052" } else { "0x" };
            rpc_ok(&id, json!(code))
        }
        "eth_call" => {
            let data = hex::decode(params[0]["data"].as_str().unwrap_or_default()).unwrap_or_default();
            let selector = data.get(..4).unwrap_or_default();
            let result = if selector == IDropERC721::nextTokenIdToClaimCall::SELECTOR {
                U256::from(script.claimed).abi_encode()
            } else if selector == IDropERC721::nextTokenIdToMintCall::SELECTOR {
                U256::from(script.total).abi_encode()
            } else if selector == IDropERC721::claimConditionCall::SELECTOR {
                (U256::ZERO, U256::from(1)).abi_encode()
            } else if selector == IDropERC721::getClaimConditionByIdCall::SELECTOR {
                encoded_condition(script.price_wei, script.total, script.claimed)
            } else {
                return rpc_err(&id, 3, "execution reverted");
            };
            rpc_ok(&id, json!(hex::encode_prefixed(result)))
        }
        "eth_requestAccounts" if script.request_accounts_unsupported => {
            rpc_err(&id, -32601, "method not found")
        }
        "eth_requestAccounts" | "eth_accounts" => rpc_ok(&id, json!(script.accounts)),
        "eth_sendTransaction" => {
            script.sent.push(params[0].clone());
            if script.reject_send {
                rpc_err(&id, 4001, "User rejected the request.")
            } else {
                rpc_ok(&id, json!(TX_HASH))
            }
        }
        "eth_getTransactionReceipt" => {
            let hash = params[0].as_str().unwrap_or_default();
            rpc_ok(&id, script.receipts.get(hash).cloned().unwrap_or(Value::Null))
        }
        _ => rpc_err(&id, -32601, "method not found"),
    }
}

pub async fn spawn_chain(script: FakeChain) -> Result<String> {
    let router = Router::new().route("/", post(chain_rpc)).with_state(script);
    spawn(router).await
}

// ── Harness ─────────────────────────────────────────────────────────

pub struct Harness {
    pub base_url: String,
    pub content: FakeContent,
    pub chain: FakeChain,
    pub client: reqwest::Client,
}

impl Harness {
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get(&self, path: &str) -> Result<reqwest::Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<reqwest::Response> {
        Ok(self.client.post(self.url(path)).form(form).send().await?)
    }

    pub async fn connect_wallet(&self) -> Result<()> {
        let response = self.post_form("/wallet/connect", &[("return_to", "/")]).await?;
        anyhow::ensure!(response.status() == 303, "connect returned {}", response.status());
        Ok(())
    }

    /// Parsed transactions the wallet was asked to send.
    pub fn sent_transactions(&self) -> Vec<Value> {
        self.chain.lock().unwrap().sent.clone()
    }

    /// Poll until the fake chain has seen `method` at least once.
    pub async fn wait_for_method(&self, method: &str) -> Result<()> {
        for _ in 0..300 {
            if self.chain.lock().unwrap().methods.iter().any(|m| m == method) {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        anyhow::bail!("{method} never reached the chain")
    }
}

/// Start fakes plus a storefront wired to them.
pub async fn setup_storefront(collections: Vec<Value>, chain: ChainScript) -> Result<Harness> {
    let content: FakeContent = Arc::new(Mutex::new(ContentScript {
        collections,
        ..ContentScript::default()
    }));
    let chain: FakeChain = Arc::new(Mutex::new(chain));

    let content_url = spawn_content(Arc::clone(&content)).await?;
    let chain_url = spawn_chain(Arc::clone(&chain)).await?;

    let config = Config {
        content_project_id: "testproj".into(),
        content_api_url: Some(content_url),
        rpc_url: chain_url.clone(),
        fallback_rpc_url: chain_url.clone(),
        wallet_rpc_url: chain_url,
        mint_load_timeout_ms: 3_000,
        ..Config::default()
    };
    let state = Arc::new(AppState::new(config)?);
    let base_url = spawn(create_router(state)).await?;

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()?;

    Ok(Harness {
        base_url,
        content,
        chain,
        client,
    })
}

pub fn default_collections() -> Vec<Value> {
    vec![
        collection_json("ape-club", "Ape Club", DROP_ADDRESS),
        collection_json("ghost-drop", "Ghost Drop", EMPTY_ADDRESS),
    ]
}

pub fn wallet() -> Address {
    WALLET_ADDRESS.parse().unwrap()
}

pub fn drop_address() -> Address {
    DROP_ADDRESS.parse().unwrap()
}

/// Parse an address field of a JSON body.
pub fn json_address(value: &Value) -> Result<Address> {
    let raw = value.as_str().ok_or_else(|| anyhow::anyhow!("not a string: {value}"))?;
    Ok(drop_types::parse_address(raw)?)
}

/// A chain whose `eth_sendTransaction` blocks until the returned gate is notified.
pub fn gated_chain() -> (ChainScript, Arc<Notify>) {
    let gate = Arc::new(Notify::new());
    let chain = ChainScript {
        send_gate: Some(Arc::clone(&gate)),
        ..ChainScript::default()
    };
    (chain, gate)
}
