//! HTTP request handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Extension, Form, Json};
use drop_types::{Address, Collection};
use serde::Deserialize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::chain::{RpcDropContract, TxHandle};
use crate::error::Error;
use crate::metrics::METRICS;
use crate::middleware::RequestId;
use crate::mint::{MintController, MintError};
use crate::notify::{ToastKind, Toasts};
use crate::pages::{self, CollectionCard, DetailView};
use crate::response::{HealthResponse, MintResponse, StatusResponse, TxStatusResponse};
use crate::state::AppState;
use crate::wallet::WalletSession;

const IN_FLIGHT_MESSAGE: &str = "A mint for this collection is already in progress";

/// Error rendered as an HTML page.
pub struct PageError {
    brand: String,
    error: Error,
}

impl PageError {
    fn new(state: &AppState, error: Error) -> Self {
        Self {
            brand: state.config.brand.clone(),
            error,
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.error.status();
        let body = match &self.error {
            Error::NotFound(slug) => pages::not_found(&self.brand, slug),
            other => {
                error!(error = %other, "Page render failed");
                pages::error_page(&self.brand, &other.to_string())
            }
        };
        (status, Html(body)).into_response()
    }
}

fn count_request(state: &AppState) {
    state.request_count.fetch_add(1, Ordering::Relaxed);
}

async fn load_collection(state: &AppState, slug: &str) -> Result<Collection, Error> {
    match state.content.fetch_collection(slug).await? {
        Some(collection) => Ok(collection),
        None => {
            METRICS.page_not_found.fetch_add(1, Ordering::Relaxed);
            info!(slug, "Collection not found");
            Err(Error::NotFound(slug.to_string()))
        }
    }
}

/// Loads the drop contract behind `collection`. The flag is true when minting
/// cannot be offered for this page view.
async fn load_mint(
    state: &AppState,
    collection: &Collection,
) -> (MintController<RpcDropContract>, Option<Address>, bool) {
    let mut controller = state.mint_controller();
    let address = match collection.contract_address() {
        Ok(address) => address,
        Err(e) => {
            warn!(slug = collection.slug(), error = %e, "Collection has no valid contract address");
            return (controller, None, true);
        }
    };
    let unavailable = match controller
        .load(&state.contracts, &address, state.config.mint_load_timeout())
        .await
    {
        Ok(_) | Err(MintError::Cancelled) => false,
        Err(_) => true,
    };
    (controller, Some(address), unavailable)
}

fn render_detail(
    state: &AppState,
    collection: &Collection,
    controller: &MintController<RpcDropContract>,
    unavailable: bool,
    wallet: Option<Address>,
    toasts: &Toasts,
) -> String {
    METRICS.page_renders.fetch_add(1, Ordering::Relaxed);
    let image = |img: &Option<drop_types::ImageRef>| img.as_ref().and_then(|i| state.content.image_url(i));
    pages::detail(&DetailView {
        brand: &state.config.brand,
        collection,
        main_image_url: image(&collection.main_image),
        preview_image_url: image(&collection.preview_image),
        wallet,
        status: controller.status(),
        availability: controller.availability(wallet.as_ref()),
        unavailable,
        toasts: toasts.active(),
    })
}

// --- Pages ---

/// Gallery of every collection. `GET /`
pub async fn gallery(State(state): State<Arc<AppState>>) -> Result<Html<String>, PageError> {
    count_request(&state);
    let collections = state
        .content
        .fetch_collections()
        .await
        .map_err(|e| PageError::new(&state, e.into()))?;

    let cards: Vec<CollectionCard> = collections
        .iter()
        .map(|c| CollectionCard {
            slug: c.slug().to_string(),
            title: c.title.clone(),
            description: c.description.clone(),
            preview_url: c
                .preview_image
                .as_ref()
                .and_then(|i| state.content.image_url(i)),
        })
        .collect();

    METRICS.page_renders.fetch_add(1, Ordering::Relaxed);
    Ok(Html(pages::gallery(&state.config.brand, &cards)))
}

/// Detail and mint page. `GET /nft/{id}`
pub async fn detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Html<String>, PageError> {
    count_request(&state);
    let collection = load_collection(&state, &id)
        .await
        .map_err(|e| PageError::new(&state, e))?;

    let wallet = state.wallet.read().await.current_address();
    let (controller, _, unavailable) = load_mint(&state, &collection).await;

    Ok(Html(render_detail(
        &state,
        &collection,
        &controller,
        unavailable,
        wallet,
        &Toasts::new(),
    )))
}

/// Mint one token, then re-render the page with the outcome. `POST /nft/{id}/mint`
pub async fn mint_page(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    req_id: Option<Extension<RequestId>>,
) -> Result<Response, PageError> {
    count_request(&state);
    let req_id = req_id.map(|Extension(r)| r.0).unwrap_or_default();
    let collection = load_collection(&state, &id)
        .await
        .map_err(|e| PageError::new(&state, e))?;

    let wallet = state.wallet.read().await;
    let (mut controller, address, unavailable) = load_mint(&state, &collection).await;
    let mut toasts = Toasts::new();
    let mut status = StatusCode::OK;

    match address.filter(|_| !unavailable) {
        None => {
            debug!(req_id = %req_id, slug = collection.slug(), "Mint ignored, contract not loaded");
        }
        Some(address) => match state.begin_mint(address) {
            None => {
                METRICS.mint_conflicts.fetch_add(1, Ordering::Relaxed);
                warn!(req_id = %req_id, contract = %address, "Mint already in flight");
                toasts.raise(ToastKind::Error, IN_FLIGHT_MESSAGE, None);
                status = StatusCode::CONFLICT;
            }
            Some(_guard) => {
                info!(req_id = %req_id, contract = %address, "Minting");
                if controller.mint_and_notify(&*wallet, &mut toasts).await.is_ok() {
                    if let Err(e) = controller.refresh(state.config.mint_load_timeout()).await {
                        warn!(req_id = %req_id, contract = %address, error = %e, "Refresh after mint failed");
                    }
                }
            }
        },
    }

    let html = render_detail(
        &state,
        &collection,
        &controller,
        unavailable,
        wallet.current_address(),
        &toasts,
    );
    Ok((status, Html(html)).into_response())
}

#[derive(Deserialize)]
pub struct ReturnTo {
    #[serde(default)]
    return_to: Option<String>,
}

impl ReturnTo {
    /// Local paths only.
    fn target(&self) -> &str {
        match self.return_to.as_deref() {
            Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
            _ => "/",
        }
    }
}

/// `POST /wallet/connect`
pub async fn connect_wallet(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ReturnTo>,
) -> Result<Redirect, PageError> {
    count_request(&state);
    state
        .wallet
        .write()
        .await
        .connect()
        .await
        .map_err(|e| PageError::new(&state, e.into()))?;
    Ok(Redirect::to(form.target()))
}

/// `POST /wallet/disconnect`
pub async fn disconnect_wallet(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ReturnTo>,
) -> Redirect {
    count_request(&state);
    state.wallet.write().await.disconnect();
    Redirect::to(form.target())
}

// --- JSON API ---

/// Supply, price and button state. `GET /api/nft/{id}/status`
pub async fn api_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, Error> {
    count_request(&state);
    let collection = load_collection(&state, &id).await?;
    let address = collection
        .contract_address()
        .map_err(|_| Error::Mint(MintError::ContractUnavailable))?;
    let wallet = state.wallet.read().await.current_address();

    let mut controller = state.mint_controller();
    controller
        .load(&state.contracts, &address, state.config.mint_load_timeout())
        .await?;
    let availability = controller.availability(wallet.as_ref());

    Ok(Json(StatusResponse {
        slug: collection.slug().to_string(),
        address,
        status: controller.status().clone(),
        label: availability.label(),
        availability,
    }))
}

/// `POST /api/nft/{id}/mint`
pub async fn api_mint(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    req_id: Option<Extension<RequestId>>,
) -> Result<Json<MintResponse>, Error> {
    count_request(&state);
    let req_id = req_id.map(|Extension(r)| r.0).unwrap_or_default();
    let collection = load_collection(&state, &id).await?;
    let address = collection
        .contract_address()
        .map_err(|_| Error::Mint(MintError::ContractUnavailable))?;

    let wallet = state.wallet.read().await;
    let mut controller = state.mint_controller();
    controller
        .load(&state.contracts, &address, state.config.mint_load_timeout())
        .await?;

    let Some(_guard) = state.begin_mint(address) else {
        METRICS.mint_conflicts.fetch_add(1, Ordering::Relaxed);
        warn!(req_id = %req_id, contract = %address, "Mint already in flight");
        return Err(Error::MintInFlight);
    };

    let tx = controller
        .mint_and_notify(&*wallet, &mut Toasts::new())
        .await?;
    info!(req_id = %req_id, tx_hash = %tx.hash, "Mint submitted via API");
    Ok(Json(MintResponse::ok(tx.hash)))
}

/// Receipt lookup. `GET /api/tx/{hash}`
pub async fn tx_status(
    State(state): State<Arc<AppState>>,
    Path(hash): Path<String>,
) -> Result<Json<TxStatusResponse>, Error> {
    count_request(&state);
    let tx = TxHandle::parse(&hash)
        .ok_or_else(|| Error::BadRequest("invalid transaction hash format".into()))?;

    let receipt = state.rpc.transaction_receipt(&tx.hash).await?;
    let response = match receipt {
        None => TxStatusResponse {
            status: "pending",
            tx_hash: tx.hash,
            block_number: None,
        },
        Some(receipt) => {
            let succeeded = receipt.get("status").and_then(|s| s.as_str()) == Some("0x1");
            TxStatusResponse {
                status: if succeeded { "success" } else { "failed" },
                tx_hash: tx.hash,
                block_number: receipt.get("blockNumber").cloned(),
            }
        }
    };
    Ok(Json(response))
}

// --- Operational ---

/// Health check with basic metrics.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.start_time.elapsed().as_secs(),
        requests: state.request_count.load(Ordering::Relaxed),
        active_rpc: state.rpc.active_url().to_string(),
        failovers: state.rpc.failover_count(),
        wallet_connected: state.wallet.read().await.current_address().is_some(),
    })
}

/// Prometheus metrics in text exposition format.
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let wallet_connected = state.wallet.read().await.current_address().is_some();
    let body = METRICS.render(wallet_connected, state.mints_in_flight());
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4",
        )],
        body,
    )
}
