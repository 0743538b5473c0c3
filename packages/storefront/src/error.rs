//! Error types for the storefront.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::fmt;

use crate::chain::ChainError;
use crate::content::ContentError;
use crate::mint::MintError;
use crate::wallet::WalletError;

/// Storefront error type.
#[derive(Debug)]
pub enum Error {
    /// Configuration error.
    Config(String),
    /// Content store query failed.
    Content(ContentError),
    /// RPC communication error.
    Chain(ChainError),
    /// Wallet session error.
    Wallet(WalletError),
    /// No collection for the requested slug.
    NotFound(String),
    /// Mint flow error.
    Mint(MintError),
    /// A mint for this contract is already awaiting the wallet.
    MintInFlight,
    /// Malformed request input.
    BadRequest(String),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Content(_) | Error::Chain(_) | Error::Wallet(_) => StatusCode::BAD_GATEWAY,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::MintInFlight => StatusCode::CONFLICT,
            Error::Mint(e) => match e {
                MintError::NotConnected => StatusCode::BAD_REQUEST,
                MintError::SoldOut => StatusCode::CONFLICT,
                MintError::NotReady
                | MintError::ContractUnavailable
                | MintError::Timeout
                | MintError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
                MintError::Chain(_) | MintError::Transaction(_) => StatusCode::BAD_GATEWAY,
            },
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "config error: {msg}"),
            Error::Content(e) => write!(f, "{e}"),
            Error::Chain(e) => write!(f, "{e}"),
            Error::Wallet(e) => write!(f, "{e}"),
            Error::NotFound(slug) => write!(f, "no collection named {slug:?}"),
            Error::Mint(e) => write!(f, "mint error: {e}"),
            Error::MintInFlight => write!(f, "a mint is already in progress for this collection"),
            Error::BadRequest(msg) => write!(f, "bad request: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<ContentError> for Error {
    fn from(e: ContentError) -> Self {
        Error::Content(e)
    }
}

impl From<ChainError> for Error {
    fn from(e: ChainError) -> Self {
        Error::Chain(e)
    }
}

impl From<WalletError> for Error {
    fn from(e: WalletError) -> Self {
        Error::Wallet(e)
    }
}

impl From<MintError> for Error {
    fn from(e: MintError) -> Self {
        Error::Mint(e)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "success": false,
            "error": self.to_string()
        });
        (self.status(), Json(body)).into_response()
    }
}
