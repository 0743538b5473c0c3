//! # Drop Storefront
//!
//! Server-rendered storefront for NFT drop collections. Collection records come
//! from a headless content store; supply, price and minting go through a drop
//! contract over Ethereum JSON-RPC, signed by a wallet endpoint.
//!
//! ## Quick Start
//! ```bash
//! STOREFRONT_CONTENT_PROJECT_ID=abc123 cargo run --bin storefront
//! ```
//!
//! ## Endpoints
//! - `GET /` - Collection gallery
//! - `GET /nft/{id}` - Detail and mint page
//! - `POST /nft/{id}/mint` - Mint one token and re-render the page
//! - `POST /wallet/connect`, `POST /wallet/disconnect` - Wallet session
//! - `GET /api/nft/{id}/status`, `POST /api/nft/{id}/mint`, `GET /api/tx/{hash}` - JSON API
//! - `GET /health`, `GET /metrics` - Operational endpoints

pub mod chain;
pub mod config;
pub mod content;
mod error;
mod handlers;
pub mod metrics;
mod middleware;
pub mod mint;
pub mod notify;
pub mod pages;
mod response;
mod router;
mod state;
pub mod wallet;

pub use config::Config;
pub use error::Error;
pub use router::create as create_router;
pub use state::AppState;
