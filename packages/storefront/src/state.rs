//! Application state shared across handlers.

use drop_types::Address;
use std::collections::HashSet;
use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::chain::{RpcClient, RpcContractProvider, RpcDropContract};
use crate::config::Config;
use crate::content::ContentClient;
use crate::mint::MintController;
use crate::wallet::RpcWallet;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub content: ContentClient,
    pub rpc: Arc<RpcClient>,
    pub contracts: RpcContractProvider,
    pub wallet: RwLock<RpcWallet>,
    /// Contracts with a mint awaiting the wallet.
    minting: Mutex<HashSet<Address>>,
    /// Fires on server shutdown; page-level tokens are children of it.
    pub shutdown: CancellationToken,
    pub start_time: Instant,
    pub request_count: AtomicU64,
}

impl AppState {
    /// Create application state from configuration.
    pub fn new(config: Config) -> Result<Self, crate::Error> {
        if config.content_project_id.trim().is_empty() {
            return Err(crate::Error::Config("content_project_id must be set".into()));
        }
        if config.rpc_url.trim().is_empty() || config.wallet_rpc_url.trim().is_empty() {
            return Err(crate::Error::Config(
                "rpc_url and wallet_rpc_url must be set".into(),
            ));
        }

        let rpc = Arc::new(RpcClient::new(&config.rpc_url, &config.fallback_rpc_url));
        let signer = Arc::new(RpcClient::new(&config.wallet_rpc_url, &config.wallet_rpc_url));

        info!(
            content = %config.content_base_url(),
            dataset = %config.content_dataset,
            wallet = %config.wallet_rpc_url,
            "Storefront state initialized"
        );

        Ok(Self {
            content: ContentClient::new(&config),
            contracts: RpcContractProvider::new(Arc::clone(&rpc), Arc::clone(&signer)),
            wallet: RwLock::new(RpcWallet::new(signer)),
            rpc,
            minting: Mutex::new(HashSet::new()),
            shutdown: CancellationToken::new(),
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
            config,
        })
    }

    /// Controller scoped to one page view.
    pub fn mint_controller(&self) -> MintController<RpcDropContract> {
        MintController::new(self.shutdown.child_token())
    }

    /// Marks a mint in flight for `contract`; `None` if one already is.
    pub fn begin_mint(&self, contract: Address) -> Option<MintGuard<'_>> {
        let mut minting = self.minting.lock().unwrap_or_else(|e| e.into_inner());
        if !minting.insert(contract) {
            return None;
        }
        Some(MintGuard {
            minting: &self.minting,
            contract,
        })
    }

    pub fn mints_in_flight(&self) -> usize {
        self.minting.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Clears the in-flight mark when dropped.
pub struct MintGuard<'a> {
    minting: &'a Mutex<HashSet<Address>>,
    contract: Address,
}

impl Drop for MintGuard<'_> {
    fn drop(&mut self) {
        self.minting
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.contract);
    }
}
