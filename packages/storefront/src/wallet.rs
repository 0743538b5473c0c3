//! Wallet session: which account (if any) the storefront mints for.

use drop_types::Address;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};

use crate::chain::{ChainError, RpcClient};

/// JSON-RPC "method not found" / EIP-1193 "unsupported method".
const UNSUPPORTED_METHOD_CODES: [i64; 2] = [-32601, 4200];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// The wallet exposed no accounts (locked or access denied).
    NoAccounts,
    Chain(ChainError),
}

impl fmt::Display for WalletError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletError::NoAccounts => write!(f, "wallet has no available accounts"),
            WalletError::Chain(e) => write!(f, "wallet error: {e}"),
        }
    }
}

impl std::error::Error for WalletError {}

impl From<ChainError> for WalletError {
    fn from(e: ChainError) -> Self {
        WalletError::Chain(e)
    }
}

/// Connection state of a wallet.
pub trait WalletSession: Send + Sync {
    fn connect(&mut self) -> impl Future<Output = Result<Address, WalletError>> + Send;

    fn disconnect(&mut self);

    fn current_address(&self) -> Option<Address>;
}

/// Session backed by a wallet JSON-RPC endpoint.
pub struct RpcWallet {
    rpc: Arc<RpcClient>,
    address: Option<Address>,
}

impl RpcWallet {
    pub fn new(rpc: Arc<RpcClient>) -> Self {
        Self { rpc, address: None }
    }

    pub fn rpc(&self) -> &Arc<RpcClient> {
        &self.rpc
    }
}

impl WalletSession for RpcWallet {
    async fn connect(&mut self) -> Result<Address, WalletError> {
        let accounts = match self.rpc.request_accounts().await {
            Ok(accounts) => accounts,
            Err(ChainError::Rpc { code, .. }) if UNSUPPORTED_METHOD_CODES.contains(&code) => {
                warn!(code, "eth_requestAccounts unsupported, falling back to eth_accounts");
                self.rpc.accounts().await?
            }
            Err(e) => return Err(e.into()),
        };
        let address = accounts.first().copied().ok_or(WalletError::NoAccounts)?;
        info!(wallet = %address, "Wallet connected");
        self.address = Some(address);
        Ok(address)
    }

    fn disconnect(&mut self) {
        if let Some(address) = self.address.take() {
            info!(wallet = %address, "Wallet disconnected");
        }
    }

    fn current_address(&self) -> Option<Address> {
        self.address
    }
}
