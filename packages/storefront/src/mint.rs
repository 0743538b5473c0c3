//! Mint flow controller.
//!
//! `Idle → Loading → Ready → (Minting → Ready)*`, with `Unavailable` when the
//! drop contract cannot be resolved or read, and `Cancelled` when the page
//! lifetime ends first. Supply and price are fetched together and applied in
//! a single update; `mint` returns a `Result` and the caller decides which
//! notifications to show.

use drop_types::{Address, MintAvailability, MintStatus, MINT_QUANTITY};
use std::fmt;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::chain::{ChainError, ClaimCondition, ContractProvider, DropContract, TxHandle};
use crate::metrics::METRICS;
use crate::notify::{ToastKind, Toasts, SUCCESS_DURATION};
use crate::wallet::WalletSession;

pub const PENDING_MESSAGE: &str = "Minting...";
pub const SUCCESS_MESSAGE: &str = "HOORAY... You Successfully Minted!";
pub const ERROR_MESSAGE: &str = "Whoops... Something went wrong!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MintPhase {
    Idle,
    Loading,
    Ready,
    Minting,
    Unavailable,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MintError {
    NotConnected,
    NotReady,
    SoldOut,
    ContractUnavailable,
    Timeout,
    Cancelled,
    Chain(ChainError),
    Transaction(String),
}

impl MintError {
    /// Precondition failures: nothing was sent and nothing is shown.
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NotConnected | Self::NotReady | Self::SoldOut)
    }
}

impl fmt::Display for MintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "no wallet connected"),
            Self::NotReady => write!(f, "drop contract not loaded"),
            Self::SoldOut => write!(f, "collection is sold out"),
            Self::ContractUnavailable => write!(f, "no drop contract at this address"),
            Self::Timeout => write!(f, "timed out loading drop contract"),
            Self::Cancelled => write!(f, "page closed before load completed"),
            Self::Chain(e) => write!(f, "{e}"),
            Self::Transaction(reason) => write!(f, "claim transaction failed: {reason}"),
        }
    }
}

impl std::error::Error for MintError {}

impl From<ChainError> for MintError {
    fn from(e: ChainError) -> Self {
        Self::Chain(e)
    }
}

/// Per-page mint state for one drop contract.
pub struct MintController<C> {
    contract: Option<C>,
    phase: MintPhase,
    status: MintStatus,
    cancel: CancellationToken,
}

impl<C: DropContract> MintController<C> {
    /// `cancel` should fire when the page that owns this controller goes away.
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            contract: None,
            phase: MintPhase::Idle,
            status: MintStatus::loading(),
            cancel,
        }
    }

    pub fn phase(&self) -> MintPhase {
        self.phase
    }

    pub fn status(&self) -> &MintStatus {
        &self.status
    }

    pub fn contract(&self) -> Option<&C> {
        self.contract.as_ref()
    }

    pub fn availability(&self, wallet: Option<&Address>) -> MintAvailability {
        match self.phase {
            MintPhase::Ready | MintPhase::Minting => self.status.availability(wallet.is_some()),
            _ => MintAvailability::Loading,
        }
    }

    /// Resolves the contract at `address` and reads supply and price.
    pub async fn load<P>(
        &mut self,
        provider: &P,
        address: &Address,
        timeout: Duration,
    ) -> Result<&MintStatus, MintError>
    where
        P: ContractProvider<Contract = C>,
    {
        self.phase = MintPhase::Loading;
        self.status = MintStatus::loading();
        debug!(contract = %address, "Loading drop contract");

        let work = async {
            let contract = provider
                .resolve(address)
                .await?
                .ok_or(MintError::ContractUnavailable)?;
            let status = fetch_status(&contract).await?;
            Ok::<_, MintError>((contract, status))
        };

        let outcome = tokio::select! {
            _ = self.cancel.cancelled() => Err(MintError::Cancelled),
            res = tokio::time::timeout(timeout, work) => res.unwrap_or(Err(MintError::Timeout)),
        };

        match outcome {
            Ok((contract, status)) => {
                self.contract = Some(contract);
                self.status = status;
                self.phase = MintPhase::Ready;
                Ok(&self.status)
            }
            Err(MintError::Cancelled) => {
                debug!(contract = %address, "Load cancelled");
                self.phase = MintPhase::Cancelled;
                Err(MintError::Cancelled)
            }
            Err(e) => {
                warn!(contract = %address, error = %e, "Drop contract unavailable");
                self.status.loading = false;
                self.phase = MintPhase::Unavailable;
                Err(e)
            }
        }
    }

    /// Re-reads supply and price for an already loaded contract.
    pub async fn refresh(&mut self, timeout: Duration) -> Result<&MintStatus, MintError> {
        if self.phase != MintPhase::Ready {
            return Err(MintError::NotReady);
        }
        let contract = self.contract.as_ref().ok_or(MintError::NotReady)?;
        let outcome = tokio::select! {
            _ = self.cancel.cancelled() => Err(MintError::Cancelled),
            res = tokio::time::timeout(timeout, fetch_status(contract)) => {
                res.unwrap_or(Err(MintError::Timeout))
            }
        };
        self.status = outcome?;
        Ok(&self.status)
    }

    fn check_ready<W: WalletSession>(&self, wallet: &W) -> Result<Address, MintError> {
        let receiver = wallet.current_address().ok_or(MintError::NotConnected)?;
        if self.phase != MintPhase::Ready || self.contract.is_none() {
            return Err(MintError::NotReady);
        }
        if self.status.is_sold_out() {
            return Err(MintError::SoldOut);
        }
        // Without a claim condition there is no price to pay.
        if self.status.price.is_none() {
            return Err(MintError::NotReady);
        }
        Ok(receiver)
    }

    /// Claims one token to the connected wallet. Precondition failures return
    /// an error without touching the chain.
    pub async fn mint<W: WalletSession>(&mut self, wallet: &W) -> Result<TxHandle, MintError> {
        let receiver = self.check_ready(wallet)?;
        let Some(contract) = self.contract.as_ref() else {
            return Err(MintError::NotReady);
        };

        self.phase = MintPhase::Minting;
        self.status.loading = true;
        METRICS.mint_attempts.fetch_add(1, Ordering::Relaxed);

        let result = contract.claim_to(&receiver, MINT_QUANTITY).await;

        self.status.loading = false;
        self.phase = MintPhase::Ready;
        result.map_err(|e| MintError::Transaction(e.to_string()))
    }

    /// Runs [`mint`](Self::mint) wrapped in pending / success / error toasts.
    pub async fn mint_and_notify<W: WalletSession>(
        &mut self,
        wallet: &W,
        toasts: &mut Toasts,
    ) -> Result<TxHandle, MintError> {
        self.check_ready(wallet)?;

        let pending = toasts.raise(ToastKind::Pending, PENDING_MESSAGE, None);
        let result = self.mint(wallet).await;
        toasts.dismiss(pending);

        match &result {
            Ok(tx) => {
                METRICS.mint_success.fetch_add(1, Ordering::Relaxed);
                info!(tx_hash = %tx.hash, "Mint succeeded");
                toasts.raise(ToastKind::Success, SUCCESS_MESSAGE, Some(SUCCESS_DURATION));
            }
            Err(e) => {
                METRICS.mint_errors.fetch_add(1, Ordering::Relaxed);
                error!(error = %e, "Mint failed");
                toasts.raise(ToastKind::Error, ERROR_MESSAGE, None);
            }
        }
        result
    }
}

/// Claimed supply, total supply and claim conditions in one joined read.
async fn fetch_status<C: DropContract>(contract: &C) -> Result<MintStatus, MintError> {
    let (claimed, total, conditions) = tokio::try_join!(
        contract.claimed_supply(),
        contract.total_supply(),
        contract.claim_conditions(),
    )?;
    let price = conditions.first().map(ClaimCondition::display_price);
    MintStatus::ready(claimed, total, price)
        .map_err(|e| MintError::Chain(ChainError::Decode(e.to_string())))
}
