//! Per-page mint status and the gating rules for the mint button.

use serde::{Deserialize, Serialize};

use crate::TypesError;

/// Tokens claimed per mint action.
pub const MINT_QUANTITY: u64 = 1;

/// Supply and price snapshot read from the drop contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintStatus {
    pub claimed: u64,
    pub total: Option<u64>,
    pub price: Option<String>,
    pub loading: bool,
}

impl Default for MintStatus {
    fn default() -> Self {
        Self::loading()
    }
}

impl MintStatus {
    /// Status before the first read completes.
    pub fn loading() -> Self {
        Self {
            claimed: 0,
            total: None,
            price: None,
            loading: true,
        }
    }

    /// Loaded status. Rejects `claimed > total`.
    pub fn ready(claimed: u64, total: u64, price: Option<String>) -> Result<Self, TypesError> {
        if claimed > total {
            return Err(TypesError::SupplyInvariant { claimed, total });
        }
        Ok(Self {
            claimed,
            total: Some(total),
            price,
            loading: false,
        })
    }

    pub fn is_sold_out(&self) -> bool {
        self.total == Some(self.claimed)
    }

    /// Mint button state for this snapshot. `wallet_connected` is whether a
    /// wallet address is currently present.
    pub fn availability(&self, wallet_connected: bool) -> MintAvailability {
        if self.loading {
            return MintAvailability::Loading;
        }
        if self.is_sold_out() {
            return MintAvailability::SoldOut;
        }
        if !wallet_connected {
            return MintAvailability::NoWallet;
        }
        match (&self.total, &self.price) {
            (Some(_), Some(price)) => MintAvailability::Available {
                price: price.clone(),
            },
            _ => MintAvailability::Loading,
        }
    }
}

/// Whether (and why not) the mint button is enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MintAvailability {
    Loading,
    SoldOut,
    NoWallet,
    Available { price: String },
}

impl MintAvailability {
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Available { .. })
    }

    pub fn label(&self) -> String {
        match self {
            Self::Loading => "Loading".to_string(),
            Self::SoldOut => "SOLD OUT".to_string(),
            Self::NoWallet => "Sign in to Mint".to_string(),
            Self::Available { price } => format!("Mint NFT ({price} ETH)"),
        }
    }
}
