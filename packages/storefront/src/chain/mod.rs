//! Chain access: JSON-RPC transport and drop contract bindings.

pub mod drop_contract;
pub mod rpc;

pub use drop_contract::{
    AllowlistProof, ClaimCondition, ContractProvider, DropContract, IDropERC721,
    RpcContractProvider, RpcDropContract, TxHandle,
};
pub use rpc::RpcClient;

use std::fmt;

/// Chain communication error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// HTTP transport failure or non-JSON response.
    Transport(String),
    /// JSON-RPC error object returned by the node or wallet.
    Rpc { code: i64, message: String },
    /// Response did not decode as the expected ABI type.
    Decode(String),
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainError::Transport(msg) => write!(f, "rpc transport error: {msg}"),
            ChainError::Rpc { code, message } => write!(f, "rpc error {code}: {message}"),
            ChainError::Decode(msg) => write!(f, "abi decode error: {msg}"),
        }
    }
}

impl std::error::Error for ChainError {}

impl From<alloy_sol_types::Error> for ChainError {
    fn from(e: alloy_sol_types::Error) -> Self {
        ChainError::Decode(e.to_string())
    }
}
