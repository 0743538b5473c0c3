//! Drop contract bindings (thirdweb-style `DropERC721`).
//!
//! | Read / write | Contract call |
//! |---|---|
//! | claimed supply | `nextTokenIdToClaim()` |
//! | total supply | `nextTokenIdToMint()` |
//! | claim conditions | `claimCondition()` then `getClaimConditionById(uint256)` |
//! | claim to | `claim(address,uint256,address,uint256,(bytes32[],uint256,uint256,address),bytes)` |

use alloy_primitives::{address, utils::format_ether, Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall};
use serde::Serialize;
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info};

use super::{ChainError, RpcClient};

/// Currency sentinel meaning "pay in the chain's native token".
pub const NATIVE_TOKEN: Address = address!("EeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE");

/// Upper bound on conditions read per page view.
const MAX_CONDITIONS: u64 = 16;

sol! {
    #![sol(all_derives)]

    /// Rules governing claims from a point in time.
    struct ClaimCondition {
        uint256 startTimestamp;
        uint256 maxClaimableSupply;
        uint256 supplyClaimed;
        uint256 quantityLimitPerWallet;
        bytes32 merkleRoot;
        uint256 pricePerToken;
        address currency;
        string metadata;
    }

    struct AllowlistProof {
        bytes32[] proof;
        uint256 quantityLimitPerWallet;
        uint256 pricePerToken;
        address currency;
    }

    interface IDropERC721 {
        function nextTokenIdToClaim() external view returns (uint256);
        function nextTokenIdToMint() external view returns (uint256);
        function claimCondition() external view returns (uint256 currentStartId, uint256 count);
        function getClaimConditionById(uint256 conditionId) external view returns (ClaimCondition memory condition);
        function claim(
            address receiver,
            uint256 quantity,
            address currency,
            uint256 pricePerToken,
            AllowlistProof allowlistProof,
            bytes data
        ) external payable;
    }
}

/// A submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxHandle {
    pub hash: String,
}

impl TxHandle {
    /// Accepts `0x` + 64 hex digits.
    pub fn parse(raw: &str) -> Option<Self> {
        let digits = raw.strip_prefix("0x")?;
        if digits.len() != 64 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        Some(Self {
            hash: raw.to_ascii_lowercase(),
        })
    }
}

impl ClaimCondition {
    /// Price per token in whole currency units, e.g. `"0.01"`.
    pub fn display_price(&self) -> String {
        trim_decimals(format_ether(self.pricePerToken))
    }

    pub fn is_native(&self) -> bool {
        self.currency == NATIVE_TOKEN
    }
}

/// `"0.010000000000000000"` -> `"0.01"`, `"1.000000000000000000"` -> `"1"`.
fn trim_decimals(formatted: String) -> String {
    if !formatted.contains('.') {
        return formatted;
    }
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Call data and attached value for claiming `quantity` tokens to `receiver`
/// under `condition` (public phase: empty allowlist proof, empty data).
pub fn encode_claim(receiver: Address, quantity: u64, condition: &ClaimCondition) -> (Vec<u8>, U256) {
    let call = IDropERC721::claimCall {
        receiver,
        quantity: U256::from(quantity),
        currency: condition.currency,
        pricePerToken: condition.pricePerToken,
        allowlistProof: AllowlistProof {
            proof: Vec::new(),
            quantityLimitPerWallet: U256::ZERO,
            pricePerToken: U256::MAX,
            currency: Address::ZERO,
        },
        data: Bytes::new(),
    };
    let value = if condition.is_native() {
        condition.pricePerToken.saturating_mul(U256::from(quantity))
    } else {
        U256::ZERO
    };
    (call.abi_encode(), value)
}

/// On-chain drop contract operations used by the mint flow.
pub trait DropContract: Send + Sync {
    fn address(&self) -> Address;

    /// Number of tokens claimed so far (`getAllClaimed().length`).
    fn claimed_supply(&self) -> impl Future<Output = Result<u64, ChainError>> + Send;

    fn total_supply(&self) -> impl Future<Output = Result<u64, ChainError>> + Send;

    fn claim_conditions(&self) -> impl Future<Output = Result<Vec<ClaimCondition>, ChainError>> + Send;

    fn claim_to(
        &self,
        receiver: &Address,
        quantity: u64,
    ) -> impl Future<Output = Result<TxHandle, ChainError>> + Send;
}

/// Resolves a drop contract for an address. `Ok(None)` when nothing is
/// deployed there.
pub trait ContractProvider: Send + Sync {
    type Contract: DropContract;

    fn resolve(
        &self,
        address: &Address,
    ) -> impl Future<Output = Result<Option<Self::Contract>, ChainError>> + Send;
}

/// Drop contract reached over JSON-RPC. Reads go to `chain`; claims are
/// signed and sent by the wallet endpoint behind `signer`.
pub struct RpcDropContract {
    address: Address,
    chain: Arc<RpcClient>,
    signer: Arc<RpcClient>,
}

impl RpcDropContract {
    pub fn new(address: Address, chain: Arc<RpcClient>, signer: Arc<RpcClient>) -> Self {
        Self {
            address,
            chain,
            signer,
        }
    }

    async fn read<C: SolCall>(&self, call: C) -> Result<C::Return, ChainError> {
        let raw = self.chain.call(&self.address, call.abi_encode()).await?;
        Ok(C::abi_decode_returns(&raw)?)
    }
}

impl DropContract for RpcDropContract {
    fn address(&self) -> Address {
        self.address
    }

    async fn claimed_supply(&self) -> Result<u64, ChainError> {
        let claimed = self.read(IDropERC721::nextTokenIdToClaimCall {}).await?;
        to_u64("nextTokenIdToClaim", claimed)
    }

    async fn total_supply(&self) -> Result<u64, ChainError> {
        let total = self.read(IDropERC721::nextTokenIdToMintCall {}).await?;
        to_u64("nextTokenIdToMint", total)
    }

    async fn claim_conditions(&self) -> Result<Vec<ClaimCondition>, ChainError> {
        let phase = self.read(IDropERC721::claimConditionCall {}).await?;
        let start = to_u64("currentStartId", phase.currentStartId)?;
        let count = to_u64("count", phase.count)?.min(MAX_CONDITIONS);

        let mut conditions = Vec::with_capacity(count as usize);
        for id in start..start.saturating_add(count) {
            let condition = self
                .read(IDropERC721::getClaimConditionByIdCall {
                    conditionId: U256::from(id),
                })
                .await?;
            conditions.push(condition);
        }
        debug!(contract = %self.address, count = conditions.len(), "Loaded claim conditions");
        Ok(conditions)
    }

    async fn claim_to(&self, receiver: &Address, quantity: u64) -> Result<TxHandle, ChainError> {
        let conditions = self.claim_conditions().await?;
        let condition = conditions
            .first()
            .ok_or_else(|| ChainError::Decode("drop has no claim condition".into()))?;
        let (data, value) = encode_claim(*receiver, quantity, condition);

        let tx = json!({
            "from": receiver,
            "to": self.address,
            "data": Bytes::from(data),
            "value": format!("{value:#x}"),
        });
        let hash = self.signer.send_transaction(tx).await?;
        info!(contract = %self.address, receiver = %receiver, quantity, tx_hash = %hash, "Claim submitted");
        TxHandle::parse(&hash)
            .ok_or_else(|| ChainError::Decode(format!("wallet returned malformed tx hash {hash:?}")))
    }
}

fn to_u64(field: &str, value: U256) -> Result<u64, ChainError> {
    u64::try_from(value).map_err(|_| ChainError::Decode(format!("{field} {value} exceeds u64")))
}

/// Resolves [`RpcDropContract`]s by checking for deployed code.
pub struct RpcContractProvider {
    chain: Arc<RpcClient>,
    signer: Arc<RpcClient>,
}

impl RpcContractProvider {
    pub fn new(chain: Arc<RpcClient>, signer: Arc<RpcClient>) -> Self {
        Self { chain, signer }
    }
}

impl ContractProvider for RpcContractProvider {
    type Contract = RpcDropContract;

    async fn resolve(&self, address: &Address) -> Result<Option<RpcDropContract>, ChainError> {
        let code = self.chain.get_code(address).await?;
        if code.is_empty() {
            return Ok(None);
        }
        Ok(Some(RpcDropContract::new(
            *address,
            Arc::clone(&self.chain),
            Arc::clone(&self.signer),
        )))
    }
}
