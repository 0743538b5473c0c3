/// Validation error for storefront data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypesError {
    InvalidAddress(String),
    SupplyInvariant { claimed: u64, total: u64 },
}

impl std::fmt::Display for TypesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAddress(raw) => write!(f, "invalid address: {raw:?}"),
            Self::SupplyInvariant { claimed, total } => {
                write!(f, "claimed supply {claimed} exceeds total supply {total}")
            }
        }
    }
}

impl std::error::Error for TypesError {}
