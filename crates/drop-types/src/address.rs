//! Helpers over [`alloy_primitives::Address`] for content-store values and
//! page rendering.

use alloy_primitives::{hex, Address};

use crate::TypesError;

const ADDRESS_HEX_LEN: usize = 40;

/// Parses a `0x`-prefixed, 40-digit hex address in any letter case.
/// Bare hex is rejected; the content store always stores the prefix.
pub fn parse_address(raw: &str) -> Result<Address, TypesError> {
    let trimmed = raw.trim();
    let invalid = || TypesError::InvalidAddress(raw.to_string());
    let digits = trimmed.strip_prefix("0x").ok_or_else(invalid)?;
    if digits.len() != ADDRESS_HEX_LEN {
        return Err(invalid());
    }
    let bytes: [u8; 20] = hex::decode_to_array(digits).map_err(|_| invalid())?;
    Ok(Address::from(bytes))
}

/// Lowercase `0x` hex, without the EIP-55 checksum casing of `Display`.
pub fn lower_hex(address: &Address) -> String {
    hex::encode_prefixed(address.as_slice())
}

/// `0x123...abcde` form used in the signed-in banner.
pub fn short_address(address: &Address) -> String {
    let full = lower_hex(address);
    format!("{}...{}", &full[..5], &full[full.len() - 5..])
}
