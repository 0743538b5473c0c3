//! Shared types and pure-logic utilities for the drop storefront.
//! No I/O, so clients other than the server can share these types.

mod address;
mod collection;
mod error;
mod mint_status;

pub use address::{lower_hex, parse_address, short_address};
pub use alloy_primitives::Address;
pub use collection::{Collection, CreatorRef, ImageAsset, ImageRef, Slug};
pub use error::TypesError;
pub use mint_status::{MintAvailability, MintStatus, MINT_QUANTITY};
