//! Collection records as projected by the content store query.

use serde::{Deserialize, Deserializer, Serialize};

use alloy_primitives::Address;

use crate::TypesError;

/// URL-safe collection identifier (`slug { current }`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slug {
    pub current: String,
}

/// Reference to an uploaded image asset (`asset._ref`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    #[serde(rename = "_ref")]
    pub reference: String,
    #[serde(rename = "_type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Image field wrapper (`mainImage { asset }`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub asset: ImageAsset,
}

/// Resolved `creator->` reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorRef {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub address: String,
    #[serde(default)]
    pub slug: Option<Slug>,
}

/// A drop collection. Read-only for the lifetime of a page render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub nft_collection_name: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub address: String,
    #[serde(default)]
    pub main_image: Option<ImageRef>,
    #[serde(default)]
    pub preview_image: Option<ImageRef>,
    pub slug: Slug,
    #[serde(default)]
    pub creator: Option<CreatorRef>,
}

impl Collection {
    /// Drop contract address; minting is only attempted when this parses.
    pub fn contract_address(&self) -> Result<Address, TypesError> {
        crate::parse_address(&self.address)
    }

    pub fn slug(&self) -> &str {
        &self.slug.current
    }
}

/// The content store returns `null` for unset fields.
fn nullable_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
