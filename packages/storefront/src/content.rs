//! Headless content store client (GROQ over the HTTP query API).

use drop_types::{Collection, ImageRef};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};
use tracing::{debug, error};

use crate::config::Config;
use crate::metrics::METRICS;

const HTTP_TIMEOUT: Duration = Duration::from_secs(15);
const IMAGE_CDN: &str = "https://cdn.sanity.io/images";

/// Fields selected for every collection, with the creator reference resolved.
pub const COLLECTION_PROJECTION: &str = "{
  _id,
  title,
  address,
  description,
  nftCollectionName,
  mainImage{ asset },
  previewImage{ asset },
  slug{ current },
  creator->{ _id, name, address, slug{ current } },
}";

pub fn gallery_query() -> String {
    format!("*[_type == \"collection\"]{COLLECTION_PROJECTION}")
}

/// Parameterized by `$id`, the collection slug.
pub fn detail_query() -> String {
    format!("*[_type == \"collection\" && slug.current == $id][0]{COLLECTION_PROJECTION}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentError {
    Transport(String),
    Status(u16),
    Decode(String),
}

impl fmt::Display for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentError::Transport(msg) => write!(f, "content store unreachable: {msg}"),
            ContentError::Status(code) => write!(f, "content store returned HTTP {code}"),
            ContentError::Decode(msg) => write!(f, "unexpected content store response: {msg}"),
        }
    }
}

impl std::error::Error for ContentError {}

#[derive(Deserialize)]
struct QueryResponse<T> {
    result: T,
}

/// Read-only client for the content store. No caching: every call queries.
pub struct ContentClient {
    http: reqwest::Client,
    base_url: String,
    api_version: String,
    project_id: String,
    dataset: String,
    token: Option<String>,
}

impl ContentClient {
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url: config.content_base_url(),
            api_version: config.content_api_version.clone(),
            project_id: config.content_project_id.clone(),
            dataset: config.content_dataset.clone(),
            token: config.content_token.clone().filter(|t| !t.is_empty()),
        }
    }

    pub fn query_url(&self) -> String {
        format!(
            "{}/v{}/data/query/{}",
            self.base_url, self.api_version, self.dataset
        )
    }

    /// Runs a GROQ query. `params` values are JSON-encoded as the API expects.
    pub async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ContentError> {
        let mut pairs: Vec<(String, String)> = vec![("query".into(), query.to_string())];
        for (name, value) in params {
            let encoded = serde_json::to_string(value)
                .map_err(|e| ContentError::Decode(format!("unencodable param {name}: {e}")))?;
            pairs.push((format!("${name}"), encoded));
        }

        let mut request = self.http.get(self.query_url()).query(&pairs);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let start = Instant::now();
        let result = self.send(request).await;
        METRICS.record_content_duration(start);
        if let Err(e) = &result {
            METRICS.content_errors.fetch_add(1, Ordering::Relaxed);
            error!(error = %e, "Content query failed");
        }
        result
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ContentError> {
        let response = request
            .send()
            .await
            .map_err(|e| ContentError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ContentError::Status(status.as_u16()));
        }
        let body: QueryResponse<T> = response
            .json()
            .await
            .map_err(|e| ContentError::Decode(e.to_string()))?;
        Ok(body.result)
    }

    /// Every collection, for the gallery.
    pub async fn fetch_collections(&self) -> Result<Vec<Collection>, ContentError> {
        let collections: Option<Vec<Collection>> = self.query(&gallery_query(), &[]).await?;
        let collections = collections.unwrap_or_default();
        debug!(count = collections.len(), "Fetched collections");
        Ok(collections)
    }

    /// `Ok(None)` when no collection has this slug.
    pub async fn fetch_collection(&self, slug: &str) -> Result<Option<Collection>, ContentError> {
        let collection: Option<Collection> = self.query(&detail_query(), &[("id", slug)]).await?;
        debug!(slug, found = collection.is_some(), "Fetched collection");
        Ok(collection)
    }

    pub fn image_url(&self, image: &ImageRef) -> Option<String> {
        image_url(&self.project_id, &self.dataset, &image.asset.reference)
    }
}

/// CDN URL for an image asset ref of the form `image-<id>-<W>x<H>-<ext>`.
pub fn image_url(project_id: &str, dataset: &str, reference: &str) -> Option<String> {
    let rest = reference.strip_prefix("image-")?;
    let (rest, ext) = rest.rsplit_once('-')?;
    let (id, dimensions) = rest.rsplit_once('-')?;
    let (width, height) = dimensions.split_once('x')?;
    let numeric = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    if id.is_empty() || ext.is_empty() || !numeric(width) || !numeric(height) {
        return None;
    }
    Some(format!("{IMAGE_CDN}/{project_id}/{dataset}/{id}-{dimensions}.{ext}"))
}
