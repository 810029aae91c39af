//! Catalog search: `POST {base}/search`.
//!
//! A non-success status or a transport failure fails the call. A body that
//! does not have the expected shape does not: it is logged and whatever
//! products could be decoded are returned, possibly none.

use tracing::{debug, info, warn};

use crate::client::ApiClient;
use crate::error::{ApiError, ClientError};
use crate::types::{Product, SearchFilters, SearchRequest, SearchResponse};

/// Default number of products returned per step.
pub const DEFAULT_LIMIT: usize = 10;

const SEARCH_FAILED: &str = "search request failed";

impl ApiClient {
    /// Search the catalog. Single attempt, no caching; at most `limit`
    /// products are returned, in response order.
    pub async fn fetch_products(
        &self,
        filters: &SearchFilters,
        limit: usize,
    ) -> Result<Vec<Product>, ApiError> {
        self.try_fetch_products(filters, limit)
            .await
            .map_err(|cause| ApiError::from_cause(cause, SEARCH_FAILED))
    }

    async fn try_fetch_products(
        &self,
        filters: &SearchFilters,
        limit: usize,
    ) -> Result<Vec<Product>, ClientError> {
        debug!(?filters, limit, "fetching products");
        let response = self
            .http()
            .post(self.endpoint("search"))
            .json(&SearchRequest { filters })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "search request failed");
            return Err(ApiError::new(status.as_u16(), SEARCH_FAILED).into());
        }

        let body = response.bytes().await?;
        let mut products = decode_products(&body);
        if products.len() > limit {
            debug!(returned = products.len(), limit, "truncating products to limit");
            products.truncate(limit);
        }
        info!(
            count = products.len(),
            ids = ?products.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
            "products returned"
        );
        Ok(products)
    }
}

/// Decode a search body, tolerating shape drift.
fn decode_products(body: &[u8]) -> Vec<Product> {
    if let Ok(response) = serde_json::from_slice::<SearchResponse>(body) {
        return response.products;
    }

    let value: serde_json::Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "search response is not JSON");
            return Vec::new();
        }
    };
    let Some(items) = value.get("products").and_then(|p| p.as_array()) else {
        warn!(response = %value, "no products array in search response");
        return Vec::new();
    };

    // Any object decodes into a product; only non-objects are dropped.
    let products: Vec<Product> = items
        .iter()
        .filter(|item| item.is_object())
        .filter_map(|item| serde_json::from_value(item.clone()).ok())
        .collect();
    if products.len() < items.len() {
        warn!(
            skipped = items.len() - products.len(),
            "malformed products in search response"
        );
    }
    products
}
