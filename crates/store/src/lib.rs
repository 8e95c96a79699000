//! Collaborator boundaries around the mining engine: where orders come from and where
//! generated bundles go. The platform-backed implementations live in the host service; this
//! crate ships in-memory and JSON-file versions.

pub mod json_file;
pub mod memory;
pub mod refresh;

use std::fmt;

use async_trait::async_trait;
use bundlewise_core::chrono::{DateTime, Utc};
use bundlewise_core::{ApplicationError, FbtSuggestion, ProductId, Transaction};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use json_file::{JsonFileOrderSource, JsonFileSuggestionStore, OrderRecord};
pub use memory::{InMemoryOrderHistory, InMemorySuggestionStore};
pub use refresh::{BundleRefresh, RefreshOutcome};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShopId(pub String);

impl fmt::Display for ShopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Inclusive time range of orders to load. Open ends are unbounded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OrderWindow {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl OrderWindow {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.since.map_or(true, |since| timestamp >= since)
            && self.until.map_or(true, |until| timestamp <= until)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error on `{path}`: {source}")]
    Io { path: String, source: std::io::Error },
    #[error("decode error: {0}")]
    Decode(String),
    #[error("encode error: {0}")]
    Encode(String),
}

impl StoreError {
    pub fn into_source_error(self) -> ApplicationError {
        ApplicationError::Source(self.to_string())
    }

    pub fn into_sink_error(self) -> ApplicationError {
        ApplicationError::Sink(self.to_string())
    }
}

#[async_trait]
pub trait OrderHistorySource: Send + Sync {
    async fn load_transactions(
        &self,
        shop_id: &ShopId,
        window: OrderWindow,
    ) -> Result<Vec<Transaction>, StoreError>;
}

#[async_trait]
pub trait SuggestionStore: Send + Sync {
    /// Atomically swaps a shop's suggestions for a freshly mined set.
    async fn replace_for_shop(
        &self,
        shop_id: &ShopId,
        suggestions: Vec<FbtSuggestion>,
    ) -> Result<(), StoreError>;

    async fn list_for_shop(&self, shop_id: &ShopId) -> Result<Vec<FbtSuggestion>, StoreError>;

    async fn list_for_product(
        &self,
        shop_id: &ShopId,
        product_id: &ProductId,
    ) -> Result<Vec<FbtSuggestion>, StoreError> {
        let all = self.list_for_shop(shop_id).await?;
        Ok(all.into_iter().filter(|suggestion| &suggestion.product_id == product_id).collect())
    }
}

#[cfg(test)]
mod tests {
    use bundlewise_core::chrono::{Duration, Utc};

    use super::OrderWindow;

    #[test]
    fn open_window_contains_everything() {
        assert!(OrderWindow::all().contains(Utc::now()));
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let now = Utc::now();
        let window = OrderWindow { since: Some(now - Duration::days(30)), until: Some(now) };

        assert!(window.contains(now));
        assert!(window.contains(now - Duration::days(30)));
        assert!(!window.contains(now - Duration::days(31)));
        assert!(!window.contains(now + Duration::seconds(1)));
    }
}
