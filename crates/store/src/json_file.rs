use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bundlewise_core::chrono::{DateTime, Utc};
use bundlewise_core::{FbtSuggestion, OrderId, ProductId, Transaction};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use super::{OrderHistorySource, OrderWindow, ShopId, StoreError, SuggestionStore};

/// One order as exported to JSON. `shop_id` is optional for single-shop exports.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop_id: Option<ShopId>,
    pub order_id: String,
    pub items: Vec<ProductId>,
    pub timestamp: DateTime<Utc>,
}

impl OrderRecord {
    fn belongs_to(&self, shop_id: &ShopId) -> bool {
        self.shop_id.as_ref().map_or(true, |owner| owner == shop_id)
    }

    pub fn into_transaction(self) -> Transaction {
        Transaction { order_id: OrderId(self.order_id), items: self.items, timestamp: self.timestamp }
    }
}

/// Reads a JSON array of [`OrderRecord`] from disk on every load.
#[derive(Clone, Debug)]
pub struct JsonFileOrderSource {
    path: PathBuf,
}

impl JsonFileOrderSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn read_records(&self) -> Result<Vec<OrderRecord>, StoreError> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|source| StoreError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|error| {
            StoreError::Decode(format!("{}: {error}", self.path.display()))
        })
    }
}

#[async_trait]
impl OrderHistorySource for JsonFileOrderSource {
    async fn load_transactions(
        &self,
        shop_id: &ShopId,
        window: OrderWindow,
    ) -> Result<Vec<Transaction>, StoreError> {
        let records = self.read_records().await?;
        let total = records.len();
        let transactions: Vec<Transaction> = records
            .into_iter()
            .filter(|record| record.belongs_to(shop_id) && window.contains(record.timestamp))
            .map(OrderRecord::into_transaction)
            .collect();

        debug!(
            event_name = "store.orders.loaded",
            shop_id = %shop_id,
            path = %self.path.display(),
            total,
            selected = transactions.len(),
            "orders loaded from json file"
        );
        Ok(transactions)
    }
}

/// Keeps all shops' suggestions in one pretty-printed JSON object keyed by shop id.
#[derive(Debug)]
pub struct JsonFileSuggestionStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileSuggestionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    async fn read_all(&self) -> Result<BTreeMap<ShopId, Vec<FbtSuggestion>>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => serde_json::from_str(&raw).map_err(|error| {
                StoreError::Decode(format!("{}: {error}", self.path.display()))
            }),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(source) => {
                Err(StoreError::Io { path: self.path.display().to_string(), source })
            }
        }
    }
}

#[async_trait]
impl SuggestionStore for JsonFileSuggestionStore {
    async fn replace_for_shop(
        &self,
        shop_id: &ShopId,
        suggestions: Vec<FbtSuggestion>,
    ) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut all = self.read_all().await?;
        all.insert(shop_id.clone(), suggestions);

        let encoded = serde_json::to_string_pretty(&all)
            .map_err(|error| StoreError::Encode(error.to_string()))?;
        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, encoded).await.map_err(|source| StoreError::Io {
            path: staging.display().to_string(),
            source,
        })?;
        tokio::fs::rename(&staging, &self.path).await.map_err(|source| StoreError::Io {
            path: self.path.display().to_string(),
            source,
        })
    }

    async fn list_for_shop(&self, shop_id: &ShopId) -> Result<Vec<FbtSuggestion>, StoreError> {
        let mut all = self.read_all().await?;
        Ok(all.remove(shop_id).unwrap_or_default())
    }
}
