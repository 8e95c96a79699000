use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::itemset::ItemSetKey;
use crate::domain::product::ProductId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

/// One historical order reduced to its distinct products.
///
/// `items` must already be de-duplicated. Use
/// [`BasketSanitizer`](crate::mining::BasketSanitizer) when the loader cannot guarantee that.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub order_id: OrderId,
    pub items: Vec<ProductId>,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        order_id: impl Into<String>,
        items: impl IntoIterator<Item = ProductId>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self { order_id: OrderId(order_id.into()), items: items.into_iter().collect(), timestamp }
    }

    pub fn contains(&self, item: &ProductId) -> bool {
        self.items.iter().any(|candidate| candidate == item)
    }

    /// True when every item of `key` appears in this basket.
    pub fn contains_all(&self, key: &ItemSetKey) -> bool {
        key.items().iter().all(|item| self.contains(item))
    }
}
