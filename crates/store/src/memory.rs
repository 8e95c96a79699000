use std::collections::HashMap;

use tokio::sync::RwLock;

use bundlewise_core::{FbtSuggestion, Transaction};

use super::{OrderHistorySource, OrderWindow, ShopId, StoreError, SuggestionStore};

#[derive(Default)]
pub struct InMemoryOrderHistory {
    orders: RwLock<HashMap<ShopId, Vec<Transaction>>>,
}

impl InMemoryOrderHistory {
    pub async fn record(&self, shop_id: ShopId, transaction: Transaction) {
        let mut orders = self.orders.write().await;
        orders.entry(shop_id).or_default().push(transaction);
    }
}

#[async_trait::async_trait]
impl OrderHistorySource for InMemoryOrderHistory {
    async fn load_transactions(
        &self,
        shop_id: &ShopId,
        window: OrderWindow,
    ) -> Result<Vec<Transaction>, StoreError> {
        let orders = self.orders.read().await;
        Ok(orders
            .get(shop_id)
            .map(|transactions| {
                transactions
                    .iter()
                    .filter(|transaction| window.contains(transaction.timestamp))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct InMemorySuggestionStore {
    suggestions: RwLock<HashMap<ShopId, Vec<FbtSuggestion>>>,
}

#[async_trait::async_trait]
impl SuggestionStore for InMemorySuggestionStore {
    async fn replace_for_shop(
        &self,
        shop_id: &ShopId,
        suggestions: Vec<FbtSuggestion>,
    ) -> Result<(), StoreError> {
        let mut stored = self.suggestions.write().await;
        stored.insert(shop_id.clone(), suggestions);
        Ok(())
    }

    async fn list_for_shop(&self, shop_id: &ShopId) -> Result<Vec<FbtSuggestion>, StoreError> {
        let stored = self.suggestions.read().await;
        Ok(stored.get(shop_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use bundlewise_core::chrono::{Duration, Utc};
    use bundlewise_core::{FbtSuggestion, ProductId, Transaction};

    use crate::{
        InMemoryOrderHistory, InMemorySuggestionStore, OrderHistorySource, OrderWindow, ShopId,
        SuggestionStore,
    };

    fn suggestion(anchor: &str, bundled: &str) -> FbtSuggestion {
        FbtSuggestion {
            product_id: ProductId::from(anchor),
            bundled_products: vec![ProductId::from(bundled)],
            support: 0.2,
            confidence: 0.6,
            lift: 1.4,
        }
    }

    #[tokio::test]
    async fn order_history_is_scoped_by_shop_and_window() {
        let history = InMemoryOrderHistory::default();
        let now = Utc::now();
        let shop = ShopId("shop-1".to_string());

        history
            .record(shop.clone(), Transaction::new("recent", [ProductId::from("a")], now))
            .await;
        history
            .record(
                shop.clone(),
                Transaction::new("stale", [ProductId::from("b")], now - Duration::days(400)),
            )
            .await;
        history
            .record(ShopId("shop-2".to_string()), Transaction::new("other", Vec::<ProductId>::new(), now))
            .await;

        let window = OrderWindow { since: Some(now - Duration::days(90)), until: None };
        let loaded = history.load_transactions(&shop, window).await.expect("load orders");

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].order_id.0, "recent");
    }

    #[tokio::test]
    async fn replacing_suggestions_discards_the_previous_run() {
        let store = InMemorySuggestionStore::default();
        let shop = ShopId("shop-1".to_string());

        store
            .replace_for_shop(&shop, vec![suggestion("a", "b"), suggestion("c", "d")])
            .await
            .expect("first replace");
        store.replace_for_shop(&shop, vec![suggestion("a", "e")]).await.expect("second replace");

        let all = store.list_for_shop(&shop).await.expect("list shop");
        assert_eq!(all, vec![suggestion("a", "e")]);

        let for_c =
            store.list_for_product(&shop, &ProductId::from("c")).await.expect("list product");
        assert!(for_c.is_empty());
    }
}
