use async_trait::async_trait;
use bundlewise_core::chrono::Utc;
use bundlewise_core::{
    ApplicationError, BasketSanitizer, BundleMiningEngine, FbtSuggestion, MiningParameters,
    ProductId, Transaction,
};
use bundlewise_store::{
    BundleRefresh, InMemoryOrderHistory, InMemorySuggestionStore, OrderHistorySource, OrderWindow,
    ShopId, StoreError, SuggestionStore,
};

fn engine() -> BundleMiningEngine {
    BundleMiningEngine::new(
        MiningParameters::default()
            .with_min_support(0.5)
            .with_min_confidence(0.0)
            .with_min_lift(0.0),
    )
    .expect("valid parameters")
}

async fn seeded_history(shop: &ShopId) -> InMemoryOrderHistory {
    let history = InMemoryOrderHistory::default();
    let rows: [&[&str]; 4] = [&["A", "B", "B"], &["B", "A"], &["A", "C"], &["C", "B"]];
    for (index, items) in rows.iter().enumerate() {
        history
            .record(
                shop.clone(),
                Transaction::new(
                    format!("order-{index}"),
                    items.iter().map(|item| ProductId::from(*item)),
                    Utc::now(),
                ),
            )
            .await;
    }
    history
}

#[tokio::test]
async fn refresh_mines_sanitized_orders_into_the_store() {
    let shop = ShopId("shop-1".to_string());
    let history = seeded_history(&shop).await;
    let store = InMemorySuggestionStore::default();

    let refresh = BundleRefresh::new(&history, &store, BasketSanitizer::default(), engine());
    let outcome = refresh.refresh_shop(&shop, OrderWindow::all()).await.expect("refresh");

    assert_eq!(outcome.sanitation.duplicate_items_removed, 1);
    assert_eq!(outcome.stats.transactions, 4);
    assert_eq!(outcome.stats.suggestions, 2);

    let for_a = store.list_for_product(&shop, &ProductId::from("A")).await.expect("list");
    assert_eq!(for_a.len(), 1);
    assert_eq!(for_a[0].bundled_products, vec![ProductId::from("B")]);
}

struct UnavailableSource;

#[async_trait]
impl OrderHistorySource for UnavailableSource {
    async fn load_transactions(
        &self,
        _shop_id: &ShopId,
        _window: OrderWindow,
    ) -> Result<Vec<Transaction>, StoreError> {
        Err(StoreError::Decode("platform export unavailable".to_string()))
    }
}

struct RejectingStore;

#[async_trait]
impl SuggestionStore for RejectingStore {
    async fn replace_for_shop(
        &self,
        _shop_id: &ShopId,
        _suggestions: Vec<FbtSuggestion>,
    ) -> Result<(), StoreError> {
        Err(StoreError::Encode("bundle table locked".to_string()))
    }

    async fn list_for_shop(&self, _shop_id: &ShopId) -> Result<Vec<FbtSuggestion>, StoreError> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn source_failures_surface_as_source_errors() {
    let store = InMemorySuggestionStore::default();
    let refresh = BundleRefresh::new(&UnavailableSource, &store, BasketSanitizer::default(), engine());

    let error = refresh
        .refresh_shop(&ShopId("shop-1".to_string()), OrderWindow::all())
        .await
        .expect_err("source failure");
    assert!(matches!(error, ApplicationError::Source(ref message) if message.contains("unavailable")));
}

#[tokio::test]
async fn sink_failures_surface_as_sink_errors() {
    let shop = ShopId("shop-1".to_string());
    let history = seeded_history(&shop).await;
    let refresh = BundleRefresh::new(&history, &RejectingStore, BasketSanitizer::default(), engine());

    let error = refresh.refresh_shop(&shop, OrderWindow::all()).await.expect_err("sink failure");
    assert!(matches!(error, ApplicationError::Sink(_)));
}
