use bundlewise_core::{
    ApplicationError, BasketSanitizer, BundleMiningEngine, MiningStats, SanitationReport,
};
use tracing::info;

use super::{OrderHistorySource, OrderWindow, ShopId, SuggestionStore};

/// Summary of one shop refresh.
#[derive(Clone, Debug, PartialEq)]
pub struct RefreshOutcome {
    pub shop_id: ShopId,
    pub sanitation: SanitationReport,
    pub stats: MiningStats,
}

/// Load orders, clean baskets, mine, and replace the shop's stored bundles.
pub struct BundleRefresh<'a> {
    source: &'a dyn OrderHistorySource,
    store: &'a dyn SuggestionStore,
    sanitizer: BasketSanitizer,
    engine: BundleMiningEngine,
}

impl<'a> BundleRefresh<'a> {
    pub fn new(
        source: &'a dyn OrderHistorySource,
        store: &'a dyn SuggestionStore,
        sanitizer: BasketSanitizer,
        engine: BundleMiningEngine,
    ) -> Self {
        Self { source, store, sanitizer, engine }
    }

    pub async fn refresh_shop(
        &self,
        shop_id: &ShopId,
        window: OrderWindow,
    ) -> Result<RefreshOutcome, ApplicationError> {
        let raw = self
            .source
            .load_transactions(shop_id, window)
            .await
            .map_err(|error| error.into_source_error())?;
        let (transactions, sanitation) = self.sanitizer.sanitize(raw);

        let report = self.engine.run(&transactions)?;
        self.store
            .replace_for_shop(shop_id, report.suggestions)
            .await
            .map_err(|error| error.into_sink_error())?;

        info!(
            event_name = "store.refresh.completed",
            shop_id = %shop_id,
            baskets = sanitation.output_baskets,
            truncated = sanitation.truncated,
            suggestions = report.stats.suggestions,
            "bundle suggestions refreshed"
        );

        Ok(RefreshOutcome { shop_id: shop_id.clone(), sanitation, stats: report.stats })
    }
}
