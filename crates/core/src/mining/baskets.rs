//! Basket clean-up before mining
//!
//! The miner assumes canonical, bounded baskets. Loaders that cannot guarantee this run their
//! orders through [`BasketSanitizer`] first.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::product::ProductId;
use crate::domain::transaction::Transaction;

use super::DEFAULT_MAX_BASKET_SIZE;

/// What the sanitizer changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitationReport {
    pub input_baskets: usize,
    pub output_baskets: usize,
    pub dropped_empty: usize,
    pub truncated: usize,
    pub duplicate_items_removed: usize,
    pub blank_items_removed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasketSanitizer {
    max_basket_size: usize,
    drop_empty: bool,
}

impl Default for BasketSanitizer {
    fn default() -> Self {
        Self { max_basket_size: DEFAULT_MAX_BASKET_SIZE, drop_empty: true }
    }
}

impl BasketSanitizer {
    pub fn new(max_basket_size: usize, drop_empty: bool) -> Self {
        Self { max_basket_size, drop_empty }
    }

    /// Trims ids, removes blanks and duplicates, sorts items canonically and caps basket size.
    ///
    /// Oversized baskets keep their first `max_basket_size` items in canonical order.
    pub fn sanitize(&self, transactions: Vec<Transaction>) -> (Vec<Transaction>, SanitationReport) {
        let mut report =
            SanitationReport { input_baskets: transactions.len(), ..SanitationReport::default() };
        let mut cleaned = Vec::with_capacity(transactions.len());

        for mut transaction in transactions {
            let raw_len = transaction.items.len();
            let mut items: Vec<ProductId> = transaction
                .items
                .into_iter()
                .map(|item| ProductId(item.0.trim().to_owned()))
                .filter(|item| !item.0.is_empty())
                .collect();
            report.blank_items_removed += raw_len - items.len();

            let trimmed_len = items.len();
            items.sort();
            items.dedup();
            report.duplicate_items_removed += trimmed_len - items.len();

            if items.len() > self.max_basket_size {
                warn!(
                    event_name = "mining.basket.truncated",
                    order_id = %transaction.order_id.0,
                    basket_size = items.len(),
                    max_basket_size = self.max_basket_size,
                    "oversized basket truncated before mining"
                );
                items.truncate(self.max_basket_size);
                report.truncated += 1;
            }

            if items.is_empty() && self.drop_empty {
                report.dropped_empty += 1;
                continue;
            }

            transaction.items = items;
            cleaned.push(transaction);
        }

        report.output_baskets = cleaned.len();
        (cleaned, report)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::BasketSanitizer;
    use crate::domain::product::ProductId;
    use crate::domain::transaction::Transaction;

    fn raw(id: &str, items: &[&str]) -> Transaction {
        Transaction::new(id, items.iter().map(|item| ProductId::from(*item)), Utc::now())
    }

    #[test]
    fn deduplicates_and_sorts_items() {
        let (cleaned, report) =
            BasketSanitizer::default().sanitize(vec![raw("1", &["pen", " ink ", "pen", ""])]);

        assert_eq!(cleaned[0].items, vec![ProductId::from("ink"), ProductId::from("pen")]);
        assert_eq!(report.duplicate_items_removed, 1);
        assert_eq!(report.blank_items_removed, 1);
    }

    #[test]
    fn drops_empty_baskets_when_configured() {
        let baskets = vec![raw("1", &[]), raw("2", &["  "]), raw("3", &["a"])];

        let (cleaned, report) = BasketSanitizer::new(10, true).sanitize(baskets.clone());
        assert_eq!(cleaned.len(), 1);
        assert_eq!(report.dropped_empty, 2);

        let (kept, _) = BasketSanitizer::new(10, false).sanitize(baskets);
        assert_eq!(kept.len(), 3);
    }

    #[test]
    fn truncates_oversized_baskets_to_canonical_prefix() {
        let (cleaned, report) =
            BasketSanitizer::new(2, true).sanitize(vec![raw("1", &["d", "c", "b", "a"])]);

        assert_eq!(cleaned[0].items, vec![ProductId::from("a"), ProductId::from("b")]);
        assert_eq!(report.truncated, 1);
        assert_eq!(report.output_baskets, 1);
    }
}
