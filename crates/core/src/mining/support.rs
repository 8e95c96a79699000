//! Exact support counting by full scan

use crate::domain::itemset::{support_fraction, ItemSetKey};
use crate::domain::transaction::Transaction;

/// Counts transactions containing an itemset by scanning the whole batch every time.
///
/// There is no index and no sampling. Every number the engine reports traces back to a scan here.
#[derive(Debug, Clone, Copy)]
pub struct SupportCounter<'a> {
    transactions: &'a [Transaction],
}

impl<'a> SupportCounter<'a> {
    pub fn new(transactions: &'a [Transaction]) -> Self {
        Self { transactions }
    }

    pub fn total(&self) -> usize {
        self.transactions.len()
    }

    pub fn count(&self, key: &ItemSetKey) -> usize {
        self.transactions.iter().filter(|transaction| transaction.contains_all(key)).count()
    }

    pub fn support(&self, key: &ItemSetKey) -> f64 {
        support_fraction(self.count(key), self.total())
    }
}
