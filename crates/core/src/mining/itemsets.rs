//! Level-wise frequent itemset search

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::itemset::{ItemSet, ItemSetKey};
use crate::domain::product::ProductId;
use crate::domain::transaction::Transaction;
use crate::errors::DomainError;

use super::cancel::CancellationToken;
use super::support::SupportCounter;
use super::MiningResult;

/// Candidate and survivor counts for one level of the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSummary {
    pub level: usize,
    pub candidates: usize,
    pub frequent: usize,
}

/// Output of the miner: every frequent itemset plus a canonical-key lookup table.
#[derive(Debug, Clone, Default)]
pub struct FrequentItemsets {
    itemsets: Vec<ItemSet>,
    index: HashMap<ItemSetKey, usize>,
    levels: Vec<LevelSummary>,
    level_cap_reached: bool,
}

impl FrequentItemsets {
    fn push_level(&mut self, summary: LevelSummary, frequent: Vec<ItemSet>) {
        for itemset in frequent {
            self.index.insert(itemset.key.clone(), self.itemsets.len());
            self.itemsets.push(itemset);
        }
        self.levels.push(summary);
    }

    pub fn get(&self, key: &ItemSetKey) -> Option<&ItemSet> {
        self.index.get(key).map(|position| &self.itemsets[*position])
    }

    pub fn contains(&self, key: &ItemSetKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemSet> {
        self.itemsets.iter()
    }

    pub fn as_slice(&self) -> &[ItemSet] {
        &self.itemsets
    }

    pub fn len(&self) -> usize {
        self.itemsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.itemsets.is_empty()
    }

    pub fn levels(&self) -> &[LevelSummary] {
        &self.levels
    }

    /// True when the search stopped at the level cap while larger candidates still existed.
    pub fn level_cap_reached(&self) -> bool {
        self.level_cap_reached
    }

    pub fn into_vec(self) -> Vec<ItemSet> {
        self.itemsets
    }
}

/// Apriori-style miner: level `k` candidates come only from joining frequent `k-1` itemsets.
#[derive(Debug, Clone)]
pub struct FrequentItemsetMiner {
    min_support: f64,
    max_level: usize,
    cancellation: Option<CancellationToken>,
}

impl FrequentItemsetMiner {
    pub fn new(min_support: f64, max_level: usize) -> Self {
        Self { min_support, max_level, cancellation: None }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn mine(&self, transactions: &[Transaction]) -> MiningResult<FrequentItemsets> {
        let mut result = FrequentItemsets::default();
        if transactions.is_empty() {
            return Ok(result);
        }

        let counter = SupportCounter::new(transactions);
        let mut level = 1;
        let mut candidates = single_item_candidates(transactions);

        loop {
            self.check_cancelled(level)?;

            let candidate_count = candidates.len();
            let frequent = self.frequent_among(&counter, candidates);
            debug!(
                event_name = "mining.level.completed",
                level,
                candidates = candidate_count,
                frequent = frequent.len(),
                "frequent itemset level evaluated"
            );

            if frequent.is_empty() {
                result.levels.push(LevelSummary { level, candidates: candidate_count, frequent: 0 });
                break;
            }

            let next = join_candidates(&frequent);
            result.push_level(
                LevelSummary { level, candidates: candidate_count, frequent: frequent.len() },
                frequent,
            );

            if next.is_empty() {
                break;
            }
            if level >= self.max_level {
                result.level_cap_reached = true;
                warn!(
                    event_name = "mining.level_cap_reached",
                    max_level = self.max_level,
                    pending_candidates = next.len(),
                    "frequent itemset search stopped at the level cap"
                );
                break;
            }

            level += 1;
            candidates = next;
        }

        Ok(result)
    }

    fn check_cancelled(&self, level: usize) -> MiningResult<()> {
        match &self.cancellation {
            Some(token) if token.is_cancelled() => Err(DomainError::Cancelled { level }),
            _ => Ok(()),
        }
    }

    fn frequent_among(
        &self,
        counter: &SupportCounter<'_>,
        candidates: BTreeSet<ItemSetKey>,
    ) -> Vec<ItemSet> {
        candidates
            .into_iter()
            .map(|key| {
                let count = counter.count(&key);
                ItemSet::new(key, count, counter.total())
            })
            .filter(|itemset| itemset.support >= self.min_support)
            .collect()
    }
}

fn single_item_candidates(transactions: &[Transaction]) -> BTreeSet<ItemSetKey> {
    transactions
        .iter()
        .flat_map(|transaction| transaction.items.iter().cloned())
        .collect::<BTreeSet<ProductId>>()
        .into_iter()
        .map(ItemSetKey::single)
        .collect()
}

/// Joins frequent `k-1` itemsets that share their first `k-2` items, then drops any candidate
/// with an infrequent `k-1` subset. The set collapses duplicate joins onto one canonical key.
fn join_candidates(previous: &[ItemSet]) -> BTreeSet<ItemSetKey> {
    let Some(first) = previous.first() else {
        return BTreeSet::new();
    };
    let prefix_len = first.len().saturating_sub(1);

    let mut by_prefix: BTreeMap<&[ProductId], Vec<&ItemSetKey>> = BTreeMap::new();
    for itemset in previous {
        by_prefix.entry(itemset.key.prefix(prefix_len)).or_default().push(&itemset.key);
    }

    let frequent: HashSet<&ItemSetKey> = previous.iter().map(|itemset| &itemset.key).collect();
    let mut candidates = BTreeSet::new();

    for group in by_prefix.values() {
        for (position, left) in group.iter().enumerate() {
            for right in &group[position + 1..] {
                let Some(tail) = right.last() else {
                    continue;
                };
                let candidate = left.with_item(tail.clone());
                if candidate.len() == left.len() + 1 && all_subsets_frequent(&candidate, &frequent) {
                    candidates.insert(candidate);
                }
            }
        }
    }

    candidates
}

fn all_subsets_frequent(candidate: &ItemSetKey, frequent: &HashSet<&ItemSetKey>) -> bool {
    candidate.items().iter().all(|dropped| {
        let subset = ItemSetKey::from(
            candidate.items().iter().filter(|item| *item != dropped).cloned().collect::<Vec<_>>(),
        );
        frequent.contains(&subset)
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::FrequentItemsetMiner;
    use crate::domain::itemset::ItemSetKey;
    use crate::domain::product::ProductId;
    use crate::domain::transaction::Transaction;
    use crate::errors::DomainError;
    use crate::mining::cancel::CancellationToken;

    fn baskets(rows: &[&[&str]]) -> Vec<Transaction> {
        rows.iter()
            .enumerate()
            .map(|(index, items)| {
                Transaction::new(
                    format!("order-{index}"),
                    items.iter().map(|item| ProductId::from(*item)),
                    Utc::now(),
                )
            })
            .collect()
    }

    fn support_of(result: &super::FrequentItemsets, items: &[&str]) -> Option<f64> {
        result.get(&ItemSetKey::from_items(items.iter().copied())).map(|itemset| itemset.support)
    }

    #[test]
    fn two_of_four_threshold_keeps_only_the_ab_pair() {
        let transactions = baskets(&[&["A", "B"], &["A", "B"], &["A", "C"], &["B", "C"]]);
        let result = FrequentItemsetMiner::new(0.5, 10).mine(&transactions).expect("mine");

        assert_eq!(support_of(&result, &["A"]), Some(0.75));
        assert_eq!(support_of(&result, &["B"]), Some(0.75));
        assert_eq!(support_of(&result, &["C"]), Some(0.5));
        assert_eq!(support_of(&result, &["A", "B"]), Some(0.5));
        assert_eq!(support_of(&result, &["A", "C"]), None);
        assert_eq!(support_of(&result, &["B", "C"]), None);
        assert_eq!(result.len(), 4);
        assert_eq!(result.get(&ItemSetKey::from_items(["B", "A"])).map(|set| set.count), Some(2));
    }

    #[test]
    fn empty_input_yields_empty_result() {
        let result = FrequentItemsetMiner::new(0.1, 10).mine(&[]).expect("mine");
        assert!(result.is_empty());
        assert!(result.levels().is_empty());
    }

    #[test]
    fn single_item_baskets_never_form_pairs() {
        let transactions = baskets(&[&["A"], &["B"], &["A"], &["C"]]);
        let result = FrequentItemsetMiner::new(0.25, 10).mine(&transactions).expect("mine");

        assert!(result.iter().all(|itemset| itemset.len() == 1));
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn finds_triples_through_prefix_join() {
        let transactions = baskets(&[
            &["bread", "butter", "jam"],
            &["bread", "butter", "jam"],
            &["bread", "butter"],
            &["jam"],
        ]);
        let result = FrequentItemsetMiner::new(0.5, 10).mine(&transactions).expect("mine");

        assert_eq!(support_of(&result, &["jam", "butter", "bread"]), Some(0.5));
        assert_eq!(result.levels().len(), 3);
        assert_eq!(result.levels()[2].frequent, 1);
        assert!(!result.level_cap_reached());
    }

    #[test]
    fn level_cap_stops_the_search_and_is_reported() {
        let transactions = baskets(&[&["a", "b", "c"], &["a", "b", "c"]]);
        let result = FrequentItemsetMiner::new(0.5, 2).mine(&transactions).expect("mine");

        assert!(result.iter().all(|itemset| itemset.len() <= 2));
        assert_eq!(result.len(), 6);
        assert!(result.level_cap_reached());
    }

    #[test]
    fn cancelled_token_stops_before_first_level() {
        let token = CancellationToken::new();
        token.cancel();
        let transactions = baskets(&[&["a", "b"]]);

        let error = FrequentItemsetMiner::new(0.5, 10)
            .with_cancellation(token)
            .mine(&transactions)
            .expect_err("cancelled run must fail");

        assert_eq!(error, DomainError::Cancelled { level: 1 });
    }

    #[test]
    fn every_subset_of_a_frequent_itemset_is_frequent() {
        let transactions = baskets(&[
            &["a", "b", "c", "d"],
            &["a", "b", "c"],
            &["a", "b", "d"],
            &["b", "c", "d"],
            &["a", "c", "d"],
        ]);
        let result = FrequentItemsetMiner::new(0.4, 10).mine(&transactions).expect("mine");

        for itemset in result.iter() {
            for subset in crate::mining::proper_subset_keys(&itemset.key) {
                assert!(result.contains(&subset), "{subset} missing under {}", itemset.key);
            }
        }
    }
}
