//! Bundle mining pipeline: itemsets, rules, ranked suggestions

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::domain::itemset::ItemSet;
use crate::domain::product::ProductId;
use crate::domain::rule::AssociationRule;
use crate::domain::suggestion::FbtSuggestion;
use crate::domain::transaction::Transaction;

use super::cancel::CancellationToken;
use super::itemsets::{FrequentItemsetMiner, FrequentItemsets, LevelSummary};
use super::params::MiningParameters;
use super::ranking::SuggestionRanker;
use super::rules::RuleGenerator;
use super::MiningResult;

/// Counters describing one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiningStats {
    pub transactions: usize,
    pub levels: Vec<LevelSummary>,
    pub itemsets: usize,
    pub rules: usize,
    pub suggestions: usize,
    pub anchors: usize,
    pub level_cap_reached: bool,
    /// `sha256:` digest of the canonical baskets and parameters.
    pub input_fingerprint: String,
}

/// Everything a run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiningReport {
    pub itemsets: Vec<ItemSet>,
    pub rules: Vec<AssociationRule>,
    pub suggestions: Vec<FbtSuggestion>,
    pub stats: MiningStats,
}

/// Stateless mining engine. Construct one per run (or share it; it holds only parameters).
#[derive(Debug, Clone)]
pub struct BundleMiningEngine {
    params: MiningParameters,
    cancellation: Option<CancellationToken>,
}

impl BundleMiningEngine {
    /// Validates `params` and builds an engine.
    pub fn new(params: MiningParameters) -> MiningResult<Self> {
        params.validate()?;
        Ok(Self { params, cancellation: None })
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn parameters(&self) -> &MiningParameters {
        &self.params
    }

    pub fn mine_itemsets(&self, transactions: &[Transaction]) -> MiningResult<FrequentItemsets> {
        let miner = FrequentItemsetMiner::new(self.params.min_support, self.params.max_level);
        let miner = match &self.cancellation {
            Some(token) => miner.with_cancellation(token.clone()),
            None => miner,
        };
        miner.mine(transactions)
    }

    pub fn generate_rules(
        &self,
        itemsets: &FrequentItemsets,
        transactions: &[Transaction],
    ) -> Vec<AssociationRule> {
        RuleGenerator::new(self.params.min_confidence, self.params.min_lift)
            .generate(itemsets, transactions)
    }

    pub fn rank_suggestions(&self, rules: &[AssociationRule]) -> Vec<FbtSuggestion> {
        SuggestionRanker::new(self.params.max_per_product).rank(rules)
    }

    /// Runs every stage and returns only the suggestions.
    pub fn suggest(&self, transactions: &[Transaction]) -> MiningResult<Vec<FbtSuggestion>> {
        Ok(self.run(transactions)?.suggestions)
    }

    pub fn run(&self, transactions: &[Transaction]) -> MiningResult<MiningReport> {
        let itemsets = self.mine_itemsets(transactions)?;
        let rules = self.generate_rules(&itemsets, transactions);
        let suggestions = self.rank_suggestions(&rules);

        let anchors =
            suggestions.iter().map(|suggestion| &suggestion.product_id).collect::<BTreeSet<_>>().len();
        let stats = MiningStats {
            transactions: transactions.len(),
            levels: itemsets.levels().to_vec(),
            itemsets: itemsets.len(),
            rules: rules.len(),
            suggestions: suggestions.len(),
            anchors,
            level_cap_reached: itemsets.level_cap_reached(),
            input_fingerprint: input_fingerprint(&self.params, transactions),
        };

        info!(
            event_name = "mining.run.completed",
            transactions = stats.transactions,
            itemsets = stats.itemsets,
            rules = stats.rules,
            suggestions = stats.suggestions,
            anchors = stats.anchors,
            level_cap_reached = stats.level_cap_reached,
            input_fingerprint = %stats.input_fingerprint,
            "bundle mining run completed"
        );

        Ok(MiningReport { itemsets: itemsets.into_vec(), rules, suggestions, stats })
    }

    /// One independent run per partition (shop, time window, ...), executed in parallel.
    pub fn run_partitions(
        &self,
        partitions: &BTreeMap<String, Vec<Transaction>>,
    ) -> BTreeMap<String, MiningResult<MiningReport>> {
        partitions
            .par_iter()
            .map(|(partition, transactions)| (partition.clone(), self.run(transactions)))
            .collect()
    }
}

#[derive(Serialize)]
struct CanonicalRunInput<'a> {
    params: &'a MiningParameters,
    baskets: Vec<Vec<&'a ProductId>>,
}

/// Digest over what determines the output: parameters and the multiset of baskets.
fn input_fingerprint(params: &MiningParameters, transactions: &[Transaction]) -> String {
    let mut baskets: Vec<Vec<&ProductId>> = transactions
        .iter()
        .map(|transaction| {
            let mut items: Vec<&ProductId> = transaction.items.iter().collect();
            items.sort();
            items
        })
        .collect();
    baskets.sort();

    let canonical = serde_json::to_string(&CanonicalRunInput { params, baskets })
        .unwrap_or_else(|error| format!("serialization_error:{error}"));
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    format!("sha256:{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{Duration, Utc};

    use super::BundleMiningEngine;
    use crate::domain::product::ProductId;
    use crate::domain::transaction::Transaction;
    use crate::errors::DomainError;
    use crate::mining::cancel::CancellationToken;
    use crate::mining::params::MiningParameters;

    fn baskets(rows: &[&[&str]]) -> Vec<Transaction> {
        rows.iter()
            .enumerate()
            .map(|(index, items)| {
                Transaction::new(
                    format!("order-{index}"),
                    items.iter().map(|item| ProductId::from(*item)),
                    Utc::now() - Duration::days(index as i64),
                )
            })
            .collect()
    }

    fn permissive(min_support: f64) -> MiningParameters {
        MiningParameters::default()
            .with_min_support(min_support)
            .with_min_confidence(0.0)
            .with_min_lift(0.0)
            .with_max_per_product(5)
    }

    #[test]
    fn invalid_parameters_fail_fast() {
        let error = BundleMiningEngine::new(MiningParameters::default().with_min_support(0.0))
            .expect_err("zero support must be rejected");
        assert!(matches!(error, DomainError::InvalidParameter { name: "min_support", .. }));
    }

    #[test]
    fn run_reports_every_stage() {
        let transactions = baskets(&[&["A", "B"], &["A", "B"], &["A", "C"], &["B", "C"]]);
        let report = BundleMiningEngine::new(permissive(0.5)).expect("engine").run(&transactions).expect("run");

        assert_eq!(report.itemsets.len(), 4);
        assert_eq!(report.rules.len(), 2);
        assert_eq!(report.suggestions.len(), 2);
        assert_eq!(report.stats.anchors, 2);
        assert_eq!(report.stats.transactions, 4);
        assert!(report.stats.input_fingerprint.starts_with("sha256:"));

        let a = &report.suggestions[0];
        assert_eq!(a.product_id, ProductId::from("A"));
        assert_eq!(a.bundled_products, vec![ProductId::from("B")]);
        assert!((a.confidence - 0.6667).abs() < 1e-3);
        assert!((a.lift - 0.8889).abs() < 1e-3);
    }

    #[test]
    fn zero_cap_still_mines_rules() {
        let transactions = baskets(&[&["A", "B"], &["A", "B"], &["A", "C"], &["B", "C"]]);
        let engine =
            BundleMiningEngine::new(permissive(0.5).with_max_per_product(0)).expect("engine");
        let report = engine.run(&transactions).expect("run");

        assert_eq!(report.rules.len(), 2);
        assert!(report.suggestions.is_empty());
    }

    #[test]
    fn fingerprint_ignores_order_ids_and_basket_order() {
        let engine = BundleMiningEngine::new(permissive(0.5)).expect("engine");
        let forward = baskets(&[&["a", "b"], &["c"]]);
        let mut reversed = baskets(&[&["c"], &["b", "a"]]);
        reversed[0].order_id.0 = "other".to_owned();

        let left = engine.run(&forward).expect("run").stats.input_fingerprint;
        let right = engine.run(&reversed).expect("run").stats.input_fingerprint;
        assert_eq!(left, right);

        let stricter = BundleMiningEngine::new(permissive(0.6)).expect("engine");
        assert_ne!(left, stricter.run(&forward).expect("run").stats.input_fingerprint);
    }

    #[test]
    fn cancelled_engine_returns_cancellation_error() {
        let token = CancellationToken::new();
        let engine = BundleMiningEngine::new(permissive(0.5)).expect("engine").with_cancellation(token.clone());
        token.cancel();

        let error = engine.run(&baskets(&[&["a", "b"]])).expect_err("cancelled");
        assert_eq!(error, DomainError::Cancelled { level: 1 });
    }

    #[test]
    fn partitions_are_mined_independently() {
        let mut partitions = BTreeMap::new();
        partitions.insert("shop-a".to_owned(), baskets(&[&["x", "y"], &["x", "y"]]));
        partitions.insert("shop-b".to_owned(), baskets(&[&["p"], &["q"]]));

        let engine = BundleMiningEngine::new(permissive(0.5)).expect("engine");
        let results = engine.run_partitions(&partitions);

        let shop_a = results["shop-a"].as_ref().expect("shop-a run");
        let shop_b = results["shop-b"].as_ref().expect("shop-b run");
        assert_eq!(shop_a.suggestions.len(), 2);
        assert!(shop_b.suggestions.is_empty());
        assert_eq!(shop_a.stats, engine.run(&partitions["shop-a"]).expect("run").stats);
    }
}
