//! Association rule generation

use tracing::debug;

use crate::domain::rule::AssociationRule;
use crate::domain::transaction::Transaction;

use super::itemsets::FrequentItemsets;
use super::subsets::proper_subset_keys;
use super::support::SupportCounter;

/// Derives `antecedent -> consequent` rules from frequent itemsets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleGenerator {
    min_confidence: f64,
    min_lift: f64,
}

impl RuleGenerator {
    pub fn new(min_confidence: f64, min_lift: f64) -> Self {
        Self { min_confidence, min_lift }
    }

    /// Rules meeting both thresholds, in itemset order then subset-mask order.
    ///
    /// Antecedent support comes from the mined lookup table; an antecedent that was never frequent
    /// produces no rule. Consequent support is always re-counted against `transactions`, since a
    /// consequent need not be a mined itemset of its own.
    pub fn generate(
        &self,
        itemsets: &FrequentItemsets,
        transactions: &[Transaction],
    ) -> Vec<AssociationRule> {
        let counter = SupportCounter::new(transactions);
        let mut rules = Vec::new();
        let mut considered = 0usize;

        for itemset in itemsets.iter().filter(|itemset| itemset.len() >= 2) {
            for antecedent in proper_subset_keys(&itemset.key) {
                let Some(antecedent_set) = itemsets.get(&antecedent) else {
                    continue;
                };
                considered += 1;

                let consequent = itemset.key.difference(&antecedent);
                let confidence = ratio(itemset.support, antecedent_set.support);
                let consequent_support = counter.support(&consequent);
                let lift = ratio(confidence, consequent_support);

                if confidence >= self.min_confidence && lift >= self.min_lift {
                    rules.push(AssociationRule {
                        antecedent,
                        consequent,
                        support: itemset.support,
                        confidence,
                        lift,
                    });
                }
            }
        }

        debug!(
            event_name = "mining.rules.generated",
            considered,
            retained = rules.len(),
            "association rules scored"
        );
        rules
    }
}

/// `numerator / denominator`, or zero when the denominator is zero.
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}
