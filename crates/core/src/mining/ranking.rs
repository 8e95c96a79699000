//! Per-anchor ranking of association rules into FBT suggestions

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::domain::product::ProductId;
use crate::domain::rule::AssociationRule;
use crate::domain::suggestion::FbtSuggestion;

/// Turns single-anchor rules into a capped, ranked suggestion list per product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestionRanker {
    max_per_product: usize,
}

impl SuggestionRanker {
    pub fn new(max_per_product: usize) -> Self {
        Self { max_per_product }
    }

    /// Ranked suggestions, grouped by anchor product.
    ///
    /// Rules with a multi-item antecedent are dropped. Within an anchor the order is confidence,
    /// then lift, then support, all descending; that order decides what survives the cap. Anchors
    /// come out in ascending id order, which callers must not rely on.
    pub fn rank(&self, rules: &[AssociationRule]) -> Vec<FbtSuggestion> {
        let mut groups: BTreeMap<&ProductId, Vec<&AssociationRule>> = BTreeMap::new();
        for rule in rules {
            if let Some(anchor) = rule.anchor() {
                groups.entry(anchor).or_default().push(rule);
            }
        }

        let mut suggestions = Vec::new();
        for (anchor, mut group) in groups {
            group.sort_by(|left, right| compare_rank(left, right));
            suggestions.extend(group.into_iter().take(self.max_per_product).map(|rule| {
                FbtSuggestion {
                    product_id: anchor.clone(),
                    bundled_products: rule.consequent.items().to_vec(),
                    support: rule.support,
                    confidence: rule.confidence,
                    lift: rule.lift,
                }
            }));
        }

        suggestions
    }
}

/// Best-first ordering: confidence, lift, support, each descending.
fn compare_rank(left: &AssociationRule, right: &AssociationRule) -> Ordering {
    descending(left.confidence, right.confidence)
        .then_with(|| descending(left.lift, right.lift))
        .then_with(|| descending(left.support, right.support))
}

fn descending(left: f64, right: f64) -> Ordering {
    right.partial_cmp(&left).unwrap_or(Ordering::Equal)
}
