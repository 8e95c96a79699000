use serde::{Deserialize, Serialize};

use crate::domain::itemset::ItemSetKey;
use crate::domain::product::ProductId;

/// `antecedent -> consequent`, scored against the transaction batch it was mined from.
///
/// Antecedent and consequent are disjoint and their union is the frequent itemset the rule was
/// derived from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssociationRule {
    pub antecedent: ItemSetKey,
    pub consequent: ItemSetKey,
    /// Support of `antecedent ∪ consequent`.
    pub support: f64,
    /// `support(antecedent ∪ consequent) / support(antecedent)`, in `[0, 1]`.
    pub confidence: f64,
    /// `confidence / support(consequent)`, zero when the consequent never occurs.
    pub lift: f64,
}

impl AssociationRule {
    pub fn itemset(&self) -> ItemSetKey {
        self.antecedent.union(&self.consequent)
    }

    /// The anchor product when the antecedent is a single item.
    pub fn anchor(&self) -> Option<&ProductId> {
        match self.antecedent.items() {
            [single] => Some(single),
            _ => None,
        }
    }
}
