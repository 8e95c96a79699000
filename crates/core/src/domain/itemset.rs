use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;

/// Canonical identity of a set of products.
///
/// Items are always held sorted ascending and de-duplicated. Every constructor enforces that,
/// so two keys built from the same products in any order compare and hash equal. Prefix joins,
/// subset enumeration and support lookups all rely on this single ordering.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<ProductId>", into = "Vec<ProductId>")]
pub struct ItemSetKey(Vec<ProductId>);

impl ItemSetKey {
    pub fn from_items<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ProductId>,
    {
        Self::from(items.into_iter().map(Into::into).collect::<Vec<ProductId>>())
    }

    pub fn single(item: ProductId) -> Self {
        Self(vec![item])
    }

    pub fn items(&self) -> &[ProductId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, item: &ProductId) -> bool {
        self.0.binary_search(item).is_ok()
    }

    /// First `len` items in canonical order.
    pub fn prefix(&self, len: usize) -> &[ProductId] {
        &self.0[..len.min(self.0.len())]
    }

    pub fn last(&self) -> Option<&ProductId> {
        self.0.last()
    }

    /// Items of `self` that are not in `other`, still canonical.
    pub fn difference(&self, other: &ItemSetKey) -> ItemSetKey {
        Self(self.0.iter().filter(|item| !other.contains(item)).cloned().collect())
    }

    pub fn union(&self, other: &ItemSetKey) -> ItemSetKey {
        Self::from(self.0.iter().chain(other.0.iter()).cloned().collect::<Vec<_>>())
    }

    pub fn is_disjoint(&self, other: &ItemSetKey) -> bool {
        self.0.iter().all(|item| !other.contains(item))
    }

    pub fn is_subset_of(&self, other: &ItemSetKey) -> bool {
        self.0.iter().all(|item| other.contains(item))
    }

    /// Canonical key with `item` added.
    pub fn with_item(&self, item: ProductId) -> ItemSetKey {
        let mut items = self.0.clone();
        if let Err(position) = items.binary_search(&item) {
            items.insert(position, item);
        }
        Self(items)
    }

    pub fn into_items(self) -> Vec<ProductId> {
        self.0
    }
}

impl From<Vec<ProductId>> for ItemSetKey {
    fn from(mut items: Vec<ProductId>) -> Self {
        items.sort();
        items.dedup();
        Self(items)
    }
}

impl From<ItemSetKey> for Vec<ProductId> {
    fn from(key: ItemSetKey) -> Self {
        key.0
    }
}

impl fmt::Display for ItemSetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (index, item) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            f.write_str(item.as_str())?;
        }
        f.write_str("}")
    }
}

/// A set of products together with how often it was bought.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemSet {
    #[serde(rename = "items")]
    pub key: ItemSetKey,
    /// Fraction of all transactions that contain every item, in `[0, 1]`.
    pub support: f64,
    /// Number of transactions that contain every item.
    pub count: usize,
}

impl ItemSet {
    pub fn new(key: ItemSetKey, count: usize, total_transactions: usize) -> Self {
        Self { key, support: support_fraction(count, total_transactions), count }
    }

    pub fn items(&self) -> &[ProductId] {
        self.key.items()
    }

    pub fn len(&self) -> usize {
        self.key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

pub(crate) fn support_fraction(count: usize, total_transactions: usize) -> f64 {
    if total_transactions == 0 {
        0.0
    } else {
        count as f64 / total_transactions as f64
    }
}
