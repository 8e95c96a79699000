//! Proper subset enumeration

use crate::domain::itemset::ItemSetKey;
use crate::domain::product::ProductId;

/// Every proper, non-empty subset of `items`.
///
/// Bit `j` of the mask selects `items[j]`; masks run from `1` to `2^n - 2`. Items are visited in
/// the order given, so callers pass canonical (sorted) slices and each subset comes back in the
/// same canonical order. `n` is bounded by basket size upstream and must stay below 64.
pub fn proper_subsets(items: &[ProductId]) -> Vec<Vec<ProductId>> {
    let n = items.len();
    if n < 2 {
        return Vec::new();
    }
    debug_assert!(n < 64, "subset enumeration is limited to 63 items");

    let full: u64 = (1u64 << n) - 1;
    (1..full)
        .map(|mask| {
            items
                .iter()
                .enumerate()
                .filter(|(bit, _)| mask & (1u64 << bit) != 0)
                .map(|(_, item)| item.clone())
                .collect()
        })
        .collect()
}

/// Proper non-empty subsets of a canonical key, each as its own key.
pub fn proper_subset_keys(key: &ItemSetKey) -> Vec<ItemSetKey> {
    proper_subsets(key.items()).into_iter().map(ItemSetKey::from).collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{proper_subset_keys, proper_subsets};
    use crate::domain::itemset::ItemSetKey;
    use crate::domain::product::ProductId;

    fn ids(values: &[&str]) -> Vec<ProductId> {
        values.iter().map(|value| ProductId::from(*value)).collect()
    }

    #[test]
    fn fewer_than_two_items_have_no_proper_subsets() {
        assert!(proper_subsets(&[]).is_empty());
        assert!(proper_subsets(&ids(&["a"])).is_empty());
    }

    #[test]
    fn pair_yields_both_singletons_in_mask_order() {
        assert_eq!(proper_subsets(&ids(&["a", "b"])), vec![ids(&["a"]), ids(&["b"])]);
    }

    #[test]
    fn triple_yields_six_distinct_subsets() {
        let subsets = proper_subsets(&ids(&["a", "b", "c"]));
        assert_eq!(subsets.len(), 6);
        assert_eq!(subsets[2], ids(&["a", "b"]));

        let unique: HashSet<_> = subsets.iter().cloned().collect();
        assert_eq!(unique.len(), 6);
        assert!(!unique.contains(&ids(&["a", "b", "c"])));
    }

    #[test]
    fn subsets_preserve_canonical_order() {
        let key = ItemSetKey::from_items(["d", "b", "a", "c"]);
        for subset in proper_subsets(key.items()) {
            let mut sorted = subset.clone();
            sorted.sort();
            assert_eq!(subset, sorted);
        }
        assert_eq!(proper_subset_keys(&key).len(), 14);
    }
}
