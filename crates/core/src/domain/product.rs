use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a sellable product (or variant) as it appears in order baskets.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for ProductId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::ProductId;

    #[test]
    fn product_ids_order_lexicographically() {
        let mut ids = vec![ProductId::from("sku-b"), ProductId::from("sku-a"), ProductId::from("sku-10")];
        ids.sort();

        assert_eq!(ids, vec![ProductId::from("sku-10"), ProductId::from("sku-a"), ProductId::from("sku-b")]);
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&ProductId::from("gift-wrap")).expect("serialize");
        assert_eq!(json, "\"gift-wrap\"");
    }
}
