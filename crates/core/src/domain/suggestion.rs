use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;

/// A "frequently bought together" bundle offered alongside an anchor product.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FbtSuggestion {
    pub product_id: ProductId,
    pub bundled_products: Vec<ProductId>,
    pub support: f64,
    pub confidence: f64,
    pub lift: f64,
}
