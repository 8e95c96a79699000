//! Frequently-bought-together mining
//!
//! Turns historical order baskets into per-product bundle suggestions:
//! level-wise frequent itemset search, association rules scored by confidence and lift,
//! and per-anchor ranking. Every stage is a pure function of its inputs.

mod baskets;
mod cancel;
mod engine;
mod itemsets;
mod params;
mod ranking;
mod rules;
mod subsets;
mod support;

pub use baskets::{BasketSanitizer, SanitationReport};
pub use cancel::CancellationToken;
pub use engine::{BundleMiningEngine, MiningReport, MiningStats};
pub use itemsets::{FrequentItemsetMiner, FrequentItemsets, LevelSummary};
pub use params::MiningParameters;
pub use ranking::SuggestionRanker;
pub use rules::RuleGenerator;
pub use subsets::proper_subset_keys;
pub use support::SupportCounter;

use crate::errors::DomainError;

/// Result type for mining operations
pub type MiningResult<T> = Result<T, DomainError>;

/// Default minimum support (1% of orders)
pub const DEFAULT_MIN_SUPPORT: f64 = 0.01;

/// Default minimum rule confidence
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.10;

/// Default minimum lift; 1.0 keeps only positive associations
pub const DEFAULT_MIN_LIFT: f64 = 1.0;

/// Default number of suggestions kept per anchor product
pub const DEFAULT_MAX_PER_PRODUCT: usize = 5;

/// Default largest itemset size evaluated by the miner
pub const DEFAULT_MAX_LEVEL: usize = 10;

/// Default cap on distinct items per basket after sanitation
pub const DEFAULT_MAX_BASKET_SIZE: usize = 50;
