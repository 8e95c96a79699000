pub mod config;
pub mod domain;
pub mod errors;
pub mod mining;

pub use chrono;

pub use domain::itemset::{ItemSet, ItemSetKey};
pub use domain::product::ProductId;
pub use domain::rule::AssociationRule;
pub use domain::suggestion::FbtSuggestion;
pub use domain::transaction::{OrderId, Transaction};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use mining::{
    BasketSanitizer, BundleMiningEngine, CancellationToken, MiningParameters, MiningReport,
    MiningResult, MiningStats, SanitationReport,
};
