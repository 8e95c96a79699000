pub mod itemset;
pub mod product;
pub mod rule;
pub mod suggestion;
pub mod transaction;
