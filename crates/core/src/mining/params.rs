//! Threshold set for one mining run

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

use super::{
    DEFAULT_MAX_LEVEL, DEFAULT_MAX_PER_PRODUCT, DEFAULT_MIN_CONFIDENCE, DEFAULT_MIN_LIFT,
    DEFAULT_MIN_SUPPORT, MiningResult,
};

/// Thresholds and limits injected into a mining run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MiningParameters {
    /// Minimum support for an itemset to be frequent, in `(0, 1]`
    pub min_support: f64,
    /// Minimum rule confidence, in `[0, 1]`
    pub min_confidence: f64,
    /// Minimum rule lift, `>= 0`
    pub min_lift: f64,
    /// Maximum suggestions kept per anchor product
    pub max_per_product: usize,
    /// Largest itemset size the miner will evaluate
    pub max_level: usize,
}

impl Default for MiningParameters {
    fn default() -> Self {
        Self {
            min_support: DEFAULT_MIN_SUPPORT,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            min_lift: DEFAULT_MIN_LIFT,
            max_per_product: DEFAULT_MAX_PER_PRODUCT,
            max_level: DEFAULT_MAX_LEVEL,
        }
    }
}

impl MiningParameters {
    pub fn with_min_support(mut self, min_support: f64) -> Self {
        self.min_support = min_support;
        self
    }

    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    pub fn with_min_lift(mut self, min_lift: f64) -> Self {
        self.min_lift = min_lift;
        self
    }

    pub fn with_max_per_product(mut self, max_per_product: usize) -> Self {
        self.max_per_product = max_per_product;
        self
    }

    pub fn with_max_level(mut self, max_level: usize) -> Self {
        self.max_level = max_level;
        self
    }

    /// Rejects out-of-range thresholds before any mining work starts.
    pub fn validate(&self) -> MiningResult<()> {
        if !(self.min_support > 0.0 && self.min_support <= 1.0) {
            return Err(DomainError::invalid("min_support", self.min_support, "a value in (0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(DomainError::invalid(
                "min_confidence",
                self.min_confidence,
                "a value in [0, 1]",
            ));
        }
        if !(self.min_lift >= 0.0 && self.min_lift.is_finite()) {
            return Err(DomainError::invalid("min_lift", self.min_lift, "a finite value >= 0"));
        }
        if self.max_level == 0 {
            return Err(DomainError::invalid("max_level", self.max_level, "a value >= 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MiningParameters;
    use crate::errors::DomainError;

    fn rejected_name(params: MiningParameters) -> Option<&'static str> {
        match params.validate() {
            Err(DomainError::InvalidParameter { name, .. }) => Some(name),
            _ => None,
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert!(MiningParameters::default().validate().is_ok());
    }

    #[test]
    fn min_support_must_be_positive_and_at_most_one() {
        let base = MiningParameters::default();
        assert_eq!(rejected_name(base.with_min_support(0.0)), Some("min_support"));
        assert_eq!(rejected_name(base.with_min_support(1.01)), Some("min_support"));
        assert_eq!(rejected_name(base.with_min_support(f64::NAN)), Some("min_support"));
        assert!(base.with_min_support(1.0).validate().is_ok());
    }

    #[test]
    fn min_confidence_bounds_are_inclusive() {
        let base = MiningParameters::default();
        assert!(base.with_min_confidence(0.0).validate().is_ok());
        assert!(base.with_min_confidence(1.0).validate().is_ok());
        assert_eq!(rejected_name(base.with_min_confidence(-0.1)), Some("min_confidence"));
        assert_eq!(rejected_name(base.with_min_confidence(f64::NAN)), Some("min_confidence"));
    }

    #[test]
    fn min_lift_rejects_negative_and_infinite() {
        let base = MiningParameters::default();
        assert!(base.with_min_lift(0.0).validate().is_ok());
        assert_eq!(rejected_name(base.with_min_lift(-0.5)), Some("min_lift"));
        assert_eq!(rejected_name(base.with_min_lift(f64::INFINITY)), Some("min_lift"));
    }

    #[test]
    fn max_level_must_allow_at_least_singletons() {
        let base = MiningParameters::default();
        assert_eq!(rejected_name(base.with_max_level(0)), Some("max_level"));
        assert!(base.with_max_level(1).validate().is_ok());
    }
}
