use serde::{Deserialize, Serialize};

use crate::RetrievalError;

/// Knobs for multi-query retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Nearest chunks fetched per query.
    pub top_k: usize,
    /// Upper bound on model-generated query variants.
    pub num_variants: usize,
    /// Also search the user's own wording, ahead of the variants.
    pub include_original: bool,
    /// Search the original query alone when expansion fails instead of erroring.
    pub fallback_to_single_query: bool,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            num_variants: 3,
            include_original: false,
            fallback_to_single_query: false,
        }
    }
}

impl RetrievalConfig {
    pub fn validate(&self) -> Result<(), RetrievalError> {
        if self.top_k == 0 {
            return Err(RetrievalError::InvalidTopK(self.top_k));
        }
        if self.num_variants == 0 {
            return Err(RetrievalError::InvalidConfig(
                "num_variants must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = RetrievalConfig::default();
        assert_eq!(cfg.top_k, 4);
        assert_eq!(cfg.num_variants, 3);
        assert!(!cfg.include_original);
        assert!(!cfg.fallback_to_single_query);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_values_are_rejected() {
        let cfg = RetrievalConfig {
            top_k: 0,
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(RetrievalError::InvalidTopK(0)));

        let cfg = RetrievalConfig {
            num_variants: 0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(RetrievalError::InvalidConfig(_))));
    }
}
