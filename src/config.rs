//! Engine configuration.
//!
//! Tuning parameters for one engine invocation. Validation is eager:
//! `EngineConfig::validate` runs at engine construction, before any
//! computation, and rejects misuse with a descriptive error.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Weights combining the three centrality components into a composite score.
///
/// Each component is re-normalized to [0, 1] before weighting; the weights
/// themselves are normalized by their sum, so only their ratio matters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CentralityWeights {
    pub degree: f64,
    pub betweenness: f64,
    pub pagerank: f64,
}

impl Default for CentralityWeights {
    fn default() -> Self {
        Self {
            degree: 0.3,
            betweenness: 0.3,
            pagerank: 0.4,
        }
    }
}

/// PageRank power-iteration tuning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageRankConfig {
    /// Damping factor (default: 0.85)
    pub damping: f64,
    /// Convergence tolerance (default: 1e-6)
    pub tolerance: f64,
    /// Iteration budget (default: 100)
    pub max_iterations: usize,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            tolerance: 1e-6,
            max_iterations: 100,
        }
    }
}

/// Configuration for one engine invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Cap on retained documents; `None` keeps all. When the input exceeds
    /// the cap, retention is by descending quality score with an ascending
    /// node-id tie-break.
    pub max_nodes: Option<usize>,
    /// Materialize citation edges (default: true)
    pub include_citations: bool,
    /// Materialize similarity edges (default: true)
    pub include_similarity: bool,
    /// Minimum cosine similarity for an edge, in [0, 1] (default: 0.3)
    pub similarity_threshold: f64,
    /// Pairs per similarity work block; the cancellation token is checked
    /// once per block (default: 1024)
    pub similarity_block_size: usize,
    /// Number of top centrality records to return (default: 10)
    pub centrality_top_n: usize,
    /// Composite centrality weights (default: 0.3 / 0.3 / 0.4)
    pub centrality_weights: CentralityWeights,
    /// PageRank tuning
    pub pagerank: PageRankConfig,
    /// Max clusters in the report view (default: 5)
    pub max_clusters: usize,
    /// Max member ids listed per reported cluster; true size is still
    /// counted (default: 10)
    pub cluster_member_limit: usize,
    /// Max evolution paths to retain (default: 5)
    pub max_paths: usize,
    /// Nodes sampled from each of the earliest and latest years for path
    /// search (default: 3)
    pub path_endpoint_sample: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_nodes: None,
            include_citations: true,
            include_similarity: true,
            similarity_threshold: 0.3,
            similarity_block_size: 1024,
            centrality_top_n: 10,
            centrality_weights: CentralityWeights::default(),
            pagerank: PageRankConfig::default(),
            max_clusters: 5,
            cluster_member_limit: 10,
            max_paths: 5,
            path_endpoint_sample: 3,
        }
    }
}

impl EngineConfig {
    /// Validate all fields. Called at engine construction.
    pub fn validate(&self) -> Result<()> {
        if !self.similarity_threshold.is_finite()
            || !(0.0..=1.0).contains(&self.similarity_threshold)
        {
            return Err(EngineError::InvalidConfig {
                field: "similarity_threshold",
                reason: format!("must be in [0, 1], got {}", self.similarity_threshold),
            });
        }
        if self.similarity_block_size == 0 {
            return Err(EngineError::InvalidConfig {
                field: "similarity_block_size",
                reason: "must be positive".to_string(),
            });
        }

        let w = &self.centrality_weights;
        for (field, value) in [
            ("centrality_weights.degree", w.degree),
            ("centrality_weights.betweenness", w.betweenness),
            ("centrality_weights.pagerank", w.pagerank),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::InvalidConfig {
                    field,
                    reason: format!("must be finite and non-negative, got {}", value),
                });
            }
        }
        if w.degree + w.betweenness + w.pagerank <= 0.0 {
            return Err(EngineError::InvalidConfig {
                field: "centrality_weights",
                reason: "weights must not all be zero".to_string(),
            });
        }

        let pr = &self.pagerank;
        if !pr.damping.is_finite() || pr.damping <= 0.0 || pr.damping >= 1.0 {
            return Err(EngineError::InvalidConfig {
                field: "pagerank.damping",
                reason: format!("must be in (0, 1), got {}", pr.damping),
            });
        }
        if !pr.tolerance.is_finite() || pr.tolerance <= 0.0 {
            return Err(EngineError::InvalidConfig {
                field: "pagerank.tolerance",
                reason: format!("must be positive, got {}", pr.tolerance),
            });
        }
        if pr.max_iterations == 0 {
            return Err(EngineError::InvalidConfig {
                field: "pagerank.max_iterations",
                reason: "must be positive".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.similarity_threshold - 0.3).abs() < f64::EPSILON);
        assert_eq!(config.centrality_top_n, 10);
        assert_eq!(config.max_clusters, 5);
        assert_eq!(config.max_paths, 5);
        assert_eq!(config.path_endpoint_sample, 3);
        assert!((config.pagerank.damping - 0.85).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let mut config = EngineConfig::default();
        config.similarity_threshold = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("similarity_threshold"));

        config.similarity_threshold = -0.1;
        assert!(config.validate().is_err());

        config.similarity_threshold = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_negative_weight() {
        let mut config = EngineConfig::default();
        config.centrality_weights.betweenness = -0.3;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("betweenness"));
    }

    #[test]
    fn test_rejects_all_zero_weights() {
        let mut config = EngineConfig::default();
        config.centrality_weights = CentralityWeights {
            degree: 0.0,
            betweenness: 0.0,
            pagerank: 0.0,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_damping() {
        let mut config = EngineConfig::default();
        config.pagerank.damping = 1.0;
        assert!(config.validate().is_err());
        config.pagerank.damping = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = EngineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.centrality_top_n, config.centrality_top_n);
        assert!((back.similarity_threshold - config.similarity_threshold).abs() < f64::EPSILON);
    }
}
