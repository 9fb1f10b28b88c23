//! # Clustering Configuration
//!
//! Thresholds and weights used by graph construction and clustering.
//! Keys serialize in SCREAMING_SNAKE_CASE so a config document reads
//! like the constant table it replaces:
//!
//! ```json
//! { "LAYER1_SIMILARITY_THRESHOLD": 0.8, "FOCUS_RADIUS": 1.5 }
//! ```
//!
//! Missing keys take their defaults. A [`ConfigUpdate`] carries a partial
//! set of keys and is shallow-merged into the active config; the merge
//! only affects the next build or clustering call.

use serde::{Deserialize, Serialize};
use crate::{Error, Result};

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_LAYER1_SIMILARITY_THRESHOLD: f64 = 0.7;
pub const DEFAULT_LAYER2_SHARED_ACTORS_MIN: usize = 1;
pub const DEFAULT_LAYER2_JACCARD_WEIGHT: f64 = 0.7;
pub const DEFAULT_LAYER2_RELATIONSHIP_WEIGHT: f64 = 0.3;
pub const DEFAULT_COMBINED_WEIGHT_LAYER1: f64 = 0.6;
pub const DEFAULT_COMBINED_WEIGHT_LAYER2: f64 = 0.4;
pub const DEFAULT_FOCUS_RADIUS: f64 = 2.0;
pub const DEFAULT_MERGE_WEIGHT_MIN: f64 = 0.3;
pub const DEFAULT_MIN_CLUSTER_SIZE: usize = 2;
pub const DEFAULT_MAX_CLUSTER_SIZE: usize = 50;
pub const DEFAULT_RELATIONSHIP_CONFIDENCE: f64 = 0.5;

// ============================================================================
// ClusteringConfig
// ============================================================================

/// Active engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct ClusteringConfig {
    /// Minimum cosine similarity for a layer-1 edge (inclusive).
    pub layer1_similarity_threshold: f64,
    /// Minimum number of shared actors for a layer-2 edge (inclusive).
    pub layer2_shared_actors_min: usize,
    pub layer2_jaccard_weight: f64,
    pub layer2_relationship_weight: f64,
    pub combined_weight_layer1: f64,
    pub combined_weight_layer2: f64,
    /// Neighbors are only expanded from nodes closer than this.
    pub focus_radius: f64,
    /// A node must have a combined weight strictly above this to merge.
    pub merge_weight_min: f64,
    /// Clusters below this size are dissolved, except the focus cluster.
    pub min_cluster_size: usize,
    /// A cluster at this size accepts no more members.
    pub max_cluster_size: usize,
    /// Bonus confidence for relationships that carry none.
    pub default_relationship_confidence: f64,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            layer1_similarity_threshold: DEFAULT_LAYER1_SIMILARITY_THRESHOLD,
            layer2_shared_actors_min: DEFAULT_LAYER2_SHARED_ACTORS_MIN,
            layer2_jaccard_weight: DEFAULT_LAYER2_JACCARD_WEIGHT,
            layer2_relationship_weight: DEFAULT_LAYER2_RELATIONSHIP_WEIGHT,
            combined_weight_layer1: DEFAULT_COMBINED_WEIGHT_LAYER1,
            combined_weight_layer2: DEFAULT_COMBINED_WEIGHT_LAYER2,
            focus_radius: DEFAULT_FOCUS_RADIUS,
            merge_weight_min: DEFAULT_MERGE_WEIGHT_MIN,
            min_cluster_size: DEFAULT_MIN_CLUSTER_SIZE,
            max_cluster_size: DEFAULT_MAX_CLUSTER_SIZE,
            default_relationship_confidence: DEFAULT_RELATIONSHIP_CONFIDENCE,
        }
    }
}

impl ClusteringConfig {
    /// Parse and validate a full config document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Shallow merge: every key present in `update` replaces ours.
    pub fn merged(&self, update: &ConfigUpdate) -> Self {
        let mut next = self.clone();
        macro_rules! take {
            ($($field:ident),* $(,)?) => {
                $(if let Some(v) = update.$field { next.$field = v; })*
            };
        }
        take!(
            layer1_similarity_threshold,
            layer2_shared_actors_min,
            layer2_jaccard_weight,
            layer2_relationship_weight,
            combined_weight_layer1,
            combined_weight_layer2,
            focus_radius,
            merge_weight_min,
            min_cluster_size,
            max_cluster_size,
            default_relationship_confidence,
        );
        next
    }

    pub fn validate(&self) -> Result<()> {
        let unit = [
            ("LAYER1_SIMILARITY_THRESHOLD", self.layer1_similarity_threshold),
            ("LAYER2_JACCARD_WEIGHT", self.layer2_jaccard_weight),
            ("LAYER2_RELATIONSHIP_WEIGHT", self.layer2_relationship_weight),
            ("COMBINED_WEIGHT_LAYER1", self.combined_weight_layer1),
            ("COMBINED_WEIGHT_LAYER2", self.combined_weight_layer2),
            ("MERGE_WEIGHT_MIN", self.merge_weight_min),
            ("DEFAULT_RELATIONSHIP_CONFIDENCE", self.default_relationship_confidence),
        ];
        for (key, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfig(format!("{key} must be in [0, 1], got {value}")));
            }
        }
        if !self.focus_radius.is_finite() || self.focus_radius <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "FOCUS_RADIUS must be a positive finite number, got {}",
                self.focus_radius
            )));
        }
        if self.min_cluster_size == 0 {
            return Err(Error::InvalidConfig("MIN_CLUSTER_SIZE must be at least 1".into()));
        }
        if self.max_cluster_size == 0 {
            return Err(Error::InvalidConfig("MAX_CLUSTER_SIZE must be at least 1".into()));
        }
        Ok(())
    }
}

// ============================================================================
// ConfigUpdate
// ============================================================================

/// Partial configuration. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct ConfigUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer1_similarity_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer2_shared_actors_min: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer2_jaccard_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer2_relationship_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combined_weight_layer1: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combined_weight_layer2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_weight_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_cluster_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cluster_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_relationship_confidence: Option<f64>,
}

impl ConfigUpdate {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
