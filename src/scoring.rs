//! # Edge Scoring
//!
//! Pure functions producing the two edge weights:
//!
//! | Layer | Function | Range |
//! |-------|----------|-------|
//! | 1 | [`cosine_similarity`] | [0, 1] |
//! | 2 | [`shared_actor_weight`] | [0, 1] |
//!
//! Cosine similarity is clamped into [0, 1] at computation time, so
//! anti-correlated embeddings score 0 rather than a negative weight.

use hashbrown::HashMap;
use crate::config::ClusteringConfig;
use crate::model::{ActorId, ActorRelationship};

/// Cosine similarity of two embeddings, clamped into [0, 1].
///
/// Returns 0 when either vector is empty, the lengths differ, or either
/// norm is 0.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denominator = norm_a.sqrt() * norm_b.sqrt();
    if denominator > 0.0 {
        (dot / denominator).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

// ============================================================================
// Relationship index
// ============================================================================

/// Unordered actor-pair → confidence lookup.
///
/// When the same pair is listed more than once the first listing wins.
#[derive(Debug, Clone, Default)]
pub struct RelationshipIndex {
    confidence: HashMap<(ActorId, ActorId), f64>,
}

impl RelationshipIndex {
    /// Index `relationships`. Missing confidences take `default_confidence`.
    pub fn new(relationships: &[ActorRelationship], default_confidence: f64) -> Self {
        let mut confidence = HashMap::with_capacity(relationships.len());
        for rel in relationships {
            let key = Self::key(&rel.from_actor, &rel.to_actor);
            confidence
                .entry(key)
                .or_insert(rel.confidence.unwrap_or(default_confidence));
        }
        Self { confidence }
    }

    fn key(a: &ActorId, b: &ActorId) -> (ActorId, ActorId) {
        if a <= b { (a.clone(), b.clone()) } else { (b.clone(), a.clone()) }
    }

    /// Confidence of a relationship between `a` and `b`, in either direction.
    pub fn confidence(&self, a: &ActorId, b: &ActorId) -> Option<f64> {
        self.confidence.get(&Self::key(a, b)).copied()
    }

    pub fn len(&self) -> usize {
        self.confidence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.confidence.is_empty()
    }
}

// ============================================================================
// Shared-actor weight
// ============================================================================

/// Layer-2 edge weight for two posts sharing `shared` actors.
///
/// `total_a` and `total_b` are the distinct actor counts of the two posts.
/// The weight is `min(1, jaccard_weight * overlap + relationship_weight * bonus)`
/// where `overlap = |shared| / (|A| + |B| - |shared|)` and `bonus` is the
/// summed confidence of relationships among the shared actors divided by
/// the number of shared-actor pairs. With fewer than two shared actors the
/// bonus is 0.
pub fn shared_actor_weight(
    shared: &[ActorId],
    relationships: &RelationshipIndex,
    total_a: usize,
    total_b: usize,
    config: &ClusteringConfig,
) -> f64 {
    let union = (total_a + total_b).saturating_sub(shared.len());
    if shared.is_empty() || union == 0 {
        return 0.0;
    }
    let overlap = shared.len() as f64 / union as f64;

    let bonus = relationship_bonus(shared, relationships);

    let weight = overlap * config.layer2_jaccard_weight + bonus * config.layer2_relationship_weight;
    weight.clamp(0.0, 1.0)
}

/// Mean relationship confidence over all pairs of `shared`, 0 when there
/// are fewer than two actors.
fn relationship_bonus(shared: &[ActorId], relationships: &RelationshipIndex) -> f64 {
    let n = shared.len();
    if n < 2 {
        return 0.0;
    }

    let mut total = 0.0;
    for i in 0..n {
        for j in (i + 1)..n {
            if let Some(confidence) = relationships.confidence(&shared[i], &shared[j]) {
                total += confidence.clamp(0.0, 1.0);
            }
        }
    }

    let pairs = (n * (n - 1) / 2) as f64;
    total / pairs
}
