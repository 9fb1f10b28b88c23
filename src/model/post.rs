//! Input records supplied by the data-loading side: posts, actors and
//! actor-to-actor relationships.
//!
//! The engine only reads these. Everything except the identifiers is
//! optional so that partially populated JSON exports deserialize cleanly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque actor (named entity) identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub String);

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActorId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ActorId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A post: one document of the corpus and one node of the graph.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<f64>,
    /// Actors mentioned by the post. Duplicates are tolerated and ignored.
    #[serde(default)]
    pub actors: Vec<ActorId>,
    /// Semantic embedding. Empty means "similar to nothing".
    #[serde(default)]
    pub embedding_vector: Vec<f64>,
}

impl Post {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_actors(mut self, actors: impl IntoIterator<Item = impl Into<ActorId>>) -> Self {
        self.actors = actors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_embedding(mut self, embedding: impl Into<Vec<f64>>) -> Self {
        self.embedding_vector = embedding.into();
        self
    }
}

/// A named entity. Carried for interface parity; scoring never reads it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub actor_type: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl Actor {
    pub fn new(id: impl Into<ActorId>, canonical_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            canonical_name: Some(canonical_name.into()),
            ..Self::default()
        }
    }
}

/// A known relationship between two actors.
///
/// Stored directed, matched in either direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorRelationship {
    pub from_actor: ActorId,
    pub to_actor: ActorId,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub rel_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Confidence in [0, 1]. `None` falls back to the configured default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl ActorRelationship {
    pub fn new(from: impl Into<ActorId>, to: impl Into<ActorId>) -> Self {
        Self {
            from_actor: from.into(),
            to_actor: to.into(),
            rel_type: None,
            role: None,
            confidence: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
}
