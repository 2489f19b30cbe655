use serde::{Deserialize, Serialize};

use super::PlayerId;

/// Plain-item catalog entry, keyed by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPrice {
    pub name: String,
    pub value: i64,
}

/// Artifact catalog entry, reachable by code or by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactPrice {
    pub code: String,
    pub name: String,
    pub value: i64,
}

/// A player identity whose fight summaries were recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}
