//! JSON control payloads exchanged between stage invocations.
//!
//! Inputs ignore unknown fields so an orchestrator can pass a previous
//! stage's whole output straight through.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Ordered source keys handled by one map invocation
pub type Chunk = Vec<String>;

/// Planner output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryPlan {
    pub chunks: Vec<Chunk>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
    #[serde(default)]
    pub file_count: usize,
}

impl InventoryPlan {
    pub fn chunk_sizes(&self) -> Vec<usize> {
        self.chunks.iter().map(|c| c.len()).collect()
    }
}

/// Map output, one per chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapOutput {
    pub processed_artifact_ref: String,
    pub row_count: usize,
    #[serde(default)]
    pub message: String,
}

/// Reduce input element; only the reference is read from each map output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactReference {
    pub processed_artifact_ref: String,
}

impl From<&MapOutput> for ArtifactReference {
    fn from(output: &MapOutput) -> Self {
        Self {
            processed_artifact_ref: output.processed_artifact_ref.clone(),
        }
    }
}

/// Reduce output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReduceOutput {
    pub final_artifact_ref: String,
    pub intermediate_refs: Vec<String>,
    pub message: String,
    #[serde(default)]
    pub row_count: usize,
}

/// Cleanup input; a reduce output deserializes into it directly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanupRequest {
    pub intermediate_refs: Vec<String>,
    #[serde(default)]
    pub final_artifact_ref: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl From<&ReduceOutput> for CleanupRequest {
    fn from(output: &ReduceOutput) -> Self {
        Self {
            intermediate_refs: output.intermediate_refs.clone(),
            final_artifact_ref: Some(output.final_artifact_ref.clone()),
            message: Some(output.message.clone()),
        }
    }
}

/// Cleanup output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanupOutput {
    pub deleted: usize,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<String>,
}
