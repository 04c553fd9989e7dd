use super::order::BucketOrder;
use crate::aggregations::types::MetricRequest;
use crate::aggregations::SubAggregations;
use crate::config::SelectionConfig;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Terms aggregation parameters.
///
/// ```json
/// { "field": "tags", "size": 5, "order": { "count": "desc" } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermsAggregation {
    /// The field to aggregate on.
    pub field: String,
    /// Number of buckets to return. Defaults to `selection.default_size`.
    #[serde(default)]
    pub size: Option<usize>,
    /// Accepted for request compatibility; there is no shard-level reduce here.
    #[serde(default)]
    pub shard_size: Option<usize>,
    /// Buckets with fewer documents are never selected. Defaults to 1.
    #[serde(default)]
    pub min_doc_count: Option<u64>,
    #[serde(default)]
    pub order: BucketOrder,
}

impl TermsAggregation {
    pub fn resolved_size(&self, selection: &SelectionConfig) -> usize {
        self.size.unwrap_or(selection.default_size)
    }

    pub fn resolved_min_doc_count(&self) -> u64 {
        self.min_doc_count.unwrap_or(1)
    }

    pub fn validate(&self, sub_aggs: &SubAggregations) -> Result<()> {
        if self.field.is_empty() {
            return Err(Error::InvalidRequest("terms field must not be empty".to_string()));
        }
        self.order.validate(sub_aggs)
    }
}

/// A named terms aggregation with per-bucket metrics, as run per segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermsRequest {
    pub name: String,
    pub terms: TermsAggregation,
    #[serde(default)]
    pub aggs: Vec<MetricRequest>,
}
