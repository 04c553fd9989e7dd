use super::order::BucketOrder;
use crate::aggregations::AggregationResult;
use crate::table::Bucket;
use serde::{Serialize, Serializer};
use std::borrow::Cow;

fn serialize_key<S: Serializer>(key: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(key))
}

/// A finished bucket, detached from the table it was collected in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermBucket {
    #[serde(serialize_with = "serialize_key")]
    pub key: Box<[u8]>,
    pub doc_count: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sub_aggs: Vec<AggregationResult>,
}

impl TermBucket {
    pub fn key_as_string(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.key)
    }

    pub fn sub_aggregation(&self, name: &str) -> Option<&AggregationResult> {
        self.sub_aggs.iter().find(|result| result.name == name)
    }

    pub fn sub_metric(&self, name: &str, metric: Option<&str>) -> Option<f64> {
        self.sub_aggregation(name)?.metric(metric)
    }
}

impl From<Bucket> for TermBucket {
    fn from(bucket: Bucket) -> Self {
        let (key, doc_count, sub_aggs) = bucket.into_parts();
        TermBucket {
            key: key.into_bytes(),
            doc_count,
            sub_aggs,
        }
    }
}

/// Output of one terms aggregation pass: the selected buckets, best first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermsResult {
    pub name: String,
    pub order: BucketOrder,
    pub size: usize,
    pub buckets: Vec<TermBucket>,
    /// Documents counted in buckets that were not selected
    pub sum_other_doc_count: u64,
}

impl TermsResult {
    pub fn empty(name: String, order: BucketOrder, size: usize) -> Self {
        Self {
            name,
            order,
            size,
            buckets: Vec::new(),
            sum_other_doc_count: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn bucket(&self, key: &[u8]) -> Option<&TermBucket> {
        self.buckets.iter().find(|bucket| &*bucket.key == key)
    }

    pub fn doc_count(&self, key: &str) -> Option<u64> {
        self.bucket(key.as_bytes()).map(|bucket| bucket.doc_count)
    }

    /// Bucket keys and counts in result order.
    pub fn counts(&self) -> Vec<(String, u64)> {
        self.buckets
            .iter()
            .map(|bucket| (bucket.key_as_string().into_owned(), bucket.doc_count))
            .collect()
    }
}
