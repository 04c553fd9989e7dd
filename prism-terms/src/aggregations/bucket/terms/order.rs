use super::result::TermBucket;
use crate::aggregations::SubAggregations;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    #[default]
    Desc,
}

impl Direction {
    /// Turn a natural ordering into rank order, where `Less` ranks first.
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }
}

/// How buckets are ranked when the top buckets are selected.
///
/// Every order falls back to the term bytes ascending, so two distinct
/// buckets never compare equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketOrder {
    Count(Direction),
    Term(Direction),
    /// `path` is a sub-aggregation name, optionally followed by `.metric`
    /// for multi-value results such as stats.
    SubAggregation { path: String, direction: Direction },
}

impl Default for BucketOrder {
    fn default() -> Self {
        BucketOrder::Count(Direction::Desc)
    }
}

fn split_path(path: &str) -> (&str, Option<&str>) {
    match path.split_once('.') {
        Some((name, metric)) => (name, Some(metric)),
        None => (path, None),
    }
}

impl BucketOrder {
    /// `Less` means `a` ranks before `b`.
    pub fn compare(&self, a: &TermBucket, b: &TermBucket) -> Ordering {
        let primary = match self {
            BucketOrder::Count(direction) => direction.apply(a.doc_count.cmp(&b.doc_count)),
            BucketOrder::Term(direction) => direction.apply(a.key.cmp(&b.key)),
            BucketOrder::SubAggregation { path, direction } => {
                let (name, metric) = split_path(path);
                match (a.sub_metric(name, metric), b.sub_metric(name, metric)) {
                    (Some(x), Some(y)) => direction.apply(x.total_cmp(&y)),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            }
        };
        primary.then_with(|| a.key.cmp(&b.key))
    }

    /// Reject orders that point at a sub-aggregation the request lacks, or
    /// at a metric that sub-aggregation does not produce.
    pub fn validate(&self, sub_aggs: &SubAggregations) -> Result<()> {
        let BucketOrder::SubAggregation { path, .. } = self else {
            return Ok(());
        };
        let (name, metric) = split_path(path);
        let Some(factory) = sub_aggs.get(name) else {
            return Err(Error::InvalidRequest(format!(
                "order references unknown sub-aggregation '{}'",
                name
            )));
        };

        let metrics = factory.metrics();
        let valid = match metric {
            None | Some("value") => metrics.is_empty(),
            Some(metric) => metrics.contains(&metric),
        };
        if valid {
            return Ok(());
        }
        if metrics.is_empty() {
            Err(Error::InvalidRequest(format!(
                "order path '{}': sub-aggregation '{}' has a single value",
                path, name
            )))
        } else {
            Err(Error::InvalidRequest(format!(
                "order path '{}': sub-aggregation '{}' needs one of {}",
                path,
                name,
                metrics.join(", ")
            )))
        }
    }
}
