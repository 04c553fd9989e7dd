use crate::aggregations::bucket::{BucketOrder, Direction, TermsAggregation};
use crate::aggregations::types::{MetricRequest, MetricType};

impl MetricType {
    pub fn value_count(field: impl Into<String>) -> MetricType {
        MetricType::ValueCount {
            field: field.into(),
        }
    }

    pub fn min(field: impl Into<String>) -> MetricType {
        MetricType::Min {
            field: field.into(),
        }
    }

    pub fn max(field: impl Into<String>) -> MetricType {
        MetricType::Max {
            field: field.into(),
        }
    }

    pub fn sum(field: impl Into<String>) -> MetricType {
        MetricType::Sum {
            field: field.into(),
        }
    }

    pub fn avg(field: impl Into<String>) -> MetricType {
        MetricType::Avg {
            field: field.into(),
        }
    }

    pub fn stats(field: impl Into<String>) -> MetricType {
        MetricType::Stats {
            field: field.into(),
        }
    }

    pub fn named(self, name: impl Into<String>) -> MetricRequest {
        MetricRequest {
            name: name.into(),
            metric: self,
        }
    }
}

impl TermsAggregation {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            size: None,
            shard_size: None,
            min_doc_count: None,
            order: BucketOrder::default(),
        }
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_min_doc_count(mut self, min_doc_count: u64) -> Self {
        self.min_doc_count = Some(min_doc_count);
        self
    }

    pub fn with_order(mut self, order: BucketOrder) -> Self {
        self.order = order;
        self
    }
}

impl BucketOrder {
    pub fn count_desc() -> BucketOrder {
        BucketOrder::Count(Direction::Desc)
    }

    pub fn count_asc() -> BucketOrder {
        BucketOrder::Count(Direction::Asc)
    }

    pub fn term_asc() -> BucketOrder {
        BucketOrder::Term(Direction::Asc)
    }

    pub fn term_desc() -> BucketOrder {
        BucketOrder::Term(Direction::Desc)
    }

    /// Order by a nested aggregation; `path` is `name` or `name.metric`.
    pub fn sub_aggregation(path: impl Into<String>, direction: Direction) -> BucketOrder {
        BucketOrder::SubAggregation {
            path: path.into(),
            direction,
        }
    }
}
