mod agg_trait;
mod builder;
pub mod bucket;
mod collector;
pub mod metric;
pub mod types;

pub use agg_trait::{DocId, SubAggregationFactory, SubAggregations, SubAggregator};
pub use bucket::{
    BucketOrder, CollectedTerms, Direction, TermBucket, TermsAggregation, TermsAggregator,
    TermsRequest, TermsResult,
};
pub use collector::{collect_segments, TermsCollector, TermsSegmentCollector};
pub use metric::{MetricAgg, MetricKind};
pub use types::{AggregationResult, AggregationValue, MetricRequest, MetricType, StatsResult};
