//! Terms bucket aggregation: one bucket per distinct term, top buckets by order.

mod aggregator;
mod order;
mod request;
mod result;
mod select;

pub use aggregator::{CollectedTerms, TermsAggregator};
pub use order::{BucketOrder, Direction};
pub use request::{TermsAggregation, TermsRequest};
pub use result::{TermBucket, TermsResult};
pub use select::{select_top_k, SelectionStrategy};
