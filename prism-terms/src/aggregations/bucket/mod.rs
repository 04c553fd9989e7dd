pub mod terms;

pub use terms::{
    BucketOrder, CollectedTerms, Direction, TermBucket, TermsAggregation, TermsAggregator,
    TermsRequest, TermsResult,
};
