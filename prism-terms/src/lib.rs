//! Terms bucket aggregation for Prism.
//!
//! Documents are grouped by the distinct values of one field. Each group is a
//! bucket holding a document count and optional metric sub-aggregations.
//! Buckets are stored in hash tables borrowed from a shared [`table::TablePool`],
//! and the best buckets are picked by a bounded top-k selection.

pub mod aggregations;
pub mod config;
pub mod error;
pub mod logging;
pub mod source;
pub mod table;

pub use aggregations::{TermsAggregation, TermsAggregator, TermsCollector, TermsResult};
pub use config::TermsConfig;
pub use error::{Error, Result};
pub use table::TablePool;
