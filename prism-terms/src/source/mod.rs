//! Value sources: where a terms aggregation reads per-document values from.
//!
//! Sources hand out transient [`HashedBytes`] that borrow an internal buffer;
//! the aggregator copies a value with [`ValueSource::make_owned`] only when it
//! becomes a new bucket key. Retrieval failures are reported as `io::Error`.

mod fast_field;
mod memory;

pub use fast_field::{FastFieldCursor, FastFieldNumbers, FastFieldValues};
pub use memory::{MemoryCursor, MemoryNumbers, MemoryValues};

use crate::aggregations::DocId;
use crate::table::HashedBytes;
use std::io;

/// Per-document term values for the aggregated field.
pub trait ValueSource {
    type Cursor<'a>: ValueCursor
    where
        Self: 'a;

    fn has_value(&self, doc: DocId) -> bool;

    fn is_multivalued(&self, doc: DocId) -> bool;

    /// The only value of a document that has exactly one.
    fn single_value(&mut self, doc: DocId) -> io::Result<HashedBytes<'_>>;

    /// One pass over every value of a document.
    fn values(&mut self, doc: DocId) -> io::Result<Self::Cursor<'_>>;

    fn make_owned(bytes: &[u8]) -> Box<[u8]> {
        bytes.into()
    }
}

/// Lazy, non-restartable walk over one document's values.
pub trait ValueCursor {
    fn next_value(&mut self) -> io::Result<Option<HashedBytes<'_>>>;
}

/// Per-document numeric values feeding metric sub-aggregations.
pub trait NumericSource: Send + Sync {
    /// Append the document's values to `out`.
    fn values(&self, doc: DocId, out: &mut Vec<f64>) -> io::Result<()>;
}
