use crate::aggregations::types::AggregationResult;
use std::fmt;
use std::io;
use std::sync::Arc;

pub use tantivy::DocId;

/// Per-bucket nested aggregation.
///
/// One instance lives in every bucket. It sees each document the bucket
/// collects, gets a single finalize signal once the document stream ends,
/// and then builds its result.
pub trait SubAggregator: Send {
    fn collect(&mut self, doc: DocId) -> io::Result<()>;

    fn post_collection(&mut self) {}

    fn build_result(&self) -> AggregationResult;
}

/// Builds a fresh [`SubAggregator`] for every new bucket.
pub trait SubAggregationFactory: Send + Sync {
    fn name(&self) -> &str;

    /// Metric names a multi-value result can be ordered by. Empty for a
    /// single-value result, which is addressed by name alone or `name.value`.
    fn metrics(&self) -> &[&str] {
        &[]
    }

    fn create(&self) -> Box<dyn SubAggregator>;
}

/// The factories a terms aggregation instantiates for each bucket.
#[derive(Clone, Default)]
pub struct SubAggregations {
    factories: Vec<Arc<dyn SubAggregationFactory>>,
}

impl SubAggregations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, factory: impl SubAggregationFactory + 'static) -> Self {
        self.factories.push(Arc::new(factory));
        self
    }

    pub fn push(&mut self, factory: Arc<dyn SubAggregationFactory>) {
        self.factories.push(factory);
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&dyn SubAggregationFactory> {
        self.factories
            .iter()
            .find(|factory| factory.name() == name)
            .map(|factory| &**factory)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.iter().map(|factory| factory.name())
    }

    pub fn instantiate(&self) -> Vec<Box<dyn SubAggregator>> {
        self.factories.iter().map(|factory| factory.create()).collect()
    }
}

impl fmt::Debug for SubAggregations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
