use crate::aggregations::bucket::{TermsAggregator, TermsRequest, TermsResult};
use crate::aggregations::{DocId, MetricAgg, SubAggregations};
use crate::config::SelectionConfig;
use crate::source::{FastFieldNumbers, FastFieldValues, ValueSource};
use crate::table::TablePool;
use crate::{Error, Result};
use std::sync::Arc;
use std::thread;
use tantivy::collector::{Collector, SegmentCollector};
use tantivy::{Score, Searcher, SegmentOrdinal, SegmentReader, TantivyError};

/// Runs a terms aggregation over the fast fields of every matching segment.
///
/// Each segment gets its own aggregator and bucket table; the fruit holds one
/// result per segment, in segment order. Segment results are not merged.
pub struct TermsCollector {
    request: TermsRequest,
    pool: TablePool,
    selection: SelectionConfig,
}

impl TermsCollector {
    pub fn new(request: TermsRequest, pool: TablePool, selection: SelectionConfig) -> Self {
        Self {
            request,
            pool,
            selection,
        }
    }

    fn sub_aggregations(&self, reader: &SegmentReader) -> Result<SubAggregations> {
        let mut sub_aggs = SubAggregations::new();
        for metric in &self.request.aggs {
            let source = FastFieldNumbers::open(reader, metric.metric.field())?;
            sub_aggs.push(Arc::new(MetricAgg::from_request(metric, Arc::new(source))));
        }
        Ok(sub_aggs)
    }

    pub fn request(&self) -> &TermsRequest {
        &self.request
    }

    fn segment_aggregator(&self, reader: &SegmentReader) -> Result<TermsAggregator<FastFieldValues>> {
        let source = FastFieldValues::open(reader, &self.request.terms.field)?;
        TermsAggregator::new(
            self.request.name.clone(),
            &self.request.terms,
            self.sub_aggregations(reader)?,
            source,
            &self.pool,
            &self.selection,
        )
    }
}

impl Collector for TermsCollector {
    type Fruit = Vec<TermsResult>;

    type Child = TermsSegmentCollector;

    fn for_segment(
        &self,
        segment_local_id: SegmentOrdinal,
        reader: &SegmentReader,
    ) -> tantivy::Result<Self::Child> {
        let aggregator = self.segment_aggregator(reader)?;
        tracing::trace!(
            aggregation = %self.request.name,
            segment = segment_local_id,
            max_doc = reader.max_doc(),
            "Collecting terms for segment"
        );
        Ok(TermsSegmentCollector::new(aggregator))
    }

    fn requires_scoring(&self) -> bool {
        false
    }

    fn merge_fruits(
        &self,
        segment_fruits: Vec<<Self::Child as SegmentCollector>::Fruit>,
    ) -> tantivy::Result<Self::Fruit> {
        segment_fruits
            .into_iter()
            .collect::<Result<Vec<_>>>()
            .map_err(TantivyError::from)
    }
}

/// Per-segment side of [`TermsCollector`].
///
/// `collect` cannot fail, so the first retrieval error is kept and every later
/// document is skipped. The error surfaces from `harvest`.
pub struct TermsSegmentCollector<S: ValueSource = FastFieldValues> {
    aggregator: TermsAggregator<S>,
    error: Option<Error>,
}

impl<S: ValueSource> TermsSegmentCollector<S> {
    pub fn new(aggregator: TermsAggregator<S>) -> Self {
        Self {
            aggregator,
            error: None,
        }
    }

    pub fn has_failed(&self) -> bool {
        self.error.is_some()
    }
}

impl<S: ValueSource + 'static> SegmentCollector for TermsSegmentCollector<S> {
    type Fruit = Result<TermsResult>;

    fn collect(&mut self, doc: DocId, _score: Score) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.aggregator.collect(doc) {
            tracing::warn!(aggregation = %self.aggregator.name(), doc, "Terms collection failed: {}", err);
            self.error = Some(err);
        }
    }

    fn collect_block(&mut self, docs: &[DocId]) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.aggregator.collect_block(docs) {
            tracing::warn!(aggregation = %self.aggregator.name(), "Terms collection failed: {}", err);
            self.error = Some(err);
        }
    }

    fn harvest(self) -> Self::Fruit {
        // The table returns to the pool on either path.
        let collected = self.aggregator.post_collection();
        match self.error {
            Some(err) => Err(err),
            None => Ok(collected.build_aggregation()),
        }
    }
}

/// Aggregate every live document of every segment, one thread per segment.
///
/// All threads borrow tables from `pool`; at most `max_tables` segments run
/// at the same time. Results come back in segment order and are not merged.
pub fn collect_segments(
    searcher: &Searcher,
    request: &TermsRequest,
    pool: &TablePool,
    selection: &SelectionConfig,
) -> Result<Vec<TermsResult>> {
    let collector = &TermsCollector::new(request.clone(), pool.clone(), selection.clone());
    let readers = searcher.segment_readers();
    let parallelism = pool.config().max_tables.max(1);
    tracing::debug!(
        aggregation = %request.name,
        segments = readers.len(),
        parallelism,
        "Collecting terms across segments"
    );

    let mut results = Vec::with_capacity(readers.len());
    for chunk in readers.chunks(parallelism) {
        let chunk_results = thread::scope(|scope| {
            let handles: Vec<_> = chunk
                .iter()
                .map(|reader| scope.spawn(move || collect_segment(collector, reader)))
                .collect();
            handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(result) => result,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect::<Vec<_>>()
        });
        for result in chunk_results {
            results.push(result?);
        }
    }
    Ok(results)
}

fn collect_segment(collector: &TermsCollector, reader: &SegmentReader) -> Result<TermsResult> {
    let mut aggregator = collector.segment_aggregator(reader)?;
    for doc in reader.doc_ids_alive() {
        aggregator.collect(doc)?;
    }
    Ok(aggregator.post_collection().build_aggregation())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregations::bucket::TermsAggregation;
    use crate::source::{MemoryCursor, MemoryValues};
    use crate::table::HashedBytes;
    use std::io;

    /// In-memory values whose reads fail for one document.
    struct FailingValues {
        inner: MemoryValues,
        fail_doc: DocId,
    }

    impl FailingValues {
        fn check(&self, doc: DocId) -> io::Result<()> {
            if doc == self.fail_doc {
                return Err(io::Error::new(io::ErrorKind::InvalidData, "corrupt column"));
            }
            Ok(())
        }
    }

    impl ValueSource for FailingValues {
        type Cursor<'a> = MemoryCursor<'a>;

        fn has_value(&self, doc: DocId) -> bool {
            self.inner.has_value(doc)
        }

        fn is_multivalued(&self, doc: DocId) -> bool {
            self.inner.is_multivalued(doc)
        }

        fn single_value(&mut self, doc: DocId) -> io::Result<HashedBytes<'_>> {
            self.check(doc)?;
            self.inner.single_value(doc)
        }

        fn values(&mut self, doc: DocId) -> io::Result<Self::Cursor<'_>> {
            self.check(doc)?;
            self.inner.values(doc)
        }
    }

    fn segment_collector(pool: &TablePool, fail_doc: DocId) -> TermsSegmentCollector<FailingValues> {
        let source = FailingValues {
            inner: MemoryValues::from_docs(vec![vec!["a"], vec!["b"], vec!["c", "d"], vec!["e"]]),
            fail_doc,
        };
        let aggregator = TermsAggregator::new(
            "terms",
            &TermsAggregation::new("tag"),
            SubAggregations::new(),
            source,
            pool,
            &SelectionConfig::default(),
        )
        .unwrap();
        TermsSegmentCollector::new(aggregator)
    }

    fn terms_collector(pool: &TablePool) -> TermsCollector {
        let request = TermsRequest {
            name: "terms".to_string(),
            terms: TermsAggregation::new("tag"),
            aggs: Vec::new(),
        };
        TermsCollector::new(request, pool.clone(), SelectionConfig::default())
    }

    #[test]
    fn test_first_error_is_kept_and_later_docs_skipped() {
        let pool = TablePool::default();
        let mut collector = segment_collector(&pool, 1);

        collector.collect(0, 0.0);
        assert!(!collector.has_failed());
        assert_eq!(collector.aggregator.num_buckets(), 1);

        collector.collect(1, 0.0);
        assert!(collector.has_failed());

        collector.collect(2, 0.0);
        collector.collect_block(&[3]);
        assert_eq!(collector.aggregator.num_buckets(), 1);

        let err = collector.harvest().unwrap_err();
        match err {
            Error::ValueRetrieval(io_err) => assert_eq!(io_err.kind(), io::ErrorKind::InvalidData),
            other => panic!("Expected ValueRetrieval, got {:?}", other),
        }
        assert_eq!(pool.in_use(), 0);
        assert_eq!(pool.stats().released(), 1);
    }

    #[test]
    fn test_block_error_stops_collection() {
        let pool = TablePool::default();
        let mut collector = segment_collector(&pool, 2);

        collector.collect_block(&[0, 1, 2, 3]);
        assert!(collector.has_failed());
        // Documents before the failure were counted, the rest were not.
        assert_eq!(collector.aggregator.num_buckets(), 2);

        assert!(collector.harvest().is_err());
        assert_eq!(pool.in_use(), 0);
    }

    #[test]
    fn test_harvest_without_error_builds_result() {
        let pool = TablePool::default();
        let mut collector = segment_collector(&pool, DocId::MAX);
        collector.collect_block(&[0, 1, 2, 3]);

        let result = collector.harvest().unwrap();
        assert_eq!(result.buckets.len(), 5);
        assert_eq!(pool.in_use(), 0);
    }

    #[test]
    fn test_merge_fruits_surfaces_tantivy_error() {
        let pool = TablePool::default();
        let collector = terms_collector(&pool);

        let mut failed = segment_collector(&pool, 0);
        failed.collect(0, 0.0);
        let fruits = vec![failed.harvest()];

        let err = collector.merge_fruits(fruits).unwrap_err();
        assert!(matches!(err, TantivyError::IoError(_)));
        assert_eq!(pool.in_use(), 0);
    }
}
