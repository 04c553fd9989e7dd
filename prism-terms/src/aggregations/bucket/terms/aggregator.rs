use super::order::BucketOrder;
use super::request::TermsAggregation;
use super::result::{TermBucket, TermsResult};
use super::select::{select_top_k, SelectionStrategy};
use crate::aggregations::{DocId, SubAggregations};
use crate::config::SelectionConfig;
use crate::source::{ValueCursor, ValueSource};
use crate::table::{Bucket, BucketOrd, HashedBytes, PooledTable, TablePool, TermKey};
use crate::{Error, Result};

/// Groups documents into one bucket per distinct term of a field.
///
/// The aggregator owns a pooled bucket table for the whole pass. Documents
/// are fed through [`collect`](Self::collect); [`post_collection`](Self::post_collection)
/// ends the stream and [`CollectedTerms::build_aggregation`] selects the top
/// buckets and gives the table back to its pool.
///
/// A document with several values is counted once per distinct bucket, no
/// matter how often a value repeats within the document.
pub struct TermsAggregator<S: ValueSource> {
    name: String,
    order: BucketOrder,
    size: usize,
    min_doc_count: u64,
    queue_limit: usize,
    sub_aggs: SubAggregations,
    source: S,
    table: PooledTable,
    matched: Vec<BucketOrd>,
}

fn new_bucket<S: ValueSource>(value: HashedBytes<'_>, sub_aggs: &SubAggregations) -> Bucket {
    let key = TermKey::from_owned(S::make_owned(value.bytes()), value.hash());
    Bucket::new(key, sub_aggs.instantiate())
}

impl<S: ValueSource> TermsAggregator<S> {
    pub fn new(
        name: impl Into<String>,
        request: &TermsAggregation,
        sub_aggs: SubAggregations,
        source: S,
        pool: &TablePool,
        selection: &SelectionConfig,
    ) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::InvalidRequest(
                "aggregation name must not be empty".to_string(),
            ));
        }
        request.validate(&sub_aggs)?;
        let table = pool.acquire()?;

        let size = request.resolved_size(selection);
        tracing::debug!(
            aggregation = %name,
            field = %request.field,
            size,
            sub_aggs = sub_aggs.len(),
            "Created terms aggregator"
        );

        Ok(Self {
            name,
            order: request.order.clone(),
            size,
            min_doc_count: request.resolved_min_doc_count(),
            queue_limit: selection.queue_limit,
            sub_aggs,
            source,
            table,
            matched: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_buckets(&self) -> usize {
        self.table.len()
    }

    pub fn collect(&mut self, doc: DocId) -> Result<()> {
        if !self.source.has_value(doc) {
            return Ok(());
        }

        if !self.source.is_multivalued(doc) {
            let value = self.source.single_value(doc)?;
            let ord = self
                .table
                .lookup_or_insert(value, |value| new_bucket::<S>(value, &self.sub_aggs));
            self.table[ord].collect(doc)?;
            return Ok(());
        }

        // Resolve every bucket first, then deliver the document once per
        // distinct bucket.
        self.matched.clear();
        let mut values = self.source.values(doc)?;
        while let Some(value) = values.next_value()? {
            let ord = self
                .table
                .lookup_or_insert(value, |value| new_bucket::<S>(value, &self.sub_aggs));
            self.matched.push(ord);
        }
        self.matched.sort_unstable();
        self.matched.dedup();

        for &ord in &self.matched {
            self.table[ord].collect(doc)?;
        }
        Ok(())
    }

    pub fn collect_block(&mut self, docs: &[DocId]) -> Result<()> {
        for &doc in docs {
            self.collect(doc)?;
        }
        Ok(())
    }

    /// End the document stream and finalize every bucket's sub-aggregations.
    pub fn post_collection(mut self) -> CollectedTerms {
        for bucket in self.table.iter_mut() {
            bucket.post_collection();
        }
        tracing::debug!(
            aggregation = %self.name,
            buckets = self.table.len(),
            "Terms collection finished"
        );

        CollectedTerms {
            name: self.name,
            order: self.order,
            size: self.size,
            min_doc_count: self.min_doc_count,
            queue_limit: self.queue_limit,
            table: self.table,
        }
    }
}

/// Buckets of a finished collection, ready for selection.
pub struct CollectedTerms {
    name: String,
    order: BucketOrder,
    size: usize,
    min_doc_count: u64,
    queue_limit: usize,
    table: PooledTable,
}

impl CollectedTerms {
    pub fn num_buckets(&self) -> usize {
        self.table.len()
    }

    /// Select the top buckets and release the table back to its pool.
    pub fn build_aggregation(self) -> TermsResult {
        let CollectedTerms {
            name,
            order,
            size,
            min_doc_count,
            queue_limit,
            mut table,
        } = self;

        if table.is_empty() {
            table.release();
            return TermsResult::empty(name, order, size);
        }

        let strategy = SelectionStrategy::for_size(size, queue_limit);
        let total_buckets = table.len();
        let mut eligible_docs = 0u64;
        let candidates = table
            .drain()
            .filter(|bucket| bucket.doc_count() >= min_doc_count)
            .inspect(|bucket| eligible_docs += bucket.doc_count())
            .map(TermBucket::from);
        let buckets = select_top_k(candidates, |a, b| order.compare(a, b), size, strategy);
        table.release();

        let selected_docs: u64 = buckets.iter().map(|bucket| bucket.doc_count).sum();
        tracing::debug!(
            aggregation = %name,
            ?strategy,
            total_buckets,
            selected = buckets.len(),
            "Built terms aggregation"
        );

        TermsResult {
            name,
            order,
            size,
            buckets,
            sum_other_doc_count: eligible_docs - selected_docs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryValues;

    fn aggregator(source: MemoryValues, size: usize) -> TermsAggregator<MemoryValues> {
        let request = TermsAggregation::new("tags").with_size(size);
        TermsAggregator::new(
            "tags",
            &request,
            SubAggregations::new(),
            source,
            &TablePool::default(),
            &SelectionConfig::default(),
        )
        .unwrap()
    }

    fn run(mut agg: TermsAggregator<MemoryValues>, docs: u32) -> TermsResult {
        for doc in 0..docs {
            agg.collect(doc).unwrap();
        }
        agg.post_collection().build_aggregation()
    }

    #[test]
    fn test_single_valued_counts() {
        let source = MemoryValues::single(["a", "b", "a", "c", "b", "a"]);
        let result = run(aggregator(source, 2), 6);
        assert_eq!(
            result.counts(),
            vec![("a".to_string(), 3), ("b".to_string(), 2)]
        );
        assert_eq!(result.sum_other_doc_count, 1);
    }

    #[test]
    fn test_repeated_value_counts_once() {
        let source = MemoryValues::from_docs(vec![vec!["x", "y", "x"]]);
        let result = run(aggregator(source, 10), 1);
        assert_eq!(result.doc_count("x"), Some(1));
        assert_eq!(result.doc_count("y"), Some(1));
    }

    #[test]
    fn test_docs_without_values_are_skipped() {
        let source = MemoryValues::from_docs(vec![vec!["a"], vec![], vec!["a"]]);
        let result = run(aggregator(source, 10), 3);
        assert_eq!(result.counts(), vec![("a".to_string(), 2)]);
    }

    #[test]
    fn test_empty_stream() {
        let result = run(aggregator(MemoryValues::default(), 10), 0);
        assert!(result.is_empty());
        assert_eq!(result.name, "tags");
    }

    #[test]
    fn test_zero_size() {
        let source = MemoryValues::single(["a", "b"]);
        let result = run(aggregator(source, 0), 2);
        assert!(result.is_empty());
        assert_eq!(result.sum_other_doc_count, 2);
    }

    #[test]
    fn test_min_doc_count_filters_buckets() {
        let source = MemoryValues::single(["a", "b", "a"]);
        let request = TermsAggregation::new("tags").with_min_doc_count(2);
        let agg = TermsAggregator::new(
            "tags",
            &request,
            SubAggregations::new(),
            source,
            &TablePool::default(),
            &SelectionConfig::default(),
        )
        .unwrap();
        let result = run(agg, 3);
        assert_eq!(result.counts(), vec![("a".to_string(), 2)]);
        assert_eq!(result.sum_other_doc_count, 0);
    }

    #[test]
    fn test_matched_set_is_reset_between_documents() {
        let source = MemoryValues::from_docs(vec![vec!["p", "q"], vec!["q", "r"]]);
        let result = run(aggregator(source, 10), 2);
        assert_eq!(result.doc_count("p"), Some(1));
        assert_eq!(result.doc_count("q"), Some(2));
        assert_eq!(result.doc_count("r"), Some(1));
    }
}
