//! Property-based tests: aggregation output against a brute-force count.

use prism_terms::aggregations::bucket::terms::{select_top_k, SelectionStrategy};
use prism_terms::aggregations::{
    BucketOrder, SubAggregations, TermsAggregation, TermsAggregator, TermsResult,
};
use prism_terms::config::SelectionConfig;
use prism_terms::source::MemoryValues;
use prism_terms::table::TablePool;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn arb_docs() -> impl Strategy<Value = Vec<Vec<String>>> {
    let term = (0u8..12).prop_map(|i| format!("k{}", i));
    prop::collection::vec(prop::collection::vec(term, 0..5), 0..60)
}

/// Documents per distinct term, counting each document once.
fn expected_counts(docs: &[Vec<String>]) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for doc in docs {
        let distinct: BTreeSet<&String> = doc.iter().collect();
        for term in distinct {
            *counts.entry(term.clone()).or_insert(0) += 1;
        }
    }
    counts
}

fn run(docs: &[Vec<String>], request: &TermsAggregation, queue_limit: usize) -> TermsResult {
    let pool = TablePool::default();
    let selection = SelectionConfig {
        queue_limit,
        default_size: 10,
    };
    let mut agg = TermsAggregator::new(
        "terms",
        request,
        SubAggregations::new(),
        MemoryValues::from_docs(docs),
        &pool,
        &selection,
    )
    .unwrap();
    for doc in 0..docs.len() as u32 {
        agg.collect(doc).unwrap();
    }
    let result = agg.post_collection().build_aggregation();
    assert_eq!(pool.in_use(), 0);
    result
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_counts_match_brute_force(docs in arb_docs(), size in 0usize..15) {
        let expected = expected_counts(&docs);
        let mut ranked: Vec<(String, u64)> = expected.clone().into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(size);

        let request = TermsAggregation::new("tag").with_size(size);
        let result = run(&docs, &request, 5000);

        prop_assert_eq!(result.counts(), ranked.clone());

        let total: u64 = expected.values().sum();
        let selected: u64 = ranked.iter().map(|(_, count)| count).sum();
        prop_assert_eq!(result.sum_other_doc_count, total - selected);
    }

    #[test]
    fn prop_strategies_agree(docs in arb_docs(), size in 1usize..15, by_term in any::<bool>()) {
        let order = if by_term { BucketOrder::term_desc() } else { BucketOrder::count_asc() };
        let request = TermsAggregation::new("tag").with_size(size).with_order(order);

        let with_heap = run(&docs, &request, usize::MAX);
        let with_set = run(&docs, &request, 1);
        prop_assert_eq!(with_heap, with_set);
    }

    #[test]
    fn prop_doc_count_never_exceeds_docs_with_values(docs in arb_docs()) {
        let request = TermsAggregation::new("tag").with_size(100);
        let result = run(&docs, &request, 5000);
        let docs_with_values = docs.iter().filter(|doc| !doc.is_empty()).count() as u64;
        for bucket in &result.buckets {
            prop_assert!(bucket.doc_count >= 1);
            prop_assert!(bucket.doc_count <= docs_with_values);
        }
    }

    #[test]
    fn prop_select_top_k_matches_sort(items in prop::collection::vec(any::<u32>(), 0..200), size in 0usize..50) {
        let mut sorted: Vec<u32> = items.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        sorted.truncate(size);

        let distinct: Vec<u32> = items.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        for strategy in [SelectionStrategy::PriorityQueue, SelectionStrategy::OrderedSet] {
            let top = select_top_k(distinct.iter().rev().copied(), |a: &u32, b: &u32| a.cmp(b), size, strategy);
            prop_assert_eq!(&top, &sorted);
        }
    }
}
