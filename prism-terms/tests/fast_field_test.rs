//! Terms aggregation over tantivy fast fields through `TermsCollector`.

use prism_terms::aggregations::{
    collect_segments, BucketOrder, Direction, MetricRequest, MetricType, TermsAggregation, TermsCollector, TermsRequest,
};
use prism_terms::config::{PoolConfig, SelectionConfig};
use prism_terms::table::TablePool;
use tantivy::query::AllQuery;
use tantivy::schema::{Schema, FAST, STRING};
use tantivy::{doc, Index, IndexWriter, Searcher};

/// One commit per inner vec, so each becomes its own segment.
fn build_index(segments: &[Vec<(&[&str], f64)>]) -> Searcher {
    let mut builder = Schema::builder();
    let lang = builder.add_text_field("lang", STRING | FAST);
    let stars = builder.add_f64_field("stars", FAST);
    let index = Index::create_in_ram(builder.build());

    let mut writer: IndexWriter = index.writer_with_num_threads(1, 15_000_000).unwrap();
    for segment in segments {
        for (langs, star_count) in segment {
            let mut document = doc!(stars => *star_count);
            for value in langs.iter() {
                document.add_text(lang, value);
            }
            writer.add_document(document).unwrap();
        }
        writer.commit().unwrap();
    }

    let reader = index.reader().unwrap();
    reader.reload().unwrap();
    reader.searcher()
}

fn request(terms: TermsAggregation, aggs: Vec<MetricRequest>) -> TermsRequest {
    TermsRequest {
        name: "langs".to_string(),
        terms,
        aggs,
    }
}

#[test]
fn test_single_segment_counts() {
    let searcher = build_index(&[vec![
        (&["rust"][..], 10.0),
        (&["rust", "go"][..], 4.0),
        (&["go", "go"][..], 2.0),
        (&[][..], 1.0),
        (&["zig", "rust"][..], 7.0),
    ]]);

    let pool = TablePool::default();
    let collector = TermsCollector::new(
        request(TermsAggregation::new("lang").with_size(2), Vec::new()),
        pool.clone(),
        SelectionConfig::default(),
    );
    let results = searcher.search(&AllQuery, &collector).unwrap();

    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert_eq!(result.name, "langs");
    assert_eq!(
        result.counts(),
        vec![("rust".to_string(), 3), ("go".to_string(), 2)]
    );
    assert_eq!(result.sum_other_doc_count, 1);
    assert_eq!(pool.in_use(), 0);
}

#[test]
fn test_metric_sub_aggregation_from_fast_field() {
    let searcher = build_index(&[vec![
        (&["rust"][..], 10.0),
        (&["rust"][..], 30.0),
        (&["go"][..], 4.0),
    ]]);

    let collector = TermsCollector::new(
        request(
            TermsAggregation::new("lang")
                .with_order(BucketOrder::sub_aggregation("max_stars", Direction::Asc)),
            vec![
                MetricType::max("stars").named("max_stars"),
                MetricType::avg("stars").named("avg_stars"),
            ],
        ),
        TablePool::default(),
        SelectionConfig::default(),
    );
    let results = searcher.search(&AllQuery, &collector).unwrap();
    let result = &results[0];

    assert_eq!(
        result.counts(),
        vec![("go".to_string(), 1), ("rust".to_string(), 2)]
    );
    let rust = result.bucket(b"rust").unwrap();
    assert_eq!(rust.sub_metric("max_stars", None), Some(30.0));
    assert_eq!(rust.sub_metric("avg_stars", None), Some(20.0));
}

#[test]
fn test_one_result_per_segment() {
    let searcher = build_index(&[
        vec![(&["a"][..], 1.0), (&["b"][..], 1.0)],
        vec![(&["a"][..], 1.0), (&["a"][..], 1.0)],
    ]);
    assert_eq!(searcher.segment_readers().len(), 2);

    let pool = TablePool::default();
    let collector = TermsCollector::new(
        request(TermsAggregation::new("lang"), Vec::new()),
        pool.clone(),
        SelectionConfig::default(),
    );
    let results = searcher.search(&AllQuery, &collector).unwrap();

    assert_eq!(results.len(), 2);
    let total_a: u64 = results.iter().filter_map(|r| r.doc_count("a")).sum();
    assert_eq!(total_a, 3);
    assert_eq!(pool.in_use(), 0);
    assert_eq!(pool.stats().acquired(), 2);
}

#[test]
fn test_unknown_field_fails_search() {
    let searcher = build_index(&[vec![(&["a"][..], 1.0)]]);
    let collector = TermsCollector::new(
        request(TermsAggregation::new("missing"), Vec::new()),
        TablePool::default(),
        SelectionConfig::default(),
    );
    assert!(searcher.search(&AllQuery, &collector).is_err());
}

#[test]
fn test_collect_segments_in_parallel() {
    let searcher = build_index(&[
        vec![(&["a", "b"][..], 1.0), (&["b"][..], 1.0)],
        vec![(&["a"][..], 1.0)],
        vec![(&["c", "c"][..], 1.0), (&["a"][..], 1.0)],
    ]);

    // Fewer tables than segments: segments run in two rounds.
    let pool = TablePool::new(PoolConfig {
        max_tables: 2,
        max_idle: 2,
        initial_capacity: 0,
        ..PoolConfig::default()
    });
    let request = request(TermsAggregation::new("lang"), Vec::new());
    let results = collect_segments(&searcher, &request, &pool, &SelectionConfig::default()).unwrap();

    assert_eq!(results.len(), 3);
    // Segment order is up to the index; compare as a set.
    let mut per_segment: Vec<Vec<(String, u64)>> = results.iter().map(|r| r.counts()).collect();
    per_segment.sort();
    assert_eq!(
        per_segment,
        vec![
            vec![("a".to_string(), 1)],
            vec![("a".to_string(), 1), ("c".to_string(), 1)],
            vec![("b".to_string(), 2), ("a".to_string(), 1)],
        ]
    );
    assert_eq!(pool.in_use(), 0);
    assert_eq!(pool.stats().exhausted(), 0);
}
