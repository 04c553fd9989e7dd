//! Bucket tables: the hash-keyed bucket storage behind a terms aggregation.
//!
//! A table maps term keys to buckets. Buckets live in a dense vector and are
//! addressed by [`BucketOrd`]; the hash index stores `(hash, ord)` pairs and
//! compares the precomputed hash before the key bytes. Tables are recycled
//! through a [`TablePool`].

mod key;
mod pool;
mod stats;

pub use key::{hash_bytes, HashedBytes, TermKey};
pub use pool::{PooledTable, TablePool};
pub use stats::PoolStats;

use crate::aggregations::{AggregationResult, DocId, SubAggregator};
use hashbrown::HashTable;
use std::fmt;
use std::ops::{Index, IndexMut};

/// Identity of a bucket within one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BucketOrd(usize);

impl BucketOrd {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Accumulator for every document sharing one term.
pub struct Bucket {
    key: TermKey,
    doc_count: u64,
    sub_aggs: Vec<Box<dyn SubAggregator>>,
}

impl Bucket {
    pub fn new(key: TermKey, sub_aggs: Vec<Box<dyn SubAggregator>>) -> Self {
        Self {
            key,
            doc_count: 0,
            sub_aggs,
        }
    }

    pub fn key(&self) -> &TermKey {
        &self.key
    }

    pub fn doc_count(&self) -> u64 {
        self.doc_count
    }

    /// Count the document and pass it to every nested aggregation.
    pub fn collect(&mut self, doc: DocId) -> std::io::Result<()> {
        self.doc_count += 1;
        for sub_agg in &mut self.sub_aggs {
            sub_agg.collect(doc)?;
        }
        Ok(())
    }

    pub fn post_collection(&mut self) {
        for sub_agg in &mut self.sub_aggs {
            sub_agg.post_collection();
        }
    }

    /// Detach the bucket from its table, building the nested results.
    pub fn into_parts(self) -> (TermKey, u64, Vec<AggregationResult>) {
        let sub_aggs = self
            .sub_aggs
            .iter()
            .map(|sub_agg| sub_agg.build_result())
            .collect();
        (self.key, self.doc_count, sub_aggs)
    }
}

impl fmt::Debug for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bucket")
            .field("key", &self.key)
            .field("doc_count", &self.doc_count)
            .field("sub_aggs", &self.sub_aggs.len())
            .finish()
    }
}

/// Hash map from term key to bucket.
#[derive(Default)]
pub struct BucketTable {
    index: HashTable<(u64, BucketOrd)>,
    buckets: Vec<Bucket>,
}

impl BucketTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            index: HashTable::with_capacity(capacity),
            buckets: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.buckets.capacity()
    }

    pub fn find(&self, value: HashedBytes<'_>) -> Option<BucketOrd> {
        let buckets = &self.buckets;
        self.index
            .find(value.hash(), |(hash, ord)| {
                *hash == value.hash() && buckets[ord.0].key.matches(value)
            })
            .map(|(_, ord)| *ord)
    }

    /// Return the bucket for `value`, creating it with `create` when the term
    /// has not been seen yet. `create` only runs on the insert path, so key
    /// bytes are copied once per distinct term.
    pub fn lookup_or_insert<F>(&mut self, value: HashedBytes<'_>, create: F) -> BucketOrd
    where
        F: FnOnce(HashedBytes<'_>) -> Bucket,
    {
        if let Some(ord) = self.find(value) {
            return ord;
        }

        let bucket = create(value);
        debug_assert!(bucket.key.matches(value), "bucket key differs from value");

        let ord = BucketOrd(self.buckets.len());
        self.buckets.push(bucket);
        self.index
            .insert_unique(value.hash(), (value.hash(), ord), |(hash, _)| *hash);
        ord
    }

    pub fn get(&self, ord: BucketOrd) -> Option<&Bucket> {
        self.buckets.get(ord.0)
    }

    pub fn get_mut(&mut self, ord: BucketOrd) -> Option<&mut Bucket> {
        self.buckets.get_mut(ord.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bucket> {
        self.buckets.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Bucket> {
        self.buckets.iter_mut()
    }

    /// Move every bucket out, leaving an empty table with its capacity intact.
    pub fn drain(&mut self) -> impl Iterator<Item = Bucket> + '_ {
        self.index.clear();
        self.buckets.drain(..)
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.buckets.clear();
    }

    /// Give back memory above `min_capacity`, keeping every bucket.
    pub fn shrink_to(&mut self, min_capacity: usize) {
        self.buckets.shrink_to(min_capacity);
        self.index.shrink_to(min_capacity, |(hash, _)| *hash);
    }
}

impl Index<BucketOrd> for BucketTable {
    type Output = Bucket;

    fn index(&self, ord: BucketOrd) -> &Self::Output {
        &self.buckets[ord.0]
    }
}

impl IndexMut<BucketOrd> for BucketTable {
    fn index_mut(&mut self, ord: BucketOrd) -> &mut Self::Output {
        &mut self.buckets[ord.0]
    }
}

impl fmt::Debug for BucketTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BucketTable")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}
