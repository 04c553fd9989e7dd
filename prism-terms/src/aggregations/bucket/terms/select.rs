//! Bounded top-k selection.
//!
//! Two interchangeable strategies keep the best `size` items seen so far:
//! a max-heap of the current worst items for small `size`, and an ordered
//! set trimmed from its tail for large `size`. Both return items best first.

use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionStrategy {
    PriorityQueue,
    OrderedSet,
}

impl SelectionStrategy {
    /// Sizes below `queue_limit` use the priority queue.
    pub fn for_size(size: usize, queue_limit: usize) -> Self {
        if size < queue_limit {
            SelectionStrategy::PriorityQueue
        } else {
            SelectionStrategy::OrderedSet
        }
    }
}

/// An item ordered by the caller's comparator, `Less` ranking first.
struct Ranked<'c, T, F> {
    item: T,
    compare: &'c F,
}

impl<T, F> PartialEq for Ranked<'_, T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T, F> Eq for Ranked<'_, T, F> where F: Fn(&T, &T) -> Ordering {}

impl<T, F> PartialOrd for Ranked<'_, T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T, F> Ord for Ranked<'_, T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    fn cmp(&self, other: &Self) -> Ordering {
        (self.compare)(&self.item, &other.item)
    }
}

/// Keep the best `size` items under `compare`, returned best first.
///
/// `compare` must be a strict total order over the items: the ordered-set
/// strategy keeps only one of two items that compare equal.
pub fn select_top_k<T, I, F>(items: I, compare: F, size: usize, strategy: SelectionStrategy) -> Vec<T>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T, &T) -> Ordering,
{
    if size == 0 {
        items.into_iter().for_each(drop);
        return Vec::new();
    }

    match strategy {
        SelectionStrategy::PriorityQueue => {
            // The heap top is the worst item kept so far.
            let mut heap = BinaryHeap::with_capacity(size + 1);
            for item in items {
                heap.push(Ranked {
                    item,
                    compare: &compare,
                });
                if heap.len() > size {
                    heap.pop();
                }
            }
            let mut selected = Vec::with_capacity(heap.len());
            while let Some(ranked) = heap.pop() {
                selected.push(ranked.item);
            }
            selected.reverse();
            selected
        }
        SelectionStrategy::OrderedSet => {
            let mut set = BTreeSet::new();
            for item in items {
                set.insert(Ranked {
                    item,
                    compare: &compare,
                });
                if set.len() > size {
                    set.pop_last();
                }
            }
            set.into_iter().map(|ranked| ranked.item).collect()
        }
    }
}
