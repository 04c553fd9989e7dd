//! Numeric metric aggregations usable as terms sub-aggregations

mod stats;

pub use stats::StatsAccumulator;

use crate::aggregations::agg_trait::{DocId, SubAggregationFactory, SubAggregator};
use crate::aggregations::types::{AggregationResult, AggregationValue, MetricRequest, MetricType};
use crate::source::NumericSource;
use std::io;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    ValueCount,
    Min,
    Max,
    Sum,
    Avg,
    Stats,
}

const STATS_METRICS: &[&str] = &["count", "min", "max", "sum", "avg"];

impl MetricKind {
    /// Named values of a multi-value result; empty for single-value kinds.
    pub fn metrics(self) -> &'static [&'static str] {
        match self {
            MetricKind::Stats => STATS_METRICS,
            _ => &[],
        }
    }
}

impl From<&MetricType> for MetricKind {
    fn from(metric: &MetricType) -> Self {
        match metric {
            MetricType::ValueCount { .. } => MetricKind::ValueCount,
            MetricType::Min { .. } => MetricKind::Min,
            MetricType::Max { .. } => MetricKind::Max,
            MetricType::Sum { .. } => MetricKind::Sum,
            MetricType::Avg { .. } => MetricKind::Avg,
            MetricType::Stats { .. } => MetricKind::Stats,
        }
    }
}

/// Factory for one named metric over a numeric source.
pub struct MetricAgg {
    name: String,
    kind: MetricKind,
    source: Arc<dyn NumericSource>,
}

impl MetricAgg {
    pub fn new(name: impl Into<String>, kind: MetricKind, source: Arc<dyn NumericSource>) -> Self {
        Self {
            name: name.into(),
            kind,
            source,
        }
    }

    pub fn from_request(request: &MetricRequest, source: Arc<dyn NumericSource>) -> Self {
        Self::new(request.name.clone(), MetricKind::from(&request.metric), source)
    }
}

impl SubAggregationFactory for MetricAgg {
    fn name(&self) -> &str {
        &self.name
    }

    fn metrics(&self) -> &[&str] {
        self.kind.metrics()
    }

    fn create(&self) -> Box<dyn SubAggregator> {
        Box::new(MetricSegment {
            name: self.name.clone(),
            kind: self.kind,
            source: Arc::clone(&self.source),
            stats: StatsAccumulator::default(),
            scratch: Vec::new(),
        })
    }
}

pub struct MetricSegment {
    name: String,
    kind: MetricKind,
    source: Arc<dyn NumericSource>,
    stats: StatsAccumulator,
    scratch: Vec<f64>,
}

impl SubAggregator for MetricSegment {
    fn collect(&mut self, doc: DocId) -> io::Result<()> {
        self.scratch.clear();
        self.source.values(doc, &mut self.scratch)?;
        for &value in &self.scratch {
            self.stats.add(value);
        }
        Ok(())
    }

    fn build_result(&self) -> AggregationResult {
        let value = match self.kind {
            MetricKind::ValueCount => AggregationValue::Single(Some(self.stats.count() as f64)),
            MetricKind::Sum => AggregationValue::Single(Some(self.stats.sum())),
            MetricKind::Min => AggregationValue::Single(self.stats.min()),
            MetricKind::Max => AggregationValue::Single(self.stats.max()),
            MetricKind::Avg => AggregationValue::Single(self.stats.avg()),
            MetricKind::Stats => AggregationValue::Stats(self.stats.to_result()),
        };
        AggregationResult {
            name: self.name.clone(),
            value,
        }
    }
}
