use serde::{Deserialize, Serialize};

/// A named metric computed inside every terms bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRequest {
    pub name: String,
    #[serde(flatten)]
    pub metric: MetricType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MetricType {
    ValueCount { field: String },
    Min { field: String },
    Max { field: String },
    Sum { field: String },
    Avg { field: String },
    Stats { field: String },
}

impl MetricType {
    pub fn field(&self) -> &str {
        match self {
            MetricType::ValueCount { field }
            | MetricType::Min { field }
            | MetricType::Max { field }
            | MetricType::Sum { field }
            | MetricType::Avg { field }
            | MetricType::Stats { field } => field,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationResult {
    pub name: String,
    pub value: AggregationValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AggregationValue {
    Single(Option<f64>),
    Stats(StatsResult),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsResult {
    pub count: u64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub sum: Option<f64>,
    pub avg: Option<f64>,
}

impl AggregationResult {
    /// Resolve a numeric value for ordering. Single-value results answer to
    /// no metric or `value`; stats results need one of their field names.
    pub fn metric(&self, metric: Option<&str>) -> Option<f64> {
        match (&self.value, metric) {
            (AggregationValue::Single(value), None | Some("value")) => *value,
            (AggregationValue::Single(_), Some(_)) => None,
            (AggregationValue::Stats(stats), Some(name)) => match name {
                "count" => Some(stats.count as f64),
                "min" => stats.min,
                "max" => stats.max,
                "sum" => stats.sum,
                "avg" => stats.avg,
                _ => None,
            },
            (AggregationValue::Stats(_), None) => None,
        }
    }
}
