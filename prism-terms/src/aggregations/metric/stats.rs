use crate::aggregations::types::StatsResult;

/// Running count/sum/min/max over the values a bucket has seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsAccumulator {
    count: u64,
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl StatsAccumulator {
    pub fn add(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        self.count += 1;
        self.sum += value;
        self.min = Some(self.min.map_or(value, |min| min.min(value)));
        self.max = Some(self.max.map_or(value, |max| max.max(value)));
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }

    pub fn avg(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }

    pub fn to_result(&self) -> StatsResult {
        StatsResult {
            count: self.count,
            min: self.min,
            max: self.max,
            sum: (self.count > 0).then_some(self.sum),
            avg: self.avg(),
        }
    }
}
