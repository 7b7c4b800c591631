//! Time-series storage for telemetry samples.

/// One accumulated sample: runtime seconds against a temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub runtime_s: f64,
    pub value: f64,
}

/// An append-only series for one plotted line. The renderer reads it; only
/// the aggregator writes it.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    label: String,
    points: Vec<Point>,
}

impl TimeSeries {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            points: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }

    pub(crate) fn push(&mut self, runtime_s: f64, value: f64) {
        self.points.push(Point { runtime_s, value });
    }

    pub(crate) fn clear(&mut self) {
        self.points.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_clear() {
        let mut series = TimeSeries::new("AVG");
        series.push(0.0, 21.0);
        series.push(2.0, 22.5);
        assert_eq!(series.len(), 2);
        assert_eq!(series.last(), Some(Point { runtime_s: 2.0, value: 22.5 }));
        series.clear();
        assert!(series.is_empty());
    }
}
