// Numeric series for the chart panel

use super::cell::parse_number;

/// A labeled sequence of samples plotted against their index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    pub label: String,
    pub values: Vec<f64>,
}

impl Series {
    pub fn new(label: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            values,
        }
    }

    /// Series from recorded history values. Entries that don't parse as
    /// numbers are skipped.
    pub fn from_history(label: impl Into<String>, entries: &[String]) -> Self {
        let values = entries.iter().filter_map(|e| leading_number(e)).collect();
        Self::new(label, values)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Plot points as (index, value). An empty series plots a single origin point.
    pub fn points(&self) -> Vec<(f64, f64)> {
        if self.values.is_empty() {
            return vec![(0.0, 0.0)];
        }
        self.values
            .iter()
            .enumerate()
            .map(|(i, &v)| (i as f64, v))
            .collect()
    }

    /// X axis bounds.
    pub fn x_range(&self) -> (f64, f64) {
        if self.values.is_empty() {
            (0.0, 10.0)
        } else {
            (0.0, (self.values.len() - 1) as f64)
        }
    }

    /// Y axis bounds. A flat series gets one unit of headroom.
    pub fn y_range(&self) -> (f64, f64) {
        if self.values.is_empty() {
            return (0.0, 10.0);
        }
        let min = self.values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if min == max {
            (min, max + 1.0)
        } else {
            (min, max)
        }
    }

    pub fn title(&self) -> String {
        format!("Chart: {}", self.label)
    }
}

/// History values are display strings and may carry a unit, with or
/// without a space ("21.50 °C", "120°C"). The longest numeric prefix wins.
fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let end = s
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')))
        .unwrap_or(s.len());
    (1..=end).rev().find_map(|i| parse_number(&s[..i]))
}
