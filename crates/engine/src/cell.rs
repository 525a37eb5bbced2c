use serde::{Deserialize, Serialize};

/// How a cell is rendered on the dashboard
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DisplayKind {
    /// Value text with its unit suffix
    #[default]
    Text,
    /// Bounded dial reading (temperature-style)
    Gauge,
}

/// Content fragments that mark a legacy cell as a gauge when the file
/// carries no explicit `display` tag.
const GAUGE_MARKERS: &[&str] = &["температур", "temperature"];

impl DisplayKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayKind::Text => "text",
            DisplayKind::Gauge => "gauge",
        }
    }

    /// Parse a `display` tag. Unknown tags yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" => Some(DisplayKind::Text),
            "gauge" => Some(DisplayKind::Gauge),
            _ => None,
        }
    }

    /// Kind for an untagged cell, derived once from its content at load time.
    pub fn infer(content: &str) -> Self {
        let lower = content.to_lowercase();
        if GAUGE_MARKERS.iter().any(|m| lower.contains(m)) {
            DisplayKind::Gauge
        } else {
            DisplayKind::Text
        }
    }
}

impl std::fmt::Display for DisplayKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A dashboard cell. Sub-cells have the same shape, to any depth.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    /// Label shown above the value; not required to be unique
    pub content: String,
    /// Display value as text; empty = absent
    pub value: String,
    /// Unit suffix, appended only when rendering
    pub unit: String,
    pub display: DisplayKind,
    pub sub_cells: Vec<Cell>,
}

impl Cell {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_display(mut self, display: DisplayKind) -> Self {
        self.display = display;
        self
    }

    pub fn with_sub_cells(mut self, sub_cells: Vec<Cell>) -> Self {
        self.sub_cells = sub_cells;
        self
    }

    /// No own value but has children: the displayed value is derived.
    pub fn is_aggregate(&self) -> bool {
        self.value.is_empty() && !self.sub_cells.is_empty()
    }

    /// The value the dashboard shows for this cell.
    ///
    /// A cell's own value wins. An aggregate cell shows the mean of its
    /// children's numeric effective values, formatted with two decimals;
    /// children that don't parse are skipped. Computed on every read and
    /// never written back.
    pub fn effective_value(&self) -> Option<String> {
        if !self.value.is_empty() {
            return Some(self.value.clone());
        }
        mean(self.sub_cells.iter().filter_map(|c| c.numeric_value())).map(format_number)
    }

    /// Effective value parsed as a finite number.
    pub fn numeric_value(&self) -> Option<f64> {
        self.effective_value().as_deref().and_then(parse_number)
    }

    /// Effective value with the unit suffix, or empty when there is no value.
    pub fn display_text(&self) -> String {
        match self.effective_value() {
            Some(v) if self.unit.is_empty() => v,
            Some(v) => format!("{} {}", v, self.unit),
            None => String::new(),
        }
    }

    /// Number of levels below this cell (0 for a leaf).
    pub fn depth(&self) -> usize {
        self.sub_cells
            .iter()
            .map(|c| c.depth() + 1)
            .max()
            .unwrap_or(0)
    }
}

/// Format a number the way values are stored: exactly two fractional digits.
pub fn format_number(n: f64) -> String {
    format!("{:.2}", n)
}

/// Parse display text as a finite number. `nan`/`inf` don't count.
pub fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
