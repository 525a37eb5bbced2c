// Headless presentation tree.
//
// Built once from a column list and then mutated in place by the
// reconciler. Front-ends (the terminal dashboard, tests) only read it.

use serde::Serialize;

use cellboard_engine::cell::{Cell, DisplayKind};
use cellboard_engine::column::Column;
use cellboard_engine::path::CellPath;

/// Unit shown on a gauge whose cell has none.
pub const DEFAULT_GAUGE_UNIT: &str = "°C";

/// Scale of every gauge on the board.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GaugeRange {
    pub min: f64,
    pub max: f64,
}

impl Default for GaugeRange {
    fn default() -> Self {
        Self { min: 0.0, max: 120.0 }
    }
}

impl GaugeRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Position of `value` on the scale, 0.0..=1.0.
    pub fn fraction(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        (self.clamp(value) - self.min) / span
    }

    /// Read a value against this scale.
    pub fn read(&self, value: f64) -> GaugeReading {
        let fraction = self.fraction(value);
        GaugeReading {
            raw: value,
            clamped: self.clamp(value),
            fraction,
            band: GaugeBand::for_fraction(fraction),
        }
    }
}

/// Color band of a gauge reading. Boundaries sit at 20, 40, 60 and 90 on
/// a 0..120 scale and stretch proportionally for other ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GaugeBand {
    Cold,
    Normal,
    Warm,
    Hot,
    Critical,
}

impl GaugeBand {
    pub fn for_fraction(fraction: f64) -> Self {
        let scaled = fraction * 120.0;
        if scaled < 20.0 {
            GaugeBand::Cold
        } else if scaled < 40.0 {
            GaugeBand::Normal
        } else if scaled < 60.0 {
            GaugeBand::Warm
        } else if scaled < 90.0 {
            GaugeBand::Hot
        } else {
            GaugeBand::Critical
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GaugeReading {
    /// Value as stored
    pub raw: f64,
    /// Value pinned to the scale; display only
    pub clamped: f64,
    pub fraction: f64,
    pub band: GaugeBand,
}

impl GaugeReading {
    /// Whole-number label, e.g. "72°C".
    pub fn label(&self, unit: &str) -> String {
        let unit = if unit.is_empty() { DEFAULT_GAUGE_UNIT } else { unit };
        format!("{:.0}{}", self.clamped, unit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayNode {
    pub path: CellPath,
    pub title: String,
    pub kind: DisplayKind,
    /// Effective value as last rendered
    pub value: Option<String>,
    /// Text shown for the value (unit appended, or gauge label)
    pub text: String,
    pub gauge: Option<GaugeReading>,
    pub children: Vec<DisplayNode>,
}

impl DisplayNode {
    pub fn build(cell: &Cell, path: CellPath, range: &GaugeRange) -> Self {
        let children = cell
            .sub_cells
            .iter()
            .enumerate()
            .map(|(i, sub)| DisplayNode::build(sub, path.child(i), range))
            .collect();

        let mut node = Self {
            path,
            title: cell.content.clone(),
            kind: cell.display,
            value: None,
            text: String::new(),
            gauge: None,
            children,
        };
        node.render(cell, range);
        node
    }

    /// Refresh this node's value, text and gauge from `cell`.
    /// Title, kind and children are left as built. Returns true if
    /// anything visible changed.
    pub fn render(&mut self, cell: &Cell, range: &GaugeRange) -> bool {
        let value = cell.effective_value();
        let (text, gauge) = match self.kind {
            DisplayKind::Gauge => match cell.numeric_value() {
                Some(n) => {
                    let reading = range.read(n);
                    (reading.label(&cell.unit), Some(reading))
                }
                None => (cell.display_text(), None),
            },
            DisplayKind::Text => (cell.display_text(), None),
        };

        let changed = self.value != value || self.text != text || self.gauge != gauge;
        self.value = value;
        self.text = text;
        self.gauge = gauge;
        changed
    }

    /// Walk this node and its descendants, parents first.
    pub fn visit<'a>(&'a self, out: &mut Vec<&'a DisplayNode>) {
        out.push(self);
        for child in &self.children {
            child.visit(out);
        }
    }

    fn find(&self, sub: &[usize]) -> Option<&DisplayNode> {
        match sub.split_first() {
            None => Some(self),
            Some((&i, rest)) => self.children.get(i)?.find(rest),
        }
    }

    fn find_mut(&mut self, sub: &[usize]) -> Option<&mut DisplayNode> {
        match sub.split_first() {
            None => Some(self),
            Some((&i, rest)) => self.children.get_mut(i)?.find_mut(rest),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayColumn {
    pub index: usize,
    pub header: String,
    pub cells: Vec<DisplayNode>,
}

impl DisplayColumn {
    /// Every node in the column flattened top to bottom, parents first.
    pub fn rows(&self) -> Vec<&DisplayNode> {
        let mut out = Vec::new();
        for cell in &self.cells {
            cell.visit(&mut out);
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayTree {
    columns: Vec<DisplayColumn>,
    range: GaugeRange,
}

impl DisplayTree {
    /// Build the tree for a column list. Only the first
    /// `min(cell_count, cells.len())` cells of each column get nodes.
    pub fn build(columns: &[Column], range: GaugeRange) -> Self {
        let columns = columns
            .iter()
            .enumerate()
            .map(|(c, column)| DisplayColumn {
                index: c,
                header: column.name.clone(),
                cells: column
                    .visible_cells()
                    .iter()
                    .enumerate()
                    .map(|(r, cell)| DisplayNode::build(cell, CellPath::new(c, r), &range))
                    .collect(),
            })
            .collect();
        Self { columns, range }
    }

    pub fn range(&self) -> &GaugeRange {
        &self.range
    }

    pub fn columns(&self) -> &[DisplayColumn] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Option<&DisplayColumn> {
        self.columns.get(index)
    }

    pub fn node(&self, path: &CellPath) -> Option<&DisplayNode> {
        self.columns
            .get(path.column)?
            .cells
            .get(path.cell)?
            .find(&path.sub)
    }

    pub fn node_mut(&mut self, path: &CellPath) -> Option<&mut DisplayNode> {
        self.columns
            .get_mut(path.column)?
            .cells
            .get_mut(path.cell)?
            .find_mut(&path.sub)
    }

    /// Paths of every node, column by column, parents before children.
    pub fn paths(&self) -> Vec<CellPath> {
        self.columns
            .iter()
            .flat_map(|c| c.rows())
            .map(|n| n.path.clone())
            .collect()
    }

    /// Flattened row count per column.
    pub fn column_lens(&self) -> Vec<usize> {
        self.columns.iter().map(|c| c.rows().len()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<Column> {
        vec![
            Column::new(
                "Boiler",
                2,
                vec![
                    Cell::new("Температура")
                        .with_value("150")
                        .with_display(DisplayKind::Gauge),
                    Cell::new("Pumps").with_sub_cells(vec![
                        Cell::new("P1").with_value("10").with_unit("bar"),
                        Cell::new("P2").with_value("20").with_unit("bar"),
                    ]),
                    Cell::new("hidden"),
                ],
            ),
            Column::new("Empty", 0, vec![Cell::new("also hidden")]),
        ]
    }

    #[test]
    fn test_build_respects_visible_bound() {
        let tree = DisplayTree::build(&columns(), GaugeRange::default());
        assert_eq!(tree.columns().len(), 2);
        assert_eq!(tree.column(0).unwrap().cells.len(), 2);
        assert!(tree.column(1).unwrap().cells.is_empty());
        assert_eq!(tree.column_lens(), vec![4, 0]);
        assert!(tree.node(&CellPath::new(0, 2)).is_none());
    }

    #[test]
    fn test_gauge_is_clamped_for_display_only() {
        let cols = columns();
        let tree = DisplayTree::build(&cols, GaugeRange::default());
        let node = tree.node(&CellPath::new(0, 0)).unwrap();
        let gauge = node.gauge.unwrap();
        assert_eq!(gauge.raw, 150.0);
        assert_eq!(gauge.clamped, 120.0);
        assert_eq!(gauge.band, GaugeBand::Critical);
        assert_eq!(node.text, "120°C");
        assert_eq!(node.value.as_deref(), Some("150"));
        assert_eq!(cols[0].cells[0].value, "150");
    }

    #[test]
    fn test_aggregate_node_text() {
        let tree = DisplayTree::build(&columns(), GaugeRange::default());
        let pumps = tree.node(&CellPath::new(0, 1)).unwrap();
        assert_eq!(pumps.value.as_deref(), Some("15.00"));
        assert_eq!(pumps.children.len(), 2);
        let p2 = tree.node(&CellPath::with_sub(0, 1, vec![1])).unwrap();
        assert_eq!(p2.text, "20 bar");
        assert_eq!(p2.path.key(), "col0/cell1/sub1");
    }

    #[test]
    fn test_gauge_bands() {
        let range = GaugeRange::default();
        assert_eq!(range.read(-5.0).band, GaugeBand::Cold);
        assert_eq!(range.read(25.0).band, GaugeBand::Normal);
        assert_eq!(range.read(45.0).band, GaugeBand::Warm);
        assert_eq!(range.read(89.0).band, GaugeBand::Hot);
        assert_eq!(range.read(90.0).band, GaugeBand::Critical);

        let wide = GaugeRange::new(0.0, 240.0);
        assert_eq!(wide.read(45.0).band, GaugeBand::Normal);
        assert_eq!(wide.fraction(120.0), 0.5);
    }

    #[test]
    fn test_gauge_without_number_shows_text() {
        let cols = vec![Column::new(
            "A",
            1,
            vec![Cell::new("Temperature").with_value("offline")],
        )];
        let tree = DisplayTree::build(&cols, GaugeRange::default());
        let node = tree.node(&CellPath::new(0, 0)).unwrap();
        assert_eq!(node.kind, DisplayKind::Text);
        let gauge_cols = vec![Column::new(
            "A",
            1,
            vec![Cell::new("t").with_value("offline").with_display(DisplayKind::Gauge)],
        )];
        let tree = DisplayTree::build(&gauge_cols, GaugeRange::default());
        let node = tree.node(&CellPath::new(0, 0)).unwrap();
        assert_eq!(node.gauge, None);
        assert_eq!(node.text, "offline");
    }
}
