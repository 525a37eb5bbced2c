// Detail panel model: what the side panel shows for the selected node.

use std::fmt::Write as _;

use serde::Serialize;

use cellboard_engine::cell::DisplayKind;
use cellboard_engine::column::Column;
use cellboard_engine::history::HistoryLedger;
use cellboard_engine::path::{self, CellPath};
use cellboard_engine::series::Series;

use crate::display::{GaugeRange, GaugeReading};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChildSummary {
    pub index: usize,
    pub content: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailView {
    /// Path as clicked
    pub requested: CellPath,
    /// Path actually reached; shorter than `requested` when partial
    pub resolved: CellPath,
    pub partial: bool,
    pub breadcrumb: String,
    pub content: String,
    pub value: Option<String>,
    pub unit: String,
    pub kind: DisplayKind,
    pub text: String,
    pub gauge: Option<GaugeReading>,
    pub aggregate: bool,
    pub children: Vec<ChildSummary>,
    /// History of the resolved node, oldest first
    pub history: Vec<String>,
    #[serde(skip)]
    pub series: Series,
}

impl DetailView {
    /// Resolve `requested` against `columns` and collect what the panel
    /// shows. `None` when the column or top-level cell is out of range.
    pub fn build(
        columns: &[Column],
        requested: &CellPath,
        ledger: &HistoryLedger,
        range: &GaugeRange,
    ) -> Option<Self> {
        let resolution = path::resolve(columns, requested)?;
        let cell = resolution.cell;
        let key = resolution.key();

        let gauge = match cell.display {
            DisplayKind::Gauge => cell.numeric_value().map(|n| range.read(n)),
            DisplayKind::Text => None,
        };
        let text = match &gauge {
            Some(reading) => reading.label(&cell.unit),
            None => cell.display_text(),
        };

        let children = cell
            .sub_cells
            .iter()
            .enumerate()
            .map(|(index, sub)| ChildSummary {
                index,
                content: sub.content.clone(),
                text: sub.display_text(),
            })
            .collect();

        let history = ledger.entries(&key).to_vec();
        let series = Series::from_history(cell.content.clone(), &history);

        Some(Self {
            requested: requested.clone(),
            partial: resolution.is_partial(),
            breadcrumb: resolution.breadcrumb(),
            resolved: resolution.resolved,
            content: cell.content.clone(),
            value: cell.effective_value(),
            unit: cell.unit.clone(),
            kind: cell.display,
            text,
            gauge,
            aggregate: cell.is_aggregate(),
            children,
            history,
            series,
        })
    }

    pub fn key(&self) -> String {
        self.resolved.key()
    }

    /// Plain-text rendering used by `inspect`.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.breadcrumb);
        if self.partial {
            let _ = writeln!(
                out,
                "(requested depth {}, resolved depth {})",
                self.requested.depth(),
                self.resolved.depth()
            );
        }
        let _ = writeln!(out, "Content: {}", self.content);
        match &self.value {
            Some(_) if self.aggregate => {
                let _ = writeln!(out, "Value:   {} (average of sub-cells)", self.text);
            }
            Some(_) => {
                let _ = writeln!(out, "Value:   {}", self.text);
            }
            None => {
                let _ = writeln!(out, "Value:   -");
            }
        }
        if self.kind == DisplayKind::Gauge {
            let _ = writeln!(out, "Display: gauge");
        }
        if !self.children.is_empty() {
            let _ = writeln!(out, "Sub-cells:");
            for child in &self.children {
                let text = if child.text.is_empty() { "-" } else { child.text.as_str() };
                let _ = writeln!(out, "  [{}] {}: {}", child.index, child.content, text);
            }
        }
        if !self.history.is_empty() {
            let _ = writeln!(out, "History: {}", self.history.join(", "));
        }
        out
    }
}

/// Every ledger key with its values, one line each, in first-seen order.
pub fn render_ledger(ledger: &HistoryLedger) -> String {
    let mut out = String::new();
    for (key, values) in ledger.all_entries() {
        let _ = writeln!(out, "{}: {}", key, values.join(", "));
    }
    out
}
