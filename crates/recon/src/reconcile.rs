use chrono::{DateTime, Local};
use serde::Serialize;

use cellboard_engine::cell::Cell;
use cellboard_engine::column::Column;
use cellboard_engine::history::HistoryLedger;
use cellboard_engine::path::{self, CellPath};

use crate::display::DisplayTree;

/// What one reconciliation pass did to the display tree.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    /// Nodes whose value, text or gauge changed
    pub updated: Vec<CellPath>,
    /// Nodes matched with identical output
    pub unchanged: usize,
    /// Live nodes with no data at their path; left as last rendered
    pub stale: Vec<CellPath>,
    /// Fresh data with no live node; not shown
    pub dropped: Vec<CellPath>,
    /// Matched nodes whose title or display kind no longer agrees
    pub relabeled: Vec<CellPath>,
    /// Columns whose header no longer agrees with the fresh name
    pub renamed_columns: Vec<usize>,
    /// History entries appended
    pub recorded: usize,
    pub refreshed_at: DateTime<Local>,
}

impl ReconcileReport {
    /// The fresh layout does not line up with the live tree.
    /// Values were still applied wherever a path matched.
    pub fn structure_changed(&self) -> bool {
        !self.stale.is_empty()
            || !self.dropped.is_empty()
            || !self.relabeled.is_empty()
            || !self.renamed_columns.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} updated, {} unchanged, {} stale, {} dropped, {} relabeled, {} renamed",
            self.updated.len(),
            self.unchanged,
            self.stale.len(),
            self.dropped.len(),
            self.relabeled.len(),
            self.renamed_columns.len()
        )
    }
}

/// Push fresh values into an existing display tree without rebuilding it.
///
/// Every live node is matched to the fresh column list by its path. A
/// top-level cell only matches while it is within its column's visible
/// bound. Matched nodes are re-rendered and, when `ledger` is given, the
/// cell's value with its unit is offered to the history under the node's
/// key. Gauge clamping never reaches the ledger.
pub fn reconcile(
    tree: &mut DisplayTree,
    columns: &[Column],
    mut ledger: Option<&mut HistoryLedger>,
) -> ReconcileReport {
    let mut report = ReconcileReport {
        updated: Vec::new(),
        unchanged: 0,
        stale: Vec::new(),
        dropped: Vec::new(),
        relabeled: Vec::new(),
        renamed_columns: Vec::new(),
        recorded: 0,
        refreshed_at: Local::now(),
    };

    let range = *tree.range();
    for live in tree.paths() {
        let Some(cell) = fresh_cell(columns, &live) else {
            report.stale.push(live);
            continue;
        };
        let Some(node) = tree.node_mut(&live) else {
            continue;
        };

        if node.title != cell.content || node.kind != cell.display {
            report.relabeled.push(live.clone());
        }

        if node.render(cell, &range) {
            report.updated.push(live.clone());
        } else {
            report.unchanged += 1;
        }

        if let Some(ledger) = ledger.as_deref_mut() {
            if ledger.append(&live.key(), &cell.display_text()) {
                report.recorded += 1;
            }
        }
    }

    report.dropped = unmatched_fresh_paths(tree, columns);

    report.renamed_columns = columns
        .iter()
        .enumerate()
        .filter(|(c, column)| tree.column(*c).is_some_and(|live| live.header != column.name))
        .map(|(c, _)| c)
        .collect();

    log::debug!("Reconciled display tree: {}", report.summary());
    report
}

/// Exact match only; a partial resolution means the node has no data.
fn fresh_cell<'a>(columns: &'a [Column], live: &CellPath) -> Option<&'a Cell> {
    let column = columns.get(live.column)?;
    if live.cell >= column.visible_len() {
        return None;
    }
    let resolution = path::resolve(columns, live)?;
    if resolution.is_partial() {
        None
    } else {
        Some(resolution.cell)
    }
}

/// Visible fresh positions that have no node in the live tree.
fn unmatched_fresh_paths(tree: &DisplayTree, columns: &[Column]) -> Vec<CellPath> {
    fn walk(tree: &DisplayTree, cell: &Cell, path: CellPath, out: &mut Vec<CellPath>) {
        if tree.node(&path).is_none() {
            out.push(path);
            return;
        }
        for (i, sub) in cell.sub_cells.iter().enumerate() {
            walk(tree, sub, path.child(i), out);
        }
    }

    let mut out = Vec::new();
    for (c, column) in columns.iter().enumerate() {
        for (r, cell) in column.visible_cells().iter().enumerate() {
            walk(tree, cell, CellPath::new(c, r), &mut out);
        }
    }
    out
}
