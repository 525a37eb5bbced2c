// Path addressing for cells and sub-cells.
//
// A path is (column, cell, sub...). History keys are derived from it:
// "col0/cell1" for a top-level cell, "col0/cell1/sub2" one level down,
// "col0/cell1/sub2/sub0" further down.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::cell::Cell;
use super::column::Column;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellPath {
    pub column: usize,
    pub cell: usize,
    /// Sub-cell indices walked below the top-level cell, outermost first
    pub sub: Vec<usize>,
}

impl CellPath {
    pub fn new(column: usize, cell: usize) -> Self {
        Self {
            column,
            cell,
            sub: Vec::new(),
        }
    }

    pub fn with_sub(column: usize, cell: usize, sub: Vec<usize>) -> Self {
        Self { column, cell, sub }
    }

    /// Build a path from a selection event.
    ///
    /// Presentation nodes report `(column, cell, sub_cell_path)` where
    /// `sub_cell_path[0]` is the top-level cell index and the rest walk
    /// into sub-cells. An empty `sub_cell_path` addresses `cell` itself.
    pub fn from_selection(column: usize, cell: usize, sub_cell_path: &[usize]) -> Self {
        match sub_cell_path.split_first() {
            Some((&anchor, rest)) => Self::with_sub(column, anchor, rest.to_vec()),
            None => Self::new(column, cell),
        }
    }

    /// Child path one level below this one.
    pub fn child(&self, index: usize) -> Self {
        let mut sub = self.sub.clone();
        sub.push(index);
        Self::with_sub(self.column, self.cell, sub)
    }

    /// Number of sub-cell levels below the top-level cell.
    pub fn depth(&self) -> usize {
        self.sub.len()
    }

    /// History ledger key for this path.
    pub fn key(&self) -> String {
        let mut key = format!("col{}/cell{}", self.column, self.cell);
        for s in &self.sub {
            key.push_str(&format!("/sub{}", s));
        }
        key
    }

    /// Human-readable trail using 1-based ordinals.
    pub fn breadcrumb(&self) -> String {
        let mut parts = vec![
            format!("Column {}", self.column + 1),
            format!("Cell {}", self.cell + 1),
        ];
        parts.extend(self.sub.iter().map(|s| format!("Sub-cell {}", s + 1)));
        parts.join(" > ")
    }
}

impl fmt::Display for CellPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Outcome of walking a path into the cell tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<'a> {
    /// Deepest node reached
    pub cell: &'a Cell,
    /// Path to `cell`; shorter than the request when the walk stopped early
    pub resolved: CellPath,
    /// Sub-cell depth that was asked for
    pub requested_depth: usize,
}

impl<'a> Resolution<'a> {
    pub fn resolved_depth(&self) -> usize {
        self.resolved.depth()
    }

    /// True when some trailing sub-cell index was out of range.
    pub fn is_partial(&self) -> bool {
        self.resolved_depth() < self.requested_depth
    }

    pub fn breadcrumb(&self) -> String {
        self.resolved.breadcrumb()
    }

    pub fn key(&self) -> String {
        self.resolved.key()
    }
}

/// Resolve a path against a column list.
///
/// Returns `None` when the column or top-level cell index is out of range.
/// Below the top-level cell the walk is lenient: it stops at the first
/// out-of-range sub-cell index and returns the last node it reached, with
/// `resolved_depth() < requested_depth`.
pub fn resolve<'a>(columns: &'a [Column], path: &CellPath) -> Option<Resolution<'a>> {
    let mut cell = columns.get(path.column)?.cells.get(path.cell)?;
    let mut walked = Vec::with_capacity(path.sub.len());

    for &index in &path.sub {
        match cell.sub_cells.get(index) {
            Some(next) => {
                cell = next;
                walked.push(index);
            }
            None => break,
        }
    }

    Some(Resolution {
        cell,
        resolved: CellPath::with_sub(path.column, path.cell, walked),
        requested_depth: path.depth(),
    })
}
