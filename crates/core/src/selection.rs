use cellboard_engine::path::CellPath;

/// The last clicked node: one slot, overwritten on every click.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    current: Option<CellPath>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a click reported as `(column, cell, sub_cell_path)`.
    /// `sub_cell_path[0]`, when present, is the top-level cell index.
    pub fn select(&mut self, column: usize, cell: usize, sub_cell_path: &[usize]) {
        self.current = Some(CellPath::from_selection(column, cell, sub_cell_path));
    }

    pub fn select_path(&mut self, path: CellPath) {
        self.current = Some(path);
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&CellPath> {
        self.current.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }
}

/// Keyboard cursor over a dashboard of columns with `lens[c]` visible rows each.
///
/// Rows include sub-cells flattened under their parent, so the cursor
/// addresses one display row, not one `CellPath` level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub column: usize,
    pub row: usize,
}

impl Cursor {
    pub fn new(column: usize, row: usize) -> Self {
        Self { column, row }
    }

    /// Move by a delta, clamping to the grid. Switching columns keeps the
    /// row when possible and clamps it to the new column's length.
    pub fn move_by(&mut self, d_col: isize, d_row: isize, lens: &[usize]) {
        if lens.is_empty() {
            *self = Self::default();
            return;
        }
        let max_col = lens.len() - 1;
        self.column = (self.column as isize + d_col).clamp(0, max_col as isize) as usize;

        let rows = lens[self.column];
        if rows == 0 {
            self.row = 0;
            return;
        }
        self.row = (self.row as isize + d_row).clamp(0, rows as isize - 1) as usize;
    }

    /// Re-clamp after the grid changed shape.
    pub fn clamp_to(&mut self, lens: &[usize]) {
        self.move_by(0, 0, lens);
    }
}
