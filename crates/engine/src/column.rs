use super::cell::Cell;

/// Upper bound on a declared cell count. Larger counts from a file are
/// clamped on load and never padded past.
pub const MAX_CELL_COUNT: usize = 1000;

/// A named column of top-level cells.
///
/// `cell_count` is the declared count from the file or the configuration
/// dialog. It can disagree with `cells.len()`; rendering only ever shows
/// `min(cell_count, cells.len())` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Column {
    pub name: String,
    pub cell_count: usize,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, cell_count: usize, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            cell_count,
            cells,
        }
    }

    /// Placeholder label for the cell at 1-based position `ordinal`.
    pub fn placeholder_content(ordinal: usize) -> String {
        format!("Ячейка {}", ordinal)
    }

    /// Append placeholder cells until `cells.len() >= cell_count`, stopping
    /// at `MAX_CELL_COUNT`. Existing cells are left alone. Returns how many
    /// were added.
    pub fn pad_to_count(&mut self) -> usize {
        let before = self.cells.len();
        let target = self.cell_count.min(MAX_CELL_COUNT);
        while self.cells.len() < target {
            let ordinal = self.cells.len() + 1;
            self.cells.push(Cell::new(Self::placeholder_content(ordinal)));
        }
        self.cells.len() - before
    }

    /// Number of cells a renderer shows.
    pub fn visible_len(&self) -> usize {
        self.cell_count.min(self.cells.len())
    }

    /// The cells a renderer shows; trailing extras are ignored.
    pub fn visible_cells(&self) -> &[Cell] {
        &self.cells[..self.visible_len()]
    }

    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }
}
