// In-memory dashboard layout: the ordered list of columns.

use super::cell::Cell;
use super::column::Column;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Board {
    columns: Vec<Column>,
}

impl Board {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// The built-in three-column layout used at startup and as load fallback.
    pub fn default_config() -> Self {
        let columns = [("Колонка 1", 3), ("Колонка 2", 4), ("Колонка 3", 2)]
            .iter()
            .enumerate()
            .map(|(col, &(name, count))| {
                let cells = (0..count)
                    .map(|row| Cell::new(format!("Содержимое {}-{}", row + 1, col + 1)))
                    .collect();
                Column::new(name, count, cells)
            })
            .collect();
        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Replace every column. No uniqueness or count checks.
    pub fn set_columns(&mut self, columns: Vec<Column>) {
        self.columns = columns;
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn cell_counts(&self) -> Vec<usize> {
        self.columns.iter().map(|c| c.cell_count).collect()
    }

    pub fn cell(&self, column: usize, cell: usize) -> Option<&Cell> {
        self.columns.get(column)?.cells.get(cell)
    }

    /// Set one top-level cell's value. Returns false (and changes nothing)
    /// when either index is out of range.
    pub fn update_cell_value(&mut self, column: usize, cell: usize, value: &str) -> bool {
        match self.columns.get_mut(column).and_then(|c| c.cells.get_mut(cell)) {
            Some(target) => {
                target.value = value.to_string();
                true
            }
            None => false,
        }
    }

    /// Set one first-level sub-cell's value, same contract as `update_cell_value`.
    pub fn update_sub_cell_value(&mut self, column: usize, cell: usize, sub: usize, value: &str) -> bool {
        let target = self
            .columns
            .get_mut(column)
            .and_then(|c| c.cells.get_mut(cell))
            .and_then(|c| c.sub_cells.get_mut(sub));
        match target {
            Some(target) => {
                target.value = value.to_string();
                true
            }
            None => false,
        }
    }

    /// Replace one column's name, declared count and cells (dialog commit).
    pub fn update_column(&mut self, index: usize, name: &str, cell_count: usize, cells: Vec<Cell>) -> bool {
        match self.columns.get_mut(index) {
            Some(column) => {
                column.name = name.to_string();
                column.cell_count = cell_count;
                column.cells = cells;
                true
            }
            None => false,
        }
    }
}
