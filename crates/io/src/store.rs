// Configuration store: owns the dashboard's column list and its source file.

use std::fs;
use std::path::{Path, PathBuf};

use cellboard_engine::board::Board;
use cellboard_engine::cell::Cell;
use cellboard_engine::column::Column;

use crate::error::StoreError;
use crate::native::{self, DocumentError};

/// The single owner of the dashboard layout.
///
/// Starts out with the built-in default layout. `load` replaces everything
/// on success and leaves the current columns alone on failure. `save` is a
/// plain overwrite of the target file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    board: Board,
    source: Option<PathBuf>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore {
    pub fn new() -> Self {
        Self {
            board: Board::default_config(),
            source: None,
        }
    }

    pub fn from_columns(columns: Vec<Column>) -> Self {
        Self {
            board: Board::new(columns),
            source: None,
        }
    }

    /// Read and parse `path`, replacing the column list on success.
    pub fn load(&mut self, path: &Path) -> Result<(), StoreError> {
        let columns = read_columns(path)?;
        log::info!("Loaded {} column(s) from {}", columns.len(), path.display());
        self.board.set_columns(columns);
        self.source = Some(path.to_path_buf());
        Ok(())
    }

    /// Write the full column list to `path`, overwriting it.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(path, e))?;
        }
        fs::write(path, self.to_json()).map_err(|e| StoreError::io(path, e))?;
        log::info!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Serialized document text, as `save` would write it.
    pub fn to_json(&self) -> String {
        native::write_document(self.board.columns())
    }

    /// File the current columns were loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn columns(&self) -> &[Column] {
        self.board.columns()
    }

    pub fn set_columns(&mut self, columns: Vec<Column>) {
        self.board.set_columns(columns);
    }

    pub fn update_cell_value(&mut self, column: usize, cell: usize, value: &str) -> bool {
        self.board.update_cell_value(column, cell, value)
    }

    pub fn update_sub_cell_value(&mut self, column: usize, cell: usize, sub: usize, value: &str) -> bool {
        self.board.update_sub_cell_value(column, cell, sub, value)
    }

    pub fn update_column(&mut self, index: usize, name: &str, cell_count: usize, cells: Vec<Cell>) -> bool {
        self.board.update_column(index, name, cell_count, cells)
    }

    /// Reset to the built-in three-column layout.
    pub fn create_default_config(&mut self) {
        self.board = Board::default_config();
    }

    pub fn column_count(&self) -> usize {
        self.board.column_count()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.board.column_names()
    }

    pub fn cell_counts(&self) -> Vec<usize> {
        self.board.cell_counts()
    }
}

/// Read and parse a dashboard file without touching any store.
pub fn read_columns(path: &Path) -> Result<Vec<Column>, StoreError> {
    let text = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    native::parse_document(&text).map_err(|e| match e {
        DocumentError::InvalidJson(message) => StoreError::Parse {
            path: path.to_path_buf(),
            message,
        },
        DocumentError::MissingColumns => StoreError::MissingColumns {
            path: path.to_path_buf(),
        },
    })
}
