// Native dashboard format (JSON)
//
// {
//   "columns": [
//     { "name": "...", "cellCount": 3,
//       "cells": [ { "content": "...", "value": "...", "unit": "...",
//                    "display": "gauge", "subCells": [ ... ] } ] }
//   ]
// }
//
// Reading is lenient: non-object entries are skipped, mistyped fields fall
// back to empty. Writing omits value/unit/subCells when empty.

use serde_json::{Map, Value};

use cellboard_engine::cell::{format_number, Cell, DisplayKind};
use cellboard_engine::column::{Column, MAX_CELL_COUNT};

#[derive(Debug, Clone, PartialEq)]
pub enum DocumentError {
    InvalidJson(String),
    MissingColumns,
}

/// Parse a document into columns, padding each column to its declared count.
pub fn parse_document(text: &str) -> Result<Vec<Column>, DocumentError> {
    let root: Value =
        serde_json::from_str(text).map_err(|e| DocumentError::InvalidJson(e.to_string()))?;
    columns_from_value(&root).ok_or(DocumentError::MissingColumns)
}

/// Columns from an already-parsed document; `None` if there is no `columns` array.
pub fn columns_from_value(root: &Value) -> Option<Vec<Column>> {
    let columns = root.get("columns")?.as_array()?;
    Some(
        columns
            .iter()
            .filter_map(Value::as_object)
            .map(column_from_json)
            .collect(),
    )
}

fn column_from_json(json: &Map<String, Value>) -> Column {
    let name = string_field(json, "name");
    let declared = json.get("cellCount").map(count_from_json).unwrap_or(0);
    let cells = cells_from_json(json.get("cells"));

    // Clamping above the written cells keeps the visible set unchanged.
    let limit = MAX_CELL_COUNT.max(cells.len());
    let cell_count = if declared > limit {
        log::warn!("Column {:?}: cellCount {} clamped to {}", name, declared, limit);
        limit
    } else {
        declared
    };

    let mut column = Column::new(name, cell_count, cells);
    // Only top-level cells are padded; sub-cells are taken as written.
    column.pad_to_count();
    column
}

fn cells_from_json(value: Option<&Value>) -> Vec<Cell> {
    value
        .and_then(Value::as_array)
        .map(|cells| {
            cells
                .iter()
                .filter_map(Value::as_object)
                .map(cell_from_json)
                .collect()
        })
        .unwrap_or_default()
}

fn cell_from_json(json: &Map<String, Value>) -> Cell {
    let content = string_field(json, "content");
    let display = json
        .get("display")
        .and_then(Value::as_str)
        .and_then(DisplayKind::parse)
        .unwrap_or_else(|| DisplayKind::infer(&content));

    Cell {
        value: json.get("value").map(value_from_json).unwrap_or_default(),
        unit: string_field(json, "unit"),
        display,
        sub_cells: cells_from_json(json.get("subCells")),
        content,
    }
}

/// Strings are kept verbatim, numbers get two decimals, anything else is absent.
pub fn value_from_json(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.as_f64().map(format_number).unwrap_or_default(),
        _ => String::new(),
    }
}

/// Integer-valued numbers only; negatives clamp to zero.
fn count_from_json(value: &Value) -> usize {
    if let Some(n) = value.as_u64() {
        return n as usize;
    }
    match value.as_f64() {
        Some(f) if f.fract() == 0.0 && f > 0.0 => f as usize,
        _ => 0,
    }
}

fn string_field(json: &Map<String, Value>, key: &str) -> String {
    json.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

/// Document for a column list.
pub fn to_document(columns: &[Column]) -> Value {
    let columns: Vec<Value> = columns.iter().map(column_to_json).collect();
    let mut root = Map::new();
    root.insert("columns".into(), Value::Array(columns));
    Value::Object(root)
}

/// Pretty-printed document text, newline-terminated.
pub fn write_document(columns: &[Column]) -> String {
    let mut text = serde_json::to_string_pretty(&to_document(columns))
        .unwrap_or_else(|_| String::from("{\"columns\": []}"));
    text.push('\n');
    text
}

fn column_to_json(column: &Column) -> Value {
    let mut json = Map::new();
    json.insert("name".into(), Value::String(column.name.clone()));
    json.insert("cellCount".into(), Value::from(column.cell_count));
    json.insert(
        "cells".into(),
        Value::Array(column.cells.iter().map(cell_to_json).collect()),
    );
    Value::Object(json)
}

fn cell_to_json(cell: &Cell) -> Value {
    let mut json = Map::new();
    json.insert("content".into(), Value::String(cell.content.clone()));
    if !cell.value.is_empty() {
        json.insert("value".into(), Value::String(cell.value.clone()));
    }
    if !cell.unit.is_empty() {
        json.insert("unit".into(), Value::String(cell.unit.clone()));
    }
    // Gauges are always tagged. A text cell is tagged only when its content
    // would otherwise be read back as a gauge.
    if cell.display == DisplayKind::Gauge || cell.display != DisplayKind::infer(&cell.content) {
        json.insert("display".into(), Value::String(cell.display.as_str().into()));
    }
    if !cell.sub_cells.is_empty() {
        json.insert(
            "subCells".into(),
            Value::Array(cell.sub_cells.iter().map(cell_to_json).collect()),
        );
    }
    Value::Object(json)
}
