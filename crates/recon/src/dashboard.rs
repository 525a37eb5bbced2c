// Session context: one dashboard file, its live display tree, the value
// history and the current selection.

use std::path::{Path, PathBuf};
use std::time::Duration;

use cellboard_config::Settings;
use cellboard_core::Selection;
use cellboard_engine::column::Column;
use cellboard_engine::history::HistoryLedger;
use cellboard_engine::path::CellPath;
use cellboard_io::discovery::{self, ConfigSource};
use cellboard_io::{ConfigStore, StoreError};

use crate::detail::DetailView;
use crate::display::{DisplayTree, GaugeRange};
use crate::reconcile::{reconcile, ReconcileReport};

/// How the session refreshes, derived from settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshPolicy {
    pub interval: Duration,
    pub rebuild_on_structure_change: bool,
    pub record_history: bool,
    pub gauge: GaugeRange,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl RefreshPolicy {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            interval: settings.refresh_interval(),
            rebuild_on_structure_change: settings.rebuild_on_structure_change,
            record_history: settings.history_enabled,
            gauge: GaugeRange::new(settings.gauge_min, settings.gauge_max),
        }
    }
}

#[derive(Debug, Clone)]
pub enum TickOutcome {
    /// Fresh values applied to the existing tree
    Reconciled(ReconcileReport),
    /// Structure changed and the policy asked for a rebuild
    Rebuilt(ReconcileReport),
    /// Reload failed; the display keeps its last state
    Stale(StoreError),
}

impl TickOutcome {
    pub fn report(&self) -> Option<&ReconcileReport> {
        match self {
            Self::Reconciled(r) | Self::Rebuilt(r) => Some(r),
            Self::Stale(_) => None,
        }
    }
}

pub struct Dashboard {
    store: ConfigStore,
    source: ConfigSource,
    tree: DisplayTree,
    history: HistoryLedger,
    selection: Selection,
    policy: RefreshPolicy,
    last_report: Option<ReconcileReport>,
    last_error: Option<StoreError>,
}

impl Dashboard {
    /// Wrap an already loaded store. The first pass seeds the history
    /// with the values on screen.
    pub fn new(store: ConfigStore, source: ConfigSource, policy: RefreshPolicy) -> Self {
        let tree = DisplayTree::build(store.columns(), policy.gauge);
        let mut dashboard = Self {
            store,
            source,
            tree,
            history: HistoryLedger::new(),
            selection: Selection::new(),
            policy,
            last_report: None,
            last_error: None,
        };
        dashboard.reconcile_now();
        dashboard
    }

    /// Resolve the dashboard file (explicit path, then settings, then
    /// discovery) and open a session on it.
    pub fn open(settings: &Settings, explicit: Option<&Path>) -> Result<Self, StoreError> {
        let exe_dir = discovery::exe_dir();
        let candidates = discovery::candidate_paths(exe_dir.as_deref());
        let fallback = exe_dir
            .as_deref()
            .map(discovery::data_path)
            .unwrap_or_else(|| PathBuf::from(discovery::CONFIG_FILE_NAME));

        let mut store = ConfigStore::new();
        let source = discovery::open(
            &mut store,
            explicit,
            settings.config_path.as_deref(),
            &candidates,
            &fallback,
        )?;
        log::info!(
            "Dashboard file: {} ({})",
            source.path().display(),
            source.label()
        );
        Ok(Self::new(store, source, RefreshPolicy::from_settings(settings)))
    }

    /// Reload the dashboard file and push its values into the display.
    ///
    /// A failed reload changes nothing on screen. The failure is logged
    /// once per distinct error rather than on every tick.
    pub fn tick(&mut self) -> TickOutcome {
        let path = self.source.path().to_path_buf();
        if let Err(e) = self.store.load(&path) {
            if self.last_error.as_ref() != Some(&e) {
                log::warn!("Refresh failed, keeping last values: {}", e);
            }
            self.last_error = Some(e.clone());
            return TickOutcome::Stale(e);
        }
        if self.last_error.take().is_some() {
            log::info!("Refresh recovered from {}", path.display());
        }
        if !self.source.is_loaded() {
            log::info!("Dashboard file now loads: {}", path.display());
            self.source = self.source.clone().into_loaded();
        }

        let report = self.reconcile_now();
        if report.structure_changed() && self.policy.rebuild_on_structure_change {
            log::info!("Layout changed ({}), rebuilding", report.summary());
            self.rebuild();
            TickOutcome::Rebuilt(report)
        } else {
            TickOutcome::Reconciled(report)
        }
    }

    /// Throw away the display tree and build it from the current columns.
    /// History is kept; nodes that appear for the first time are recorded.
    pub fn rebuild(&mut self) {
        self.tree = DisplayTree::build(self.store.columns(), self.policy.gauge);
        self.reconcile_now();
    }

    fn reconcile_now(&mut self) -> ReconcileReport {
        let ledger = if self.policy.record_history {
            Some(&mut self.history)
        } else {
            None
        };
        let report = reconcile(&mut self.tree, self.store.columns(), ledger);
        self.last_report = Some(report.clone());
        report
    }

    /// Record a click as `(column, cell, sub_cell_path)`.
    pub fn select(&mut self, column: usize, cell: usize, sub_cell_path: &[usize]) {
        self.selection.select(column, cell, sub_cell_path);
    }

    pub fn select_path(&mut self, path: CellPath) {
        self.selection.select_path(path);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Detail panel for the current selection, against the latest data.
    pub fn detail(&self) -> Option<DetailView> {
        let path = self.selection.current()?;
        DetailView::build(self.store.columns(), path, &self.history, &self.policy.gauge)
    }

    /// Replace the whole layout, as the column editor does on commit, and
    /// rebuild the display.
    pub fn apply_columns(&mut self, columns: Vec<Column>) {
        self.store.set_columns(columns);
        self.rebuild();
    }

    /// Set the value of a top-level cell, or of one of its direct
    /// sub-cells. Returns false if any index is out of range.
    pub fn set_value(&mut self, column: usize, cell: usize, sub: Option<usize>, value: &str) -> bool {
        let updated = match sub {
            Some(sub) => self.store.update_sub_cell_value(column, cell, sub, value),
            None => self.store.update_cell_value(column, cell, value),
        };
        if updated {
            self.reconcile_now();
        }
        updated
    }

    /// Write the current layout back to the watched file.
    ///
    /// Refused while the watched file exists but never loaded, since the
    /// columns in memory are then the built-in layout.
    pub fn save(&self) -> Result<(), StoreError> {
        let path = self.source.path();
        if !self.source.is_loaded() && path.exists() {
            return Err(match &self.source {
                ConfigSource::Unloaded { error, .. } => error.clone(),
                _ => StoreError::NotLoaded {
                    path: path.to_path_buf(),
                },
            });
        }
        self.store.save(path)
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn columns(&self) -> &[Column] {
        self.store.columns()
    }

    pub fn source(&self) -> &ConfigSource {
        &self.source
    }

    pub fn tree(&self) -> &DisplayTree {
        &self.tree
    }

    pub fn history(&self) -> &HistoryLedger {
        &self.history
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn policy(&self) -> &RefreshPolicy {
        &self.policy
    }

    pub fn last_report(&self) -> Option<&ReconcileReport> {
        self.last_report.as_ref()
    }

    /// Error from the most recent failed reload, cleared by the next good one.
    pub fn last_error(&self) -> Option<&StoreError> {
        self.last_error.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const TWO_COLUMNS: &str = r#"{
        "columns": [
            {"name": "A", "cellCount": 2, "cells": [
                {"content": "Temperature", "value": "20"},
                {"content": "Pumps", "subCells": [
                    {"content": "P1", "value": "1"},
                    {"content": "P2", "value": "3"}
                ]}
            ]},
            {"name": "B", "cellCount": 1, "cells": [{"content": "x", "value": "on"}]}
        ]
    }"#;

    fn open_file(path: &Path, policy: RefreshPolicy) -> Dashboard {
        let mut store = ConfigStore::new();
        store.load(path).unwrap();
        Dashboard::new(store, ConfigSource::Explicit(path.to_path_buf()), policy)
    }

    #[test]
    fn test_initial_pass_seeds_history() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, TWO_COLUMNS).unwrap();

        let dash = open_file(&path, RefreshPolicy::default());
        assert_eq!(dash.history().entries("col0/cell0"), &["20"]);
        assert_eq!(dash.history().entries("col0/cell1"), &["2.00"]);
        assert_eq!(dash.history().entries("col0/cell1/sub1"), &["3"]);
        assert_eq!(dash.history().entries("col1/cell0"), &["on"]);
    }

    #[test]
    fn test_tick_applies_changes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, TWO_COLUMNS).unwrap();
        let mut dash = open_file(&path, RefreshPolicy::default());

        fs::write(&path, TWO_COLUMNS.replace(r#""value": "20""#, r#""value": "25""#)).unwrap();
        let outcome = dash.tick();
        let report = outcome.report().unwrap();
        assert_eq!(report.updated, vec![CellPath::new(0, 0)]);
        assert_eq!(dash.tree().node(&CellPath::new(0, 0)).unwrap().text, "25°C");
        assert_eq!(dash.history().entries("col0/cell0"), &["20", "25"]);
    }

    #[test]
    fn test_failed_reload_keeps_display() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, TWO_COLUMNS).unwrap();
        let mut dash = open_file(&path, RefreshPolicy::default());
        let before = dash.tree().clone();

        fs::write(&path, "{ truncated").unwrap();
        match dash.tick() {
            TickOutcome::Stale(e) => assert!(e.is_parse()),
            other => panic!("expected stale, got {:?}", other),
        }
        assert_eq!(dash.tree(), &before);
        assert_eq!(dash.columns().len(), 2);
        assert!(dash.last_error().is_some());

        fs::write(&path, TWO_COLUMNS).unwrap();
        assert!(dash.tick().report().is_some());
        assert!(dash.last_error().is_none());
    }

    #[test]
    fn test_structure_change_rebuilds_only_when_asked() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, TWO_COLUMNS).unwrap();
        let one_column = r#"{"columns":[{"name":"A","cellCount":1,"cells":[{"content":"Temperature","value":"30"}]}]}"#;

        let mut keep = open_file(&path, RefreshPolicy::default());
        fs::write(&path, one_column).unwrap();
        match keep.tick() {
            TickOutcome::Reconciled(report) => assert!(report.structure_changed()),
            other => panic!("expected reconcile, got {:?}", other),
        }
        assert_eq!(keep.tree().columns().len(), 2);

        fs::write(&path, TWO_COLUMNS).unwrap();
        let policy = RefreshPolicy {
            rebuild_on_structure_change: true,
            ..RefreshPolicy::default()
        };
        let mut rebuild = open_file(&path, policy);
        fs::write(&path, one_column).unwrap();
        assert!(matches!(rebuild.tick(), TickOutcome::Rebuilt(_)));
        assert_eq!(rebuild.tree().columns().len(), 1);
        assert_eq!(rebuild.tree().column_lens(), vec![1]);
    }

    #[test]
    fn test_selection_follows_refresh() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, TWO_COLUMNS).unwrap();
        let mut dash = open_file(&path, RefreshPolicy::default());
        assert!(dash.detail().is_none());

        dash.select(0, 1, &[1, 0]);
        let detail = dash.detail().unwrap();
        assert_eq!(detail.content, "P1");
        assert_eq!(detail.history, vec!["1"]);

        fs::write(&path, TWO_COLUMNS.replace(r#""value": "1""#, r#""value": "9""#)).unwrap();
        dash.tick();
        let detail = dash.detail().unwrap();
        assert_eq!(detail.history, vec!["1", "9"]);
        assert_eq!(detail.series.values, vec![1.0, 9.0]);
    }

    #[test]
    fn test_set_value_and_save() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, TWO_COLUMNS).unwrap();
        let mut dash = open_file(&path, RefreshPolicy::default());

        assert!(dash.set_value(0, 1, Some(0), "5"));
        assert!(!dash.set_value(0, 1, Some(9), "5"));
        assert!(!dash.set_value(4, 0, None, "5"));
        dash.save().unwrap();

        let reloaded = cellboard_io::store::read_columns(&path).unwrap();
        assert_eq!(reloaded[0].cells[1].sub_cells[0].value, "5");
        assert_eq!(dash.tree().node(&CellPath::new(0, 1)).unwrap().text, "4.00");
    }

    #[test]
    fn test_apply_columns_rebuilds() {
        let mut dash = Dashboard::new(
            ConfigStore::new(),
            ConfigSource::Default(PathBuf::from("unused.json")),
            RefreshPolicy::default(),
        );
        assert_eq!(dash.tree().column_lens(), vec![3, 4, 2]);
        let mut only = Column::new("Only", 5, Vec::new());
        only.pad_to_count();
        dash.apply_columns(vec![only]);
        assert_eq!(dash.tree().column_lens(), vec![5]);
        assert_eq!(dash.columns()[0].cells[4].content, "Ячейка 5");
    }

    #[test]
    fn test_history_disabled() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, TWO_COLUMNS).unwrap();
        let policy = RefreshPolicy {
            record_history: false,
            ..RefreshPolicy::default()
        };
        let dash = open_file(&path, policy);
        assert!(dash.history().is_empty());
    }

    #[test]
    fn test_policy_from_settings() {
        let settings = Settings {
            refresh_interval_ms: 250,
            gauge_max: 200.0,
            ..Settings::default()
        };
        let policy = RefreshPolicy::from_settings(&settings);
        assert_eq!(policy.interval, Duration::from_millis(250));
        assert_eq!(policy.gauge, GaugeRange::new(0.0, 200.0));
        assert!(policy.record_history);
    }

    #[test]
    fn test_gauge_history_past_the_scale() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, TWO_COLUMNS.replace(r#""value": "20""#, r#""value": "130""#)).unwrap();
        let mut dash = open_file(&path, RefreshPolicy::default());

        for value in ["150", "500"] {
            let replaced = format!(r#""value": "{}""#, value);
            fs::write(&path, TWO_COLUMNS.replace(r#""value": "20""#, &replaced)).unwrap();
            assert!(dash.tick().report().is_some());
        }

        assert_eq!(dash.history().entries("col0/cell0"), &["130", "150", "500"]);
        dash.select(0, 0, &[]);
        let detail = dash.detail().unwrap();
        assert_eq!(detail.text, "120°C");
        assert_eq!(detail.series.values, vec![130.0, 150.0, 500.0]);
    }

    #[test]
    fn test_save_refused_when_configured_file_never_loaded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ truncated").unwrap();

        let mut store = ConfigStore::new();
        let source = discovery::open(&mut store, None, Some(path.as_path()), &[], &path).unwrap();
        let mut dash = Dashboard::new(store, source, RefreshPolicy::default());

        assert!(dash.set_value(0, 0, None, "5"));
        let err = dash.save().unwrap_err();
        assert!(err.is_parse());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ truncated");

        // once the file loads, edits go through
        fs::write(&path, TWO_COLUMNS).unwrap();
        assert!(dash.tick().report().is_some());
        assert_eq!(dash.source(), &ConfigSource::Settings(path.clone()));
        assert!(dash.set_value(1, 0, None, "off"));
        dash.save().unwrap();
        let reloaded = cellboard_io::store::read_columns(&path).unwrap();
        assert_eq!(reloaded[1].cells[0].value, "off");
        assert_eq!(reloaded[0].name, "A");
    }

    #[test]
    fn test_save_refused_over_unloaded_fallback() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "[]").unwrap();
        let dash = Dashboard::new(
            ConfigStore::new(),
            ConfigSource::Default(path.clone()),
            RefreshPolicy::default(),
        );
        assert!(matches!(dash.save(), Err(StoreError::NotLoaded { .. })));
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");

        let fresh = dir.path().join("new").join("config.json");
        let dash = Dashboard::new(
            ConfigStore::new(),
            ConfigSource::Default(fresh.clone()),
            RefreshPolicy::default(),
        );
        dash.save().unwrap();
        assert!(fresh.is_file());
    }
}
