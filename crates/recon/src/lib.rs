//! `cellboard-recon`: live dashboard state.
//!
//! Headless display tree, refresh reconciler, the session context tying
//! file, tree, history and selection together, and the detail panel model.

pub mod dashboard;
pub mod detail;
pub mod display;
pub mod reconcile;

pub use dashboard::{Dashboard, RefreshPolicy, TickOutcome};
pub use detail::DetailView;
pub use display::{DisplayTree, GaugeRange};
pub use reconcile::{reconcile, ReconcileReport};
