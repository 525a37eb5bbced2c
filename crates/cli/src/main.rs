// cellboard - live dashboard of nested cells backed by a JSON file

mod exit_codes;
mod logging;
mod tui;
mod util;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;

use cellboard_config::Settings;
use cellboard_engine::path::CellPath;
use cellboard_io::discovery;
use cellboard_io::{ConfigStore, StoreError};
use cellboard_recon::display::DisplayNode;
use cellboard_recon::{Dashboard, DisplayTree};

use exit_codes::{
    store_exit_code, EXIT_CONFIG_IO, EXIT_ERROR, EXIT_NOT_FOUND, EXIT_SUCCESS, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "cellboard")]
#[command(about = "Dashboard of nested cells, refreshed from a JSON file")]
#[command(version)]
struct Cli {
    /// Dashboard file (overrides board.configPath in settings)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Settings file (default: <config dir>/cellboard/settings.json)
    #[arg(long, global = true, value_name = "PATH", env = "CELLBOARD_SETTINGS")]
    settings: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the built-in three-column layout to the dashboard file
    #[command(after_help = "\
Examples:
  cellboard init
  cellboard --config board/config.json init --force")]
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the dashboard once
    Show {
        /// Print the document as it would be saved
        #[arg(long)]
        json: bool,
    },

    /// Resolve a cell by 0-based indices and print its details
    #[command(after_help = "\
Examples:
  cellboard inspect 0 1          # second cell of the first column
  cellboard inspect 0 1 2 0      # first child of its third sub-cell
  cellboard inspect 2 0 --json")]
    Inspect {
        column: usize,
        cell: usize,
        /// Sub-cell indices, outermost first
        sub: Vec<usize>,
        #[arg(long)]
        json: bool,
    },

    /// Set a cell's value and save the file
    #[command(after_help = "\
Examples:
  cellboard set 0 0 72
  cellboard set 1 2 --sub 0 3.5")]
    Set {
        column: usize,
        cell: usize,
        /// Set this direct sub-cell of CELL instead
        #[arg(long, value_name = "K")]
        sub: Option<usize>,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Interactive dashboard, refreshed from the file
    Watch {
        /// Refresh interval (overrides refresh.intervalMs)
        #[arg(long, value_name = "N")]
        interval_ms: Option<u64>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // The terminal dashboard owns the screen; keep it quiet unless asked.
    let default_level = match cli.command {
        Commands::Watch { .. } => LevelFilter::OFF,
        _ => LevelFilter::WARN,
    };
    let env_filter = std::env::var(logging::LOG_ENV).ok();
    logging::init(logging::filter(cli.verbose, env_filter.as_deref(), default_level));

    let settings = match &cli.settings {
        Some(path) if path.exists() => Settings::load_from(path),
        Some(_) => Settings::default(),
        None => Settings::load(),
    };
    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::Init { force } => cmd_init(config, &settings, force),
        Commands::Show { json } => cmd_show(config, &settings, json),
        Commands::Inspect { column, cell, sub, json } => {
            cmd_inspect(config, &settings, CellPath::with_sub(column, cell, sub), json)
        }
        Commands::Set { column, cell, sub, value } => {
            cmd_set(config, &settings, column, cell, sub, &value)
        }
        Commands::Watch { interval_ms } => cmd_watch(config, &settings, interval_ms),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self { code: EXIT_NOT_FOUND, message: msg.into(), hint: None }
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        let code = store_exit_code(&err);
        let hint = match &err {
            StoreError::NotLoaded { .. } => {
                Some("fix the file or pass --config, then retry".to_string())
            }
            _ if code == EXIT_CONFIG_IO => {
                Some("run `cellboard init` to create a dashboard file".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }
}

fn open_dashboard(config: Option<&Path>, settings: &Settings) -> Result<Dashboard, CliError> {
    Ok(Dashboard::open(settings, config)?)
}

// ============================================================================
// init
// ============================================================================

/// Where `init` writes: explicit, configured, an existing candidate, else
/// `config.json` in the working directory.
fn init_target(config: Option<&Path>, settings: &Settings) -> PathBuf {
    if let Some(path) = config.or(settings.config_path.as_deref()) {
        return path.to_path_buf();
    }
    discovery::candidate_paths(discovery::exe_dir().as_deref())
        .into_iter()
        .find(|p| p.is_file())
        .unwrap_or_else(|| PathBuf::from(discovery::CONFIG_FILE_NAME))
}

fn cmd_init(config: Option<&Path>, settings: &Settings, force: bool) -> Result<(), CliError> {
    let path = init_target(config, settings);
    if path.exists() && !force {
        return Err(CliError::usage(format!("{} already exists", path.display()))
            .with_hint("use --force to overwrite"));
    }
    ConfigStore::new().save(&path)?;
    println!("Wrote default dashboard to {}", path.display());
    Ok(())
}

// ============================================================================
// show
// ============================================================================

fn cmd_show(config: Option<&Path>, settings: &Settings, json: bool) -> Result<(), CliError> {
    let dashboard = open_dashboard(config, settings)?;
    if json {
        print!("{}", dashboard.store().to_json());
        return Ok(());
    }
    let source = dashboard.source();
    println!("# {} ({})", source.path().display(), source.label());
    print!("{}", render_board(dashboard.tree()));
    Ok(())
}

/// Plain-text rendering of the display tree, one column per block.
fn render_board(tree: &DisplayTree) -> String {
    let width = tree
        .columns()
        .iter()
        .flat_map(|c| c.rows())
        .map(|n| util::display_width(&n.title) + 2 * n.path.depth())
        .max()
        .unwrap_or(0)
        .clamp(8, 40);

    let mut out = String::new();
    for column in tree.columns() {
        out.push_str(&format!("[{}] {}\n", column.index, column.header));
        let rows = column.rows();
        if rows.is_empty() {
            out.push_str("  (no cells)\n");
        }
        for node in rows {
            out.push_str(&format!("  {}\n", render_row(node, width).trim_end()));
        }
    }
    out
}

fn render_row(node: &DisplayNode, width: usize) -> String {
    let title = format!("{}{}", util::indent(node.path.depth()), node.title);
    let text = if node.text.is_empty() { "-" } else { node.text.as_str() };
    match &node.gauge {
        Some(gauge) => format!(
            "{}  {} {} {:?}",
            util::pad_right(&title, width),
            text,
            util::gauge_bar(gauge.fraction, 10),
            gauge.band
        ),
        None => format!("{}  {}", util::pad_right(&title, width), text),
    }
}

// ============================================================================
// inspect
// ============================================================================

fn cmd_inspect(
    config: Option<&Path>,
    settings: &Settings,
    path: CellPath,
    json: bool,
) -> Result<(), CliError> {
    let mut dashboard = open_dashboard(config, settings)?;
    dashboard.select_path(path.clone());
    let detail = dashboard
        .detail()
        .ok_or_else(|| CliError::not_found(format!("no cell at {}", path.breadcrumb())))?;

    if json {
        let text = serde_json::to_string_pretty(&detail)
            .map_err(|e| CliError::other(e.to_string()))?;
        println!("{}", text);
    } else {
        print!("{}", detail.render_text());
    }
    Ok(())
}

// ============================================================================
// set
// ============================================================================

fn cmd_set(
    config: Option<&Path>,
    settings: &Settings,
    column: usize,
    cell: usize,
    sub: Option<usize>,
    value: &str,
) -> Result<(), CliError> {
    let mut dashboard = open_dashboard(config, settings)?;
    if !dashboard.set_value(column, cell, sub, value) {
        let path = match sub {
            Some(k) => CellPath::with_sub(column, cell, vec![k]),
            None => CellPath::new(column, cell),
        };
        return Err(CliError::not_found(format!("no cell at {}", path.breadcrumb())));
    }
    dashboard.save()?;
    log::info!("Set {} in {}", value, dashboard.source().path().display());
    Ok(())
}

// ============================================================================
// watch
// ============================================================================

fn cmd_watch(
    config: Option<&Path>,
    settings: &Settings,
    interval_ms: Option<u64>,
) -> Result<(), CliError> {
    let mut settings = settings.clone();
    if let Some(ms) = interval_ms {
        settings.refresh_interval_ms = ms;
    }
    let dashboard = open_dashboard(config, &settings)?;
    let interval: Duration = dashboard.policy().interval;
    tui::run(dashboard, interval).map_err(CliError::other)
}
