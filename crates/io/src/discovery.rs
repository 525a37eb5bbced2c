// Locating the dashboard file at startup.
//
// One path is resolved once and then used for both the initial load and
// every refresh tick: an explicit path wins, then the configured path from
// settings, then the first discovery candidate that loads.

use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::store::ConfigStore;

pub const CONFIG_FILE_NAME: &str = "config.json";

/// Where the active dashboard file came from.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Given on the command line
    Explicit(PathBuf),
    /// `board.configPath` in settings
    Settings(PathBuf),
    /// `board.configPath` that failed to load; the built-in layout is shown
    /// and the path is still watched
    Unloaded { path: PathBuf, error: StoreError },
    /// First discovery candidate that loaded
    Discovered(PathBuf),
    /// Nothing loaded; the built-in layout is shown and this path is watched
    Default(PathBuf),
}

impl ConfigSource {
    pub fn path(&self) -> &Path {
        match self {
            Self::Explicit(p) | Self::Settings(p) | Self::Discovered(p) | Self::Default(p) => p,
            Self::Unloaded { path, .. } => path,
        }
    }

    /// The columns on screen came from this file.
    pub fn is_loaded(&self) -> bool {
        !matches!(self, Self::Unloaded { .. } | Self::Default(_))
    }

    /// Same path, now successfully loaded.
    pub fn into_loaded(self) -> Self {
        match self {
            Self::Unloaded { path, .. } => Self::Settings(path),
            Self::Default(path) => Self::Discovered(path),
            loaded => loaded,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Explicit(_) => "command line",
            Self::Settings(_) => "settings",
            Self::Unloaded { .. } => "settings, not loaded",
            Self::Discovered(_) => "discovered",
            Self::Default(_) => "built-in default",
        }
    }
}

/// Directory of the running executable.
pub fn exe_dir() -> Option<PathBuf> {
    std::env::current_exe().ok()?.parent().map(Path::to_path_buf)
}

/// Ordered discovery candidates: the working directory and two parents,
/// then next to the executable, then `<exe>/../data`.
pub fn candidate_paths(exe_dir: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = vec![
        PathBuf::from(CONFIG_FILE_NAME),
        Path::new("..").join(CONFIG_FILE_NAME),
        Path::new("..").join("..").join(CONFIG_FILE_NAME),
    ];
    if let Some(dir) = exe_dir {
        candidates.push(dir.join(CONFIG_FILE_NAME));
        candidates.push(data_path(dir));
    }
    candidates
}

/// `<exe>/../data/config.json`, the fallback file to watch when nothing loads.
pub fn data_path(exe_dir: &Path) -> PathBuf {
    exe_dir.join("..").join("data").join(CONFIG_FILE_NAME)
}

/// Load the first candidate that exists and parses.
pub fn discover(store: &mut ConfigStore, candidates: &[PathBuf]) -> Option<PathBuf> {
    for candidate in candidates {
        if !candidate.is_file() {
            continue;
        }
        match store.load(candidate) {
            Ok(()) => return Some(candidate.clone()),
            Err(e) => log::warn!("Skipping config candidate: {}", e),
        }
    }
    None
}

/// Resolve the dashboard file and load it into `store`.
///
/// An explicit path that fails to load is an error. A configured path that
/// fails is logged and kept as the watched path while the built-in layout
/// is shown; the failure travels with the returned source. When discovery
/// finds nothing, `fallback` is watched.
pub fn open(
    store: &mut ConfigStore,
    explicit: Option<&Path>,
    configured: Option<&Path>,
    candidates: &[PathBuf],
    fallback: &Path,
) -> Result<ConfigSource, StoreError> {
    if let Some(path) = explicit {
        store.load(path)?;
        return Ok(ConfigSource::Explicit(path.to_path_buf()));
    }

    if let Some(path) = configured {
        return match store.load(path) {
            Ok(()) => Ok(ConfigSource::Settings(path.to_path_buf())),
            Err(e) => {
                log::warn!("Configured dashboard file unusable, showing defaults: {}", e);
                store.create_default_config();
                Ok(ConfigSource::Unloaded {
                    path: path.to_path_buf(),
                    error: e,
                })
            }
        };
    }

    if let Some(path) = discover(store, candidates) {
        return Ok(ConfigSource::Discovered(path));
    }

    log::info!(
        "No dashboard file found, using built-in layout; watching {}",
        fallback.display()
    );
    store.create_default_config();
    Ok(ConfigSource::Default(fallback.to_path_buf()))
}
