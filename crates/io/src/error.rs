use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// File could not be opened for reading or writing.
    Io { path: PathBuf, message: String },
    /// Document is not valid JSON.
    Parse { path: PathBuf, message: String },
    /// Document parsed but has no `columns` array.
    MissingColumns { path: PathBuf },
    /// Save refused: the file exists but its content was never loaded.
    NotLoaded { path: PathBuf },
}

impl StoreError {
    pub(crate) fn io(path: &Path, err: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. }
            | Self::Parse { path, .. }
            | Self::MissingColumns { path }
            | Self::NotLoaded { path } => path,
        }
    }

    /// File could not be read or written.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::NotLoaded { .. })
    }

    /// File was read but its content is unusable.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::MissingColumns { .. })
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "{}: {message}", path.display()),
            Self::Parse { path, message } => write!(f, "{}: invalid JSON: {message}", path.display()),
            Self::MissingColumns { path } => {
                write!(f, "{}: missing or invalid \"columns\" array", path.display())
            }
            Self::NotLoaded { path } => {
                write!(f, "{}: exists but was not loaded; refusing to overwrite", path.display())
            }
        }
    }
}

impl std::error::Error for StoreError {}
