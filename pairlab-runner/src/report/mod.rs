//! Report sinks: where completed tasks and finished runs are persisted.
//!
//! - `html`: one self-contained page per completed task
//! - `summary`: `summary.csv` and `summary.json` for a whole run

pub mod html;
pub mod summary;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::result::TaskResult;

pub use html::HtmlReportSink;
pub use summary::{write_summary, SummaryRow};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("cannot write report {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot render report: {0}")]
    Render(String),
}

/// Persists a task result. Must be safe to call from every worker at once;
/// each task writes its own file.
pub trait ReportSink: Send + Sync {
    fn write(&self, result: &TaskResult) -> Result<PathBuf, ReportError>;
}

/// Write `contents` to `path` through a temp file and a rename, creating
/// parent directories as needed.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), ReportError> {
    let io_err = |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, contents).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        io_err(e)
    })
}
