//! Error and warning types shared by the loader and the clone engine.

use std::path::PathBuf;

/// Crate-wide result alias.
pub type GraphResult<T> = Result<T, GraphError>;

/// Failures that abort a single graph operation.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
  /// Reading a file from disk failed.
  #[error("failed to read {}: {source}", path.display())]
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    #[source]
    source: std::io::Error,
  },
  /// The file text is not valid structured data.
  #[error("failed to parse {}: {source}", path.display())]
  Parse {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    #[source]
    source: serde_json::Error,
  },
  /// A structured-data operation was requested on a binary asset.
  #[error("{} is not a structured data file", path.display())]
  NotStructuredData {
    /// Offending path.
    path: PathBuf,
  },
  /// A clone would overwrite an existing file.
  #[error("cannot clone {} onto existing file {}", source_path.display(), destination.display())]
  DestinationCollision {
    /// File being cloned.
    source_path: PathBuf,
    /// Destination that already exists.
    destination: PathBuf,
  },
  /// Persisting a clone destination failed.
  #[error("failed to write {}: {source}", path.display())]
  WriteFailure {
    /// Destination path.
    path: PathBuf,
    /// Source I/O error.
    #[source]
    source: std::io::Error,
  },
  /// No node is registered under the path.
  #[error("no node loaded for {}", path.display())]
  UnknownNode {
    /// Requested path.
    path: PathBuf,
  },
}

/// Non-fatal conditions reported to the user while loading or cloning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphWarning {
  /// A `file(...)` expression points at nothing on disk.
  MissingReference {
    /// File containing the expression.
    file: PathBuf,
    /// Resolved path that does not exist.
    target: PathBuf,
  },
  /// A file could not be loaded; the node stays partially loaded.
  ParseFailure {
    /// File that failed.
    file: PathBuf,
    /// Human readable reason.
    message: String,
  },
  /// A recipe was cloned but no recipe list enumerates it.
  MissingRecipeList {
    /// Recipe file.
    recipe: PathBuf,
  },
  /// An entity form field could not be resolved to a file.
  UnresolvedForm {
    /// Entity file.
    file: PathBuf,
    /// Form field name.
    field: String,
    /// Raw field value.
    value: String,
  },
  /// A clone operation failed part way through.
  CloneFailed {
    /// Root of the clone.
    root: PathBuf,
    /// Human readable reason.
    message: String,
  },
}

impl std::fmt::Display for GraphWarning {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::MissingReference { file, target } => write!(
        f,
        "File {} links to non-existent file {}",
        file.display(),
        target.display()
      ),
      Self::ParseFailure { file, message } => {
        write!(f, "Failed to load json file {}. Error: {}", file.display(), message)
      }
      Self::MissingRecipeList { recipe } => {
        write!(f, "No recipe list enumerates {}", recipe.display())
      }
      Self::UnresolvedForm { file, field, value } => write!(
        f,
        "File {} has unresolvable {} '{}'",
        file.display(),
        field,
        value
      ),
      Self::CloneFailed { root, message } => {
        write!(f, "Failed to clone {}: {}", root.display(), message)
      }
    }
  }
}
