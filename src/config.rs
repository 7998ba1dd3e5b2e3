//! Graph configuration loader describing corpus conventions.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

const DEFAULT_CONFIG_FILE: &str = "content_graph.config.json";

/// Discoverable configuration describing how a content corpus is laid out.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
  /// Root directory that module-qualified expressions (`file(/mod/...)`) are resolved against.
  pub mods_root: Option<PathBuf>,
  /// File name of the per-module manifest listing aliases.
  pub manifest_file: String,
  /// Number of spaces used when writing structured data back to disk.
  pub indent_width: usize,
  /// Component key holding an entity's ghost and iconic forms.
  pub entity_forms_component: String,
  /// Name suffix carried by recipe files.
  pub recipe_suffix: String,
  /// Name suffix carried by job description files.
  pub job_suffix: String,
  /// Bare `file(...)` values that denote folders rather than files.
  pub reserved_folder_tokens: Vec<String>,
  /// Extensions treated as image payloads.
  pub image_extensions: Vec<String>,
  /// Extensions treated as voxel model payloads.
  pub model_extensions: Vec<String>,
  /// Extensions treated as structured data.
  pub data_extensions: Vec<String>,
}

impl Default for GraphConfig {
  fn default() -> Self {
    Self {
      mods_root: None,
      manifest_file: "manifest.json".into(),
      indent_width: 3,
      entity_forms_component: "stonehearth:entity_forms".into(),
      recipe_suffix: "_recipe".into(),
      job_suffix: "_description".into(),
      reserved_folder_tokens: vec!["animations".into(), "effects".into()],
      image_extensions: vec!["png".into()],
      model_extensions: vec!["qb".into()],
      data_extensions: vec!["json".into()],
    }
  }
}

impl GraphConfig {
  /// Attempt to load configuration from the provided directory.
  ///
  /// A missing or malformed file yields the defaults.
  pub fn discover(dir: &Path) -> Self {
    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    Self::from_path(&candidate).unwrap_or_default()
  }

  /// Read configuration from a specific JSON file.
  pub fn from_path(path: &Path) -> Option<Self> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
  }

  /// Override the mods root, typically from the command line.
  pub fn with_mods_root(mut self, mods_root: impl Into<PathBuf>) -> Self {
    self.mods_root = Some(mods_root.into());
    self
  }

  /// Returns `true` when `value` is a reserved folder token such as `animations`.
  pub fn is_reserved_folder(&self, value: &str) -> bool {
    self
      .reserved_folder_tokens
      .iter()
      .any(|token| token == value)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn defaults_when_file_is_missing() {
    let dir = tempdir().unwrap();
    let config = GraphConfig::discover(dir.path());
    assert_eq!(config.indent_width, 3);
    assert_eq!(config.manifest_file, "manifest.json");
    assert!(config.is_reserved_folder("animations"));
    assert!(config.is_reserved_folder("effects"));
    assert!(!config.is_reserved_folder("effects/steam"));
  }

  #[test]
  fn reads_partial_configuration() {
    let dir = tempdir().unwrap();
    fs::write(
      dir.path().join(DEFAULT_CONFIG_FILE),
      r#"{"indent_width": 2, "mods_root": "/games/mods"}"#,
    )
    .unwrap();

    let config = GraphConfig::discover(dir.path());
    assert_eq!(config.indent_width, 2);
    assert_eq!(config.mods_root, Some(PathBuf::from("/games/mods")));
    assert_eq!(config.recipe_suffix, "_recipe");
  }

  #[test]
  fn malformed_file_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "{ not json").unwrap();

    let config = GraphConfig::discover(dir.path());
    assert_eq!(config.indent_width, 3);
  }
}
