//! Registry of `module:alias` content identifiers and the units they name.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::GraphWarning;
use crate::paths::{PathResolver, normalize_path};

/// A named piece of content owned by a module, identified by `module:alias`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentUnit {
  /// Owning module (the directory name under the mods root).
  pub module: String,
  /// Alias within the module, such as `food:apple_pie`.
  pub alias: String,
  /// Root file of the unit.
  pub root: PathBuf,
}

impl ContentUnit {
  /// Fully-qualified identifier, `module:alias`.
  pub fn identifier(&self) -> String {
    format!("{}:{}", self.module, self.alias)
  }
}

#[derive(Debug, Default, Deserialize)]
struct ModuleManifest {
  #[serde(default)]
  aliases: BTreeMap<String, String>,
}

/// Maps fully-qualified content identifiers to their content units.
///
/// Filled once while the corpus is scanned and only read during link discovery.
#[derive(Debug, Clone, Default)]
pub struct AliasIndex {
  units: BTreeMap<String, ContentUnit>,
}

impl AliasIndex {
  /// Register a unit under `identifier`, replacing any previous registration.
  pub fn register(&mut self, identifier: impl Into<String>, unit: ContentUnit) {
    self.units.insert(identifier.into(), unit);
  }

  /// Look up the unit registered under `identifier`.
  pub fn lookup(&self, identifier: &str) -> Option<&ContentUnit> {
    self.units.get(identifier)
  }

  /// Iterate over every registration in identifier order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &ContentUnit)> {
    self
      .units
      .iter()
      .map(|(identifier, unit)| (identifier.as_str(), unit))
  }

  /// Number of registered identifiers.
  pub fn len(&self) -> usize {
    self.units.len()
  }

  /// Returns `true` when nothing has been registered.
  pub fn is_empty(&self) -> bool {
    self.units.is_empty()
  }

  /// Register the aliases of every module directory under `mods_root`.
  ///
  /// Each directory holding `manifest_file` is a module; every entry of the manifest's
  /// `aliases` object is registered as `<module>:<alias>`. Unreadable manifests and aliases
  /// pointing at missing files are returned as warnings and skipped.
  pub fn scan_mods(
    &mut self,
    mods_root: &Path,
    manifest_file: &str,
    resolver: &PathResolver,
  ) -> Vec<GraphWarning> {
    let mut warnings = Vec::new();
    let Ok(entries) = fs::read_dir(mods_root) else {
      return warnings;
    };

    let mut module_dirs: Vec<PathBuf> = entries
      .flatten()
      .filter(|entry| entry.file_type().is_ok_and(|ft| ft.is_dir()))
      .map(|entry| entry.path())
      .collect();
    module_dirs.sort();

    for module_dir in module_dirs {
      let Some(module) = module_dir
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
      else {
        continue;
      };
      if module.starts_with('.') {
        continue;
      }

      let manifest_path = normalize_path(&module_dir.join(manifest_file));
      if !manifest_path.exists() {
        continue;
      }

      let manifest = match read_manifest(&manifest_path) {
        Ok(manifest) => manifest,
        Err(message) => {
          warnings.push(GraphWarning::ParseFailure {
            file: manifest_path,
            message,
          });
          continue;
        }
      };

      let module_dir = normalize_path(&module_dir);
      for (alias, expression) in manifest.aliases {
        match resolver.resolve_existing(&expression, &module_dir) {
          Ok(root) => {
            let unit = ContentUnit {
              module: module.clone(),
              alias,
              root,
            };
            self.register(unit.identifier(), unit);
          }
          Err(target) => warnings.push(GraphWarning::MissingReference {
            file: manifest_path.clone(),
            target,
          }),
        }
      }
    }

    warnings
  }
}

fn read_manifest(path: &Path) -> Result<ModuleManifest, String> {
  let content = fs::read_to_string(path).map_err(|err| err.to_string())?;
  serde_json::from_str(&content).map_err(|err| err.to_string())
}
