//! Graph-aware cloning: copy a node and the dependencies specific to it under a new name.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde_json::{Value, json};

use crate::codec::{map_strings, to_indented_string};
use crate::content_type::{ContentType, TypeRules};
use crate::error::{GraphError, GraphResult, GraphWarning};
use crate::graph::DependencyGraph;
use crate::node::{AssetKind, NodeId};
use crate::paths::{has_file_expression, relative_path, rewrite_file_expressions};

/// What a clone produced (or would produce, for a dry run) at one destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClonedPayload {
  /// Rewritten structured-data text.
  Text(String),
  /// Binary payload copied byte for byte.
  Copy,
}

/// One file produced by a clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClonedFile {
  /// File that was cloned.
  pub source: PathBuf,
  /// Where the clone lives.
  pub destination: PathBuf,
  /// Contents of the clone.
  pub payload: ClonedPayload,
}

/// Existing file patched in place by a clone, such as a recipe list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchedFile {
  /// File that was patched.
  pub path: PathBuf,
  /// Full text after patching.
  pub text: String,
}

/// Summary of a clone operation in the order files were produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloneReport {
  /// Newly produced files; dependencies precede their referrers.
  pub files: Vec<ClonedFile>,
  /// Existing files updated to enumerate the clones.
  pub patched: Vec<PatchedFile>,
}

/// State threaded through one clone call graph.
///
/// `already_cloned` maps each cloned source path to its destination, so shared dependencies
/// in a diamond are cloned once and every referrer points at the same copy. Use a fresh
/// session per user-level operation.
#[derive(Debug, Default)]
pub struct CloneSession {
  execute: bool,
  already_cloned: BTreeMap<PathBuf, PathBuf>,
  report: CloneReport,
}

impl CloneSession {
  /// Start a session; with `execute == false` nothing is written to disk.
  pub fn new(execute: bool) -> Self {
    Self {
      execute,
      ..Self::default()
    }
  }

  /// Destinations chosen so far, keyed by source path.
  pub fn already_cloned(&self) -> &BTreeMap<PathBuf, PathBuf> {
    &self.already_cloned
  }

  /// Finish the session, returning what was produced.
  pub fn into_report(self) -> CloneReport {
    self.report
  }
}

impl DependencyGraph {
  /// Clone `root` renaming `old_name` to `new_name`, recursing into its specific dependencies.
  ///
  /// Cloning is not transactional: on error, files written before the failure stay on disk.
  pub fn clone_node(
    &mut self,
    root: NodeId,
    old_name: &str,
    new_name: &str,
    execute: bool,
  ) -> GraphResult<CloneReport> {
    let mut session = CloneSession::new(execute);
    self.clone_with(root, old_name, new_name, &mut session)?;
    Ok(session.into_report())
  }

  /// Like [`DependencyGraph::clone_node`], but reports failure as a warning and returns `false`.
  pub fn clone_and_report(
    &mut self,
    root: NodeId,
    old_name: &str,
    new_name: &str,
    execute: bool,
  ) -> bool {
    match self.clone_node(root, old_name, new_name, execute) {
      Ok(report) => {
        info!(
          "cloned {} into {} files",
          self.nodes[root.0].path.display(),
          report.files.len()
        );
        true
      }
      Err(err) => {
        let root = self.nodes[root.0].path.clone();
        self.warn(GraphWarning::CloneFailed {
          root,
          message: err.to_string(),
        });
        false
      }
    }
  }

  /// Clone one node within an existing session, returning its destination path.
  ///
  /// A node already cloned in this session is not cloned again; its earlier destination is
  /// returned instead.
  pub fn clone_with(
    &mut self,
    id: NodeId,
    old_name: &str,
    new_name: &str,
    session: &mut CloneSession,
  ) -> GraphResult<PathBuf> {
    let source = self.nodes[id.0].path.clone();
    if let Some(destination) = session.already_cloned.get(&source) {
      return Ok(destination.clone());
    }

    let content_type = self.nodes[id.0].content_type();
    let (old_name, new_name) = self.clone_names(content_type, old_name, new_name);
    let destination = clone_destination(&source, &old_name, &new_name);
    if destination == source || destination.exists() {
      return Err(GraphError::DestinationCollision {
        source_path: source,
        destination,
      });
    }
    session
      .already_cloned
      .insert(source.clone(), destination.clone());

    let dependencies: Vec<(PathBuf, NodeId)> = self.nodes[id.0]
      .linked
      .iter()
      .map(|(path, dependency)| (path.clone(), *dependency))
      .collect();
    for (dependency_path, dependency) in dependencies {
      let dependency_name = dependency_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
      if !self.should_clone_dependency(id, &dependency_name, &old_name) {
        debug!("relinking shared dependency {}", dependency_path.display());
        continue;
      }
      self.clone_with(dependency, &old_name, &new_name, session)?;
    }

    let payload = if matches!(self.nodes[id.0].kind, AssetKind::StructuredData(_)) {
      ClonedPayload::Text(self.rewrite_structured(id, &destination, &old_name, &new_name, session)?)
    } else {
      ClonedPayload::Copy
    };

    if session.execute {
      write_clone(&source, &destination, &payload)?;
      info!("wrote {}", destination.display());
    }
    session.report.files.push(ClonedFile {
      source: source.clone(),
      destination: destination.clone(),
      payload,
    });

    if content_type == Some(ContentType::Recipe) {
      self.patch_recipe_list(id, &destination, &new_name, session)?;
    }

    Ok(destination)
  }

  /// Decide whether the dependency `dependency_name` of `id` is cloned or relinked.
  pub fn should_clone_dependency(&self, id: NodeId, dependency_name: &str, old_name: &str) -> bool {
    match self.nodes[id.0].rules() {
      Some(rules) => rules.should_clone_dependency(dependency_name, old_name),
      None => TypeRules::Plain.should_clone_dependency(dependency_name, old_name),
    }
  }

  fn clone_names(
    &self,
    content_type: Option<ContentType>,
    old_name: &str,
    new_name: &str,
  ) -> (String, String) {
    match content_type {
      Some(ContentType::Recipe) => {
        let suffix = self.config.recipe_suffix.as_str();
        (old_name.replace(suffix, ""), new_name.replace(suffix, ""))
      }
      _ => (old_name.to_string(), new_name.to_string()),
    }
  }

  fn rewrite_structured(
    &self,
    id: NodeId,
    destination: &Path,
    old_name: &str,
    new_name: &str,
    session: &CloneSession,
  ) -> GraphResult<String> {
    let node = &self.nodes[id.0];
    let Some(tree) = node.tree() else {
      // Unparsed documents are cloned as plain text.
      let text = node.raw_text().map(str::to_string).ok_or_else(|| GraphError::NotStructuredData {
        path: node.path.clone(),
      })?;
      return Ok(text.replace(old_name, new_name));
    };

    let source_dir = node.directory();
    let destination_dir = destination.parent().unwrap_or_else(|| Path::new(""));
    let rewritten = map_strings(tree, &mut |value| {
      if has_file_expression(value) {
        rewrite_file_expressions(value, |inner| {
          self.rewrite_reference(inner, source_dir, destination_dir, old_name, new_name, session)
        })
      } else {
        value.replace(old_name, new_name)
      }
    });

    to_indented_string(&rewritten, self.config.indent_width).map_err(|source| GraphError::Parse {
      path: node.path.clone(),
      source,
    })
  }

  /// Rewrite the inner value of one `file(...)` expression for a clone living in
  /// `destination_dir`.
  ///
  /// Cloned targets are pointed at their copy, everything else at the original file. The
  /// expression's own spelling is kept when it still resolves correctly.
  fn rewrite_reference(
    &self,
    inner: &str,
    source_dir: &Path,
    destination_dir: &Path,
    old_name: &str,
    new_name: &str,
    session: &CloneSession,
  ) -> String {
    if self.config.is_reserved_folder(inner) {
      return inner.to_string();
    }

    let original = self
      .resolver
      .resolve_existing(inner, source_dir)
      .unwrap_or_else(|missing| missing);
    let target = session
      .already_cloned
      .get(&original)
      .cloned()
      .unwrap_or(original);

    let renamed = inner.replace(old_name, new_name);
    for candidate in [renamed.as_str(), inner] {
      if self.resolver.points_to(candidate, destination_dir, &target) {
        return candidate.to_string();
      }
    }
    relative_path(destination_dir, &target)
  }

  /// Insert the cloned recipe next to the original in the recipe list that enumerates it.
  fn patch_recipe_list(
    &mut self,
    recipe: NodeId,
    destination: &Path,
    new_name: &str,
    session: &mut CloneSession,
  ) -> GraphResult<()> {
    let recipe_path = self.nodes[recipe.0].path.clone();
    let recipe_file = self.nodes[recipe.0].file_name();
    let list = self.nodes[recipe.0]
      .related
      .iter()
      .rev()
      .copied()
      .find(|candidate| {
        self.nodes[candidate.0]
          .tree()
          .is_some_and(|tree| tree.get("craftable_recipes").is_some())
      });
    let Some(list) = list else {
      self.warn(GraphWarning::MissingRecipeList {
        recipe: recipe_path,
      });
      return Ok(());
    };

    let list_path = self.nodes[list.0].path.clone();
    let Some(mut tree) = self.nodes[list.0].tree().cloned() else {
      return Ok(());
    };
    let entry = json!({
      "recipe": format!("file({})", relative_path(self.nodes[list.0].directory(), destination))
    });
    if !insert_recipe_entry(&mut tree, &recipe_file, new_name, entry) {
      self.warn(GraphWarning::MissingRecipeList {
        recipe: recipe_path,
      });
      return Ok(());
    }

    let text = to_indented_string(&tree, self.config.indent_width).map_err(|source| {
      GraphError::Parse {
        path: list_path.clone(),
        source,
      }
    })?;

    if session.execute {
      fs::write(&list_path, &text).map_err(|source| GraphError::WriteFailure {
        path: list_path.clone(),
        source,
      })?;
      info!("patched {}", list_path.display());
      if let Some(data) = self.nodes[list.0].structured_mut() {
        data.text = Some(text.clone());
        data.tree = Some(tree);
      }
    }
    session.report.patched.push(PatchedFile {
      path: list_path,
      text,
    });
    Ok(())
  }
}

/// Add `key: entry` to the `craftable_recipes.*.recipes` object that mentions `recipe_file`.
fn insert_recipe_entry(tree: &mut Value, recipe_file: &str, key: &str, entry: Value) -> bool {
  let Some(categories) = tree
    .get_mut("craftable_recipes")
    .and_then(Value::as_object_mut)
  else {
    return false;
  };

  for category in categories.values_mut() {
    let Some(recipes) = category.get_mut("recipes").and_then(Value::as_object_mut) else {
      continue;
    };
    let mentions_recipe = recipes
      .values()
      .any(|value| value.to_string().contains(recipe_file));
    if mentions_recipe {
      recipes.insert(key.to_string(), entry);
      return true;
    }
  }
  false
}

/// Destination for a clone of `source`.
///
/// The old name is replaced wherever it appears in the path. Files whose path does not mention
/// the old name (items a recipe produces under another name) take the new name as their stem.
fn clone_destination(source: &Path, old_name: &str, new_name: &str) -> PathBuf {
  let text = source.to_string_lossy();
  if text.contains(old_name) {
    return PathBuf::from(text.replace(old_name, new_name));
  }
  let file_name = match source.extension() {
    Some(extension) => format!("{new_name}.{}", extension.to_string_lossy()),
    None => new_name.to_string(),
  };
  source.with_file_name(file_name)
}

fn write_clone(source: &Path, destination: &Path, payload: &ClonedPayload) -> GraphResult<()> {
  let write_failure = |source| GraphError::WriteFailure {
    path: destination.to_path_buf(),
    source,
  };

  if let Some(parent) = destination.parent() {
    fs::create_dir_all(parent).map_err(write_failure)?;
  }
  match payload {
    ClonedPayload::Text(text) => fs::write(destination, text).map_err(write_failure),
    ClonedPayload::Copy => fs::copy(source, destination)
      .map(|_| ())
      .map_err(write_failure),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::alias::AliasIndex;
  use crate::config::GraphConfig;
  use crate::paths::normalize_path;
  use tempfile::{TempDir, tempdir};

  fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
  }

  fn corpus() -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let root = normalize_path(dir.path());
    (dir, root)
  }

  fn graph() -> DependencyGraph {
    DependencyGraph::new(GraphConfig::default(), AliasIndex::default())
  }

  fn text_for<'a>(report: &'a CloneReport, destination: &Path) -> &'a str {
    let file = report
      .files
      .iter()
      .find(|file| file.destination == destination)
      .unwrap_or_else(|| panic!("no clone at {}", destination.display()));
    match &file.payload {
      ClonedPayload::Text(text) => text,
      ClonedPayload::Copy => panic!("{} was copied, not rewritten", destination.display()),
    }
  }

  fn write_pie_corpus(root: &Path) {
    write_file(&root.join("icons/shared_icon.png"), "shared");
    write_file(
      &root.join("cook/recipes/recipes.json"),
      r#"{
   "craftable_recipes": {
      "food": {
         "recipes": {
            "apple_pie": {
               "recipe": "file(apple_pie_recipe.json)"
            }
         }
      }
   }
}"#,
    );
    write_file(
      &root.join("cook/recipes/apple_pie_recipe.json"),
      r#"{
   "type": "recipe",
   "portrait": "file(../../icons/shared_icon.png)",
   "produces": [
      {
         "item": "file(apple_pie.json)"
      }
   ]
}"#,
    );
    write_file(
      &root.join("cook/recipes/apple_pie.json"),
      r#"{
   "type": "entity",
   "icon": "file(../../icons/shared_icon.png)"
}"#,
    );
  }

  #[test]
  fn recipe_clone_clones_product_and_patches_list() {
    let (_dir, root) = corpus();
    write_pie_corpus(&root);

    let mut graph = graph();
    let list = graph.open(&root.join("cook/recipes/recipes.json")).unwrap();
    let recipe = graph
      .find(&root.join("cook/recipes/apple_pie_recipe.json"))
      .unwrap();
    assert_eq!(graph.name_for_cloning(recipe), "apple_pie");

    let report = graph
      .clone_node(recipe, "apple_pie", "cherry_pie", true)
      .unwrap();

    let new_recipe = root.join("cook/recipes/cherry_pie_recipe.json");
    let new_item = root.join("cook/recipes/cherry_pie.json");
    assert!(new_recipe.exists());
    assert!(new_item.exists());
    assert!(!root.join("icons/cherry_pie_icon.png").exists());

    let recipe_text = fs::read_to_string(&new_recipe).unwrap();
    assert!(recipe_text.contains("file(cherry_pie.json)"));
    assert!(recipe_text.contains("file(../../icons/shared_icon.png)"));

    let list_text = fs::read_to_string(root.join("cook/recipes/recipes.json")).unwrap();
    let list_tree: Value = serde_json::from_str(&list_text).unwrap();
    let recipes = &list_tree["craftable_recipes"]["food"]["recipes"];
    assert_eq!(recipes["cherry_pie"]["recipe"], "file(cherry_pie_recipe.json)");
    assert_eq!(recipes["apple_pie"]["recipe"], "file(apple_pie_recipe.json)");
    let keys: Vec<&String> = recipes.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["apple_pie", "cherry_pie"]);

    assert_eq!(report.patched.len(), 1);
    assert_eq!(graph.node(list).tree(), Some(&list_tree));
    assert_eq!(
      report.files.last().map(|file| file.destination.clone()),
      Some(new_recipe)
    );
  }

  #[test]
  fn suffixed_names_do_not_double_the_suffix() {
    let (_dir, root) = corpus();
    write_pie_corpus(&root);

    let mut graph = graph();
    graph.open(&root.join("cook/recipes/recipes.json")).unwrap();
    let recipe = graph
      .find(&root.join("cook/recipes/apple_pie_recipe.json"))
      .unwrap();

    let report = graph
      .clone_node(recipe, "apple_pie_recipe", "cherry_pie_recipe", false)
      .unwrap();
    let destinations: Vec<&PathBuf> = report.files.iter().map(|file| &file.destination).collect();
    assert!(destinations.contains(&&root.join("cook/recipes/cherry_pie_recipe.json")));
    assert!(destinations.contains(&&root.join("cook/recipes/cherry_pie.json")));
  }

  #[test]
  fn shared_dependency_is_relinked_not_cloned() {
    let (_dir, root) = corpus();
    write_pie_corpus(&root);
    write_file(
      &root.join("cook/recipes/plum_tart_recipe.json"),
      r#"{"type": "recipe", "portrait": "file(../../icons/shared_icon.png)"}"#,
    );

    let mut graph = graph();
    graph.open(&root.join("cook/recipes/recipes.json")).unwrap();
    let tart = graph
      .open(&root.join("cook/recipes/plum_tart_recipe.json"))
      .unwrap();

    let report = graph.clone_node(tart, "plum_tart", "fig_tart", false).unwrap();

    assert_eq!(report.files.len(), 1);
    let text = text_for(&report, &root.join("cook/recipes/fig_tart_recipe.json"));
    assert!(text.contains("file(../../icons/shared_icon.png)"));
    assert!(!root.join("cook/recipes/fig_tart_recipe.json").exists());
  }

  #[test]
  fn relinked_references_survive_a_directory_change() {
    let (_dir, root) = corpus();
    write_file(&root.join("shared/stone.png"), "png");
    write_file(
      &root.join("wall/wall.json"),
      r#"{"type": "entity", "icon": "file(../shared/stone.png)", "model": "file(wall.qb)"}"#,
    );
    write_file(&root.join("wall/wall.qb"), "voxels");

    let mut graph = graph();
    let wall = graph.open(&root.join("wall/wall.json")).unwrap();
    let report = graph.clone_node(wall, "wall", "fence", true).unwrap();

    let text = fs::read_to_string(root.join("fence/fence.json")).unwrap();
    let tree: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(tree["icon"], "file(../shared/stone.png)");
    assert_eq!(tree["model"], "file(fence.qb)");
    assert_eq!(fs::read_to_string(root.join("fence/fence.qb")).unwrap(), "voxels");
    assert_eq!(report.files.len(), 2);
    assert_eq!(report.files[0].payload, ClonedPayload::Copy);
  }

  #[test]
  fn diamond_dependency_is_cloned_once() {
    let (_dir, root) = corpus();
    write_file(
      &root.join("gate.json"),
      r#"{"left": "file(gate_left.json)", "right": "file(gate_right.json)"}"#,
    );
    write_file(&root.join("gate_left.json"), r#"{"hinge": "file(gate_hinge.json)"}"#);
    write_file(&root.join("gate_right.json"), r#"{"hinge": "file(gate_hinge.json)"}"#);
    write_file(&root.join("gate_hinge.json"), r#"{"name": "gate hinge"}"#);

    let mut graph = graph();
    let gate = graph.open(&root.join("gate.json")).unwrap();
    let report = graph.clone_node(gate, "gate", "door", false).unwrap();

    let hinge_clones = report
      .files
      .iter()
      .filter(|file| file.source == root.join("gate_hinge.json"))
      .count();
    assert_eq!(hinge_clones, 1);
    assert_eq!(report.files.len(), 4);

    for side in ["door_left.json", "door_right.json"] {
      let tree: Value = serde_json::from_str(text_for(&report, &root.join(side))).unwrap();
      assert_eq!(tree["hinge"], "file(door_hinge.json)");
    }
    let hinge: Value =
      serde_json::from_str(text_for(&report, &root.join("door_hinge.json"))).unwrap();
    assert_eq!(hinge["name"], "door hinge");
  }

  #[test]
  fn cloning_is_deterministic_across_fresh_sessions() {
    let (_dir, root) = corpus();
    write_pie_corpus(&root);

    let mut graph = graph();
    graph.open(&root.join("cook/recipes/recipes.json")).unwrap();
    let recipe = graph
      .find(&root.join("cook/recipes/apple_pie_recipe.json"))
      .unwrap();

    let first = graph.clone_node(recipe, "apple_pie", "cherry_pie", false).unwrap();
    let second = graph.clone_node(recipe, "apple_pie", "cherry_pie", false).unwrap();
    assert_eq!(first, second);
    assert!(!root.join("cook/recipes/cherry_pie.json").exists());
  }

  #[test]
  fn collision_with_existing_file_fails_without_rollback() {
    let (_dir, root) = corpus();
    write_file(
      &root.join("lamp.json"),
      r#"{"glow": "file(lamp_glow.json)", "wick": "file(lamp_wick.json)"}"#,
    );
    write_file(&root.join("lamp_glow.json"), r#"{"color": "amber"}"#);
    write_file(&root.join("lamp_wick.json"), r#"{"length": 2}"#);
    write_file(&root.join("torch_wick.json"), r#"{"already": "here"}"#);

    let mut graph = graph();
    let lamp = graph.open(&root.join("lamp.json")).unwrap();
    assert!(!graph.clone_and_report(lamp, "lamp", "torch", true));

    assert!(root.join("torch_glow.json").exists());
    assert!(!root.join("torch.json").exists());
    assert_eq!(
      fs::read_to_string(root.join("torch_wick.json")).unwrap(),
      r#"{"already": "here"}"#
    );
    assert!(matches!(
      graph.warnings().last(),
      Some(GraphWarning::CloneFailed { .. })
    ));
  }

  #[test]
  fn recipe_without_list_still_clones_with_warning() {
    let (_dir, root) = corpus();
    write_file(&root.join("bread_recipe.json"), r#"{"type": "recipe"}"#);

    let mut graph = graph();
    let recipe = graph.open(&root.join("bread_recipe.json")).unwrap();
    let report = graph.clone_node(recipe, "bread", "bun", true).unwrap();

    assert!(root.join("bun_recipe.json").exists());
    assert!(report.patched.is_empty());
    assert_eq!(graph.warnings(), &[GraphWarning::MissingRecipeList {
      recipe: root.join("bread_recipe.json"),
    }]);
  }

  #[test]
  fn produced_item_with_unrelated_name_takes_the_new_name() {
    let (_dir, root) = corpus();
    write_file(
      &root.join("bakery/recipes.json"),
      r#"{"craftable_recipes": {"food": {"recipes": {"apple_pie": {"recipe": "file(apple_pie_recipe.json)"}}}}}"#,
    );
    write_file(
      &root.join("bakery/apple_pie_recipe.json"),
      r#"{"type": "recipe", "produces": [{"item": "file(fruit_tart.json)"}]}"#,
    );
    write_file(
      &root.join("bakery/fruit_tart.json"),
      r#"{"type": "entity", "name": "fruit tart"}"#,
    );

    let mut graph = graph();
    graph.open(&root.join("bakery/recipes.json")).unwrap();
    let recipe = graph.find(&root.join("bakery/apple_pie_recipe.json")).unwrap();
    let report = graph
      .clone_node(recipe, "apple_pie", "cherry_pie", true)
      .unwrap();

    let new_item = root.join("bakery/cherry_pie.json");
    assert_eq!(report.files[0].source, root.join("bakery/fruit_tart.json"));
    assert_eq!(report.files[0].destination, new_item);
    let item: Value = serde_json::from_str(&fs::read_to_string(&new_item).unwrap()).unwrap();
    assert_eq!(item["name"], "fruit tart");

    let recipe_text = fs::read_to_string(root.join("bakery/cherry_pie_recipe.json")).unwrap();
    let recipe_tree: Value = serde_json::from_str(&recipe_text).unwrap();
    assert_eq!(recipe_tree["produces"][0]["item"], "file(cherry_pie.json)");
    assert_eq!(
      fs::read_to_string(root.join("bakery/fruit_tart.json")).unwrap(),
      r#"{"type": "entity", "name": "fruit tart"}"#
    );
    assert_eq!(report.patched.len(), 1);
  }

  #[test]
  fn loaded_corpus_lets_a_directly_opened_recipe_patch_its_list() {
    let (_dir, root) = corpus();
    write_file(
      &root.join("stonehearth/manifest.json"),
      r#"{"aliases": {"jobs:cook": "file(jobs/cook/cook_description.json)"}}"#,
    );
    write_file(
      &root.join("stonehearth/jobs/cook/cook_description.json"),
      r#"{"type": "job", "crafter": {"recipe_list": "file(recipes/recipes.json)"}}"#,
    );
    write_file(
      &root.join("stonehearth/jobs/cook/recipes/recipes.json"),
      r#"{"craftable_recipes": {"food": {"recipes": {"apple_pie": {"recipe": "file(apple_pie_recipe.json)"}}}}}"#,
    );
    write_file(
      &root.join("stonehearth/jobs/cook/recipes/apple_pie_recipe.json"),
      r#"{"type": "recipe"}"#,
    );

    let config = GraphConfig::default().with_mods_root(&root);
    let mut graph = DependencyGraph::new(config, AliasIndex::default());
    assert_eq!(graph.load_corpus(), 1);

    let recipes_dir = root.join("stonehearth/jobs/cook/recipes");
    let recipe = graph.open(&recipes_dir.join("apple_pie_recipe.json")).unwrap();
    let report = graph
      .clone_node(recipe, "apple_pie", "cherry_pie", true)
      .unwrap();

    assert_eq!(report.patched.len(), 1);
    assert!(graph.warnings().is_empty());
    let list: Value =
      serde_json::from_str(&fs::read_to_string(recipes_dir.join("recipes.json")).unwrap()).unwrap();
    assert_eq!(
      list["craftable_recipes"]["food"]["recipes"]["cherry_pie"]["recipe"],
      "file(cherry_pie_recipe.json)"
    );
  }

  // Substring replacement also rewrites unrelated path segments that contain the old name.
  #[test]
  fn old_name_inside_unrelated_directory_is_also_replaced() {
    let (_dir, root) = corpus();
    write_file(&root.join("oak_grove/oak.json"), r#"{"type": "entity"}"#);

    let mut graph = graph();
    let oak = graph.open(&root.join("oak_grove/oak.json")).unwrap();
    let report = graph.clone_node(oak, "oak", "pine", false).unwrap();

    assert_eq!(report.files[0].destination, root.join("pine_grove/pine.json"));
  }
}
