//! Dependency graph arena: node creation, loading and link discovery.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use same_file::is_same_file;

use crate::alias::AliasIndex;
use crate::codec::{parse_tree, visit_strings};
use crate::config::GraphConfig;
use crate::content_type::{ContentType, TypeRules};
use crate::error::{GraphError, GraphResult, GraphWarning};
use crate::node::{AssetKind, AssetNode, BinaryPayload, LoadState, NodeId, StructuredData};
use crate::paths::{
  PathResolver, alias_identifier, file_expression_inner, file_expressions, has_file_expression,
  normalize_path,
};

/// Arena of asset nodes keyed by normalised path, plus the services used to load them.
///
/// Forward edges (`linked`) and back edges (`related`) are stored as [`NodeId`]s into the
/// arena, so shared dependencies and cycles need no reference counting. The graph is scoped
/// to one editing session; rebuild it to pick up changes on disk.
#[derive(Debug)]
pub struct DependencyGraph {
  pub(crate) config: GraphConfig,
  pub(crate) resolver: PathResolver,
  aliases: AliasIndex,
  pub(crate) nodes: Vec<AssetNode>,
  by_path: HashMap<PathBuf, NodeId>,
  opened_order: Vec<NodeId>,
  warnings: Vec<GraphWarning>,
}

impl DependencyGraph {
  /// Create an empty graph over the given configuration and alias registry.
  pub fn new(config: GraphConfig, aliases: AliasIndex) -> Self {
    let resolver = PathResolver::new(config.mods_root.clone());
    Self {
      config,
      resolver,
      aliases,
      nodes: Vec::new(),
      by_path: HashMap::new(),
      opened_order: Vec::new(),
      warnings: Vec::new(),
    }
  }

  /// Configuration in use.
  pub fn config(&self) -> &GraphConfig {
    &self.config
  }

  /// Resolver used for `file(...)` expressions.
  pub fn resolver(&self) -> &PathResolver {
    &self.resolver
  }

  /// Alias registry consulted during link discovery.
  pub fn aliases(&self) -> &AliasIndex {
    &self.aliases
  }

  /// Register every module alias under the configured mods root.
  ///
  /// Returns the number of identifiers registered afterwards.
  pub fn scan_mods(&mut self) -> usize {
    if let Some(mods_root) = self.resolver.mods_root().map(Path::to_path_buf) {
      let warnings =
        self
          .aliases
          .scan_mods(&mods_root, &self.config.manifest_file, &self.resolver);
      for warning in warnings {
        self.warn(warning);
      }
    }
    self.aliases.len()
  }

  /// Load the root file of every registered content unit and record its owner.
  pub fn load_units(&mut self) {
    let units: Vec<(String, PathBuf)> = self
      .aliases
      .iter()
      .map(|(identifier, unit)| (identifier.to_string(), unit.root.clone()))
      .collect();

    for (identifier, root) in units {
      let Some(id) = self.node_for_path(&root) else {
        debug!("skipping unit {identifier}: unsupported file {}", root.display());
        continue;
      };
      let node = &mut self.nodes[id.0];
      if node.unit.is_none() {
        node.unit = Some(identifier);
      }
      self.ensure_loaded(id);
    }
  }

  /// Register module aliases and load every unit they name.
  ///
  /// Hosts call this before cloning so back-references such as recipe list to recipe exist
  /// for files that are later opened directly. Returns the number of registered identifiers.
  pub fn load_corpus(&mut self) -> usize {
    let registered = self.scan_mods();
    self.load_units();
    registered
  }

  /// Borrow a node.
  pub fn node(&self, id: NodeId) -> &AssetNode {
    &self.nodes[id.0]
  }

  /// Find the node registered for `path`, if any.
  pub fn find(&self, path: &Path) -> Option<NodeId> {
    self.by_path.get(&normalize_path(path)).copied()
  }

  /// Iterate over every node in creation order.
  pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &AssetNode)> {
    self
      .nodes
      .iter()
      .enumerate()
      .map(|(index, node)| (NodeId(index), node))
  }

  /// Number of nodes in the graph.
  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  /// Returns `true` when no node has been created.
  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  /// Structured-data nodes in the order they began loading.
  pub fn opened_nodes(&self) -> &[NodeId] {
    &self.opened_order
  }

  /// Warnings reported so far.
  pub fn warnings(&self) -> &[GraphWarning] {
    &self.warnings
  }

  /// Drain the reported warnings.
  pub fn take_warnings(&mut self) -> Vec<GraphWarning> {
    std::mem::take(&mut self.warnings)
  }

  pub(crate) fn warn(&mut self, warning: GraphWarning) {
    warn!("{warning}");
    self.warnings.push(warning);
  }

  /// Open a file by path, loading it and everything it links to.
  ///
  /// Paths may be relative to the working directory. A path naming the same file as an
  /// existing node through a different spelling (for example a symlink) reuses that node.
  pub fn open(&mut self, path: &Path) -> GraphResult<NodeId> {
    let absolute = std::path::absolute(path).map_err(|source| GraphError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    let normalized = normalize_path(&absolute);

    let existing = self.find(&normalized).or_else(|| {
      self
        .nodes()
        .find(|(_, node)| is_same_file(node.path(), &normalized).unwrap_or(false))
        .map(|(id, _)| id)
    });
    let id = match existing {
      Some(id) => id,
      None => self
        .node_for_path(&normalized)
        .ok_or(GraphError::UnknownNode { path: normalized })?,
    };
    self.ensure_loaded(id);
    Ok(id)
  }

  /// Return the node for `path`, creating an unloaded one of the right variant if needed.
  ///
  /// Returns `None` when the extension is not a known structured-data, image or model type.
  pub fn node_for_path(&mut self, path: &Path) -> Option<NodeId> {
    let path = normalize_path(path);
    if let Some(id) = self.by_path.get(&path) {
      return Some(*id);
    }

    let kind = self.kind_for_path(&path)?;
    let id = NodeId(self.nodes.len());
    self.nodes.push(AssetNode::new(path.clone(), kind));
    self.by_path.insert(path, id);
    Some(id)
  }

  fn kind_for_path(&self, path: &Path) -> Option<AssetKind> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    let listed = |list: &[String]| list.iter().any(|value| value.eq_ignore_ascii_case(&extension));

    if listed(&self.config.data_extensions) {
      Some(AssetKind::StructuredData(StructuredData::default()))
    } else if listed(&self.config.image_extensions) {
      Some(AssetKind::Image(BinaryPayload::default()))
    } else if listed(&self.config.model_extensions) {
      Some(AssetKind::Model(BinaryPayload::default()))
    } else {
      None
    }
  }

  /// Load a node if it has not started loading yet.
  ///
  /// Structured data is parsed and its links discovered (depth first); binary assets just
  /// read their bytes. Failures are reported as warnings and leave the node partially loaded.
  pub fn ensure_loaded(&mut self, id: NodeId) {
    if self.nodes[id.0].state != LoadState::Unloaded {
      return;
    }
    self.nodes[id.0].state = LoadState::Loading;

    let is_structured = matches!(self.nodes[id.0].kind, AssetKind::StructuredData(_));
    let result = if is_structured {
      self.load_structured(id)
    } else {
      self.load_binary(id)
    };

    let node = &mut self.nodes[id.0];
    match result {
      Ok(()) => node.state = LoadState::Loaded,
      Err(err) => {
        node.state = LoadState::Failed;
        let file = node.path.clone();
        self.warn(GraphWarning::ParseFailure {
          file,
          message: err.to_string(),
        });
      }
    }
  }

  fn load_binary(&mut self, id: NodeId) -> GraphResult<()> {
    let node = &mut self.nodes[id.0];
    let bytes = fs::read(&node.path).map_err(|source| GraphError::Io {
      path: node.path.clone(),
      source,
    })?;
    if let AssetKind::Image(payload) | AssetKind::Model(payload) = &mut node.kind {
      payload.bytes = Some(bytes);
    }
    Ok(())
  }

  fn load_structured(&mut self, id: NodeId) -> GraphResult<()> {
    let path = self.nodes[id.0].path.clone();
    let directory = self.nodes[id.0].directory().to_path_buf();

    let text = fs::read_to_string(&path).map_err(|source| GraphError::Io {
      path: path.clone(),
      source,
    })?;
    self.opened_order.push(id);
    if let Some(data) = self.nodes[id.0].structured_mut() {
      data.text = Some(text.clone());
    }
    let tree = parse_tree(&path, &text)?;
    let content_type = ContentType::of_document(&tree);
    let rules = TypeRules::extract(content_type, &tree, &self.config);

    let mut expressions = Vec::new();
    let mut identifiers = Vec::new();
    visit_strings(&tree, &mut |value| {
      expressions.extend(file_expressions(value).into_iter().map(str::to_string));
      if let Some(identifier) = alias_identifier(value) {
        identifiers.push(identifier.to_string());
      }
    });

    if let Some(data) = self.nodes[id.0].structured_mut() {
      data.tree = Some(tree);
      data.content_type = content_type;
      data.rules = rules.clone();
    }
    debug!("loading {} as {content_type}", path.display());

    self.discover_file_links(id, &directory, &expressions);
    self.discover_aliases(id, &identifiers);
    self.apply_type_rules(id, &directory, &rules);
    Ok(())
  }

  fn discover_file_links(&mut self, id: NodeId, directory: &Path, expressions: &[String]) {
    for inner in expressions {
      if self.config.is_reserved_folder(inner) {
        continue;
      }

      let target = match self.resolver.resolve_existing(inner, directory) {
        Ok(target) => target,
        Err(target) => {
          let file = self.nodes[id.0].path.clone();
          self.warn(GraphWarning::MissingReference { file, target });
          continue;
        }
      };

      if self.nodes[id.0].linked.contains_key(&target) {
        continue;
      }
      self.link_dependency(id, target);
    }
  }

  /// Add `target` to the referrer's links, loading structured data eagerly.
  fn link_dependency(&mut self, referrer: NodeId, target: PathBuf) -> Option<NodeId> {
    let Some(dependency) = self.node_for_path(&target) else {
      debug!(
        "{} links to unsupported file {}",
        self.nodes[referrer.0].path.display(),
        target.display()
      );
      return None;
    };

    if matches!(self.nodes[dependency.0].kind, AssetKind::StructuredData(_)) {
      self.ensure_loaded(dependency);
    }
    self.nodes[dependency.0].add_related(referrer);
    self.nodes[referrer.0].linked.insert(target, dependency);
    Some(dependency)
  }

  fn discover_aliases(&mut self, id: NodeId, identifiers: &[String]) {
    let resolved: Vec<String> = identifiers
      .iter()
      .filter(|identifier| self.aliases.lookup(identifier).is_some())
      .cloned()
      .collect();
    self.nodes[id.0].linked_aliases.extend(resolved);
  }

  fn apply_type_rules(&mut self, id: NodeId, directory: &Path, rules: &TypeRules) {
    match rules {
      TypeRules::Entity {
        ghost_form,
        iconic_form,
      } => {
        for (field, value) in [("ghost_form", ghost_form), ("iconic_form", iconic_form)] {
          let Some(value) = value else {
            continue;
          };
          match self.resolve_form(value, directory) {
            Some(form_path) => {
              if let Some(form) = self.node_for_path(&form_path) {
                self.ensure_loaded(form);
                self.nodes[id.0].opened.push(form);
              }
            }
            None => {
              let file = self.nodes[id.0].path.clone();
              self.warn(GraphWarning::UnresolvedForm {
                file,
                field: field.to_string(),
                value: value.clone(),
              });
            }
          }
        }
      }
      TypeRules::Job {
        recipe_list: Some(recipe_list),
      } => {
        let list_path = match self.resolver.resolve_existing(recipe_list, directory) {
          Ok(path) => path,
          Err(target) => {
            if !has_file_expression(recipe_list) {
              let file = self.nodes[id.0].path.clone();
              self.warn(GraphWarning::MissingReference { file, target });
            }
            return;
          }
        };
        let Some(list) = self.node_for_path(&list_path) else {
          return;
        };
        self.ensure_loaded(list);
        self.nodes[id.0].opened.push(list);

        let recipes: Vec<NodeId> = self.nodes[list.0].linked.values().copied().collect();
        for recipe in recipes {
          self.nodes[id.0].add_related(recipe);
        }
      }
      TypeRules::Recipe {
        portrait: Some(portrait),
        ..
      } => match self.resolver.resolve_existing(portrait, directory) {
        Ok(image) => {
          if !self.nodes[id.0].linked.contains_key(&image) {
            self.link_dependency(id, image);
          }
        }
        Err(target) => {
          // file(...) portraits were already reported by the generic scan.
          if !has_file_expression(portrait) {
            let file = self.nodes[id.0].path.clone();
            self.warn(GraphWarning::MissingReference { file, target });
          }
        }
      },
      _ => {}
    }
  }

  fn resolve_form(&self, value: &str, directory: &Path) -> Option<PathBuf> {
    if !has_file_expression(value) {
      if let Some(unit) = alias_identifier(value).and_then(|alias| self.aliases.lookup(alias)) {
        return Some(unit.root.clone());
      }
    }
    let inner = file_expression_inner(value);
    self.resolver.resolve_existing(inner, directory).ok()
  }

  /// Default new-name seed for cloning: the file stem without its type suffix.
  pub fn name_for_cloning(&self, id: NodeId) -> String {
    let node = &self.nodes[id.0];
    let stem = node.file_stem();
    match node
      .content_type()
      .and_then(|content_type| content_type.name_suffix(&self.config))
    {
      Some(suffix) => stem.strip_suffix(suffix).unwrap_or(&stem).to_string(),
      None => stem,
    }
  }
}
