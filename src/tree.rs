//! Filtered dependency tree used by hosts to display a node and what it links to.

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::content_type::ContentType;
use crate::graph::DependencyGraph;
use crate::node::NodeId;

/// One row of the dependency tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
  /// Display label: the owning unit identifier or the file stem.
  pub label: String,
  /// File backing the row.
  pub path: PathBuf,
  /// Type tag for structured-data rows.
  pub content_type: Option<ContentType>,
  /// Child rows.
  pub children: Vec<TreeEntry>,
}

impl TreeEntry {
  /// Render the tree as indented text, two spaces per level.
  pub fn render(&self) -> String {
    let mut out = String::new();
    self.render_into(0, &mut out);
    out
  }

  fn render_into(&self, depth: usize, out: &mut String) {
    out.push_str(&"  ".repeat(depth));
    out.push_str(&self.label);
    if let Some(content_type) = self.content_type.filter(|tag| *tag != ContentType::None) {
      out.push_str(&format!(" [{content_type}]"));
    }
    out.push('\n');
    for child in &self.children {
      child.render_into(depth + 1, out);
    }
  }
}

/// Build the tree rooted at `id`.
///
/// Jobs list their recipe list with the recipes whose name contains `filter`. With a non-empty
/// filter, `None` is returned when neither the root label nor any recipe matches.
pub fn dependency_tree(graph: &DependencyGraph, id: NodeId, filter: Option<&str>) -> Option<TreeEntry> {
  let filter = filter.filter(|value| !value.is_empty());
  let node = graph.node(id);
  let mut root = entry_for(graph, id);
  let mut has_matching_child = false;
  let mut visited = BTreeSet::from([id]);

  if node.content_type() == Some(ContentType::Job) {
    if let Some(list) = node.opened().first().copied() {
      let mut recipes = entry_for(graph, list);
      for recipe in graph.node(list).linked().values().copied() {
        let name = graph.node(recipe).file_stem();
        if filter.is_none_or(|value| name.contains(value)) {
          let mut seen = BTreeSet::from([id, list]);
          recipes.children.push(linked_subtree(graph, recipe, &mut seen));
          has_matching_child = true;
        }
      }
      if filter.is_some() && recipes.children.is_empty() {
        return None;
      }
      root.children.push(recipes);
      visited.insert(list);
    }
  }

  if let Some(value) = filter {
    if !has_matching_child && !root.label.contains(value) {
      return None;
    }
  }

  for dependency in node.linked().values().copied() {
    if visited.contains(&dependency) {
      continue;
    }
    root.children.push(linked_subtree(graph, dependency, &mut visited));
  }
  Some(root)
}

fn entry_for(graph: &DependencyGraph, id: NodeId) -> TreeEntry {
  let node = graph.node(id);
  TreeEntry {
    label: node
      .unit()
      .map(str::to_string)
      .unwrap_or_else(|| node.file_stem()),
    path: node.path().to_path_buf(),
    content_type: node.content_type(),
    children: Vec::new(),
  }
}

fn linked_subtree(graph: &DependencyGraph, id: NodeId, visited: &mut BTreeSet<NodeId>) -> TreeEntry {
  let mut entry = entry_for(graph, id);
  if !visited.insert(id) {
    return entry;
  }
  for dependency in graph.node(id).linked().values().copied() {
    if visited.contains(&dependency) {
      continue;
    }
    entry.children.push(linked_subtree(graph, dependency, visited));
  }
  entry
}
