//! In-memory representation of one file on disk and its discovered links.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::content_type::{ContentType, TypeRules};

/// Index of a node inside a [`crate::DependencyGraph`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// Load progress of a node. Loading happens at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
  /// Created but not yet read.
  #[default]
  Unloaded,
  /// Load has begun; links may still be under discovery.
  Loading,
  /// Payload read and links discovered.
  Loaded,
  /// Load failed part way; whatever was discovered before the failure is kept.
  Failed,
}

/// Parsed structured data plus the type information derived from it.
#[derive(Debug, Clone, Default)]
pub struct StructuredData {
  pub(crate) text: Option<String>,
  pub(crate) tree: Option<Value>,
  pub(crate) content_type: ContentType,
  pub(crate) rules: TypeRules,
}

/// Opaque binary payload, read lazily.
#[derive(Debug, Clone, Default)]
pub struct BinaryPayload {
  pub(crate) bytes: Option<Vec<u8>>,
}

/// Concrete variant of an asset node.
#[derive(Debug, Clone)]
pub enum AssetKind {
  /// A structured-data document.
  StructuredData(StructuredData),
  /// An image file.
  Image(BinaryPayload),
  /// A voxel model file.
  Model(BinaryPayload),
}

/// One file on disk: its payload, outgoing links and back-references.
#[derive(Debug, Clone)]
pub struct AssetNode {
  pub(crate) path: PathBuf,
  pub(crate) kind: AssetKind,
  pub(crate) state: LoadState,
  pub(crate) linked: BTreeMap<PathBuf, NodeId>,
  pub(crate) related: Vec<NodeId>,
  pub(crate) linked_aliases: BTreeSet<String>,
  pub(crate) opened: Vec<NodeId>,
  pub(crate) unit: Option<String>,
}

impl AssetNode {
  pub(crate) fn new(path: PathBuf, kind: AssetKind) -> Self {
    Self {
      path,
      kind,
      state: LoadState::Unloaded,
      linked: BTreeMap::new(),
      related: Vec::new(),
      linked_aliases: BTreeSet::new(),
      opened: Vec::new(),
      unit: None,
    }
  }

  /// Absolute, normalised path identifying this node.
  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Directory containing the file.
  pub fn directory(&self) -> &Path {
    self.path.parent().unwrap_or_else(|| Path::new(""))
  }

  /// File name without extension.
  pub fn file_stem(&self) -> String {
    self
      .path
      .file_stem()
      .map(|stem| stem.to_string_lossy().into_owned())
      .unwrap_or_default()
  }

  /// File name including extension.
  pub fn file_name(&self) -> String {
    self
      .path
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_default()
  }

  /// Concrete variant of this node.
  pub fn kind(&self) -> &AssetKind {
    &self.kind
  }

  /// Current load state.
  pub fn state(&self) -> LoadState {
    self.state
  }

  /// Type tag of a structured-data node; `None` for binary assets.
  pub fn content_type(&self) -> Option<ContentType> {
    self.structured().map(|data| data.content_type)
  }

  /// Type-specific rule data of a structured-data node.
  pub fn rules(&self) -> Option<&TypeRules> {
    self.structured().map(|data| &data.rules)
  }

  /// Parsed tree of a loaded structured-data node.
  pub fn tree(&self) -> Option<&Value> {
    self.structured().and_then(|data| data.tree.as_ref())
  }

  /// Raw text of a structured-data node as read from disk.
  pub fn raw_text(&self) -> Option<&str> {
    self.structured().and_then(|data| data.text.as_deref())
  }

  /// Bytes of a loaded image or model node.
  pub fn payload(&self) -> Option<&[u8]> {
    match &self.kind {
      AssetKind::Image(payload) | AssetKind::Model(payload) => payload.bytes.as_deref(),
      AssetKind::StructuredData(_) => None,
    }
  }

  /// Outgoing links keyed by target path.
  pub fn linked(&self) -> &BTreeMap<PathBuf, NodeId> {
    &self.linked
  }

  /// Nodes that refer to this one, in discovery order.
  pub fn related(&self) -> &[NodeId] {
    &self.related
  }

  /// Registered content identifiers mentioned by this file.
  pub fn linked_aliases(&self) -> &BTreeSet<String> {
    &self.linked_aliases
  }

  /// Nodes opened on behalf of this one without being consumed dependencies
  /// (entity forms, a job's recipe list).
  pub fn opened(&self) -> &[NodeId] {
    &self.opened
  }

  /// Identifier of the content unit this node is the root of, if any.
  pub fn unit(&self) -> Option<&str> {
    self.unit.as_deref()
  }

  pub(crate) fn structured(&self) -> Option<&StructuredData> {
    match &self.kind {
      AssetKind::StructuredData(data) => Some(data),
      _ => None,
    }
  }

  pub(crate) fn structured_mut(&mut self) -> Option<&mut StructuredData> {
    match &mut self.kind {
      AssetKind::StructuredData(data) => Some(data),
      _ => None,
    }
  }

  pub(crate) fn add_related(&mut self, referrer: NodeId) {
    if !self.related.contains(&referrer) {
      self.related.push(referrer);
    }
  }
}
