#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod alias;
pub mod clone;
pub mod codec;
pub mod config;
pub mod content_type;
pub mod error;
pub mod graph;
pub mod node;
pub mod paths;
pub mod tree;

pub use alias::{AliasIndex, ContentUnit};
pub use clone::{CloneReport, CloneSession, ClonedFile, ClonedPayload, PatchedFile};
pub use config::GraphConfig;
pub use content_type::{ContentType, TypeRules};
pub use error::{GraphError, GraphResult, GraphWarning};
pub use graph::DependencyGraph;
pub use node::{AssetKind, AssetNode, LoadState, NodeId};
pub use tree::{TreeEntry, dependency_tree};
