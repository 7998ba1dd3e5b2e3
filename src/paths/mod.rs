//! Helpers for resolving path expressions embedded in structured data files.
//!
//! Resolution (turning `file(...)` into a normalised absolute path) and pattern matching
//! (finding expressions and content identifiers inside string values) live in separate
//! submodules so each can be tested on its own.

mod patterns;
mod resolve;

pub use patterns::{
    alias_identifier, file_expressions, has_file_expression, rewrite_file_expressions,
};
pub use resolve::{PathResolver, file_expression_inner, normalize_path, relative_path};
