//! Structured-data text codec: parse to an order-preserving tree and write it back indented.

use std::path::Path;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::{Map, Value};

use crate::error::{GraphError, GraphResult};

/// Parse structured-data text, keeping object keys in their authored order.
pub fn parse_tree(path: &Path, text: &str) -> GraphResult<Value> {
  serde_json::from_str(text).map_err(|source| GraphError::Parse {
    path: path.to_path_buf(),
    source,
  })
}

/// Serialise a tree using `indent` spaces per nesting level.
pub fn to_indented_string(value: &Value, indent: usize) -> serde_json::Result<String> {
  let indent_bytes = vec![b' '; indent];
  let mut buffer = Vec::new();
  let mut serializer =
    Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(&indent_bytes));
  value.serialize(&mut serializer)?;
  Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Navigate a dotted path such as `components.stonehearth:entity_forms`.
pub fn select<'a>(value: &'a Value, dotted: &str) -> Option<&'a Value> {
  dotted
    .split('.')
    .filter(|segment| !segment.is_empty())
    .try_fold(value, |current, segment| current.get(segment))
}

/// Visit every object key and string leaf in document order.
pub fn visit_strings(value: &Value, visit: &mut impl FnMut(&str)) {
  match value {
    Value::String(text) => visit(text),
    Value::Array(items) => {
      for item in items {
        visit_strings(item, visit);
      }
    }
    Value::Object(map) => {
      for (key, item) in map {
        visit(key);
        visit_strings(item, visit);
      }
    }
    _ => {}
  }
}

/// Rebuild a tree with every object key and string leaf passed through `rewrite`.
///
/// Key order is preserved; keys that collide after rewriting keep the later value.
pub fn map_strings(value: &Value, rewrite: &mut impl FnMut(&str) -> String) -> Value {
  match value {
    Value::String(text) => Value::String(rewrite(text)),
    Value::Array(items) => Value::Array(
      items
        .iter()
        .map(|item| map_strings(item, rewrite))
        .collect(),
    ),
    Value::Object(map) => {
      let mut rebuilt = Map::new();
      for (key, item) in map {
        let key = rewrite(key);
        let item = map_strings(item, rewrite);
        rebuilt.insert(key, item);
      }
      Value::Object(rebuilt)
    }
    other => other.clone(),
  }
}
