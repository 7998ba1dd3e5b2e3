//! Content type tags and the per-type rules consulted during parse and clone.

use std::path::Path;

use serde_json::Value;

use crate::codec::select;
use crate::config::GraphConfig;
use crate::paths::{alias_identifier, file_expression_inner, has_file_expression};

/// Semantic type of a structured-data file, read from its top-level `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum ContentType {
  /// No `type` field, or one that is not recognised.
  #[default]
  None,
  /// Generic data file.
  Generic,
  /// Placeable or carryable entity.
  Entity,
  /// Status effect.
  Buff,
  /// AI behaviour pack.
  AiPack,
  /// Visual or audio effect.
  Effect,
  /// Crafting recipe.
  Recipe,
  /// Player command.
  Command,
  /// Animation description.
  Animation,
  /// Campaign encounter.
  Encounter,
  /// Job description.
  Job,
}

impl ContentType {
  const ALL: [ContentType; 11] = [
    ContentType::None,
    ContentType::Generic,
    ContentType::Entity,
    ContentType::Buff,
    ContentType::AiPack,
    ContentType::Effect,
    ContentType::Recipe,
    ContentType::Command,
    ContentType::Animation,
    ContentType::Encounter,
    ContentType::Job,
  ];

  /// Canonical lowercase tag, as written in a `type` field.
  pub fn tag(self) -> &'static str {
    match self {
      Self::None => "none",
      Self::Generic => "generic",
      Self::Entity => "entity",
      Self::Buff => "buff",
      Self::AiPack => "ai_pack",
      Self::Effect => "effect",
      Self::Recipe => "recipe",
      Self::Command => "command",
      Self::Animation => "animation",
      Self::Encounter => "encounter",
      Self::Job => "job",
    }
  }

  /// Match a raw tag case-insensitively, ignoring surrounding whitespace.
  pub fn from_tag(raw: &str) -> Self {
    let raw = raw.trim();
    Self::ALL
      .into_iter()
      .find(|candidate| candidate.tag().eq_ignore_ascii_case(raw))
      .unwrap_or_default()
  }

  /// Derive the type from a parsed document's top-level `type` field.
  pub fn of_document(tree: &Value) -> Self {
    tree
      .get("type")
      .and_then(Value::as_str)
      .map(Self::from_tag)
      .unwrap_or_default()
  }

  /// Suffix stripped from file names of this type when deriving clone names.
  pub fn name_suffix<'a>(self, config: &'a GraphConfig) -> Option<&'a str> {
    match self {
      Self::Recipe => Some(config.recipe_suffix.as_str()),
      Self::Job => Some(config.job_suffix.as_str()),
      _ => None,
    }
  }
}

impl std::fmt::Display for ContentType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.tag())
  }
}

/// Type-specific data pulled out of a document, carrying only what each rule needs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TypeRules {
  /// Entities may declare alternate ghost and iconic forms.
  Entity {
    /// Raw `ghost_form` value.
    ghost_form: Option<String>,
    /// Raw `iconic_form` value.
    iconic_form: Option<String>,
  },
  /// Crafting jobs point at a recipe list.
  Job {
    /// Raw `crafter.recipe_list` value.
    recipe_list: Option<String>,
  },
  /// Recipes carry a portrait and the items they produce.
  Recipe {
    /// Raw `portrait` value.
    portrait: Option<String>,
    /// Raw `item` values of the `produces` list.
    produces: Vec<String>,
  },
  /// No type-specific behaviour.
  #[default]
  Plain,
}

impl TypeRules {
  /// Extract the rule data for a document of the given type.
  pub fn extract(content_type: ContentType, tree: &Value, config: &GraphConfig) -> Self {
    let string_at = |value: Option<&Value>| value.and_then(Value::as_str).map(str::to_string);

    match content_type {
      ContentType::Entity => {
        let forms = tree
          .get("components")
          .and_then(|components| components.get(config.entity_forms_component.as_str()));
        match forms {
          Some(forms) => Self::Entity {
            ghost_form: string_at(forms.get("ghost_form")),
            iconic_form: string_at(forms.get("iconic_form")),
          },
          None => Self::Plain,
        }
      }
      ContentType::Job => match tree.get("crafter") {
        Some(crafter) => Self::Job {
          recipe_list: string_at(select(crafter, "recipe_list")),
        },
        None => Self::Plain,
      },
      ContentType::Recipe => Self::Recipe {
        portrait: string_at(tree.get("portrait")),
        produces: tree
          .get("produces")
          .and_then(Value::as_array)
          .map(|items| {
            items
              .iter()
              .filter_map(|item| string_at(item.get("item")))
              .collect()
          })
          .unwrap_or_default(),
      },
      _ => Self::Plain,
    }
  }

  /// Decide whether a dependency named `dependency_name` is cloned along with its referrer.
  ///
  /// Dependencies whose name contains `old_name` belong to the content being cloned; anything
  /// else is shared and gets relinked. A recipe also clones every item it produces.
  pub fn should_clone_dependency(&self, dependency_name: &str, old_name: &str) -> bool {
    if let Self::Recipe { produces, .. } = self {
      if produces
        .iter()
        .any(|item| produced_item_name(item) == dependency_name)
      {
        return true;
      }
    }
    dependency_name.contains(old_name)
  }
}

/// Reduce a `produces` entry to the bare item name used for matching file names.
///
/// `file(../apple_pie/apple_pie.json)` and `stonehearth:food:apple_pie` both become `apple_pie`.
fn produced_item_name(item: &str) -> &str {
  if has_file_expression(item) {
    let inner = file_expression_inner(item);
    return Path::new(inner)
      .file_stem()
      .and_then(|stem| stem.to_str())
      .unwrap_or(inner);
  }
  if alias_identifier(item).is_some() {
    return item.rsplit(':').next().unwrap_or(item);
  }
  item
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn matches_tags_case_insensitively() {
    assert_eq!(ContentType::from_tag("Recipe"), ContentType::Recipe);
    assert_eq!(ContentType::from_tag(" JOB "), ContentType::Job);
    assert_eq!(ContentType::from_tag("ai_pack"), ContentType::AiPack);
    assert_eq!(ContentType::from_tag("spaceship"), ContentType::None);
  }

  #[test]
  fn every_tag_round_trips() {
    for content_type in ContentType::ALL {
      assert_eq!(ContentType::from_tag(&content_type.tag().to_uppercase()), content_type);
    }
  }

  #[test]
  fn documents_without_string_type_are_none() {
    assert_eq!(ContentType::of_document(&json!({})), ContentType::None);
    assert_eq!(ContentType::of_document(&json!({"type": 5})), ContentType::None);
    assert_eq!(ContentType::of_document(&json!({"type": "entity"})), ContentType::Entity);
  }

  #[test]
  fn extracts_entity_forms() {
    let config = GraphConfig::default();
    let tree = json!({
      "type": "entity",
      "components": {
        "stonehearth:entity_forms": {
          "ghost_form": "file(pie_ghost.json)",
          "iconic_form": "file(pie_iconic.json)"
        }
      }
    });
    assert_eq!(
      TypeRules::extract(ContentType::Entity, &tree, &config),
      TypeRules::Entity {
        ghost_form: Some("file(pie_ghost.json)".into()),
        iconic_form: Some("file(pie_iconic.json)".into()),
      }
    );
  }

  #[test]
  fn jobs_without_crafter_are_plain() {
    let config = GraphConfig::default();
    let tree = json!({"type": "job"});
    assert_eq!(TypeRules::extract(ContentType::Job, &tree, &config), TypeRules::Plain);
  }

  #[test]
  fn recipes_clone_produced_items_even_without_name_match() {
    let config = GraphConfig::default();
    let tree = json!({
      "type": "recipe",
      "produces": [{"item": "file(../food/fruit_tart.json)"}, {"item": "stonehearth:food:crumbs"}]
    });
    let rules = TypeRules::extract(ContentType::Recipe, &tree, &config);
    assert!(rules.should_clone_dependency("fruit_tart", "apple_pie"));
    assert!(rules.should_clone_dependency("crumbs", "apple_pie"));
    assert!(rules.should_clone_dependency("apple_pie_iconic", "apple_pie"));
    assert!(!rules.should_clone_dependency("shared_icon", "apple_pie"));
  }

  #[test]
  fn name_suffixes_follow_configuration() {
    let config = GraphConfig::default();
    assert_eq!(ContentType::Recipe.name_suffix(&config), Some("_recipe"));
    assert_eq!(ContentType::Job.name_suffix(&config), Some("_description"));
    assert_eq!(ContentType::Entity.name_suffix(&config), None);
  }
}
