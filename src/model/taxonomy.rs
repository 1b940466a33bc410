// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Calliope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Calliope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Category taxonomy: a normalized tree driving level-by-level selection.
//!
//! The on-disk configuration is shape-polymorphic: sibling lists may mix bare leaf strings with
//! single-key mappings, and mappings may nest their children under a `types` key. Normalization
//! happens once at load so traversal only ever sees [`CategoryNode`].

use std::fmt;
use std::io;
use std::path::PathBuf;

use serde::Deserialize;
use serde_yaml::Value;

/// Key under which a mapping nests its child entries.
const TYPES_KEY: &str = "types";

/// Top-level key holding the taxonomy in a configuration document.
const CATEGORIES_KEY: &str = "categories";

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: io::Error },
    Yaml { source: serde_yaml::Error },
    MissingCategories,
    EmptyCategories,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::Yaml { source } => write!(f, "cannot parse configuration: {source}"),
            Self::MissingCategories => {
                write!(f, "invalid configuration: '{CATEGORIES_KEY}' key not found")
            }
            Self::EmptyCategories => {
                write!(f, "invalid configuration: '{CATEGORIES_KEY}' has no entries")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Yaml { source } => Some(source),
            Self::MissingCategories | Self::EmptyCategories => None,
        }
    }
}

/// One node of the normalized taxonomy tree.
///
/// Invariant: a `Node` always has at least one child; normalization turns child-less entries
/// into `Leaf`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryNode {
    Leaf(String),
    Node { label: String, children: Vec<CategoryNode> },
}

impl CategoryNode {
    pub fn label(&self) -> &str {
        match self {
            Self::Leaf(label) => label,
            Self::Node { label, .. } => label,
        }
    }

    pub fn children(&self) -> &[CategoryNode] {
        match self {
            Self::Leaf(_) => &[],
            Self::Node { children, .. } => children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }
}

/// What a selection path resolves to at its current depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelView {
    /// The path terminates at a leaf; the selection is complete.
    Leaf,
    /// Child labels to present for the next level. An empty list means the path stalled on an
    /// unresolvable element; callers treat that as leaf-equivalent.
    Children(Vec<String>),
}

impl LevelView {
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Leaf => true,
            Self::Children(labels) => labels.is_empty(),
        }
    }
}

/// Shape of a configuration document; only the `categories` key matters.
#[derive(Debug, Deserialize)]
struct RawConfig {
    categories: Option<Value>,
}

/// The normalized category tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Taxonomy {
    roots: Vec<CategoryNode>,
}

impl Taxonomy {
    /// Builds a taxonomy from a parsed configuration document.
    ///
    /// The document must be a mapping with a `categories` key; everything underneath is
    /// normalized into [`CategoryNode`]s.
    pub fn build(doc: &Value) -> Result<Self, ConfigError> {
        let categories = doc.get(CATEGORIES_KEY).ok_or(ConfigError::MissingCategories)?;
        Self::from_categories(categories)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: RawConfig =
            serde_yaml::from_str(raw).map_err(|source| ConfigError::Yaml { source })?;
        let categories = config.categories.ok_or(ConfigError::MissingCategories)?;
        Self::from_categories(&categories)
    }

    fn from_categories(categories: &Value) -> Result<Self, ConfigError> {
        let roots = normalize_children(categories);
        if roots.is_empty() {
            return Err(ConfigError::EmptyCategories);
        }
        Ok(Self { roots })
    }

    pub fn roots(&self) -> &[CategoryNode] {
        &self.roots
    }

    /// Resolves a selection path and reports what to show next.
    ///
    /// An empty path yields the root labels. A path element that cannot be resolved yields
    /// `Children([])` rather than an error; a malformed configuration must never wedge the
    /// session.
    pub fn children_of<S: AsRef<str>>(&self, path: &[S]) -> LevelView {
        let mut current: Option<&CategoryNode> = None;
        let mut siblings: &[CategoryNode] = &self.roots;

        for label in path {
            let label = label.as_ref();
            match siblings.iter().find(|node| node.label() == label) {
                Some(node) => {
                    siblings = node.children();
                    current = Some(node);
                }
                None => return LevelView::Children(Vec::new()),
            }
        }

        match current {
            Some(node) if node.is_leaf() => LevelView::Leaf,
            Some(node) => {
                LevelView::Children(node.children().iter().map(|c| c.label().to_owned()).collect())
            }
            None => LevelView::Children(self.roots.iter().map(|c| c.label().to_owned()).collect()),
        }
    }
}

fn normalize_children(value: &Value) -> Vec<CategoryNode> {
    match value {
        Value::Mapping(mapping) => {
            if let Some(types) = value.get(TYPES_KEY) {
                return normalize_children(types);
            }
            mapping
                .iter()
                .filter_map(|(key, child)| {
                    scalar_label(key).map(|label| node_from(label, child))
                })
                .collect()
        }
        Value::Sequence(items) => items.iter().filter_map(normalize_list_item).collect(),
        _ => Vec::new(),
    }
}

fn normalize_list_item(item: &Value) -> Option<CategoryNode> {
    match item {
        Value::Mapping(mapping) => {
            let (key, value) =
                mapping.iter().find(|(key, _)| scalar_label(key).as_deref() != Some(TYPES_KEY))?;
            let label = scalar_label(key)?;

            // A sibling `types` key may carry the children when the label's own value does not.
            let children_src = if value.get(TYPES_KEY).is_some() {
                value
            } else {
                item.get(TYPES_KEY).unwrap_or(value)
            };
            Some(node_from(label, children_src))
        }
        other => scalar_label(other).map(CategoryNode::Leaf),
    }
}

fn node_from(label: String, value: &Value) -> CategoryNode {
    let children = normalize_children(value);
    if children.is_empty() {
        CategoryNode::Leaf(label)
    } else {
        CategoryNode::Node { label, children }
    }
}

fn scalar_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{CategoryNode, ConfigError, LevelView, Taxonomy};

    fn labels(view: &LevelView) -> Vec<String> {
        match view {
            LevelView::Children(labels) => labels.clone(),
            LevelView::Leaf => panic!("expected children, got leaf"),
        }
    }

    #[test]
    fn builds_minimal_taxonomy() {
        let taxonomy = Taxonomy::from_yaml_str("categories:\n  A:\n    types: [B, C]\n")
            .expect("build taxonomy");
        assert_eq!(labels(&taxonomy.children_of::<&str>(&[])), vec!["A"]);
        assert_eq!(labels(&taxonomy.children_of(&["A"])), vec!["B", "C"]);
        assert_eq!(taxonomy.children_of(&["A", "B"]), LevelView::Leaf);
    }

    #[test]
    fn missing_categories_key_is_rejected() {
        let err = Taxonomy::from_yaml_str("labels:\n  A: [B]\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingCategories));
    }

    #[test]
    fn non_mapping_document_is_rejected() {
        let err = Taxonomy::from_yaml_str("- just\n- a\n- list\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn build_works_on_a_parsed_document() {
        let doc: serde_yaml::Value =
            serde_yaml::from_str("categories:\n  A: [B]\n").expect("parse yaml");
        let taxonomy = Taxonomy::build(&doc).expect("build taxonomy");
        assert_eq!(labels(&taxonomy.children_of(&["A"])), vec!["B"]);

        let doc: serde_yaml::Value = serde_yaml::from_str("other: 1\n").expect("parse yaml");
        assert!(matches!(Taxonomy::build(&doc).unwrap_err(), ConfigError::MissingCategories));
    }

    #[test]
    fn empty_categories_are_rejected() {
        let err = Taxonomy::from_yaml_str("categories: {}\n").unwrap_err();
        assert!(matches!(err, ConfigError::EmptyCategories));
    }

    #[test]
    fn invalid_yaml_is_rejected() {
        let err = Taxonomy::from_yaml_str(": : :").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn sibling_list_mixes_leaves_and_nested_mappings() {
        let raw = "categories:\n  Tone:\n    types:\n      - Neutral\n      - Charged:\n          types: [Positive, Negative]\n";
        let taxonomy = Taxonomy::from_yaml_str(raw).expect("build taxonomy");

        assert_eq!(labels(&taxonomy.children_of(&["Tone"])), vec!["Neutral", "Charged"]);
        assert_eq!(taxonomy.children_of(&["Tone", "Neutral"]), LevelView::Leaf);
        assert_eq!(
            labels(&taxonomy.children_of(&["Tone", "Charged"])),
            vec!["Positive", "Negative"]
        );
        assert_eq!(taxonomy.children_of(&["Tone", "Charged", "Positive"]), LevelView::Leaf);
    }

    #[test]
    fn sibling_types_key_carries_children() {
        // The label's own value is null; a `types` key next to it holds the children.
        let raw = "categories:\n  Topic:\n    types:\n      - Sport:\n        types: [Football, Tennis]\n";
        let taxonomy = Taxonomy::from_yaml_str(raw).expect("build taxonomy");

        assert_eq!(labels(&taxonomy.children_of(&["Topic"])), vec!["Sport"]);
        assert_eq!(
            labels(&taxonomy.children_of(&["Topic", "Sport"])),
            vec!["Football", "Tennis"]
        );
    }

    #[test]
    fn mapping_without_types_exposes_keys_as_children() {
        let raw = "categories:\n  A:\n    B: [C]\n    D: [E]\n";
        let taxonomy = Taxonomy::from_yaml_str(raw).expect("build taxonomy");

        assert_eq!(labels(&taxonomy.children_of(&["A"])), vec!["B", "D"]);
        assert_eq!(labels(&taxonomy.children_of(&["A", "B"])), vec!["C"]);
        assert_eq!(taxonomy.children_of(&["A", "B", "C"]), LevelView::Leaf);
    }

    #[test]
    fn scalar_valued_entries_are_leaves() {
        let raw = "categories:\n  A: ~\n  B: note\n";
        let taxonomy = Taxonomy::from_yaml_str(raw).expect("build taxonomy");

        assert_eq!(taxonomy.children_of(&["A"]), LevelView::Leaf);
        assert_eq!(taxonomy.children_of(&["B"]), LevelView::Leaf);
    }

    #[test]
    fn unresolvable_path_yields_empty_children() {
        let taxonomy = Taxonomy::from_yaml_str("categories:\n  A:\n    types: [B]\n")
            .expect("build taxonomy");

        let view = taxonomy.children_of(&["Nope"]);
        assert_eq!(view, LevelView::Children(Vec::new()));
        assert!(view.is_terminal());

        // Walking past a leaf stalls the same way.
        let view = taxonomy.children_of(&["A", "B", "deeper"]);
        assert_eq!(view, LevelView::Children(Vec::new()));
    }

    #[test]
    fn four_level_nesting_resolves() {
        let raw = "categories:\n  L1:\n    types:\n      - L2:\n          types:\n            - L3:\n                types: [L4]\n";
        let taxonomy = Taxonomy::from_yaml_str(raw).expect("build taxonomy");

        assert_eq!(labels(&taxonomy.children_of(&["L1", "L2"])), vec!["L3"]);
        assert_eq!(labels(&taxonomy.children_of(&["L1", "L2", "L3"])), vec!["L4"]);
        assert_eq!(taxonomy.children_of(&["L1", "L2", "L3", "L4"]), LevelView::Leaf);
    }

    #[test]
    fn normalized_nodes_are_leaf_or_nonempty() {
        fn check(node: &CategoryNode) {
            if !node.is_leaf() {
                assert!(!node.children().is_empty(), "node {:?} has no children", node.label());
                node.children().iter().for_each(check);
            }
        }

        let raw = "categories:\n  A:\n    types: []\n  B:\n    types: [C]\n";
        let taxonomy = Taxonomy::from_yaml_str(raw).expect("build taxonomy");
        taxonomy.roots().iter().for_each(check);

        // `A` had an empty types list and must have normalized to a leaf.
        assert_eq!(taxonomy.children_of(&["A"]), LevelView::Leaf);
    }
}
