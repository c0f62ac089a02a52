//! Reflection adapters
//!
//! An adapter supplies the raw reflection facts of one object-relational
//! ecosystem: which classes exist, their fields and validation rules, and the
//! associations they declare. The model builder consumes nothing else.

mod registry;
mod snapshot;

pub use registry::{AdapterFactory, AdapterRegistry};
pub use snapshot::{ActiveRecordDetector, ClassSnapshot, Snapshot, SnapshotAdapter};

use inflector::cases::classcase::to_class_case;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::{AssociationKind, Dependent, ModelResult};

/// Facts about one model class
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassFacts {
    pub name: String,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    /// The class is backed by a table (or collection)
    #[serde(default)]
    pub has_storage: bool,
    /// Direct superclass; `None` when the class extends the ecosystem base
    #[serde(default)]
    pub superclass: Option<String>,
    /// Identity column
    #[serde(default)]
    pub primary_key: Option<String>,
    /// Single-table-inheritance discriminator column
    #[serde(default)]
    pub inheritance_column: Option<String>,
}

impl ClassFacts {
    /// Abstract classes and classes with storage appear in diagrams
    pub fn is_includable(&self) -> bool {
        self.is_abstract || self.has_storage
    }
}

/// Facts about one declared field (column)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldFacts {
    pub name: String,
    #[serde(rename = "type")]
    pub base_type: String,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub precision: Option<u32>,
    #[serde(default)]
    pub scale: Option<u32>,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub validations: Vec<Validation>,
}

/// Kind of a declarative validation rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationKind {
    Presence,
    Uniqueness,
    Numericality,
    Length,
    #[serde(other)]
    Other,
}

/// A declarative validation rule `{kind, options}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    pub kind: ValidationKind,
    #[serde(default)]
    pub options: ValidationOptions,
}

impl Validation {
    pub fn new(kind: ValidationKind) -> Self {
        Self {
            kind,
            options: ValidationOptions::default(),
        }
    }

    pub fn with_options(kind: ValidationKind, options: ValidationOptions) -> Self {
        Self { kind, options }
    }
}

/// Options of numericality and length rules
///
/// Unrecognized option keys are ignored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    pub only_integer: Option<bool>,
    pub odd: Option<bool>,
    pub even: Option<bool>,
    pub greater_than: Option<Operand>,
    pub greater_than_or_equal_to: Option<Operand>,
    pub equal_to: Option<Operand>,
    pub less_than: Option<Operand>,
    pub less_than_or_equal_to: Option<Operand>,
    pub is: Option<Operand>,
    #[serde(rename = "in", alias = "within")]
    pub within: Option<Within>,
    pub minimum: Option<Operand>,
    pub maximum: Option<Operand>,
}

impl ValidationOptions {
    /// Merge `other` over `self`; options set in `other` win
    pub fn merge(self, other: ValidationOptions) -> ValidationOptions {
        ValidationOptions {
            only_integer: other.only_integer.or(self.only_integer),
            odd: other.odd.or(self.odd),
            even: other.even.or(self.even),
            greater_than: other.greater_than.or(self.greater_than),
            greater_than_or_equal_to: other
                .greater_than_or_equal_to
                .or(self.greater_than_or_equal_to),
            equal_to: other.equal_to.or(self.equal_to),
            less_than: other.less_than.or(self.less_than),
            less_than_or_equal_to: other.less_than_or_equal_to.or(self.less_than_or_equal_to),
            is: other.is.or(self.is),
            within: other.within.or(self.within),
            minimum: other.minimum.or(self.minimum),
            maximum: other.maximum.or(self.maximum),
        }
    }
}

/// Operand of a comparison option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Integer(n) => write!(f, "{}", n),
            Operand::Float(n) => write!(f, "{}", n),
            Operand::Text(s) => f.write_str(s),
        }
    }
}

/// Value set of an `in` length option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Within {
    Range { min: Operand, max: Operand },
    Set(Vec<Operand>),
}

impl fmt::Display for Within {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Within::Range { min, max } => write!(f, "{}..{}", min, max),
            Within::Set(values) => {
                let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                f.write_str(&values.join(", "))
            }
        }
    }
}

/// Facts about one declared association
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationFacts {
    pub kind: AssociationKind,
    pub name: String,
    /// Target class name; optional for polymorphic belongs-to associations
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub foreign_key: Option<String>,
    #[serde(default)]
    pub options: AssociationOptions,
}

impl AssociationFacts {
    pub fn new(kind: AssociationKind, name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            target: Some(target.into()),
            foreign_key: None,
            options: AssociationOptions::default(),
        }
    }

    pub fn with_foreign_key(mut self, foreign_key: impl Into<String>) -> Self {
        self.foreign_key = Some(foreign_key.into());
        self
    }

    pub fn with_options(mut self, options: AssociationOptions) -> Self {
        self.options = options;
        self
    }

    /// Name of the polymorphic interface this belongs-to association points at
    pub fn polymorphic_interface(&self) -> Option<String> {
        (self.kind == AssociationKind::BelongsTo && self.options.polymorphic)
            .then(|| classify(&self.name))
    }

    /// Name of the interface a polymorphic has-one/has-many association realizes
    pub fn realized_interface(&self) -> Option<String> {
        if self.kind.is_owning() {
            self.options.as_.as_deref().map(classify)
        } else {
            None
        }
    }

    /// Column holding the key, defaulting to `<name>_id` for belongs-to
    pub fn foreign_key_name(&self) -> Option<String> {
        match (&self.foreign_key, self.kind) {
            (Some(key), _) => Some(key.clone()),
            (None, AssociationKind::BelongsTo) => Some(format!("{}_id", self.name)),
            (None, _) => None,
        }
    }

    /// Class name at the far end of this association
    pub fn target_name(&self, owner: &str) -> ModelResult<String> {
        if let Some(interface) = self.polymorphic_interface() {
            return Ok(interface);
        }
        self.target.clone().ok_or_else(|| {
            crate::core::ModelError::missing_fact(owner, format!("target of association '{}'", self.name))
        })
    }
}

/// Options map of an association
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssociationOptions {
    pub polymorphic: bool,
    #[serde(rename = "as")]
    pub as_: Option<String>,
    pub through: Option<String>,
    pub autosave: bool,
    pub dependent: Option<Dependent>,
}

/// Capability discovery for ecosystem auto-detection
///
/// Carries the library names loaded by the inspected application. Detectors
/// look only at this value, never at ambient process state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    libraries: Vec<String>,
}

impl Environment {
    pub fn new<I, S>(libraries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            libraries: libraries.into_iter().map(Into::into).collect(),
        }
    }

    pub fn libraries(&self) -> &[String] {
        &self.libraries
    }

    /// Case-insensitive, ignoring `_` and `-`
    pub fn has_library(&self, name: &str) -> bool {
        let wanted = normalize_library(name);
        self.libraries.iter().any(|l| normalize_library(l) == wanted)
    }
}

fn normalize_library(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Source of reflection facts for one application snapshot
pub trait ReflectionAdapter {
    /// Ecosystem this adapter reflects, e.g. `active_record`
    fn ecosystem(&self) -> &str;

    /// Name of the inspected application
    fn application_name(&self) -> ModelResult<String>;

    /// Every model class name, in declaration order
    fn class_names(&self) -> Vec<String>;

    /// Class-level facts for `class`
    fn class_facts(&self, class: &str) -> ModelResult<ClassFacts>;

    /// Declared fields of `class`
    fn fields(&self, class: &str) -> ModelResult<Vec<FieldFacts>>;

    /// Associations declared directly on `class`
    fn associations(&self, class: &str) -> ModelResult<Vec<AssociationFacts>>;
}

/// Converts an association-style name into a class name (`line_items` → `LineItem`)
///
/// The last word is singularized, so table-style plurals name their class.
pub fn classify(name: &str) -> String {
    to_class_case(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify("commentable"), "Commentable");
        assert_eq!(classify("line_item"), "LineItem");
        assert_eq!(classify("line_items"), "LineItem");
        assert_eq!(classify("memberships"), "Membership");
    }

    #[test]
    fn test_environment_library_matching() {
        let env = Environment::new(["ActiveRecord", "rack"]);
        assert!(env.has_library("active_record"));
        assert!(env.has_library("activerecord"));
        assert!(!env.has_library("mongoid"));
    }

    #[test]
    fn test_validation_options_merge() {
        let first = ValidationOptions {
            greater_than: Some(Operand::Integer(1)),
            less_than: Some(Operand::Integer(10)),
            ..Default::default()
        };
        let second = ValidationOptions {
            less_than: Some(Operand::Integer(5)),
            ..Default::default()
        };
        let merged = first.merge(second);
        assert_eq!(merged.greater_than, Some(Operand::Integer(1)));
        assert_eq!(merged.less_than, Some(Operand::Integer(5)));
    }

    #[test]
    fn test_validation_deserialize() {
        let rule: Validation = serde_json::from_str(
            r#"{"kind": "length", "options": {"in": {"min": 2, "max": 8}, "allow_nil": true}}"#,
        )
        .unwrap();
        assert_eq!(rule.kind, ValidationKind::Length);
        assert_eq!(rule.options.within.unwrap().to_string(), "2..8");

        let rule: Validation = serde_json::from_str(r#"{"kind": "format"}"#).unwrap();
        assert_eq!(rule.kind, ValidationKind::Other);
    }

    #[test]
    fn test_polymorphic_target_name() {
        let assoc = AssociationFacts {
            kind: AssociationKind::BelongsTo,
            name: "commentable".to_string(),
            target: None,
            foreign_key: Some("commentable_id".to_string()),
            options: AssociationOptions {
                polymorphic: true,
                ..Default::default()
            },
        };
        assert_eq!(assoc.polymorphic_interface(), Some("Commentable".to_string()));
        assert_eq!(assoc.target_name("Comment").unwrap(), "Commentable");
    }

    #[test]
    fn test_foreign_key_name() {
        let assoc = AssociationFacts::new(AssociationKind::BelongsTo, "author", "Author");
        assert_eq!(assoc.foreign_key_name().as_deref(), Some("author_id"));
        let assoc = assoc.with_foreign_key("writer_id");
        assert_eq!(assoc.foreign_key_name().as_deref(), Some("writer_id"));
        let assoc = AssociationFacts::new(AssociationKind::HasMany, "books", "Book");
        assert_eq!(assoc.foreign_key_name(), None);
    }

    #[test]
    fn test_missing_target_is_binding_error() {
        let mut assoc = AssociationFacts::new(AssociationKind::HasMany, "books", "Book");
        assoc.target = None;
        let err = assoc.target_name("Author").unwrap_err();
        assert!(err.is_binding_error());
        assert!(err.to_string().contains("Author"));
    }
}
