//! Core type definitions for class models
//!
//! UML link types, multiplicities, member visibility, association kinds and
//! the attribute kinds used for diagram filtering.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// UML type of a link between two classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    /// Plain association
    #[default]
    Association,
    /// Whole/part where the part outlives the whole
    Aggregation,
    /// Whole/part where the part dies with the whole
    Composition,
    /// Superclass to subclass
    Generalization,
    /// Class implementing a polymorphic interface
    Realization,
}

impl LinkType {
    /// Returns true for links that never carry a name or multiplicity
    pub fn is_structural(&self) -> bool {
        matches!(self, LinkType::Generalization | LinkType::Realization)
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkType::Association => write!(f, "association"),
            LinkType::Aggregation => write!(f, "aggregation"),
            LinkType::Composition => write!(f, "composition"),
            LinkType::Generalization => write!(f, "generalization"),
            LinkType::Realization => write!(f, "realization"),
        }
    }
}

/// Cardinality range of one relationship end
///
/// `max` is `None` when the end is unbounded ("many").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Multiplicity {
    pub min: u32,
    pub max: Option<u32>,
}

impl Multiplicity {
    /// Exactly one
    pub const ONE: Multiplicity = Multiplicity::new(1, Some(1));
    /// Zero or one
    pub const OPTIONAL: Multiplicity = Multiplicity::new(0, Some(1));
    /// Zero or more
    pub const MANY: Multiplicity = Multiplicity::new(0, None);

    pub const fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    pub fn is_unbounded(&self) -> bool {
        self.max.is_none()
    }
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{}", max),
            Some(max) => write!(f, "{}..{}", self.min, max),
            None => write!(f, "{}..*", self.min),
        }
    }
}

/// Visibility modifier for class members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,    // +
    Private,   // -
    Protected, // #
    Package,   // ~
}

impl Visibility {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Visibility::Public),
            '-' => Some(Visibility::Private),
            '#' => Some(Visibility::Protected),
            '~' => Some(Visibility::Package),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Visibility::Public => '+',
            Visibility::Private => '-',
            Visibility::Protected => '#',
            Visibility::Package => '~',
        }
    }
}

/// Kind of a declared association
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    BelongsTo,
    HasOne,
    HasMany,
    #[serde(alias = "many_to_many")]
    HasAndBelongsToMany,
}

impl AssociationKind {
    /// Sort precedence inside a relationship; lower sorts first
    pub fn precedence(&self) -> u8 {
        match self {
            AssociationKind::HasAndBelongsToMany => 0,
            AssociationKind::HasMany => 1,
            AssociationKind::HasOne => 2,
            AssociationKind::BelongsTo => 3,
        }
    }

    /// has_one and has_many own the related objects
    pub fn is_owning(&self) -> bool {
        matches!(self, AssociationKind::HasOne | AssociationKind::HasMany)
    }
}

impl fmt::Display for AssociationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssociationKind::BelongsTo => write!(f, "belongs_to"),
            AssociationKind::HasOne => write!(f, "has_one"),
            AssociationKind::HasMany => write!(f, "has_many"),
            AssociationKind::HasAndBelongsToMany => write!(f, "has_and_belongs_to_many"),
        }
    }
}

/// What happens to related objects when the owner is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dependent {
    Destroy,
    Delete,
    DeleteAll,
    Nullify,
    Restrict,
    #[serde(other)]
    Other,
}

impl Dependent {
    /// Deleting the owner deletes the related objects
    pub fn cascades(&self) -> bool {
        matches!(self, Dependent::Destroy | Dependent::Delete | Dependent::DeleteAll)
    }
}

/// Attribute kinds recognized by the diagram attribute filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    Content,
    PrimaryKey,
    Type,
    ForeignKey,
    Timestamp,
}

impl AttributeKind {
    /// Every kind, in filter order
    pub const ALL: [AttributeKind; 5] = [
        AttributeKind::Content,
        AttributeKind::PrimaryKey,
        AttributeKind::Type,
        AttributeKind::ForeignKey,
        AttributeKind::Timestamp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeKind::Content => "content",
            AttributeKind::PrimaryKey => "primary_key",
            AttributeKind::Type => "type",
            AttributeKind::ForeignKey => "foreign_key",
            AttributeKind::Timestamp => "timestamp",
        }
    }
}

impl FromStr for AttributeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "content" => Ok(AttributeKind::Content),
            "primary_key" | "pk" => Ok(AttributeKind::PrimaryKey),
            "type" => Ok(AttributeKind::Type),
            "foreign_key" | "fk" => Ok(AttributeKind::ForeignKey),
            "timestamp" => Ok(AttributeKind::Timestamp),
            _ => Err(format!("Unknown attribute kind: {}", s)),
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplicity_display() {
        assert_eq!(Multiplicity::ONE.to_string(), "1");
        assert_eq!(Multiplicity::OPTIONAL.to_string(), "0..1");
        assert_eq!(Multiplicity::MANY.to_string(), "0..*");
        assert_eq!(Multiplicity::new(2, Some(5)).to_string(), "2..5");
        assert!(Multiplicity::MANY.is_unbounded());
        assert!(!Multiplicity::ONE.is_unbounded());
    }

    #[test]
    fn test_link_type_display() {
        assert_eq!(LinkType::Association.to_string(), "association");
        assert_eq!(LinkType::Aggregation.to_string(), "aggregation");
        assert_eq!(LinkType::Composition.to_string(), "composition");
        assert_eq!(LinkType::Generalization.to_string(), "generalization");
        assert_eq!(LinkType::Realization.to_string(), "realization");
        assert_eq!(LinkType::default(), LinkType::Association);
    }

    #[test]
    fn test_link_type_structural() {
        assert!(LinkType::Generalization.is_structural());
        assert!(LinkType::Realization.is_structural());
        assert!(!LinkType::Composition.is_structural());
    }

    #[test]
    fn test_association_precedence() {
        let mut kinds = vec![
            AssociationKind::BelongsTo,
            AssociationKind::HasOne,
            AssociationKind::HasAndBelongsToMany,
            AssociationKind::HasMany,
        ];
        kinds.sort_by_key(|k| k.precedence());
        assert_eq!(
            kinds,
            vec![
                AssociationKind::HasAndBelongsToMany,
                AssociationKind::HasMany,
                AssociationKind::HasOne,
                AssociationKind::BelongsTo,
            ]
        );
    }

    #[test]
    fn test_association_kind_serde() {
        let kind: AssociationKind = serde_json::from_str("\"has_many\"").unwrap();
        assert_eq!(kind, AssociationKind::HasMany);
        let kind: AssociationKind = serde_json::from_str("\"many_to_many\"").unwrap();
        assert_eq!(kind, AssociationKind::HasAndBelongsToMany);
    }

    #[test]
    fn test_dependent_cascades() {
        assert!(Dependent::Destroy.cascades());
        assert!(Dependent::Delete.cascades());
        assert!(Dependent::DeleteAll.cascades());
        assert!(!Dependent::Nullify.cascades());
        let other: Dependent = serde_json::from_str("\"restrict_with_error\"").unwrap();
        assert_eq!(other, Dependent::Other);
    }

    #[test]
    fn test_visibility_conversion() {
        assert_eq!(Visibility::from_char('+'), Some(Visibility::Public));
        assert_eq!(Visibility::from_char('#'), Some(Visibility::Protected));
        assert_eq!(Visibility::from_char('x'), None);
        assert_eq!(Visibility::Package.to_char(), '~');
    }

    #[test]
    fn test_attribute_kind_parsing() {
        assert_eq!("primary_key".parse::<AttributeKind>(), Ok(AttributeKind::PrimaryKey));
        assert_eq!("foreign-key".parse::<AttributeKind>(), Ok(AttributeKind::ForeignKey));
        assert_eq!("PK".parse::<AttributeKind>(), Ok(AttributeKind::PrimaryKey));
        assert!("column".parse::<AttributeKind>().is_err());
        assert_eq!(AttributeKind::Timestamp.to_string(), "timestamp");
    }
}
