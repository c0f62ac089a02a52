//! Reflected attributes
//!
//! Turns declared fields and their validation rules into UML attributes.

use std::collections::HashSet;

use crate::adapters::{AssociationFacts, ClassFacts, FieldFacts, Validation, ValidationKind, ValidationOptions};
use crate::core::{Multiplicity, Visibility};

use super::AttributeModel;

/// Column names treated as timestamps
pub const TIMESTAMP_COLUMNS: [&str; 4] = ["created_at", "created_on", "updated_at", "updated_on"];

/// One column of a reflected class
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    name: String,
    attr_type: String,
    default: Option<String>,
    properties: Vec<String>,
    constraints: Vec<String>,
    primary_key: bool,
    foreign_key: bool,
    discriminator: bool,
    timestamp: bool,
}

impl Attribute {
    fn from_field(field: &FieldFacts, facts: &ClassFacts, foreign_keys: &HashSet<String>) -> Self {
        Self {
            name: field.name.clone(),
            attr_type: type_label(field),
            default: field.default.clone(),
            properties: Vec::new(),
            constraints: constraints(&field.validations),
            primary_key: facts.primary_key.as_deref() == Some(field.name.as_str()),
            foreign_key: foreign_keys.contains(&field.name),
            discriminator: facts.inheritance_column.as_deref() == Some(field.name.as_str()),
            timestamp: TIMESTAMP_COLUMNS.contains(&field.name.as_str()),
        }
    }
}

impl AttributeModel for Attribute {
    fn name(&self) -> &str {
        &self.name
    }

    fn attr_type(&self) -> Option<&str> {
        Some(&self.attr_type)
    }

    fn visibility(&self) -> Option<Visibility> {
        None
    }

    fn multiplicity(&self) -> Option<Multiplicity> {
        None
    }

    fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }

    fn properties(&self) -> &[String] {
        &self.properties
    }

    fn constraints(&self) -> &[String] {
        &self.constraints
    }

    fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    fn is_foreign_key(&self) -> bool {
        self.foreign_key
    }

    fn is_type(&self) -> bool {
        self.discriminator
    }

    fn is_timestamp(&self) -> bool {
        self.timestamp
    }

    fn is_derived(&self) -> bool {
        false
    }

    fn is_static(&self) -> bool {
        false
    }
}

/// Attributes of one class, in field declaration order
///
/// Abstract classes have no attributes.
pub fn build_attributes(
    facts: &ClassFacts,
    fields: &[FieldFacts],
    associations: &[AssociationFacts],
) -> Vec<Attribute> {
    if facts.is_abstract {
        return Vec::new();
    }
    let foreign_keys: HashSet<String> = associations
        .iter()
        .filter_map(AssociationFacts::foreign_key_name)
        .collect();
    fields
        .iter()
        .map(|field| Attribute::from_field(field, facts, &foreign_keys))
        .collect()
}

/// Base type plus `(limit)`, or `(precision,scale)` when no limit is declared
fn type_label(field: &FieldFacts) -> String {
    match (field.limit, field.precision, field.scale) {
        (Some(limit), _, _) => format!("{}({})", field.base_type, limit),
        (None, Some(precision), Some(scale)) => {
            format!("{}({},{})", field.base_type, precision, scale)
        }
        _ => field.base_type.clone(),
    }
}

fn constraints(validations: &[Validation]) -> Vec<String> {
    let mut constraints = Vec::new();
    if validations.iter().any(|v| v.kind == ValidationKind::Presence) {
        constraints.push("required".to_string());
    }
    if validations.iter().any(|v| v.kind == ValidationKind::Uniqueness) {
        constraints.push("unique".to_string());
    }
    if let Some(options) = merged_options(validations, ValidationKind::Numericality) {
        constraints.extend(numeric_constraints(&options));
    }
    if let Some(options) = merged_options(validations, ValidationKind::Length) {
        constraints.extend(length_constraint(&options));
    }
    constraints
}

/// Options of every rule of `kind`, later rules overriding earlier ones
fn merged_options(validations: &[Validation], kind: ValidationKind) -> Option<ValidationOptions> {
    validations
        .iter()
        .filter(|v| v.kind == kind)
        .map(|v| v.options.clone())
        .reduce(ValidationOptions::merge)
}

fn numeric_constraints(options: &ValidationOptions) -> Vec<String> {
    let mut tokens = Vec::new();
    let flags = [
        (options.only_integer, "integer"),
        (options.odd, "odd"),
        (options.even, "even"),
    ];
    for (flag, token) in flags {
        if flag == Some(true) {
            tokens.push(token.to_string());
        }
    }
    let comparisons = [
        (&options.greater_than, ">"),
        (&options.greater_than_or_equal_to, ">="),
        (&options.equal_to, "="),
        (&options.less_than, "<"),
        (&options.less_than_or_equal_to, "<="),
    ];
    for (operand, operator) in comparisons {
        if let Some(operand) = operand {
            tokens.push(format!("{} {}", operator, operand));
        }
    }
    tokens
}

fn length_constraint(options: &ValidationOptions) -> Option<String> {
    if let Some(exact) = &options.is {
        return Some(format!("length = {}", exact));
    }
    if let Some(within) = &options.within {
        return Some(format!("length in ({})", within));
    }
    match (&options.minimum, &options.maximum) {
        (Some(min), Some(max)) => Some(format!("{} <= length <= {}", min, max)),
        (Some(min), None) => Some(format!("length >= {}", min)),
        (None, Some(max)) => Some(format!("length <= {}", max)),
        (None, None) => None,
    }
}
