//! Run configuration
//!
//! `DiagramOptions` mirrors the option tree of a run: which ecosystem to
//! reflect, which exporter to use, where to write, and which attributes to
//! show. Every field has a default, so a config file only needs the keys it
//! changes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::{AttributeKind, ModelError, ModelResult};
use crate::model::AttributeModel;

/// Full option tree of one run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramOptions {
    pub messages: Messages,
    pub model: ModelOptions,
    pub diagram: DiagramSection,
}

impl DiagramOptions {
    /// Load options from a JSON config file
    pub fn from_file(path: &Path) -> ModelResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(input: &str) -> ModelResult<Self> {
        Ok(serde_json::from_str(input)?)
    }
}

/// Progress message verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Messages {
    Quiet,
    #[default]
    Verbose,
}

/// Reflection options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelOptions {
    /// Ecosystem name, or `auto` to detect it
    #[serde(rename = "type")]
    pub model_type: String,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            model_type: "auto".to_string(),
        }
    }
}

/// Exporter selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagramType {
    /// DOT source, optionally rendered by the `dot` binary
    #[default]
    Graphviz,
    /// Plain-text enumeration of classes and relationships
    Debug,
    /// Box-drawn class boxes
    Ascii,
}

impl DiagramType {
    pub fn variants() -> &'static [&'static str] {
        &["graphviz", "debug", "ascii"]
    }
}

impl FromStr for DiagramType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "graphviz" | "dot" => Ok(DiagramType::Graphviz),
            "debug" | "text" => Ok(DiagramType::Debug),
            "ascii" => Ok(DiagramType::Ascii),
            _ => Err(ModelError::UnknownDiagramType {
                diagram_type: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for DiagramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagramType::Graphviz => write!(f, "graphviz"),
            DiagramType::Debug => write!(f, "debug"),
            DiagramType::Ascii => write!(f, "ascii"),
        }
    }
}

/// Diagram output options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramSection {
    #[serde(rename = "type")]
    pub diagram_type: DiagramType,
    /// Output file base name, without extension
    pub file: String,
    /// Output format; doubles as the file extension
    pub format: Option<String>,
    #[serde(alias = "attribute_types")]
    pub attributes: AttributeFilter,
    /// Show association names next to the multiplicity labels
    pub link_names: bool,
}

impl Default for DiagramSection {
    fn default() -> Self {
        Self {
            diagram_type: DiagramType::default(),
            file: "classes".to_string(),
            format: None,
            attributes: AttributeFilter::All,
            link_names: true,
        }
    }
}

impl DiagramSection {
    /// Output path for an exporter whose native format is `default_format`
    pub fn output_path(&self, default_format: &str) -> PathBuf {
        let format = self.format.as_deref().unwrap_or(default_format);
        PathBuf::from(format!("{}.{}", self.file, format))
    }
}

/// Which attribute kinds appear in class nodes
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "FilterRepr", into = "FilterRepr")]
pub enum AttributeFilter {
    #[default]
    All,
    None,
    Kinds(BTreeSet<AttributeKind>),
}

impl AttributeFilter {
    pub fn kinds<I: IntoIterator<Item = AttributeKind>>(kinds: I) -> Self {
        AttributeFilter::Kinds(kinds.into_iter().collect())
    }

    /// Returns true if an attribute with any of these flags is shown
    pub fn includes<A: AttributeModel + ?Sized>(&self, attribute: &A) -> bool {
        match self {
            AttributeFilter::All => true,
            AttributeFilter::None => false,
            AttributeFilter::Kinds(kinds) => attribute.kinds().iter().any(|k| kinds.contains(k)),
        }
    }

    /// Shown attributes, in declaration order
    pub fn apply<'a, A: AttributeModel>(&self, attributes: &'a [A]) -> Vec<&'a A> {
        attributes.iter().filter(|a| self.includes(*a)).collect()
    }

    fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, String> {
        match names {
            [one] if one.as_ref() == "all" => Ok(AttributeFilter::All),
            [one] if one.as_ref() == "none" => Ok(AttributeFilter::None),
            [] => Ok(AttributeFilter::None),
            _ => names
                .iter()
                .map(|n| n.as_ref().trim().parse::<AttributeKind>())
                .collect::<Result<BTreeSet<_>, _>>()
                .map(AttributeFilter::Kinds),
        }
    }
}

impl FromStr for AttributeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let names: Vec<&str> = s.split(',').filter(|n| !n.trim().is_empty()).collect();
        Self::from_names(&names)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum FilterRepr {
    One(String),
    Many(Vec<String>),
}

impl TryFrom<FilterRepr> for AttributeFilter {
    type Error = String;

    fn try_from(repr: FilterRepr) -> Result<Self, Self::Error> {
        match repr {
            FilterRepr::One(name) => name.parse(),
            FilterRepr::Many(names) => AttributeFilter::from_names(&names),
        }
    }
}

impl From<AttributeFilter> for FilterRepr {
    fn from(filter: AttributeFilter) -> Self {
        match filter {
            AttributeFilter::All => FilterRepr::One("all".to_string()),
            AttributeFilter::None => FilterRepr::One("none".to_string()),
            AttributeFilter::Kinds(kinds) => {
                FilterRepr::Many(kinds.iter().map(|k| k.as_str().to_string()).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = DiagramOptions::default();
        assert_eq!(options.model.model_type, "auto");
        assert_eq!(options.diagram.diagram_type, DiagramType::Graphviz);
        assert_eq!(options.diagram.file, "classes");
        assert_eq!(options.diagram.attributes, AttributeFilter::All);
        assert!(options.diagram.link_names);
        assert_eq!(options.messages, Messages::Verbose);
    }

    #[test]
    fn test_partial_config_file() {
        let options = DiagramOptions::from_json(
            r#"{"diagram": {"type": "debug", "attributes": ["primary_key", "foreign_key"]}}"#,
        )
        .unwrap();
        assert_eq!(options.diagram.diagram_type, DiagramType::Debug);
        assert_eq!(
            options.diagram.attributes,
            AttributeFilter::kinds([AttributeKind::PrimaryKey, AttributeKind::ForeignKey])
        );
        assert_eq!(options.diagram.file, "classes");
    }

    #[test]
    fn test_filter_sentinels() {
        assert_eq!("all".parse::<AttributeFilter>().unwrap(), AttributeFilter::All);
        assert_eq!("none".parse::<AttributeFilter>().unwrap(), AttributeFilter::None);
        let options = DiagramOptions::from_json(r#"{"diagram": {"attributes": ["all"]}}"#).unwrap();
        assert_eq!(options.diagram.attributes, AttributeFilter::All);
        assert!("pk,bogus".parse::<AttributeFilter>().is_err());
    }

    #[test]
    fn test_output_path() {
        let mut section = DiagramSection::default();
        assert_eq!(section.output_path("dot"), PathBuf::from("classes.dot"));
        section.format = Some("pdf".to_string());
        assert_eq!(section.output_path("dot"), PathBuf::from("classes.pdf"));
    }

    #[test]
    fn test_diagram_type_parsing() {
        assert_eq!("dot".parse::<DiagramType>().unwrap(), DiagramType::Graphviz);
        assert_eq!("ASCII".parse::<DiagramType>().unwrap(), DiagramType::Ascii);
        assert!("yuml".parse::<DiagramType>().is_err());
    }
}
