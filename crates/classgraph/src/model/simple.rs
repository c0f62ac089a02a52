//! Plain data holders for every entity kind
//!
//! Each holder is built from a name/value map and falls back to the declared
//! default for every key it does not find. They let callers assemble a model
//! by hand (tests, fixtures, alternative front ends) and run it through the
//! same exporters as a reflected one.
//!
//! ```
//! use classgraph::model::simple;
//! use classgraph::model::KlassModel;
//! use serde_json::json;
//!
//! let map = json!({"name": "Book", "is_abstract": true});
//! let klass = simple::Klass::from_map(map.as_object().unwrap()).unwrap();
//! assert_eq!(klass.name(), "Book");
//! assert!(klass.is_abstract());
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{
    ApplicationModel, AttributeModel, KlassModel, LinkModel, OperationModel, ParameterModel,
    RelationshipModel,
};
use crate::core::{LinkType, ModelError, ModelResult, Multiplicity, Visibility};

/// Check `map` against `capabilities` and deserialize it
fn from_map<T: DeserializeOwned>(
    entity: &str,
    capabilities: &[&str],
    map: &Map<String, Value>,
) -> ModelResult<T> {
    if let Some(unknown) = map.keys().find(|k| !capabilities.contains(&k.as_str())) {
        return Err(ModelError::UnknownCapability {
            entity: entity.to_string(),
            capability: unknown.clone(),
        });
    }
    serde_json::from_value(Value::Object(map.clone())).map_err(|e| ModelError::InvalidEntity {
        entity: entity.to_string(),
        message: e.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
}

impl Parameter {
    pub const CAPABILITIES: [&'static str; 2] = ["name", "type"];

    pub fn from_map(map: &Map<String, Value>) -> ModelResult<Self> {
        from_map("Parameter", &Self::CAPABILITIES, map)
    }
}

impl ParameterModel for Parameter {
    fn name(&self) -> &str {
        &self.name
    }

    fn param_type(&self) -> &str {
        &self.param_type
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Operation {
    pub name: String,
    pub parameters: Vec<Parameter>,
    #[serde(rename = "type")]
    pub return_type: String,
}

impl Default for Operation {
    fn default() -> Self {
        Self {
            name: String::new(),
            parameters: Vec::new(),
            return_type: "void".to_string(),
        }
    }
}

impl Operation {
    pub const CAPABILITIES: [&'static str; 3] = ["name", "parameters", "type"];

    pub fn from_map(map: &Map<String, Value>) -> ModelResult<Self> {
        from_map("Operation", &Self::CAPABILITIES, map)
    }
}

impl OperationModel for Operation {
    type Parameter = Parameter;

    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    fn return_type(&self) -> &str {
        &self.return_type
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Attribute {
    pub name: String,
    #[serde(rename = "type")]
    pub attr_type: Option<String>,
    pub visibility: Option<Visibility>,
    pub multiplicity: Option<Multiplicity>,
    pub default: Option<String>,
    pub properties: Vec<String>,
    pub constraints: Vec<String>,
    pub is_primary_key: bool,
    pub is_foreign_key: bool,
    pub is_type: bool,
    pub is_timestamp: bool,
    pub is_derived: bool,
    pub is_static: bool,
}

impl Attribute {
    pub const CAPABILITIES: [&'static str; 13] = [
        "name",
        "type",
        "visibility",
        "multiplicity",
        "default",
        "properties",
        "constraints",
        "is_primary_key",
        "is_foreign_key",
        "is_type",
        "is_timestamp",
        "is_derived",
        "is_static",
    ];

    pub fn from_map(map: &Map<String, Value>) -> ModelResult<Self> {
        from_map("Attribute", &Self::CAPABILITIES, map)
    }
}

impl AttributeModel for Attribute {
    fn name(&self) -> &str {
        &self.name
    }

    fn attr_type(&self) -> Option<&str> {
        self.attr_type.as_deref()
    }

    fn visibility(&self) -> Option<Visibility> {
        self.visibility
    }

    fn multiplicity(&self) -> Option<Multiplicity> {
        self.multiplicity
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
        self.is_primary_key
    }

    fn is_foreign_key(&self) -> bool {
        self.is_foreign_key
    }

    fn is_type(&self) -> bool {
        self.is_type
    }

    fn is_timestamp(&self) -> bool {
        self.is_timestamp
    }

    fn is_derived(&self) -> bool {
        self.is_derived
    }

    fn is_static(&self) -> bool {
        self.is_static
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Klass {
    pub name: String,
    /// Name of the root klass; `None` means the klass is its own root
    pub root: Option<String>,
    pub depth: usize,
    pub attributes: Vec<Attribute>,
    pub operations: Vec<Operation>,
    pub is_abstract: bool,
    pub is_virtual: bool,
}

impl Klass {
    pub const CAPABILITIES: [&'static str; 7] = [
        "name",
        "root",
        "depth",
        "attributes",
        "operations",
        "is_abstract",
        "is_virtual",
    ];

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn from_map(map: &Map<String, Value>) -> ModelResult<Self> {
        from_map("Klass", &Self::CAPABILITIES, map)
    }
}

impl KlassModel for Klass {
    type Attribute = Attribute;
    type Operation = Operation;

    fn name(&self) -> &str {
        &self.name
    }

    fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    fn operations(&self) -> &[Operation] {
        &self.operations
    }

    fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    fn is_virtual(&self) -> bool {
        self.is_virtual
    }
}

/// A klass given either by name or in full
#[derive(Deserialize)]
#[serde(untagged)]
enum KlassRef {
    Name(String),
    Full(Klass),
}

impl From<KlassRef> for Klass {
    fn from(reference: KlassRef) -> Self {
        match reference {
            KlassRef::Name(name) => Klass::new(name),
            KlassRef::Full(klass) => klass,
        }
    }
}

fn klass_ref<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<Klass, D::Error> {
    KlassRef::deserialize(deserializer).map(Klass::from)
}

fn optional_klass_ref<'de, D: serde::Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Klass>, D::Error> {
    Option::<KlassRef>::deserialize(deserializer).map(|r| r.map(Klass::from))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Link {
    #[serde(deserialize_with = "klass_ref")]
    pub source: Klass,
    #[serde(deserialize_with = "klass_ref")]
    pub target: Klass,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub link_type: LinkType,
    #[serde(default)]
    pub multiplicity: Option<Multiplicity>,
    #[serde(default, deserialize_with = "optional_klass_ref")]
    pub through: Option<Klass>,
}

impl Link {
    pub const CAPABILITIES: [&'static str; 6] =
        ["source", "target", "name", "type", "multiplicity", "through"];

    pub fn new(source: Klass, target: Klass, link_type: LinkType) -> Self {
        Self {
            source,
            target,
            name: None,
            link_type,
            multiplicity: None,
            through: None,
        }
    }

    /// Source and target are required
    pub fn from_map(map: &Map<String, Value>) -> ModelResult<Self> {
        for required in ["source", "target"] {
            if !map.contains_key(required) {
                return Err(ModelError::missing_fact("Link", required));
            }
        }
        from_map("Link", &Self::CAPABILITIES, map)
    }
}

impl LinkModel for Link {
    type Klass = Klass;

    fn source(&self) -> &Klass {
        &self.source
    }

    fn target(&self) -> &Klass {
        &self.target
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn link_type(&self) -> LinkType {
        self.link_type
    }

    fn multiplicity(&self) -> Option<Multiplicity> {
        self.multiplicity
    }

    fn through(&self) -> ModelResult<Option<&Klass>> {
        Ok(self.through.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Relationship {
    pub links: Vec<Link>,
}

impl Relationship {
    pub const CAPABILITIES: [&'static str; 1] = ["links"];

    pub fn from_map(map: &Map<String, Value>) -> ModelResult<Self> {
        from_map("Relationship", &Self::CAPABILITIES, map)
    }
}

impl RelationshipModel for Relationship {
    type Klass = Klass;
    type Link = Link;

    fn links(&self) -> &[Link] {
        &self.links
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Application {
    pub name: String,
    pub klasses: Vec<Klass>,
    pub relationships: Vec<Relationship>,
}

impl Application {
    pub const CAPABILITIES: [&'static str; 3] = ["name", "klasses", "relationships"];

    pub fn from_map(map: &Map<String, Value>) -> ModelResult<Self> {
        from_map("Application", &Self::CAPABILITIES, map)
    }
}

impl ApplicationModel for Application {
    type Klass = Klass;
    type Relationship = Relationship;

    fn name(&self) -> &str {
        &self.name
    }

    fn klasses(&self) -> &[Klass] {
        &self.klasses
    }

    fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    fn klass_by_name(&self, name: &str) -> Option<&Klass> {
        self.klasses.iter().find(|k| k.name == name)
    }

    fn root_and_depth(&self, klass: &Klass) -> ModelResult<(&Klass, usize)> {
        let root = klass.root.as_deref().unwrap_or(&klass.name);
        let root = self
            .klass_by_name(root)
            .ok_or_else(|| ModelError::unresolved(root, format!("root of {}", klass.name)))?;
        Ok((root, klass.depth))
    }
}
