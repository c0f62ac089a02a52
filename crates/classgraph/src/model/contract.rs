//! Entity contracts
//!
//! One trait per entity kind. The required methods are the capabilities a
//! producer must supply; the provided methods carry the semantics every
//! producer shares (labels, descriptions, attribute kinds). A new reflection
//! source implements these traits and the merge/resolve logic works with it
//! unchanged.

use crate::core::{AttributeKind, LinkType, ModelResult, Multiplicity, Visibility};

/// A parameter of an operation
pub trait ParameterModel {
    fn name(&self) -> &str;
    fn param_type(&self) -> &str;
}

/// A method signature of a class
pub trait OperationModel {
    type Parameter: ParameterModel;

    fn name(&self) -> &str;
    fn parameters(&self) -> &[Self::Parameter];
    fn return_type(&self) -> &str;

    /// `name(a : T, b : U) : R`
    fn signature(&self) -> String {
        let params: Vec<String> = self
            .parameters()
            .iter()
            .map(|p| format!("{} : {}", p.name(), p.param_type()))
            .collect();
        format!("{}({}) : {}", self.name(), params.join(", "), self.return_type())
    }
}

/// A field of a class
pub trait AttributeModel {
    fn name(&self) -> &str;
    fn attr_type(&self) -> Option<&str>;
    fn visibility(&self) -> Option<Visibility>;
    fn multiplicity(&self) -> Option<Multiplicity>;
    fn default_value(&self) -> Option<&str>;
    fn properties(&self) -> &[String];
    fn constraints(&self) -> &[String];
    fn is_primary_key(&self) -> bool;
    fn is_foreign_key(&self) -> bool;
    /// Single-table-inheritance discriminator
    fn is_type(&self) -> bool;
    fn is_timestamp(&self) -> bool;
    fn is_derived(&self) -> bool;
    fn is_static(&self) -> bool;

    /// Plain data column: none of the key, discriminator or timestamp flags
    fn is_content(&self) -> bool {
        !(self.is_primary_key() || self.is_foreign_key() || self.is_type() || self.is_timestamp())
    }

    fn has_kind(&self, kind: AttributeKind) -> bool {
        match kind {
            AttributeKind::Content => self.is_content(),
            AttributeKind::PrimaryKey => self.is_primary_key(),
            AttributeKind::Type => self.is_type(),
            AttributeKind::ForeignKey => self.is_foreign_key(),
            AttributeKind::Timestamp => self.is_timestamp(),
        }
    }

    /// Every kind this attribute belongs to, in filter order
    fn kinds(&self) -> Vec<AttributeKind> {
        AttributeKind::ALL
            .into_iter()
            .filter(|k| self.has_kind(*k))
            .collect()
    }

    /// UML attribute label: `- /name : type[mult] = default {props, constraints}`
    fn label(&self) -> String {
        let symbol = self.visibility().map(Visibility::to_char).unwrap_or('-');
        let mut label = format!("{} ", symbol);
        if self.is_derived() {
            label.push('/');
        }
        label.push_str(self.name());
        if let Some(attr_type) = self.attr_type() {
            label.push_str(" : ");
            label.push_str(attr_type);
        }
        if let Some(multiplicity) = self.multiplicity() {
            label.push_str(&format!("[{}]", multiplicity));
        }
        if let Some(default) = self.default_value() {
            label.push_str(" = ");
            label.push_str(default);
        }
        let annotations: Vec<&str> = self
            .properties()
            .iter()
            .chain(self.constraints())
            .map(String::as_str)
            .collect();
        if !annotations.is_empty() {
            label.push_str(&format!(" {{{}}}", annotations.join(", ")));
        }
        label
    }
}

/// A class node
pub trait KlassModel {
    type Attribute: AttributeModel;
    type Operation: OperationModel;

    fn name(&self) -> &str;
    fn attributes(&self) -> &[Self::Attribute];
    fn operations(&self) -> &[Self::Operation];
    fn is_abstract(&self) -> bool;
    fn is_virtual(&self) -> bool;

    fn label(&self) -> &str {
        self.name()
    }
}

/// One directed edge derived from one association or inheritance relation
///
/// Generalizations run from superclass (source) to subclass (target) and
/// carry neither name nor multiplicity.
pub trait LinkModel {
    type Klass: KlassModel;

    fn source(&self) -> &Self::Klass;
    fn target(&self) -> &Self::Klass;
    fn name(&self) -> Option<&str>;
    fn link_type(&self) -> LinkType;
    fn multiplicity(&self) -> Option<Multiplicity>;
    fn through(&self) -> ModelResult<Option<&Self::Klass>>;

    /// End label: multiplicity, then the name if `with_name`
    fn end_label(&self, with_name: bool) -> String {
        let mut label = self
            .multiplicity()
            .map(|m| m.to_string())
            .unwrap_or_default();
        if with_name {
            if let Some(name) = self.name().filter(|n| !n.is_empty()) {
                if !label.is_empty() {
                    label.push(' ');
                }
                label.push_str(name);
            }
        }
        label
    }

    fn label(&self) -> String {
        self.end_label(true)
    }

    /// `has_many from Author to Book (books) through Loan 0..*`
    fn description(&self) -> ModelResult<String> {
        let mut desc = format!(
            "{} from {} to {}",
            self.link_type(),
            self.source().name(),
            self.target().name()
        );
        if let Some(name) = self.name().filter(|n| !n.is_empty()) {
            desc.push_str(&format!(" ({})", name));
        }
        if let Some(through) = self.through()? {
            desc.push_str(&format!(" through {}", through.name()));
        }
        if let Some(multiplicity) = self.multiplicity() {
            desc.push_str(&format!(" {}", multiplicity));
        }
        Ok(desc)
    }
}

/// A merged diagram edge
///
/// Type and through class mirror the first link.
pub trait RelationshipModel {
    type Klass: KlassModel;
    type Link: LinkModel<Klass = Self::Klass>;

    fn links(&self) -> &[Self::Link];

    fn first_link(&self) -> Option<&Self::Link> {
        self.links().first()
    }

    fn link_type(&self) -> LinkType {
        self.first_link().map(|l| l.link_type()).unwrap_or_default()
    }

    fn through(&self) -> ModelResult<Option<&Self::Klass>> {
        match self.first_link() {
            Some(link) => link.through(),
            None => Ok(None),
        }
    }

    /// `association between Author and Book` / `generalization from Base to Leaf`
    fn description(&self) -> ModelResult<String> {
        let Some(link) = self.first_link() else {
            return Ok(String::new());
        };
        let source = link.source().name();
        let target = link.target().name();
        if self.link_type() == LinkType::Generalization {
            return Ok(format!("{} from {} to {}", self.link_type(), source, target));
        }
        let mut desc = format!("{} between {} and {}", self.link_type(), source, target);
        if let Some(through) = self.through()? {
            desc.push_str(&format!(" through {}", through.name()));
        }
        Ok(desc)
    }
}

/// The root aggregate
pub trait ApplicationModel {
    type Klass: KlassModel;
    type Relationship: RelationshipModel<Klass = Self::Klass>;

    fn name(&self) -> &str;
    /// Classes in diagram order
    fn klasses(&self) -> &[Self::Klass];
    fn relationships(&self) -> &[Self::Relationship];
    fn klass_by_name(&self, name: &str) -> Option<&Self::Klass>;

    /// Topmost ancestor below the ecosystem base, and the hop count to it
    fn root_and_depth(&self, klass: &Self::Klass) -> ModelResult<(&Self::Klass, usize)>;
}
