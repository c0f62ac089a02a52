//! Reflected classes and the name index shared by links

use std::cell::OnceCell;
use std::collections::HashMap;

use crate::adapters::{AssociationFacts, ClassFacts, FieldFacts, Validation, ValidationKind};
use crate::core::{ModelError, ModelResult};

use super::attribute::{build_attributes, Attribute};
use super::simple::Operation;
use super::KlassModel;

/// Position of a klass in its [`KlassIndex`]
pub type KlassId = usize;

/// A class node of the reflected model
#[derive(Debug, Clone)]
pub struct Klass {
    id: KlassId,
    name: String,
    is_abstract: bool,
    is_virtual: bool,
    superclass: Option<String>,
    attributes: Vec<Attribute>,
    operations: Vec<Operation>,
    associations: Vec<AssociationFacts>,
    validations: HashMap<String, Vec<Validation>>,
    pub(crate) hierarchy: OnceCell<(KlassId, usize)>,
}

impl Klass {
    /// A class backed by reflection facts
    pub fn concrete(facts: ClassFacts, fields: &[FieldFacts], associations: Vec<AssociationFacts>) -> Self {
        let attributes = build_attributes(&facts, fields, &associations);
        let validations = fields
            .iter()
            .filter(|f| !f.validations.is_empty())
            .map(|f| (f.name.clone(), f.validations.clone()))
            .collect();
        Self {
            id: 0,
            name: facts.name,
            is_abstract: facts.is_abstract,
            is_virtual: false,
            superclass: facts.superclass,
            attributes,
            operations: Vec::new(),
            associations,
            validations,
            hierarchy: OnceCell::new(),
        }
    }

    /// An interface class synthesized from a polymorphic association
    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            is_abstract: false,
            is_virtual: true,
            superclass: None,
            attributes: Vec::new(),
            operations: Vec::new(),
            associations: Vec::new(),
            validations: HashMap::new(),
            hierarchy: OnceCell::new(),
        }
    }

    pub fn id(&self) -> KlassId {
        self.id
    }

    /// Direct superclass name; `None` below the ecosystem base
    pub fn superclass(&self) -> Option<&str> {
        self.superclass.as_deref()
    }

    /// Associations declared directly on this class
    pub fn associations(&self) -> &[AssociationFacts] {
        &self.associations
    }

    pub fn association(&self, name: &str) -> Option<&AssociationFacts> {
        self.associations.iter().find(|a| a.name == name)
    }

    /// Returns true if `field` carries a presence rule
    pub fn requires(&self, field: &str) -> bool {
        self.validations
            .get(field)
            .is_some_and(|rules| rules.iter().any(|r| r.kind == ValidationKind::Presence))
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

/// Klasses in diagram order with a name lookup built once
#[derive(Debug)]
pub struct KlassIndex {
    klasses: Vec<Klass>,
    by_name: HashMap<String, KlassId>,
}

impl KlassIndex {
    /// Index `klasses`, assigning ids in order
    ///
    /// Fails if two klasses share a name.
    pub fn new(mut klasses: Vec<Klass>) -> ModelResult<Self> {
        let mut by_name = HashMap::with_capacity(klasses.len());
        for (id, klass) in klasses.iter_mut().enumerate() {
            klass.id = id;
            if by_name.insert(klass.name.clone(), id).is_some() {
                return Err(ModelError::DuplicateClass {
                    name: klass.name.clone(),
                });
            }
        }
        Ok(Self { klasses, by_name })
    }

    pub fn klasses(&self) -> &[Klass] {
        &self.klasses
    }

    pub fn len(&self) -> usize {
        self.klasses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.klasses.is_empty()
    }

    pub fn get(&self, id: KlassId) -> Option<&Klass> {
        self.klasses.get(id)
    }

    /// Like [`KlassIndex::get`] for ids handed out by this index
    pub(crate) fn klass(&self, id: KlassId) -> &Klass {
        &self.klasses[id]
    }

    pub fn by_name(&self, name: &str) -> Option<&Klass> {
        self.by_name.get(name).map(|id| &self.klasses[*id])
    }

    /// Look up `name`, failing with a binding error that mentions `context`
    pub fn resolve(&self, name: &str, context: impl FnOnce() -> String) -> ModelResult<&Klass> {
        self.by_name(name)
            .ok_or_else(|| ModelError::unresolved(name, context()))
    }
}
