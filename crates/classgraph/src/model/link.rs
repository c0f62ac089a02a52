//! Directed links between reflected classes
//!
//! A link is created for every declared association and for every subclass
//! declaration. Its UML type, multiplicity and through class are derived from
//! the association on first use and frozen afterwards.

use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, span, trace, Level};

use super::klass::{Klass, KlassId, KlassIndex};
use super::{KlassModel, LinkModel};
use crate::adapters::{classify, AssociationFacts};
use crate::core::{AssociationKind, Dependent, Derived, LinkType, ModelResult, Multiplicity};

/// Sort key of links that do not stem from an association
pub const STRUCTURAL_SORT_KEY: u8 = 10;

/// One directed edge of the reflected model
pub struct Link {
    index: Rc<KlassIndex>,
    source: KlassId,
    target: KlassId,
    /// Class declaring the association; differs from `source` for the
    /// interface half of a polymorphic association
    owner: KlassId,
    association: Option<AssociationFacts>,
    link_type: OnceCell<LinkType>,
    multiplicity: Derived<Multiplicity>,
    through: Derived<KlassId>,
}

impl Link {
    /// A link derived from `association`, declared on `owner`
    pub fn from_association(
        index: Rc<KlassIndex>,
        owner: KlassId,
        association: AssociationFacts,
        source: KlassId,
        target: KlassId,
    ) -> Self {
        Self {
            index,
            source,
            target,
            owner,
            association: Some(association),
            link_type: OnceCell::new(),
            multiplicity: Derived::unset(),
            through: Derived::unset(),
        }
    }

    /// A generalization or realization link with no association behind it
    pub fn structural(index: Rc<KlassIndex>, link_type: LinkType, source: KlassId, target: KlassId) -> Self {
        Self {
            index,
            source,
            target,
            owner: source,
            association: None,
            link_type: OnceCell::from(link_type),
            multiplicity: Derived::absent(),
            through: Derived::absent(),
        }
    }

    /// Fix the type up front instead of deriving it from the association
    fn with_type(self, link_type: LinkType) -> Self {
        let _ = self.link_type.set(link_type);
        self
    }

    pub fn association(&self) -> Option<&AssociationFacts> {
        self.association.as_ref()
    }

    pub fn source_id(&self) -> KlassId {
        self.source
    }

    pub fn target_id(&self) -> KlassId {
        self.target
    }

    /// Unordered endpoint pair
    pub fn endpoints(&self) -> (KlassId, KlassId) {
        (self.source.min(self.target), self.source.max(self.target))
    }

    /// Position within a relationship; lower sorts first
    pub fn sort_key(&self) -> u8 {
        self.association
            .as_ref()
            .map(|a| a.kind.precedence())
            .unwrap_or(STRUCTURAL_SORT_KEY)
    }

    fn derive_type(&self) -> LinkType {
        let Some(association) = &self.association else {
            return LinkType::Association;
        };
        if !association.kind.is_owning() {
            return LinkType::Association;
        }
        let options = &association.options;
        let dependent = options.dependent;
        if dependent.is_some_and(|d| d.cascades()) {
            LinkType::Composition
        } else if options.autosave || dependent == Some(Dependent::Nullify) {
            LinkType::Aggregation
        } else {
            LinkType::Association
        }
    }

    fn derive_multiplicity(&self) -> Option<Multiplicity> {
        let association = self.association.as_ref()?;
        let multiplicity = match association.kind {
            AssociationKind::HasOne => Multiplicity::OPTIONAL,
            AssociationKind::HasMany | AssociationKind::HasAndBelongsToMany => Multiplicity::MANY,
            AssociationKind::BelongsTo => {
                let owner = self.index.klass(self.owner);
                let required = association
                    .foreign_key_name()
                    .is_some_and(|key| owner.requires(&key));
                if required {
                    Multiplicity::ONE
                } else {
                    Multiplicity::OPTIONAL
                }
            }
        };
        Some(multiplicity)
    }

    /// Join class named by the `through` option
    ///
    /// The option names a sibling association on the owner whose target is the
    /// join class; failing that, it is read as a class name.
    fn derive_through(&self) -> ModelResult<Option<KlassId>> {
        let Some(association) = &self.association else {
            return Ok(None);
        };
        if !association.kind.is_owning() {
            return Ok(None);
        }
        let Some(through) = association.options.through.as_deref() else {
            return Ok(None);
        };

        let owner = self.index.klass(self.owner);
        let context = || format!("through option of {}#{}", owner.name(), association.name);
        let join = match owner.association(through) {
            Some(sibling) => {
                let target = sibling.target_name(owner.name())?;
                self.index.resolve(&target, context)?
            }
            None => self.index.resolve(&classify(through), context)?,
        };
        trace!(link = association.name.as_str(), through = join.name(), "Resolved through class");
        Ok(Some(join.id()))
    }
}

impl LinkModel for Link {
    type Klass = Klass;

    fn source(&self) -> &Klass {
        self.index.klass(self.source)
    }

    fn target(&self) -> &Klass {
        self.index.klass(self.target)
    }

    fn name(&self) -> Option<&str> {
        match self.link_type() {
            LinkType::Generalization | LinkType::Realization => None,
            _ => self.association.as_ref().map(|a| a.name.as_str()),
        }
    }

    fn link_type(&self) -> LinkType {
        *self.link_type.get_or_init(|| self.derive_type())
    }

    fn multiplicity(&self) -> Option<Multiplicity> {
        self.multiplicity
            .get_or_init(|| self.derive_multiplicity())
            .copied()
    }

    fn through(&self) -> ModelResult<Option<&Klass>> {
        let through = self.through.get_or_try_init(|| self.derive_through())?;
        Ok(through.map(|id| self.index.klass(*id)))
    }
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Link")
            .field("source", &self.source().name())
            .field("target", &self.target().name())
            .field("association", &self.association.as_ref().map(|a| &a.name))
            .field("link_type", &self.link_type)
            .field("multiplicity", &self.multiplicity)
            .field("through", &self.through)
            .finish()
    }
}

/// Every link of the indexed classes
///
/// Association links come first, in class then declaration order, followed
/// by generalization links. A polymorphic has-one/has-many expands into a
/// realization towards the interface it names and an association from that
/// interface to the declared target.
pub fn build_links(index: &Rc<KlassIndex>) -> ModelResult<Vec<Link>> {
    let link_span = span!(Level::INFO, "build_links", classes = index.len());
    let _enter = link_span.enter();

    let mut links = Vec::new();
    for owner in index.klasses() {
        for association in owner.associations() {
            let context = || format!("association {}#{}", owner.name(), association.name);
            let target = index.resolve(&association.target_name(owner.name())?, context)?;

            match association.realized_interface() {
                Some(interface) => {
                    let interface = index.resolve(&interface, context)?;
                    links.push(Link::structural(
                        Rc::clone(index),
                        LinkType::Realization,
                        owner.id(),
                        interface.id(),
                    ));
                    links.push(
                        Link::from_association(
                            Rc::clone(index),
                            owner.id(),
                            association.clone(),
                            interface.id(),
                            target.id(),
                        )
                        .with_type(LinkType::Association),
                    );
                }
                None => links.push(Link::from_association(
                    Rc::clone(index),
                    owner.id(),
                    association.clone(),
                    owner.id(),
                    target.id(),
                )),
            }
        }
    }
    let association_links = links.len();

    for klass in index.klasses() {
        if let Some(superclass) = klass.superclass() {
            let parent = index.resolve(superclass, || format!("superclass of {}", klass.name()))?;
            links.push(Link::structural(
                Rc::clone(index),
                LinkType::Generalization,
                parent.id(),
                klass.id(),
            ));
        }
    }

    debug!(
        associations = association_links,
        generalizations = links.len() - association_links,
        "Built links"
    );
    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{AssociationOptions, ClassFacts, FieldFacts, Validation, ValidationKind};

    fn facts(name: &str, superclass: Option<&str>) -> ClassFacts {
        ClassFacts {
            name: name.to_string(),
            has_storage: true,
            superclass: superclass.map(str::to_string),
            primary_key: Some("id".to_string()),
            ..Default::default()
        }
    }

    fn index(klasses: Vec<Klass>) -> Rc<KlassIndex> {
        Rc::new(KlassIndex::new(klasses).unwrap())
    }

    fn with_options(mut assoc: AssociationFacts, options: AssociationOptions) -> AssociationFacts {
        assoc.options = options;
        assoc
    }

    #[test]
    fn test_type_inference() {
        let has_many = |options| {
            with_options(AssociationFacts::new(AssociationKind::HasMany, "books", "Book"), options)
        };
        let index = index(vec![
            Klass::concrete(
                facts("Author", None),
                &[],
                vec![
                    has_many(AssociationOptions::default()),
                    has_many(AssociationOptions {
                        autosave: true,
                        ..Default::default()
                    }),
                    has_many(AssociationOptions {
                        dependent: Some(Dependent::Nullify),
                        ..Default::default()
                    }),
                    has_many(AssociationOptions {
                        autosave: true,
                        dependent: Some(Dependent::Destroy),
                        ..Default::default()
                    }),
                    has_many(AssociationOptions {
                        dependent: Some(Dependent::DeleteAll),
                        ..Default::default()
                    }),
                ],
            ),
            Klass::concrete(
                facts("Book", None),
                &[],
                vec![with_options(
                    AssociationFacts::new(AssociationKind::BelongsTo, "author", "Author"),
                    AssociationOptions {
                        dependent: Some(Dependent::Destroy),
                        ..Default::default()
                    },
                )],
            ),
        ]);
        let types: Vec<LinkType> = build_links(&index).unwrap().iter().map(|l| l.link_type()).collect();
        assert_eq!(
            types,
            vec![
                LinkType::Association,
                LinkType::Aggregation,
                LinkType::Aggregation,
                LinkType::Composition,
                LinkType::Composition,
                LinkType::Association,
            ]
        );
    }

    #[test]
    fn test_belongs_to_multiplicity_follows_presence_rule() {
        let required_fk = [FieldFacts {
            name: "author_id".to_string(),
            base_type: "integer".to_string(),
            validations: vec![Validation::new(ValidationKind::Presence)],
            ..Default::default()
        }];
        let belongs_to = || AssociationFacts::new(AssociationKind::BelongsTo, "author", "Author");
        let index = index(vec![
            Klass::concrete(facts("Author", None), &[], Vec::new()),
            Klass::concrete(facts("Book", None), &required_fk, vec![belongs_to()]),
            Klass::concrete(facts("Review", None), &[], vec![belongs_to()]),
        ]);
        let links = build_links(&index).unwrap();
        assert_eq!(links[0].multiplicity(), Some(Multiplicity::ONE));
        assert_eq!(links[1].multiplicity(), Some(Multiplicity::OPTIONAL));
        assert_eq!(links[0].label(), "1 author");
    }

    #[test]
    fn test_generalizations_follow_associations() {
        let index = index(vec![
            Klass::concrete(facts("Media", None), &[], Vec::new()),
            Klass::concrete(
                facts("Book", Some("Media")),
                &[],
                vec![AssociationFacts::new(AssociationKind::HasOne, "cover", "Cover")],
            ),
            Klass::concrete(facts("Cover", None), &[], Vec::new()),
        ]);
        let links = build_links(&index).unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].multiplicity(), Some(Multiplicity::OPTIONAL));

        let generalization = &links[1];
        assert_eq!(generalization.link_type(), LinkType::Generalization);
        assert_eq!(generalization.source().name(), "Media");
        assert_eq!(generalization.target().name(), "Book");
        assert_eq!(generalization.name(), None);
        assert_eq!(generalization.multiplicity(), None);
        assert_eq!(generalization.sort_key(), STRUCTURAL_SORT_KEY);
    }

    #[test]
    fn test_polymorphic_association_expands() {
        let comments = with_options(
            AssociationFacts::new(AssociationKind::HasMany, "comments", "Comment"),
            AssociationOptions {
                as_: Some("commentable".to_string()),
                dependent: Some(Dependent::Destroy),
                ..Default::default()
            },
        );
        let index = index(vec![
            Klass::concrete(facts("Post", None), &[], vec![comments]),
            Klass::concrete(facts("Comment", None), &[], Vec::new()),
            Klass::interface("Commentable"),
        ]);
        let links = build_links(&index).unwrap();
        assert_eq!(links.len(), 2);

        assert_eq!(links[0].link_type(), LinkType::Realization);
        assert_eq!(links[0].source().name(), "Post");
        assert_eq!(links[0].target().name(), "Commentable");

        assert_eq!(links[1].link_type(), LinkType::Association);
        assert_eq!(links[1].source().name(), "Commentable");
        assert_eq!(links[1].target().name(), "Comment");
        assert_eq!(links[1].name(), Some("comments"));
        assert_eq!(links[1].multiplicity(), Some(Multiplicity::MANY));
    }

    #[test]
    fn test_through_prefers_sibling_association() {
        let loans = AssociationFacts::new(AssociationKind::HasMany, "loans", "Loan");
        let borrowers = with_options(
            AssociationFacts::new(AssociationKind::HasMany, "borrowers", "Member"),
            AssociationOptions {
                through: Some("loans".to_string()),
                ..Default::default()
            },
        );
        let readers = with_options(
            AssociationFacts::new(AssociationKind::HasMany, "readers", "Member"),
            AssociationOptions {
                through: Some("loan".to_string()),
                ..Default::default()
            },
        );
        let index = index(vec![
            Klass::concrete(facts("Book", None), &[], vec![loans, borrowers, readers]),
            Klass::concrete(facts("Loan", None), &[], Vec::new()),
            Klass::concrete(facts("Member", None), &[], Vec::new()),
        ]);
        let links = build_links(&index).unwrap();
        assert!(links[0].through().unwrap().is_none());
        assert_eq!(links[1].through().unwrap().unwrap().name(), "Loan");
        assert_eq!(links[2].through().unwrap().unwrap().name(), "Loan");
        assert_eq!(
            links[1].description().unwrap(),
            "association from Book to Member (borrowers) through Loan 0..*"
        );
    }

    #[test]
    fn test_through_falls_back_to_singular_class_name() {
        let members = with_options(
            AssociationFacts::new(AssociationKind::HasMany, "members", "Member"),
            AssociationOptions {
                through: Some("memberships".to_string()),
                ..Default::default()
            },
        );
        let index = index(vec![
            Klass::concrete(facts("Club", None), &[], vec![members]),
            Klass::concrete(facts("Member", None), &[], Vec::new()),
            Klass::concrete(facts("Membership", None), &[], Vec::new()),
        ]);
        let links = build_links(&index).unwrap();
        assert_eq!(links[0].through().unwrap().unwrap().name(), "Membership");
    }

    #[test]
    fn test_unresolved_through_is_binding_error() {
        let members = with_options(
            AssociationFacts::new(AssociationKind::HasMany, "members", "Member"),
            AssociationOptions {
                through: Some("enrolments".to_string()),
                ..Default::default()
            },
        );
        let index = index(vec![
            Klass::concrete(facts("Club", None), &[], vec![members]),
            Klass::concrete(facts("Member", None), &[], Vec::new()),
        ]);
        let links = build_links(&index).unwrap();
        let err = links[0].through().unwrap_err();
        assert!(err.is_binding_error());
        assert!(err.to_string().contains("'Enrolment'"));
        assert!(!links[0].through.is_computed());
    }

    #[test]
    fn test_unknown_target_is_binding_error() {
        let index = index(vec![Klass::concrete(
            facts("Author", None),
            &[],
            vec![AssociationFacts::new(AssociationKind::HasMany, "books", "Book")],
        )]);
        let err = build_links(&index).unwrap_err();
        assert!(err.to_string().contains("Author#books"));
    }
}
