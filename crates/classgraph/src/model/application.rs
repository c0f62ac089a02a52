//! Building the reflected model from an adapter

use std::collections::HashSet;
use std::rc::Rc;

use tracing::{debug, info, span, trace, Level};

use super::klass::{Klass, KlassIndex};
use super::link::{build_links, Link};
use super::relationship::{merge_into_relationships, Relationship};
use super::{ApplicationModel, KlassModel, RelationshipModel};
use crate::adapters::ReflectionAdapter;
use crate::core::ModelResult;

/// A fully built class model
#[derive(Debug)]
pub struct Application {
    name: String,
    index: Rc<KlassIndex>,
    relationships: Vec<Relationship>,
}

impl Application {
    pub fn index(&self) -> &KlassIndex {
        &self.index
    }

    /// Every link, relationship by relationship
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.relationships.iter().flat_map(|r| r.links())
    }
}

impl ApplicationModel for Application {
    type Klass = Klass;
    type Relationship = Relationship;

    fn name(&self) -> &str {
        &self.name
    }

    fn klasses(&self) -> &[Klass] {
        self.index.klasses()
    }

    fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    fn klass_by_name(&self, name: &str) -> Option<&Klass> {
        self.index.by_name(name)
    }

    fn root_and_depth(&self, klass: &Klass) -> ModelResult<(&Klass, usize)> {
        self.index.root_and_depth(klass)
    }
}

/// Build the class model of the application behind `adapter`
///
/// Abstract classes and classes with storage are included in adapter order.
/// One virtual klass per polymorphic interface named by a belongs-to
/// association is appended after them, in first-reference order.
pub fn build_application(adapter: &dyn ReflectionAdapter) -> ModelResult<Application> {
    let build_span = span!(Level::INFO, "build_application", ecosystem = adapter.ecosystem());
    let _enter = build_span.enter();

    let name = adapter.application_name()?;
    let mut klasses = Vec::new();
    for class_name in adapter.class_names() {
        let facts = adapter.class_facts(&class_name)?;
        if !facts.is_includable() {
            trace!(class = %class_name, "Skipping class without storage");
            continue;
        }
        let associations = adapter.associations(&class_name)?;
        let fields = if facts.is_abstract {
            Vec::new()
        } else {
            adapter.fields(&class_name)?
        };
        trace!(
            class = %class_name,
            fields = fields.len(),
            associations = associations.len(),
            "Building class"
        );
        klasses.push(Klass::concrete(facts, &fields, associations));
    }
    let concrete = klasses.len();

    let mut seen: HashSet<String> = klasses.iter().map(|k| k.name().to_string()).collect();
    let interfaces: Vec<String> = klasses
        .iter()
        .flat_map(|k| k.associations())
        .filter_map(|a| a.polymorphic_interface())
        .collect();
    for interface in interfaces {
        if seen.insert(interface.clone()) {
            trace!(interface = %interface, "Synthesizing virtual class");
            klasses.push(Klass::interface(interface));
        }
    }
    debug!(
        concrete,
        virtual_classes = klasses.len() - concrete,
        "Built classes"
    );

    let index = Rc::new(KlassIndex::new(klasses)?);
    let links = build_links(&index)?;
    let relationships = merge_into_relationships(links)?;

    info!(
        application = %name,
        classes = index.len(),
        relationships = relationships.len(),
        "Built class model"
    );
    Ok(Application {
        name,
        index,
        relationships,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{Snapshot, SnapshotAdapter};
    use crate::core::{AssociationKind, LinkType, ModelError};
    use crate::model::LinkModel;

    fn adapter(json: &str) -> SnapshotAdapter {
        SnapshotAdapter::new("active_record", Snapshot::from_json(json).unwrap())
    }

    #[test]
    fn test_includes_abstract_and_stored_classes() {
        let adapter = adapter(
            r#"{
                "application": "Library",
                "classes": [
                    {"name": "ApplicationRecord", "abstract": true},
                    {"name": "Author", "has_storage": true, "superclass": "ApplicationRecord",
                     "fields": [{"name": "id", "type": "integer"}]},
                    {"name": "Concern"}
                ]
            }"#,
        );
        let app = build_application(&adapter).unwrap();
        let names: Vec<&str> = app.klasses().iter().map(|k| k.name()).collect();
        assert_eq!(names, vec!["ApplicationRecord", "Author"]);
        assert!(app.klasses()[0].attributes().is_empty());
        assert_eq!(app.klasses()[1].attributes().len(), 1);
        assert_eq!(app.relationships().len(), 1);
    }

    #[test]
    fn test_virtual_klasses_are_appended_once() {
        let adapter = adapter(
            r#"{
                "application": "Blog",
                "classes": [
                    {"name": "Comment", "has_storage": true, "fields": [],
                     "associations": [
                        {"kind": "belongs_to", "name": "commentable", "options": {"polymorphic": true}}
                     ]},
                    {"name": "Like", "has_storage": true, "fields": [],
                     "associations": [
                        {"kind": "belongs_to", "name": "commentable", "options": {"polymorphic": true}},
                        {"kind": "belongs_to", "name": "taggable", "options": {"polymorphic": true}}
                     ]},
                    {"name": "Post", "has_storage": true, "fields": [],
                     "associations": [
                        {"kind": "has_many", "name": "comments", "target": "Comment",
                         "options": {"as": "commentable"}}
                     ]}
                ]
            }"#,
        );
        let app = build_application(&adapter).unwrap();
        let names: Vec<&str> = app.klasses().iter().map(|k| k.name()).collect();
        assert_eq!(names, vec!["Comment", "Like", "Post", "Commentable", "Taggable"]);
        let commentable = app.klass_by_name("Commentable").unwrap();
        assert!(commentable.is_virtual());
        assert!(commentable.attributes().is_empty());
        assert_eq!(app.root_and_depth(commentable).unwrap().1, 0);

        let between = |a: &str, b: &str| {
            app.relationships()
                .iter()
                .filter(|r| {
                    let ends = (r.links()[0].source().name(), r.links()[0].target().name());
                    ends == (a, b) || ends == (b, a)
                })
                .collect::<Vec<_>>()
        };

        let comments = between("Commentable", "Comment");
        assert_eq!(comments.len(), 1);
        let kinds: Vec<AssociationKind> = comments[0]
            .links()
            .iter()
            .filter_map(|l| l.association().map(|a| a.kind))
            .collect();
        assert_eq!(kinds, vec![AssociationKind::HasMany, AssociationKind::BelongsTo]);

        let realized = between("Post", "Commentable");
        assert_eq!(realized.len(), 1);
        assert_eq!(realized[0].links().len(), 1);
        assert_eq!(realized[0].link_type(), LinkType::Realization);
        assert_eq!(realized[0].links()[0].source().name(), "Post");
    }

    #[test]
    fn test_missing_fields_name_the_class() {
        let adapter = adapter(
            r#"{"application": "Library", "classes": [{"name": "Author", "has_storage": true}]}"#,
        );
        let err = build_application(&adapter).unwrap_err();
        assert!(matches!(err, ModelError::MissingFact { ref class, ref fact }
            if class == "Author" && fact == "fields"));
    }

    #[test]
    fn test_duplicate_class_is_fatal() {
        let adapter = adapter(
            r#"{"application": "Library", "classes": [
                {"name": "Author", "has_storage": true, "fields": []},
                {"name": "Author", "has_storage": true, "fields": []}
            ]}"#,
        );
        assert!(matches!(
            build_application(&adapter).unwrap_err(),
            ModelError::DuplicateClass { .. }
        ));
    }
}
