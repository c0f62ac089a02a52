//! Diagram database
//!
//! Flattens a class model into display data: one node per class with its
//! filtered attribute labels and cluster placement, one edge per
//! relationship with its end labels. Exporters read nothing else.

use anyhow::Result;
use indexmap::IndexMap;
use tracing::{debug, span, Level};

use crate::core::{Database, DiagramSection, LinkType, ModelResult};
use crate::model::{
    ApplicationModel, AttributeModel, KlassModel, LinkModel, OperationModel, RelationshipModel,
};

/// How an attribute line is emphasized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttributeStyle {
    #[default]
    Plain,
    PrimaryKey,
    ForeignKey,
}

/// One attribute line of a class node
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeLine {
    pub label: String,
    pub style: AttributeStyle,
}

impl AttributeLine {
    fn from_attribute<A: AttributeModel>(attribute: &A) -> Self {
        let style = if attribute.is_primary_key() {
            AttributeStyle::PrimaryKey
        } else if attribute.is_foreign_key() {
            AttributeStyle::ForeignKey
        } else {
            AttributeStyle::Plain
        };
        Self {
            label: attribute.label(),
            style,
        }
    }
}

/// A class in the diagram
#[derive(Debug, Clone, PartialEq)]
pub struct ClassNode {
    pub name: String,
    pub attributes: Vec<AttributeLine>,
    pub operations: Vec<String>,
    /// Name of the generalization tree this class belongs to
    pub root: String,
    pub depth: usize,
    pub is_abstract: bool,
    pub is_virtual: bool,
}

impl ClassNode {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            root: name.clone(),
            name,
            attributes: Vec::new(),
            operations: Vec::new(),
            depth: 0,
            is_abstract: false,
            is_virtual: false,
        }
    }

    pub fn with_attribute(mut self, label: impl Into<String>, style: AttributeStyle) -> Self {
        self.attributes.push(AttributeLine {
            label: label.into(),
            style,
        });
        self
    }

    pub fn with_root(mut self, root: impl Into<String>, depth: usize) -> Self {
        self.root = root.into();
        self.depth = depth;
        self
    }
}

/// A relationship edge, drawn from the first link's source to its target
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipEdge {
    pub source: String,
    pub target: String,
    pub link_type: LinkType,
    /// Label at the target end, from the first link
    pub head_label: String,
    /// Label at the source end, from the last link of a pair
    pub tail_label: String,
    pub through: Option<String>,
    pub description: String,
}

impl RelationshipEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, link_type: LinkType) -> Self {
        let source = source.into();
        let target = target.into();
        let description = match link_type {
            LinkType::Generalization => format!("{} from {} to {}", link_type, source, target),
            _ => format!("{} between {} and {}", link_type, source, target),
        };
        Self {
            source,
            target,
            link_type,
            head_label: String::new(),
            tail_label: String::new(),
            through: None,
            description,
        }
    }

    pub fn with_labels(mut self, head: impl Into<String>, tail: impl Into<String>) -> Self {
        self.head_label = head.into();
        self.tail_label = tail.into();
        self
    }
}

/// Nodes grouped for layout
#[derive(Debug, Clone, PartialEq)]
pub enum NodeGroup<'a> {
    /// A class alone in its generalization tree
    Single(&'a ClassNode),
    /// A generalization tree, classes ranked by depth
    Cluster {
        root: &'a str,
        ranks: Vec<(usize, Vec<&'a ClassNode>)>,
    },
}

/// Display data of one diagram
#[derive(Debug, Clone, Default)]
pub struct DiagramDatabase {
    application: String,
    classes: Vec<ClassNode>,
    relationships: Vec<RelationshipEdge>,
}

impl DiagramDatabase {
    pub fn new(application: impl Into<String>) -> Self {
        Self {
            application: application.into(),
            classes: Vec::new(),
            relationships: Vec::new(),
        }
    }

    /// Flatten `application` using the attribute filter and label options of `section`
    pub fn from_model<A: ApplicationModel>(application: &A, section: &DiagramSection) -> ModelResult<Self> {
        let db_span = span!(Level::DEBUG, "build_diagram_database");
        let _enter = db_span.enter();

        let mut database = Self::new(application.name());
        for klass in application.klasses() {
            let (root, depth) = application.root_and_depth(klass)?;
            database.classes.push(ClassNode {
                name: klass.name().to_string(),
                attributes: section
                    .attributes
                    .apply(klass.attributes())
                    .into_iter()
                    .map(AttributeLine::from_attribute)
                    .collect(),
                operations: klass.operations().iter().map(|o| o.signature()).collect(),
                root: root.name().to_string(),
                depth,
                is_abstract: klass.is_abstract(),
                is_virtual: klass.is_virtual(),
            });
        }

        for relationship in application.relationships() {
            let links = relationship.links();
            let (Some(first), Some(last)) = (links.first(), links.last()) else {
                continue;
            };
            let tail_label = if links.len() > 1 {
                last.end_label(section.link_names)
            } else {
                String::new()
            };
            database.relationships.push(RelationshipEdge {
                source: first.source().name().to_string(),
                target: first.target().name().to_string(),
                link_type: relationship.link_type(),
                head_label: first.end_label(section.link_names),
                tail_label,
                through: relationship.through()?.map(|k| k.name().to_string()),
                description: relationship.description()?,
            });
        }

        debug!(
            classes = database.classes.len(),
            relationships = database.relationships.len(),
            "Built diagram database"
        );
        Ok(database)
    }

    pub fn application(&self) -> &str {
        &self.application
    }

    pub fn add_class(&mut self, class: ClassNode) -> Result<()> {
        self.classes.push(class);
        Ok(())
    }

    pub fn add_relationship(&mut self, relationship: RelationshipEdge) -> Result<()> {
        self.relationships.push(relationship);
        Ok(())
    }

    pub fn classes(&self) -> &[ClassNode] {
        &self.classes
    }

    pub fn relationships(&self) -> &[RelationshipEdge] {
        &self.relationships
    }

    pub fn get_class(&self, name: &str) -> Option<&ClassNode> {
        self.classes.iter().find(|c| c.name == name)
    }

    /// Classes grouped by generalization tree, in first-appearance order
    ///
    /// Trees with a single class are returned as [`NodeGroup::Single`].
    pub fn groups(&self) -> Vec<NodeGroup<'_>> {
        let mut by_root: IndexMap<&str, Vec<&ClassNode>> = IndexMap::new();
        for class in &self.classes {
            by_root.entry(class.root.as_str()).or_default().push(class);
        }

        by_root
            .into_iter()
            .map(|(root, members)| match members.as_slice() {
                [only] => NodeGroup::Single(*only),
                _ => {
                    let mut ranks: IndexMap<usize, Vec<&ClassNode>> = IndexMap::new();
                    for class in members {
                        ranks.entry(class.depth).or_default().push(class);
                    }
                    NodeGroup::Cluster {
                        root,
                        ranks: ranks.into_iter().collect(),
                    }
                }
            })
            .collect()
    }
}

impl Database for DiagramDatabase {
    type Node = ClassNode;
    type Edge = RelationshipEdge;

    fn add_node(&mut self, node: Self::Node) -> Result<()> {
        self.add_class(node)
    }

    fn add_edge(&mut self, edge: Self::Edge) -> Result<()> {
        self.add_relationship(edge)
    }

    fn get_node(&self, id: &str) -> Option<&Self::Node> {
        self.get_class(id)
    }

    fn nodes(&self) -> impl Iterator<Item = &Self::Node> {
        self.classes.iter()
    }

    fn edges(&self) -> impl Iterator<Item = &Self::Edge> {
        self.relationships.iter()
    }

    fn clear(&mut self) {
        self.classes.clear();
        self.relationships.clear();
    }

    fn node_count(&self) -> usize {
        self.classes.len()
    }

    fn edge_count(&self) -> usize {
        self.relationships.len()
    }
}
