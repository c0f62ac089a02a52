//! classgraph - UML class diagrams from object-relational reflection metadata
//!
//! Reflection facts about an application's model classes (columns,
//! validations, associations, inheritance) are turned into a class model of
//! classes, attributes, links and merged relationships, then exported as DOT
//! source, box drawings or a plain-text listing.
//!
//! # Quick Start
//!
//! ```rust
//! use classgraph::render_snapshot;
//!
//! let snapshot = r#"{
//!     "application": "Library",
//!     "libraries": ["activerecord"],
//!     "classes": [
//!         { "name": "Author", "has_storage": true, "primary_key": "id",
//!           "fields": [{ "name": "id", "type": "integer" }] }
//!     ]
//! }"#;
//! let dot = render_snapshot(snapshot).unwrap();
//! assert!(dot.contains("digraph \"Library\""));
//! ```
//!
//! # Advanced Usage
//!
//! For more control, drive the stages yourself:
//!
//! ```rust
//! use classgraph::prelude::*;
//!
//! let snapshot = Snapshot::from_json(r#"{
//!     "application": "Library",
//!     "classes": [
//!         { "name": "Author", "has_storage": true, "fields": [] },
//!         { "name": "Book", "has_storage": true, "fields": [],
//!           "associations": [{ "kind": "belongs_to", "name": "author", "target": "Author" }] }
//!     ]
//! }"#).unwrap();
//!
//! // Reflect and build the class model
//! let adapter = SnapshotAdapter::new("active_record", snapshot);
//! let application = build_application(&adapter).unwrap();
//! assert_eq!(application.klasses().len(), 2);
//! assert_eq!(application.relationships().len(), 1);
//!
//! // Flatten and export
//! let database = DiagramDatabase::from_model(&application, &DiagramSection::default()).unwrap();
//! let text = DebugExporter::new().export(&database).unwrap();
//! assert!(text.contains("association between Book and Author"));
//! ```

pub mod adapters;
pub mod core;
pub mod model;
pub mod plugins;

pub use core::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::{AdapterRegistry, ReflectionAdapter, Snapshot, SnapshotAdapter};
    pub use crate::core::{
        AttributeFilter, AttributeKind, Database, DiagramOptions, DiagramSection, DiagramType,
        Exporter, LinkType, ModelError, ModelResult, Multiplicity,
    };
    pub use crate::model::{
        build_application, ApplicationModel, AttributeModel, KlassModel, LinkModel,
        RelationshipModel,
    };
    pub use crate::plugins::{
        AsciiExporter, DebugExporter, DiagramDatabase, GraphvizExporter, Orchestrator,
    };
}

/// Render a JSON reflection snapshot as DOT source with default options
///
/// # Example
/// ```rust
/// use classgraph::render_snapshot;
///
/// let dot = render_snapshot(r#"{"application": "Empty", "libraries": ["rails"]}"#).unwrap();
/// assert!(dot.starts_with("digraph \"Empty\""));
/// ```
pub fn render_snapshot(input: &str) -> anyhow::Result<String> {
    render_snapshot_with(input, DiagramOptions::default())
}

/// Render a JSON reflection snapshot with explicit options
///
/// # Example
/// ```rust
/// use classgraph::{render_snapshot_with, DiagramOptions, DiagramType};
///
/// let mut options = DiagramOptions::default();
/// options.model.model_type = "active_record".to_string();
/// options.diagram.diagram_type = DiagramType::Debug;
/// let text = render_snapshot_with(r#"{"application": "Empty"}"#, options).unwrap();
/// assert!(text.starts_with("Application: Empty"));
/// ```
pub fn render_snapshot_with(input: &str, options: DiagramOptions) -> anyhow::Result<String> {
    use crate::adapters::Snapshot;
    use crate::plugins::Orchestrator;

    let snapshot = Snapshot::from_json(input)?;
    Orchestrator::with_options(options).render(snapshot)
}

/// Build the class model of a JSON reflection snapshot without exporting it
///
/// `ecosystem` names the adapter to use; `None` auto-detects it.
///
/// # Example
/// ```rust
/// use classgraph::build_model;
/// use classgraph::prelude::ApplicationModel;
///
/// let app = build_model(r#"{"application": "Empty"}"#, Some("active_record")).unwrap();
/// assert_eq!(app.name(), "Empty");
/// assert!(app.klasses().is_empty());
/// ```
pub fn build_model(input: &str, ecosystem: Option<&str>) -> anyhow::Result<model::Application> {
    use crate::adapters::{AdapterRegistry, Snapshot};

    let snapshot = Snapshot::from_json(input)?;
    let adapter = AdapterRegistry::with_default_adapters().adapter_for(ecosystem, snapshot)?;
    Ok(model::build_application(adapter.as_ref())?)
}
