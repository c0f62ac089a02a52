//! Pipeline orchestrator
//!
//! The orchestrator runs one diagram generation end to end:
//! Snapshot → Adapter → Class model → Diagram database → Exporter → Artifact

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, span, Level};

use super::{write_artifact, AsciiExporter, DebugExporter, DiagramDatabase, GraphvizExporter};
use crate::adapters::{AdapterRegistry, Snapshot};
use crate::core::{DiagramOptions, DiagramType, Exporter};
use crate::model::{build_application, Application, ApplicationModel};

/// Coordinates adapters, the model builder and the exporters
pub struct Orchestrator {
    registry: AdapterRegistry,
    options: DiagramOptions,
}

impl Orchestrator {
    /// Create an orchestrator with the built-in adapters and default options
    pub fn new() -> Self {
        Self::with_options(DiagramOptions::default())
    }

    pub fn with_options(options: DiagramOptions) -> Self {
        Self {
            registry: AdapterRegistry::with_default_adapters(),
            options,
        }
    }

    /// Replace the adapter registry
    pub fn with_registry(mut self, registry: AdapterRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn options(&self) -> &DiagramOptions {
        &self.options
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Build the class model of `snapshot`
    pub fn build_model(&self, snapshot: Snapshot) -> Result<Application> {
        let model_span = span!(Level::INFO, "build_model", classes = snapshot.classes.len());
        let _enter = model_span.enter();

        let adapter = self
            .registry
            .adapter_for(Some(&self.options.model.model_type), snapshot)?;
        debug!(ecosystem = adapter.ecosystem(), "Using adapter");

        let application = build_application(adapter.as_ref())?;
        info!(
            application = application.name(),
            classes = application.klasses().len(),
            relationships = application.relationships().len(),
            "Class model built"
        );
        Ok(application)
    }

    /// Flatten the class model of `snapshot` for export
    pub fn build_database(&self, snapshot: Snapshot) -> Result<DiagramDatabase> {
        let application = self.build_model(snapshot)?;
        Ok(DiagramDatabase::from_model(&application, &self.options.diagram)?)
    }

    /// Export `database` with the configured exporter
    ///
    /// Returns the rendered text and the exporter's native format.
    pub fn export(&self, database: &DiagramDatabase) -> Result<(String, &'static str)> {
        let diagram_type = self.options.diagram.diagram_type;
        let export_span = span!(Level::INFO, "export", exporter = %diagram_type);
        let _enter = export_span.enter();

        let (output, format) = match diagram_type {
            DiagramType::Graphviz => export_with(&GraphvizExporter::new(), database)?,
            DiagramType::Debug => export_with(&DebugExporter::new(), database)?,
            DiagramType::Ascii => export_with(&AsciiExporter::new(), database)?,
        };
        debug!(output_len = output.len(), "Export completed");
        Ok((output, format))
    }

    /// Run the pipeline and return the exported text
    pub fn render(&self, snapshot: Snapshot) -> Result<String> {
        let database = self.build_database(snapshot)?;
        Ok(self.export(&database)?.0)
    }

    /// Run the pipeline and write the artifact; returns the path written
    pub fn generate(&self, snapshot: Snapshot) -> Result<PathBuf> {
        let process_span = span!(Level::INFO, "generate_diagram");
        let _enter = process_span.enter();

        let database = self.build_database(snapshot)?;
        let (output, format) = self.export(&database)?;
        write_artifact(&output, format, &self.options.diagram)
    }

    /// Read a snapshot file and run [`Orchestrator::generate`]
    pub fn generate_from_file(&self, path: &Path) -> Result<PathBuf> {
        let snapshot = read_snapshot(path)?;
        self.generate(snapshot)
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse the snapshot at `path`
pub fn read_snapshot(path: &Path) -> Result<Snapshot> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    Snapshot::from_json(&content).with_context(|| format!("Invalid snapshot {}", path.display()))
}

fn export_with<E>(exporter: &E, database: &DiagramDatabase) -> Result<(String, &'static str)>
where
    E: Exporter<DiagramDatabase, Output = String>,
{
    debug!(exporter = exporter.name(), "Exporting");
    Ok((exporter.export(database)?, exporter.format()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ModelError;

    const LIBRARY: &str = r#"{
        "application": "Library",
        "libraries": ["activerecord"],
        "classes": [
            { "name": "Author", "has_storage": true, "primary_key": "id",
              "fields": [{ "name": "id", "type": "integer" }, { "name": "name", "type": "string" }],
              "associations": [{ "kind": "has_many", "name": "books", "target": "Book" }] },
            { "name": "Book", "has_storage": true, "primary_key": "id",
              "fields": [{ "name": "id", "type": "integer" }, { "name": "author_id", "type": "integer" }],
              "associations": [{ "kind": "belongs_to", "name": "author", "target": "Author" }] }
        ]
    }"#;

    fn snapshot() -> Snapshot {
        Snapshot::from_json(LIBRARY).unwrap()
    }

    #[test]
    fn test_orchestrator_default() {
        let orchestrator = Orchestrator::default();
        assert_eq!(orchestrator.options().diagram.diagram_type, DiagramType::Graphviz);
        assert_eq!(orchestrator.registry().ecosystems(), vec!["active_record"]);
    }

    #[test]
    fn test_build_database() {
        let db = Orchestrator::new().build_database(snapshot()).unwrap();
        assert_eq!(db.application(), "Library");
        assert_eq!(db.classes().len(), 2);
        assert_eq!(db.relationships().len(), 1);
    }

    #[test]
    fn test_render_each_exporter() {
        for (diagram_type, marker) in [
            (DiagramType::Graphviz, "digraph \"Library\""),
            (DiagramType::Debug, "Application: Library"),
            (DiagramType::Ascii, "┌"),
        ] {
            let mut options = DiagramOptions::default();
            options.diagram.diagram_type = diagram_type;
            let output = Orchestrator::with_options(options).render(snapshot()).unwrap();
            assert!(output.contains(marker), "{} output: {}", diagram_type, output);
        }
    }

    #[test]
    fn test_unknown_ecosystem() {
        let mut options = DiagramOptions::default();
        options.model.model_type = "sequel".to_string();
        let err = Orchestrator::with_options(options).render(snapshot()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ModelError>(),
            Some(ModelError::UnknownEcosystem { .. })
        ));
    }

    #[test]
    fn test_generate_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = DiagramOptions::default();
        options.diagram.diagram_type = DiagramType::Debug;
        options.diagram.file = dir.path().join("library").to_string_lossy().into_owned();

        let path = Orchestrator::with_options(options).generate(snapshot()).unwrap();
        assert_eq!(path, dir.path().join("library.txt"));
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("association between Author and Book"));
    }

    #[test]
    fn test_generate_from_missing_file() {
        let err = Orchestrator::new()
            .generate_from_file(Path::new("/nonexistent/snapshot.json"))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read snapshot"));
    }
}
