//! Core exporter trait for diagram output
//!
//! This trait defines the interface for turning a diagram database into a
//! rendered artifact (plain text, DOT source, box drawings).

use anyhow::Result;

use super::Database;

/// Core trait for diagram exporters
///
/// # Example
/// ```
/// use classgraph::core::Exporter;
/// use classgraph::plugins::{DebugExporter, DiagramDatabase};
///
/// let db = DiagramDatabase::new("Empty");
/// let exporter = DebugExporter::new();
/// let output = exporter.export(&db).unwrap();
/// assert!(output.contains("Application: Empty"));
/// ```
pub trait Exporter<D: Database> {
    /// The output type of this exporter
    type Output;

    /// Export the diagram database into the output format
    fn export(&self, database: &D) -> Result<Self::Output>;

    /// Get the name of this exporter
    fn name(&self) -> &'static str;

    /// Get the default file format (extension) of the output
    fn format(&self) -> &'static str;
}
