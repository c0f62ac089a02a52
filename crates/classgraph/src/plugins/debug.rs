//! Plain-text exporter
//!
//! Lists classes with their attribute labels, then every relationship
//! description. Handy for checking what the model builder produced.

use anyhow::Result;
use std::fmt::Write;

use super::database::DiagramDatabase;
use crate::core::Exporter;

/// Plain-text enumeration of a diagram
pub struct DebugExporter;

impl DebugExporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DebugExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter<DiagramDatabase> for DebugExporter {
    type Output = String;

    fn export(&self, database: &DiagramDatabase) -> Result<String> {
        let mut out = String::new();
        writeln!(out, "Application: {}", database.application())?;
        writeln!(out)?;
        writeln!(out, "Classes:")?;
        writeln!(out)?;
        for class in database.classes() {
            let marker = match (class.is_abstract, class.is_virtual) {
                (_, true) => " (virtual)",
                (true, false) => " (abstract)",
                (false, false) => "",
            };
            writeln!(out, "  {}{}", class.name, marker)?;
            for attribute in &class.attributes {
                writeln!(out, "    {}", attribute.label)?;
            }
            for operation in &class.operations {
                writeln!(out, "    {}", operation)?;
            }
            writeln!(out)?;
        }
        writeln!(out, "Relationships:")?;
        writeln!(out)?;
        for relationship in database.relationships() {
            writeln!(out, "    {}", relationship.description)?;
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "debug"
    }

    fn format(&self) -> &'static str {
        "txt"
    }
}
