//! Core error types for model building
//!
//! Every failure in the model pipeline is a binding failure: a fact the
//! adapter should have supplied is missing, or a name does not resolve to a
//! known class. None of them are recoverable by retrying.

use thiserror::Error;

/// Errors raised while building, resolving, or exporting a class model
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Binding error: class '{class}' is missing required fact '{fact}'")]
    MissingFact { class: String, fact: String },

    #[error("Binding error: {context} refers to unknown class '{name}'")]
    UnresolvedClass { name: String, context: String },

    #[error("Binding error: class '{name}' is declared more than once")]
    DuplicateClass { name: String },

    #[error("Binding error: superclass chain of '{class}' is cyclic")]
    HierarchyCycle { class: String },

    #[error("Binding error: {entity} has no capability named '{capability}'")]
    UnknownCapability { entity: String, capability: String },

    #[error("Binding error: invalid value for {entity}: {message}")]
    InvalidEntity { entity: String, message: String },

    #[error("Couldn't auto-detect object mapper ecosystem")]
    NoEcosystemDetected,

    #[error("Unknown object mapper ecosystem: {name}")]
    UnknownEcosystem { name: String },

    #[error("Unknown diagram type: {diagram_type}")]
    UnknownDiagramType { diagram_type: String },

    #[error("Export error: {message}")]
    ExportError { message: String },

    #[error("Snapshot error: {source}")]
    SnapshotError {
        #[from]
        source: serde_json::Error,
    },

    #[error("IO error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl ModelError {
    /// Create a missing-fact binding error
    pub fn missing_fact(class: impl Into<String>, fact: impl Into<String>) -> Self {
        Self::MissingFact {
            class: class.into(),
            fact: fact.into(),
        }
    }

    /// Create an unresolved-name binding error
    pub fn unresolved(name: impl Into<String>, context: impl Into<String>) -> Self {
        Self::UnresolvedClass {
            name: name.into(),
            context: context.into(),
        }
    }

    /// Create an export error
    pub fn export_error(message: impl Into<String>) -> Self {
        Self::ExportError {
            message: message.into(),
        }
    }

    /// Returns true for errors caused by facts that don't bind to the model
    pub fn is_binding_error(&self) -> bool {
        matches!(
            self,
            ModelError::MissingFact { .. }
                | ModelError::UnresolvedClass { .. }
                | ModelError::DuplicateClass { .. }
                | ModelError::HierarchyCycle { .. }
                | ModelError::UnknownCapability { .. }
                | ModelError::InvalidEntity { .. }
        )
    }
}

/// Result alias for model operations
pub type ModelResult<T> = std::result::Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fact() {
        let error = ModelError::missing_fact("Book", "primary key");
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Binding error"));
        assert!(error_msg.contains("Book"));
        assert!(error_msg.contains("primary key"));
        assert!(error.is_binding_error());
    }

    #[test]
    fn test_unresolved_class() {
        let error = ModelError::unresolved("Membership", "through option of Group#users");
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Membership"));
        assert!(error_msg.contains("Group#users"));
    }

    #[test]
    fn test_no_ecosystem_detected() {
        let error = ModelError::NoEcosystemDetected;
        assert!(error.to_string().contains("auto-detect"));
        assert!(!error.is_binding_error());
    }

    #[test]
    fn test_io_error_conversion() {
        use std::io;
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: ModelError = io_err.into();
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("IO error"));
        assert!(error_msg.contains("File not found"));
    }
}
