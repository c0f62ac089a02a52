//! JSON reflection snapshots
//!
//! A snapshot is a reflection dump taken from a running application, e.g. by
//! a small script that walks `ActiveRecord::Base.descendants`. It lets the
//! model be built without the application process being present.
//!
//! ```json
//! {
//!   "application": "Library",
//!   "ecosystem": "active_record",
//!   "libraries": ["activerecord"],
//!   "classes": [
//!     { "name": "Author", "has_storage": true, "primary_key": "id",
//!       "fields": [{ "name": "id", "type": "integer" }],
//!       "associations": [{ "kind": "has_many", "name": "books", "target": "Book" }] }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::{AssociationFacts, ClassFacts, Environment, FieldFacts, ReflectionAdapter};
use crate::core::{Detector, ModelError, ModelResult};

/// A full application snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub application: Option<String>,
    /// Ecosystem that produced the dump, if the dumper recorded it
    #[serde(default)]
    pub ecosystem: Option<String>,
    /// Libraries loaded in the inspected application
    #[serde(default)]
    pub libraries: Vec<String>,
    #[serde(default)]
    pub classes: Vec<ClassSnapshot>,
}

/// One class of a snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassSnapshot {
    #[serde(flatten)]
    pub facts: ClassFacts,
    /// `None` when the dumper could not read the columns
    #[serde(default)]
    pub fields: Option<Vec<FieldFacts>>,
    #[serde(default)]
    pub associations: Vec<AssociationFacts>,
}

impl Snapshot {
    /// Parse a snapshot from JSON text
    pub fn from_json(input: &str) -> ModelResult<Self> {
        let snapshot: Snapshot = serde_json::from_str(input)?;
        debug!(classes = snapshot.classes.len(), "Parsed reflection snapshot");
        Ok(snapshot)
    }

    /// Capability discovery view of this snapshot
    pub fn environment(&self) -> Environment {
        let mut libraries = self.libraries.clone();
        if let Some(ecosystem) = &self.ecosystem {
            libraries.push(ecosystem.clone());
        }
        Environment::new(libraries)
    }

    fn class(&self, name: &str) -> ModelResult<&ClassSnapshot> {
        self.classes
            .iter()
            .find(|c| c.facts.name == name)
            .ok_or_else(|| ModelError::unresolved(name, "snapshot lookup"))
    }
}

/// Reflection adapter backed by an in-memory [`Snapshot`]
#[derive(Debug, Clone)]
pub struct SnapshotAdapter {
    ecosystem: String,
    snapshot: Snapshot,
}

impl SnapshotAdapter {
    pub fn new(ecosystem: impl Into<String>, snapshot: Snapshot) -> Self {
        Self {
            ecosystem: ecosystem.into(),
            snapshot,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

impl ReflectionAdapter for SnapshotAdapter {
    fn ecosystem(&self) -> &str {
        &self.ecosystem
    }

    fn application_name(&self) -> ModelResult<String> {
        self.snapshot
            .application
            .clone()
            .ok_or_else(|| ModelError::missing_fact("<application>", "application name"))
    }

    fn class_names(&self) -> Vec<String> {
        self.snapshot
            .classes
            .iter()
            .map(|c| c.facts.name.clone())
            .collect()
    }

    fn class_facts(&self, class: &str) -> ModelResult<ClassFacts> {
        Ok(self.snapshot.class(class)?.facts.clone())
    }

    fn fields(&self, class: &str) -> ModelResult<Vec<FieldFacts>> {
        let snapshot = self.snapshot.class(class)?;
        trace!(class, "Reading fields");
        snapshot
            .fields
            .clone()
            .ok_or_else(|| ModelError::missing_fact(class, "fields"))
    }

    fn associations(&self, class: &str) -> ModelResult<Vec<AssociationFacts>> {
        Ok(self.snapshot.class(class)?.associations.clone())
    }
}

/// Detects applications that load ActiveRecord
pub struct ActiveRecordDetector;

impl ActiveRecordDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ActiveRecordDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for ActiveRecordDetector {
    fn detect(&self, environment: &Environment) -> bool {
        self.confidence(environment) > 0.0
    }

    fn confidence(&self, environment: &Environment) -> f64 {
        if environment.has_library("active_record") {
            1.0
        } else if environment.has_library("rails") {
            0.5
        } else {
            0.0
        }
    }

    fn ecosystem(&self) -> &'static str {
        "active_record"
    }

    fn patterns(&self) -> Vec<&'static str> {
        vec!["activerecord", "active_record", "rails"]
    }
}
