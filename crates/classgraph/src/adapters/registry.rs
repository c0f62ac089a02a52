//! Ecosystem adapter registry
//!
//! Maps ecosystem names to adapter factories and the detectors used to pick
//! one when the configured model type is `auto`. Registration order is the
//! detection order.

use indexmap::IndexMap;
use tracing::{debug, info, span, trace, warn, Level};

use super::{ActiveRecordDetector, ReflectionAdapter, Snapshot, SnapshotAdapter};
use crate::core::{Detector, ModelError, ModelResult};

/// Builds an adapter for one ecosystem from a parsed snapshot
pub type AdapterFactory = Box<dyn Fn(Snapshot) -> Box<dyn ReflectionAdapter>>;

struct Entry {
    detector: Box<dyn Detector>,
    factory: AdapterFactory,
}

/// Registry of supported object-relational ecosystems
pub struct AdapterRegistry {
    entries: IndexMap<String, Entry>,
}

impl AdapterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Create a registry with every built-in ecosystem
    pub fn with_default_adapters() -> Self {
        let mut registry = Self::new();
        registry.register(
            Box::new(ActiveRecordDetector::new()),
            Box::new(|snapshot| {
                Box::new(SnapshotAdapter::new("active_record", snapshot)) as Box<dyn ReflectionAdapter>
            }),
        );
        registry
    }

    /// Register an ecosystem under its detector's name
    pub fn register(&mut self, detector: Box<dyn Detector>, factory: AdapterFactory) {
        let name = detector.ecosystem().to_string();
        debug!(ecosystem = %name, "Registering adapter");
        self.entries.insert(name, Entry { detector, factory });
    }

    /// Registered ecosystem names, in registration order
    pub fn ecosystems(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Name of the ecosystem to use for `snapshot`
    ///
    /// `requested` is the configured model type; `auto` (or nothing) runs the
    /// detectors over the snapshot's environment.
    pub fn resolve(&self, requested: Option<&str>, snapshot: &Snapshot) -> ModelResult<String> {
        match requested {
            Some(name) if name != "auto" => {
                if self.entries.contains_key(name) {
                    Ok(name.to_string())
                } else {
                    Err(ModelError::UnknownEcosystem {
                        name: name.to_string(),
                    })
                }
            }
            _ => self.detect(snapshot),
        }
    }

    fn detect(&self, snapshot: &Snapshot) -> ModelResult<String> {
        let detect_span = span!(Level::INFO, "detect_ecosystem");
        let _enter = detect_span.enter();

        let environment = snapshot.environment();
        for (name, entry) in &self.entries {
            let confidence = entry.detector.confidence(&environment);
            trace!(ecosystem = %name, confidence, "Checking detector");
            if entry.detector.detect(&environment) {
                info!(ecosystem = %name, confidence, "Detected ecosystem");
                return Ok(name.clone());
            }
        }

        warn!("No supported ecosystem detected");
        Err(ModelError::NoEcosystemDetected)
    }

    /// Build the adapter for `snapshot`
    pub fn adapter_for(
        &self,
        requested: Option<&str>,
        snapshot: Snapshot,
    ) -> ModelResult<Box<dyn ReflectionAdapter>> {
        let name = self.resolve(requested, &snapshot)?;
        let entry = self
            .entries
            .get(&name)
            .ok_or(ModelError::UnknownEcosystem { name })?;
        Ok((entry.factory)(snapshot))
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::with_default_adapters()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::Environment;

    struct MongoidDetector;

    impl Detector for MongoidDetector {
        fn detect(&self, environment: &Environment) -> bool {
            environment.has_library("mongoid")
        }

        fn confidence(&self, environment: &Environment) -> f64 {
            if self.detect(environment) {
                1.0
            } else {
                0.0
            }
        }

        fn ecosystem(&self) -> &'static str {
            "mongoid"
        }

        fn patterns(&self) -> Vec<&'static str> {
            vec!["mongoid"]
        }
    }

    fn snapshot_with(libraries: &[&str]) -> Snapshot {
        Snapshot {
            application: Some("App".to_string()),
            libraries: libraries.iter().map(|l| l.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_registry() {
        let registry = AdapterRegistry::with_default_adapters();
        assert_eq!(registry.ecosystems(), vec!["active_record"]);
    }

    #[test]
    fn test_auto_detection() {
        let registry = AdapterRegistry::with_default_adapters();
        let snapshot = snapshot_with(&["activerecord"]);
        assert_eq!(registry.resolve(Some("auto"), &snapshot).unwrap(), "active_record");
        assert_eq!(registry.resolve(None, &snapshot).unwrap(), "active_record");
    }

    #[test]
    fn test_auto_detection_fails_without_ecosystem() {
        let registry = AdapterRegistry::with_default_adapters();
        let err = registry.resolve(None, &snapshot_with(&["sinatra"])).unwrap_err();
        assert!(matches!(err, ModelError::NoEcosystemDetected));
    }

    #[test]
    fn test_explicit_ecosystem_skips_detection() {
        let registry = AdapterRegistry::with_default_adapters();
        let snapshot = snapshot_with(&[]);
        assert_eq!(registry.resolve(Some("active_record"), &snapshot).unwrap(), "active_record");

        let err = registry.resolve(Some("data_mapper"), &snapshot).unwrap_err();
        assert!(err.to_string().contains("data_mapper"));
    }

    #[test]
    fn test_detection_follows_registration_order() {
        let mut registry = AdapterRegistry::with_default_adapters();
        registry.register(
            Box::new(MongoidDetector),
            Box::new(|snapshot| {
                Box::new(SnapshotAdapter::new("mongoid", snapshot)) as Box<dyn ReflectionAdapter>
            }),
        );
        let snapshot = snapshot_with(&["mongoid"]);
        let adapter = registry.adapter_for(None, snapshot).unwrap();
        assert_eq!(adapter.ecosystem(), "mongoid");

        let both = snapshot_with(&["mongoid", "activerecord"]);
        assert_eq!(registry.resolve(None, &both).unwrap(), "active_record");
    }
}
