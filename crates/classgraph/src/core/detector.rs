//! Core detector trait for ecosystem identification
//!
//! This trait defines the interface for recognizing which object-relational
//! ecosystem an inspected application uses.

use crate::adapters::Environment;

/// Core trait for ecosystem detectors
///
/// A detector looks only at the [`Environment`] it is handed. The registry
/// asks each registered detector in turn when the model type is `auto`.
///
/// # Example
/// ```
/// use classgraph::adapters::{ActiveRecordDetector, Environment};
/// use classgraph::core::Detector;
///
/// let detector = ActiveRecordDetector::new();
/// assert!(detector.detect(&Environment::new(["activerecord"])));
/// ```
pub trait Detector {
    /// Detect if the environment uses this ecosystem
    fn detect(&self, environment: &Environment) -> bool;

    /// Get the confidence level of the detection (0.0 to 1.0)
    fn confidence(&self, environment: &Environment) -> f64;

    /// Get the ecosystem name
    fn ecosystem(&self) -> &'static str;

    /// Get the library names this detector looks for
    fn patterns(&self) -> Vec<&'static str>;
}
