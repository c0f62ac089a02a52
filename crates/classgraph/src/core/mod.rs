//! Core abstractions for class model processing
//!
//! Error types, logging, the write-once derived-value cell, shared UML types,
//! configuration, and the traits that adapters and exporters plug into.

mod database;
mod detector;
mod error;
mod exporter;
pub mod logging;
mod memo;
mod options;
mod types;

pub use database::*;
pub use detector::*;
pub use error::*;
pub use exporter::*;
pub use logging::*;
pub use memo::*;
pub use options::*;
pub use types::*;
