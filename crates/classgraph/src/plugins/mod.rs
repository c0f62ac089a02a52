//! Diagram plugins
//!
//! The diagram database every exporter reads, the exporters themselves, and
//! the orchestrator that runs a whole generation.

pub mod ascii;
pub mod database;
pub mod debug;
pub mod graphviz;
pub mod orchestrator;
pub mod output;

pub use ascii::*;
pub use database::*;
pub use debug::*;
pub use graphviz::*;
pub use orchestrator::*;
pub use output::*;
