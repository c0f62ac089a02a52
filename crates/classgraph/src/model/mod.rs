//! Class model
//!
//! The entity contracts and the reflected implementation built from adapter
//! facts: classes, attributes, links, relationships and the generalization
//! hierarchy. The `simple` module holds plain data versions of every entity.

mod application;
mod attribute;
mod contract;
mod hierarchy;
mod klass;
mod link;
mod relationship;
pub mod simple;

pub use application::{build_application, Application};
pub use attribute::{build_attributes, Attribute, TIMESTAMP_COLUMNS};
pub use contract::*;
pub use hierarchy::resolve_root_and_depth;
pub use klass::{Klass, KlassId, KlassIndex};
pub use link::{build_links, Link, STRUCTURAL_SORT_KEY};
pub use relationship::{merge_into_relationships, Relationship};
