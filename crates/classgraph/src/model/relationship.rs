//! Merging links into diagram edges

use indexmap::IndexMap;
use tracing::{debug, span, warn, Level};

use super::klass::{Klass, KlassId};
use super::link::Link;
use super::{KlassModel, LinkModel, RelationshipModel};
use crate::core::ModelResult;

/// All links between one unordered pair of classes
#[derive(Debug)]
pub struct Relationship {
    links: Vec<Link>,
}

impl Relationship {
    /// Create a relationship from links sharing one endpoint pair
    ///
    /// The links are stable-sorted by kind so many-sided ends come first.
    fn new(mut links: Vec<Link>) -> ModelResult<Self> {
        links.sort_by_key(Link::sort_key);
        let relationship = Self { links };
        relationship.report_disagreement()?;
        Ok(relationship)
    }

    /// Warn when later links disagree with the first on type or through class
    ///
    /// Resolving the through class of every link also surfaces unresolvable
    /// through options as binding errors here, at build time.
    fn report_disagreement(&self) -> ModelResult<()> {
        let Some((first, rest)) = self.links.split_first() else {
            return Ok(());
        };
        let first_through = first.through()?.map(|k| k.id());
        for link in rest {
            let through = link.through()?.map(|k| k.id());
            if link.link_type() != first.link_type() || through != first_through {
                warn!(
                    source = first.source().name(),
                    target = first.target().name(),
                    kept = %first.link_type(),
                    ignored = %link.link_type(),
                    "Links of one relationship disagree; keeping the first"
                );
            }
        }
        Ok(())
    }
}

impl RelationshipModel for Relationship {
    type Klass = Klass;
    type Link = Link;

    fn links(&self) -> &[Link] {
        &self.links
    }
}

/// Group links by unordered endpoint pair, in first-appearance order
pub fn merge_into_relationships(links: Vec<Link>) -> ModelResult<Vec<Relationship>> {
    let merge_span = span!(Level::INFO, "merge_into_relationships", links = links.len());
    let _enter = merge_span.enter();

    let mut groups: IndexMap<(KlassId, KlassId), Vec<Link>> = IndexMap::new();
    for link in links {
        groups.entry(link.endpoints()).or_default().push(link);
    }

    let relationships = groups
        .into_values()
        .map(Relationship::new)
        .collect::<ModelResult<Vec<_>>>()?;
    debug!(count = relationships.len(), "Merged links into relationships");
    Ok(relationships)
}
