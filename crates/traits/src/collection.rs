//! CollectionProvider trait for abstracting collection lookup and reassignment.
//!
//! Collections hold the fragments (notes, annotations, ...) that rows reference through
//! their anchors. A page area renders the fragments of one collection; when that area
//! overflows, the collection is moved to a fallback id and pagination starts over.

use sheetflow_types::{CollectionId, FragmentId, RenameFallbackRule, RowGroup};
use std::collections::HashMap;
use std::fmt::Debug;
use thiserror::Error;

/// Error type for collection operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollectionError {
    #[error("Collection not found: {0}")]
    UnknownCollection(CollectionId),

    #[error("No fallback rule defined for collection '{0}'")]
    NoFallbackRule(CollectionId),
}

/// A source of collection fragments.
///
/// # Implementations
///
/// - `InMemoryCollectionProvider`: fragments registered up front (always available)
pub trait CollectionProvider: Debug {
    /// Returns the row groups of one fragment, or `None` if the collection does not hold it.
    fn fragment(&self, collection: &CollectionId, fragment: &FragmentId) -> Option<&[RowGroup]>;

    /// Check if a collection exists under this id.
    fn contains(&self, collection: &CollectionId) -> bool;

    /// Removes `collection` and re-inserts its fragments under the fallback named by the
    /// first matching rule. Returns the fallback id.
    ///
    /// # Errors
    ///
    /// `CollectionError::NoFallbackRule` when no rule applies to `collection`.
    fn reassign(
        &mut self,
        collection: &CollectionId,
        rules: &[RenameFallbackRule],
    ) -> Result<CollectionId, CollectionError>;
}

/// An in-memory collection provider.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCollectionProvider {
    collections: HashMap<CollectionId, HashMap<FragmentId, Vec<RowGroup>>>,
}

impl InMemoryCollectionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fragment to a collection, creating the collection if needed.
    pub fn add(
        &mut self,
        collection: impl Into<CollectionId>,
        fragment: impl Into<FragmentId>,
        groups: Vec<RowGroup>,
    ) {
        self.collections
            .entry(collection.into())
            .or_default()
            .insert(fragment.into(), groups);
    }

    /// Number of fragments held under `collection`.
    pub fn fragment_count(&self, collection: &CollectionId) -> usize {
        self.collections.get(collection).map(HashMap::len).unwrap_or(0)
    }
}

impl CollectionProvider for InMemoryCollectionProvider {
    fn fragment(&self, collection: &CollectionId, fragment: &FragmentId) -> Option<&[RowGroup]> {
        self.collections
            .get(collection)
            .and_then(|c| c.get(fragment))
            .map(Vec::as_slice)
    }

    fn contains(&self, collection: &CollectionId) -> bool {
        self.collections.contains_key(collection)
    }

    fn reassign(
        &mut self,
        collection: &CollectionId,
        rules: &[RenameFallbackRule],
    ) -> Result<CollectionId, CollectionError> {
        let rule = rules
            .iter()
            .find(|r| r.applies_to(collection))
            .ok_or_else(|| CollectionError::NoFallbackRule(collection.clone()))?;

        let fragments = self
            .collections
            .remove(collection)
            .ok_or_else(|| CollectionError::UnknownCollection(collection.clone()))?;

        let target = self.collections.entry(rule.fallback.clone()).or_default();
        for (fragment, groups) in fragments {
            target.entry(fragment).or_insert(groups);
        }
        Ok(rule.fallback.clone())
    }
}
