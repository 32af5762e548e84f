//! Page template descriptors shared by configuration and the collaborator traits.

use crate::ids::CollectionId;
use serde::{Deserialize, Serialize};

/// Maps a marker name to the text shown in a margin region when the marker is present.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MarkerIndicator {
    pub marker: String,
    pub indicator: String,
}

/// A fixed-width strip in the left or right page margin showing marker indicators.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MarkerIndicatorRegion {
    pub width: usize,
    #[serde(default)]
    pub indicators: Vec<MarkerIndicator>,
}

impl MarkerIndicatorRegion {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            indicators: Vec::new(),
        }
    }

    pub fn with_indicator(mut self, marker: impl Into<String>, indicator: impl Into<String>) -> Self {
        self.indicators.push(MarkerIndicator {
            marker: marker.into(),
            indicator: indicator.into(),
        });
        self
    }
}

/// Where the page area is rendered relative to the flow.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PageAreaAlignment {
    Top,
    #[default]
    Bottom,
}

/// Moves the fragments of `collection` to `fallback` when the page area overflows.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RenameFallbackRule {
    pub collection: CollectionId,
    pub fallback: CollectionId,
}

impl RenameFallbackRule {
    pub fn new(collection: impl Into<CollectionId>, fallback: impl Into<CollectionId>) -> Self {
        Self {
            collection: collection.into(),
            fallback: fallback.into(),
        }
    }

    pub fn applies_to(&self, collection: &CollectionId) -> bool {
        &self.collection == collection
    }
}
