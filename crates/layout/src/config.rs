//! Pagination configuration: layout masters, page areas and volume limits.

use crate::LayoutError;
use serde::{Deserialize, Serialize};
use sheetflow_types::{CollectionId, MarkerIndicatorRegion, PageAreaAlignment, RenameFallbackRule, Row};
use std::collections::HashMap;

pub const DEFAULT_MASTER: &str = "default";

fn default_master_name() -> String {
    DEFAULT_MASTER.to_string()
}

fn default_max_restarts() -> usize {
    8
}

fn default_max_iterations() -> usize {
    4
}

fn default_true() -> bool {
    true
}

/// Top-level configuration of a pagination run.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationConfig {
    /// Master used by sequences that do not name one.
    #[serde(default = "default_master_name")]
    pub default_master: String,
    #[serde(default)]
    pub layout_masters: HashMap<String, LayoutMaster>,
    #[serde(default)]
    pub volume: VolumeConfig,
    /// How many collection fallbacks may be applied before giving up.
    #[serde(default = "default_max_restarts")]
    pub max_restarts: usize,
    /// How many passes may be spent settling sheet breakability.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        let mut layout_masters = HashMap::new();
        layout_masters.insert(DEFAULT_MASTER.to_string(), LayoutMaster::default());
        Self {
            default_master: default_master_name(),
            layout_masters,
            volume: VolumeConfig::default(),
            max_restarts: default_max_restarts(),
            max_iterations: default_max_iterations(),
        }
    }
}

impl PaginationConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Adds or replaces a master.
    pub fn with_master(mut self, name: impl Into<String>, master: LayoutMaster) -> Self {
        self.layout_masters.insert(name.into(), master);
        self
    }

    pub fn with_volume(mut self, volume: VolumeConfig) -> Self {
        self.volume = volume;
        self
    }

    /// Looks up a master by name. An empty name selects the default master.
    pub fn master(&self, name: &str) -> Result<&LayoutMaster, LayoutError> {
        let name = if name.is_empty() { self.default_master.as_str() } else { name };
        self.layout_masters
            .get(name)
            .ok_or_else(|| LayoutError::UnknownMaster(name.to_string()))
    }
}

/// Page template: flow dimensions, sidedness, page area and margin regions.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LayoutMaster {
    /// Maximum rows of flow content per page.
    pub flow_height: f32,
    pub flow_width: usize,
    #[serde(default = "default_true")]
    pub duplex: bool,
    #[serde(default)]
    pub page_area: Option<PageAreaConfig>,
    #[serde(default)]
    pub left_region: Option<MarkerIndicatorRegion>,
    #[serde(default)]
    pub right_region: Option<MarkerIndicatorRegion>,
}

impl Default for LayoutMaster {
    fn default() -> Self {
        Self {
            flow_height: 25.0,
            flow_width: 40,
            duplex: true,
            page_area: None,
            left_region: None,
            right_region: None,
        }
    }
}

impl LayoutMaster {
    pub fn new(flow_height: f32, flow_width: usize) -> Self {
        Self {
            flow_height,
            flow_width,
            ..Default::default()
        }
    }

    pub fn simplex(mut self) -> Self {
        self.duplex = false;
        self
    }

    pub fn with_page_area(mut self, page_area: PageAreaConfig) -> Self {
        self.page_area = Some(page_area);
        self
    }

    pub fn with_left_region(mut self, region: MarkerIndicatorRegion) -> Self {
        self.left_region = Some(region);
        self
    }

    pub fn with_right_region(mut self, region: MarkerIndicatorRegion) -> Self {
        self.right_region = Some(region);
        self
    }

    pub fn pages_per_sheet(&self) -> usize {
        if self.duplex { 2 } else { 1 }
    }
}

/// A page area renders the fragments of one collection referenced from the page's flow.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageAreaConfig {
    pub collection: CollectionId,
    pub max_height: f32,
    #[serde(default)]
    pub alignment: PageAreaAlignment,
    /// Rows placed before the first item, e.g. a separator line.
    #[serde(default)]
    pub before: Vec<Row>,
    #[serde(default)]
    pub after: Vec<Row>,
    #[serde(default)]
    pub fallback: Vec<RenameFallbackRule>,
}

impl PageAreaConfig {
    pub fn new(collection: impl Into<CollectionId>, max_height: f32) -> Self {
        Self {
            collection: collection.into(),
            max_height,
            alignment: PageAreaAlignment::default(),
            before: Vec::new(),
            after: Vec::new(),
            fallback: Vec::new(),
        }
    }

    pub fn with_before(mut self, rows: Vec<Row>) -> Self {
        self.before = rows;
        self
    }

    pub fn with_after(mut self, rows: Vec<Row>) -> Self {
        self.after = rows;
        self
    }

    pub fn with_fallback(mut self, rule: RenameFallbackRule) -> Self {
        self.fallback.push(rule);
        self
    }

    /// Height taken by the `before` and `after` rows once the area holds an item.
    pub fn overhead(&self) -> f32 {
        self.before.iter().chain(&self.after).map(Row::height).sum()
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.iter().any(|rule| rule.applies_to(&self.collection))
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VolumeConfig {
    /// Maximum sheets per volume.
    pub max_sheets: usize,
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self { max_sheets: 50 }
    }
}
