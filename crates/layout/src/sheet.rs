use crate::page::Page;
use crate::split::SplitUnit;
use serde::{Deserialize, Serialize};
use sheetflow_types::FragmentId;

/// The part of the document a sheet belongs to. Pre- and post-content are repeated per
/// volume, the body is not.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum DocumentSpace {
    #[default]
    Body,
    PreContent,
    PostContent,
}

/// Identifies a sheet across passes. Ordinals are contiguous within a space.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SheetIdentity {
    pub space: DocumentSpace,
    /// Volume for pre/post content; `None` in the body.
    pub volume: Option<usize>,
    pub ordinal: usize,
}

impl SheetIdentity {
    pub fn body(ordinal: usize) -> Self {
        Self {
            space: DocumentSpace::Body,
            volume: None,
            ordinal,
        }
    }
}

/// One physical sheet: a single page (simplex) or a front and back page (duplex).
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pages: Vec<Page>,
    identity: SheetIdentity,
    breakable: bool,
    avoid_volume_break_after: Option<u32>,
}

impl Sheet {
    pub fn new(
        identity: SheetIdentity,
        pages: Vec<Page>,
        breakable: bool,
        avoid_volume_break_after: Option<u32>,
    ) -> Self {
        assert!(pages.len() <= 2, "A sheet holds at most two pages, got {}", pages.len());
        Self {
            pages,
            identity,
            breakable,
            avoid_volume_break_after,
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn identity(&self) -> &SheetIdentity {
        &self.identity
    }

    /// True if a volume may end after this sheet.
    pub fn breakable(&self) -> bool {
        self.breakable
    }

    pub fn avoid_volume_break_after(&self) -> Option<u32> {
        self.avoid_volume_break_after
    }
}

impl SplitUnit for Sheet {
    fn is_breakable(&self) -> bool {
        self.breakable
    }

    fn is_skippable(&self) -> bool {
        self.pages.is_empty()
    }

    fn is_collapsible(&self) -> bool {
        self.pages.is_empty()
    }

    fn unit_size(&self) -> f32 {
        1.0
    }

    fn last_unit_size(&self) -> f32 {
        1.0
    }

    fn collapses_with(&self, other: &Self) -> bool {
        self.is_collapsible() && other.is_collapsible()
    }

    fn supplementary_ids(&self) -> &[FragmentId] {
        &[]
    }

    fn break_cost(&self) -> u32 {
        self.avoid_volume_break_after.unwrap_or(0)
    }
}
