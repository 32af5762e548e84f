use sheetflow_traits::{CollectionError, ContentError, MarginRegionError};
use sheetflow_types::{CollectionId, RenameFallbackRule};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error(
        "Unit '{identifier}' in sequence {sequence}, page {page} has a size of {size:.2} which exceeds the available space of {capacity:.2}."
    )]
    UnitTooLarge {
        sequence: usize,
        page: usize,
        size: f32,
        capacity: f32,
        identifier: String,
    },
    #[error(
        "Page area for collection '{collection}' needs {height:.2} rows on page {page} of sequence {sequence}, but at most {max_height:.2} are allowed and no fallback applies."
    )]
    PageAreaOverflow {
        collection: CollectionId,
        sequence: usize,
        page: usize,
        height: f32,
        max_height: f32,
    },
    #[error("Layout master not found: {0}")]
    UnknownMaster(String),
    #[error("Margin region error: {0}")]
    MarginRegion(#[from] MarginRegionError),
    #[error("Content error: {0}")]
    Content(#[from] ContentError),
    #[error("Collection error: {0}")]
    Collection(#[from] CollectionError),
    #[error("Generic layout error: {0}")]
    Generic(String),
}

/// Asks the driver to move a collection to its fallback and lay the whole document out again.
#[derive(Debug, Clone, PartialEq)]
pub struct RestartRequest {
    pub collection: CollectionId,
    pub rules: Vec<RenameFallbackRule>,
    pub sequence: usize,
    pub page: usize,
}

/// The error channel of everything that runs inside a pass.
///
/// `Restart` is not a failure: it unwinds the pass so the driver can apply a fallback.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlowError {
    #[error("Restart requested for collection '{}' (sequence {}, page {})", .0.collection, .0.sequence, .0.page)]
    Restart(RestartRequest),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

impl From<ContentError> for FlowError {
    fn from(e: ContentError) -> Self {
        FlowError::Layout(e.into())
    }
}

impl From<MarginRegionError> for FlowError {
    fn from(e: MarginRegionError) -> Self {
        FlowError::Layout(e.into())
    }
}

pub mod config;
pub mod crossref;
pub mod page;
pub mod pass;
pub mod row_group;
pub mod sequence;
pub mod sheet;
pub mod sheet_source;
pub mod split;
pub mod volume;

pub use self::config::{LayoutMaster, PageAreaConfig, PaginationConfig, VolumeConfig};
pub use self::crossref::{CrossReferenceHandler, MarkerPosition, PageDetails, PageRange};
pub use self::page::Page;
pub use self::pass::{PassContext, PassOutcome, run_pass};
pub use self::sequence::{LayoutSequence, PageSequenceBuilder};
pub use self::sheet::{DocumentSpace, Sheet, SheetIdentity};
pub use self::sheet_source::SheetDataSource;
pub use self::split::handler::{SplitKind, SplitPoint, SplitPointHandler, SplitPointSpecification};
pub use self::split::source::{BufferedDataSource, SplitPointDataSource, UnitProducer};
pub use self::split::{NoSupplements, SplitOptions, SplitUnit, Supplements};
pub use self::volume::{Volume, VolumeSplitter};

#[cfg(test)]
mod test_utils;
