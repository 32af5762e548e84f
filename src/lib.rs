//! Sheetflow paginates pre-measured rows into pages, duplex sheets and volumes.
//!
//! The layout algorithms live in `sheetflow-layout`; this crate drives them. A
//! [`Paginator`] runs layout passes, applies collection fallbacks when a page area
//! overflows, and repeats passes until sheet breakability settles.

pub mod error;
pub mod paginator;

pub use error::PipelineError;
pub use paginator::{PaginatedDocument, Paginator, PaginatorBuilder};

pub use sheetflow_layout::{
    CrossReferenceHandler, DocumentSpace, LayoutError, LayoutMaster, LayoutSequence, MarkerPosition, Page,
    PageAreaConfig, PaginationConfig, Sheet, SheetIdentity, Volume, VolumeConfig,
};
pub use sheetflow_traits::{
    BlockContentSource, CollectionProvider, InMemoryCollectionProvider, MarginRegionResolver,
    MarkerIndicatorResolver, VecContentSource,
};
pub use sheetflow_types::{
    BlockId, CollectionId, FragmentId, Marker, MarkerIndicatorRegion, RenameFallbackRule, Row, RowGroup,
    VerticalAlignment, VerticalSpacing,
};
