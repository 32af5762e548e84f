pub mod ids;
pub mod region;
pub mod row;
pub mod row_group;

pub use ids::{BlockId, CollectionId, FragmentId};
pub use region::{MarkerIndicator, MarkerIndicatorRegion, PageAreaAlignment, RenameFallbackRule};
pub use row::{Alignment, MarginText, Marker, Row};
pub use row_group::{RowGroup, RowGroupBuilder, VerticalAlignment, VerticalSpacing};
