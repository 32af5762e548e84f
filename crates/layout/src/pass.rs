//! One complete layout pass, from content to volumes.

use crate::config::PaginationConfig;
use crate::crossref::CrossReferenceHandler;
use crate::sequence::LayoutSequence;
use crate::sheet_source::SheetDataSource;
use crate::volume::{Volume, VolumeSplitter};
use crate::{FlowError, LayoutError, RestartRequest};
use log::{info, warn};
use sheetflow_traits::{CollectionProvider, MarginRegionResolver};
use std::cell::RefCell;

/// Collaborators shared by everything running inside one pass.
#[derive(Debug, Clone, Copy)]
pub struct PassContext<'a> {
    pub config: &'a PaginationConfig,
    pub collections: &'a dyn CollectionProvider,
    pub resolver: &'a dyn MarginRegionResolver,
    pub registry: &'a RefCell<CrossReferenceHandler>,
}

#[derive(Debug)]
pub enum PassOutcome {
    Complete(Vec<Volume>),
    /// The pass was abandoned; apply the fallback and run again.
    Restart(RestartRequest),
}

/// Lays out all sequences and splits the resulting sheets into volumes.
///
/// Restart requests raised anywhere inside the pass end up as
/// [`PassOutcome::Restart`]; only real failures are returned as errors.
pub fn run_pass(sequences: &[LayoutSequence], context: PassContext<'_>) -> Result<PassOutcome, LayoutError> {
    info!("Starting layout pass over {} sequence(s)", sequences.len());

    let sheets = SheetDataSource::new(sequences, context);
    match VolumeSplitter::new().split(sheets, &context.config.volume, context.registry) {
        Ok(volumes) => {
            info!("Layout pass complete: {} volume(s)", volumes.len());
            Ok(PassOutcome::Complete(volumes))
        }
        Err(FlowError::Restart(request)) => {
            warn!(
                "Layout pass abandoned on page {} of sequence {}: collection '{}' does not fit its page area",
                request.page, request.sequence, request.collection
            );
            Ok(PassOutcome::Restart(request))
        }
        Err(FlowError::Layout(e)) => Err(e),
    }
}
