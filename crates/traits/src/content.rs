//! BlockContentSource trait: the index-addressable stream of row groups for one
//! layout sequence.

use sheetflow_types::RowGroup;
use std::fmt::Debug;
use thiserror::Error;

/// Error type for content production.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContentError {
    #[error("Row group {index} could not be produced: {message}")]
    Unavailable { index: usize, message: String },
}

/// Supplies the row groups of a layout sequence.
///
/// Requests must be free of side effects: pagination may ask for the same index again
/// after a restart, and expects the same group back.
pub trait BlockContentSource: Debug {
    /// Returns the group at `index`, or `None` past the end of the sequence.
    fn row_group(&self, index: usize) -> Result<Option<RowGroup>, ContentError>;
}

/// A content source backed by a vector of pre-built groups.
#[derive(Debug, Default, Clone)]
pub struct VecContentSource {
    groups: Vec<RowGroup>,
}

impl VecContentSource {
    pub fn new(groups: Vec<RowGroup>) -> Self {
        Self { groups }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl From<Vec<RowGroup>> for VecContentSource {
    fn from(groups: Vec<RowGroup>) -> Self {
        Self::new(groups)
    }
}

impl BlockContentSource for VecContentSource {
    fn row_group(&self, index: usize) -> Result<Option<RowGroup>, ContentError> {
        Ok(self.groups.get(index).cloned())
    }
}
