//! Shared fixtures for the layout unit tests.

use crate::config::{LayoutMaster, PaginationConfig};
use crate::crossref::CrossReferenceHandler;
use crate::page::Page;
use crate::pass::PassContext;
use crate::sequence::{LayoutSequence, PageSequenceBuilder};
use crate::FlowError;
use sheetflow_traits::{
    BlockContentSource, ContentError, InMemoryCollectionProvider, MarkerIndicatorResolver, VecContentSource,
};
use sheetflow_types::{Row, RowGroup};
use std::cell::RefCell;
use std::rc::Rc;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// `n` rows reading `{prefix}0`, `{prefix}1`, ...
pub fn rows(prefix: &str, n: usize) -> Vec<Row> {
    (0..n).map(|i| Row::new(format!("{prefix}{i}"))).collect()
}

/// A breakable group of `n` rows, identified by `id`.
pub fn group(id: &str, n: usize) -> RowGroup {
    RowGroup::builder().identifier(id).rows(rows(id, n)).build()
}

/// Default configuration with a duplex "default" master of the given flow height.
pub fn config(flow_height: f32) -> PaginationConfig {
    PaginationConfig::default().with_master("default", LayoutMaster::new(flow_height, 20))
}

pub fn sequence(groups: Vec<RowGroup>) -> LayoutSequence {
    LayoutSequence::new("default", VecContentSource::new(groups))
}

/// Owns the collaborators of a pass.
#[derive(Debug)]
pub struct Fixture {
    pub config: PaginationConfig,
    pub collections: InMemoryCollectionProvider,
    pub resolver: MarkerIndicatorResolver,
    pub registry: RefCell<CrossReferenceHandler>,
}

impl Fixture {
    pub fn new(config: PaginationConfig) -> Self {
        Self {
            config,
            collections: InMemoryCollectionProvider::new(),
            resolver: MarkerIndicatorResolver::new(),
            registry: RefCell::new(CrossReferenceHandler::new()),
        }
    }

    pub fn context(&self) -> PassContext<'_> {
        PassContext {
            config: &self.config,
            collections: &self.collections,
            resolver: &self.resolver,
            registry: &self.registry,
        }
    }

    /// Lays out `groups` as the first sequence of the document.
    pub fn pages(&self, groups: Vec<RowGroup>) -> Result<Vec<Page>, FlowError> {
        let sequence = sequence(groups);
        self.pages_of(&sequence)
    }

    pub fn pages_of(&self, sequence: &LayoutSequence) -> Result<Vec<Page>, FlowError> {
        let mut builder = PageSequenceBuilder::new(0, sequence, self.context(), 1, 0)?;
        let mut pages = Vec::new();
        while let Some(page) = builder.next_page()? {
            pages.push(page);
        }
        Ok(pages)
    }
}

/// Records every requested index.
#[derive(Debug)]
pub struct CountingSource {
    groups: Vec<RowGroup>,
    requests: Rc<RefCell<Vec<usize>>>,
}

impl CountingSource {
    pub fn new(groups: Vec<RowGroup>) -> (Self, Rc<RefCell<Vec<usize>>>) {
        let requests = Rc::new(RefCell::new(Vec::new()));
        let source = Self {
            groups,
            requests: Rc::clone(&requests),
        };
        (source, requests)
    }
}

impl BlockContentSource for CountingSource {
    fn row_group(&self, index: usize) -> Result<Option<RowGroup>, ContentError> {
        self.requests.borrow_mut().push(index);
        Ok(self.groups.get(index).cloned())
    }
}
