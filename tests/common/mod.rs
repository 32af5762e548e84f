#![allow(dead_code)]

use sheetflow::{
    LayoutMaster, LayoutSequence, Page, PaginatedDocument, PaginationConfig, Paginator, PipelineError, Row, RowGroup,
    VecContentSource,
};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A group of `n` rows reading `{id}0`, `{id}1`, ... identified by `id`.
pub fn group(id: &str, n: usize) -> RowGroup {
    RowGroup::builder()
        .identifier(id)
        .rows((0..n).map(|i| Row::new(format!("{id}{i}"))))
        .build()
}

/// `count` one-row groups `p0`, `p1`, ...
pub fn single_rows(count: usize) -> Vec<RowGroup> {
    (0..count).map(|i| group(&format!("p{i}"), 1)).collect()
}

pub fn sequence(groups: Vec<RowGroup>) -> LayoutSequence {
    LayoutSequence::new("", VecContentSource::new(groups))
}

/// Default configuration whose default master has the given flow height.
pub fn config(flow_height: f32) -> PaginationConfig {
    PaginationConfig::default().with_master("default", LayoutMaster::new(flow_height, 28))
}

pub fn paginate(config: PaginationConfig, sequences: &[LayoutSequence]) -> Result<PaginatedDocument, PipelineError> {
    Paginator::builder().with_config(config).build()?.paginate(sequences)
}

pub fn all_pages(document: &PaginatedDocument) -> Vec<&Page> {
    document.volumes.iter().flat_map(|v| v.pages()).collect()
}

/// Flow text of every page.
pub fn page_chars(document: &PaginatedDocument) -> Vec<Vec<String>> {
    all_pages(document)
        .iter()
        .map(|p| p.rows().iter().map(|r| r.chars.clone()).collect())
        .collect()
}
