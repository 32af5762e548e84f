use crate::sheet::DocumentSpace;
use itertools::Itertools;
use sheetflow_types::{BlockId, Marker, PageAreaAlignment, Row};

/// One page of output: flow rows plus the page area.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    rows: Vec<Row>,
    area_before: Vec<Row>,
    area_items: Vec<Row>,
    area_after: Vec<Row>,
    page_area_alignment: PageAreaAlignment,
    flow_height: f32,
    flow_used: f32,
    identifiers: Vec<BlockId>,
    markers: Vec<Marker>,
    avoid_volume_break_after: Option<u32>,
    allows_volume_break: bool,
    keep_with_next_sheets: usize,
    keep_with_previous_sheets: usize,
    page_number: usize,
    ordinal: usize,
    space: DocumentSpace,
    sequence: usize,
    master: String,
}

impl Page {
    pub fn new(
        master: impl Into<String>,
        flow_height: f32,
        space: DocumentSpace,
        sequence: usize,
        page_number: usize,
        ordinal: usize,
    ) -> Self {
        Self {
            rows: Vec::new(),
            area_before: Vec::new(),
            area_items: Vec::new(),
            area_after: Vec::new(),
            page_area_alignment: PageAreaAlignment::default(),
            flow_height,
            flow_used: 0.0,
            identifiers: Vec::new(),
            markers: Vec::new(),
            avoid_volume_break_after: None,
            allows_volume_break: true,
            keep_with_next_sheets: 0,
            keep_with_previous_sheets: 0,
            page_number,
            ordinal,
            space,
            sequence,
            master: master.into(),
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Page area rows: `before`, the items, then `after`.
    pub fn page_area_rows(&self) -> impl Iterator<Item = &Row> {
        self.area_before
            .iter()
            .chain(&self.area_items)
            .chain(&self.area_after)
    }

    /// All rows in reading order, with the page area placed per its alignment.
    pub fn all_rows(&self) -> Vec<&Row> {
        match self.page_area_alignment {
            PageAreaAlignment::Top => self.page_area_rows().chain(&self.rows).collect(),
            PageAreaAlignment::Bottom => self.rows.iter().chain(self.page_area_rows()).collect(),
        }
    }

    /// Row contents in reading order, one line per row, with margins.
    pub fn text(&self) -> String {
        self.all_rows()
            .into_iter()
            .map(|row| format!("{}{}{}", row.left_margin.text, row.chars, row.right_margin.text))
            .join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// True if nothing at all, not even an identifier, was placed on this page.
    pub fn is_blank(&self) -> bool {
        self.rows.is_empty() && self.area_items.is_empty() && self.identifiers.is_empty()
    }

    pub fn flow_height(&self) -> f32 {
        self.flow_height
    }

    /// Flow space used, counting the full height of every row.
    pub fn flow_used(&self) -> f32 {
        self.flow_used
    }

    pub fn page_area_height(&self) -> f32 {
        self.page_area_rows().map(Row::height).sum()
    }

    pub fn has_page_area_items(&self) -> bool {
        !self.area_items.is_empty()
    }

    /// Space taken on the page, ignoring the trailing gap of the last flow row.
    pub fn space_used(&self) -> f32 {
        let trailing = self.rows.last().map(|r| r.height() - r.last_height()).unwrap_or(0.0);
        self.flow_used - trailing + self.page_area_height()
    }

    /// Flow space left for new content, given the current page area.
    pub fn remaining(&self) -> f32 {
        (self.flow_height - self.flow_used - self.page_area_height()).max(0.0)
    }

    pub(crate) fn add_row(&mut self, row: Row) {
        self.flow_used += row.height();
        self.rows.push(row);
    }

    pub(crate) fn add_page_area_item(
        &mut self,
        rows: impl IntoIterator<Item = Row>,
        before: &[Row],
        after: &[Row],
        alignment: PageAreaAlignment,
    ) {
        if self.area_items.is_empty() {
            self.area_before = before.to_vec();
            self.area_after = after.to_vec();
            self.page_area_alignment = alignment;
        }
        self.area_items.extend(rows);
    }

    pub(crate) fn add_identifier(&mut self, id: BlockId) {
        if !self.identifiers.contains(&id) {
            self.identifiers.push(id);
        }
    }

    pub(crate) fn add_markers(&mut self, markers: &[Marker]) {
        self.markers.extend(markers.iter().cloned());
    }

    pub(crate) fn keep_with_next(&mut self, sheets: usize) {
        self.keep_with_next_sheets = self.keep_with_next_sheets.max(sheets);
    }

    pub(crate) fn keep_with_previous(&mut self, sheets: usize) {
        self.keep_with_previous_sheets = self.keep_with_previous_sheets.max(sheets);
    }

    pub(crate) fn set_avoid_volume_break_after(&mut self, priority: Option<u32>) {
        self.avoid_volume_break_after = priority;
    }

    pub(crate) fn set_allows_volume_break(&mut self, allows: bool) {
        self.allows_volume_break = allows;
    }

    pub fn identifiers(&self) -> &[BlockId] {
        &self.identifiers
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn avoid_volume_break_after(&self) -> Option<u32> {
        self.avoid_volume_break_after
    }

    pub fn allows_volume_break(&self) -> bool {
        self.allows_volume_break
    }

    pub fn keep_with_next_sheets(&self) -> usize {
        self.keep_with_next_sheets
    }

    pub fn keep_with_previous_sheets(&self) -> usize {
        self.keep_with_previous_sheets
    }

    pub fn page_number(&self) -> usize {
        self.page_number
    }

    /// Position of this page among all pages of its document space, from 0.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn space(&self) -> DocumentSpace {
        self.space
    }

    pub fn sequence(&self) -> usize {
        self.sequence
    }

    pub fn master(&self) -> &str {
        &self.master
    }
}
