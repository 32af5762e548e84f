//! Assembles the row groups of one layout sequence into pages.

use crate::config::{LayoutMaster, PageAreaConfig};
use crate::crossref::{CrossReferenceHandler, PageDetails};
use crate::page::Page;
use crate::pass::PassContext;
use crate::sheet::DocumentSpace;
use crate::split::handler::{SplitKind, SplitPoint, SplitPointHandler};
use crate::split::source::{BufferedDataSource, SplitPointDataSource, UnitProducer};
use crate::split::{EPSILON, SplitOptions, Supplements};
use crate::{FlowError, LayoutError, RestartRequest};
use itertools::Itertools;
use log::{debug, trace};
use sheetflow_traits::{BlockContentSource, CollectionProvider, MarginRegionResolver};
use sheetflow_types::{BlockId, FragmentId, MarginText, MarkerIndicatorRegion, Row, RowGroup};
use std::cell::RefCell;
use std::rc::Rc;

/// Content flowed through a single layout master.
#[derive(Debug)]
pub struct LayoutSequence {
    /// Master name. Empty selects the configured default.
    pub master: String,
    /// Restart page numbering here instead of continuing from the previous sequence.
    pub initial_page_number: Option<usize>,
    pub space: DocumentSpace,
    pub content: Box<dyn BlockContentSource>,
}

impl LayoutSequence {
    pub fn new(master: impl Into<String>, content: impl BlockContentSource + 'static) -> Self {
        Self {
            master: master.into(),
            initial_page_number: None,
            space: DocumentSpace::Body,
            content: Box::new(content),
        }
    }

    pub fn with_initial_page_number(mut self, page_number: usize) -> Self {
        self.initial_page_number = Some(page_number);
        self
    }

    pub fn in_space(mut self, space: DocumentSpace) -> Self {
        self.space = space;
        self
    }
}

/// Reads groups from a content source, remembering the one looked at last.
struct ContentCursor<'a> {
    source: &'a dyn BlockContentSource,
    next_index: usize,
    peeked: Option<RowGroup>,
}

impl<'a> ContentCursor<'a> {
    fn new(source: &'a dyn BlockContentSource) -> Self {
        Self {
            source,
            next_index: 0,
            peeked: None,
        }
    }

    fn peek(&mut self) -> Result<Option<&RowGroup>, LayoutError> {
        if self.peeked.is_none() {
            self.peeked = self.source.row_group(self.next_index)?;
            if self.peeked.is_some() {
                self.next_index += 1;
            }
        }
        Ok(self.peeked.as_ref())
    }

    fn take(&mut self) -> Result<Option<RowGroup>, LayoutError> {
        self.peek()?;
        Ok(self.peeked.take())
    }

    /// Starts the next segment. Returns its lead and the first group of its flow.
    fn next_lead(&mut self) -> Result<Option<(SegmentLead, Option<RowGroup>)>, LayoutError> {
        let Some(group) = self.take()? else {
            return Ok(None);
        };
        if group.is_spacer() {
            return Ok(Some((SegmentLead::Spacing(group), None)));
        }
        let lead = if group.breaks_page_before() {
            SegmentLead::NewPage
        } else {
            SegmentLead::Flow
        };
        Ok(Some((lead, Some(group))))
    }
}

/// What happens before a segment's groups are flowed.
enum SegmentLead {
    Flow,
    /// Skip rows so the segment lands at the spacer's position.
    Spacing(RowGroup),
    /// The segment starts on a fresh page.
    NewPage,
}

/// Yields groups until the next spacer or page-break-before group.
struct SegmentProducer<'a> {
    cursor: Rc<RefCell<ContentCursor<'a>>>,
    first: Option<RowGroup>,
}

impl UnitProducer<RowGroup> for SegmentProducer<'_> {
    fn produce(&mut self) -> Result<Option<RowGroup>, FlowError> {
        if let Some(first) = self.first.take() {
            return Ok(Some(first));
        }
        let mut cursor = self.cursor.borrow_mut();
        match cursor.peek()? {
            Some(group) if !group.is_spacer() && !group.breaks_page_before() => {}
            _ => return Ok(None),
        }
        Ok(cursor.take()?)
    }
}

fn fragment_key(id: &FragmentId) -> BlockId {
    BlockId::new(id.as_str())
}

/// Collection fragments that may still be placed in the page area.
struct PageSupplements<'p> {
    area: Option<&'p PageAreaConfig>,
    collections: &'p dyn CollectionProvider,
    registry: &'p RefCell<CrossReferenceHandler>,
    overhead: f32,
}

impl Supplements<RowGroup> for PageSupplements<'_> {
    fn get(&self, id: &FragmentId) -> Option<Rc<RowGroup>> {
        let area = self.area?;
        // already placed on an earlier page
        if self.registry.borrow().page_number(&fragment_key(id)).is_some() {
            return None;
        }
        let groups = self.collections.fragment(&area.collection, id)?;
        Some(Rc::new(RowGroup::merged(groups)))
    }

    fn overhead(&self) -> f32 {
        self.overhead
    }
}

type GroupSource<'a> = BufferedDataSource<'a, RowGroup>;
type GroupSplit<'a> = SplitPoint<RowGroup, GroupSource<'a>>;

enum BuilderState {
    NewPageNeeded,
    Filling(Page),
    Done,
}

enum Fill {
    PageFull,
    ContentDone,
}

/// Produces the pages of one layout sequence on demand.
pub struct PageSequenceBuilder<'a> {
    index: usize,
    space: DocumentSpace,
    master_name: String,
    master: &'a LayoutMaster,
    collections: &'a dyn CollectionProvider,
    resolver: &'a dyn MarginRegionResolver,
    registry: &'a RefCell<CrossReferenceHandler>,
    cursor: Rc<RefCell<ContentCursor<'a>>>,
    segment: Option<GroupSource<'a>>,
    handler: SplitPointHandler,
    state: BuilderState,
    first_page_number: usize,
    next_page_number: usize,
    next_ordinal: usize,
    pages_emitted: usize,
}

impl<'a> PageSequenceBuilder<'a> {
    /// `page_number` is used unless the sequence sets its own initial page number;
    /// `ordinal` is the position of the first page within the document space.
    pub fn new(
        index: usize,
        sequence: &'a LayoutSequence,
        context: PassContext<'a>,
        page_number: usize,
        ordinal: usize,
    ) -> Result<Self, LayoutError> {
        let master = context.config.master(&sequence.master)?;
        let master_name = if sequence.master.is_empty() {
            context.config.default_master.clone()
        } else {
            sequence.master.clone()
        };
        let first_page_number = sequence.initial_page_number.unwrap_or(page_number);

        Ok(Self {
            index,
            space: sequence.space,
            master_name,
            master,
            collections: context.collections,
            resolver: context.resolver,
            registry: context.registry,
            cursor: Rc::new(RefCell::new(ContentCursor::new(sequence.content.as_ref()))),
            segment: None,
            handler: SplitPointHandler::new(),
            state: BuilderState::NewPageNeeded,
            first_page_number,
            next_page_number: first_page_number,
            next_ordinal: ordinal,
            pages_emitted: 0,
        })
    }

    pub fn master(&self) -> &'a LayoutMaster {
        self.master
    }

    pub fn space(&self) -> DocumentSpace {
        self.space
    }

    /// Page number the page after this sequence's last page gets.
    pub fn next_page_number(&self) -> usize {
        self.next_page_number
    }

    pub fn next_ordinal(&self) -> usize {
        self.next_ordinal
    }

    pub fn next_page(&mut self) -> Result<Option<Page>, FlowError> {
        loop {
            match std::mem::replace(&mut self.state, BuilderState::Done) {
                BuilderState::Done => return Ok(None),
                BuilderState::NewPageNeeded => {
                    let page = self.new_page();
                    self.state = BuilderState::Filling(page);
                }
                BuilderState::Filling(mut page) => match self.fill(&mut page)? {
                    Fill::PageFull => {
                        self.state = BuilderState::NewPageNeeded;
                        return Ok(Some(self.finish_page(page)));
                    }
                    Fill::ContentDone => {
                        let last = if page.is_blank() && self.pages_emitted > 0 {
                            self.next_page_number -= 1;
                            self.next_ordinal -= 1;
                            None
                        } else {
                            Some(self.finish_page(page))
                        };
                        self.finish_sequence();
                        return Ok(last);
                    }
                },
            }
        }
    }

    fn new_page(&mut self) -> Page {
        let page = Page::new(
            &self.master_name,
            self.master.flow_height,
            self.space,
            self.index,
            self.next_page_number,
            self.next_ordinal,
        );
        self.next_page_number += 1;
        self.next_ordinal += 1;
        page
    }

    fn finish_page(&mut self, page: Page) -> Page {
        self.registry.borrow_mut().keep_page_details(PageDetails {
            space: self.space,
            sequence: self.index,
            ordinal: page.ordinal(),
            page_number: page.page_number(),
            markers: page.markers().to_vec(),
        });
        self.pages_emitted += 1;
        debug!(
            "Finished page {} of sequence {} ({:.1} of {:.1} rows used)",
            page.page_number(),
            self.index,
            page.space_used(),
            page.flow_height()
        );
        page
    }

    fn finish_sequence(&mut self) {
        let last = self.next_page_number.saturating_sub(1).max(self.first_page_number);
        self.registry
            .borrow_mut()
            .set_sequence_scope(self.space, self.index, self.first_page_number, last);
        debug!("Sequence {} produced {} page(s)", self.index, self.pages_emitted);
    }

    fn fill(&mut self, page: &mut Page) -> Result<Fill, FlowError> {
        loop {
            let pending = match self.segment.take() {
                Some(data) if data.is_empty()? => None,
                other => other,
            };
            let data = match pending {
                Some(data) => data,
                None => {
                    let lead = self.cursor.borrow_mut().next_lead()?;
                    let Some((lead, first)) = lead else {
                        return Ok(Fill::ContentDone);
                    };
                    let data = BufferedDataSource::new(SegmentProducer {
                        cursor: Rc::clone(&self.cursor),
                        first,
                    });
                    match lead {
                        SegmentLead::Flow => {}
                        SegmentLead::NewPage => {
                            if !page.is_empty() {
                                self.segment = Some(data);
                                return Ok(Fill::PageFull);
                            }
                        }
                        SegmentLead::Spacing(spacer) => {
                            self.register_group(page, &spacer);
                            self.apply_spacing(page, &spacer, &data)?;
                        }
                    }
                    data
                }
            };
            if self.fill_from(page, data)? {
                return Ok(Fill::PageFull);
            }
        }
    }

    fn apply_spacing(&self, page: &mut Page, spacer: &RowGroup, data: &GroupSource<'a>) -> Result<(), FlowError> {
        let Some(spacing) = spacer.vertical_spacing() else {
            return Ok(());
        };
        let block: f32 = data.remaining()?.iter().map(|g| g.unit_size()).sum();
        let skip = spacing.skip_rows(page.flow_used(), block);
        let row_height = spacing.empty_row.height().max(EPSILON);
        let room = ((page.remaining() + EPSILON) / row_height).floor() as usize;
        let count = skip.min(room);
        trace!("Spacer skips {count} row(s) before a block of {block:.1}");
        for _ in 0..count {
            self.place_row(page, spacing.empty_row.clone())?;
        }
        Ok(())
    }

    /// Flows `data` into `page`. Returns true when the page is full.
    fn fill_from(&mut self, page: &mut Page, mut data: GroupSource<'a>) -> Result<bool, FlowError> {
        loop {
            if page.is_empty() {
                let (skipped, rest) = self.handler.skip_leading(&data)?;
                for group in &skipped {
                    self.register_group(page, group);
                }
                data = rest;
            }
            if data.is_empty()? {
                return Ok(false);
            }

            let area = self.master.page_area.as_ref();
            let overhead = match area {
                Some(area) if !page.has_page_area_items() => area.overhead(),
                _ => 0.0,
            };
            let supplements = PageSupplements {
                area,
                collections: self.collections,
                registry: self.registry,
                overhead,
            };
            let capacity = page.remaining();
            let options = SplitOptions::new().force(page.is_empty()).trim(true);

            let spec = self.handler.find(capacity, &data, &supplements, options)?;
            if spec.is_empty() {
                self.segment = Some(data);
                return Ok(true);
            }
            let split = self.handler.split(&spec, &data, &supplements)?;
            if split.forced {
                self.check_forced(page, &split, capacity, overhead)?;
            }
            self.commit(page, &split)?;
            data = split.tail;

            if spec.kind == SplitKind::All {
                return Ok(false);
            }
            if !page.is_empty() {
                self.segment = Some(data);
                return Ok(true);
            }
        }
    }

    /// A forced split may leave a unit that does not fit at all.
    fn check_forced(&self, page: &Page, split: &GroupSplit<'a>, capacity: f32, overhead: f32) -> Result<(), FlowError> {
        let Some(last) = split.head.last() else {
            return Ok(());
        };
        let flow: f32 = split.head.iter().map(|g| g.unit_size()).sum::<f32>() - last.unit_size()
            + last.last_unit_size();
        let supplements: f32 = split.supplements.iter().map(|(_, g)| g.unit_size()).sum();
        let total = if split.supplements.is_empty() {
            flow
        } else {
            flow + supplements + overhead
        };
        if total <= capacity + EPSILON {
            return Ok(());
        }

        if let Some(area) = self.master.page_area.as_ref() {
            if flow <= capacity + EPSILON && !split.supplements.is_empty() {
                let height = page.page_area_height() + supplements + overhead;
                return Err(self.page_area_overflow(page, area, height));
            }
        }
        let unit = &split.head[0];
        let identifier = unit
            .identifier()
            .map(|id| id.to_string())
            .or_else(|| unit.rows().first().map(|r| r.chars.clone()))
            .unwrap_or_default();
        Err(LayoutError::UnitTooLarge {
            sequence: self.index,
            page: page.page_number(),
            size: total,
            capacity,
            identifier,
        }
        .into())
    }

    fn restart_request(&self, page: &Page, area: &PageAreaConfig) -> RestartRequest {
        RestartRequest {
            collection: area.collection.clone(),
            rules: area.fallback.clone(),
            sequence: self.index,
            page: page.page_number(),
        }
    }

    fn commit(&self, page: &mut Page, split: &GroupSplit<'a>) -> Result<(), FlowError> {
        let runs = split.head.iter().chunk_by(|g| g.collapsible());
        for (collapsible, run) in &runs {
            let run: Vec<&Rc<RowGroup>> = run.collect();
            // a collapsed run keeps only the rows of its largest group
            let keep = if collapsible {
                run.iter()
                    .position_max_by(|a, b| a.unit_size().total_cmp(&b.unit_size()))
            } else {
                None
            };
            for (i, group) in run.iter().enumerate() {
                self.register_group(page, group);
                if !collapsible || keep == Some(i) {
                    for row in group.rows() {
                        self.place_row(page, row.clone())?;
                    }
                }
            }
        }
        for group in &split.discarded {
            self.register_group(page, group);
        }

        if let Some(area) = self.master.page_area.as_ref() {
            for (id, group) in &split.supplements {
                page.add_page_area_item(group.rows().iter().cloned(), &area.before, &area.after, area.alignment);
                let key = fragment_key(id);
                self.registry.borrow_mut().set_page_number(key.clone(), page.page_number());
                page.add_identifier(key);
            }
            if page.page_area_height() > area.max_height + EPSILON {
                return Err(self.page_area_overflow(page, area, page.page_area_height()));
            }
        }

        if let Some(last) = split.head.last() {
            page.set_avoid_volume_break_after(last.avoid_volume_break_after());
        }
        // the break follows the last consumed unit, discarded or not
        if let Some(last) = split.discarded.last().or(split.head.last()) {
            page.set_allows_volume_break(!split.forced && last.breakable());
        }
        Ok(())
    }

    fn page_area_overflow(&self, page: &Page, area: &PageAreaConfig, height: f32) -> FlowError {
        if area.has_fallback() {
            return FlowError::Restart(self.restart_request(page, area));
        }
        LayoutError::PageAreaOverflow {
            collection: area.collection.clone(),
            sequence: self.index,
            page: page.page_number(),
            height,
            max_height: area.max_height,
        }
        .into()
    }

    fn register_group(&self, page: &mut Page, group: &RowGroup) {
        if let Some(id) = group.identifier() {
            self.registry.borrow_mut().set_page_number(id.clone(), page.page_number());
            page.add_identifier(id.clone());
        }
        page.add_markers(group.markers());
        page.keep_with_next(group.keep_with_next_sheets());
        page.keep_with_previous(group.keep_with_previous_sheets());
    }

    fn place_row(&self, page: &mut Page, mut row: Row) -> Result<(), LayoutError> {
        if let Some(region) = &self.master.left_region {
            let text = self.region_text(&row, region)?;
            row.left_margin.prepend(&text);
        }
        if let Some(region) = &self.master.right_region {
            let text = self.region_text(&row, region)?;
            row.right_margin.append(&text);
        }
        page.add_row(row);
        Ok(())
    }

    fn region_text(&self, row: &Row, region: &MarkerIndicatorRegion) -> Result<String, LayoutError> {
        if row.adjust_for_margin_region {
            Ok(self.resolver.resolve(row, region)?)
        } else {
            Ok(MarginText::padding(region.width).text)
        }
    }
}
