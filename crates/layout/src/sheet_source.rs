//! Lazily pairs the pages of all layout sequences into sheets.

use crate::page::Page;
use crate::pass::PassContext;
use crate::sequence::{LayoutSequence, PageSequenceBuilder};
use crate::sheet::{DocumentSpace, Sheet, SheetIdentity};
use crate::split::source::{BufferedDataSource, SplitPointDataSource, UnitProducer};
use crate::FlowError;
use log::debug;
use std::collections::HashMap;
use std::rc::Rc;

struct SheetProducer<'a> {
    sequences: &'a [LayoutSequence],
    context: PassContext<'a>,
    next_sequence: usize,
    builder: Option<PageSequenceBuilder<'a>>,
    lookahead: Option<Page>,
    next_page_number: usize,
    page_ordinals: HashMap<DocumentSpace, usize>,
    sheet_ordinals: HashMap<DocumentSpace, usize>,
    /// Sheets that must still follow without a volume break.
    keep_counter: usize,
    sequence_sheets: Vec<SheetIdentity>,
}

impl<'a> SheetProducer<'a> {
    fn start_sequence(&mut self) -> Result<bool, FlowError> {
        let sequences = self.sequences;
        let Some(sequence) = sequences.get(self.next_sequence) else {
            return Ok(false);
        };
        let ordinal = self.page_ordinals.get(&sequence.space).copied().unwrap_or(0);
        let builder = PageSequenceBuilder::new(
            self.next_sequence,
            sequence,
            self.context,
            self.next_page_number,
            ordinal,
        )?;
        debug!("Starting sequence {} with master '{}'", self.next_sequence, sequence.master);
        self.next_sequence += 1;
        self.keep_counter = 0;
        self.sequence_sheets.clear();
        self.builder = Some(builder);
        Ok(true)
    }

    fn make_sheet(&mut self, space: DocumentSpace, pages: Vec<Page>, last_in_sequence: bool) -> Sheet {
        let slot = self.sheet_ordinals.entry(space).or_insert(0);
        let identity = SheetIdentity {
            space,
            volume: None,
            ordinal: *slot,
        };
        *slot += 1;

        let mut registry = self.context.registry.borrow_mut();

        let keep_previous = pages.iter().map(Page::keep_with_previous_sheets).max().unwrap_or(0);
        let earlier = keep_previous.min(self.sequence_sheets.len());
        for sheet in &self.sequence_sheets[self.sequence_sheets.len() - earlier..] {
            registry.forbid_break_after(sheet.clone());
        }

        let keep_next = pages.iter().map(Page::keep_with_next_sheets).max().unwrap_or(0);
        self.keep_counter = self.keep_counter.max(keep_next);

        let (breakable, avoid) = if last_in_sequence {
            (true, None)
        } else {
            let computed = self.keep_counter == 0 && pages.iter().all(Page::allows_volume_break);
            let breakable = registry.recorded_breakable(&identity).unwrap_or(computed);
            let avoid = pages.last().and_then(Page::avoid_volume_break_after);
            if breakable {
                (true, avoid)
            } else {
                (false, avoid.or(Some(1)))
            }
        };
        registry.keep_breakable(identity.clone(), breakable);
        drop(registry);

        self.keep_counter = self.keep_counter.saturating_sub(1);
        self.sequence_sheets.push(identity.clone());
        debug!(
            "Sheet {} with {} page(s), breakable: {breakable}",
            identity.ordinal,
            pages.len()
        );
        Sheet::new(identity, pages, breakable, avoid)
    }
}

impl UnitProducer<Sheet> for SheetProducer<'_> {
    fn produce(&mut self) -> Result<Option<Sheet>, FlowError> {
        loop {
            if self.builder.is_none() && !self.start_sequence()? {
                return Ok(None);
            }
            let Some(builder) = self.builder.as_mut() else {
                continue;
            };

            let per_sheet = builder.master().pages_per_sheet();
            let mut pages = Vec::with_capacity(per_sheet);
            while pages.len() < per_sheet {
                let next = match self.lookahead.take() {
                    Some(page) => Some(page),
                    None => builder.next_page()?,
                };
                match next {
                    Some(page) => pages.push(page),
                    None => break,
                }
            }

            if pages.is_empty() {
                self.next_page_number = builder.next_page_number();
                self.page_ordinals.insert(builder.space(), builder.next_ordinal());
                self.builder = None;
                continue;
            }

            self.lookahead = builder.next_page()?;
            let last_in_sequence = self.lookahead.is_none();
            let space = builder.space();
            return Ok(Some(self.make_sheet(space, pages, last_in_sequence)));
        }
    }
}

/// The sheets of a whole pass, produced on demand.
#[derive(Debug, Clone)]
pub struct SheetDataSource<'a> {
    inner: BufferedDataSource<'a, Sheet>,
}

impl<'a> SheetDataSource<'a> {
    pub fn new(sequences: &'a [LayoutSequence], context: PassContext<'a>) -> Self {
        let producer = SheetProducer {
            sequences,
            context,
            next_sequence: 0,
            builder: None,
            lookahead: None,
            next_page_number: 1,
            page_ordinals: HashMap::new(),
            sheet_ordinals: HashMap::new(),
            keep_counter: 0,
            sequence_sheets: Vec::new(),
        };
        Self {
            inner: BufferedDataSource::new(producer),
        }
    }
}

impl SplitPointDataSource<Sheet> for SheetDataSource<'_> {
    fn get(&self, index: usize) -> Result<Rc<Sheet>, FlowError> {
        self.inner.get(index)
    }

    fn head(&self, to: usize) -> Result<Vec<Rc<Sheet>>, FlowError> {
        self.inner.head(to)
    }

    fn remaining(&self) -> Result<Vec<Rc<Sheet>>, FlowError> {
        self.inner.remaining()
    }

    fn tail(&self, from: usize) -> Self {
        Self {
            inner: self.inner.tail(from),
        }
    }

    fn has_element_at(&self, index: usize) -> Result<bool, FlowError> {
        self.inner.has_element_at(index)
    }

    fn size(&self, limit: usize) -> Result<usize, FlowError> {
        self.inner.size(limit)
    }
}
