//! Registry of layout facts discovered during a pass: where each block landed, and
//! which sheets may end a volume.

use crate::sheet::{DocumentSpace, SheetIdentity};
use log::{debug, error};
use sheetflow_types::{BlockId, Marker};
use std::collections::{HashMap, HashSet};

/// First and last page number of a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageDetails {
    pub space: DocumentSpace,
    pub sequence: usize,
    pub ordinal: usize,
    pub page_number: usize,
    pub markers: Vec<Marker>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerPosition {
    First,
    Last,
}

/// Per-pass registry of page numbers, volume numbers and sheet breakability.
///
/// Values are written forward once per pass. Breakability decisions survive into the
/// next iteration through [`CrossReferenceHandler::next_iteration`]; everything else
/// starts empty again.
#[derive(Debug, Default, Clone)]
pub struct CrossReferenceHandler {
    page_numbers: HashMap<BlockId, usize>,
    volume_numbers: HashMap<BlockId, usize>,
    breakable: HashMap<SheetIdentity, bool>,
    recorded_breakable: HashMap<SheetIdentity, bool>,
    forbidden: HashSet<SheetIdentity>,
    sequence_scopes: HashMap<(DocumentSpace, usize), PageRange>,
    page_details: Vec<PageDetails>,
    dirty: bool,
}

impl CrossReferenceHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_page_number(&mut self, id: BlockId, page: usize) {
        if let Some(previous) = self.page_numbers.insert(id.clone(), page) {
            error!("Page number of '{id}' set twice in one pass ({previous}, then {page})");
            debug_assert!(false, "page number of '{id}' set twice");
        }
    }

    pub fn page_number(&self, id: &BlockId) -> Option<usize> {
        self.page_numbers.get(id).copied()
    }

    pub fn set_volume_number(&mut self, id: BlockId, volume: usize) {
        if let Some(previous) = self.volume_numbers.insert(id.clone(), volume) {
            error!("Volume number of '{id}' set twice in one pass ({previous}, then {volume})");
            debug_assert!(false, "volume number of '{id}' set twice");
        }
    }

    pub fn volume_number(&self, id: &BlockId) -> Option<usize> {
        self.volume_numbers.get(id).copied()
    }

    /// Commits the breakability decision for a sheet.
    pub fn keep_breakable(&mut self, sheet: SheetIdentity, breakable: bool) {
        if breakable && self.forbidden.contains(&sheet) {
            self.dirty = true;
        }
        self.breakable.insert(sheet, breakable);
    }

    /// This pass's decision, else the previous iteration's, else `true`.
    pub fn get_breakable(&self, sheet: &SheetIdentity) -> bool {
        self.breakable
            .get(sheet)
            .or_else(|| self.recorded_breakable.get(sheet))
            .copied()
            .unwrap_or(true)
    }

    /// The decision carried over from the previous iteration, if any.
    pub fn recorded_breakable(&self, sheet: &SheetIdentity) -> Option<bool> {
        self.recorded_breakable.get(sheet).copied()
    }

    /// Forbids a volume break after `sheet`. If the sheet was already emitted as
    /// breakable, the pass is marked dirty and has to be repeated.
    pub fn forbid_break_after(&mut self, sheet: SheetIdentity) {
        if self.breakable.get(&sheet) == Some(&true) {
            debug!("Sheet {sheet:?} was emitted breakable but must keep with a later sheet");
            self.dirty = true;
        }
        self.forbidden.insert(sheet);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// A fresh registry carrying this pass's breakability decisions and overrides.
    pub fn next_iteration(&self) -> Self {
        let mut recorded = self.recorded_breakable.clone();
        recorded.extend(self.breakable.iter().map(|(k, v)| (k.clone(), *v)));
        for sheet in &self.forbidden {
            recorded.insert(sheet.clone(), false);
        }
        Self {
            recorded_breakable: recorded,
            ..Self::default()
        }
    }

    pub fn set_sequence_scope(&mut self, space: DocumentSpace, sequence: usize, from: usize, to: usize) {
        self.sequence_scopes.insert((space, sequence), PageRange { from, to });
    }

    pub fn sequence_scope(&self, space: DocumentSpace, sequence: usize) -> Option<PageRange> {
        self.sequence_scopes.get(&(space, sequence)).copied()
    }

    pub fn keep_page_details(&mut self, details: PageDetails) {
        self.page_details.push(details);
    }

    pub fn page_details(&self) -> &[PageDetails] {
        &self.page_details
    }

    /// The first or last marker called `name` on the given page.
    pub fn find_marker(
        &self,
        space: DocumentSpace,
        ordinal: usize,
        name: &str,
        position: MarkerPosition,
    ) -> Option<&Marker> {
        let details = self
            .page_details
            .iter()
            .find(|d| d.space == space && d.ordinal == ordinal)?;
        let mut matching = details.markers.iter().filter(|m| m.name == name);
        match position {
            MarkerPosition::First => matching.next(),
            MarkerPosition::Last => matching.last(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakable_lookup_order() {
        let mut registry = CrossReferenceHandler::new();
        let sheet = SheetIdentity::body(0);
        assert!(registry.get_breakable(&sheet));

        registry.keep_breakable(sheet.clone(), false);
        assert!(!registry.get_breakable(&sheet));

        let next = registry.next_iteration();
        assert_eq!(next.recorded_breakable(&sheet), Some(false));
        assert!(!next.get_breakable(&sheet));
    }

    #[test]
    fn test_forbidding_an_emitted_break_marks_dirty() {
        let mut registry = CrossReferenceHandler::new();
        let sheet = SheetIdentity::body(3);
        registry.keep_breakable(sheet.clone(), true);
        assert!(!registry.is_dirty());

        registry.forbid_break_after(sheet.clone());
        assert!(registry.is_dirty());

        let mut next = registry.next_iteration();
        assert!(!next.is_dirty());
        assert_eq!(next.recorded_breakable(&sheet), Some(false));
        // committing the recorded decision and forbidding again is stable
        next.keep_breakable(sheet.clone(), false);
        next.forbid_break_after(sheet);
        assert!(!next.is_dirty());
    }

    #[test]
    fn test_next_iteration_forgets_numbers() {
        let mut registry = CrossReferenceHandler::new();
        registry.set_page_number(BlockId::new("a"), 4);
        registry.set_volume_number(BlockId::new("a"), 1);
        assert_eq!(registry.page_number(&BlockId::new("a")), Some(4));

        let next = registry.next_iteration();
        assert_eq!(next.page_number(&BlockId::new("a")), None);
        assert_eq!(next.volume_number(&BlockId::new("a")), None);
    }

    #[test]
    fn test_find_marker_on_page() {
        let mut registry = CrossReferenceHandler::new();
        registry.keep_page_details(PageDetails {
            space: DocumentSpace::Body,
            sequence: 0,
            ordinal: 2,
            page_number: 3,
            markers: vec![Marker::new("h", "one"), Marker::new("x", "-"), Marker::new("h", "two")],
        });

        let first = registry.find_marker(DocumentSpace::Body, 2, "h", MarkerPosition::First);
        let last = registry.find_marker(DocumentSpace::Body, 2, "h", MarkerPosition::Last);
        assert_eq!(first.map(|m| m.value.as_str()), Some("one"));
        assert_eq!(last.map(|m| m.value.as_str()), Some("two"));
        assert!(registry.find_marker(DocumentSpace::Body, 0, "h", MarkerPosition::First).is_none());
    }

    #[test]
    fn test_sequence_scope() {
        let mut registry = CrossReferenceHandler::new();
        registry.set_sequence_scope(DocumentSpace::Body, 1, 5, 8);
        assert_eq!(
            registry.sequence_scope(DocumentSpace::Body, 1),
            Some(PageRange { from: 5, to: 8 })
        );
    }
}
