use super::source::SplitPointDataSource;
use super::{EPSILON, SplitOptions, SplitUnit, Supplements};
use crate::FlowError;
use log::trace;
use sheetflow_types::FragmentId;
use std::collections::HashSet;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitKind {
    /// Nothing fits.
    Empty,
    /// The whole source fits.
    All,
    /// Break at a legal break point.
    Regular,
    /// No legal break fits; the head was cut where the capacity ran out.
    Forced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitPointSpecification {
    /// Units consumed by the split. The tail starts here.
    pub index: usize,
    /// Units kept in the head. Units in `head_len..index` are discarded.
    pub head_len: usize,
    pub kind: SplitKind,
}

impl SplitPointSpecification {
    pub fn empty() -> Self {
        Self {
            index: 0,
            head_len: 0,
            kind: SplitKind::Empty,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kind == SplitKind::Empty
    }
}

#[derive(Debug)]
pub struct SplitPoint<T, D> {
    pub head: Vec<Rc<T>>,
    /// Supplementary units referenced from the head, each once, in order of reference.
    pub supplements: Vec<(FragmentId, Rc<T>)>,
    pub discarded: Vec<Rc<T>>,
    pub tail: D,
    pub forced: bool,
}

/// Running size of a head under construction.
struct SizeTracker<'s, T, S: ?Sized> {
    supplements: &'s S,
    committed: f32,
    /// Last unit of the trailing collapsible run, and the largest size in that run.
    run: Option<(Rc<T>, f32)>,
    seen: HashSet<FragmentId>,
    supplement_size: f32,
}

impl<'s, T: SplitUnit, S: Supplements<T> + ?Sized> SizeTracker<'s, T, S> {
    fn new(supplements: &'s S) -> Self {
        Self {
            supplements,
            committed: 0.0,
            run: None,
            seen: HashSet::new(),
            supplement_size: 0.0,
        }
    }

    fn new_supplements(&self, unit: &T) -> (Vec<FragmentId>, f32) {
        let ids = unit.supplementary_ids();
        let mut fresh = Vec::new();
        let mut size = 0.0;
        for (i, id) in ids.iter().enumerate() {
            if self.seen.contains(id) || ids[..i].contains(id) {
                continue;
            }
            if let Some(supplement) = self.supplements.get(id) {
                size += supplement.unit_size();
                fresh.push(id.clone());
            }
        }
        if !fresh.is_empty() && self.seen.is_empty() {
            size += self.supplements.overhead();
        }
        (fresh, size)
    }

    /// Size of the head if it ended with `unit`.
    fn size_with(&self, unit: &T) -> f32 {
        let flow = match &self.run {
            Some((last, _)) if unit.is_collapsible() && last.collapses_with(unit) => self.committed,
            Some((_, max)) => self.committed + max + unit.last_unit_size(),
            None => self.committed + unit.last_unit_size(),
        };
        flow + self.supplement_size + self.new_supplements(unit).1
    }

    fn commit(&mut self, unit: &Rc<T>) {
        let (fresh, size) = self.new_supplements(unit);
        self.seen.extend(fresh);
        self.supplement_size += size;

        if unit.is_collapsible() {
            self.run = match self.run.take() {
                Some((last, max)) if last.collapses_with(unit) => {
                    Some((Rc::clone(unit), max.max(unit.unit_size())))
                }
                Some((_, max)) => {
                    self.committed += max;
                    Some((Rc::clone(unit), unit.unit_size()))
                }
                None => Some((Rc::clone(unit), unit.unit_size())),
            };
        } else {
            if let Some((_, max)) = self.run.take() {
                self.committed += max;
            }
            self.committed += unit.unit_size();
        }
    }
}

/// Keeps the later candidate unless costs are compared and it is more expensive.
fn prefer(current: Option<(usize, u32)>, candidate: (usize, u32), minimize_cost: bool) -> Option<(usize, u32)> {
    match current {
        Some((_, cost)) if minimize_cost && candidate.1 > cost => current,
        _ => Some(candidate),
    }
}

/// Finds break points in a [`SplitPointDataSource`].
///
/// The handler is stateless. Filling is greedy: it takes the longest prefix that fits and
/// ends on a legal break (or, with `minimize_cost`, the cheapest such prefix).
#[derive(Debug, Default, Clone, Copy)]
pub struct SplitPointHandler;

impl SplitPointHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn find<T, D, S>(
        &self,
        capacity: f32,
        data: &D,
        supplements: &S,
        options: SplitOptions,
    ) -> Result<SplitPointSpecification, FlowError>
    where
        T: SplitUnit,
        D: SplitPointDataSource<T>,
        S: Supplements<T> + ?Sized,
    {
        if data.is_empty()? {
            return Ok(SplitPointSpecification::empty());
        }

        let mut tracker = SizeTracker::new(supplements);
        let mut best: Option<(usize, u32)> = None;
        let mut fallback: Option<(usize, u32)> = None;
        let mut index = 0;

        let end = loop {
            if !data.has_element_at(index)? {
                trace!("All {index} units fit into {capacity:.2}");
                break None;
            }
            let unit = data.get(index)?;
            if tracker.size_with(&unit) > capacity + EPSILON {
                break Some(index);
            }
            tracker.commit(&unit);
            index += 1;

            let candidate = (index, unit.break_cost());
            if unit.is_breakable() {
                best = prefer(best, candidate, options.minimize_cost);
            } else if options.minimize_cost {
                fallback = prefer(fallback, candidate, true);
            }
        };

        let (index, kind) = match (end, best) {
            (None, _) => (index, SplitKind::All),
            (Some(_), Some((index, _))) => (index, SplitKind::Regular),
            (Some(overflow), None) if options.allow_force => match fallback {
                Some((index, _)) => (index, SplitKind::Forced),
                None => (overflow.max(1), SplitKind::Forced),
            },
            (Some(_), None) => {
                trace!("No legal break fits into {capacity:.2}");
                return Ok(SplitPointSpecification::empty());
            }
        };

        let trim_skippable = options.trim_trailing && kind != SplitKind::All;
        let head_len = self.trimmed_len(data, index, trim_skippable)?;
        trace!("Split at {index} (head {head_len}, {kind:?}) for capacity {capacity:.2}");
        Ok(SplitPointSpecification { index, head_len, kind })
    }

    /// Length of the head `..index` without its trailing collapsible run, which is
    /// measured at zero, and, with `trim_skippable`, without trailing skippable units.
    fn trimmed_len<T, D>(&self, data: &D, index: usize, trim_skippable: bool) -> Result<usize, FlowError>
    where
        T: SplitUnit,
        D: SplitPointDataSource<T>,
    {
        let mut head_len = index;
        while head_len > 0 {
            let unit = data.get(head_len - 1)?;
            if !unit.is_collapsible() && !(trim_skippable && unit.is_skippable()) {
                break;
            }
            head_len -= 1;
        }
        Ok(head_len)
    }

    pub fn split<T, D, S>(
        &self,
        spec: &SplitPointSpecification,
        data: &D,
        supplements: &S,
    ) -> Result<SplitPoint<T, D>, FlowError>
    where
        T: SplitUnit,
        D: SplitPointDataSource<T>,
        S: Supplements<T> + ?Sized,
    {
        let (mut head, tail) = data.split(spec.index)?;
        let discarded = head.split_off(spec.head_len.min(head.len()));

        let mut placed: Vec<(FragmentId, Rc<T>)> = Vec::new();
        for unit in &head {
            for id in unit.supplementary_ids() {
                if placed.iter().any(|(p, _)| p == id) {
                    continue;
                }
                if let Some(supplement) = supplements.get(id) {
                    placed.push((id.clone(), supplement));
                }
            }
        }

        Ok(SplitPoint {
            head,
            supplements: placed,
            discarded,
            tail,
            forced: spec.kind == SplitKind::Forced,
        })
    }

    /// Number of skippable units at the start of `data`.
    pub fn find_leading<T, D>(&self, data: &D) -> Result<usize, FlowError>
    where
        T: SplitUnit,
        D: SplitPointDataSource<T>,
    {
        let mut count = 0;
        while data.has_element_at(count)? && data.get(count)?.is_skippable() {
            count += 1;
        }
        Ok(count)
    }

    /// Removes the leading skippable units, returning them and the rest.
    pub fn skip_leading<T, D>(&self, data: &D) -> Result<(Vec<Rc<T>>, D), FlowError>
    where
        T: SplitUnit,
        D: SplitPointDataSource<T>,
    {
        let count = self.find_leading(data)?;
        data.split(count)
    }
}
