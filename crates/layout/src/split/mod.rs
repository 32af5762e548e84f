//! Generic split-point machinery shared by page filling and volume splitting.
//!
//! Units are laid out in order into a container of fixed capacity. A [`SplitUnit`]
//! describes how one unit contributes to the used size and whether a break may follow
//! it. [`handler::SplitPointHandler`] finds the best break for a given capacity.

pub mod handler;
pub mod source;

use sheetflow_types::FragmentId;
use std::rc::Rc;

/// Allowed size error when comparing accumulated sizes against a capacity.
pub(crate) const EPSILON: f32 = 0.01;

pub trait SplitUnit {
    /// True if a break may follow this unit.
    fn is_breakable(&self) -> bool;
    /// True if this unit may be dropped when it ends up at either edge of a container.
    fn is_skippable(&self) -> bool;
    fn is_collapsible(&self) -> bool;
    fn unit_size(&self) -> f32;
    /// Size when this unit is the last one before a break.
    fn last_unit_size(&self) -> f32;
    /// True if `other`, directly following this unit, collapses into it.
    fn collapses_with(&self, other: &Self) -> bool;
    /// Ids of supplementary units that must go into the same container.
    fn supplementary_ids(&self) -> &[FragmentId];

    /// Cost of breaking after this unit. Only used when minimizing break cost.
    fn break_cost(&self) -> u32 {
        0
    }
}

/// Lookup of supplementary units by id.
pub trait Supplements<T> {
    fn get(&self, id: &FragmentId) -> Option<Rc<T>>;

    /// Extra size added once, when the first supplement enters a container.
    fn overhead(&self) -> f32 {
        0.0
    }
}

/// Supplements of units that never reference any.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSupplements;

impl<T> Supplements<T> for NoSupplements {
    fn get(&self, _id: &FragmentId) -> Option<Rc<T>> {
        None
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SplitOptions {
    /// Cut at the overflow point when no legal break fits.
    pub allow_force: bool,
    /// Move skippable units at the end of the head to the discarded part.
    pub trim_trailing: bool,
    /// Prefer the break with the lowest cost over the latest break.
    pub minimize_cost: bool,
}

impl SplitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn force(mut self, allow_force: bool) -> Self {
        self.allow_force = allow_force;
        self
    }

    pub fn trim(mut self, trim_trailing: bool) -> Self {
        self.trim_trailing = trim_trailing;
        self
    }

    pub fn minimize_cost(mut self) -> Self {
        self.minimize_cost = true;
        self
    }
}
