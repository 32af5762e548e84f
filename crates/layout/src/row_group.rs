//! Row groups as split units of the page flow.

use crate::split::SplitUnit;
use sheetflow_types::{FragmentId, RowGroup};

impl SplitUnit for RowGroup {
    fn is_breakable(&self) -> bool {
        self.breakable()
    }

    fn is_skippable(&self) -> bool {
        self.skippable()
    }

    fn is_collapsible(&self) -> bool {
        self.collapsible()
    }

    fn unit_size(&self) -> f32 {
        RowGroup::unit_size(self)
    }

    fn last_unit_size(&self) -> f32 {
        RowGroup::last_unit_size(self)
    }

    fn collapses_with(&self, other: &Self) -> bool {
        self.collapsible() && other.collapsible()
    }

    fn supplementary_ids(&self) -> &[FragmentId] {
        RowGroup::supplementary_ids(self)
    }

    fn break_cost(&self) -> u32 {
        self.avoid_volume_break_after().unwrap_or(0)
    }
}
