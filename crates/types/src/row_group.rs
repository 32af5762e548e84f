//! Row groups: the indivisible bundles of rows that pagination moves around.

use crate::ids::{BlockId, FragmentId};
use crate::row::{Marker, Row};
use serde::{Deserialize, Serialize};

/// Where a vertically positioned block sits relative to its target position.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum VerticalAlignment {
    /// The block ends at the target position.
    Before,
    /// The block is centered on the target position.
    Center,
    /// The block starts at the target position.
    #[default]
    After,
}

/// Places the content following it at a fixed row position on the page.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerticalSpacing {
    /// Target position, in rows from the top of the flow area.
    pub position: f32,
    #[serde(default)]
    pub alignment: VerticalAlignment,
    /// Template used for every skipped row.
    #[serde(default = "Row::empty")]
    pub empty_row: Row,
}

impl VerticalSpacing {
    pub fn new(position: f32, alignment: VerticalAlignment) -> Self {
        Self {
            position,
            alignment,
            empty_row: Row::empty(),
        }
    }

    /// Number of rows to skip so that a block of `block_size` rows lands on the target,
    /// given that `used` rows of the page are already taken.
    pub fn skip_rows(&self, used: f32, block_size: f32) -> usize {
        let target = match self.alignment {
            VerticalAlignment::Before => self.position - block_size,
            VerticalAlignment::Center => self.position - block_size / 2.0,
            VerticalAlignment::After => self.position,
        };
        (target - used).max(0.0).floor() as usize
    }
}

/// An ordered bundle of rows representing one formatted block (or collection fragment).
///
/// Sizes are computed once at build time. A group carrying a [`VerticalSpacing`] is a pure
/// spacer: it has no rows of its own and is realized into skip rows during assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct RowGroup {
    rows: Vec<Row>,
    identifier: Option<BlockId>,
    markers: Vec<Marker>,
    supplementary_ids: Vec<FragmentId>,
    keep_with_next_sheets: usize,
    keep_with_previous_sheets: usize,
    avoid_volume_break_after: Option<u32>,
    vertical_spacing: Option<VerticalSpacing>,
    breakable: bool,
    skippable: bool,
    collapsible: bool,
    unit_size: f32,
    last_unit_size: f32,
}

impl RowGroup {
    pub fn builder() -> RowGroupBuilder {
        RowGroupBuilder::default()
    }

    /// A spacer group positioning the content that follows it.
    pub fn spacer(spacing: VerticalSpacing) -> Self {
        RowGroupBuilder::default().vertical_spacing(spacing).build()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn identifier(&self) -> Option<&BlockId> {
        self.identifier.as_ref()
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn supplementary_ids(&self) -> &[FragmentId] {
        &self.supplementary_ids
    }

    pub fn keep_with_next_sheets(&self) -> usize {
        self.keep_with_next_sheets
    }

    pub fn keep_with_previous_sheets(&self) -> usize {
        self.keep_with_previous_sheets
    }

    pub fn avoid_volume_break_after(&self) -> Option<u32> {
        self.avoid_volume_break_after
    }

    pub fn vertical_spacing(&self) -> Option<&VerticalSpacing> {
        self.vertical_spacing.as_ref()
    }

    pub fn is_spacer(&self) -> bool {
        self.vertical_spacing.is_some()
    }

    /// True when this group must start on a fresh page.
    pub fn breaks_page_before(&self) -> bool {
        self.rows.first().is_some_and(|r| r.force_new_page)
    }

    pub fn breakable(&self) -> bool {
        self.breakable
    }

    pub fn skippable(&self) -> bool {
        self.skippable
    }

    pub fn collapsible(&self) -> bool {
        self.collapsible
    }

    pub fn unit_size(&self) -> f32 {
        self.unit_size
    }

    pub fn last_unit_size(&self) -> f32 {
        self.last_unit_size
    }

    /// Merges several groups into one, e.g. the groups of a single collection fragment.
    pub fn merged(groups: &[RowGroup]) -> RowGroup {
        let mut builder = RowGroupBuilder::default();
        for group in groups {
            builder = builder.rows(group.rows.iter().cloned());
            if builder.identifier.is_none() {
                builder.identifier = group.identifier.clone();
            }
            builder.markers.extend(group.markers.iter().cloned());
        }
        builder.build()
    }
}

/// Builder for [`RowGroup`]. Groups are breakable by default.
#[derive(Debug, Clone)]
pub struct RowGroupBuilder {
    rows: Vec<Row>,
    identifier: Option<BlockId>,
    markers: Vec<Marker>,
    supplementary_ids: Vec<FragmentId>,
    keep_with_next_sheets: usize,
    keep_with_previous_sheets: usize,
    avoid_volume_break_after: Option<u32>,
    vertical_spacing: Option<VerticalSpacing>,
    breakable: bool,
    skippable: bool,
    collapsible: bool,
}

impl Default for RowGroupBuilder {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            identifier: None,
            markers: Vec::new(),
            supplementary_ids: Vec::new(),
            keep_with_next_sheets: 0,
            keep_with_previous_sheets: 0,
            avoid_volume_break_after: None,
            vertical_spacing: None,
            breakable: true,
            skippable: false,
            collapsible: false,
        }
    }
}

impl RowGroupBuilder {
    pub fn row(mut self, row: Row) -> Self {
        self.rows.push(row);
        self
    }

    pub fn rows(mut self, rows: impl IntoIterator<Item = Row>) -> Self {
        self.rows.extend(rows);
        self
    }

    pub fn identifier(mut self, id: impl Into<BlockId>) -> Self {
        self.identifier = Some(id.into());
        self
    }

    pub fn marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    pub fn supplementary_id(mut self, id: impl Into<FragmentId>) -> Self {
        self.supplementary_ids.push(id.into());
        self
    }

    pub fn keep_with_next_sheets(mut self, sheets: usize) -> Self {
        self.keep_with_next_sheets = sheets;
        self
    }

    pub fn keep_with_previous_sheets(mut self, sheets: usize) -> Self {
        self.keep_with_previous_sheets = sheets;
        self
    }

    pub fn avoid_volume_break_after(mut self, priority: u32) -> Self {
        self.avoid_volume_break_after = Some(priority);
        self
    }

    pub fn vertical_spacing(mut self, spacing: VerticalSpacing) -> Self {
        self.vertical_spacing = Some(spacing);
        self
    }

    pub fn breakable(mut self, breakable: bool) -> Self {
        self.breakable = breakable;
        self
    }

    pub fn skippable(mut self, skippable: bool) -> Self {
        self.skippable = skippable;
        self
    }

    pub fn collapsible(mut self, collapsible: bool) -> Self {
        self.collapsible = collapsible;
        self
    }

    pub fn build(self) -> RowGroup {
        let RowGroupBuilder {
            mut rows,
            identifier,
            mut markers,
            mut supplementary_ids,
            keep_with_next_sheets,
            keep_with_previous_sheets,
            avoid_volume_break_after,
            vertical_spacing,
            breakable,
            skippable,
            collapsible,
        } = self;

        if vertical_spacing.is_some() {
            rows.clear();
        }

        for row in &rows {
            for marker in &row.markers {
                if !markers.contains(marker) {
                    markers.push(marker.clone());
                }
            }
            for anchor in &row.anchors {
                if !supplementary_ids.contains(anchor) {
                    supplementary_ids.push(anchor.clone());
                }
            }
        }

        let unit_size: f32 = rows.iter().map(Row::height).sum();
        let last_unit_size = if collapsible {
            0.0
        } else {
            match rows.last() {
                Some(last) => unit_size - last.height() + last.last_height(),
                None => 0.0,
            }
        };

        RowGroup {
            rows,
            identifier,
            markers,
            supplementary_ids,
            keep_with_next_sheets,
            keep_with_previous_sheets,
            avoid_volume_break_after,
            vertical_spacing,
            breakable,
            skippable,
            collapsible,
            unit_size,
            last_unit_size,
        }
    }
}
