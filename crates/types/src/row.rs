//! Formatted rows as produced by the (external) block shaping step.

use crate::ids::FragmentId;
use serde::{Deserialize, Serialize};

fn default_spacing() -> f32 {
    1.0
}

fn is_default_spacing(spacing: &f32) -> bool {
    *spacing == 1.0
}

/// Horizontal alignment of a row's content within the flow width.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

fn default_space_only() -> bool {
    true
}

/// Text placed in the left or right margin of a row.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct MarginText {
    pub text: String,
    /// True when `text` holds only padding and carries no information.
    #[serde(default = "default_space_only")]
    pub space_only: bool,
}

impl Default for MarginText {
    fn default() -> Self {
        Self {
            text: String::new(),
            space_only: true,
        }
    }
}

impl MarginText {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let space_only = text.chars().all(char::is_whitespace);
        Self { text, space_only }
    }

    pub fn padding(width: usize) -> Self {
        Self {
            text: " ".repeat(width),
            space_only: true,
        }
    }

    /// Appends `other` to this margin, keeping `space_only` accurate.
    pub fn append(&mut self, other: &str) {
        self.text.push_str(other);
        self.space_only = self.space_only && other.chars().all(char::is_whitespace);
    }

    /// Prepends `other` to this margin, keeping `space_only` accurate.
    pub fn prepend(&mut self, other: &str) {
        self.text.insert_str(0, other);
        self.space_only = self.space_only && other.chars().all(char::is_whitespace);
    }
}

/// A named tag attached to a row (e.g. a running header value).
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Marker {
    pub name: String,
    pub value: String,
}

impl Marker {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An immutable formatted line.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    #[serde(default)]
    pub chars: String,
    #[serde(default)]
    pub left_margin: MarginText,
    #[serde(default)]
    pub right_margin: MarginText,
    #[serde(default)]
    pub alignment: Alignment,
    #[serde(default = "default_spacing", skip_serializing_if = "is_default_spacing")]
    pub row_spacing: f32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub markers: Vec<Marker>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anchors: Vec<FragmentId>,
    #[serde(default)]
    pub adjust_for_margin_region: bool,
    #[serde(default)]
    pub force_new_page: bool,
}

impl Default for Row {
    fn default() -> Self {
        Self {
            chars: String::new(),
            left_margin: MarginText::default(),
            right_margin: MarginText::default(),
            alignment: Alignment::default(),
            row_spacing: default_spacing(),
            markers: Vec::new(),
            anchors: Vec::new(),
            adjust_for_margin_region: false,
            force_new_page: false,
        }
    }
}

impl Row {
    pub fn new(chars: impl Into<String>) -> Self {
        Self {
            chars: chars.into(),
            ..Default::default()
        }
    }

    /// A row with no content, used for skipped space.
    pub fn empty() -> Self {
        Self::new("")
    }

    pub fn with_spacing(mut self, row_spacing: f32) -> Self {
        self.row_spacing = row_spacing;
        self
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    pub fn with_anchor(mut self, fragment: impl Into<FragmentId>) -> Self {
        self.anchors.push(fragment.into());
        self
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn adjusted_for_margin_region(mut self) -> Self {
        self.adjust_for_margin_region = true;
        self
    }

    pub fn forcing_new_page(mut self) -> Self {
        self.force_new_page = true;
        self
    }

    pub fn content_length(&self) -> usize {
        self.chars.chars().count()
    }

    /// Vertical space taken by this row, including its trailing gap.
    pub fn height(&self) -> f32 {
        self.row_spacing
    }

    /// Vertical space taken when this row is the last one before a break.
    pub fn last_height(&self) -> f32 {
        self.row_spacing.min(1.0)
    }
}
