//! MarginRegionResolver trait: resolves the text shown in a page margin region next to
//! a row.

use crate::translate::{IdentityTranslator, TextTranslator, TranslationError};
use sheetflow_types::{MarkerIndicatorRegion, Row};
use std::fmt::Debug;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarginRegionError {
    #[error("Margin region text '{text}' does not fit the region width of {width}")]
    Overflow { text: String, width: usize },

    #[error(transparent)]
    Translation(#[from] TranslationError),
}

pub trait MarginRegionResolver: Debug {
    /// Returns the text for `row` in `region`, exactly `region.width` characters wide.
    fn resolve(&self, row: &Row, region: &MarkerIndicatorRegion) -> Result<String, MarginRegionError>;
}

/// Shows the indicator of every region entry whose marker is present on the row.
#[derive(Debug, Clone)]
pub struct MarkerIndicatorResolver<T: TextTranslator = IdentityTranslator> {
    translator: T,
}

impl MarkerIndicatorResolver<IdentityTranslator> {
    pub fn new() -> Self {
        Self {
            translator: IdentityTranslator,
        }
    }
}

impl Default for MarkerIndicatorResolver<IdentityTranslator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TextTranslator> MarkerIndicatorResolver<T> {
    pub fn with_translator(translator: T) -> Self {
        Self { translator }
    }
}

impl<T: TextTranslator> MarginRegionResolver for MarkerIndicatorResolver<T> {
    fn resolve(&self, row: &Row, region: &MarkerIndicatorRegion) -> Result<String, MarginRegionError> {
        let indicators: String = region
            .indicators
            .iter()
            .filter(|ind| row.markers.iter().any(|m| m.name == ind.marker))
            .map(|ind| ind.indicator.as_str())
            .collect();

        let text = if indicators.is_empty() {
            indicators
        } else {
            self.translator.translate(&indicators)?
        };

        let len = text.chars().count();
        if len > region.width {
            return Err(MarginRegionError::Overflow {
                text,
                width: region.width,
            });
        }
        Ok(format!("{text}{}", " ".repeat(region.width - len)))
    }
}
