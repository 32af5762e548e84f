//! TextTranslator trait. Translation tables live outside this workspace; the margin
//! resolver only needs a way to turn indicator text into output cells.

use std::fmt::Debug;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslationError {
    #[error("Cannot translate '{text}': {message}")]
    Untranslatable { text: String, message: String },
}

pub trait TextTranslator: Debug {
    fn translate(&self, text: &str) -> Result<String, TranslationError>;
}

/// Passes text through unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityTranslator;

impl TextTranslator for IdentityTranslator {
    fn translate(&self, text: &str) -> Result<String, TranslationError> {
        Ok(text.to_string())
    }
}
