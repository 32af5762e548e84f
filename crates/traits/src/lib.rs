pub mod collection;
pub mod content;
pub mod margin;
pub mod translate;

pub use collection::{CollectionError, CollectionProvider, InMemoryCollectionProvider};
pub use content::{BlockContentSource, ContentError, VecContentSource};
pub use margin::{MarginRegionError, MarginRegionResolver, MarkerIndicatorResolver};
pub use translate::{IdentityTranslator, TextTranslator, TranslationError};
