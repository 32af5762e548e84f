// src/paginator.rs
use crate::error::PipelineError;
use log::{debug, info, warn};
use sheetflow_layout::{
    CrossReferenceHandler, LayoutSequence, PaginationConfig, PassContext, PassOutcome, Volume, run_pass,
};
use sheetflow_traits::{CollectionProvider, InMemoryCollectionProvider, MarginRegionResolver, MarkerIndicatorResolver};
use std::cell::RefCell;

/// The result of a pagination run.
#[derive(Debug)]
pub struct PaginatedDocument {
    pub volumes: Vec<Volume>,
    /// Registry of the final pass.
    pub references: CrossReferenceHandler,
    /// Collection fallbacks applied before the final pass.
    pub restarts: usize,
    /// Passes run since the last restart.
    pub iterations: usize,
}

impl PaginatedDocument {
    pub fn page_count(&self) -> usize {
        self.volumes.iter().map(Volume::page_count).sum()
    }

    pub fn sheet_count(&self) -> usize {
        self.volumes.iter().map(|v| v.sheets().len()).sum()
    }
}

/// A builder for creating a [`Paginator`].
pub struct PaginatorBuilder {
    config: Option<PaginationConfig>,
    collections: Box<dyn CollectionProvider>,
    resolver: Box<dyn MarginRegionResolver>,
}

impl Default for PaginatorBuilder {
    fn default() -> Self {
        Self {
            config: None,
            collections: Box::new(InMemoryCollectionProvider::new()),
            resolver: Box::new(MarkerIndicatorResolver::new()),
        }
    }
}

impl PaginatorBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_config(mut self, config: PaginationConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Parses the configuration from JSON.
    pub fn with_config_json(mut self, json: &str) -> Result<Self, PipelineError> {
        self.config = Some(PaginationConfig::from_json(json)?);
        Ok(self)
    }

    pub fn with_collections(mut self, collections: impl CollectionProvider + 'static) -> Self {
        self.collections = Box::new(collections);
        self
    }

    pub fn with_margin_resolver(mut self, resolver: impl MarginRegionResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Consumes the builder, checking that the default master exists.
    pub fn build(self) -> Result<Paginator, PipelineError> {
        let config = self.config.ok_or_else(|| {
            PipelineError::Config("No pagination config has been set. Use `with_config` or `with_config_json`.".into())
        })?;
        if config.master(&config.default_master).is_err() {
            return Err(PipelineError::Config(format!(
                "Default master '{}' is not among the layout masters",
                config.default_master
            )));
        }
        Ok(Paginator {
            config,
            collections: self.collections,
            resolver: self.resolver,
        })
    }
}

/// Runs layout passes until the document settles.
///
/// A pass that overflows a page area is abandoned, the collection is moved to its
/// fallback and everything is laid out again with a fresh registry. A pass that
/// completes but changed a sheet's breakability after emitting it is repeated with the
/// decisions carried over.
pub struct Paginator {
    config: PaginationConfig,
    collections: Box<dyn CollectionProvider>,
    resolver: Box<dyn MarginRegionResolver>,
}

impl Paginator {
    pub fn builder() -> PaginatorBuilder {
        PaginatorBuilder::new()
    }

    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    pub fn collections(&self) -> &dyn CollectionProvider {
        self.collections.as_ref()
    }

    /// Paginates `sequences`. Applied collection fallbacks persist in the provider.
    pub fn paginate(&mut self, sequences: &[LayoutSequence]) -> Result<PaginatedDocument, PipelineError> {
        let mut registry = CrossReferenceHandler::new();
        let mut restarts = 0;
        let mut iterations = 0;

        loop {
            iterations += 1;
            let (outcome, references) = self.run(sequences, registry)?;

            match outcome {
                PassOutcome::Restart(request) => {
                    restarts += 1;
                    if restarts > self.config.max_restarts {
                        return Err(PipelineError::RestartLimitExceeded(self.config.max_restarts));
                    }
                    let target = self.collections.reassign(&request.collection, &request.rules)?;
                    warn!(
                        "Moved collection '{}' to '{}' (restart {restarts} of at most {})",
                        request.collection, target, self.config.max_restarts
                    );
                    registry = CrossReferenceHandler::new();
                    iterations = 0;
                }
                PassOutcome::Complete(volumes) => {
                    if references.is_dirty() {
                        if iterations < self.config.max_iterations {
                            debug!("Sheet breakability changed in pass {iterations}, laying out again");
                            registry = references.next_iteration();
                            continue;
                        }
                        warn!("Sheet breakability did not settle after {iterations} passes");
                    }
                    info!(
                        "Paginated {} volume(s) after {restarts} restart(s) and {iterations} pass(es)",
                        volumes.len()
                    );
                    return Ok(PaginatedDocument {
                        volumes,
                        references,
                        restarts,
                        iterations,
                    });
                }
            }
        }
    }

    fn run(
        &self,
        sequences: &[LayoutSequence],
        registry: CrossReferenceHandler,
    ) -> Result<(PassOutcome, CrossReferenceHandler), PipelineError> {
        let registry = RefCell::new(registry);
        let context = PassContext {
            config: &self.config,
            collections: self.collections.as_ref(),
            resolver: self.resolver.as_ref(),
            registry: &registry,
        };
        let outcome = run_pass(sequences, context)?;
        Ok((outcome, registry.into_inner()))
    }
}
