pub mod codes;
pub mod config;
pub mod error;
pub mod persistables;
pub mod report;
pub mod reporter;
pub mod service;
pub mod validator;
pub mod validators;

pub use codes::ValidationCode;
pub use config::{DuplicatePolicy, ValidationConfig};
pub use error::EngineError;
pub use persistables::Persistables;
pub use report::{ImportReport, Status, ValidationError, ValidationResult, ValidationWarning};
pub use reporter::{FailFast, Reporter};
pub use service::ValidationService;
pub use validator::{BundleValidator, ValidationContext, Validator, ValidatorRegistry};

use tracker_core::{
    ImportStrategy, RuleEffect, TrackerBundle, TrackerObjects, User, ValidationMode,
};
use tracker_storage::SqliteStore;

#[derive(Debug, Clone, Default)]
pub struct ImportParams {
    pub strategy: ImportStrategy,
    pub validation_mode: ValidationMode,
    pub user: User,
    pub rule_effects: Vec<RuleEffect>,
}

impl ImportParams {
    pub fn new(strategy: ImportStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    pub fn with_validation_mode(mut self, validation_mode: ValidationMode) -> Self {
        self.validation_mode = validation_mode;
        self
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.user = user;
        self
    }

    pub fn with_rule_effects(mut self, rule_effects: Vec<RuleEffect>) -> Self {
        self.rule_effects = rule_effects;
        self
    }
}

/// Validates payloads, filters them to what can be persisted, and records
/// the outcome in the existence store.
pub struct TrackerImporter {
    store: SqliteStore,
    service: ValidationService,
}

impl TrackerImporter {
    pub fn new(store: SqliteStore, service: ValidationService) -> Self {
        Self { store, service }
    }

    pub fn open(path: &str, config: ValidationConfig) -> Result<Self, EngineError> {
        let store = SqliteStore::open(path)?;
        Ok(Self::new(store, Self::default_service(config)))
    }

    pub fn open_in_memory(config: ValidationConfig) -> Result<Self, EngineError> {
        let store = SqliteStore::open_in_memory()?;
        Ok(Self::new(store, Self::default_service(config)))
    }

    fn default_service(config: ValidationConfig) -> ValidationService {
        ValidationService::new(
            ValidatorRegistry::default_registry(),
            ValidatorRegistry::rule_engine_registry(),
            config,
        )
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SqliteStore {
        &mut self.store
    }

    pub fn service(&self) -> &ValidationService {
        &self.service
    }

    pub fn import(
        &mut self,
        params: ImportParams,
        objects: TrackerObjects,
    ) -> Result<ImportReport, EngineError> {
        let mut bundle = TrackerBundle::new(objects, params.strategy)
            .with_validation_mode(params.validation_mode)
            .with_user(params.user)
            .with_rule_effects(params.rule_effects);
        let span = tracing::info_span!("import", import_id = %bundle.import_id);
        let _guard = span.enter();

        let preheat = self.store.preheat(&bundle.objects)?;
        let mut validation = self.service.validate(&mut bundle, &preheat);
        let rule_engine = self.service.validate_rule_engine(&mut bundle, &preheat);
        validation.merge(rule_engine);

        // A fail-fast import that hit an error persists nothing.
        if bundle.validation_mode == ValidationMode::FailFast && validation.has_errors() {
            bundle.objects = TrackerObjects::default();
        }

        let committed = self.store.commit(&bundle.objects, bundle.strategy)?;
        let report = ImportReport::new(bundle.import_id, validation, &bundle.objects, committed);
        tracing::info!(
            status = ?report.status,
            errors = report.validation.errors.len(),
            warnings = report.validation.warnings.len(),
            committed,
            "import finished"
        );
        Ok(report)
    }
}
