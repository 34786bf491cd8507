use std::time::{Duration, Instant};

use tracker_core::{TrackerBundle, TrackerDto, ValidationMode};
use tracker_storage::Preheat;

use crate::config::{DuplicatePolicy, ValidationConfig};
use crate::persistables;
use crate::report::ValidationResult;
use crate::reporter::{FailFast, Reporter};
use crate::validator::{ValidationContext, Validator, ValidatorRegistry};

/// Runs a validator registry over a bundle, then narrows the bundle to the
/// records that can be persisted.
#[derive(Debug)]
pub struct ValidationService {
    validators: ValidatorRegistry,
    rule_engine_validators: ValidatorRegistry,
    config: ValidationConfig,
}

impl Default for ValidationService {
    fn default() -> Self {
        Self::new(
            ValidatorRegistry::default_registry(),
            ValidatorRegistry::rule_engine_registry(),
            ValidationConfig::default(),
        )
    }
}

impl ValidationService {
    pub fn new(
        validators: ValidatorRegistry,
        rule_engine_validators: ValidatorRegistry,
        config: ValidationConfig,
    ) -> Self {
        Self {
            validators,
            rule_engine_validators,
            config,
        }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    pub fn validate(&self, bundle: &mut TrackerBundle, preheat: &dyn Preheat) -> ValidationResult {
        self.run("default", &self.validators, bundle, preheat)
    }

    pub fn validate_rule_engine(
        &self,
        bundle: &mut TrackerBundle,
        preheat: &dyn Preheat,
    ) -> ValidationResult {
        self.run("rule-engine", &self.rule_engine_validators, bundle, preheat)
    }

    fn run(
        &self,
        pass: &'static str,
        registry: &ValidatorRegistry,
        bundle: &mut TrackerBundle,
        preheat: &dyn Preheat,
    ) -> ValidationResult {
        let span = tracing::info_span!(
            "validation",
            pass,
            import_id = %bundle.import_id,
            strategy = %bundle.strategy,
        );
        let _guard = span.enter();

        if bundle.validation_mode == ValidationMode::Skip {
            if bundle.user.super_user {
                tracing::warn!(
                    user = %bundle.user.username,
                    "skipping validation; invalid records may be persisted"
                );
                return ValidationResult::skipped();
            }
            tracing::info!(
                user = %bundle.user.username,
                "only super users may skip validation, validating in full"
            );
        }

        let started = Instant::now();
        let fail_fast = bundle.validation_mode == ValidationMode::FailFast;
        let mut reporter = Reporter::new(fail_fast, self.config.duplicate_policy());
        let outcome = {
            let context = ValidationContext::new(bundle, preheat);
            validate_bundle(registry, &mut reporter, &context)
        };
        let (mut errors, mut warnings, invalid) = reporter.into_parts();
        if let Err(abort) = outcome {
            tracing::info!(errors = abort.errors.len(), "fail fast, validation stopped");
            errors = abort.errors;
        }

        let existing = persistables::existing_references(&bundle.objects, bundle.strategy, preheat);
        let persistables =
            persistables::filter(&bundle.objects, &invalid, bundle.strategy, &existing);
        bundle.objects = persistables.objects;
        if self.config.report_exclusions() {
            let suppress = self.config.duplicate_policy() == DuplicatePolicy::Suppress;
            for notice in persistables.exclusions {
                if !(suppress && warnings.contains(&notice)) {
                    warnings.push(notice);
                }
            }
        }

        tracing::debug!(
            errors = errors.len(),
            warnings = warnings.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "validation finished"
        );
        ValidationResult {
            errors,
            warnings,
            skipped: false,
        }
    }
}

fn validate_bundle(
    registry: &ValidatorRegistry,
    reporter: &mut Reporter,
    context: &ValidationContext<'_>,
) -> Result<(), FailFast> {
    let objects = &context.bundle().objects;
    validate_each(&registry.tracked_entity, reporter, context, &objects.tracked_entities)?;
    validate_each(&registry.enrollment, reporter, context, &objects.enrollments)?;
    validate_each(&registry.event, reporter, context, &objects.events)?;
    validate_each(&registry.relationship, reporter, context, &objects.relationships)?;

    if let Some(validator) = &registry.bundle {
        if validator.needs_to_run(context.strategy()) {
            validator.validate(reporter, context)?;
        }
    }
    Ok(())
}

fn validate_each<T: TrackerDto>(
    validators: &[Box<dyn Validator<T>>],
    reporter: &mut Reporter,
    context: &ValidationContext<'_>,
    records: &[T],
) -> Result<(), FailFast> {
    if validators.is_empty() || records.is_empty() {
        return Ok(());
    }
    let tracker_type = records.first().map(|r| r.tracker_type());
    let mut timings = vec![Duration::ZERO; validators.len()];

    for record in records {
        let strategy = context.resolved_strategy(record);
        for (validator, elapsed) in validators.iter().zip(timings.iter_mut()) {
            if !validator.needs_to_run(strategy) {
                continue;
            }
            let started = Instant::now();
            let outcome = validator.validate(reporter, context, record);
            *elapsed += started.elapsed();
            outcome?;
            if validator.skip_on_error() && reporter.is_invalid_dto(record) {
                break;
            }
        }
    }

    for (validator, elapsed) in validators.iter().zip(timings) {
        tracing::debug!(
            validator = validator.name(),
            tracker_type = ?tracker_type,
            elapsed_us = elapsed.as_micros() as u64,
            "validator finished"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::ValidationCode;
    use tracker_core::{
        Enrollment, Event, ImportStrategy, TrackedEntity, TrackerObjects, TrackerType, Uid, User,
    };
    use tracker_storage::MemoryPreheat;

    fn objects() -> TrackerObjects {
        TrackerObjects {
            tracked_entities: vec![TrackedEntity::new("xK7H53f4Hc2")],
            enrollments: vec![
                Enrollment::new("t1zaUjKgT3p").with_tracked_entity("xK7H53f4Hc2"),
                Enrollment::new("bad-uid").with_tracked_entity("HrZ3kRyB9pQ"),
            ],
            events: vec![Event::new("Qck4PQ7TMun").with_enrollment("t1zaUjKgT3p")],
            relationships: Vec::new(),
        }
    }

    #[test]
    fn valid_records_survive_and_invalid_are_dropped() {
        let service = ValidationService::default();
        let mut bundle = TrackerBundle::new(objects(), ImportStrategy::CreateAndUpdate);
        let result = service.validate(&mut bundle, &MemoryPreheat::new());

        // The uid check stops the remaining enrollment validators.
        let codes: Vec<ValidationCode> = result.errors.iter().map(|e| e.code).collect();
        assert_eq!(codes, vec![ValidationCode::E1048]);
        assert_eq!(bundle.objects.enrollments.len(), 1);
        assert_eq!(bundle.objects.events.len(), 1);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn fail_fast_keeps_only_the_first_error() {
        let service = ValidationService::default();
        let mut objects = objects();
        objects.tracked_entities.push(TrackedEntity::new("also-bad"));
        let mut bundle = TrackerBundle::new(objects, ImportStrategy::Create)
            .with_validation_mode(ValidationMode::FailFast);
        let result = service.validate(&mut bundle, &MemoryPreheat::new());

        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].uid, Uid::from("also-bad"));
        let kept: Vec<&Uid> = bundle
            .objects
            .tracked_entities
            .iter()
            .map(|te| &te.tracked_entity)
            .collect();
        assert_eq!(kept, vec![&Uid::from("xK7H53f4Hc2")]);
    }

    #[test]
    fn skip_requires_a_super_user() {
        let service = ValidationService::default();

        let mut bundle = TrackerBundle::new(objects(), ImportStrategy::Create)
            .with_validation_mode(ValidationMode::Skip)
            .with_user(User::super_user("admin"));
        let result = service.validate(&mut bundle, &MemoryPreheat::new());
        assert!(result.skipped);
        assert!(!result.has_errors());
        assert_eq!(bundle.objects, objects());

        let mut bundle = TrackerBundle::new(objects(), ImportStrategy::Create)
            .with_validation_mode(ValidationMode::Skip)
            .with_user(User::new("clerk"));
        let result = service.validate(&mut bundle, &MemoryPreheat::new());
        assert!(!result.skipped);
        assert!(result.has_error(ValidationCode::E1048));
    }

    #[test]
    fn stored_parent_keeps_child_of_invalid_parent() {
        let objects = TrackerObjects {
            tracked_entities: vec![TrackedEntity::new("xK7H53f4Hc2")],
            enrollments: vec![Enrollment::new("t1zaUjKgT3p").with_tracked_entity("xK7H53f4Hc2")],
            ..TrackerObjects::default()
        };
        let preheat = MemoryPreheat::new().with(TrackerType::TrackedEntity, "xK7H53f4Hc2");

        let service = ValidationService::default();
        let mut bundle = TrackerBundle::new(objects.clone(), ImportStrategy::Create);
        let result = service.validate(&mut bundle, &preheat);
        assert!(result.has_error(ValidationCode::E1002));
        assert!(!result.has_warning(ValidationCode::E5000));
        // Stored parent keeps the enrollment persistable.
        assert_eq!(bundle.objects.enrollments.len(), 1);
    }

    #[test]
    fn exclusion_notices_follow_config() {
        let objects = TrackerObjects {
            tracked_entities: vec![TrackedEntity::new("bad-te")],
            enrollments: vec![Enrollment::new("t1zaUjKgT3p").with_tracked_entity("bad-te")],
            ..TrackerObjects::default()
        };

        let service = ValidationService::default();
        let mut bundle = TrackerBundle::new(objects.clone(), ImportStrategy::Create);
        let result = service.validate(&mut bundle, &MemoryPreheat::new());
        assert!(result.has_error(ValidationCode::E1048));
        assert!(result.has_warning(ValidationCode::E5000));
        assert!(bundle.objects.is_empty());

        let quiet = ValidationService::new(
            ValidatorRegistry::default_registry(),
            ValidatorRegistry::rule_engine_registry(),
            ValidationConfig::default().with_report_exclusions(false),
        );
        let mut bundle = TrackerBundle::new(objects, ImportStrategy::Create);
        let result = quiet.validate(&mut bundle, &MemoryPreheat::new());
        assert!(result.has_error(ValidationCode::E1048));
        assert!(result.warnings.is_empty());
        assert!(bundle.objects.is_empty());
    }

    #[test]
    fn repeated_exclusion_notices_follow_duplicate_policy() {
        let enrollment = Enrollment::new("t1zaUjKgT3p").with_tracked_entity("bad-te");
        let objects = TrackerObjects {
            tracked_entities: vec![TrackedEntity::new("bad-te")],
            enrollments: vec![enrollment.clone(), enrollment],
            ..TrackerObjects::default()
        };
        let notices = |config: ValidationConfig| {
            let service = ValidationService::new(
                ValidatorRegistry::default_registry(),
                ValidatorRegistry::rule_engine_registry(),
                config,
            );
            let mut bundle = TrackerBundle::new(objects.clone(), ImportStrategy::Create);
            let result = service.validate(&mut bundle, &MemoryPreheat::new());
            result
                .warnings
                .iter()
                .filter(|w| w.code == ValidationCode::E5000)
                .count()
        };

        assert_eq!(notices(ValidationConfig::default()), 2);
        assert_eq!(
            notices(ValidationConfig::default().with_duplicate_policy(DuplicatePolicy::Suppress)),
            1
        );
    }
}
