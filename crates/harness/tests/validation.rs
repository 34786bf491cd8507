use tracker_core::{
    Enrollment, Event, ImportStrategy, TrackedEntity, TrackerBundle, TrackerObjects, TrackerType,
    Uid, User, ValidationMode,
};
use tracker_engine::{
    DuplicatePolicy, ValidationCode, ValidationConfig, ValidationService, ValidatorRegistry,
};
use tracker_harness::{CallLog, ScriptedBundleValidator, ScriptedValidator, call_log, init_logging};
use tracker_storage::MemoryPreheat;

fn payload() -> TrackerObjects {
    TrackerObjects {
        tracked_entities: vec![
            TrackedEntity::new("xK7H53f4Hc2"),
            TrackedEntity::new("QxGbKYwChDM"),
        ],
        enrollments: vec![Enrollment::new("t1zaUjKgT3p").with_tracked_entity("xK7H53f4Hc2")],
        events: vec![Event::new("Qck4PQ7TMun").with_enrollment("t1zaUjKgT3p")],
        relationships: Vec::new(),
    }
}

fn service(registry: ValidatorRegistry) -> ValidationService {
    ValidationService::new(registry, ValidatorRegistry::empty(), ValidationConfig::default())
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn records_run_in_type_order_then_bundle() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let log = call_log();
    let registry = ValidatorRegistry::empty()
        .with_event(ScriptedValidator::new("a", &log))
        .with_enrollment(ScriptedValidator::new("a", &log))
        .with_tracked_entity(ScriptedValidator::new("a", &log))
        .with_tracked_entity(ScriptedValidator::new("b", &log))
        .with_bundle(ScriptedBundleValidator::new(&log));

    let mut bundle = TrackerBundle::new(payload(), ImportStrategy::CreateAndUpdate);
    service(registry).validate(&mut bundle, &MemoryPreheat::new());

    assert_eq!(
        *log.borrow(),
        vec![
            "a xK7H53f4Hc2",
            "b xK7H53f4Hc2",
            "a QxGbKYwChDM",
            "b QxGbKYwChDM",
            "a t1zaUjKgT3p",
            "a Qck4PQ7TMun",
            "bundle",
        ]
    );
    Ok(())
}

#[test]
fn identical_runs_report_identically() -> Result<(), Box<dyn std::error::Error>> {
    let run = || {
        let log = call_log();
        let registry = ValidatorRegistry::empty()
            .with_tracked_entity(ScriptedValidator::new("a", &log).rejecting("QxGbKYwChDM"))
            .with_event(ScriptedValidator::new("b", &log).warning("Qck4PQ7TMun"));
        let mut bundle = TrackerBundle::new(payload(), ImportStrategy::Create);
        service(registry).validate(&mut bundle, &MemoryPreheat::new())
    };
    assert_eq!(run(), run());
    Ok(())
}

// ============================================================================
// Skip-on-error and needs-to-run
// ============================================================================

#[test]
fn skip_on_error_only_affects_the_failing_record() -> Result<(), Box<dyn std::error::Error>> {
    let log = call_log();
    let registry = ValidatorRegistry::empty()
        .with_tracked_entity(
            ScriptedValidator::new("first", &log)
                .rejecting("xK7H53f4Hc2")
                .skipping_on_error(),
        )
        .with_tracked_entity(ScriptedValidator::new("second", &log));

    let mut bundle = TrackerBundle::new(payload(), ImportStrategy::Create);
    let result = service(registry).validate(&mut bundle, &MemoryPreheat::new());

    assert_eq!(
        *log.borrow(),
        vec!["first xK7H53f4Hc2", "first QxGbKYwChDM", "second QxGbKYwChDM"]
    );
    assert_eq!(result.errors.len(), 1);
    Ok(())
}

#[test]
fn failing_validator_without_skip_lets_later_ones_run() -> Result<(), Box<dyn std::error::Error>> {
    let log = call_log();
    let registry = ValidatorRegistry::empty()
        .with_tracked_entity(ScriptedValidator::new("first", &log).rejecting("xK7H53f4Hc2"))
        .with_tracked_entity(ScriptedValidator::new("second", &log).rejecting("xK7H53f4Hc2"));

    let mut bundle = TrackerBundle::new(payload(), ImportStrategy::Create);
    let result = service(registry).validate(&mut bundle, &MemoryPreheat::new());

    assert_eq!(result.errors.len(), 2);
    assert!(log.borrow().contains(&"second xK7H53f4Hc2".to_string()));
    Ok(())
}

#[test]
fn needs_to_run_sees_the_resolved_strategy() -> Result<(), Box<dyn std::error::Error>> {
    let log = call_log();
    let registry = ValidatorRegistry::empty().with_tracked_entity(
        ScriptedValidator::new("update-only", &log).only_for(&[ImportStrategy::Update]),
    );
    let preheat = MemoryPreheat::new().with(TrackerType::TrackedEntity, "QxGbKYwChDM");

    let mut bundle = TrackerBundle::new(payload(), ImportStrategy::CreateAndUpdate);
    service(registry).validate(&mut bundle, &preheat);

    assert_eq!(*log.borrow(), vec!["update-only QxGbKYwChDM"]);
    Ok(())
}

#[test]
fn delete_skips_validators_by_default() -> Result<(), Box<dyn std::error::Error>> {
    let log = call_log();
    let registry = ValidatorRegistry::empty()
        .with_tracked_entity(ScriptedValidator::new("default", &log))
        .with_tracked_entity(
            ScriptedValidator::new("delete", &log).only_for(&[ImportStrategy::Delete]),
        )
        .with_bundle(ScriptedBundleValidator::new(&log));

    let mut bundle = TrackerBundle::new(payload(), ImportStrategy::Delete);
    service(registry).validate(&mut bundle, &MemoryPreheat::new());

    assert_eq!(*log.borrow(), vec!["delete xK7H53f4Hc2", "delete QxGbKYwChDM"]);
    Ok(())
}

// ============================================================================
// Fail-fast
// ============================================================================

#[test]
fn fail_fast_stops_at_the_first_error() -> Result<(), Box<dyn std::error::Error>> {
    let log = call_log();
    let registry = ValidatorRegistry::empty()
        .with_tracked_entity(ScriptedValidator::new("a", &log).rejecting("QxGbKYwChDM"))
        .with_event(ScriptedValidator::new("a", &log))
        .with_bundle(ScriptedBundleValidator::new(&log));

    let mut bundle = TrackerBundle::new(payload(), ImportStrategy::Create)
        .with_validation_mode(ValidationMode::FailFast);
    let result = service(registry).validate(&mut bundle, &MemoryPreheat::new());

    assert_eq!(*log.borrow(), vec!["a xK7H53f4Hc2", "a QxGbKYwChDM"]);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].uid, Uid::from("QxGbKYwChDM"));

    // The bundle is still narrowed from what was collected before the abort.
    let kept: Vec<&Uid> = bundle.objects.tracked_entities.iter().map(|te| &te.tracked_entity).collect();
    assert_eq!(kept, vec![&Uid::from("xK7H53f4Hc2")]);
    assert_eq!(bundle.objects.enrollments.len(), 1);
    assert_eq!(bundle.objects.events.len(), 1);
    Ok(())
}

#[test]
fn bundle_validator_errors_invalidate_records() -> Result<(), Box<dyn std::error::Error>> {
    use tracker_core::{Relationship, RelationshipItem};

    let log = call_log();
    let registry = ValidatorRegistry::empty()
        .with_bundle(ScriptedBundleValidator::new(&log).rejecting("Te3IC6TpnBB"));
    let mut objects = payload();
    objects.relationships.push(Relationship::new(
        "Te3IC6TpnBB",
        RelationshipItem::tracked_entity("xK7H53f4Hc2"),
        RelationshipItem::tracked_entity("QxGbKYwChDM"),
    ));

    let mut bundle = TrackerBundle::new(objects, ImportStrategy::Create);
    let result = service(registry).validate(&mut bundle, &MemoryPreheat::new());

    assert!(result.has_error(ValidationCode::E1300));
    assert!(bundle.objects.relationships.is_empty());
    assert_eq!(bundle.objects.tracked_entities.len(), 2);
    Ok(())
}

// ============================================================================
// Reporter invariants through the service
// ============================================================================

#[test]
fn persisted_records_are_never_invalid() -> Result<(), Box<dyn std::error::Error>> {
    let log = call_log();
    let registry = ValidatorRegistry::default_registry()
        .with_tracked_entity(ScriptedValidator::new("extra", &log).rejecting("QxGbKYwChDM"))
        .with_enrollment(ScriptedValidator::new("extra", &log).rejecting("t1zaUjKgT3p"));

    let mut bundle = TrackerBundle::new(payload(), ImportStrategy::Create);
    let result = service(registry).validate(&mut bundle, &MemoryPreheat::new());

    for error in &result.errors {
        let kept = bundle.objects.uids();
        assert!(!kept.contains(error.tracker_type, &error.uid));
    }
    assert_eq!(bundle.objects.tracked_entities.len(), 1);
    assert!(bundle.objects.enrollments.is_empty());
    assert!(bundle.objects.events.is_empty());
    // The event is valid but its enrollment was rejected.
    assert!(result.has_warning(ValidationCode::E5000));
    Ok(())
}

#[test]
fn duplicate_errors_follow_policy() -> Result<(), Box<dyn std::error::Error>> {
    let registry = |log: &CallLog| {
        ValidatorRegistry::empty()
            .with_tracked_entity(ScriptedValidator::new("dup", log).rejecting("xK7H53f4Hc2"))
            .with_tracked_entity(ScriptedValidator::new("dup", log).rejecting("xK7H53f4Hc2"))
            .with_event(ScriptedValidator::new("warn", log).warning("Qck4PQ7TMun"))
            .with_event(ScriptedValidator::new("warn", log).warning("Qck4PQ7TMun"))
    };
    let log = call_log();

    let keep = ValidationService::new(
        registry(&log),
        ValidatorRegistry::empty(),
        ValidationConfig::default(),
    );
    let mut bundle = TrackerBundle::new(payload(), ImportStrategy::Create);
    let result = keep.validate(&mut bundle, &MemoryPreheat::new());
    assert_eq!(result.errors.len(), 2);
    assert_eq!(result.warnings.iter().filter(|w| w.code == ValidationCode::E1300).count(), 2);

    let suppress = ValidationService::new(
        registry(&log),
        ValidatorRegistry::empty(),
        ValidationConfig::default().with_duplicate_policy(DuplicatePolicy::Suppress),
    );
    let mut bundle = TrackerBundle::new(payload(), ImportStrategy::Create);
    let result = suppress.validate(&mut bundle, &MemoryPreheat::new());
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.warnings.iter().filter(|w| w.code == ValidationCode::E1300).count(), 1);
    Ok(())
}

#[test]
fn super_user_skip_bypasses_every_validator() -> Result<(), Box<dyn std::error::Error>> {
    let log = call_log();
    let registry = ValidatorRegistry::empty()
        .with_tracked_entity(ScriptedValidator::new("a", &log).rejecting("xK7H53f4Hc2"));
    let mut bundle = TrackerBundle::new(payload(), ImportStrategy::Create)
        .with_validation_mode(ValidationMode::Skip)
        .with_user(User::super_user("admin"));

    let result = service(registry).validate(&mut bundle, &MemoryPreheat::new());
    assert!(result.skipped);
    assert!(log.borrow().is_empty());
    assert_eq!(bundle.objects, payload());
    Ok(())
}
