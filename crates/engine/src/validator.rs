use tracker_core::{
    Enrollment, Event, ImportStrategy, Relationship, TrackedEntity, TrackerBundle, TrackerDto,
    TrackerType, TypedUids, Uid, User,
};
use tracker_storage::Preheat;

use crate::reporter::{FailFast, Reporter};

/// Read-only view of the bundle under validation.
pub struct ValidationContext<'a> {
    bundle: &'a TrackerBundle,
    preheat: &'a dyn Preheat,
    payload: TypedUids,
}

impl<'a> ValidationContext<'a> {
    pub fn new(bundle: &'a TrackerBundle, preheat: &'a dyn Preheat) -> Self {
        Self {
            bundle,
            preheat,
            payload: bundle.objects.uids(),
        }
    }

    pub fn bundle(&self) -> &'a TrackerBundle {
        self.bundle
    }

    pub fn user(&self) -> &'a User {
        &self.bundle.user
    }

    pub fn strategy(&self) -> ImportStrategy {
        self.bundle.strategy
    }

    /// Bundle strategy with CREATE_AND_UPDATE resolved against existence.
    pub fn resolved_strategy(&self, record: &dyn TrackerDto) -> ImportStrategy {
        self.bundle
            .strategy
            .resolve(self.exists(record.tracker_type(), record.uid()))
    }

    /// Whether the record was stored before this import.
    pub fn exists(&self, tracker_type: TrackerType, uid: &Uid) -> bool {
        self.preheat.exists(tracker_type, uid)
    }

    pub fn in_payload(&self, tracker_type: TrackerType, uid: &Uid) -> bool {
        self.payload.contains(tracker_type, uid)
    }

    /// Present in the payload or already stored.
    pub fn is_known(&self, tracker_type: TrackerType, uid: &Uid) -> bool {
        self.in_payload(tracker_type, uid) || self.exists(tracker_type, uid)
    }
}

/// A check over one record of type `T`.
pub trait Validator<T: TrackerDto> {
    fn name(&self) -> &'static str;

    fn validate(
        &self,
        reporter: &mut Reporter,
        context: &ValidationContext<'_>,
        record: &T,
    ) -> Result<(), FailFast>;

    /// Receives the record's resolved strategy.
    fn needs_to_run(&self, strategy: ImportStrategy) -> bool {
        !strategy.is_delete()
    }

    /// Stop running further validators on a record once it has an error.
    fn skip_on_error(&self) -> bool {
        false
    }
}

/// A check over the whole bundle, run after every per-record validator.
pub trait BundleValidator {
    fn name(&self) -> &'static str;

    fn validate(
        &self,
        reporter: &mut Reporter,
        context: &ValidationContext<'_>,
    ) -> Result<(), FailFast>;

    fn needs_to_run(&self, strategy: ImportStrategy) -> bool {
        !strategy.is_delete()
    }
}

/// Ordered validators per record type plus an optional bundle validator.
#[derive(Default)]
pub struct ValidatorRegistry {
    pub(crate) tracked_entity: Vec<Box<dyn Validator<TrackedEntity>>>,
    pub(crate) enrollment: Vec<Box<dyn Validator<Enrollment>>>,
    pub(crate) event: Vec<Box<dyn Validator<Event>>>,
    pub(crate) relationship: Vec<Box<dyn Validator<Relationship>>>,
    pub(crate) bundle: Option<Box<dyn BundleValidator>>,
}

impl ValidatorRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_tracked_entity(mut self, validator: impl Validator<TrackedEntity> + 'static) -> Self {
        self.tracked_entity.push(Box::new(validator));
        self
    }

    pub fn with_enrollment(mut self, validator: impl Validator<Enrollment> + 'static) -> Self {
        self.enrollment.push(Box::new(validator));
        self
    }

    pub fn with_event(mut self, validator: impl Validator<Event> + 'static) -> Self {
        self.event.push(Box::new(validator));
        self
    }

    pub fn with_relationship(mut self, validator: impl Validator<Relationship> + 'static) -> Self {
        self.relationship.push(Box::new(validator));
        self
    }

    /// Replaces any bundle validator already set.
    pub fn with_bundle(mut self, validator: impl BundleValidator + 'static) -> Self {
        self.bundle = Some(Box::new(validator));
        self
    }

    pub fn len(&self, tracker_type: TrackerType) -> usize {
        match tracker_type {
            TrackerType::TrackedEntity => self.tracked_entity.len(),
            TrackerType::Enrollment => self.enrollment.len(),
            TrackerType::Event => self.event.len(),
            TrackerType::Relationship => self.relationship.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bundle.is_none() && TrackerType::ORDER.into_iter().all(|t| self.len(t) == 0)
    }

    pub fn names(&self, tracker_type: TrackerType) -> Vec<&'static str> {
        match tracker_type {
            TrackerType::TrackedEntity => self.tracked_entity.iter().map(|v| v.name()).collect(),
            TrackerType::Enrollment => self.enrollment.iter().map(|v| v.name()).collect(),
            TrackerType::Event => self.event.iter().map(|v| v.name()).collect(),
            TrackerType::Relationship => self.relationship.iter().map(|v| v.name()).collect(),
        }
    }
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("tracked_entity", &self.names(TrackerType::TrackedEntity))
            .field("enrollment", &self.names(TrackerType::Enrollment))
            .field("event", &self.names(TrackerType::Event))
            .field("relationship", &self.names(TrackerType::Relationship))
            .field("bundle", &self.bundle.as_ref().map(|v| v.name()))
            .finish()
    }
}
