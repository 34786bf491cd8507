use tracker_core::{
    Enrollment, Event, ImportStrategy, RecordRef, Relationship, RelationshipItem, TrackedEntity,
    TrackerObjects, TrackerType, TypedUids, Uid,
};
use tracker_engine::persistables::{self, Persistables};
use tracker_storage::MemoryPreheat;

/// A payload together with the validation outcome and stored state a test
/// wants the filter to see.
#[derive(Debug, Clone, Default)]
pub struct Setup {
    pub objects: TrackerObjects,
    pub invalid: TypedUids,
    pub preheat: MemoryPreheat,
}

impl Setup {
    pub fn builder() -> SetupBuilder {
        SetupBuilder::default()
    }

    /// Run the persistability filter the way the validation service does.
    pub fn filter(&self, strategy: ImportStrategy) -> Persistables {
        let existing = persistables::existing_references(&self.objects, strategy, &self.preheat);
        persistables::filter(&self.objects, &self.invalid, strategy, &existing)
    }
}

/// Builds a payload as a tree: `enrollment` attaches to the last tracked
/// entity, `event` to the last enrollment. The marker methods
/// (`is_not_valid`, `is_in_db`, `is_not_in_payload`) apply to the record
/// added last.
#[derive(Debug, Default)]
pub struct SetupBuilder {
    objects: TrackerObjects,
    invalid: TypedUids,
    preheat: MemoryPreheat,
    not_in_payload: TypedUids,
    current: Option<RecordRef>,
    tracked_entity: Option<Uid>,
    enrollment: Option<Uid>,
}

impl SetupBuilder {
    pub fn tracked_entity(mut self, uid: &str) -> Self {
        self.objects.tracked_entities.push(TrackedEntity::new(uid));
        self.tracked_entity = Some(Uid::from(uid));
        self.enrollment = None;
        self.mark_current(TrackerType::TrackedEntity, uid)
    }

    pub fn enrollment(mut self, uid: &str) -> Self {
        let mut enrollment = Enrollment::new(uid);
        enrollment.tracked_entity = self.tracked_entity.clone();
        self.objects.enrollments.push(enrollment);
        self.enrollment = Some(Uid::from(uid));
        self.mark_current(TrackerType::Enrollment, uid)
    }

    pub fn event(mut self, uid: &str) -> Self {
        let mut event = Event::new(uid);
        event.enrollment = self.enrollment.clone();
        self.objects.events.push(event);
        self.mark_current(TrackerType::Event, uid)
    }

    /// An event outside any enrollment.
    pub fn event_without_registration(mut self, uid: &str) -> Self {
        self.objects.events.push(Event::new(uid));
        self.mark_current(TrackerType::Event, uid)
    }

    pub fn relationship(mut self, uid: &str, from: RelationshipItem, to: RelationshipItem) -> Self {
        self.objects.relationships.push(Relationship::new(uid, from, to));
        self.mark_current(TrackerType::Relationship, uid)
    }

    pub fn is_not_valid(mut self) -> Self {
        if let Some(current) = &self.current {
            self.invalid.insert(current.tracker_type, current.uid.clone());
        }
        self
    }

    pub fn is_in_db(mut self) -> Self {
        if let Some(current) = &self.current {
            self.preheat.insert(current.tracker_type, current.uid.clone());
        }
        self
    }

    /// Drop the record from the payload while keeping it as the parent of
    /// records added after it.
    pub fn is_not_in_payload(mut self) -> Self {
        if let Some(current) = &self.current {
            self.not_in_payload.insert(current.tracker_type, current.uid.clone());
        }
        self
    }

    pub fn build(self) -> Setup {
        let keep = |tracker_type: TrackerType, uid: &Uid| !self.not_in_payload.contains(tracker_type, uid);
        let objects = TrackerObjects {
            tracked_entities: self
                .objects
                .tracked_entities
                .iter()
                .filter(|te| keep(TrackerType::TrackedEntity, &te.tracked_entity))
                .cloned()
                .collect(),
            enrollments: self
                .objects
                .enrollments
                .iter()
                .filter(|e| keep(TrackerType::Enrollment, &e.enrollment))
                .cloned()
                .collect(),
            events: self
                .objects
                .events
                .iter()
                .filter(|e| keep(TrackerType::Event, &e.event))
                .cloned()
                .collect(),
            relationships: self
                .objects
                .relationships
                .iter()
                .filter(|r| keep(TrackerType::Relationship, &r.relationship))
                .cloned()
                .collect(),
        };
        Setup {
            objects,
            invalid: self.invalid,
            preheat: self.preheat,
        }
    }

    fn mark_current(mut self, tracker_type: TrackerType, uid: &str) -> Self {
        self.current = Some(RecordRef::new(tracker_type, uid));
        self
    }
}
