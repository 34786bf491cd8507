//! Decides which records of a validated bundle can be handed to storage.
//!
//! Creates and updates are decided top-down (tracked entities, enrollments,
//! events, relationships): a record is persistable when it is valid and
//! every parent or endpoint it references is persistable or already stored.
//!
//! Deletes are decided bottom-up (relationships, events, enrollments,
//! tracked entities): a record is deletable when it is valid and no child in
//! the payload blocks it. A child that cannot be deleted blocks its parent,
//! an invalid relationship blocks both of its endpoints.
//!
//! Records that are valid but excluded because of another record produce a
//! notice naming that record. Invalid records produce none; their errors
//! already explain why.

use std::collections::HashMap;

use tracker_core::{
    ImportStrategy, RecordRef, TrackerDto, TrackerObjects, TrackerType, TypedUids, Uid,
};
use tracker_storage::Preheat;

use crate::codes::ValidationCode;
use crate::report::ValidationWarning;

#[derive(Debug, Clone, Default)]
pub struct Persistables {
    /// The payload narrowed to persistable records, in payload order.
    pub objects: TrackerObjects,
    pub uids: TypedUids,
    pub exclusions: Vec<ValidationWarning>,
}

impl Persistables {
    pub fn contains(&self, tracker_type: TrackerType, uid: &Uid) -> bool {
        self.uids.contains(tracker_type, uid)
    }

    pub fn count(&self, tracker_type: TrackerType) -> usize {
        self.objects.count(tracker_type)
    }
}

/// Looks up every parent and endpoint the payload references, once each.
///
/// Deletes never consult storage.
pub fn existing_references(
    objects: &TrackerObjects,
    strategy: ImportStrategy,
    preheat: &dyn Preheat,
) -> TypedUids {
    if strategy.is_delete() {
        return TypedUids::new();
    }

    let mut referenced = TypedUids::new();
    for enrollment in &objects.enrollments {
        if let Some(te) = &enrollment.tracked_entity {
            referenced.insert(TrackerType::TrackedEntity, te.clone());
        }
    }
    for event in &objects.events {
        if let Some(enrollment) = &event.enrollment {
            referenced.insert(TrackerType::Enrollment, enrollment.clone());
        }
    }
    for relationship in &objects.relationships {
        for (tracker_type, uid) in relationship.endpoints().into_iter().flatten() {
            referenced.insert(tracker_type, uid.clone());
        }
    }

    referenced
        .iter()
        .filter(|(tracker_type, uid)| preheat.exists(*tracker_type, uid))
        .map(|(tracker_type, uid)| (tracker_type, uid.clone()))
        .collect()
}

/// Pure function of its inputs; running it again on its own output with no
/// invalid records returns the same output.
pub fn filter(
    objects: &TrackerObjects,
    invalid: &TypedUids,
    strategy: ImportStrategy,
    existing: &TypedUids,
) -> Persistables {
    let persistables = if strategy.is_delete() {
        filter_delete(objects, invalid)
    } else {
        filter_create_and_update(objects, invalid, existing)
    };

    tracing::debug!(
        strategy = %strategy,
        payload = TrackerType::ORDER.iter().map(|t| objects.count(*t)).sum::<usize>(),
        persistable = persistables.uids.len(),
        exclusions = persistables.exclusions.len(),
        "filtered persistable records"
    );
    persistables
}

fn cannot_persist(record: &dyn TrackerDto, tracker_type: TrackerType, uid: &Uid) -> ValidationWarning {
    ValidationWarning::new(
        record,
        ValidationCode::E5000,
        &[
            &record.tracker_type().display_name(),
            record.uid(),
            &tracker_type.display_name(),
            uid,
        ],
    )
}

fn cannot_delete(record: &dyn TrackerDto, blocker: &RecordRef) -> ValidationWarning {
    ValidationWarning::new(
        record,
        ValidationCode::E5001,
        &[
            &record.tracker_type().display_name(),
            record.uid(),
            &blocker.tracker_type.display_name(),
            &blocker.uid,
        ],
    )
}

struct TopDown<'a> {
    invalid: &'a TypedUids,
    existing: &'a TypedUids,
    persistable: TypedUids,
    exclusions: Vec<ValidationWarning>,
}

impl TopDown<'_> {
    fn reachable(&self, tracker_type: TrackerType, uid: &Uid) -> bool {
        self.persistable.contains(tracker_type, uid) || self.existing.contains(tracker_type, uid)
    }

    /// `references` are the parents or endpoints the record needs, `None`
    /// where one is absent or malformed.
    fn decide(&mut self, record: &dyn TrackerDto, references: &[Option<(TrackerType, &Uid)>]) {
        if self.invalid.contains(record.tracker_type(), record.uid()) {
            return;
        }
        for reference in references {
            match reference {
                Some((tracker_type, uid)) if self.reachable(*tracker_type, uid) => {}
                Some((tracker_type, uid)) => {
                    self.exclusions.push(cannot_persist(record, *tracker_type, uid));
                    return;
                }
                None => {
                    tracing::debug!(
                        tracker_type = %record.tracker_type(),
                        uid = %record.uid(),
                        "excluding record with an unresolvable reference"
                    );
                    return;
                }
            }
        }
        self.persistable.insert(record.tracker_type(), record.uid().clone());
    }
}

fn filter_create_and_update(
    objects: &TrackerObjects,
    invalid: &TypedUids,
    existing: &TypedUids,
) -> Persistables {
    let mut pass = TopDown {
        invalid,
        existing,
        persistable: TypedUids::new(),
        exclusions: Vec::new(),
    };

    for te in &objects.tracked_entities {
        pass.decide(te, &[]);
    }
    for enrollment in &objects.enrollments {
        let parent = enrollment
            .tracked_entity
            .as_ref()
            .map(|uid| (TrackerType::TrackedEntity, uid));
        pass.decide(enrollment, &[parent]);
    }
    for event in &objects.events {
        match &event.enrollment {
            Some(uid) => pass.decide(event, &[Some((TrackerType::Enrollment, uid))]),
            None => pass.decide(event, &[]),
        }
    }
    for relationship in &objects.relationships {
        pass.decide(relationship, &relationship.endpoints());
    }

    Persistables {
        objects: narrow(objects, &pass.persistable),
        uids: pass.persistable,
        exclusions: pass.exclusions,
    }
}

struct BottomUp<'a> {
    invalid: &'a TypedUids,
    /// Records that cannot be deleted, with the first child blocking them.
    blocked: HashMap<(TrackerType, Uid), RecordRef>,
    deletable: TypedUids,
    exclusions: Vec<ValidationWarning>,
}

impl BottomUp<'_> {
    fn block(&mut self, tracker_type: TrackerType, uid: &Uid, child: &dyn TrackerDto) {
        self.blocked
            .entry((tracker_type, uid.clone()))
            .or_insert_with(|| RecordRef::new(child.tracker_type(), child.uid().clone()));
    }

    /// Returns whether the record can be deleted.
    fn decide(&mut self, record: &dyn TrackerDto) -> bool {
        let (tracker_type, uid) = (record.tracker_type(), record.uid());
        if self.invalid.contains(tracker_type, uid) {
            return false;
        }
        if let Some(blocker) = self.blocked.get(&(tracker_type, uid.clone())) {
            self.exclusions.push(cannot_delete(record, blocker));
            return false;
        }
        self.deletable.insert(tracker_type, uid.clone());
        true
    }
}

fn filter_delete(objects: &TrackerObjects, invalid: &TypedUids) -> Persistables {
    let mut pass = BottomUp {
        invalid,
        blocked: HashMap::new(),
        deletable: TypedUids::new(),
        exclusions: Vec::new(),
    };

    for relationship in &objects.relationships {
        if !pass.decide(relationship) {
            for (tracker_type, uid) in relationship.endpoints().into_iter().flatten() {
                pass.block(tracker_type, uid, relationship);
            }
        }
    }
    for event in &objects.events {
        if !pass.decide(event) {
            if let Some(enrollment) = &event.enrollment {
                pass.block(TrackerType::Enrollment, enrollment, event);
            }
        }
    }
    for enrollment in &objects.enrollments {
        if !pass.decide(enrollment) {
            if let Some(te) = &enrollment.tracked_entity {
                pass.block(TrackerType::TrackedEntity, te, enrollment);
            }
        }
    }
    for te in &objects.tracked_entities {
        pass.decide(te);
    }

    Persistables {
        objects: narrow(objects, &pass.deletable),
        uids: pass.deletable,
        exclusions: pass.exclusions,
    }
}

fn narrow(objects: &TrackerObjects, keep: &TypedUids) -> TrackerObjects {
    fn retain<T: TrackerDto + Clone>(records: &[T], keep: &TypedUids) -> Vec<T> {
        records
            .iter()
            .filter(|r| keep.contains(r.tracker_type(), r.uid()))
            .cloned()
            .collect()
    }

    TrackerObjects {
        tracked_entities: retain(&objects.tracked_entities, keep),
        enrollments: retain(&objects.enrollments, keep),
        events: retain(&objects.events, keep),
        relationships: retain(&objects.relationships, keep),
    }
}
