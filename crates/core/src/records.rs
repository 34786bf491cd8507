use serde::{Deserialize, Serialize};

use crate::ids::Uid;
use crate::tracker_type::TrackerType;

/// Identity shared by every tracker record.
pub trait TrackerDto {
    fn tracker_type(&self) -> TrackerType;
    fn uid(&self) -> &Uid;
}

impl<T: TrackerDto + ?Sized> TrackerDto for &T {
    fn tracker_type(&self) -> TrackerType {
        (**self).tracker_type()
    }

    fn uid(&self) -> &Uid {
        (**self).uid()
    }
}

/// Bare (type, uid) identity, for reporting against records that are only
/// known by reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordRef {
    pub tracker_type: TrackerType,
    pub uid: Uid,
}

impl RecordRef {
    pub fn new(tracker_type: TrackerType, uid: impl Into<Uid>) -> Self {
        Self {
            tracker_type,
            uid: uid.into(),
        }
    }
}

impl TrackerDto for RecordRef {
    fn tracker_type(&self) -> TrackerType {
        self.tracker_type
    }

    fn uid(&self) -> &Uid {
        &self.uid
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedEntity {
    pub tracked_entity: Uid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracked_entity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_unit: Option<String>,
}

impl TrackedEntity {
    pub fn new(uid: impl Into<Uid>) -> Self {
        Self {
            tracked_entity: uid.into(),
            tracked_entity_type: None,
            org_unit: None,
        }
    }
}

impl TrackerDto for TrackedEntity {
    fn tracker_type(&self) -> TrackerType {
        TrackerType::TrackedEntity
    }

    fn uid(&self) -> &Uid {
        &self.tracked_entity
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub enrollment: Uid,
    /// Required for a valid enrollment, but may be absent in a payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracked_entity: Option<Uid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_unit: Option<String>,
}

impl Enrollment {
    pub fn new(uid: impl Into<Uid>) -> Self {
        Self {
            enrollment: uid.into(),
            tracked_entity: None,
            program: None,
            org_unit: None,
        }
    }

    pub fn with_tracked_entity(mut self, tracked_entity: impl Into<Uid>) -> Self {
        self.tracked_entity = Some(tracked_entity.into());
        self
    }
}

impl TrackerDto for Enrollment {
    fn tracker_type(&self) -> TrackerType {
        TrackerType::Enrollment
    }

    fn uid(&self) -> &Uid {
        &self.enrollment
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub event: Uid,
    /// Absent for events of event programs, which have no enrollment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrollment: Option<Uid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_unit: Option<String>,
}

impl Event {
    pub fn new(uid: impl Into<Uid>) -> Self {
        Self {
            event: uid.into(),
            enrollment: None,
            program: None,
            program_stage: None,
            org_unit: None,
        }
    }

    pub fn with_enrollment(mut self, enrollment: impl Into<Uid>) -> Self {
        self.enrollment = Some(enrollment.into());
        self
    }
}

impl TrackerDto for Event {
    fn tracker_type(&self) -> TrackerType {
        TrackerType::Event
    }

    fn uid(&self) -> &Uid {
        &self.event
    }
}

/// One end of a relationship. Well-formed items set exactly one field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracked_entity: Option<Uid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrollment: Option<Uid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<Uid>,
}

impl RelationshipItem {
    pub fn tracked_entity(uid: impl Into<Uid>) -> Self {
        Self {
            tracked_entity: Some(uid.into()),
            ..Self::default()
        }
    }

    pub fn enrollment(uid: impl Into<Uid>) -> Self {
        Self {
            enrollment: Some(uid.into()),
            ..Self::default()
        }
    }

    pub fn event(uid: impl Into<Uid>) -> Self {
        Self {
            event: Some(uid.into()),
            ..Self::default()
        }
    }

    /// The referenced record, or `None` unless exactly one field is set.
    pub fn endpoint(&self) -> Option<(TrackerType, &Uid)> {
        match (&self.tracked_entity, &self.enrollment, &self.event) {
            (Some(uid), None, None) => Some((TrackerType::TrackedEntity, uid)),
            (None, Some(uid), None) => Some((TrackerType::Enrollment, uid)),
            (None, None, Some(uid)) => Some((TrackerType::Event, uid)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub relationship: Uid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship_type: Option<String>,
    #[serde(default)]
    pub from: RelationshipItem,
    #[serde(default)]
    pub to: RelationshipItem,
}

impl Relationship {
    pub fn new(uid: impl Into<Uid>, from: RelationshipItem, to: RelationshipItem) -> Self {
        Self {
            relationship: uid.into(),
            relationship_type: None,
            from,
            to,
        }
    }

    pub fn endpoints(&self) -> [Option<(TrackerType, &Uid)>; 2] {
        [self.from.endpoint(), self.to.endpoint()]
    }
}

impl TrackerDto for Relationship {
    fn tracker_type(&self) -> TrackerType {
        TrackerType::Relationship
    }

    fn uid(&self) -> &Uid {
        &self.relationship
    }
}
