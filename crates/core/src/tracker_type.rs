use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::CoreError;
use crate::ids::Uid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackerType {
    TrackedEntity,
    Enrollment,
    Event,
    Relationship,
}

impl TrackerType {
    /// Processing order. Records of a later type may depend on the outcome
    /// for records of an earlier type, never the other way round.
    pub const ORDER: [TrackerType; 4] = [
        TrackerType::TrackedEntity,
        TrackerType::Enrollment,
        TrackerType::Event,
        TrackerType::Relationship,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TrackedEntity => "TRACKED_ENTITY",
            Self::Enrollment => "ENROLLMENT",
            Self::Event => "EVENT",
            Self::Relationship => "RELATIONSHIP",
        }
    }

    /// Name used in user facing messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::TrackedEntity => "trackedEntity",
            Self::Enrollment => "enrollment",
            Self::Event => "event",
            Self::Relationship => "relationship",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "TRACKED_ENTITY" => Ok(Self::TrackedEntity),
            "ENROLLMENT" => Ok(Self::Enrollment),
            "EVENT" => Ok(Self::Event),
            "RELATIONSHIP" => Ok(Self::Relationship),
            _ => Err(CoreError::UnknownTrackerType(s.to_string())),
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::TrackedEntity => 0,
            Self::Enrollment => 1,
            Self::Event => 2,
            Self::Relationship => 3,
        }
    }
}

impl fmt::Display for TrackerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One set of uids per tracker type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypedUids {
    sets: [HashSet<Uid>; 4],
}

impl TypedUids {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the uid was not yet present for this type.
    pub fn insert(&mut self, tracker_type: TrackerType, uid: Uid) -> bool {
        self.sets[tracker_type.index()].insert(uid)
    }

    pub fn contains(&self, tracker_type: TrackerType, uid: &Uid) -> bool {
        self.sets[tracker_type.index()].contains(uid)
    }

    pub fn get(&self, tracker_type: TrackerType) -> &HashSet<Uid> {
        &self.sets[tracker_type.index()]
    }

    pub fn len(&self) -> usize {
        self.sets.iter().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.iter().all(HashSet::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TrackerType, &Uid)> {
        TrackerType::ORDER
            .into_iter()
            .flat_map(move |t| self.get(t).iter().map(move |uid| (t, uid)))
    }
}

impl FromIterator<(TrackerType, Uid)> for TypedUids {
    fn from_iter<I: IntoIterator<Item = (TrackerType, Uid)>>(iter: I) -> Self {
        let mut uids = Self::new();
        for (tracker_type, uid) in iter {
            uids.insert(tracker_type, uid);
        }
        uids
    }
}
