use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::ids::{ImportId, Uid};
use crate::records::*;
use crate::strategy::{ImportStrategy, User, ValidationMode};
use crate::tracker_type::{TrackerType, TypedUids};

/// The four record lists of an import payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerObjects {
    #[serde(default)]
    pub tracked_entities: Vec<TrackedEntity>,
    #[serde(default)]
    pub enrollments: Vec<Enrollment>,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl TrackerObjects {
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        serde_json::from_str(json).map_err(|e| CoreError::Serialization(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string(self).map_err(|e| CoreError::Serialization(e.to_string()))
    }

    pub fn count(&self, tracker_type: TrackerType) -> usize {
        match tracker_type {
            TrackerType::TrackedEntity => self.tracked_entities.len(),
            TrackerType::Enrollment => self.enrollments.len(),
            TrackerType::Event => self.events.len(),
            TrackerType::Relationship => self.relationships.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        TrackerType::ORDER.into_iter().all(|t| self.count(t) == 0)
    }

    /// Uids of every record in the payload.
    pub fn uids(&self) -> TypedUids {
        let mut uids = TypedUids::new();
        for te in &self.tracked_entities {
            uids.insert(TrackerType::TrackedEntity, te.uid().clone());
        }
        for enrollment in &self.enrollments {
            uids.insert(TrackerType::Enrollment, enrollment.uid().clone());
        }
        for event in &self.events {
            uids.insert(TrackerType::Event, event.uid().clone());
        }
        for relationship in &self.relationships {
            uids.insert(TrackerType::Relationship, relationship.uid().clone());
        }
        uids
    }

    /// Uids of every record in the payload plus every parent or endpoint
    /// they reference.
    pub fn referenced_uids(&self) -> TypedUids {
        let mut uids = self.uids();
        for enrollment in &self.enrollments {
            if let Some(te) = &enrollment.tracked_entity {
                uids.insert(TrackerType::TrackedEntity, te.clone());
            }
        }
        for event in &self.events {
            if let Some(enrollment) = &event.enrollment {
                uids.insert(TrackerType::Enrollment, enrollment.clone());
            }
        }
        for relationship in &self.relationships {
            for (tracker_type, uid) in relationship.endpoints().into_iter().flatten() {
                uids.insert(tracker_type, uid.clone());
            }
        }
        uids
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleEffectKind {
    Error,
    Warning,
}

/// Outcome of a program rule for one record, computed by an external rule
/// engine before the rule-engine validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleEffect {
    pub tracker_type: TrackerType,
    pub uid: Uid,
    pub rule: Uid,
    pub kind: RuleEffectKind,
    pub message: String,
}

/// A payload plus the parameters of the import it belongs to.
#[derive(Debug, Clone)]
pub struct TrackerBundle {
    pub import_id: ImportId,
    pub strategy: ImportStrategy,
    pub validation_mode: ValidationMode,
    pub user: User,
    pub objects: TrackerObjects,
    pub rule_effects: Vec<RuleEffect>,
}

impl TrackerBundle {
    pub fn new(objects: TrackerObjects, strategy: ImportStrategy) -> Self {
        Self {
            import_id: ImportId::new(),
            strategy,
            validation_mode: ValidationMode::default(),
            user: User::default(),
            objects,
            rule_effects: Vec::new(),
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

    pub fn rule_effects_for<'a>(
        &'a self,
        record: &'a dyn TrackerDto,
    ) -> impl Iterator<Item = &'a RuleEffect> + 'a {
        self.rule_effects
            .iter()
            .filter(move |e| e.tracker_type == record.tracker_type() && &e.uid == record.uid())
    }
}
