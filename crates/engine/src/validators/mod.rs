//! Stock validators and the registries built from them.

mod existence;
mod parents;
mod relationship;
mod rule_effects;
mod uid;

pub use existence::ExistenceValidator;
pub use parents::{EnrollmentParentValidator, EventParentValidator};
pub use relationship::{DuplicateRelationshipsValidator, RelationshipItemsValidator};
pub use rule_effects::RuleEffectValidator;
pub use uid::UidValidator;

use crate::validator::ValidatorRegistry;

impl ValidatorRegistry {
    /// Structural checks run on every import.
    pub fn default_registry() -> Self {
        Self::empty()
            .with_tracked_entity(UidValidator)
            .with_tracked_entity(ExistenceValidator)
            .with_enrollment(UidValidator)
            .with_enrollment(ExistenceValidator)
            .with_enrollment(EnrollmentParentValidator)
            .with_event(UidValidator)
            .with_event(ExistenceValidator)
            .with_event(EventParentValidator)
            .with_relationship(UidValidator)
            .with_relationship(ExistenceValidator)
            .with_relationship(RelationshipItemsValidator)
            .with_bundle(DuplicateRelationshipsValidator)
    }

    /// Checks applying the effects of program rules.
    pub fn rule_engine_registry() -> Self {
        Self::empty()
            .with_enrollment(RuleEffectValidator)
            .with_event(RuleEffectValidator)
    }
}
