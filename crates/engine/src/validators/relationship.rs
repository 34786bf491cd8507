use std::collections::HashMap;

use tracker_core::{Relationship, RelationshipItem, TrackerDto, TrackerType, Uid};

use crate::codes::ValidationCode;
use crate::reporter::{FailFast, Reporter};
use crate::validator::{BundleValidator, ValidationContext, Validator};

/// Each item must link exactly one record, the two ends must differ, and
/// every end must be in the payload or already stored.
pub struct RelationshipItemsValidator;

impl RelationshipItemsValidator {
    fn validate_item(
        reporter: &mut Reporter,
        context: &ValidationContext<'_>,
        relationship: &Relationship,
        label: &str,
        item: &RelationshipItem,
    ) -> Result<(), FailFast> {
        match item.endpoint() {
            None => reporter.add_error(
                relationship,
                ValidationCode::E4001,
                &[&label, relationship.uid()],
            ),
            Some((tracker_type, uid)) => reporter.add_error_if(
                !context.is_known(tracker_type, uid),
                relationship,
                ValidationCode::E4012,
                &[&tracker_type.display_name(), uid],
            ),
        }
    }
}

impl Validator<Relationship> for RelationshipItemsValidator {
    fn name(&self) -> &'static str {
        "relationship-items"
    }

    fn validate(
        &self,
        reporter: &mut Reporter,
        context: &ValidationContext<'_>,
        relationship: &Relationship,
    ) -> Result<(), FailFast> {
        Self::validate_item(reporter, context, relationship, "from", &relationship.from)?;
        Self::validate_item(reporter, context, relationship, "to", &relationship.to)?;

        if let [Some(from), Some(to)] = relationship.endpoints() {
            reporter.add_error_if(
                from == to,
                relationship,
                ValidationCode::E4000,
                &[relationship.uid()],
            )?;
        }
        Ok(())
    }
}

/// Flags relationships linking the same ordered pair of records as an
/// earlier relationship in the payload.
pub struct DuplicateRelationshipsValidator;

impl BundleValidator for DuplicateRelationshipsValidator {
    fn name(&self) -> &'static str {
        "duplicate-relationships"
    }

    fn validate(
        &self,
        reporter: &mut Reporter,
        context: &ValidationContext<'_>,
    ) -> Result<(), FailFast> {
        let mut seen: HashMap<[(TrackerType, &Uid); 2], &Uid> = HashMap::new();
        for relationship in &context.bundle().objects.relationships {
            let [Some(from), Some(to)] = relationship.endpoints() else {
                continue;
            };
            match seen.get(&[from, to]) {
                Some(first) if *first != relationship.uid() => {
                    let first = *first;
                    reporter.add_error(
                        relationship,
                        ValidationCode::E4018,
                        &[relationship.uid(), first],
                    )?;
                }
                Some(_) => {}
                None => {
                    seen.insert([from, to], relationship.uid());
                }
            }
        }
        Ok(())
    }
}
