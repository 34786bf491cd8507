use tracker_core::{Enrollment, Event, TrackerType};

use crate::codes::ValidationCode;
use crate::reporter::{FailFast, Reporter};
use crate::validator::{ValidationContext, Validator};

/// An enrollment must name a tracked entity that is in the payload or
/// already stored.
pub struct EnrollmentParentValidator;

impl Validator<Enrollment> for EnrollmentParentValidator {
    fn name(&self) -> &'static str {
        "enrollment-parent"
    }

    fn validate(
        &self,
        reporter: &mut Reporter,
        context: &ValidationContext<'_>,
        enrollment: &Enrollment,
    ) -> Result<(), FailFast> {
        let Some(tracked_entity) = &enrollment.tracked_entity else {
            return reporter.add_error(enrollment, ValidationCode::E1122, &[&"trackedEntity"]);
        };
        reporter.add_error_if(
            !context.is_known(TrackerType::TrackedEntity, tracked_entity),
            enrollment,
            ValidationCode::E1068,
            &[tracked_entity],
        )
    }
}

/// An event linked to an enrollment must find it in the payload or in
/// storage. Events without an enrollment are program events.
pub struct EventParentValidator;

impl Validator<Event> for EventParentValidator {
    fn name(&self) -> &'static str {
        "event-parent"
    }

    fn validate(
        &self,
        reporter: &mut Reporter,
        context: &ValidationContext<'_>,
        event: &Event,
    ) -> Result<(), FailFast> {
        match &event.enrollment {
            Some(enrollment) if !context.is_known(TrackerType::Enrollment, enrollment) => {
                reporter.add_error(event, ValidationCode::E1033, &[enrollment])
            }
            _ => Ok(()),
        }
    }
}
