use tracker_core::{ImportStrategy, TrackerDto, TrackerType};

use crate::codes::ValidationCode;
use crate::reporter::{FailFast, Reporter};
use crate::validator::{ValidationContext, Validator};

/// Checks the resolved strategy against stored state: a create must not
/// collide with a stored record, an update or delete must find one.
pub struct ExistenceValidator;

fn already_exists(tracker_type: TrackerType) -> ValidationCode {
    match tracker_type {
        TrackerType::TrackedEntity => ValidationCode::E1002,
        TrackerType::Enrollment => ValidationCode::E1080,
        TrackerType::Event => ValidationCode::E1030,
        TrackerType::Relationship => ValidationCode::E4015,
    }
}

fn does_not_exist(tracker_type: TrackerType) -> ValidationCode {
    match tracker_type {
        TrackerType::TrackedEntity => ValidationCode::E1063,
        TrackerType::Enrollment => ValidationCode::E1081,
        TrackerType::Event => ValidationCode::E1032,
        TrackerType::Relationship => ValidationCode::E4016,
    }
}

impl<T: TrackerDto> Validator<T> for ExistenceValidator {
    fn name(&self) -> &'static str {
        "existence"
    }

    fn validate(
        &self,
        reporter: &mut Reporter,
        context: &ValidationContext<'_>,
        record: &T,
    ) -> Result<(), FailFast> {
        let tracker_type = record.tracker_type();
        let exists = context.exists(tracker_type, record.uid());
        match context.resolved_strategy(record) {
            ImportStrategy::Create if exists => {
                reporter.add_error(record, already_exists(tracker_type), &[record.uid()])
            }
            ImportStrategy::Update | ImportStrategy::Delete if !exists => {
                reporter.add_error(record, does_not_exist(tracker_type), &[record.uid()])
            }
            _ => Ok(()),
        }
    }

    fn needs_to_run(&self, _strategy: ImportStrategy) -> bool {
        true
    }

    fn skip_on_error(&self) -> bool {
        true
    }
}
