use tracker_core::TrackerDto;

use crate::codes::ValidationCode;
use crate::reporter::{FailFast, Reporter};
use crate::validator::{ValidationContext, Validator};

/// Rejects records whose uid is not 11 alphanumerics starting with a letter.
pub struct UidValidator;

impl<T: TrackerDto> Validator<T> for UidValidator {
    fn name(&self) -> &'static str {
        "uid"
    }

    fn validate(
        &self,
        reporter: &mut Reporter,
        _context: &ValidationContext<'_>,
        record: &T,
    ) -> Result<(), FailFast> {
        reporter.add_error_if(
            !record.uid().is_valid_format(),
            record,
            ValidationCode::E1048,
            &[&record.tracker_type().display_name(), record.uid()],
        )
    }

    fn skip_on_error(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracker_core::{Event, ImportStrategy, TrackerBundle, TrackerObjects};
    use tracker_storage::MemoryPreheat;

    #[test]
    fn flags_malformed_uids() {
        let bundle = TrackerBundle::new(TrackerObjects::default(), ImportStrategy::Create);
        let preheat = MemoryPreheat::new();
        let context = ValidationContext::new(&bundle, &preheat);
        let mut reporter = Reporter::default();

        UidValidator
            .validate(&mut reporter, &context, &Event::new("Qck4PQ7TMun"))
            .unwrap();
        assert!(!reporter.has_errors());

        UidValidator
            .validate(&mut reporter, &context, &Event::new("not-a-uid"))
            .unwrap();
        assert_eq!(reporter.errors().len(), 1);
        assert_eq!(
            reporter.errors()[0].message,
            "Object: `event`, uid: `not-a-uid`, has an invalid uid format."
        );
    }
}
