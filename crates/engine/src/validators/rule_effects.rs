use tracker_core::{RuleEffectKind, TrackerDto};

use crate::codes::ValidationCode;
use crate::reporter::{FailFast, Reporter};
use crate::validator::{ValidationContext, Validator};

/// Turns the precomputed program rule effects of a record into errors and
/// warnings.
pub struct RuleEffectValidator;

impl<T: TrackerDto> Validator<T> for RuleEffectValidator {
    fn name(&self) -> &'static str {
        "rule-effects"
    }

    fn validate(
        &self,
        reporter: &mut Reporter,
        context: &ValidationContext<'_>,
        record: &T,
    ) -> Result<(), FailFast> {
        for effect in context.bundle().rule_effects_for(record) {
            let args: [&dyn std::fmt::Display; 2] = [&effect.rule, &effect.message];
            match effect.kind {
                RuleEffectKind::Error => reporter.add_error(record, ValidationCode::E1300, &args)?,
                RuleEffectKind::Warning => reporter.add_warning(record, ValidationCode::E1300, &args),
            }
        }
        Ok(())
    }
}
