use std::fmt;

use tracker_core::{TrackerDto, TrackerType, TypedUids, Uid};

use crate::codes::ValidationCode;
use crate::config::DuplicatePolicy;
use crate::report::{ValidationError, ValidationWarning};

/// Raised by [`Reporter::add_error`] in fail-fast mode. Carries the errors
/// collected up to and including the one that stopped the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailFast {
    pub errors: Vec<ValidationError>,
}

impl fmt::Display for FailFast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation stopped after {} error(s)", self.errors.len())
    }
}

impl std::error::Error for FailFast {}

/// Accumulates the outcome of one validation pass.
///
/// A uid is in the invalid index exactly when at least one error was added
/// for it.
#[derive(Debug, Default)]
pub struct Reporter {
    fail_fast: bool,
    duplicates: DuplicatePolicy,
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationWarning>,
    invalid: TypedUids,
}

impl Reporter {
    pub fn new(fail_fast: bool, duplicates: DuplicatePolicy) -> Self {
        Self {
            fail_fast,
            duplicates,
            ..Self::default()
        }
    }

    pub fn is_fail_fast(&self) -> bool {
        self.fail_fast
    }

    pub fn add_error(
        &mut self,
        record: &dyn TrackerDto,
        code: ValidationCode,
        args: &[&dyn fmt::Display],
    ) -> Result<(), FailFast> {
        let error = ValidationError::new(record, code, args);
        self.invalid.insert(error.tracker_type, error.uid.clone());

        let duplicate =
            self.duplicates == DuplicatePolicy::Suppress && self.errors.contains(&error);
        if !duplicate {
            self.errors.push(error);
        }

        if self.fail_fast {
            return Err(FailFast {
                errors: self.errors.clone(),
            });
        }
        Ok(())
    }

    pub fn add_error_if(
        &mut self,
        condition: bool,
        record: &dyn TrackerDto,
        code: ValidationCode,
        args: &[&dyn fmt::Display],
    ) -> Result<(), FailFast> {
        if condition {
            self.add_error(record, code, args)?;
        }
        Ok(())
    }

    pub fn add_error_if_none<V>(
        &mut self,
        value: Option<V>,
        record: &dyn TrackerDto,
        code: ValidationCode,
        args: &[&dyn fmt::Display],
    ) -> Result<(), FailFast> {
        self.add_error_if(value.is_none(), record, code, args)
    }

    pub fn add_warning(
        &mut self,
        record: &dyn TrackerDto,
        code: ValidationCode,
        args: &[&dyn fmt::Display],
    ) {
        let warning = ValidationWarning::new(record, code, args);
        let duplicate =
            self.duplicates == DuplicatePolicy::Suppress && self.warnings.contains(&warning);
        if !duplicate {
            self.warnings.push(warning);
        }
    }

    pub fn is_invalid(&self, tracker_type: TrackerType, uid: &Uid) -> bool {
        self.invalid.contains(tracker_type, uid)
    }

    pub fn is_invalid_dto(&self, record: &dyn TrackerDto) -> bool {
        self.is_invalid(record.tracker_type(), record.uid())
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn warnings(&self) -> &[ValidationWarning] {
        &self.warnings
    }

    pub fn invalid(&self) -> &TypedUids {
        &self.invalid
    }

    pub fn into_parts(self) -> (Vec<ValidationError>, Vec<ValidationWarning>, TypedUids) {
        (self.errors, self.warnings, self.invalid)
    }
}
