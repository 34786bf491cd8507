use serde::Serialize;
use std::collections::BTreeMap;

use tracker_core::{ImportId, TrackerDto, TrackerObjects, TrackerType, Uid};

use crate::codes::ValidationCode;

macro_rules! report_entry {
    ($name:ident) => {
        /// Immutable outcome attributed to one record. Equality is structural.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            pub message: String,
            pub code: ValidationCode,
            pub tracker_type: TrackerType,
            pub uid: Uid,
        }

        impl $name {
            pub fn new(
                record: &dyn TrackerDto,
                code: ValidationCode,
                args: &[&dyn std::fmt::Display],
            ) -> Self {
                Self {
                    message: code.format(args),
                    code,
                    tracker_type: record.tracker_type(),
                    uid: record.uid().clone(),
                }
            }
        }

        impl TrackerDto for $name {
            fn tracker_type(&self) -> TrackerType {
                self.tracker_type
            }

            fn uid(&self) -> &Uid {
                &self.uid
            }
        }
    };
}

report_entry!(ValidationError);
report_entry!(ValidationWarning);

/// Errors and warnings of one validation pass, including the notices the
/// persistability filter emitted for excluded records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    /// True when validation was skipped on request of a super user.
    pub skipped: bool,
}

impl ValidationResult {
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn has_error(&self, code: ValidationCode) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }

    pub fn has_warning(&self, code: ValidationCode) -> bool {
        self.warnings.iter().any(|w| w.code == code)
    }

    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.skipped &= other.skipped;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Ok,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub import_id: ImportId,
    pub status: Status,
    pub validation: ValidationResult,
    /// Records handed to storage, per type.
    pub persisted: BTreeMap<TrackerType, usize>,
    /// Rows changed in the existence store.
    pub committed: usize,
}

impl ImportReport {
    pub fn new(
        import_id: ImportId,
        validation: ValidationResult,
        persisted: &TrackerObjects,
        committed: usize,
    ) -> Self {
        let status = if validation.has_errors() {
            Status::Error
        } else if validation.has_warnings() {
            Status::Warning
        } else {
            Status::Ok
        };
        Self {
            import_id,
            status,
            validation,
            persisted: TrackerType::ORDER
                .into_iter()
                .map(|t| (t, persisted.count(t)))
                .collect(),
            committed,
        }
    }

    pub fn persisted(&self, tracker_type: TrackerType) -> usize {
        self.persisted.get(&tracker_type).copied().unwrap_or(0)
    }
}
