use std::cell::RefCell;
use std::rc::Rc;

use tracker_core::{ImportStrategy, TrackerDto, Uid};
use tracker_engine::{
    BundleValidator, FailFast, Reporter, ValidationCode, ValidationContext, Validator,
};

/// Shared record of validator invocations, as `"<validator> <uid>"`.
pub type CallLog = Rc<RefCell<Vec<String>>>;

pub fn call_log() -> CallLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Validator whose behavior is set by the test: it logs every call and adds
/// an E1300 error for the uids it is told to reject.
pub struct ScriptedValidator {
    name: &'static str,
    log: CallLog,
    reject: Vec<Uid>,
    warn: Vec<Uid>,
    skip_on_error: bool,
    strategies: Option<Vec<ImportStrategy>>,
}

impl ScriptedValidator {
    pub fn new(name: &'static str, log: &CallLog) -> Self {
        Self {
            name,
            log: Rc::clone(log),
            reject: Vec::new(),
            warn: Vec::new(),
            skip_on_error: false,
            strategies: None,
        }
    }

    pub fn rejecting(mut self, uid: &str) -> Self {
        self.reject.push(Uid::from(uid));
        self
    }

    pub fn warning(mut self, uid: &str) -> Self {
        self.warn.push(Uid::from(uid));
        self
    }

    pub fn skipping_on_error(mut self) -> Self {
        self.skip_on_error = true;
        self
    }

    /// Only run for these resolved strategies.
    pub fn only_for(mut self, strategies: &[ImportStrategy]) -> Self {
        self.strategies = Some(strategies.to_vec());
        self
    }
}

impl<T: TrackerDto> Validator<T> for ScriptedValidator {
    fn name(&self) -> &'static str {
        self.name
    }

    fn validate(
        &self,
        reporter: &mut Reporter,
        _context: &ValidationContext<'_>,
        record: &T,
    ) -> Result<(), FailFast> {
        self.log
            .borrow_mut()
            .push(format!("{} {}", self.name, record.uid()));
        if self.warn.contains(record.uid()) {
            reporter.add_warning(record, ValidationCode::E1300, &[&self.name, &"warned"]);
        }
        reporter.add_error_if(
            self.reject.contains(record.uid()),
            record,
            ValidationCode::E1300,
            &[&self.name, &"rejected"],
        )
    }

    fn needs_to_run(&self, strategy: ImportStrategy) -> bool {
        match &self.strategies {
            Some(strategies) => strategies.contains(&strategy),
            None => !strategy.is_delete(),
        }
    }

    fn skip_on_error(&self) -> bool {
        self.skip_on_error
    }
}

/// Bundle validator that logs its invocation and rejects the listed
/// relationships.
pub struct ScriptedBundleValidator {
    log: CallLog,
    reject: Vec<Uid>,
}

impl ScriptedBundleValidator {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: Rc::clone(log),
            reject: Vec::new(),
        }
    }

    pub fn rejecting(mut self, uid: &str) -> Self {
        self.reject.push(Uid::from(uid));
        self
    }
}

impl BundleValidator for ScriptedBundleValidator {
    fn name(&self) -> &'static str {
        "bundle"
    }

    fn validate(
        &self,
        reporter: &mut Reporter,
        context: &ValidationContext<'_>,
    ) -> Result<(), FailFast> {
        self.log.borrow_mut().push("bundle".to_string());
        for relationship in &context.bundle().objects.relationships {
            reporter.add_error_if(
                self.reject.contains(relationship.uid()),
                relationship,
                ValidationCode::E1300,
                &[&"bundle", &"rejected"],
            )?;
        }
        Ok(())
    }
}
