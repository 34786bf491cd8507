use crate::error::EngineError;

/// What the reporter does with an error identical to one already recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    #[default]
    Keep,
    Suppress,
}

impl DuplicatePolicy {
    pub fn parse(s: &str) -> Result<Self, EngineError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keep" => Ok(Self::Keep),
            "suppress" => Ok(Self::Suppress),
            other => Err(EngineError::InvalidConfig(format!(
                "unknown duplicate policy: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationConfig {
    duplicate_policy: DuplicatePolicy,
    report_exclusions: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::Keep,
            report_exclusions: true,
        }
    }
}

impl ValidationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duplicate_policy(mut self, duplicate_policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = duplicate_policy;
        self
    }

    /// Whether records excluded by the persistability filter are reported
    /// as warnings.
    pub fn with_report_exclusions(mut self, report_exclusions: bool) -> Self {
        self.report_exclusions = report_exclusions;
        self
    }

    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.duplicate_policy
    }

    pub fn report_exclusions(&self) -> bool {
        self.report_exclusions
    }

    /// Build from raw settings, typically `TRACKER_DUPLICATE_POLICY` and
    /// `TRACKER_REPORT_EXCLUSIONS`. Unset values keep their defaults.
    pub fn from_env_values(
        duplicate_policy: Option<&str>,
        report_exclusions: Option<&str>,
    ) -> Result<Self, EngineError> {
        let mut config = Self::default();
        if let Some(value) = duplicate_policy {
            config.duplicate_policy = DuplicatePolicy::parse(value)?;
        }
        if let Some(value) = report_exclusions {
            config.report_exclusions = match value.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                other => {
                    return Err(EngineError::InvalidConfig(format!(
                        "report exclusions must be a boolean, got: {other}"
                    )));
                }
            };
        }
        Ok(config)
    }

    pub fn from_env() -> Result<Self, EngineError> {
        let duplicate_policy = std::env::var("TRACKER_DUPLICATE_POLICY").ok();
        let report_exclusions = std::env::var("TRACKER_REPORT_EXCLUSIONS").ok();
        Self::from_env_values(duplicate_policy.as_deref(), report_exclusions.as_deref())
    }
}
