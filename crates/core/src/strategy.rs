use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportStrategy {
    Create,
    Update,
    #[default]
    CreateAndUpdate,
    Delete,
}

impl ImportStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::CreateAndUpdate => "CREATE_AND_UPDATE",
            Self::Delete => "DELETE",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "CREATE" => Ok(Self::Create),
            "UPDATE" => Ok(Self::Update),
            "CREATE_AND_UPDATE" => Ok(Self::CreateAndUpdate),
            "DELETE" => Ok(Self::Delete),
            _ => Err(CoreError::UnknownStrategy(s.to_string())),
        }
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete)
    }

    /// Strategy applied to a single record. `CreateAndUpdate` becomes
    /// `Create` for new records and `Update` for existing ones.
    pub fn resolve(self, exists: bool) -> Self {
        match self {
            Self::CreateAndUpdate if exists => Self::Update,
            Self::CreateAndUpdate => Self::Create,
            other => other,
        }
    }
}

impl fmt::Display for ImportStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationMode {
    #[default]
    Full,
    FailFast,
    /// Honoured for super users only.
    Skip,
}

impl ValidationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "FULL",
            Self::FailFast => "FAIL_FAST",
            Self::Skip => "SKIP",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "FULL" => Ok(Self::Full),
            "FAIL_FAST" => Ok(Self::FailFast),
            "SKIP" => Ok(Self::Skip),
            _ => Err(CoreError::UnknownValidationMode(s.to_string())),
        }
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The actor an import runs as. Opaque to the engine apart from the
/// super-user flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    #[serde(default)]
    pub super_user: bool,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            super_user: false,
        }
    }

    pub fn super_user(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            super_user: true,
        }
    }
}
