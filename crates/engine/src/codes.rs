use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ValidationCode {
    E1002,
    E1030,
    E1032,
    E1033,
    E1048,
    E1063,
    E1068,
    E1080,
    E1081,
    E1122,
    E1300,
    E4000,
    E4001,
    E4012,
    E4015,
    E4016,
    E4018,
    E5000,
    E5001,
}

impl ValidationCode {
    /// Message template; `{n}` is replaced by the n-th argument.
    pub fn template(&self) -> &'static str {
        match self {
            Self::E1002 => "TrackedEntity: `{0}`, already exists.",
            Self::E1030 => "Event: `{0}`, already exists.",
            Self::E1032 => "Event: `{0}`, does not exist.",
            Self::E1033 => "Could not find Enrollment: `{0}`, linked to Event.",
            Self::E1048 => "Object: `{0}`, uid: `{1}`, has an invalid uid format.",
            Self::E1063 => "TrackedEntity: `{0}`, does not exist.",
            Self::E1068 => "Could not find TrackedEntity: `{0}`, linked to Enrollment.",
            Self::E1080 => "Enrollment: `{0}`, already exists.",
            Self::E1081 => "Enrollment: `{0}`, does not exist.",
            Self::E1122 => "Missing required enrollment property: `{0}`.",
            Self::E1300 => "Generated by program rule (`{0}`) - `{1}`",
            Self::E4000 => "Relationship: `{0}` cannot link to itself.",
            Self::E4001 => {
                "Relationship item `{0}` for relationship `{1}` is invalid: an item must link exactly one tracker record."
            }
            Self::E4012 => "Could not find `{0}`: `{1}`, linked to relationship.",
            Self::E4015 => "Relationship: `{0}`, already exists.",
            Self::E4016 => "Relationship: `{0}`, does not exist.",
            Self::E4018 => "Relationship: `{0}` duplicates relationship `{1}` in the payload.",
            Self::E5000 => {
                "\"{0}\" `{1}` cannot be persisted because \"{2}\" `{3}` referenced by it cannot be persisted."
            }
            Self::E5001 => {
                "\"{0}\" `{1}` cannot be deleted because \"{2}\" `{3}` referenced by it cannot be deleted."
            }
        }
    }

    pub fn format(&self, args: &[&dyn fmt::Display]) -> String {
        let template = self.template();
        let mut message = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            message.push_str(&rest[..open]);
            let tail = &rest[open..];
            let arg = tail.find('}').and_then(|close| {
                let index = tail[1..close].parse::<usize>().ok()?;
                Some((close, args.get(index)?))
            });
            match arg {
                Some((close, arg)) => {
                    message.push_str(&arg.to_string());
                    rest = &tail[close + 1..];
                }
                None => {
                    message.push('{');
                    rest = &tail[1..];
                }
            }
        }
        message.push_str(rest);
        message
    }
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
