use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub const UID_LENGTH: usize = 11;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const ALPHANUMERIC: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Identifier of a tracker record.
///
/// Any string is accepted so that malformed identifiers reach validation and
/// are reported against the record instead of failing the whole payload.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(String);

impl Uid {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generate a well-formed uid: one letter followed by ten alphanumerics.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let mut value = String::with_capacity(UID_LENGTH);
        value.push(LETTERS[rng.gen_range(0..LETTERS.len())] as char);
        for _ in 1..UID_LENGTH {
            value.push(ALPHANUMERIC[rng.gen_range(0..ALPHANUMERIC.len())] as char);
        }
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_valid_format(&self) -> bool {
        let bytes = self.0.as_bytes();
        bytes.len() == UID_LENGTH
            && bytes[0].is_ascii_alphabetic()
            && bytes[1..].iter().all(u8::is_ascii_alphanumeric)
    }
}

impl From<&str> for Uid {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Uid {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uid({})", self.0)
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies one import request; carried in log spans.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ImportId(Uuid);

impl ImportId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ImportId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ImportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImportId({})", &self.0.to_string()[..8])
    }
}

impl fmt::Display for ImportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_uids_are_well_formed() {
        for _ in 0..200 {
            let uid = Uid::generate();
            assert!(uid.is_valid_format(), "generated {uid:?} is malformed");
        }
    }

    #[test]
    fn format_rules() {
        assert!(Uid::from("xK7H53f4Hc2").is_valid_format());
        assert!(!Uid::from("1K7H53f4Hc2").is_valid_format());
        assert!(!Uid::from("xK7H53f4Hc").is_valid_format());
        assert!(!Uid::from("xK7H53f4Hc23").is_valid_format());
        assert!(!Uid::from("xK7H53f-Hc2").is_valid_format());
        assert!(!Uid::from("").is_valid_format());
    }

    #[test]
    fn serializes_as_plain_string() {
        let uid = Uid::from("xK7H53f4Hc2");
        assert_eq!(serde_json::to_string(&uid).unwrap(), "\"xK7H53f4Hc2\"");
    }

    #[test]
    fn import_ids_are_distinct() {
        assert_ne!(ImportId::new(), ImportId::new());
    }
}
