pub mod bundle;
pub mod error;
pub mod ids;
pub mod records;
pub mod strategy;
pub mod tracker_type;

pub use bundle::{RuleEffect, RuleEffectKind, TrackerBundle, TrackerObjects};
pub use error::CoreError;
pub use ids::*;
pub use records::*;
pub use strategy::{ImportStrategy, User, ValidationMode};
pub use tracker_type::{TrackerType, TypedUids};
