//! Shared data types for the disaster-response simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! It is a dependency for all other crates in the workspace.

pub mod disaster;
pub mod location;
pub mod percept;
pub mod response;
pub mod timestamp;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;

// Re-export timestamp types
pub use timestamp::{ParseTimestampError, SimTimestamp};

// Re-export location types
pub use location::{ConditionVector, Location};

// Re-export disaster types
pub use disaster::{
    format_resources, DisasterEvent, DisasterType, ParseKindError, ResourceKind, ResourceMap,
    Severity,
};

// Re-export percept types
pub use percept::Percept;

// Re-export response types
pub use response::{DerivedEvent, DerivedEventType, ResponseState, TransitionRecord};
