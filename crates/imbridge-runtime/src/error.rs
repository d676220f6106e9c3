#![forbid(unsafe_code)]

//! Error taxonomy for the frame lifecycle.
//!
//! | Variant | Cause | Effect |
//! |---------|-------|--------|
//! | `MissingCollaborator` | Platform or renderer not resolved at `init` | Controller stays disabled |
//! | `UnknownEventTag` | Host tag outside the closed set | Event rejected |
//! | `Precondition` | E.g. font atlas not built at begin/render | Controller faults |
//! | `Inactive` | Entry point on a disabled or faulted controller | Call rejected |
//!
//! Nothing is retried.

use std::fmt;

use imbridge_core::event::UnknownEventTag;

/// Errors surfaced by the lifecycle controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// A required collaborator was never provided.
    MissingCollaborator(&'static str),
    /// The host delivered an event tag outside the closed tag set.
    UnknownEventTag(u32),
    /// A state-machine precondition did not hold.
    Precondition(&'static str),
    /// The controller is disabled or faulted.
    Inactive,
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCollaborator(what) => write!(f, "required collaborator missing: {what}"),
            Self::UnknownEventTag(code) => write!(f, "unrecognized host event tag {code}"),
            Self::Precondition(msg) => write!(f, "precondition violated: {msg}"),
            Self::Inactive => write!(f, "controller is not active"),
        }
    }
}

impl std::error::Error for BridgeError {}

impl From<UnknownEventTag> for BridgeError {
    fn from(err: UnknownEventTag) -> Self {
        Self::UnknownEventTag(err.0)
    }
}

/// Result type for lifecycle operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            BridgeError::MissingCollaborator("renderer").to_string(),
            "required collaborator missing: renderer"
        );
        assert_eq!(
            BridgeError::Precondition("font atlas is not built").to_string(),
            "precondition violated: font atlas is not built"
        );
        assert_eq!(
            BridgeError::Inactive.to_string(),
            "controller is not active"
        );
    }

    #[test]
    fn unknown_tag_converts() {
        let err: BridgeError = UnknownEventTag(42).into();
        assert_eq!(err, BridgeError::UnknownEventTag(42));
    }
}
