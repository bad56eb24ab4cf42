//! Error taxonomy of the window-management core.
//!
//! No error defined here is fatal to the core: operations on missing
//! windows degrade to warnings, invariant violations self-disable the
//! affected feature, and a malformed rules file leaves the previously
//! loaded rules in place. Only the embedding compositor may decide to
//! promote one of these into a shutdown.

use crate::rules::RulesParseError;

/// Errors reported by the core subsystems
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The caller passed a handle or value the core cannot act on, e.g. a
    /// window unknown to the layout or a workspace id out of range.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// Human readable description of the rejected argument
        reason: String,
    },
    /// A structural invariant was found broken, or a GPU resource came back
    /// unusable. The detecting subsystem disables the affected feature and
    /// keeps running.
    #[error("invariant violation in {subsystem}: {reason}")]
    InvariantViolation {
        /// The subsystem that detected the violation
        subsystem: &'static str,
        /// Description of the broken invariant
        reason: String,
    },
    /// The rules file could not be parsed. The previously active rule list
    /// stays in effect.
    #[error(transparent)]
    Parse(#[from] RulesParseError),
    /// An allocation failed. The triggering operation is rolled back.
    #[error("resource exhausted: {reason}")]
    ResourceExhausted {
        /// What could not be allocated
        reason: String,
    },
    /// The current layout does not implement the requested operation.
    #[error("operation not supported by the {layout} layout")]
    NotSupported {
        /// Name of the layout that declined the operation
        layout: &'static str,
    },
}

impl CoreError {
    pub(crate) fn invalid<S: Into<String>>(reason: S) -> Self {
        CoreError::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub(crate) fn invariant<S: Into<String>>(subsystem: &'static str, reason: S) -> Self {
        CoreError::InvariantViolation {
            subsystem,
            reason: reason.into(),
        }
    }
}
