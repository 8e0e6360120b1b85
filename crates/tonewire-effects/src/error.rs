//! Error types for effect operations.

use thiserror::Error;
use tonewire_core::HostError;

/// Errors that can occur when configuring an effect.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EffectError {
    /// The host rejected a call.
    #[error(transparent)]
    Host(#[from] HostError),

    /// No parameter exists at this index.
    #[error("{effect} has no parameter at index {index}")]
    UnknownParam {
        /// Effect kind.
        effect: &'static str,
        /// Requested index.
        index: usize,
    },

    /// The value lies outside the parameter's range; nothing was changed.
    #[error("{effect}.{param} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        /// Effect kind.
        effect: &'static str,
        /// Parameter name.
        param: &'static str,
        /// Rejected value.
        value: f32,
        /// Lower bound.
        min: f32,
        /// Upper bound.
        max: f32,
    },

    /// The value is in range but not one the parameter accepts.
    #[error("{effect}.{param} = {value} is not accepted: {reason}")]
    InvalidValue {
        /// Effect kind.
        effect: &'static str,
        /// Parameter name.
        param: &'static str,
        /// Rejected value.
        value: f32,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The effect is always on and cannot be bypassed or switched off.
    #[error("{effect} cannot be switched on or off")]
    NotSwitchable {
        /// Effect kind.
        effect: &'static str,
    },
}

/// Convenience alias for effect results.
pub type EffectResult<T> = Result<T, EffectError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use tonewire_core::NodeId;

    #[test]
    fn out_of_range_display() {
        let err = EffectError::OutOfRange {
            effect: "delay",
            param: "feedback",
            value: 1.5,
            min: 0.0,
            max: 0.95,
        };
        assert_eq!(err.to_string(), "delay.feedback = 1.5 is outside [0, 0.95]");
    }

    #[test]
    fn not_switchable_display() {
        let err = EffectError::NotSwitchable { effect: "recorder" };
        assert_eq!(err.to_string(), "recorder cannot be switched on or off");
    }

    #[test]
    fn host_error_is_transparent() {
        let err = EffectError::from(HostError::NodeNotFound(NodeId::from_raw(9)));
        assert_eq!(err.to_string(), "node NodeId(9) not found");
        assert!(err.source().is_none());
    }
}
