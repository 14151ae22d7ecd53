//! Error types for statecraft operations.

use statecraft_query::QueryError;
use thiserror::Error;

/// Result type alias for statecraft operations.
pub type StatecraftResult<T> = Result<T, StatecraftError>;

/// Errors raised while declaring slices, resolving mapper specifications or
/// applying mutations.
#[derive(Debug, Error)]
pub enum StatecraftError {
    // -- malformed specification -------------------------------------------
    /// A declaration or mapper specification has the wrong shape.
    #[error("invalid specification: {message}")]
    InvalidSpec { message: String },

    /// A kind string is not part of the registry.
    #[error("unknown action kind \"{kind}\"")]
    UnknownKind { kind: String },

    /// An action was declared twice, or two actions derive the same type.
    #[error("action \"{name}\" is already declared in state \"{state}\"")]
    DuplicateAction { state: String, name: String },

    /// Two slices normalize to the same combined key.
    #[error("state \"{name}\" is declared more than once")]
    DuplicateState { name: String },

    // -- unknown reference -------------------------------------------------
    #[error("state \"{name}\" does not exist")]
    UnknownState { name: String },

    /// A declared action or mapped token names a missing property.
    #[error("property \"{prop}\" does not exist in state \"{state}\"")]
    UnknownProperty { state: String, prop: String },

    #[error("action \"{action}\" doesn't exist in state \"{state}\"")]
    UnknownAction { state: String, action: String },

    /// A mapped name is neither a state property nor a selector.
    #[error("there is no prop or selector called \"{name}\" in state \"{state}\"")]
    UnknownSelector { state: String, name: String },

    /// A mapped action token carries no recognizable kind prefix.
    #[error("action \"{action}\" in state \"{state}\" must be prefixed by its kind")]
    MissingKind { state: String, action: String },

    // -- mutation validation -----------------------------------------------
    /// The current value or payload has the wrong runtime shape for the kind.
    #[error("{kind} on \"{prop}\" requires {expected}, found {found}")]
    TypeValidation {
        prop: String,
        kind: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// A write under strict typing changes the property's declared type.
    #[error("strict typing: \"{prop}\" is declared as {expected}, got {found}")]
    StrictType {
        prop: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("arithmetic overflow while applying {kind} to \"{prop}\"")]
    Arithmetic { prop: String, kind: &'static str },

    // -- middleware contract -----------------------------------------------
    #[error("middleware for \"{action}\" ({kind}): {message}")]
    Middleware {
        action: String,
        kind: String,
        message: String,
    },

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StatecraftError {
    #[inline]
    pub fn invalid_spec(message: impl Into<String>) -> Self {
        StatecraftError::InvalidSpec {
            message: message.into(),
        }
    }

    #[inline]
    pub fn unknown_kind(kind: impl Into<String>) -> Self {
        StatecraftError::UnknownKind { kind: kind.into() }
    }

    #[inline]
    pub fn duplicate_action(state: impl Into<String>, name: impl Into<String>) -> Self {
        StatecraftError::DuplicateAction {
            state: state.into(),
            name: name.into(),
        }
    }

    #[inline]
    pub fn unknown_state(name: impl Into<String>) -> Self {
        StatecraftError::UnknownState { name: name.into() }
    }

    #[inline]
    pub fn unknown_property(state: impl Into<String>, prop: impl Into<String>) -> Self {
        StatecraftError::UnknownProperty {
            state: state.into(),
            prop: prop.into(),
        }
    }

    #[inline]
    pub fn unknown_action(state: impl Into<String>, action: impl Into<String>) -> Self {
        StatecraftError::UnknownAction {
            state: state.into(),
            action: action.into(),
        }
    }

    #[inline]
    pub fn type_validation(
        prop: impl Into<String>,
        kind: &'static str,
        expected: &'static str,
        found: &'static str,
    ) -> Self {
        StatecraftError::TypeValidation {
            prop: prop.into(),
            kind,
            expected,
            found,
        }
    }

    #[inline]
    pub fn middleware(
        action: impl Into<String>,
        kind: impl ToString,
        message: impl Into<String>,
    ) -> Self {
        StatecraftError::Middleware {
            action: action.into(),
            kind: kind.to_string(),
            message: message.into(),
        }
    }
}
