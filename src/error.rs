//! Crate-level error types.

use std::fmt;

use crate::gpu::render_context::RenderContextError;
use crate::pass::PassId;

/// Errors produced by the postfx crate.
#[derive(Debug)]
pub enum PostFxError {
    /// GPU context initialization failure.
    Gpu(RenderContextError),
    /// A record names a pass kind no constructor is registered for.
    UnknownPassKind(String),
    /// A pipeline document lists the same pass id more than once.
    DuplicatePassId(PassId),
    /// Malformed pass or pipeline record.
    Record(serde_json::Error),
    /// A kind-specific record parameter has the wrong shape.
    InvalidParam {
        /// Pass kind the record belongs to.
        kind: String,
        /// Parameter name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Viewer event-loop failure.
    Viewer(String),
}

impl fmt::Display for PostFxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::UnknownPassKind(kind) => {
                write!(f, "unknown pass type: {kind:?}")
            }
            Self::DuplicatePassId(id) => {
                write!(f, "pass id {id} appears more than once")
            }
            Self::Record(e) => write!(f, "pass record error: {e}"),
            Self::InvalidParam { kind, name, reason } => {
                write!(f, "invalid parameter {name:?} for {kind} pass: {reason}")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
        }
    }
}

impl std::error::Error for PostFxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::Record(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RenderContextError> for PostFxError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<serde_json::Error> for PostFxError {
    fn from(e: serde_json::Error) -> Self {
        Self::Record(e)
    }
}

impl From<std::io::Error> for PostFxError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kind_message_names_the_kind() {
        let err = PostFxError::UnknownPassKind("BokehPass".to_owned());
        assert_eq!(err.to_string(), "unknown pass type: \"BokehPass\"");
    }

    #[test]
    fn duplicate_id_message_names_the_id() {
        let id = PassId::generate();
        let err = PostFxError::DuplicatePassId(id);
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn record_errors_keep_their_source() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = PostFxError::from(json_err);
        assert!(std::error::Error::source(&err).is_some());
    }
}
