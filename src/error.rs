use parse_display::Display;

use crate::ParamKind;

/// Failure reported by a [`History`](crate::History) when it refuses a navigation.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
#[display("navigation to `{path}` failed: {reason}")]
pub struct NavigationError {
    pub path: String,
    pub reason: String,
}
impl NavigationError {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl std::error::Error for NavigationError {}

#[derive(Debug, Display)]
pub enum ParamError {
    #[display("invalid target path `{path}`: {source}")]
    InvalidPath {
        path: String,
        source: url::ParseError,
    },

    #[display("{0}")]
    Navigation(NavigationError),

    #[display("parameter `{name}` expects a {expected} value, got a {found} value")]
    KindMismatch {
        name: String,
        expected: ParamKind,
        found: ParamKind,
    },

    #[display("the parameter provider has been torn down")]
    Detached,
}

impl std::error::Error for ParamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParamError::InvalidPath { source, .. } => Some(source),
            ParamError::Navigation(e) => Some(e),
            ParamError::KindMismatch { .. } | ParamError::Detached => None,
        }
    }
}

impl From<NavigationError> for ParamError {
    fn from(e: NavigationError) -> Self {
        ParamError::Navigation(e)
    }
}
