use std::fmt;

/// Error raised while issuing drawing calls during a conversion.
///
/// The conversion itself is best-effort and never fails on malformed scene
/// data; the only fatal class is a failing drawing-surface collaborator,
/// which propagates to the caller uncaught.
#[derive(Debug)]
pub enum ConvertError {
    Surface(String),
    Io(std::io::Error),
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::Surface(message) => write!(f, "drawing surface error: {}", message),
            ConvertError::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for ConvertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConvertError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConvertError {
    fn from(value: std::io::Error) -> Self {
        ConvertError::Io(value)
    }
}

/// Error from the path mini-language interpreter.
///
/// Token-level problems are recovered silently (the offending token is
/// skipped), so the only reportable condition is an input that produced no
/// drawable segment at all. Callers treat that as "draw nothing".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    Empty,
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::Empty => write!(f, "path data contains no drawable segment"),
        }
    }
}

impl std::error::Error for PathError {}
