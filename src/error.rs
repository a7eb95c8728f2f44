use thiserror::Error;

/// Errors surfaced by the API.
///
/// Parse-time problems are *not* reported here. They collapse into
/// [`Matches::is_valid`](crate::Matches::is_valid) returning `false`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Another registered argument already uses this short or long name.
    #[error("an argument with the same name already exists: {0}")]
    DuplicateArgumentName(String),

    /// The name can never be matched by the token grammar.
    #[error("invalid argument name {0:?}: names must not contain ':'")]
    InvalidArgumentName(String),

    /// A value or missing-status was read in a state that does not allow it.
    #[error(transparent)]
    InvalidState(#[from] InvalidState),
}

impl Error {
    #[must_use]
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidState {
    #[error("unable to read argument: command line arguments have not been parsed")]
    Unparsed,
    #[error("unable to read argument value: the command line arguments are not valid")]
    InvalidArguments,
    #[error("argument handle was issued by a different argument set")]
    ForeignHandle,
}
