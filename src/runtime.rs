use std::ffi::{OsStr, OsString};
use std::fmt;

use os_str_bytes::OsStrBytesExt;
use thiserror::Error;
use tracing::{debug, trace};

use crate::refl::ArgList;
use crate::values::AnyValue;

/// Parser policy.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Strip one leading and one trailing `'` or `"` from string-typed values.
    pub trim_quotes: bool,
}

/// The outcome of one parse call: a value for each supplied argument plus
/// the validity verdict.
pub struct Matches {
    owner: u64,
    /// One slot per registered argument, by registration index.
    values: Vec<Option<AnyValue>>,
    valid: bool,
}

impl fmt::Debug for Matches {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let supplied = self.values.iter().enumerate().filter(|(_, v)| v.is_some()).map(|(i, _)| i);
        f.debug_struct("Matches")
            .field("valid", &self.valid)
            .field("supplied", &supplied.collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Matches {
    fn new(owner: u64, arg_cnt: usize) -> Self {
        Self { owner, values: std::iter::repeat_with(|| None).take(arg_cnt).collect(), valid: true }
    }

    /// Whether every token was consumed as a well-formed argument and all
    /// required arguments were supplied.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Number of arguments that received a value.
    #[must_use]
    pub fn supplied_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    pub(crate) fn owner(&self) -> u64 {
        self.owner
    }

    /// `None` if `idx` is out of range; `Some(None)` if not supplied.
    pub(crate) fn slot(&self, idx: usize) -> Option<Option<&AnyValue>> {
        self.values.get(idx).map(Option::as_ref)
    }
}

/// Why a token sequence was rejected. Only reported through `tracing`.
#[derive(Debug, Error)]
enum Rejection {
    #[error("expected an argument after empty tokens")]
    Exhausted,
    #[error("unexpected positional token {0:?}")]
    Positional(OsString),
    #[error("missing value for `{0}`")]
    MissingValue(String),
    #[error("argument name {0:?} is not valid UTF-8")]
    NonUtf8Name(OsString),
    #[error("unknown argument `{0}`")]
    UnknownName(String),
    #[error("argument `{0}` supplied more than once")]
    Duplicated(String),
    #[error("invalid value {1:?} for `{0}`")]
    InvalidValue(String, OsString),
    #[error("missing required argument `{0}`")]
    MissingRequired(String),
}

/// A prefixed token split into its name and, in inline form, its value.
#[derive(Debug)]
struct Named<'a> {
    name: &'a OsStr,
    inline_value: Option<&'a OsStr>,
}

/// Split `-name`, `/name`, `-name:value` or `/name:value`.
/// Returns `None` for a positional token.
fn split_token(token: &OsStr) -> Option<Named<'_>> {
    if !token.starts_with("-") && !token.starts_with("/") {
        return None;
    }
    // The prefix is ASCII so index 1 is a boundary.
    let rest = token.index(1..);
    Some(match rest.split_once(':') {
        Some((name, value)) => Named { name, inline_value: Some(value) },
        None => Named { name: rest, inline_value: None },
    })
}

pub(crate) fn try_match(
    args: &ArgList,
    settings: &Settings,
    owner: u64,
    tokens: &[OsString],
) -> Matches {
    let mut matches = Matches::new(owner, args.len());
    if let Err((idx, rejection)) = feed_tokens(&mut matches, args, settings, tokens) {
        debug!(token = idx, reason = %rejection, "command line rejected");
        matches.valid = false;
    }
    matches
}

/// The main loop. Stops at the first problem, returning the offending token index.
fn feed_tokens(
    matches: &mut Matches,
    args: &ArgList,
    settings: &Settings,
    tokens: &[OsString],
) -> Result<(), (usize, Rejection)> {
    let mut k = 0;
    while k < tokens.len() {
        while tokens.get(k).is_some_and(|t| t.is_empty()) {
            k += 1;
        }
        let Some(token) = tokens.get(k) else {
            return Err((k, Rejection::Exhausted));
        };
        let Some(Named { name, inline_value }) = split_token(token) else {
            return Err((k, Rejection::Positional(token.clone())));
        };
        let name = name.to_str().ok_or_else(|| (k, Rejection::NonUtf8Name(name.to_owned())))?;

        let value = match inline_value {
            Some(v) => v,
            None => {
                k += 1;
                match tokens.get(k) {
                    Some(v) => v.as_os_str(),
                    None => return Err((k, Rejection::MissingValue(name.to_owned()))),
                }
            }
        };

        let Some((idx, arg)) = args.find(name) else {
            return Err((k, Rejection::UnknownName(name.to_owned())));
        };
        let slot = &mut matches.values[idx];
        if slot.is_some() {
            return Err((k, Rejection::Duplicated(name.to_owned())));
        }
        let Some(v) = arg.coerce(value, settings) else {
            return Err((k, Rejection::InvalidValue(name.to_owned(), value.to_owned())));
        };
        trace!(token = k, arg = arg.long_name(), "accepted argument");
        *slot = Some(v);
        k += 1;
    }

    if let Some(missing) = args.iter().zip(&matches.values).find(|(arg, v)| arg.required() && v.is_none())
    {
        return Err((k, Rejection::MissingRequired(missing.0.long_name().to_owned())));
    }
    Ok(())
}
