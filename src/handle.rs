use std::fmt;
use std::marker::PhantomData;

use crate::error::InvalidState;
use crate::refl::ArgInfo;
use crate::runtime::Matches;
use crate::values::ArgValue;
use crate::{Args, Result};

/// Something a [`Handle`] can read a parse result from.
///
/// Either an [`Args`], which may still be unparsed, or a detached [`Matches`].
pub trait ParseState {
    fn current(&self) -> Result<&Matches>;
}

impl ParseState for Args {
    fn current(&self) -> Result<&Matches> {
        self.matches()
    }
}

impl ParseState for Matches {
    fn current(&self) -> Result<&Matches> {
        Ok(self)
    }
}

/// Typed accessor of one registered argument.
///
/// It only remembers which argument set issued it and which argument it
/// refers to; values are always looked up from a [`ParseState`].
pub struct Handle<T> {
    owner: u64,
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

// Manual impls to not require `T: Clone` etc.
impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner && self.index == other.index
    }
}

impl<T> Eq for Handle<T> {}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("type", &std::any::type_name::<T>())
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

impl<T: ArgValue> Handle<T> {
    pub(crate) fn new(owner: u64, index: usize) -> Self {
        Self { owner, index, _marker: PhantomData }
    }

    /// Registration index of the argument.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The descriptor this handle refers to.
    pub fn info<'a>(&self, args: &'a Args) -> Result<&'a ArgInfo> {
        if args.id() != self.owner {
            return Err(InvalidState::ForeignHandle.into());
        }
        args.args().get(self.index).ok_or_else(|| InvalidState::ForeignHandle.into())
    }

    fn slot<'m>(&self, matches: &'m Matches) -> Result<Option<&'m T>> {
        if matches.owner() != self.owner {
            return Err(InvalidState::ForeignHandle.into());
        }
        match matches.slot(self.index) {
            // Registered after this parse.
            None | Some(None) => Ok(None),
            Some(Some(v)) => {
                v.downcast_ref::<T>().map(Some).ok_or_else(|| InvalidState::ForeignHandle.into())
            }
        }
    }

    /// The parsed value, or `T::default()` if the argument is optional and
    /// was not supplied.
    ///
    /// Fails if nothing has been parsed yet, or if the last parse was invalid.
    pub fn value<S: ParseState + ?Sized>(&self, state: &S) -> Result<T> {
        let matches = state.current()?;
        let slot = self.slot(matches)?;
        if !matches.is_valid() {
            return Err(InvalidState::InvalidArguments.into());
        }
        Ok(slot.cloned().unwrap_or_default())
    }

    /// Whether this argument received no value.
    ///
    /// Fails only if nothing has been parsed yet. After an invalid parse it
    /// reports what was collected before parsing stopped.
    pub fn is_missing<S: ParseState + ?Sized>(&self, state: &S) -> Result<bool> {
        let matches = state.current()?;
        Ok(self.slot(matches)?.is_none())
    }
}
