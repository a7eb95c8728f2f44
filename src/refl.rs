//! Runtime reflection of registered arguments.
//! Consumed by the parser and by usage printers.

use std::ffi::OsStr;
use std::fmt;

use ref_cast::RefCast;

use crate::Settings;
use crate::values::{AnyValue, ArgValue, CoerceFn, ValueKind, erased_coerce};

/// Descriptor of one registered argument. Immutable once registered.
#[derive(Clone)]
pub struct ArgInfo {
    short_name: String,
    long_name: String,
    description: String,
    required: bool,
    kind: ValueKind,
    type_label: &'static str,
    coerce: CoerceFn,
}

impl fmt::Debug for ArgInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgInfo")
            .field("short_name", &self.short_name)
            .field("long_name", &self.long_name)
            .field("description", &self.description)
            .field("required", &self.required)
            .field("kind", &self.kind)
            .field("type_label", &self.type_label)
            .finish_non_exhaustive()
    }
}

impl ArgInfo {
    pub(crate) fn new<T: ArgValue>(
        short_name: String,
        long_name: String,
        description: String,
        required: bool,
    ) -> Self {
        Self {
            short_name,
            long_name,
            description,
            required,
            kind: T::KIND,
            type_label: T::type_label(),
            coerce: erased_coerce::<T>,
        }
    }

    #[must_use]
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    #[must_use]
    pub fn long_name(&self) -> &str {
        &self.long_name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn required(&self) -> bool {
        self.required
    }

    #[must_use]
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Short display name of the declared type, eg. `int` or `string`.
    #[must_use]
    pub fn type_label(&self) -> &'static str {
        self.type_label
    }

    /// Does `name` select this argument, by either alias?
    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        self.short_name == name || self.long_name == name
    }

    pub(crate) fn coerce(&self, raw: &OsStr, settings: &Settings) -> Option<AnyValue> {
        (self.coerce)(raw, settings)
    }
}

/// Read-only view of registered arguments, in registration order.
#[derive(Debug, RefCast)]
#[repr(transparent)]
pub struct ArgList([ArgInfo]);

impl ArgList {
    pub(crate) fn new(args: &[ArgInfo]) -> &Self {
        Self::ref_cast(args)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, idx: usize) -> Option<&ArgInfo> {
        self.0.get(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ArgInfo> {
        self.0.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[ArgInfo] {
        &self.0
    }

    /// Resolve a token name to its argument. The first match wins.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<(usize, &ArgInfo)> {
        self.0.iter().enumerate().find(|(_, arg)| arg.is_named(name))
    }

    pub fn required(&self) -> impl Iterator<Item = &ArgInfo> + Clone {
        self.0.iter().filter(|arg| arg.required)
    }
}

impl<'a> IntoIterator for &'a ArgList {
    type Item = &'a ArgInfo;
    type IntoIter = std::slice::Iter<'a, ArgInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list() -> Vec<ArgInfo> {
        vec![
            ArgInfo::new::<i32>("i".into(), "int".into(), "an int".into(), true),
            ArgInfo::new::<String>("s".into(), "string".into(), "a string".into(), false),
        ]
    }

    #[test]
    fn find_by_either_name() {
        let args = list();
        let args = ArgList::new(&args);
        assert_eq!(args.find("i").map(|(i, _)| i), Some(0));
        assert_eq!(args.find("string").map(|(i, _)| i), Some(1));
        assert!(args.find("x").is_none());
        assert!(args.find("").is_none());
    }

    #[test]
    fn descriptor_fields() {
        let args = list();
        let args = ArgList::new(&args);
        assert_eq!(args.len(), 2);
        let int = args.get(0).unwrap();
        assert_eq!(int.short_name(), "i");
        assert_eq!(int.long_name(), "int");
        assert_eq!(int.description(), "an int");
        assert!(int.required());
        assert_eq!(int.kind(), ValueKind::Int32);
        assert_eq!(int.type_label(), "int");
        assert_eq!(args.required().count(), 1);

        let v = int.coerce("12".as_ref(), &Settings::default()).unwrap();
        assert_eq!(v.downcast_ref::<i32>(), Some(&12));
        assert!(int.coerce("x".as_ref(), &Settings::default()).is_none());
    }
}
