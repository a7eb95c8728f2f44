use std::any::Any;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::Settings;

/// Type-erased coerced value, stored per argument in [`crate::Matches`].
pub(crate) type AnyValue = Box<dyn Any + Send + Sync>;

/// Coercion routine resolved once per argument at registration.
pub(crate) type CoerceFn = fn(&OsStr, &Settings) -> Option<AnyValue>;

/// The declared type family of an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Int16,
    Int32,
    Int64,
    Float,
    String,
    DateTime,
    /// Anything else, converted through the type's generic text conversion.
    Other,
}

/// Value types that can be declared as an argument.
///
/// Implementations exist for the primitive integers and floats, `bool`,
/// `char`, `String`, [`NaiveDateTime`] and paths. Other types
/// implementing `FromStr + Clone + Default` can opt in with
/// [`impl_arg_value!`](crate::impl_arg_value).
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be declared as an argument value",
    label = "undeclarable value type",
    note = "types implementing `FromStr + Clone + Default` can opt in via `argot::impl_arg_value!`"
)]
pub trait ArgValue: Clone + Default + Send + Sync + 'static {
    const KIND: ValueKind;

    /// Label shown in usage text.
    fn type_label() -> &'static str {
        let name = std::any::type_name::<Self>();
        let name = name.split('<').next().unwrap_or(name);
        name.rsplit("::").next().unwrap_or(name)
    }

    /// Convert a raw token value. `None` means the text is not a valid `Self`.
    fn coerce(raw: &OsStr, settings: &Settings) -> Option<Self>;
}

pub(crate) fn erased_coerce<T: ArgValue>(raw: &OsStr, settings: &Settings) -> Option<AnyValue> {
    T::coerce(raw, settings).map(|v| Box::new(v) as AnyValue)
}

// Kind branches.

fn integer<T: FromStr>(raw: &OsStr) -> Option<T> {
    let s = raw.to_str()?;
    // `FromStr` for integers already rejects whitespace, empty text and overflow.
    s.parse().ok()
}

fn string(raw: &OsStr, settings: &Settings) -> Option<String> {
    let s = raw.to_str()?;
    let s = if settings.trim_quotes { trim_quotes(s) } else { s };
    Some(s.to_owned())
}

/// Remove one leading and one trailing quote, either `'` or `"`.
/// The two sides are independent, so an unclosed `"text` is trimmed too.
pub(crate) fn trim_quotes(s: &str) -> &str {
    let is_quote = |c: char| c == '"' || c == '\'';
    let s = s.strip_prefix(is_quote).unwrap_or(s);
    s.strip_suffix(is_quote).unwrap_or(s)
}

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y"];

fn date_time(raw: &OsStr) -> Option<NaiveDateTime> {
    let s = raw.to_str()?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// The generic fallback: any `FromStr` type, from UTF-8 input only.
#[doc(hidden)]
pub fn fallback<T: FromStr>(raw: &OsStr) -> Option<T> {
    raw.to_str()?.parse().ok()
}

/// Implement [`ArgValue`] through the generic text conversion (`FromStr`).
///
/// ```
/// #[derive(Debug, Clone, Default, PartialEq)]
/// struct Level(u8);
///
/// impl std::str::FromStr for Level {
///     type Err = std::num::ParseIntError;
///     fn from_str(s: &str) -> Result<Self, Self::Err> {
///         s.parse().map(Level)
///     }
/// }
///
/// argot::impl_arg_value!(Level => "level");
///
/// let mut args = argot::Args::default();
/// let level = args.register::<Level>("l", "level", "verbosity", false).unwrap();
/// assert!(args.parse(["-l:3"]));
/// assert_eq!(level.value(&args).unwrap(), Level(3));
/// ```
#[macro_export]
macro_rules! impl_arg_value {
    (@kind $kind:ident; $($ty:ty $(=> $label:literal)?),* $(,)?) => {
        $(
            impl $crate::ArgValue for $ty {
                const KIND: $crate::ValueKind = $crate::ValueKind::$kind;
                $(
                    fn type_label() -> &'static $crate::__private::str {
                        $label
                    }
                )?
                fn coerce(
                    raw: &$crate::__private::OsStr,
                    _: &$crate::Settings,
                ) -> $crate::__private::Option<Self> {
                    $crate::__private::fallback(raw)
                }
            }
        )*
    };
    ($($ty:ty $(=> $label:literal)?),* $(,)?) => {
        $crate::impl_arg_value!(@kind Other; $($ty $(=> $label)?),*);
    };
}

macro_rules! impl_integer {
    ($($ty:ty => $kind:ident, $label:literal;)*) => {
        $(
            impl ArgValue for $ty {
                const KIND: ValueKind = ValueKind::$kind;
                fn type_label() -> &'static str {
                    $label
                }
                fn coerce(raw: &OsStr, _: &Settings) -> Option<Self> {
                    integer(raw)
                }
            }
        )*
    };
}

impl_integer! {
    i16 => Int16, "short";
    i32 => Int32, "int";
    i64 => Int64, "long";
}

crate::impl_arg_value!(@kind Float; f64 => "double", f32 => "float");

crate::impl_arg_value! {
    i8 => "sbyte",
    u8 => "byte",
    u16 => "ushort",
    u32 => "uint",
    u64 => "ulong",
    i128 => "int128",
    u128 => "uint128",
    isize => "isize",
    usize => "usize",
    bool => "bool",
    char => "char",
}

impl ArgValue for String {
    const KIND: ValueKind = ValueKind::String;
    fn type_label() -> &'static str {
        "string"
    }
    fn coerce(raw: &OsStr, settings: &Settings) -> Option<Self> {
        string(raw, settings)
    }
}

impl ArgValue for NaiveDateTime {
    const KIND: ValueKind = ValueKind::DateTime;
    fn type_label() -> &'static str {
        "date"
    }
    fn coerce(raw: &OsStr, _: &Settings) -> Option<Self> {
        date_time(raw)
    }
}

// OS-level types accept non-UTF-8 input verbatim.

impl ArgValue for PathBuf {
    const KIND: ValueKind = ValueKind::Other;
    fn type_label() -> &'static str {
        "path"
    }
    fn coerce(raw: &OsStr, _: &Settings) -> Option<Self> {
        Some(PathBuf::from(raw))
    }
}

impl ArgValue for OsString {
    const KIND: ValueKind = ValueKind::Other;
    fn type_label() -> &'static str {
        "string"
    }
    fn coerce(raw: &OsStr, _: &Settings) -> Option<Self> {
        Some(raw.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coerce<T: ArgValue>(raw: &str) -> Option<T> {
        T::coerce(raw.as_ref(), &Settings::default())
    }

    #[test]
    fn integers_are_strict() {
        assert_eq!(coerce::<i32>("42"), Some(42));
        assert_eq!(coerce::<i32>("-7"), Some(-7));
        assert_eq!(coerce::<i32>("a string"), None);
        assert_eq!(coerce::<i32>(" 1"), None);
        assert_eq!(coerce::<i32>(""), None);
        assert_eq!(coerce::<i16>("40000"), None);
        assert_eq!(coerce::<i64>("40000000000"), Some(40_000_000_000));
    }

    #[test]
    fn trim_quotes_one_pair() {
        assert_eq!(trim_quotes("\"a string\""), "a string");
        assert_eq!(trim_quotes("'a string'"), "a string");
        assert_eq!(trim_quotes("\"a string"), "a string");
        assert_eq!(trim_quotes("a string'"), "a string");
        assert_eq!(trim_quotes("\"\"nested\"\""), "\"nested\"");
        assert_eq!(trim_quotes("plain"), "plain");
        assert_eq!(trim_quotes("\""), "");
    }

    #[test]
    fn string_respects_settings() {
        let trim = Settings { trim_quotes: true };
        assert_eq!(String::coerce("'x'".as_ref(), &trim).as_deref(), Some("x"));
        assert_eq!(coerce::<String>("'x'").as_deref(), Some("'x'"));
    }

    #[test]
    fn date_time_formats() {
        let expect = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap().and_hms_opt(13, 45, 0).unwrap();
        assert_eq!(coerce::<NaiveDateTime>("2024-03-09T13:45:00"), Some(expect));
        assert_eq!(coerce::<NaiveDateTime>("2024-03-09 13:45"), Some(expect));
        assert_eq!(coerce::<NaiveDateTime>("03/09/2024 13:45:00"), Some(expect));
        assert_eq!(coerce::<NaiveDateTime>("2024-03-09T13:45:00+02:00"), Some(expect));

        let midnight = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(coerce::<NaiveDateTime>("2024-03-09"), Some(midnight));
        assert_eq!(coerce::<NaiveDateTime>("09.03.2024"), Some(midnight));

        assert_eq!(coerce::<NaiveDateTime>("2024-13-40"), None);
        assert_eq!(coerce::<NaiveDateTime>("yesterday"), None);
    }

    #[test]
    fn fallback_types() {
        assert_eq!(coerce::<f64>("2.5"), Some(2.5));
        assert_eq!(coerce::<bool>("true"), Some(true));
        assert_eq!(coerce::<bool>("yes"), None);
        assert_eq!(coerce::<char>("x"), Some('x'));
        assert_eq!(coerce::<u8>("256"), None);
        assert_eq!(coerce::<PathBuf>("a/b"), Some(PathBuf::from("a/b")));
    }

    #[test]
    fn kinds_and_labels() {
        assert_eq!(i16::KIND, ValueKind::Int16);
        assert_eq!(i32::KIND, ValueKind::Int32);
        assert_eq!(i64::KIND, ValueKind::Int64);
        assert_eq!(f64::KIND, ValueKind::Float);
        assert_eq!(String::KIND, ValueKind::String);
        assert_eq!(NaiveDateTime::KIND, ValueKind::DateTime);
        assert_eq!(bool::KIND, ValueKind::Other);

        assert_eq!(i32::type_label(), "int");
        assert_eq!(f64::type_label(), "double");
        assert_eq!(NaiveDateTime::type_label(), "date");

        #[derive(Clone, Default)]
        struct Custom;
        impl FromStr for Custom {
            type Err = ();
            fn from_str(_: &str) -> Result<Self, ()> {
                Ok(Custom)
            }
        }
        crate::impl_arg_value!(Custom);
        assert_eq!(Custom::type_label(), "Custom");
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8() {
        use std::os::unix::ffi::OsStrExt;

        let raw = OsStr::from_bytes(b"\xFFpath");
        let settings = Settings::default();
        assert_eq!(String::coerce(raw, &settings), None);
        assert_eq!(i32::coerce(raw, &settings), None);
        assert_eq!(PathBuf::coerce(raw, &settings), Some(PathBuf::from(raw)));
    }
}
