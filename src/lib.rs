//! *Declare typed command line arguments, then parse `-name:value` style tokens.*
//!
//! Arguments are registered on an [`Args`] with a short and a long name, a
//! description and a required flag. Each registration returns a typed
//! [`Handle`] to read the value back after parsing.
//!
//! Accepted token forms, where the prefix is either `-` or `/`:
//!
//! - `-name:value` (inline): the value is everything after the first `:`.
//! - `-name value` (split): the next token is the value, taken verbatim.
//!
//! Positional tokens are never accepted. Any problem makes the whole parse
//! invalid; the reason is only reported as a `tracing` debug event.
//!
//! ```
//! let mut args = argot::Args::default();
//! let count = args.register::<i32>("c", "count", "how many", true).unwrap();
//! let name = args.register::<String>("n", "name", "who", false).unwrap();
//!
//! assert!(args.parse(["/count", "3", "-n:world"]));
//! assert_eq!(count.value(&args).unwrap(), 3);
//! assert_eq!(name.value(&args).unwrap(), "world");
//!
//! assert!(!args.parse(["-n:world"])); // `count` is required.
//! assert!(count.value(&args).is_err());
//! ```
#![forbid(unsafe_code)]
use std::ffi::OsString;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

mod error;
mod handle;
mod refl;
mod runtime;
mod values;

#[cfg(feature = "help")]
mod help;

pub use crate::error::{Error, InvalidState};
pub use crate::handle::{Handle, ParseState};
#[cfg(feature = "help")]
pub use crate::help::{DefaultUsagePrinter, UsagePrinter};
pub use crate::refl::{ArgInfo, ArgList};
pub use crate::runtime::{Matches, Settings};
pub use crate::values::{ArgValue, ValueKind};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Not public API. Only for macro internal use.
#[doc(hidden)]
pub mod __private {
    pub use std::ffi::OsStr;
    pub use std::option::Option;
    pub use std::primitive::str;

    pub use crate::values::fallback;
}

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// The argument registry and its current parse state.
pub struct Args {
    id: u64,
    args: Vec<ArgInfo>,
    settings: Settings,
    /// `None` until the first parse.
    current: Option<Matches>,
    #[cfg(feature = "help")]
    printer: Box<dyn UsagePrinter + Send + Sync>,
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args")
            .field("args", &self.args)
            .field("settings", &self.settings)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

impl Default for Args {
    /// An empty registry. With `help`, usage text shows the program name from
    /// `argv[0]` but no description.
    fn default() -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            args: Vec::new(),
            settings: Settings::default(),
            current: None,
            #[cfg(feature = "help")]
            printer: Box::new(DefaultUsagePrinter::new(program_name(), "")),
        }
    }
}

/// File name of `argv[0]`, or empty if there is none.
#[cfg(feature = "help")]
fn program_name() -> String {
    let Some(arg0) = std::env::args_os().next() else { return String::new() };
    let path = std::path::Path::new(&arg0);
    path.file_name().unwrap_or(arg0.as_ref()).to_string_lossy().into_owned()
}

impl Args {
    /// A registry whose usage text carries `description` and the program name.
    #[cfg(feature = "help")]
    pub fn new(description: impl Into<String>) -> Self {
        Self::with_printer(DefaultUsagePrinter::new(program_name(), description))
    }

    /// A registry rendering usage text through a custom printer.
    #[cfg(feature = "help")]
    pub fn with_printer(printer: impl UsagePrinter + Send + Sync + 'static) -> Self {
        Self { printer: Box::new(printer), ..Self::default() }
    }

    /// Builder form of [`Args::set_trim_quotes`].
    #[must_use]
    pub fn trim_quotes(mut self, enable: bool) -> Self {
        self.set_trim_quotes(enable);
        self
    }

    /// Strip one pair of surrounding quotes from string-typed values.
    /// Only affects later parse calls.
    pub fn set_trim_quotes(&mut self, enable: bool) {
        self.settings.trim_quotes = enable;
    }

    #[must_use]
    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    /// Declare an argument of type `T`.
    ///
    /// Fails if `short_name` is already used as a short name, or `long_name`
    /// as a long name, by a previously registered argument.
    pub fn register<T: ArgValue>(
        &mut self,
        short_name: impl Into<String>,
        long_name: impl Into<String>,
        description: impl Into<String>,
        required: bool,
    ) -> Result<Handle<T>> {
        let (short_name, long_name) = (short_name.into(), long_name.into());
        for name in [&short_name, &long_name] {
            if name.contains(':') {
                return Err(Error::InvalidArgumentName(name.clone()));
            }
        }
        for arg in &self.args {
            if arg.short_name() == short_name {
                return Err(Error::DuplicateArgumentName(short_name));
            }
            if arg.long_name() == long_name {
                return Err(Error::DuplicateArgumentName(long_name));
            }
        }

        let index = self.args.len();
        self.args.push(ArgInfo::new::<T>(short_name, long_name, description.into(), required));
        Ok(Handle::new(self.id, index))
    }

    /// All registered arguments, in registration order.
    #[must_use]
    pub fn args(&self) -> &ArgList {
        ArgList::new(&self.args)
    }

    /// Parse `tokens` without touching the current state.
    ///
    /// `tokens` must not include the program name.
    pub fn try_match<I, T>(&self, tokens: I) -> Matches
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let tokens = tokens.into_iter().map(Into::into).collect::<Vec<OsString>>();
        runtime::try_match(self.args(), &self.settings, self.id, &tokens)
    }

    /// Parse `tokens` and make the result the current state, replacing any
    /// previous one. Returns whether the result is valid.
    ///
    /// `tokens` must not include the program name.
    pub fn parse<I, T>(&mut self, tokens: I) -> bool
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let matches = self.try_match(tokens);
        let valid = matches.is_valid();
        self.current = Some(matches);
        valid
    }

    /// Parse the process arguments, skipping `argv[0]`.
    pub fn parse_env(&mut self) -> bool {
        self.parse(std::env::args_os().skip(1))
    }

    /// Parse the process arguments. If they are invalid, print usage to
    /// stderr and exit with status 1.
    pub fn parse_env_or_exit(&mut self) {
        if self.parse_env() {
            return;
        }
        debug!("invalid command line, exiting");
        #[cfg(feature = "help")]
        eprint!("{}", self.render_usage());
        std::process::exit(1);
    }

    /// Validity of the current state. `false` if nothing has been parsed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.current.as_ref().is_some_and(Matches::is_valid)
    }

    /// The current state, or [`InvalidState::Unparsed`].
    pub fn matches(&self) -> Result<&Matches> {
        self.current.as_ref().ok_or_else(|| InvalidState::Unparsed.into())
    }

    #[cfg(feature = "help")]
    pub fn usage_printer(&self) -> &dyn UsagePrinter {
        &*self.printer
    }

    #[cfg(feature = "help")]
    pub fn print_usage(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        self.printer.print_usage(out, self.args())
    }

    #[cfg(feature = "help")]
    #[must_use]
    pub fn render_usage(&self) -> String {
        let mut out = String::new();
        // Writing into a `String` never fails.
        let _ = self.print_usage(&mut out);
        out
    }
}
