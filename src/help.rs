use std::fmt;

use crate::refl::ArgList;

/// Renders usage text from registered arguments.
pub trait UsagePrinter {
    fn print_usage(&self, out: &mut dyn fmt::Write, args: &ArgList) -> fmt::Result;
}

/// The built-in usage layout:
///
/// ```text
/// my-program - does things
///
/// usage: my-program [-p1 <int>] -p2 <string>
///
///   p1,parm1 - int; optional.  first parameter
///   p2,parm2 - string; required.  second parameter
/// ```
///
/// The banner needs both fields, the usage line needs `executable`.
/// Lines carry no trailing whitespace: the synopsis ends at the last
/// argument, and the description column is left out when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultUsagePrinter {
    pub executable: String,
    pub description: String,
}

impl DefaultUsagePrinter {
    pub fn new(executable: impl Into<String>, description: impl Into<String>) -> Self {
        Self { executable: executable.into(), description: description.into() }
    }
}

impl UsagePrinter for DefaultUsagePrinter {
    #[cold]
    fn print_usage(&self, out: &mut dyn fmt::Write, args: &ArgList) -> fmt::Result {
        macro_rules! w {
            ($($e:expr),*) => {{
                $(out.write_str($e)?;)*
            }};
        }

        if !self.executable.is_empty() && !self.description.is_empty() {
            w!(&self.executable, " - ", &self.description, "\n\n");
        }

        if !self.executable.is_empty() {
            w!("usage: ", &self.executable);
            for arg in args {
                w!(" ");
                if !arg.required() {
                    w!("[");
                }
                w!("-", arg.short_name(), " <", arg.type_label(), ">");
                if !arg.required() {
                    w!("]");
                }
            }
            w!("\n\n");
        }

        for arg in args {
            let req = if arg.required() { "required." } else { "optional." };
            w!("  ", arg.short_name(), ",", arg.long_name(), " - ", arg.type_label(), "; ", req);
            if !arg.description().is_empty() {
                w!("  ", arg.description());
            }
            w!("\n");
        }
        Ok(())
    }
}

impl<P: UsagePrinter + ?Sized> UsagePrinter for Box<P> {
    fn print_usage(&self, out: &mut dyn fmt::Write, args: &ArgList) -> fmt::Result {
        (**self).print_usage(out, args)
    }
}
