//! Help rendering.
//!
//! The default renderer writes one line per flag, argument or subcommand, aligned on
//! a single column, without wrapping.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{self, Write};

use crate::argument::Argument;
use crate::flag::{Flag, FlagGroup};

/// What a renderer needs to know about one command.
#[derive(Debug)]
pub struct Help<'h> {
    /// Names from the root command down to the described one.
    pub path: Vec<&'h str>,

    /// Description of the command.
    pub description: &'h str,

    /// Flag groups in scope, nearest first.
    pub groups: Vec<&'h FlagGroup>,

    /// Positional arguments.
    pub arguments: &'h [Argument],

    /// Subcommands, as name and description pairs.
    pub commands: Vec<(&'h str, &'h str)>,
}

impl Help<'_> {
    /// Render into a string with the given renderer.
    pub fn render_with(&self, renderer: &dyn HelpRenderer) -> String {
        let mut out = String::new();

        // Writing into a `String` cannot fail.
        renderer.render(self, &mut out).ok();
        out
    }
}

/// Formats the help of a command into an output sink.
pub trait HelpRenderer {
    /// Write the help text.
    fn render(&self, help: &Help<'_>, out: &mut dyn Write) -> fmt::Result;
}

/// The default renderer.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainHelp;

impl HelpRenderer for PlainHelp {
    fn render(&self, help: &Help<'_>, out: &mut dyn Write) -> fmt::Result {
        let flags: Vec<&Flag> = help.groups.iter().flat_map(|g| g.flags()).collect();

        write!(out, "Usage: {}", help.path.join(" "))?;
        if !flags.is_empty() {
            out.write_str(" [FLAGS]")?;
        }
        if !help.commands.is_empty() {
            out.write_str(" <COMMAND>")?;
        }
        for argument in help.arguments {
            out.write_str(" ")?;
            out.write_str(&argument_label(argument))?;
        }
        out.write_str("\n")?;

        if !help.description.is_empty() {
            write!(out, "\n{}\n", help.description)?;
        }

        let width = flags
            .iter()
            .map(|x| flag_label(x).len())
            .chain(help.arguments.iter().map(|x| argument_label(x).len()))
            .chain(help.commands.iter().map(|(name, _)| name.len()))
            .max()
            .unwrap_or(0);

        for group in help.groups.iter().filter(|g| !g.flags().is_empty()) {
            write!(out, "\n{}:\n", group.name())?;
            for flag in group.flags() {
                line(out, &flag_label(flag), flag.description(), width)?;
            }
        }

        if !help.arguments.is_empty() {
            out.write_str("\nArguments:\n")?;
            for argument in help.arguments {
                line(out, &argument_label(argument), argument.description(), width)?;
            }
        }

        if !help.commands.is_empty() {
            out.write_str("\nCommands:\n")?;
            for (name, description) in &help.commands {
                line(out, name, description, width)?;
            }
        }

        Ok(())
    }
}

fn line(out: &mut dyn Write, label: &str, description: &str, width: usize) -> fmt::Result {
    if description.is_empty() {
        return writeln!(out, "  {label}");
    }

    writeln!(out, "  {label:<width$}  {description}")
}

fn flag_label(flag: &Flag) -> String {
    let mut label = String::new();

    // Writing into a `String` cannot fail.
    let _ = match (flag.short_name(), flag.long_name()) {
        (Some(short), Some(long)) => write!(label, "-{short}, --{long}"),
        (Some(short), None) => write!(label, "-{short}"),
        (None, Some(long)) => write!(label, "    --{long}"),
        (None, None) => Ok(()),
    };

    if let Some(argument) = flag.argument() {
        let _ = if argument.is_required() {
            write!(label, " <{}>", argument.name())
        } else {
            write!(label, " [<{}>]", argument.name())
        };
    }

    label
}

fn argument_label(argument: &Argument) -> String {
    let mut label = String::new();

    let _ = if argument.is_required() {
        write!(label, "<{}>", argument.name())
    } else {
        write!(label, "[{}]", argument.name())
    };

    if argument.is_multiple() {
        label.push_str("...");
    }

    label
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use googletest::prelude::*;

    use super::*;

    #[test]
    fn it_should_render_usage_and_sections() {
        let group = FlagGroup::new("Flags")
            .with_flag(Flag::help())
            .with_flag(
                Flag::long("output")
                    .with_description("Output file")
                    .with_argument(Argument::new("file")),
            );
        let arguments = [Argument::new("input").with_description("Input file")];

        let help = Help {
            path: vec!["prog", "run"],
            description: "Run something.",
            groups: vec![&group],
            arguments: &arguments,
            commands: vec![],
        };

        let text = help.render_with(&PlainHelp);

        assert_that!(text.as_str(), contains_substring("Usage: prog run [FLAGS] <input>\n"));
        assert_that!(text.as_str(), contains_substring("\nRun something.\n"));
        assert_that!(text.as_str(), contains_substring("-h, --help"));
        assert_that!(text.as_str(), contains_substring("    --output <file>  Output file"));
        assert_that!(text.as_str(), contains_substring("\nArguments:\n  <input>"));
    }

    #[test]
    fn it_should_list_subcommands() {
        let help = Help {
            path: vec!["prog"],
            description: "",
            groups: vec![],
            arguments: &[],
            commands: vec![("add", "Add a thing"), ("remove", "")],
        };

        let text = help.render_with(&PlainHelp);

        assert_that!(text.as_str(), contains_substring("Usage: prog <COMMAND>\n"));
        assert_that!(text.as_str(), contains_substring("\nCommands:\n  add     Add a thing\n  remove\n"));
    }
}
