//! Flat commands, also used as the leaves of a [`CommandTree`](crate::tree::CommandTree).

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::argument::Argument;
use crate::error::{Error, MultiError, Warning};
use crate::flag::{self, Flag, FlagGroup};
use crate::help::{Help, HelpRenderer, PlainHelp};
use crate::interpreter;

/// A callback fired once after a successful parse of the command.
pub type CommandCallback = Box<dyn FnMut(&Command) -> Result<(), Error>>;

/// Defines a `Command`, a set of flags and positional arguments.
///
/// ```
/// use argot::{Argument, Command, Flag, Value};
///
/// let count = Value::<u32>::new();
/// let mut cmd = Command::new("prog")
///     .with_flag(
///         Flag::short('n')
///             .with_long("count")
///             .with_argument(Argument::new("n").bind(count.clone())),
///     )
///     .with_argument(Argument::new("input"));
///
/// cmd.parse(&["prog", "--count", "3", "file.txt"]).unwrap();
///
/// assert_eq!(count.get(), Some(3));
/// assert_eq!(cmd.argument("input").and_then(|x| x.raw_value()), Some("file.txt"));
/// ```
pub struct Command {
    pub(crate) name: String,
    pub(crate) aliases: Vec<String>,
    pub(crate) description: String,
    pub(crate) groups: Vec<FlagGroup>,
    pub(crate) arguments: Vec<Argument>,
    pub(crate) unmapped: Vec<String>,
    pub(crate) passthrough: Vec<String>,
    pub(crate) warnings: Vec<Warning>,
    callback: Option<CommandCallback>,
    renderer: Option<Box<dyn HelpRenderer>>,
}

impl Command {
    /// Create an empty command.
    pub fn new(name: impl Into<String>) -> Self {
        Command {
            name: name.into(),
            aliases: Vec::new(),
            description: String::new(),
            groups: Vec::new(),
            arguments: Vec::new(),
            unmapped: Vec::new(),
            passthrough: Vec::new(),
            warnings: Vec::new(),
            callback: None,
            renderer: None,
        }
    }

    /// Add an alternative name, matched when the command is a subcommand.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Set the description shown in help.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a flag to the first group.
    pub fn with_flag(mut self, flag: Flag) -> Self {
        flag::push_into(&mut self.groups, flag);
        self
    }

    /// Add a group of flags.
    pub fn with_group(mut self, group: FlagGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Add a positional argument. Positional arguments are filled in declaration order.
    pub fn with_argument(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Set the callback fired after a successful parse.
    pub fn on_run<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&Command) -> Result<(), Error> + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Replace the help renderer.
    pub fn with_help_renderer(mut self, renderer: impl HelpRenderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    /// Name of the command.
    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Alternative names of the command.
    #[inline(always)]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Check if the command answers to the given name or alias.
    pub fn is_named(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|x| x == name)
    }

    /// Description of the command.
    #[inline(always)]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Flag groups, in declaration order.
    #[inline(always)]
    pub fn groups(&self) -> &[FlagGroup] {
        &self.groups
    }

    /// Iterate over every flag of the command.
    pub fn flags(&self) -> impl Iterator<Item = &Flag> {
        self.groups.iter().flat_map(FlagGroup::flags)
    }

    /// Find a flag by short form.
    pub fn find_short_flag(&self, short: char) -> Option<&Flag> {
        self.flags().find(|x| x.short_name() == Some(short))
    }

    /// Find a flag by long form.
    pub fn find_long_flag(&self, long: &str) -> Option<&Flag> {
        self.flags().find(|x| x.long_name() == Some(long))
    }

    /// Positional arguments, in declaration order.
    #[inline(always)]
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    /// Find a positional argument by name.
    pub fn argument(&self, name: &str) -> Option<&Argument> {
        self.arguments.iter().find(|x| x.name() == name)
    }

    /// Input that matched no flag or argument, as written on the command line.
    #[inline(always)]
    pub fn unmapped(&self) -> &[String] {
        &self.unmapped
    }

    /// Input given after the `--` boundary, verbatim.
    #[inline(always)]
    pub fn passthrough(&self) -> &[String] {
        &self.passthrough
    }

    /// Warnings collected during the parse.
    #[inline(always)]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Parse the command line, including the program name, against the command.
    ///
    /// Flags and arguments are updated in place, so a command is meant to be parsed once.
    /// Parsing it a second time accumulates hits and values.
    pub fn parse(&mut self, argv: &[&str]) -> Result<(), Error> {
        interpreter::command::parse_command(self, argv)
    }

    /// Parse the command line, and terminate on error.
    ///
    /// With the `std` feature, a help request is printed and the process exits with success;
    /// any other error is printed and the process exits with failure. Without it, errors
    /// panic.
    pub fn must_parse(&mut self, argv: &[&str]) {
        if let Err(error) = self.parse(argv) {
            crate::exit_on_error(error);
        }
    }

    /// Render the help of the command.
    pub fn render_help(&self) -> String {
        let help = Help {
            path: vec![self.name.as_str()],
            description: &self.description,
            groups: self.groups.iter().collect(),
            arguments: &self.arguments,
            commands: Vec::new(),
        };

        match self.renderer.as_deref() {
            Some(renderer) => help.render_with(renderer),
            None => help.render_with(&PlainHelp),
        }
    }

    /// Hand plain text to the next positional argument that accepts it.
    pub(crate) fn append_argument(&mut self, raw: String, errors: &mut MultiError) {
        let slot = self
            .arguments
            .iter_mut()
            .find(|x| !x.was_hit() || x.is_multiple());

        match slot {
            Some(argument) => {
                if let Err(error) = argument.set_value(&raw) {
                    errors.push(error);
                }
            }

            None => {
                let warning = Warning::UnexpectedArgument(raw.clone());
                warn!("{}", warning);

                self.warnings.push(warning);
                self.unmapped.push(raw);
            }
        }
    }

    pub(crate) fn fire(&mut self) -> Result<(), Error> {
        if let Some(mut callback) = self.callback.take() {
            let result = callback(self);
            self.callback = Some(callback);
            return result;
        }

        Ok(())
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("groups", &self.groups)
            .field("arguments", &self.arguments)
            .field("unmapped", &self.unmapped)
            .field("passthrough", &self.passthrough)
            .field("warnings", &self.warnings)
            .finish_non_exhaustive()
    }
}
