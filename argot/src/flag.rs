//! Flags and flag groups.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::argument::Argument;
use crate::error::Error;

/// A callback fired once after parsing for every flag that has been hit.
pub type FlagCallback = Box<dyn FnMut(&Flag) -> Result<(), Error>>;

/// The role of a flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlagKind {
    /// A regular flag.
    #[default]
    Standard,

    /// A flag asking for help. Its callback fires before any other and stops the parse.
    Help,
}

/// Identity of a flag, used to record each hit flag once.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlagKey {
    /// Short form, if any.
    pub short: Option<char>,

    /// Long form, if any.
    pub long: Option<String>,
}

/// Defines a `Flag`, with a short form (e.g. `-v`), a long form (e.g. `--verbose`) or both.
pub struct Flag {
    short: Option<char>,
    long: Option<String>,
    description: String,
    required: bool,
    kind: FlagKind,
    argument: Option<Argument>,
    usage_count: usize,
    callback: Option<FlagCallback>,
}

impl Flag {
    fn new(short: Option<char>, long: Option<String>) -> Self {
        Flag {
            short,
            long,
            description: String::new(),
            required: false,
            kind: FlagKind::Standard,
            argument: None,
            usage_count: 0,
            callback: None,
        }
    }

    /// Create a flag with a short form.
    pub fn short(short: char) -> Self {
        Self::new(Some(short), None)
    }

    /// Create a flag with a long form.
    pub fn long(long: impl Into<String>) -> Self {
        Self::new(None, Some(long.into()))
    }

    /// Create the conventional `-h, --help` flag.
    pub fn help() -> Self {
        let mut flag = Self::new(Some('h'), Some(String::from("help")));
        flag.kind = FlagKind::Help;
        flag.description = String::from("Print help");
        flag
    }

    /// Add or replace the short form.
    pub fn with_short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    /// Add or replace the long form.
    pub fn with_long(mut self, long: impl Into<String>) -> Self {
        self.long = Some(long.into());
        self
    }

    /// Set the description shown in help.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Attach an argument to the flag.
    pub fn with_argument(mut self, argument: Argument) -> Self {
        self.argument = Some(argument);
        self
    }

    /// Make the flag mandatory.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the callback fired after parsing when the flag has been hit.
    pub fn on_hit<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&Flag) -> Result<(), Error> + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Short form.
    #[inline(always)]
    pub fn short_name(&self) -> Option<char> {
        self.short
    }

    /// Long form.
    #[inline(always)]
    pub fn long_name(&self) -> Option<&str> {
        self.long.as_deref()
    }

    /// Identity of the flag.
    pub fn key(&self) -> FlagKey {
        FlagKey {
            short: self.short,
            long: self.long.clone(),
        }
    }

    /// Description shown in help.
    #[inline(always)]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Role of the flag.
    #[inline(always)]
    pub fn kind(&self) -> FlagKind {
        self.kind
    }

    /// Check if the flag is mandatory.
    #[inline(always)]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Attached argument.
    #[inline(always)]
    pub fn argument(&self) -> Option<&Argument> {
        self.argument.as_ref()
    }

    /// Attached argument, mutable.
    #[inline(always)]
    pub fn argument_mut(&mut self) -> Option<&mut Argument> {
        self.argument.as_mut()
    }

    /// Check if the flag takes a value, required or not.
    #[inline(always)]
    pub fn has_argument(&self) -> bool {
        self.argument.is_some()
    }

    /// Check if the flag cannot be given without value.
    #[inline(always)]
    pub fn requires_argument(&self) -> bool {
        self.argument.as_ref().is_some_and(Argument::is_required)
    }

    /// Check if the flag value is bound to a boolean.
    #[inline(always)]
    pub fn is_bool(&self) -> bool {
        self.argument.as_ref().is_some_and(Argument::is_bool)
    }

    /// Number of times the flag has been given.
    #[inline(always)]
    pub fn usage_count(&self) -> usize {
        self.usage_count
    }

    /// Check if the flag has been given at least once.
    #[inline(always)]
    pub fn was_used(&self) -> bool {
        self.usage_count > 0
    }

    /// Record a hit without value.
    pub fn hit(&mut self) {
        self.usage_count += 1;
    }

    /// Record a hit with a raw value, handed over to the attached argument. The hit is counted
    /// even if the value is rejected.
    pub fn hit_with_arg(&mut self, raw: &str) -> Result<(), Error> {
        self.usage_count += 1;

        match self.argument.as_mut() {
            Some(argument) => argument.set_value(raw),
            None => Ok(()),
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

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.short, self.long.as_deref()) {
            (Some(short), Some(long)) => write!(f, "-{short}/--{long}"),
            (Some(short), None) => write!(f, "-{short}"),
            (None, Some(long)) => write!(f, "--{long}"),
            (None, None) => f.write_str("<unnamed flag>"),
        }
    }
}

impl fmt::Debug for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flag")
            .field("short", &self.short)
            .field("long", &self.long)
            .field("required", &self.required)
            .field("kind", &self.kind)
            .field("argument", &self.argument)
            .field("usage_count", &self.usage_count)
            .finish_non_exhaustive()
    }
}

/// Defines a `FlagGroup`, a named and ordered set of flags.
#[derive(Debug)]
pub struct FlagGroup {
    name: String,
    flags: Vec<Flag>,
}

impl FlagGroup {
    /// Name of the group created implicitly for flags added without group.
    pub const DEFAULT_NAME: &'static str = "Flags";

    /// Create an empty group.
    pub fn new(name: impl Into<String>) -> Self {
        FlagGroup {
            name: name.into(),
            flags: Vec::new(),
        }
    }

    /// Add a flag.
    pub fn with_flag(mut self, flag: Flag) -> Self {
        self.push(flag);
        self
    }

    /// Add a flag.
    pub fn push(&mut self, flag: Flag) {
        self.flags.push(flag);
    }

    /// Name of the group.
    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Flags of the group, in declaration order.
    #[inline(always)]
    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    /// Flags of the group, mutable.
    #[inline(always)]
    pub fn flags_mut(&mut self) -> &mut [Flag] {
        &mut self.flags
    }

    /// Find the position of a flag by short form.
    pub fn find_short(&self, short: char) -> Option<usize> {
        self.flags.iter().position(|x| x.short == Some(short))
    }

    /// Find the position of a flag by long form.
    pub fn find_long(&self, long: &str) -> Option<usize> {
        self.flags.iter().position(|x| x.long.as_deref() == Some(long))
    }
}

/// Find a flag by short form across groups. Returns the group and flag positions.
pub(crate) fn find_short_in(groups: &[FlagGroup], short: char) -> Option<(usize, usize)> {
    groups
        .iter()
        .enumerate()
        .find_map(|(g, group)| group.find_short(short).map(|i| (g, i)))
}

/// Find a flag by long form across groups. Returns the group and flag positions.
pub(crate) fn find_long_in(groups: &[FlagGroup], long: &str) -> Option<(usize, usize)> {
    groups
        .iter()
        .enumerate()
        .find_map(|(g, group)| group.find_long(long).map(|i| (g, i)))
}

/// Add a flag to the first group, creating the default group if there is none.
pub(crate) fn push_into(groups: &mut Vec<FlagGroup>, flag: Flag) {
    match groups.first_mut() {
        Some(group) => group.push(flag),
        None => groups.push(FlagGroup::new(FlagGroup::DEFAULT_NAME).with_flag(flag)),
    }
}
