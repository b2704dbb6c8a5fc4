//! Resolution of parsed elements against declared flags and arguments.
//!
//! The [`Interpreter`] implements every rule about flags: short blocks, attached values,
//! lookahead for values, the boundary. What plain text means is left to the [`CommandNode`]
//! being interpreted: a positional value for a [`Command`](crate::command::Command), a
//! subcommand name while walking a [`CommandTree`](crate::tree::CommandTree).

use alloc::format;
use alloc::string::{String, ToString};

use argot_parser::{Element, Lookahead, Parser, RingBuffer};

use crate::argument::Argument;
use crate::error::{Error, MultiError, Warning};
use crate::flag::{Flag, FlagKey, FlagKind};

pub(crate) mod command;
pub(crate) mod tree;

pub use self::command::FlatRef;
pub use self::tree::TreeRef;

/// The capability an [`Interpreter`] resolves elements against.
pub trait CommandNode {
    /// A handle on a flag reachable from the node.
    type FlagRef: Copy + PartialEq + core::fmt::Debug;

    /// Find a flag by short form, from the node outward through its ancestors.
    fn find_short_flag(&self, short: char) -> Option<Self::FlagRef>;

    /// Find a flag by long form, from the node outward through its ancestors.
    fn find_long_flag(&self, long: &str) -> Option<Self::FlagRef>;

    /// Access a flag found earlier.
    fn flag(&self, flag: Self::FlagRef) -> &Flag;

    /// Access a flag found earlier, mutable.
    fn flag_mut(&mut self, flag: Self::FlagRef) -> &mut Flag;

    /// Handle plain text seen before the boundary. Errors on values are collected into
    /// `errors`; a returned error aborts the parse.
    fn append_plain_text(&mut self, raw: String, errors: &mut MultiError) -> Result<(), Error>;

    /// Record input that matched nothing.
    fn append_unmapped(&mut self, raw: String);

    /// Record input seen after the boundary.
    fn append_passthrough(&mut self, raw: String);

    /// Record a warning.
    fn warn(&mut self, warning: Warning);
}

/// An ordered record of the flags that have been hit, each one kept once.
///
/// A flag is identified by its short and long forms along with its position, so that a flag
/// shadowing another one with the same forms is recorded on its own.
#[derive(Debug)]
pub struct HitLog<R> {
    hits: RingBuffer<(FlagKey, R)>,
}

impl<R: Copy + PartialEq> HitLog<R> {
    /// Create an empty log.
    pub const fn new() -> Self {
        HitLog {
            hits: RingBuffer::new(),
        }
    }

    /// Record a hit. Returns `false` if the flag was already recorded.
    pub fn record(&mut self, key: FlagKey, flag: R) -> bool {
        if self.hits.iter().any(|(x, at)| *x == key && *at == flag) {
            return false;
        }

        self.hits.push_back((key, flag));
        true
    }

    /// Number of distinct flags hit.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Check if no flag has been hit.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Iterate over the hit flags, in first-hit order.
    pub fn iter(&self) -> impl Iterator<Item = R> + '_ {
        self.hits.iter().map(|(_, flag)| *flag)
    }

    /// Iterate over the identities of the hit flags, in first-hit order.
    pub fn keys(&self) -> impl Iterator<Item = &FlagKey> {
        self.hits.iter().map(|(key, _)| key)
    }
}

impl<R: Copy + PartialEq> Default for HitLog<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// What an interpreter run leaves for the post-pass.
#[derive(Debug)]
pub struct Outcome<R> {
    /// Flags hit during the run.
    pub hits: HitLog<R>,

    /// Errors collected during the run.
    pub errors: MultiError,
}

/// Defines an `Interpreter`, a single-use resolver of one command line against one node.
pub struct Interpreter<'a, 'n, N: CommandNode> {
    elements: Lookahead<'a>,
    node: &'n mut N,
    passthrough: bool,
    hits: HitLog<N::FlagRef>,
    errors: MultiError,
}

impl<'a, 'n, N: CommandNode> Interpreter<'a, 'n, N> {
    /// Create an interpreter over the arguments, without the program name.
    pub fn new(args: &'a [&'a str], node: &'n mut N) -> Self {
        Interpreter {
            elements: Lookahead::new(Parser::new(args)),
            node,
            passthrough: false,
            hits: HitLog::new(),
            errors: MultiError::new(),
        }
    }

    /// Consume every element. Only hard errors are returned here; the others are collected in
    /// the outcome.
    pub fn run(mut self) -> Result<Outcome<N::FlagRef>, Error> {
        loop {
            match self.elements.next_element() {
                Element::End => break,
                Element::Boundary => self.passthrough = true,
                Element::PlainText(text) if self.passthrough => self.node.append_passthrough(text),
                Element::PlainText(text) => self.node.append_plain_text(text, &mut self.errors)?,
                Element::ShortBlockSolo(flags) => self.short_block(&flags, None),
                Element::ShortBlockPair { flags, value } => {
                    self.short_block(&flags, Some(value.as_str()))
                }
                Element::LongFlagSolo(name) => self.long_solo(&name),
                Element::LongFlagPair { name, value } => self.long_pair(&name, &value),
            }
        }

        Ok(Outcome {
            hits: self.hits,
            errors: self.errors,
        })
    }

    fn short_block(&mut self, block: &str, value: Option<&str>) {
        for (at, short) in block.char_indices() {
            let rest = &block[at + short.len_utf8()..];
            let last = rest.is_empty();

            let Some(flag) = self.node.find_short_flag(short) else {
                let raw = match value {
                    Some(value) if last => format!("-{short}={value}"),
                    _ => format!("-{short}"),
                };
                self.unmapped(raw, Warning::UnrecognizedShortFlag(short));
                continue;
            };

            let (requires, has) = {
                let flag = self.node.flag(flag);
                (flag.requires_argument(), flag.has_argument())
            };

            if requires {
                match (last, value) {
                    (false, None) => self.hit_with_arg(flag, rest),
                    (false, Some(value)) => self.hit_with_arg(flag, &format!("{rest}={value}")),
                    (true, Some(value)) => self.hit_with_arg(flag, value),
                    (true, None) => self.take_required_value(flag),
                }
                return;
            }

            if has {
                if !last {
                    // The next character is a flag on its own, so this one gets no value.
                    if rest.chars().next().is_some_and(|c| self.node.find_short_flag(c).is_some()) {
                        self.hit_bare(flag);
                        continue;
                    }

                    match value {
                        Some(value) => self.hit_with_arg(flag, &format!("{rest}={value}")),
                        None => self.hit_with_arg(flag, rest),
                    }
                    return;
                }

                match value {
                    Some(value) => self.hit_with_arg(flag, value),
                    None => self.take_optional_value(flag),
                }
                return;
            }

            self.hit(flag);

            if let (true, Some(value)) = (last, value) {
                self.warn(Warning::UnexpectedValue {
                    flag: format!("-{short}"),
                    value: String::from(value),
                });
            }
        }
    }

    fn long_solo(&mut self, name: &str) {
        let Some(flag) = self.node.find_long_flag(name) else {
            self.unmapped(
                format!("--{name}"),
                Warning::UnrecognizedLongFlag(String::from(name)),
            );
            return;
        };

        let (requires, has) = {
            let flag = self.node.flag(flag);
            (flag.requires_argument(), flag.has_argument())
        };

        if requires {
            self.take_required_value(flag);
        } else if has {
            self.take_optional_value(flag);
        } else {
            self.hit(flag);
        }
    }

    fn long_pair(&mut self, name: &str, value: &str) {
        let Some(flag) = self.node.find_long_flag(name) else {
            self.unmapped(
                format!("--{name}={value}"),
                Warning::UnrecognizedLongFlag(String::from(name)),
            );
            return;
        };

        if self.node.flag(flag).has_argument() {
            self.hit_with_arg(flag, value);
            return;
        }

        self.hit(flag);
        self.warn(Warning::UnexpectedValue {
            flag: format!("--{name}"),
            value: String::from(value),
        });
    }

    /// The next element is the value, whatever its shape.
    fn take_required_value(&mut self, flag: N::FlagRef) {
        match self.elements.next_element() {
            Element::End => self.hit_bare(flag),

            Element::Boundary => {
                self.hit_bare(flag);
                self.passthrough = true;
            }

            element => self.hit_with_arg(flag, &element.to_string()),
        }
    }

    /// The next element is the value, unless it is a flag known in the current scope.
    fn take_optional_value(&mut self, flag: N::FlagRef) {
        match self.elements.next_element() {
            Element::End => self.hit_bare(flag),

            Element::Boundary => {
                self.hit_bare(flag);
                self.passthrough = true;
            }

            Element::PlainText(text) => self.hit_with_arg(flag, &text),

            element if self.is_known_flag(&element) => {
                self.elements.unread(element);
                self.hit_bare(flag);
            }

            element => self.hit_with_arg(flag, &element.to_string()),
        }
    }

    fn is_known_flag(&self, element: &Element) -> bool {
        match element {
            Element::LongFlagSolo(name) | Element::LongFlagPair { name, .. } => {
                self.node.find_long_flag(name).is_some()
            }

            Element::ShortBlockSolo(flags) | Element::ShortBlockPair { flags, .. } => flags
                .chars()
                .next()
                .is_some_and(|c| self.node.find_short_flag(c).is_some()),

            _ => false,
        }
    }

    fn record(&mut self, flag: N::FlagRef) {
        let key = self.node.flag(flag).key();
        self.hits.record(key, flag);
    }

    fn hit(&mut self, flag: N::FlagRef) {
        self.node.flag_mut(flag).hit();
        self.record(flag);
    }

    /// A hit without value stands for `true` on boolean flags.
    fn hit_bare(&mut self, flag: N::FlagRef) {
        if self.node.flag(flag).is_bool() {
            self.hit_with_arg(flag, "true");
        } else {
            self.hit(flag);
        }
    }

    fn hit_with_arg(&mut self, flag: N::FlagRef, raw: &str) {
        if let Err(error) = self.node.flag_mut(flag).hit_with_arg(raw) {
            self.errors.push(error);
        }
        self.record(flag);
    }

    fn warn(&mut self, warning: Warning) {
        warn!("{}", warning);
        self.node.warn(warning);
    }

    fn unmapped(&mut self, raw: String, warning: Warning) {
        self.warn(warning);
        self.node.append_unmapped(raw);
    }
}

/// Check required flags and values, and apply defaults of unused flags. A rejected value has
/// already been reported and does not count as missing.
pub(crate) fn validate_flags<'f>(flags: impl Iterator<Item = &'f mut Flag>, errors: &mut MultiError) {
    for flag in flags {
        if !flag.was_used() {
            if flag.is_required() {
                errors.push(Error::MissingFlag(flag.to_string()));
            }

            if let Some(Err(error)) = flag.argument_mut().map(Argument::apply_default) {
                errors.push(error);
            }

            continue;
        }

        let filled = flag
            .argument()
            .is_some_and(|x| x.was_hit() || x.was_rejected());

        if flag.requires_argument() && !filled {
            let name = flag.argument().map(Argument::name).unwrap_or_default();
            errors.push(Error::MissingRequiredArgument(format!("<{name}> of {flag}")));
        }
    }
}

/// Check required positional arguments, and apply defaults of unfilled ones.
pub(crate) fn validate_arguments<'a>(
    arguments: impl Iterator<Item = &'a mut Argument>,
    errors: &mut MultiError,
) {
    for argument in arguments.filter(|x| !x.was_hit() && !x.was_rejected()) {
        if argument.has_default() {
            if let Err(error) = argument.apply_default() {
                errors.push(error);
            }
            continue;
        }

        if argument.is_required() {
            errors.push(Error::MissingRequiredArgument(format!("<{}>", argument.name())));
        }
    }
}

/// Fire the callbacks of the hit flags of the given kind, in first-hit order. Returns whether
/// at least one such flag was hit.
pub(crate) fn fire_flags<N: CommandNode>(
    node: &mut N,
    hits: &HitLog<N::FlagRef>,
    kind: FlagKind,
    errors: &mut MultiError,
) -> bool {
    let mut fired = false;

    for flag in hits.iter() {
        let flag = node.flag_mut(flag);
        if flag.kind() != kind {
            continue;
        }

        fired = true;
        if let Err(error) = flag.fire() {
            errors.push(error);
        }
    }

    fired
}
