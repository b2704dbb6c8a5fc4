//! A parser for assembling the events of each raw argument into one element.

use alloc::string::String;
use core::fmt;

use crate::lexer::{Emitter, Event};

/// The type of an [`Element`], without its data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ElementKind {
    /// `--name=value`
    LongFlagPair,
    /// `--name`
    LongFlagSolo,
    /// `-abc=value`
    ShortBlockPair,
    /// `-abc`
    ShortBlockSolo,
    /// Anything that is not flag-shaped, or anything after the boundary.
    PlainText,
    /// `--`
    Boundary,
    /// End of input.
    End,
}

/// Defines an `Element`, that is one raw argument classified by its shape.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Element {
    /// A long flag with an attached value (e.g. `--output=file`).
    LongFlagPair {
        /// Flag name, without the dashes.
        name: String,
        /// Value after the first `=`.
        value: String,
    },

    /// A long flag alone (e.g. `--verbose`).
    LongFlagSolo(String),

    /// A block of short flags with an attached value (e.g. `-vo=file`).
    ShortBlockPair {
        /// Flag characters, without the dash.
        flags: String,
        /// Value after the first `=`.
        value: String,
    },

    /// A block of short flags alone (e.g. `-vvv`).
    ShortBlockSolo(String),

    /// Plain text.
    PlainText(String),

    /// The end of options marker `--`.
    Boundary,

    /// End of input.
    End,
}

impl Element {
    /// Retrieve the type of the element.
    pub fn kind(&self) -> ElementKind {
        match self {
            Element::LongFlagPair { .. } => ElementKind::LongFlagPair,
            Element::LongFlagSolo(_) => ElementKind::LongFlagSolo,
            Element::ShortBlockPair { .. } => ElementKind::ShortBlockPair,
            Element::ShortBlockSolo(_) => ElementKind::ShortBlockSolo,
            Element::PlainText(_) => ElementKind::PlainText,
            Element::Boundary => ElementKind::Boundary,
            Element::End => ElementKind::End,
        }
    }

    /// Retrieve the data of the element, in order (e.g. name then value).
    pub fn data(&self) -> heapless::Vec<&str, 2> {
        let mut data = heapless::Vec::new();

        match self {
            Element::LongFlagPair { name, value } => {
                data.push(name.as_str()).ok();
                data.push(value.as_str()).ok();
            }

            Element::ShortBlockPair { flags, value } => {
                data.push(flags.as_str()).ok();
                data.push(value.as_str()).ok();
            }

            Element::LongFlagSolo(text) | Element::ShortBlockSolo(text) | Element::PlainText(text) => {
                data.push(text.as_str()).ok();
            }

            Element::Boundary | Element::End => {}
        }

        data
    }

    /// Evaluate if the element is a short or long flag, with or without value.
    #[inline(always)]
    pub fn is_flag(&self) -> bool {
        matches!(
            self,
            Element::LongFlagPair { .. }
                | Element::LongFlagSolo(_)
                | Element::ShortBlockPair { .. }
                | Element::ShortBlockSolo(_)
        )
    }
}

impl fmt::Display for Element {
    /// Render the element back into its command line form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::LongFlagPair { name, value } => write!(f, "--{name}={value}"),
            Element::LongFlagSolo(name) => write!(f, "--{name}"),
            Element::ShortBlockPair { flags, value } => write!(f, "-{flags}={value}"),
            Element::ShortBlockSolo(flags) => write!(f, "-{flags}"),
            Element::PlainText(text) => f.write_str(text),
            Element::Boundary => f.write_str("--"),
            Element::End => Ok(()),
        }
    }
}

/// Defines a `Parser` that produces exactly one element per raw argument.
///
/// Once the boundary `--` has been seen, the parser stays in passthrough mode and every
/// remaining argument is returned verbatim as [`Element::PlainText`].
#[derive(Clone, Debug)]
pub struct Parser<'a> {
    events: Emitter<'a>,
    passthrough: bool,
}

impl<'a> Parser<'a> {
    /// Create a new parser from the command line input, without the program name.
    pub fn new(argv: &'a [&'a str]) -> Self {
        Self::from_emitter(Emitter::new(argv))
    }

    /// Create a new parser on top of an existing event stream.
    pub fn from_emitter(events: Emitter<'a>) -> Self {
        Parser {
            events,
            passthrough: false,
        }
    }

    /// Check if the boundary has been seen.
    #[inline(always)]
    pub fn is_passthrough(&self) -> bool {
        self.passthrough
    }

    /// Retrieve the next element. Returns [`Element::End`] forever once the input is exhausted.
    pub fn next_element(&mut self) -> Element {
        let element = if self.passthrough {
            self.passthrough_text()
        } else {
            self.element()
        };

        trace!("parsed element `{}`", element);
        element
    }

    fn element(&mut self) -> Element {
        match self.events.next_event() {
            Event::End => Element::End,
            Event::Dash => self.dashes(),
            Event::Text(text) => self.plain_text(String::from(text)),
            event => unreachable!("unexpected {:?} at the start of an argument", event),
        }
    }

    fn passthrough_text(&mut self) -> Element {
        let mut text = match self.events.next_event() {
            Event::End => return Element::End,
            event => String::from(event.as_str()),
        };

        loop {
            match self.events.next_event() {
                Event::Break => return Element::PlainText(text),
                Event::End => unreachable!("end of input inside an argument"),
                event => text.push_str(event.as_str()),
            }
        }
    }

    fn plain_text(&mut self, mut text: String) -> Element {
        loop {
            match self.events.next_event() {
                Event::Break => return Element::PlainText(text),
                event @ (Event::Text(_) | Event::Equals) => text.push_str(event.as_str()),
                event => unreachable!("unexpected {:?} inside plain text", event),
            }
        }
    }

    fn dashes(&mut self) -> Element {
        let mut count = 1;

        loop {
            match self.events.next_event() {
                Event::Dash => count += 1,

                Event::Break if count == 2 => {
                    self.passthrough = true;
                    return Element::Boundary;
                }

                Event::Break => return Element::PlainText("-".repeat(count)),

                Event::Text(name) => return self.flag(count, name),

                event => unreachable!("unexpected {:?} after dashes", event),
            }
        }
    }

    fn flag(&mut self, dashes: usize, name: &str) -> Element {
        // Not a flag name, give the dashes back to the text.
        if name.is_empty() || name.contains(char::is_whitespace) {
            let mut text = "-".repeat(dashes);
            text.push_str(name);
            return self.plain_text(text);
        }

        let value = match self.events.next_event() {
            Event::Break => None,
            Event::Equals => Some(self.value()),
            event => unreachable!("unexpected {:?} after flag name", event),
        };

        let name = String::from(name);

        match (dashes, value) {
            (1, None) => Element::ShortBlockSolo(name),
            (1, Some(value)) => Element::ShortBlockPair { flags: name, value },
            (_, None) => Element::LongFlagSolo(name),
            (_, Some(value)) => Element::LongFlagPair { name, value },
        }
    }

    fn value(&mut self) -> String {
        let value = match self.events.next_event() {
            Event::Text(value) => String::from(value),
            event => unreachable!("expected a value after `=`, got {:?}", event),
        };

        match self.events.next_event() {
            Event::Break => value,
            event => unreachable!("expected the end of the argument, got {:?}", event),
        }
    }
}

impl Iterator for Parser<'_> {
    type Item = Element;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_element() {
            Element::End => None,
            element => Some(element),
        }
    }
}
