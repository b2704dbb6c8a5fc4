//! A lexer for generating primitive events from a command line.

use crate::utils::RingBuffer;

/// Defines an `Event` that has been read from one raw argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event<'a> {
    /// A single leading `-`.
    Dash,

    /// A run of text, without leading dashes and without the first `=`.
    Text(&'a str),

    /// The first `=` found after the leading dashes.
    Equals,

    /// End of the current raw argument.
    Break,

    /// End of the input. Repeated forever once reached.
    End,
}

impl<'a> Event<'a> {
    /// Retrieve the raw text this event stands for.
    pub fn as_str(&self) -> &'a str {
        match self {
            Event::Dash => "-",
            Event::Text(text) => text,
            Event::Equals => "=",
            Event::Break | Event::End => "",
        }
    }
}

/// Defines an `Emitter` that streams events from the command line input, one raw argument at
/// a time.
///
/// The program name must already be stripped from the input.
#[derive(Clone, Debug)]
pub struct Emitter<'a> {
    argv: &'a [&'a str],
    cursor: usize,
    queue: RingBuffer<Event<'a>>,
}

impl<'a> Emitter<'a> {
    /// Create a new emitter from the command line input.
    pub fn new(argv: &'a [&'a str]) -> Self {
        Emitter {
            argv,
            cursor: 0,
            queue: RingBuffer::new(),
        }
    }

    /// Retrieve the next event.
    pub fn next_event(&mut self) -> Event<'a> {
        if let Some(event) = self.queue.pop_front() {
            return event;
        }

        if self.cursor >= self.argv.len() {
            return Event::End;
        }

        let arg = self.argv[self.cursor];
        self.cursor += 1;

        self.split(arg);

        // Every argument yields at least a `Break`.
        self.queue.pop_front().unwrap_or(Event::End)
    }

    fn split(&mut self, arg: &'a str) {
        if arg.is_empty() {
            self.queue.push_back(Event::Text(""));
            self.queue.push_back(Event::Break);
            return;
        }

        let rest = arg.trim_start_matches('-');
        for _ in 0..(arg.len() - rest.len()) {
            self.queue.push_back(Event::Dash);
        }

        if rest.is_empty() {
            self.queue.push_back(Event::Break);
            return;
        }

        match rest.split_once('=') {
            Some((left, right)) => {
                self.queue.push_back(Event::Text(left));
                self.queue.push_back(Event::Equals);
                self.queue.push_back(Event::Text(right));
            }

            None => self.queue.push_back(Event::Text(rest)),
        }

        self.queue.push_back(Event::Break);
    }
}

impl<'a> Iterator for Emitter<'a> {
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_event() {
            Event::End => None,
            event => Some(event),
        }
    }
}
