//! Lexical layer of argot: an event emitter over the raw argument vector, an element parser on
//! top of it, and the buffers both rely on.
#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

// This module must come first so that the others see its macros.
mod fmt;

pub mod lexer;
pub mod parser;
pub mod utils;

pub use lexer::{Emitter, Event};
pub use parser::{Element, ElementKind, Parser};
pub use utils::{Lookahead, RingBuffer};
