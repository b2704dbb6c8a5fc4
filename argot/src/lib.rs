//! argot, a `no_std` command line parser with flags, positional arguments and subcommand trees.
//!
//! Declare a [`Command`], or a [`CommandTree`] of nested subcommands, then hand it the raw
//! argument vector. Values reach the caller through [`Value`] handles bound to arguments;
//! hit counters, unmapped input, passthrough input and warnings are kept on the declaration.
//!
//! The lexical layer lives in [`parser`]. Logging goes to `defmt` or `tracing` when the
//! matching feature is enabled.
#![no_std]
#![warn(missing_docs)]

extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

// This module must come first so that the others see its macros.
mod fmt;

pub mod argument;
pub mod command;
pub mod error;
pub mod flag;
pub mod help;
pub mod interpreter;
pub mod tree;
pub mod value;

pub use argot_parser as parser;

pub use argument::Argument;
pub use command::Command;
pub use error::{Error, MultiError, Warning};
pub use flag::{Flag, FlagGroup, FlagKind};
pub use help::{Help, HelpRenderer, PlainHelp};
pub use tree::{Branch, CommandTree, NodeId};
pub use value::{Binding, Unmarshal, Value};

/// Report a parse error and terminate.
///
/// A help request is printed to the standard output and the process exits with success.
/// Any other error is printed to the standard error and the process exits with failure.
#[cfg(feature = "std")]
pub fn exit_on_error(error: Error) -> ! {
    match error {
        Error::HelpRequested(help) => {
            std::print!("{help}");
            std::process::exit(0)
        }

        Error::IncompleteCommand { help, .. } => {
            std::eprint!("{help}");
            std::process::exit(1)
        }

        error => {
            std::eprintln!("error: {error}");
            std::process::exit(1)
        }
    }
}

/// Report a parse error and terminate, by panicking.
#[cfg(not(feature = "std"))]
pub fn exit_on_error(error: Error) -> ! {
    panic!("{error}")
}
