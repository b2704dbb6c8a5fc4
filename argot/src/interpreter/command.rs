use alloc::string::String;

use crate::command::Command;
use crate::error::{Error, MultiError, Warning};
use crate::flag::{self, Flag, FlagGroup, FlagKind};

use super::{CommandNode, Interpreter, Outcome};

/// Position of a flag in the groups of a [`Command`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlatRef {
    group: usize,
    index: usize,
}

impl CommandNode for Command {
    type FlagRef = FlatRef;

    fn find_short_flag(&self, short: char) -> Option<FlatRef> {
        flag::find_short_in(&self.groups, short).map(|(group, index)| FlatRef { group, index })
    }

    fn find_long_flag(&self, long: &str) -> Option<FlatRef> {
        flag::find_long_in(&self.groups, long).map(|(group, index)| FlatRef { group, index })
    }

    fn flag(&self, flag: FlatRef) -> &Flag {
        &self.groups[flag.group].flags()[flag.index]
    }

    fn flag_mut(&mut self, flag: FlatRef) -> &mut Flag {
        &mut self.groups[flag.group].flags_mut()[flag.index]
    }

    fn append_plain_text(&mut self, raw: String, errors: &mut MultiError) -> Result<(), Error> {
        self.append_argument(raw, errors);
        Ok(())
    }

    fn append_unmapped(&mut self, raw: String) {
        self.unmapped.push(raw);
    }

    fn append_passthrough(&mut self, raw: String) {
        self.passthrough.push(raw);
    }

    fn warn(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }
}

pub(crate) fn parse_command(command: &mut Command, argv: &[&str]) -> Result<(), Error> {
    let args = argv.get(1..).unwrap_or_default();
    let Outcome { hits, mut errors } = Interpreter::new(args, &mut *command).run()?;

    if super::fire_flags(&mut *command, &hits, FlagKind::Help, &mut errors) {
        return Err(Error::HelpRequested(command.render_help()));
    }

    super::validate_flags(
        command.groups.iter_mut().flat_map(FlagGroup::flags_mut),
        &mut errors,
    );
    super::validate_arguments(command.arguments.iter_mut(), &mut errors);

    super::fire_flags(&mut *command, &hits, FlagKind::Standard, &mut errors);

    if errors.is_empty() {
        if let Err(error) = command.fire() {
            errors.push(error);
        }
    }

    errors.into_result()
}
