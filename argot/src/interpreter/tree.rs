use alloc::string::String;
use alloc::vec::Vec;

use crate::error::{Error, MultiError, Warning};
use crate::flag::{self, Flag, FlagGroup, FlagKind};
use crate::tree::{CommandTree, NodeId};

use super::{CommandNode, Interpreter, Outcome};

/// Position of a flag in a [`CommandTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeRef {
    node: NodeId,
    group: usize,
    index: usize,
}

/// The node of a tree the interpreter is at, moving down on each subcommand name.
///
/// Input recorded before a leaf is selected is kept aside and handed over to the leaf.
struct TreeCursor<'t> {
    tree: &'t mut CommandTree,
    at: NodeId,
    visited: Vec<NodeId>,
    selected: Option<NodeId>,
    unmapped: Vec<String>,
    passthrough: Vec<String>,
    warnings: Vec<Warning>,
}

impl<'t> TreeCursor<'t> {
    fn new(tree: &'t mut CommandTree) -> Self {
        let root = tree.root();

        TreeCursor {
            tree,
            at: root,
            visited: alloc::vec![root],
            selected: None,
            unmapped: Vec::new(),
            passthrough: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn enter(&mut self, id: NodeId) {
        self.at = id;

        let Some(leaf) = self.tree.leaf_mut(id) else {
            self.visited.push(id);
            return;
        };

        leaf.unmapped.append(&mut self.unmapped);
        leaf.passthrough.append(&mut self.passthrough);
        leaf.warnings.append(&mut self.warnings);
        self.selected = Some(id);
    }

    fn find(&self, lookup: impl Fn(&[FlagGroup]) -> Option<(usize, usize)>) -> Option<TreeRef> {
        self.tree.ancestors(self.at).find_map(|node| {
            lookup(self.tree.groups(node)).map(|(group, index)| TreeRef { node, group, index })
        })
    }
}

impl CommandNode for TreeCursor<'_> {
    type FlagRef = TreeRef;

    fn find_short_flag(&self, short: char) -> Option<TreeRef> {
        self.find(|groups| flag::find_short_in(groups, short))
    }

    fn find_long_flag(&self, long: &str) -> Option<TreeRef> {
        self.find(|groups| flag::find_long_in(groups, long))
    }

    fn flag(&self, flag: TreeRef) -> &Flag {
        &self.tree.groups(flag.node)[flag.group].flags()[flag.index]
    }

    fn flag_mut(&mut self, flag: TreeRef) -> &mut Flag {
        &mut self.tree.groups_mut(flag.node)[flag.group].flags_mut()[flag.index]
    }

    fn append_plain_text(&mut self, raw: String, errors: &mut MultiError) -> Result<(), Error> {
        if let Some(leaf) = self.tree.leaf_mut(self.at) {
            leaf.append_argument(raw, errors);
            return Ok(());
        }

        let Some(child) = self.tree.find_child(self.at, &raw) else {
            return Err(Error::UnrecognizedSubcommand(raw));
        };

        debug!("entering subcommand {}", raw.as_str());
        self.enter(child);
        Ok(())
    }

    fn append_unmapped(&mut self, raw: String) {
        match self.tree.leaf_mut(self.at) {
            Some(leaf) => leaf.unmapped.push(raw),
            None => self.unmapped.push(raw),
        }
    }

    fn append_passthrough(&mut self, raw: String) {
        match self.tree.leaf_mut(self.at) {
            Some(leaf) => leaf.passthrough.push(raw),
            None => self.passthrough.push(raw),
        }
    }

    fn warn(&mut self, warning: Warning) {
        match self.tree.leaf_mut(self.at) {
            Some(leaf) => leaf.warnings.push(warning),
            None => self.warnings.push(warning),
        }
    }
}

pub(crate) fn parse_tree(tree: &mut CommandTree, argv: &[&str]) -> Result<NodeId, Error> {
    let args = argv.get(1..).unwrap_or_default();

    let mut cursor = TreeCursor::new(tree);
    let Outcome { hits, mut errors } = Interpreter::new(args, &mut cursor).run()?;

    if super::fire_flags(&mut cursor, &hits, FlagKind::Help, &mut errors) {
        return Err(Error::HelpRequested(cursor.tree.render_help(cursor.at)));
    }

    let TreeCursor {
        tree,
        at,
        visited,
        selected,
        ..
    } = cursor;
    tree.select(visited, selected);

    let Some(leaf) = selected else {
        if let Some(branch) = tree.branch_mut(at) {
            branch.fire_incomplete();
        }

        let mut all = MultiError::new();
        all.push(Error::IncompleteCommand {
            path: tree.path(at).join(" "),
            help: tree.render_help(at),
        });
        all.push(Error::Multiple(errors));

        return all.into_result().map(|()| at);
    };

    let chain: Vec<NodeId> = tree.ancestors(leaf).collect();
    for id in chain {
        super::validate_flags(
            tree.groups_mut(id).iter_mut().flat_map(FlagGroup::flags_mut),
            &mut errors,
        );
    }

    if let Some(command) = tree.leaf_mut(leaf) {
        super::validate_arguments(command.arguments.iter_mut(), &mut errors);
    }

    let mut cursor = TreeCursor::new(&mut *tree);
    cursor.at = leaf;
    super::fire_flags(&mut cursor, &hits, FlagKind::Standard, &mut errors);

    if errors.is_empty() {
        fire_commands(tree, leaf, &mut errors);
    }

    errors.into_result().map(|()| leaf)
}

/// Fire the callbacks of the visited branches from the root, then the one of the leaf.
fn fire_commands(tree: &mut CommandTree, leaf: NodeId, errors: &mut MultiError) {
    let visited = tree.visited().to_vec();

    for id in visited {
        if let Some(Err(error)) = tree.branch_mut(id).map(|x| x.fire()) {
            errors.push(error);
        }
    }

    if let Some(Err(error)) = tree.leaf_mut(leaf).map(|x| x.fire()) {
        errors.push(error);
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::string::ToString;
    use core::cell::RefCell;

    use googletest::prelude::*;

    use super::*;
    use crate::argument::Argument;
    use crate::command::Command;
    use crate::tree::Branch;
    use crate::value::Value;

    /// `prog [-c] { remote { add <name> | remove (rm) } | status }`
    fn sample() -> (CommandTree, [NodeId; 4]) {
        let mut tree = CommandTree::new(
            Branch::new("prog")
                .with_flag(Flag::short('c').with_long("color"))
                .with_flag(Flag::help()),
        );

        let remote = tree.add_branch(tree.root(), Branch::new("remote"));
        let add = tree.add_leaf(
            remote,
            Command::new("add")
                .with_description("Add a remote")
                .with_argument(Argument::new("name")),
        );
        let remove = tree.add_leaf(remote, Command::new("remove").with_alias("rm"));
        let status = tree.add_leaf(tree.root(), Command::new("status"));

        (tree, [remote, add, remove, status])
    }

    fn root_usage(tree: &CommandTree, short: char) -> usize {
        tree.branch(tree.root())
            .and_then(|x| x.find_short_flag(short))
            .map_or(0, Flag::usage_count)
    }

    #[test]
    fn it_should_resolve_root_flag_from_leaf() {
        let (mut tree, [_, add, ..]) = sample();

        let res = tree.parse(&["prog", "remote", "add", "origin", "-c"]);

        assert_that!(res == Ok(add), eq(true));
        assert_that!(root_usage(&tree, 'c'), eq(1));
        assert_that!(tree.selected_command().map(Command::name), eq(Some("add")));

        let name = tree.selected_command().and_then(|x| x.argument("name"));
        assert_that!(name.and_then(Argument::raw_value), eq(Some("origin")));
    }

    #[test]
    fn it_should_accept_flags_before_subcommand() {
        let (mut tree, [.., status]) = sample();

        let res = tree.parse(&["prog", "--color", "status"]);

        assert_that!(res == Ok(status), eq(true));
        assert_that!(root_usage(&tree, 'c'), eq(1));

        let path = tree.selected_path();
        assert_that!(path.as_slice(), eq(&["prog", "status"]));
    }

    #[test]
    fn it_should_prefer_nearest_flag() {
        let quiet = Value::<bool>::new();
        let mut tree = CommandTree::new(Branch::new("prog").with_flag(Flag::short('q')));
        let run = tree.add_leaf(
            tree.root(),
            Command::new("run").with_flag(
                Flag::short('q').with_argument(Argument::new("on").optional().bind(quiet.clone())),
            ),
        );

        let res = tree.parse(&["prog", "run", "-q"]);

        assert_that!(res == Ok(run), eq(true));
        assert_that!(quiet.get(), eq(Some(true)));
        assert_that!(root_usage(&tree, 'q'), eq(0));
    }

    #[test]
    fn it_should_resolve_aliases() {
        let (mut tree, [_, _, remove, _]) = sample();

        let res = tree.parse(&["prog", "remote", "rm"]);

        assert_that!(res == Ok(remove), eq(true));
    }

    #[test]
    fn it_should_fail_on_unknown_subcommand() {
        let (mut tree, _) = sample();

        let res = tree.parse(&["prog", "remote", "rename"]);

        assert_that!(
            res == Err(Error::UnrecognizedSubcommand(String::from("rename"))),
            eq(true)
        );
        assert_that!(tree.selected_command().is_none(), eq(true));
    }

    #[test]
    fn it_should_report_incomplete_command() {
        let calls = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&calls);

        let mut tree = CommandTree::new(Branch::new("prog"));
        let remote = tree.add_branch(
            tree.root(),
            Branch::new("remote").on_incomplete(move |_| *sink.borrow_mut() += 1),
        );
        tree.add_leaf(remote, Command::new("add").with_description("Add a remote"));

        let res = tree.parse(&["prog", "remote"]);
        let Err(Error::IncompleteCommand { path, help }) = res else {
            panic!("expected an incomplete command");
        };

        assert_that!(path.as_str(), eq("prog remote"));
        assert_that!(help.as_str(), contains_substring("Usage: prog remote <COMMAND>"));
        assert_that!(help.as_str(), contains_substring("add  Add a remote"));
        assert_that!(*calls.borrow(), eq(1));
    }

    #[test]
    fn it_should_keep_value_errors_of_incomplete_command() {
        let mut tree = CommandTree::new(
            Branch::new("prog")
                .with_flag(Flag::long("n").with_argument(Argument::new("n").bind(Value::<u8>::new()))),
        );
        tree.add_leaf(tree.root(), Command::new("run"));

        let res = tree.parse(&["prog", "--n", "300"]);
        let Err(error) = res else {
            panic!("expected an error");
        };

        assert_that!(error.causes().len(), eq(2));
        assert_that!(
            matches!(error.causes()[0], Error::IncompleteCommand { .. }),
            eq(true)
        );
        assert_that!(
            error.causes()[1]
                == Error::InvalidFormat {
                    raw: String::from("300"),
                    expected: "an unsigned 8-bit integer",
                },
            eq(true)
        );
    }

    #[test]
    fn it_should_fire_shadowed_flag_callbacks() {
        let fired = Rc::new(RefCell::new(Vec::new()));

        let on_root = Rc::clone(&fired);
        let on_leaf = Rc::clone(&fired);
        let mut tree = CommandTree::new(Branch::new("prog").with_flag(Flag::short('q').on_hit(
            move |_| {
                on_root.borrow_mut().push("root");
                Ok(())
            },
        )));
        tree.add_leaf(
            tree.root(),
            Command::new("run").with_flag(Flag::short('q').on_hit(move |_| {
                on_leaf.borrow_mut().push("leaf");
                Ok(())
            })),
        );

        let res = tree.parse(&["prog", "-q", "run", "-q"]);
        assert_that!(res.is_ok(), eq(true));

        let fired = fired.borrow().clone();
        assert_that!(fired.as_slice(), eq(&["root", "leaf"]));
        assert_that!(root_usage(&tree, 'q'), eq(1));
    }

    #[test]
    fn it_should_hand_early_unknown_input_to_leaf() {
        let (mut tree, [.., status]) = sample();

        let res = tree.parse(&["prog", "-x", "status", "--", "tail"]);
        assert_that!(res == Ok(status), eq(true));

        let Some(leaf) = tree.selected_command() else {
            panic!("expected a selected command");
        };

        let unmapped = [String::from("-x")];
        let passthrough = [String::from("tail")];
        assert_that!(leaf.unmapped(), eq(&unmapped[..]));
        assert_that!(leaf.passthrough(), eq(&passthrough[..]));

        let warning = leaf.warnings()[0].to_string();
        assert_that!(warning.as_str(), eq("unrecognized short flag -x"));
    }

    #[test]
    fn it_should_validate_flags_of_every_ancestor() {
        let mut tree = CommandTree::new(
            Branch::new("prog").with_flag(Flag::long("token").required()),
        );
        tree.add_leaf(tree.root(), Command::new("run"));

        let res = tree.parse(&["prog", "run"]);

        assert_that!(
            res == Err(Error::MissingFlag(String::from("--token"))),
            eq(true)
        );
    }

    #[test]
    fn it_should_fire_callbacks_from_root_to_leaf() {
        let events = Rc::new(RefCell::new(Vec::new()));

        let on_root = Rc::clone(&events);
        let on_branch = Rc::clone(&events);
        let on_leaf = Rc::clone(&events);
        let on_flag = Rc::clone(&events);

        let mut tree = CommandTree::new(
            Branch::new("prog")
                .with_flag(Flag::short('v').on_hit(move |_| {
                    on_flag.borrow_mut().push("flag");
                    Ok(())
                }))
                .on_run(move |_| {
                    on_root.borrow_mut().push("prog");
                    Ok(())
                }),
        );
        let remote = tree.add_branch(
            tree.root(),
            Branch::new("remote").on_run(move |_| {
                on_branch.borrow_mut().push("remote");
                Ok(())
            }),
        );
        tree.add_leaf(
            remote,
            Command::new("show").on_run(move |_| {
                on_leaf.borrow_mut().push("show");
                Ok(())
            }),
        );

        let res = tree.parse(&["prog", "remote", "show", "-v"]);
        assert_that!(res.is_ok(), eq(true));

        let events = events.borrow().clone();
        assert_that!(events.as_slice(), eq(&["flag", "prog", "remote", "show"]));
    }

    #[test]
    fn it_should_render_help_of_current_node() {
        let (mut tree, _) = sample();

        let res = tree.parse(&["prog", "remote", "add", "--help"]);
        let Err(Error::HelpRequested(help)) = res else {
            panic!("expected a help request");
        };

        assert_that!(help.as_str(), contains_substring("Usage: prog remote add [FLAGS] <name>"));
        assert_that!(help.as_str(), contains_substring("-c, --color"));
        assert_that!(help.as_str(), contains_substring("Add a remote"));
    }
}
