//! Trees of nested subcommands.
//!
//! A [`CommandTree`] owns its nodes in an arena. Every node but the root has a parent, and
//! flags declared on a node are visible from all of its descendants, the nearest declaration
//! winning. Inner nodes are [`Branch`]es; the runnable ones, the leaves, are [`Command`]s.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::argument::Argument;
use crate::command::Command;
use crate::error::Error;
use crate::flag::{self, Flag, FlagGroup};
use crate::help::{Help, HelpRenderer, PlainHelp};
use crate::interpreter;

/// A callback fired on every branch along the selected path after a successful parse.
pub type BranchCallback = Box<dyn FnMut(&Branch) -> Result<(), Error>>;

/// A handler called when the input ends on a branch.
pub type IncompleteHandler = Box<dyn FnMut(&Branch)>;

/// Index of a node in a [`CommandTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NodeId(usize);

/// Defines a `Branch`, a node that only dispatches to its children.
pub struct Branch {
    name: String,
    aliases: Vec<String>,
    description: String,
    groups: Vec<FlagGroup>,
    callback: Option<BranchCallback>,
    on_incomplete: Option<IncompleteHandler>,
}

impl Branch {
    /// Create an empty branch.
    pub fn new(name: impl Into<String>) -> Self {
        Branch {
            name: name.into(),
            aliases: Vec::new(),
            description: String::new(),
            groups: Vec::new(),
            callback: None,
            on_incomplete: None,
        }
    }

    /// Add an alternative name.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Set the description shown in help.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a flag to the first group. The flag is usable from every descendant.
    pub fn with_flag(mut self, flag: Flag) -> Self {
        flag::push_into(&mut self.groups, flag);
        self
    }

    /// Add a group of flags.
    pub fn with_group(mut self, group: FlagGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Set the callback fired when a leaf below this branch has been run.
    pub fn on_run<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&Branch) -> Result<(), Error> + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Set the handler called when the input ends on this branch.
    pub fn on_incomplete<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&Branch) + 'static,
    {
        self.on_incomplete = Some(Box::new(handler));
        self
    }

    /// Name of the branch.
    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Alternative names of the branch.
    #[inline(always)]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Description of the branch.
    #[inline(always)]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Flag groups, in declaration order.
    #[inline(always)]
    pub fn groups(&self) -> &[FlagGroup] {
        &self.groups
    }

    /// Find a flag declared on this branch by long form.
    pub fn find_long_flag(&self, long: &str) -> Option<&Flag> {
        flag::find_long_in(&self.groups, long).map(|(g, i)| &self.groups[g].flags()[i])
    }

    /// Find a flag declared on this branch by short form.
    pub fn find_short_flag(&self, short: char) -> Option<&Flag> {
        flag::find_short_in(&self.groups, short).map(|(g, i)| &self.groups[g].flags()[i])
    }

    pub(crate) fn fire(&mut self) -> Result<(), Error> {
        if let Some(mut callback) = self.callback.take() {
            let result = callback(self);
            self.callback = Some(callback);
            return result;
        }

        Ok(())
    }

    pub(crate) fn fire_incomplete(&mut self) {
        if let Some(mut handler) = self.on_incomplete.take() {
            handler(self);
            self.on_incomplete = Some(handler);
        }
    }
}

impl fmt::Debug for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Branch")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("groups", &self.groups)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
enum NodeKind {
    Branch(Branch),
    Leaf(Command),
}

#[derive(Debug)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

impl Node {
    fn name(&self) -> &str {
        match &self.kind {
            NodeKind::Branch(x) => x.name(),
            NodeKind::Leaf(x) => x.name(),
        }
    }

    fn description(&self) -> &str {
        match &self.kind {
            NodeKind::Branch(x) => x.description(),
            NodeKind::Leaf(x) => x.description(),
        }
    }

    fn is_named(&self, name: &str) -> bool {
        match &self.kind {
            NodeKind::Branch(x) => x.name == name || x.aliases.iter().any(|x| x == name),
            NodeKind::Leaf(x) => x.is_named(name),
        }
    }

    fn groups(&self) -> &[FlagGroup] {
        match &self.kind {
            NodeKind::Branch(x) => &x.groups,
            NodeKind::Leaf(x) => &x.groups,
        }
    }

    fn groups_mut(&mut self) -> &mut Vec<FlagGroup> {
        match &mut self.kind {
            NodeKind::Branch(x) => &mut x.groups,
            NodeKind::Leaf(x) => &mut x.groups,
        }
    }
}

/// Defines a `CommandTree`, a root branch and its nested subcommands.
///
/// ```
/// use argot::{Branch, Command, CommandTree, Flag};
///
/// let mut tree = CommandTree::new(Branch::new("git").with_flag(Flag::short('C')));
/// let remote = tree.add_branch(tree.root(), Branch::new("remote"));
/// let add = tree.add_leaf(remote, Command::new("add"));
///
/// let selected = tree.parse(&["git", "remote", "add", "-C"]).unwrap();
///
/// assert_eq!(selected, add);
/// assert_eq!(tree.selected_path(), ["git", "remote", "add"]);
/// ```
pub struct CommandTree {
    nodes: Vec<Node>,
    visited: Vec<NodeId>,
    selected: Option<NodeId>,
    renderer: Option<Box<dyn HelpRenderer>>,
}

impl CommandTree {
    /// Create a tree with the given root.
    pub fn new(root: Branch) -> Self {
        CommandTree {
            nodes: alloc::vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Branch(root),
            }],
            visited: Vec::new(),
            selected: None,
            renderer: None,
        }
    }

    /// Replace the help renderer.
    pub fn with_help_renderer(mut self, renderer: impl HelpRenderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    /// Identifier of the root.
    #[inline(always)]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn add(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        assert!(
            matches!(self.nodes[parent.0].kind, NodeKind::Branch(_)),
            "a command cannot have subcommands"
        );

        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            kind,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Add a branch below `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is a leaf.
    pub fn add_branch(&mut self, parent: NodeId, branch: Branch) -> NodeId {
        self.add(parent, NodeKind::Branch(branch))
    }

    /// Add a leaf below `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is a leaf.
    pub fn add_leaf(&mut self, parent: NodeId, command: Command) -> NodeId {
        self.add(parent, NodeKind::Leaf(command))
    }

    /// Find a child of `id` by name or alias.
    pub fn find_child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.nodes[id.0]
            .children
            .iter()
            .copied()
            .find(|x| self.nodes[x.0].is_named(name))
    }

    /// Parent of `id`, if any.
    #[inline(always)]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Children of `id`, in declaration order.
    #[inline(always)]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Iterate from `id` up to the root, both included.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        core::iter::successors(Some(id), |x| self.parent(*x))
    }

    /// Name of `id`.
    #[inline(always)]
    pub fn name(&self, id: NodeId) -> &str {
        self.nodes[id.0].name()
    }

    /// Check if `id` is a leaf.
    #[inline(always)]
    pub fn is_leaf(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].kind, NodeKind::Leaf(_))
    }

    /// Access `id` as a branch.
    pub fn branch(&self, id: NodeId) -> Option<&Branch> {
        match &self.nodes[id.0].kind {
            NodeKind::Branch(x) => Some(x),
            NodeKind::Leaf(_) => None,
        }
    }

    /// Access `id` as a branch, mutable.
    pub fn branch_mut(&mut self, id: NodeId) -> Option<&mut Branch> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Branch(x) => Some(x),
            NodeKind::Leaf(_) => None,
        }
    }

    /// Access `id` as a leaf.
    pub fn leaf(&self, id: NodeId) -> Option<&Command> {
        match &self.nodes[id.0].kind {
            NodeKind::Leaf(x) => Some(x),
            NodeKind::Branch(_) => None,
        }
    }

    /// Access `id` as a leaf, mutable.
    pub fn leaf_mut(&mut self, id: NodeId) -> Option<&mut Command> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Leaf(x) => Some(x),
            NodeKind::Branch(_) => None,
        }
    }

    pub(crate) fn groups(&self, id: NodeId) -> &[FlagGroup] {
        self.nodes[id.0].groups()
    }

    pub(crate) fn groups_mut(&mut self, id: NodeId) -> &mut Vec<FlagGroup> {
        self.nodes[id.0].groups_mut()
    }

    /// Names from the root down to `id`.
    pub fn path(&self, id: NodeId) -> Vec<&str> {
        let mut path: Vec<&str> = self.ancestors(id).map(|x| self.name(x)).collect();
        path.reverse();
        path
    }

    /// Render the help of `id`, listing the flags inherited from its ancestors after its own.
    pub fn render_help(&self, id: NodeId) -> String {
        let node = &self.nodes[id.0];

        let arguments: &[Argument] = match &node.kind {
            NodeKind::Leaf(x) => x.arguments(),
            NodeKind::Branch(_) => &[],
        };

        let help = Help {
            path: self.path(id),
            description: node.description(),
            groups: self.ancestors(id).flat_map(|x| self.groups(x)).collect(),
            arguments,
            commands: node
                .children
                .iter()
                .map(|x| (self.name(*x), self.nodes[x.0].description()))
                .collect(),
        };

        match self.renderer.as_deref() {
            Some(renderer) => help.render_with(renderer),
            None => help.render_with(&PlainHelp),
        }
    }

    /// Leaf selected by the last parse.
    pub fn selected_command(&self) -> Option<&Command> {
        self.selected.and_then(|x| self.leaf(x))
    }

    /// Identifier of the leaf selected by the last parse.
    #[inline(always)]
    pub fn selected_id(&self) -> Option<NodeId> {
        self.selected
    }

    /// Names of the nodes walked through by the last parse, from the root.
    pub fn selected_path(&self) -> Vec<&str> {
        self.visited
            .iter()
            .chain(self.selected.as_ref())
            .map(|x| self.name(*x))
            .collect()
    }

    /// Branches walked through by the last parse, from the root.
    #[inline(always)]
    pub fn visited(&self) -> &[NodeId] {
        &self.visited
    }

    pub(crate) fn select(&mut self, visited: Vec<NodeId>, selected: Option<NodeId>) {
        self.visited = visited;
        self.selected = selected;
    }

    /// Parse the command line, including the program name, and return the selected leaf.
    ///
    /// When the input ends before a leaf is selected, the error is
    /// [`Error::IncompleteCommand`], followed by the errors on values collected so far if any.
    ///
    /// A tree is meant to be parsed once, see [`Command::parse`].
    pub fn parse(&mut self, argv: &[&str]) -> Result<NodeId, Error> {
        interpreter::tree::parse_tree(self, argv)
    }

    /// Parse the command line, and terminate on error. See [`Command::must_parse`].
    pub fn must_parse(&mut self, argv: &[&str]) -> NodeId {
        match self.parse(argv) {
            Ok(id) => id,
            Err(error) => crate::exit_on_error(error),
        }
    }
}

impl fmt::Debug for CommandTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandTree")
            .field("nodes", &self.nodes)
            .field("visited", &self.visited)
            .field("selected", &self.selected)
            .finish_non_exhaustive()
    }
}
