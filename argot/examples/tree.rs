use argot::{Argument, Branch, Command, CommandTree, Flag, Value};

fn main() {
    let verbose = Value::<bool>::new();
    let name = Value::<String>::new();
    let url = Value::<String>::new();

    let mut tree = CommandTree::new(
        Branch::new("remotes")
            .with_description("Manage a list of remotes.")
            .with_flag(Flag::help())
            .with_flag(
                Flag::short('v')
                    .with_long("verbose")
                    .with_description("Print more")
                    .with_argument(Argument::new("on").optional().bind(verbose.clone())),
            ),
    );

    let remote = tree.add_branch(
        tree.root(),
        Branch::new("remote").with_description("Work with remotes"),
    );

    let on_add = (name.clone(), url.clone());
    tree.add_leaf(
        remote,
        Command::new("add")
            .with_description("Add a remote")
            .with_argument(Argument::new("name").bind(name.clone()))
            .with_argument(Argument::new("url").bind(url.clone()))
            .on_run(move |_| {
                let (name, url) = &on_add;
                println!(
                    "added {} at {}",
                    name.get().unwrap_or_default(),
                    url.get().unwrap_or_default()
                );
                Ok(())
            }),
    );

    tree.add_leaf(
        remote,
        Command::new("remove")
            .with_alias("rm")
            .with_description("Remove a remote")
            .with_argument(Argument::new("name").bind(name.clone())),
    );

    let args: Vec<String> = std::env::args().collect();
    let argv: Vec<&str> = args.iter().map(String::as_str).collect();

    let selected = tree.must_parse(&argv);

    if verbose.get().unwrap_or(false) {
        println!("selected: {}", tree.path(selected).join(" "));

        if let Some(command) = tree.selected_command() {
            for warning in command.warnings() {
                println!("warning: {warning}");
            }
        }
    }
}
