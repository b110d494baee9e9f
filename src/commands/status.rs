use crate::commands::context::{build_ignore_rules, print_changes, working_copy_root};
use crate::config::Config;
use crate::meta::MetaStore;
use crate::remote::RemoteStore;
use crate::status::{StatusEngineInput, detect_renames, status};
use crate::styling::println;

pub fn run(config: &Config, remote: &dyn RemoteStore) -> anyhow::Result<()> {
    let root = working_copy_root()?;
    let meta = MetaStore::new(&root);
    let state = meta.load_state()?;
    let ignore_rules = build_ignore_rules(&root, config, &meta)?;

    let branch = remote.retrieve_branch(state.val.id, state.branch.id)?;

    let mut result = status(
        StatusEngineInput {
            target_dir: &root,
            val_id: state.val.id,
            branch_id: state.branch.id,
            version: state.branch.version,
            ignore_rules: &ignore_rules,
        },
        remote,
    )?;
    result = detect_renames(result, |path| std::fs::read(root.join(path)).ok());

    println!("On branch {}@{}", branch.name, state.branch.version);
    print_changes(&result);
    Ok(())
}
