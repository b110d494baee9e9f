use crate::commands::context::{build_ignore_rules, print_changes, resolve_concurrency, working_copy_root};
use crate::config::Config;
use crate::meta::MetaStore;
use crate::ops::pull::{PullParams, pull};
use crate::remote::RemoteStore;

pub fn run(dry_run: bool, concurrency: Option<usize>, config: &Config, remote: &dyn RemoteStore) -> anyhow::Result<()> {
    let root = working_copy_root()?;
    let meta = MetaStore::new(&root);
    let state = meta.load_state()?;
    let ignore_rules = build_ignore_rules(&root, config, &meta)?;
    let concurrency = resolve_concurrency(concurrency, config);

    let outcome = pull(
        PullParams {
            target_dir: &root,
            val_id: state.val.id,
            branch_id: state.branch.id,
            version: None,
            ignore_rules: &ignore_rules,
            dry_run,
            concurrency,
        },
        remote,
    )?;

    if !dry_run {
        meta.do_with_state(|s| {
            s.branch.version = outcome.landed_version;
            Ok(())
        })?;
    }

    print_changes(&outcome.changes);
    Ok(())
}
