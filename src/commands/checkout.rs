use crate::commands::context::{build_ignore_rules, print_changes, resolve_concurrency, working_copy_root};
use crate::config::Config;
use crate::error::EngineError;
use crate::meta::MetaStore;
use crate::ops::checkout::{CheckoutParams, CheckoutShape, checkout, dangerous_changes};
use crate::remote::RemoteStore;
use crate::status::{StatusEngineInput, status};
use crate::styling::{println, success_message};
use crate::types::BranchRef;

#[allow(clippy::too_many_arguments)]
pub fn run(
    branch_name: String,
    fork: bool,
    force: bool,
    dry_run: bool,
    concurrency: Option<usize>,
    config: &Config,
    remote: &dyn RemoteStore,
) -> anyhow::Result<()> {
    let root = working_copy_root()?;
    let meta = MetaStore::new(&root);
    let state = meta.load_state()?;
    let ignore_rules = build_ignore_rules(&root, config, &meta)?;
    let concurrency = resolve_concurrency(concurrency, config);

    let branches = remote.list_branches(state.val.id)?;
    let existing = branches.iter().find(|b| b.name == branch_name);

    let shape = match (fork, existing) {
        (true, Some(_)) => return Err(EngineError::conflict(branch_name).into()),
        (true, None) => CheckoutShape::Fork { forked_from_id: state.branch.id, name: branch_name },
        (false, Some(b)) => CheckoutShape::Branch { to_branch_id: b.id, to_branch_version: None },
        (false, None) => return Err(EngineError::not_found(format!("branch {branch_name}")).into()),
    };

    if !force && !dry_run && matches!(shape, CheckoutShape::Branch { .. }) {
        let local_status = status(
            StatusEngineInput {
                target_dir: &root,
                val_id: state.val.id,
                branch_id: state.branch.id,
                version: state.branch.version,
                ignore_rules: &ignore_rules,
            },
            remote,
        )?;
        let dangerous = dangerous_changes(&local_status);
        if !dangerous.is_empty() {
            return Err(EngineError::DirtyWorkingCopy { dangerous: Box::new(dangerous) }.into());
        }
    }

    let outcome = checkout(
        CheckoutParams {
            target_dir: &root,
            val_id: state.val.id,
            from_branch_id: state.branch.id,
            shape,
            dry_run,
            ignore_rules: &ignore_rules,
            concurrency,
        },
        remote,
    )?;

    if !dry_run && let Some(to_branch) = &outcome.to_branch {
        meta.do_with_state(|s| {
            s.branch = BranchRef { id: to_branch.id, version: to_branch.version };
            Ok(())
        })?;
    }

    print_changes(&outcome.changes);
    if let Some(to_branch) = &outcome.to_branch {
        println!("{}", success_message(format!("Switched to branch {}@{}", to_branch.name, to_branch.version)));
    }
    Ok(())
}
