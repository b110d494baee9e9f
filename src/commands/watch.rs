use crate::commands::context::{build_ignore_rules, print_changes, resolve_concurrency, working_copy_root, DEFAULT_DEBOUNCE_MS, DEFAULT_GRACE_MS};
use crate::config::Config;
use crate::meta::MetaStore;
use crate::remote::RemoteStore;
use crate::styling::{println, progress_message};
use crate::watcher::{WatcherParams, watch};

/// The browser companion websocket is an external collaborator (§1); only
/// its trigger hook is in scope, so `no_companion` is accepted but unused.
pub fn run(
    debounce_ms: Option<u64>,
    grace_ms: Option<u64>,
    no_companion: bool,
    concurrency: Option<usize>,
    config: &Config,
    remote: &dyn RemoteStore,
) -> anyhow::Result<()> {
    let _ = no_companion;
    let root = working_copy_root()?;
    let meta = MetaStore::new(&root);
    let state = meta.load_state()?;
    let ignore_rules = build_ignore_rules(&root, config, &meta)?;

    println!("{}", progress_message(format!("Watching {}", root.display())));

    watch(
        WatcherParams {
            target_dir: &root,
            val_id: state.val.id,
            branch_id: state.branch.id,
            ignore_rules: &ignore_rules,
            debounce_delay_ms: debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS),
            grace_period_ms: grace_ms.unwrap_or(DEFAULT_GRACE_MS),
            concurrency: resolve_concurrency(concurrency, config),
        },
        remote,
        &meta,
        |changes| print_changes(changes),
    )?;

    Ok(())
}
