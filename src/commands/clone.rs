use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::commands::context::{build_ignore_rules, print_changes, resolve_concurrency};
use crate::config::Config;
use crate::error::EngineError;
use crate::meta::MetaStore;
use crate::ops::clone::{CloneParams, clone};
use crate::remote::RemoteStore;
use crate::styling::{println, success_message};
use crate::uri::parse_val_uri;

fn ensure_target_dir(path: &Path) -> Result<(), EngineError> {
    if path.exists() && path.read_dir()?.next().is_some() {
        return Err(EngineError::UnsafeDirectory { path: path.to_path_buf() });
    }
    std::fs::create_dir_all(path)?;
    Ok(())
}

pub fn run(
    val_uri: String,
    dir: Option<PathBuf>,
    branch: Option<String>,
    concurrency: Option<usize>,
    config: &Config,
    remote: &dyn RemoteStore,
) -> anyhow::Result<()> {
    let parsed = parse_val_uri(&val_uri).map_err(EngineError::programmer)?;
    let val = remote.resolve_alias(&parsed.author, &parsed.name)?;

    let target = dir.unwrap_or_else(|| PathBuf::from(&val.name));
    ensure_target_dir(&target).context("preparing clone target directory")?;

    let branches = remote.list_branches(val.id)?;
    let branch_name = branch.or_else(|| parsed.branch.clone()).unwrap_or_else(|| "main".to_string());
    let branch_meta = branches
        .iter()
        .find(|b| b.name == branch_name)
        .or_else(|| branches.first())
        .ok_or_else(|| EngineError::not_found(format!("branch {branch_name}")))?
        .clone();

    let meta = MetaStore::new(&target);
    let ignore_rules = build_ignore_rules(&target, config, &meta)?;
    let concurrency = resolve_concurrency(concurrency, config);

    let changes = clone(
        CloneParams {
            target_dir: &target,
            val_id: val.id,
            branch_id: branch_meta.id,
            version: branch_meta.version,
            ignore_rules: &ignore_rules,
            dry_run: false,
            overwrite: false,
            concurrency,
        },
        remote,
    )?;

    meta.init_state(val.id, branch_meta.id, branch_meta.version)?;

    print_changes(&changes);
    println!("{}", success_message(format!("Cloned {} into {}", val.name, target.display())));
    Ok(())
}
