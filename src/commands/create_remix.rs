use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::commands::context::{build_ignore_rules, print_changes, resolve_concurrency};
use crate::config::Config;
use crate::error::EngineError;
use crate::meta::MetaStore;
use crate::ops::create_remix::{CreateParams, RemixParams, create, remix};
use crate::remote::RemoteStore;
use crate::styling::{println, success_message};
use crate::types::Privacy;
use crate::uri::parse_val_uri;

pub fn privacy_from_flags(private: bool, public: bool, unlisted: bool) -> Option<Privacy> {
    if public {
        Some(Privacy::Public)
    } else if unlisted {
        Some(Privacy::Unlisted)
    } else if private {
        Some(Privacy::Private)
    } else {
        None
    }
}

fn ensure_usable_dir(path: &Path, upload_if_exists: bool) -> Result<(), EngineError> {
    if path.exists() && path.read_dir()?.next().is_some() && !upload_if_exists {
        return Err(EngineError::UnsafeDirectory { path: path.to_path_buf() });
    }
    std::fs::create_dir_all(path)?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn run_create(
    name: String,
    dir: Option<PathBuf>,
    privacy: Option<Privacy>,
    org_name: Option<String>,
    upload_if_exists: bool,
    concurrency: Option<usize>,
    config: &Config,
    remote: &dyn RemoteStore,
) -> anyhow::Result<()> {
    let _ = org_name; // organization targeting is a remote/auth concern, out of scope (§1)
    let target = dir.unwrap_or_else(|| PathBuf::from(&name));
    ensure_usable_dir(&target, upload_if_exists).context("preparing create target directory")?;

    let meta = MetaStore::new(&target);
    let ignore_rules = build_ignore_rules(&target, config, &meta)?;
    let concurrency = resolve_concurrency(concurrency, config);

    let outcome = create(
        CreateParams {
            source_dir: &target,
            val_name: name,
            privacy,
            description: None,
            ignore_rules: &ignore_rules,
            do_upload: true,
            concurrency,
        },
        remote,
    )?;

    meta.init_state(outcome.new_val.id, outcome.new_branch_id, 1)?;
    print_changes(&outcome.item_state_changes);
    println!("{}", success_message(format!("Created {}", outcome.new_val.name)));
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn run_remix(
    src_uri: String,
    new_name: Option<String>,
    dir: Option<PathBuf>,
    privacy: Option<Privacy>,
    description: Option<String>,
    concurrency: Option<usize>,
    config: &Config,
    remote: &dyn RemoteStore,
) -> anyhow::Result<()> {
    let parsed = parse_val_uri(&src_uri).map_err(EngineError::programmer)?;
    let src_val = remote.resolve_alias(&parsed.author, &parsed.name)?;
    let src_branches = remote.list_branches(src_val.id)?;
    let src_branch = src_branches
        .iter()
        .find(|b| Some(&b.name) == parsed.branch.as_ref())
        .or_else(|| src_branches.first())
        .ok_or_else(|| EngineError::not_found("source val has no branches"))?
        .clone();

    let new_name = new_name.unwrap_or_else(|| src_val.name.clone());
    let target = dir.unwrap_or_else(|| PathBuf::from(&new_name));
    ensure_usable_dir(&target, false).context("preparing remix target directory")?;

    let meta = MetaStore::new(&target);
    let ignore_rules = build_ignore_rules(&target, config, &meta)?;
    let concurrency = resolve_concurrency(concurrency, config);

    let outcome = remix(
        RemixParams {
            target_dir: &target,
            src_val_id: src_val.id,
            src_branch_id: src_branch.id,
            val_name: new_name,
            privacy,
            description,
            ignore_rules: &ignore_rules,
            concurrency,
        },
        remote,
    )?;

    meta.init_state(outcome.to_val_id, outcome.to_branch_id, outcome.to_version)?;
    print_changes(&outcome.file_state_changes);
    println!("{}", success_message(format!("Remixed into {}", target.display())));
    Ok(())
}
