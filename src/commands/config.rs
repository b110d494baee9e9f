//! `config {set,get,where,ignore,options}` (§6.3, §9).
//!
//! Printing config as YAML/JSON and spawning `$EDITOR` are out-of-scope
//! terminal concerns (§1); this module only resolves paths and persists the
//! two-tier TOML config the engine owns.

use std::path::PathBuf;

use crate::config::Config;
use crate::error::EngineError;
use crate::meta::MetaStore;
use crate::styling::{println, info_message};
use crate::types::Privacy;

fn config_path(local: bool, root: &std::path::Path) -> anyhow::Result<PathBuf> {
    if local {
        Ok(MetaStore::new(root).local_config_path())
    } else {
        Ok(Config::user_config_path()?)
    }
}

fn parse_privacy(value: &str) -> Result<Privacy, EngineError> {
    match value {
        "public" => Ok(Privacy::Public),
        "private" => Ok(Privacy::Private),
        "unlisted" => Ok(Privacy::Unlisted),
        other => Err(EngineError::programmer(format!("invalid privacy value: {other}"))),
    }
}

pub fn run_set(key: String, value: String, local: bool) -> anyhow::Result<()> {
    let root = crate::commands::context::working_copy_root()?;
    let path = config_path(local, &root)?;
    let mut config = Config::load_from(&path)?;

    match key.as_str() {
        "api-key" => config.api_key = Some(value),
        "refresh-token" => config.refresh_token = Some(value),
        "default-privacy" => config.default_privacy = Some(parse_privacy(&value)?),
        "concurrency" => {
            config.concurrency = Some(
                value
                    .parse()
                    .map_err(|_| EngineError::programmer("concurrency must be a positive integer"))?,
            )
        }
        "dangerous-operations.confirmation" => {
            config.dangerous_operations.confirmation =
                value.parse().map_err(|_| EngineError::programmer("expected true/false"))?
        }
        "global-ignore-files" => {
            config.global_ignore_files = value.split(':').map(PathBuf::from).collect()
        }
        other => return Err(EngineError::not_found(format!("unrecognized config key: {other}")).into()),
    }

    config.save_to(&path)?;
    println!("{}", info_message(format!("Set {key}")));
    Ok(())
}

pub fn run_get(key: String, local: bool) -> anyhow::Result<()> {
    let root = crate::commands::context::working_copy_root()?;
    let path = config_path(local, &root)?;
    let config = Config::load_from(&path)?;

    let value = match key.as_str() {
        "api-key" => config.api_key.clone(),
        "refresh-token" => config.refresh_token.clone(),
        "default-privacy" => config.default_privacy.map(|p| format!("{p:?}").to_lowercase()),
        "concurrency" => config.concurrency.map(|c| c.to_string()),
        "dangerous-operations.confirmation" => Some(config.dangerous_operations.confirmation.to_string()),
        "global-ignore-files" => Some(
            config
                .global_ignore_files
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(":"),
        ),
        other => return Err(EngineError::not_found(format!("unrecognized config key: {other}")).into()),
    };

    match value {
        Some(v) => println!("{v}"),
        None => println!("{}", info_message("(unset)")),
    }
    Ok(())
}

pub fn run_where(local: bool) -> anyhow::Result<()> {
    let root = crate::commands::context::working_copy_root()?;
    println!("{}", config_path(local, &root)?.display());
    Ok(())
}

pub fn run_ignore(local: bool) -> anyhow::Result<()> {
    let root = crate::commands::context::working_copy_root()?;
    let meta = MetaStore::new(&root);
    let path = if local { meta.local_ignore_file() } else { meta.ignore_file_path() };

    if !path.is_file() {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, "")?;
    }

    println!("{}", path.display());
    if std::env::var_os("EDITOR").is_none() {
        println!("{}", info_message("set $EDITOR to open this file automatically"));
    }
    Ok(())
}

pub fn run_options() -> anyhow::Result<()> {
    for key in Config::recognized_keys() {
        println!("{key}");
    }
    Ok(())
}
