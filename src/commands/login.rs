//! `login` / `logout` (§6.3): "Handled by external auth; engine only sees
//! resulting credentials." The engine's part is persisting (or clearing)
//! whatever credential the external auth step already produced via
//! `API_KEY`; it never performs the OAuth flow itself.

use crate::commands::context::working_copy_root;
use crate::config::Config;
use crate::error::EngineError;
use crate::meta::MetaStore;
use crate::styling::{println, success_message};

fn config_path(local: bool) -> anyhow::Result<std::path::PathBuf> {
    if local {
        Ok(MetaStore::new(working_copy_root()?).local_config_path())
    } else {
        Ok(Config::user_config_path()?)
    }
}

pub fn run_login(local: bool, global: bool) -> anyhow::Result<()> {
    let local = local || !global;
    let api_key = std::env::var("API_KEY").map_err(|_| EngineError::AuthMissing)?;

    let path = config_path(local)?;
    let mut config = Config::load_from(&path)?;
    config.api_key = Some(api_key);
    config.save_to(&path)?;

    println!("{}", success_message("Logged in"));
    Ok(())
}

pub fn run_logout(local: bool, global: bool) -> anyhow::Result<()> {
    let local = local || !global;
    let path = config_path(local)?;
    let mut config = Config::load_from(&path)?;
    config.api_key = None;
    config.refresh_token = None;
    config.save_to(&path)?;

    println!("{}", success_message("Logged out"));
    Ok(())
}
