use crate::commands::context::working_copy_root;
use crate::error::EngineError;
use crate::meta::MetaStore;
use crate::remote::RemoteStore;
use crate::styling::{println, success_message};

pub fn run(delete: Option<String>, remote: &dyn RemoteStore) -> anyhow::Result<()> {
    let root = working_copy_root()?;
    let meta = MetaStore::new(&root);
    let state = meta.load_state()?;
    let branches = remote.list_branches(state.val.id)?;

    match delete {
        Some(name) => {
            let target = branches
                .iter()
                .find(|b| b.name == name)
                .ok_or_else(|| EngineError::not_found(format!("branch {name}")))?;
            if target.id == state.branch.id {
                return Err(EngineError::conflict("cannot delete the currently checked-out branch").into());
            }
            remote.delete_branch(state.val.id, target.id)?;
            println!("{}", success_message(format!("Deleted branch {name}")));
        }
        None => {
            for branch in &branches {
                let marker = if branch.id == state.branch.id { "* " } else { "  " };
                println!("{marker}{}@{}", branch.name, branch.version);
            }
        }
    }
    Ok(())
}
