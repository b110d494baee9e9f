use crate::commands::context::working_copy_root;
use crate::meta::MetaStore;
use crate::remote::RemoteStore;
use crate::styling::{println, info_message};

/// Browser launching is an external collaborator (§1); this only computes
/// and prints the branch URL. `no_browser` is accepted for CLI-surface
/// compatibility (§6.3) but has no effect here.
pub fn run(no_browser: bool, remote: &dyn RemoteStore) -> anyhow::Result<()> {
    let _ = no_browser;
    let root = working_copy_root()?;
    let meta = MetaStore::new(&root);
    let state = meta.load_state()?;

    let val = remote.retrieve_val(state.val.id)?;
    let branch = remote.retrieve_branch(state.val.id, state.branch.id)?;
    let url = format!("https://www.val.town/x/{}/{}@{}", val.author, val.name, branch.name);

    println!("{url}");
    println!("{}", info_message("Open this URL in a browser"));
    Ok(())
}
