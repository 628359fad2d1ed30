use crate::store::{RemoteStore, ROOT_ID};
use anyhow::Result;

pub fn run() -> Result<()> {
    let client = super::cli_client()?;
    let folders = client.list_folders(ROOT_ID)?;

    if folders.is_empty() {
        println!("No folders found.");
        return Ok(());
    }

    println!("Folders:");
    for folder in &folders {
        println!("{} (ID: {})", folder.name, folder.id);
    }
    Ok(())
}
