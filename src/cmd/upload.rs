use crate::mirror::Mirror;
use crate::store::ROOT_ID;
use anyhow::Result;

pub fn run(args: &[String]) -> Result<()> {
    let local = super::source_folder(args)?;
    let client = super::cli_client()?;

    let summary = Mirror::new(&client).mirror(&local, ROOT_ID)?;

    let name = local
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| local.display().to_string());
    println!(
        "Uploaded folder '{}' ({} files, {} folders, id={})",
        name, summary.files_uploaded, summary.folders_created, summary.root_id
    );
    Ok(())
}
