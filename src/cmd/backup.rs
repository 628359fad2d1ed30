use anyhow::Result;

pub fn run(args: &[String]) -> Result<()> {
    let local = super::source_folder(args)?;
    let client = super::cli_client()?;

    let summary = crate::backup::backup(&client, &local, None)?;

    println!(
        "Backup created: {} ({} files, {} folders)",
        summary.backup_name, summary.mirror.files_uploaded, summary.mirror.folders_created
    );
    Ok(())
}
