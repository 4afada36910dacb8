use std::path::PathBuf;

use staticship_cloud::plan_uploads;

/// Print `<key>\t<content type>` for every file under `dir`.
pub async fn plan(dir: PathBuf, prefix: Option<&str>) -> anyhow::Result<()> {
    let units = plan_uploads(dir, prefix).await?;

    for unit in &units {
        println!("{}\t{}", unit.key, unit.content_type);
    }
    tracing::info!(files = units.len(), "plan complete");
    Ok(())
}
