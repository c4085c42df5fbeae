use crate::context::{Project, Session};
use colored::Colorize;
use fleetform_core::CancellationToken;

pub async fn handle(project: &Project, name: &str, cancel: CancellationToken) -> anyhow::Result<()> {
    let mut session = Session::open(project).await?;
    let mut record = session.record(name);

    if !record.has_id() {
        session.close().await?;
        println!("Fleet {} is not managed, nothing to delete", name.cyan());
        return Ok(());
    }

    let reconciler = project.reconciler(cancel).await?;

    let id = record.id.clone();
    println!("{}", format!("Deleting fleet {} ({})...", name, id).yellow());
    let result = reconciler.delete(&mut record).await;
    session.put(name, record).await?;
    session.close().await?;

    result?;
    println!("{}", format!("✓ Deleted {}", id).green().bold());
    Ok(())
}
