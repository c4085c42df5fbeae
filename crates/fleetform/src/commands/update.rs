use crate::context::{Project, Session};
use colored::Colorize;
use fleetform_core::CancellationToken;

pub async fn handle(project: &Project, name: &str, cancel: CancellationToken) -> anyhow::Result<()> {
    let desired = project.fleet(name)?;
    let reconciler = project.reconciler(cancel).await?;
    let mut session = Session::open(project).await?;
    let mut record = session.record(name);

    println!("{}", format!("Updating fleet {}...", name).blue());
    let result = reconciler.update(&mut record, desired).await;
    session.put(name, record).await?;
    session.close().await?;

    let fleet = result?;
    println!("{}", "✓ Update accepted".green().bold());
    super::print_fleet(name, &fleet);
    Ok(())
}
