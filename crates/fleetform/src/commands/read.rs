use crate::context::{Project, Session};
use colored::Colorize;
use fleetform_core::CancellationToken;

pub async fn handle(project: &Project, name: &str, cancel: CancellationToken) -> anyhow::Result<()> {
    project.fleet(name)?;
    let reconciler = project.reconciler(cancel).await?;
    let mut session = Session::open(project).await?;
    let mut record = session.record(name);
    let had_id = record.has_id();

    let result = reconciler.read(&mut record).await;
    session.put(name, record).await?;
    session.close().await?;

    match result? {
        Some(fleet) => {
            super::print_fleet(name, &fleet);
            println!();
            println!("{}", serde_json::to_string_pretty(&fleet)?);
        }
        None if had_id => {
            println!(
                "{}",
                format!("Fleet {} no longer exists; removed from state", name).yellow()
            );
        }
        None => {
            println!("Fleet {} has not been created", name.cyan());
        }
    }
    Ok(())
}
