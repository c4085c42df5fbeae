use crate::context::{Project, Session};
use colored::Colorize;
use fleetform_core::CancellationToken;

pub async fn handle(
    project: &Project,
    name: &str,
    replace: bool,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let desired = project.fleet(name)?;
    let reconciler = project.reconciler(cancel).await?;
    let mut session = Session::open(project).await?;
    let mut record = session.record(name);

    if replace && record.has_id() {
        println!(
            "{}",
            format!("Replacing fleet {} ({})...", name, record.id).yellow()
        );
    } else {
        println!("{}", format!("Creating fleet {}...", name).blue());
    }

    let result = if replace {
        reconciler.replace(&mut record, desired).await
    } else {
        reconciler.create(&mut record, desired).await
    };
    session.put(name, record).await?;
    session.close().await?;

    let fleet = result?;
    println!("{}", "✓ Fleet is ACTIVE".green().bold());
    super::print_fleet(name, &fleet);
    Ok(())
}
