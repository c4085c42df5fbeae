use crate::context::{Project, Session};
use colored::Colorize;
use fleetform_core::{Applied, CancellationToken};

pub async fn handle(
    project: &Project,
    name: Option<&str>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let targets: Vec<&str> = match name {
        Some(name) => {
            project.fleet(name)?;
            vec![name]
        }
        None => project.fleets.keys().map(String::as_str).collect(),
    };
    if targets.is_empty() {
        println!("No fleets declared in {}", project.file.display());
        return Ok(());
    }

    let reconciler = project.reconciler(cancel.clone()).await?;
    let mut session = Session::open(project).await?;
    let mut failed = Vec::new();

    for name in targets {
        if cancel.is_cancelled() {
            println!("{}", "Cancelled, remaining fleets skipped".yellow());
            break;
        }
        let desired = project.fleet(name)?;
        let mut record = session.record(name);

        println!("{}", format!("Applying fleet {}...", name).blue());
        let result = reconciler.apply(&mut record, desired).await;
        session.put(name, record).await?;

        match result {
            Ok(Applied::Created(fleet)) => {
                println!("  {} created {}", "✓".green(), fleet.fleet_id.cyan());
            }
            Ok(Applied::Updated(fleet)) => {
                println!("  {} updated {}", "✓".green(), fleet.fleet_id.cyan());
            }
            Err(e) => {
                eprintln!("  {} {}", "✗".red(), e);
                failed.push(name);
            }
        }
    }
    session.close().await?;

    if !failed.is_empty() {
        anyhow::bail!("Apply failed for: {}", failed.join(", "));
    }
    println!("{}", "✓ Apply complete".green().bold());
    Ok(())
}
