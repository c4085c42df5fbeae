use crate::context::Project;
use colored::Colorize;
use fleetform_core::GlobalState;
use fleetform_gamelift::RESOURCE_TYPE;

/// Show recorded state without touching GameLift or taking the lock.
pub async fn handle(project: &Project) -> anyhow::Result<()> {
    let state = project.state_manager().load().await?;

    if project.fleets.is_empty() {
        println!("No fleets declared in {}", project.file.display());
    }
    for name in project.fleets.keys() {
        match state.get(&GlobalState::key(RESOURCE_TYPE, name)) {
            Some(record) => {
                let remote = record.remote_status.as_deref().unwrap_or("-");
                println!(
                    "  {:<20} {:<24} {} ({})",
                    name.cyan(),
                    record.id,
                    super::status_label(&record.status.to_string()),
                    remote
                );
            }
            None => println!("  {:<20} {}", name.cyan(), "not created".dimmed()),
        }
    }

    let prefix = format!("{}:", RESOURCE_TYPE);
    let orphans: Vec<_> = state
        .by_type(RESOURCE_TYPE)
        .filter_map(|(key, record)| {
            let name = key.strip_prefix(&prefix)?;
            (!project.fleets.contains_key(name)).then_some((name, record))
        })
        .collect();
    if !orphans.is_empty() {
        println!();
        println!("{}", "Recorded but no longer declared:".yellow());
        for (name, record) in orphans {
            println!("  {:<20} {}", name, record.id);
        }
    }
    Ok(())
}
