use crate::context::Project;
use colored::Colorize;
use fleetform_core::Translator;
use fleetform_gamelift::FleetTranslator;

pub fn handle(project: &Project) -> anyhow::Result<()> {
    println!("{}", "Validating project file...".blue());
    println!("Project file: {}", project.file.display().to_string().cyan());

    let mut errors = 0;

    if let Err(e) = project.settings.timeouts.poll_config() {
        eprintln!("  {} settings: {}", "✗".red(), e);
        errors += 1;
    }

    println!("Fleets: {}", project.fleets.len());
    for (name, fleet) in &project.fleets {
        match FleetTranslator.validate(fleet) {
            Ok(()) => println!(
                "  {} {} ({}, {})",
                "✓".green(),
                name.cyan(),
                fleet.build_id,
                fleet.ec2_instance_type
            ),
            Err(e) => {
                eprintln!("  {} {}: {}", "✗".red(), name.cyan(), e);
                errors += 1;
            }
        }
    }

    if errors > 0 {
        anyhow::bail!("{} problem(s) found", errors);
    }
    println!("{}", "✓ Project file is valid".green().bold());
    Ok(())
}
