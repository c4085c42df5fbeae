pub mod apply;
pub mod create;
pub mod delete;
pub mod list;
pub mod read;
pub mod update;
pub mod validate;

use colored::{ColoredString, Colorize};
use fleetform_gamelift::FleetState;

pub(crate) fn status_label(status: &str) -> ColoredString {
    match status {
        "ACTIVE" | "active" => status.green(),
        "ERROR" | "TERMINATED" | "failed" => status.red(),
        _ => status.yellow(),
    }
}

pub(crate) fn print_fleet(name: &str, fleet: &FleetState) {
    println!("{} {}", "■".cyan(), name.bold());
    println!("  fleet_id:  {}", fleet.fleet_id.cyan());
    println!("  status:    {}", status_label(fleet.status.as_str()));
    if let Some(arn) = &fleet.fleet_arn {
        println!("  arn:       {}", arn);
    }
    println!("  build:     {}", fleet.config.build_id);
    println!("  instance:  {}", fleet.config.ec2_instance_type);
    if let Some(os) = &fleet.operating_system {
        println!("  os:        {}", os);
    }
}
