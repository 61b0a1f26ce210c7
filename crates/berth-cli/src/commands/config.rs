//! `berth config`: validate the project and print the resolved model.

use berth_compose::Project;
use clap::Args;

use crate::output::{Format, render};

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Yaml)]
    pub format: Format,

    /// Print only the service names, one per line.
    #[arg(long)]
    pub services: bool,
}

/// Executes the `config` command.
///
/// # Errors
///
/// Returns an error if the model cannot be serialized.
pub fn execute(args: &ConfigArgs, project: &Project) -> anyhow::Result<()> {
    tracing::info!(
        project = project.name(),
        files = project.files().len(),
        "printing resolved configuration"
    );

    if args.services {
        for name in project.services().names() {
            println!("{name}");
        }
        return Ok(());
    }

    print!("{}", render(project.model(), args.format)?);
    Ok(())
}
