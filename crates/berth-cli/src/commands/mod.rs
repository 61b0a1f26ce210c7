//! CLI command definitions and dispatch.

pub mod config;

use std::path::PathBuf;

use berth_common::config::{ProjectConfig, split_compose_file_env};
use berth_common::constants::{BIN_NAME, COMPOSE_FILE_ENV};
use berth_compose::{FileResourceLookup, OsEnvironment, Project};
use clap::{Parser, Subcommand};

/// Compose project resolver.
#[derive(Parser, Debug)]
#[command(name = BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Compose file to load; repeat to layer several files in order.
    #[arg(short = 'f', long = "file", global = true, env = COMPOSE_FILE_ENV)]
    pub files: Vec<String>,

    /// Project name; defaults to the project directory name.
    #[arg(short = 'p', long, global = true)]
    pub project_name: Option<String>,

    /// Keep `$VAR` references instead of substituting the environment.
    #[arg(long, global = true)]
    pub no_interpolate: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate the compose files and print the resolved configuration.
    Config(config::ConfigArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let project = load_project(&cli)?;
    match cli.command {
        Command::Config(args) => config::execute(&args, &project),
    }
}

/// Builds the project configuration from the global flags.
///
/// Each `--file` value may itself hold several paths joined by the
/// platform separator, as `COMPOSE_FILE` does.
fn project_config(cli: &Cli) -> anyhow::Result<ProjectConfig> {
    let files: Vec<PathBuf> = cli
        .files
        .iter()
        .flat_map(|value| split_compose_file_env(value))
        .collect();
    let config = if files.is_empty() {
        ProjectConfig::discover(&std::env::current_dir()?)?
    } else {
        ProjectConfig::with_files(files)?
    };
    Ok(match &cli.project_name {
        Some(name) => config.named(name),
        None => config,
    })
}

/// Loads every compose file of the project.
fn load_project(cli: &Cli) -> anyhow::Result<Project> {
    let config = project_config(cli)?;
    tracing::debug!(
        project = config.project_name.as_str(),
        files = config.compose_files.len(),
        "loading compose project"
    );

    let mut project = Project::new(config.project_name.as_str()).with_resources(FileResourceLookup);
    if !cli.no_interpolate {
        project = project.with_environment(OsEnvironment);
    }
    let project = project.load(&config)?;
    for warning in project.warnings() {
        tracing::debug!(%warning, "resolution warning");
    }
    Ok(project)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_flags_are_split_and_kept_in_order() {
        let sep = berth_common::constants::COMPOSE_FILE_SEPARATOR;
        let joined = format!("base.yml{sep}dev.yml");
        let cli = Cli::try_parse_from([
            "berth",
            "-f",
            joined.as_str(),
            "--file",
            "local.yml",
            "-p",
            "My App",
            "config",
        ])
        .expect("valid arguments");
        let config = project_config(&cli).expect("config");
        assert_eq!(
            config.compose_files,
            vec![PathBuf::from("base.yml"), PathBuf::from("dev.yml"), PathBuf::from("local.yml")]
        );
        assert_eq!(config.project_name, "myapp");
    }

    #[test]
    fn load_project_layers_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let main = dir.path().join("docker-compose.yml");
        let over = dir.path().join("docker-compose.override.yml");
        std::fs::write(&main, "web:\n  image: ${BERTH_TEST_UNSET_IMAGE}\n").expect("write main");
        std::fs::write(&over, "web:\n  user: app\n").expect("write override");

        let main_arg = main.to_string_lossy().into_owned();
        let over_arg = over.to_string_lossy().into_owned();
        let cli = Cli::try_parse_from([
            "berth",
            "--no-interpolate",
            "-f",
            main_arg.as_str(),
            "-f",
            over_arg.as_str(),
            "config",
        ])
        .expect("valid arguments");
        let project = load_project(&cli).expect("load");
        let web = project.services().get("web").expect("web");
        assert_eq!(web.image.as_deref(), Some("${BERTH_TEST_UNSET_IMAGE}"));
        assert_eq!(web.user.as_deref(), Some("app"));
    }
}
