use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "provisionkit")]
#[command(about = "Site template storage CLI", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to $PROVISIONKIT_CONFIG or config/provisionkit.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Work with artifacts in the configured storage backend
    #[command(subcommand)]
    Files(FilesCommand),

    /// Inspect or create the configured template artifact
    #[command(subcommand)]
    Template(TemplateCommand),

    /// Print the effective configuration as TOML
    Config,
}

#[derive(Subcommand, Debug)]
pub enum FilesCommand {
    /// List artifacts in a container
    List(ContainerArgs),
    /// Print an artifact to stdout
    Get(NamedArgs),
    /// Upload a local file
    Put(PutArgs),
    /// Delete an artifact
    Delete(NamedArgs),
}

#[derive(Subcommand, Debug)]
pub enum TemplateCommand {
    /// Summarize the stored template
    Show(ContainerArgs),
    /// Store an empty template
    Init(InitArgs),
}

#[derive(clap::Args, Debug)]
pub struct ContainerArgs {
    /// Container overriding the configured one
    #[arg(long)]
    pub container: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct NamedArgs {
    /// Artifact name
    pub name: String,

    #[command(flatten)]
    pub target: ContainerArgs,
}

#[derive(clap::Args, Debug)]
pub struct PutArgs {
    /// Local file to upload
    pub path: PathBuf,

    /// Artifact name (defaults to the local file name)
    #[arg(long)]
    pub name: Option<String>,

    #[command(flatten)]
    pub target: ContainerArgs,
}

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Replace an existing template
    #[arg(long)]
    pub force: bool,

    #[command(flatten)]
    pub target: ContainerArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_put_with_container() {
        let cli = Cli::parse_from([
            "provisionkit",
            "--config",
            "custom.toml",
            "files",
            "put",
            "template.json",
            "--container",
            "archive",
        ]);

        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        match cli.command {
            Commands::Files(FilesCommand::Put(args)) => {
                assert_eq!(args.path, PathBuf::from("template.json"));
                assert_eq!(args.target.container.as_deref(), Some("archive"));
                assert!(args.name.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_list_without_container() {
        let cli = Cli::parse_from(["provisionkit", "files", "list"]);
        assert!(matches!(
            cli.command,
            Commands::Files(FilesCommand::List(ContainerArgs { container: None }))
        ));
    }

    #[test]
    fn test_parse_template_init() {
        let cli = Cli::parse_from(["provisionkit", "template", "init", "--force"]);
        match cli.command {
            Commands::Template(TemplateCommand::Init(args)) => {
                assert!(args.force);
                assert!(args.target.container.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
