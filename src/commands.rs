use std::error::Error;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::cli::{ContainerArgs, FilesCommand, TemplateCommand};
use provisionkit::config::Config;
use provisionkit::connectors::{FileConnector, FileDescriptor};
use provisionkit::conversion::{load_template, save_template};
use provisionkit::model::Template;

pub type CommandResult = Result<(), Box<dyn Error + Send + Sync>>;

/// Run one `files` subcommand against the configured connector
pub async fn run_files(connector: &dyn FileConnector, command: FilesCommand) -> CommandResult {
    match command {
        FilesCommand::List(ContainerArgs { container }) => {
            for name in connector.get_files(container.as_deref()).await? {
                println!("{name}");
            }
        }
        FilesCommand::Get(args) => {
            let content = connector
                .get_file_bytes(&args.name, args.target.container.as_deref())
                .await?
                .ok_or_else(|| format!("'{}' not found in {}", args.name, connector.describe()))?;

            let mut stdout = tokio::io::stdout();
            stdout.write_all(&content).await?;
            stdout.flush().await?;
        }
        FilesCommand::Put(args) => {
            let name = match args.name {
                Some(name) => name,
                None => file_name(&args.path)?,
            };
            let mut file = tokio::fs::File::open(&args.path).await?;
            connector
                .save_file_stream(&name, args.target.container.as_deref(), &mut file)
                .await?;
            info!(name = %name, backend = %connector.describe(), "Uploaded");
        }
        FilesCommand::Delete(args) => {
            connector
                .delete_file(&args.name, args.target.container.as_deref())
                .await?;
            info!(name = %args.name, backend = %connector.describe(), "Deleted");
        }
    }
    Ok(())
}

/// Run one `template` subcommand against the configured template artifact
pub async fn run_template(
    connector: &dyn FileConnector,
    descriptor: FileDescriptor,
    command: TemplateCommand,
) -> CommandResult {
    match command {
        TemplateCommand::Show(ContainerArgs { container }) => {
            let descriptor = retarget(descriptor, container);
            let template = load_template(connector, &descriptor)
                .await?
                .ok_or_else(|| format!("'{descriptor}' not found in {}", connector.describe()))?;
            print!("{}", summary(&template));
        }
        TemplateCommand::Init(args) => {
            let descriptor = retarget(descriptor, args.target.container);
            let existing = connector
                .get_file_stream(&descriptor.name, descriptor.container())
                .await?;
            if existing.is_some() && !args.force {
                let message = format!("'{descriptor}' already exists, pass --force to replace it");
                return Err(message.into());
            }

            let template = Template::new();
            save_template(connector, &descriptor, &template).await?;
            info!(
                file = %descriptor,
                id = %template.id,
                backend = %connector.describe(),
                "Created template"
            );
        }
    }
    Ok(())
}

pub fn show_config(config: &Config) -> CommandResult {
    print!("{}", toml::to_string_pretty(&config.redacted())?);
    Ok(())
}

fn file_name(path: &Path) -> Result<String, Box<dyn Error + Send + Sync>> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| format!("cannot derive an artifact name from {}", path.display()).into())
}

fn retarget(descriptor: FileDescriptor, container: Option<String>) -> FileDescriptor {
    match container {
        Some(container) => FileDescriptor::in_container(descriptor.name, container),
        None => descriptor,
    }
}

fn summary(template: &Template) -> String {
    let generated_at = template
        .generated_at
        .map(|at| at.to_rfc3339())
        .unwrap_or_else(|| "-".to_string());
    let look = template
        .composed_look
        .as_ref()
        .map_or("-", |look| look.name.as_str());

    format!(
        "id: {}\nversion: {}\ngenerated_at: {generated_at}\nlists: {}\ncustom_actions: {}\n\
         features: {}\ncomposed_look: {look}\nfiles: {}\nproviders: {}\n",
        template.id,
        template.version,
        template.lists.len(),
        template.custom_actions.len(),
        template.features.site_features.len() + template.features.web_features.len(),
        template.files.len(),
        template.providers.len(),
    )
}
