//! `dimcreator`: build DIM packages and import product archives.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use dimcreator_lib::commands::extract_cmds::{start_extraction, ExtractArgs};
use dimcreator_lib::commands::package_cmds::{start_packaging, PackageArgs};
use dimcreator_lib::commands::workspace_cmds::{get_config, reset_build, validate_content};
use dimcreator_lib::commands::AppState;
use dimcreator_lib::services::core::job_runner::{JobEvent, JobHandle, JobOutcome};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

/// How long a cancelled job may take to acknowledge Ctrl-C.
const CANCEL_GRACE: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(name = "dimcreator")]
#[command(author, version, about = "Create DIM packages and extract product archives", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (defaults to ~/Documents/DIMCreator/Config/settings.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the recognized content of an archive into the content directory
    Extract {
        /// Archive to import (.zip, .rar, .7z)
        archive: PathBuf,

        /// Content directory (defaults to <build_dir>/Content)
        #[arg(long)]
        content_dir: Option<PathBuf>,

        /// Copy embedded template archives to the template directory
        #[arg(long)]
        copy_templates: bool,

        /// Where template archives are copied
        #[arg(long)]
        template_dir: Option<PathBuf>,
    },

    /// Build a DIM package from the content directory
    Package {
        /// Store name, used for the cover image and prefix lookup
        #[arg(long)]
        store: String,

        /// Product name
        #[arg(long)]
        name: String,

        /// Package prefix (defaults to the store's prefix)
        #[arg(long)]
        prefix: Option<String>,

        /// Product SKU
        #[arg(long)]
        sku: String,

        /// Part number (1-99)
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=99))]
        part: u8,

        /// Product tags (repeatable or comma separated)
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,

        /// Cover image
        #[arg(long)]
        image: Option<PathBuf>,

        /// Keep the existing Runtime/Support contents
        #[arg(long)]
        no_clean_support: bool,

        /// Package GUID (generated when omitted)
        #[arg(long)]
        guid: Option<String>,

        /// Destination folder (defaults to the current directory)
        #[arg(long)]
        dest: Option<PathBuf>,

        /// Always use the built-in zip writer
        #[arg(long)]
        builtin: bool,

        /// Content directory (defaults to <build_dir>/Content)
        #[arg(long)]
        content_dir: Option<PathBuf>,

        /// Package even without recognized content folders
        #[arg(long)]
        force: bool,
    },

    /// Clear the build directory and recreate an empty Content folder
    Reset,

    /// Check that the content directory holds a recognized folder
    Validate {
        #[arg(long)]
        content_dir: Option<PathBuf>,
    },

    /// Print the effective configuration as JSON
    Config,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = match cli.config {
        Some(path) => path,
        None => default_config_path().context("Could not determine the home directory")?,
    };
    let state = AppState::new(config_path);

    match cli.command {
        Commands::Extract {
            archive,
            content_dir,
            copy_templates,
            template_dir,
        } => {
            let handle = start_extraction(
                &state,
                ExtractArgs {
                    archive,
                    content_dir,
                    copy_templates: copy_templates.then_some(true),
                    template_dir,
                },
            )?;
            let outcome = follow(handle).await?;
            if let JobOutcome::Completed {
                files_copied,
                templates_copied,
                ..
            } = &outcome
            {
                println!("{files_copied} file(s) copied");
                for template in templates_copied {
                    println!("Template archive copied: {template}");
                }
            }
            finish(outcome)
        }
        Commands::Package {
            store,
            name,
            prefix,
            sku,
            part,
            tags,
            image,
            no_clean_support,
            guid,
            dest,
            builtin,
            content_dir,
            force,
        } => {
            let handle = start_packaging(
                &state,
                PackageArgs {
                    store,
                    product_name: name,
                    prefix,
                    sku,
                    part,
                    tags: tags
                        .into_iter()
                        .map(|t| t.trim().to_string())
                        .filter(|t| !t.is_empty())
                        .collect(),
                    image,
                    clean_support: !no_clean_support,
                    guid,
                    destination: dest,
                    content_dir,
                    force_builtin: builtin,
                    force,
                },
            )?;
            let outcome = follow(handle).await?;
            if let JobOutcome::Completed {
                output: Some(path), ..
            } = &outcome
            {
                println!("Package written to {}", path.display());
            }
            finish(outcome)
        }
        Commands::Reset => {
            let removed = reset_build(&state)?;
            println!("Build directory cleared ({removed} entries removed)");
            Ok(())
        }
        Commands::Validate { content_dir } => {
            let (content_dir, valid) = validate_content(&state, content_dir);
            if !valid {
                bail!(
                    "No recognized content folders found in {}",
                    content_dir.display()
                );
            }
            println!("{} looks valid", content_dir.display());
            Ok(())
        }
        Commands::Config => {
            log::info!("Settings file: {}", state.config.path().display());
            println!("{}", serde_json::to_string_pretty(&get_config(&state))?);
            Ok(())
        }
    }
}

/// Render job events on a progress bar until the job finishes or Ctrl-C.
async fn follow(mut handle: JobHandle) -> anyhow::Result<JobOutcome> {
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% {msg}")
            .context("invalid progress template")?
            .progress_chars("#>-"),
    );

    loop {
        tokio::select! {
            event = handle.next_event() => match event {
                Some(JobEvent::Started { kind }) => bar.set_message(format!("{kind} started")),
                Some(JobEvent::Progress { percent, stage }) => {
                    bar.set_position(u64::from(percent));
                    bar.set_message(stage);
                }
                Some(JobEvent::Finished(outcome)) => {
                    bar.finish_with_message(outcome.message().to_string());
                    return Ok(outcome);
                }
                None => bail!("job ended without reporting an outcome"),
            },
            _ = tokio::signal::ctrl_c() => {
                bar.set_message("Cancelling...");
                return match handle.cancel_and_wait(CANCEL_GRACE).await {
                    Some(outcome) => {
                        bar.abandon_with_message(outcome.message().to_string());
                        Ok(outcome)
                    }
                    None => {
                        bar.abandon_with_message("Abandoned");
                        bail!("job did not stop within {:?}", CANCEL_GRACE)
                    }
                };
            }
        }
    }
}

fn finish(outcome: JobOutcome) -> anyhow::Result<()> {
    if outcome.success() {
        Ok(())
    } else {
        bail!("{}", outcome.message())
    }
}

fn default_config_path() -> Option<PathBuf> {
    home::home_dir().map(|home| {
        home.join("Documents")
            .join("DIMCreator")
            .join("Config")
            .join("settings.json")
    })
}
