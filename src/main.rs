use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use forge_mirror::config::{parse_list, FilterConfig};
use forge_mirror::engine::{self, SpinnerReporter};
use forge_mirror::source::forge::ForgeSource;
use forge_mirror::source::traits::DerivativeSource;

#[derive(Parser)]
#[command(name = "forge-mirror")]
#[command(about = "Mirror the derivatives of a Forge translation job into a local directory")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the translation manifest of a model.
    Manifest {
        /// Base64-encoded urn of the translated model.
        urn: String,
        /// Print only the manifest status.
        #[arg(short, long)]
        short: bool,
    },
    /// Download every derivative of a translated model.
    Save {
        /// Base64-encoded urn of the translated model.
        urn: String,
        /// Directory the derivative tree is mirrored into.
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
        /// Comma-separated roles to exclude from the top-level walk.
        #[arg(short = 'e', long)]
        exclude_roles: Option<String>,
        /// Comma-separated viewable GUIDs to download exclusively.
        #[arg(short = 't', long)]
        targets: Option<String>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,reqwest=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

fn source_from_env() -> Result<ForgeSource> {
    let client_id = std::env::var("FORGE_CLIENT_ID")
        .context("provide FORGE_CLIENT_ID as an environment variable")?;
    let client_secret = std::env::var("FORGE_CLIENT_SECRET")
        .context("provide FORGE_CLIENT_SECRET as an environment variable")?;
    Ok(ForgeSource::new(client_id, client_secret))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let source = Arc::new(source_from_env()?);

    match cli.command {
        Commands::Manifest { urn, short } => {
            let manifest = source.manifest(&urn).await?;
            if short {
                println!("{}", manifest.status);
            } else {
                println!("{}", serde_json::to_string_pretty(&manifest)?);
            }
        }
        Commands::Save {
            urn,
            output_dir,
            exclude_roles,
            targets,
        } => {
            let manifest = source.manifest(&urn).await?;
            if !manifest.is_complete() {
                bail!(
                    "translation job is not complete (status: {}, progress: {})",
                    manifest.status,
                    manifest.progress.as_deref().unwrap_or("unknown")
                );
            }

            let mut filter = FilterConfig::default();
            if let Some(roles) = exclude_roles {
                filter.excluded_roles = parse_list(&roles);
            }
            if let Some(targets) = targets {
                filter.targets = Some(parse_list(&targets));
            }

            let reporter = Arc::new(SpinnerReporter::new());
            let summary = engine::run(
                source.clone() as Arc<dyn DerivativeSource>,
                &urn,
                &manifest.derivatives,
                &output_dir,
                &filter,
                reporter.clone(),
            )
            .await;

            match summary.failure_reason() {
                Some(reason) => {
                    reporter.finish_failure(&reason);
                    bail!("{}", reason);
                }
                None => reporter.finish_success(),
            }
        }
    }

    Ok(())
}
