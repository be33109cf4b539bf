mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "cnab-arm",
    about = "Generate ARM templates that run CNAB bundles on Azure Container Instances"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an ARM template for a bundle
    Generate(GenerateArgs),
    /// Compile a bundle without writing a template and print a summary
    Check {
        /// Bundle file (default: bundle.json)
        #[arg(long, short = 'b')]
        bundle: Option<PathBuf>,
        /// Collapse infrastructure settings into template variables
        #[arg(long, short = 's')]
        simplify: bool,
    },
    /// Write a cnab-arm.toml with the default settings
    Init,
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// Bundle file (default: bundle.json)
    #[arg(long, short = 'b')]
    bundle: Option<PathBuf>,
    /// Output template file (default: azuredeploy.json)
    #[arg(long = "file", short = 'f')]
    output: Option<PathBuf>,
    /// Overwrite the output file if it already exists
    #[arg(long, short = 'o')]
    overwrite: bool,
    /// Indent the JSON output with tabs
    #[arg(long, short = 'i')]
    indent: bool,
    /// Collapse infrastructure settings into template variables
    #[arg(long, short = 's')]
    simplify: bool,
    /// Driver image tag stamped into the worker container
    #[arg(long)]
    driver_version: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => {
            commands::generate(commands::GenerateOptions {
                bundle: args.bundle,
                output: args.output,
                overwrite: args.overwrite,
                indent: args.indent,
                simplify: args.simplify,
                driver_version: args.driver_version,
            })
            .await?
        }
        Commands::Check { bundle, simplify } => commands::check(bundle, simplify).await?,
        Commands::Init => commands::init_config().await?,
    }

    Ok(())
}
