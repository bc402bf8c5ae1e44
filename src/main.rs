mod commands;
mod config;
mod context;
mod export;
mod output;
mod provider;
mod template;
mod traits;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use commands::{AllCommand, AllOptions, ExportCommand, ExportOptions, ListCommand};
use config::Config;
use context::Context;
use export::ResourceKind;

#[derive(Parser)]
#[command(name = "tfexport")]
#[command(about = "Export existing AWS resources as Terraform configuration and state", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to <config dir>/tfexport/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Only print errors to stderr
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every export command
#[derive(Args, Debug, Clone)]
struct CommonArgs {
    /// Emit Terraform state instead of configuration
    #[arg(long)]
    tfstate: bool,

    /// Existing state to merge the exported resources into (implies --tfstate)
    #[arg(long, value_name = "PATH")]
    merge: Option<PathBuf>,

    /// Write the merged state back to the --merge file
    #[arg(long, requires = "merge", conflicts_with = "output")]
    overwrite: bool,

    /// Write to this file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// AWS profile passed to the aws CLI
    #[arg(long, env = "AWS_PROFILE")]
    profile: Option<String>,

    /// AWS region passed to the aws CLI
    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct ExportArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Read the describe response from this file instead of calling AWS
    #[arg(long, value_name = "PATH")]
    from_file: Option<PathBuf>,

    /// Render with this Handlebars template instead of the built-in one
    #[arg(long, value_name = "PATH", conflicts_with_all = ["tfstate", "merge"])]
    template: Option<PathBuf>,
}

impl From<ExportArgs> for ExportOptions {
    fn from(args: ExportArgs) -> Self {
        ExportOptions {
            tfstate: args.common.tfstate,
            merge: args.common.merge,
            overwrite: args.common.overwrite,
            output: args.common.output,
            profile: args.common.profile,
            region: args.common.region,
            from_file: args.from_file,
            template: args.template,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Export EC2 instances (aws_instance)
    Ec2(ExportArgs),

    /// Export ElastiCache clusters (aws_elasticache_cluster)
    Ecc(ExportArgs),

    /// Export every supported resource type
    All {
        #[command(flatten)]
        common: CommonArgs,

        /// Directory with saved describe responses (ec2.json, ecc.json)
        #[arg(long, value_name = "DIR")]
        snapshot_dir: Option<PathBuf>,

        /// Number of resource types exported concurrently
        #[arg(long, value_name = "N")]
        parallel: Option<usize>,
    },

    /// List supported resource types
    List,
}

fn run(cli: Cli) -> Result<()> {
    let ctx = Context::new(cli.quiet);
    let config = Config::load(&*ctx.fs, cli.config.as_deref())?;

    match cli.command {
        Commands::Ec2(args) => {
            ExportCommand::execute(&ctx, &config, ResourceKind::Ec2Instance, &args.into())?;
        }
        Commands::Ecc(args) => {
            ExportCommand::execute(&ctx, &config, ResourceKind::CacheCluster, &args.into())?;
        }
        Commands::All {
            common,
            snapshot_dir,
            parallel,
        } => {
            let options = AllOptions {
                tfstate: common.tfstate,
                merge: common.merge,
                overwrite: common.overwrite,
                output: common.output,
                profile: common.profile,
                region: common.region,
                snapshot_dir,
                parallel,
            };
            AllCommand::execute(&ctx, &config, &options)?;
        }
        Commands::List => {
            ListCommand::execute(&ctx)?;
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        output::error(&format!("{:#}", err));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_overwrite_requires_merge() {
        let result = Cli::try_parse_from(["tfexport", "ec2", "--overwrite"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parses_export_args() {
        let cli = Cli::try_parse_from([
            "tfexport",
            "--quiet",
            "ecc",
            "--merge",
            "terraform.tfstate",
            "--overwrite",
            "--from-file",
            "ecc.json",
        ])
        .unwrap();

        assert!(cli.quiet);
        match cli.command {
            Commands::Ecc(args) => {
                let options: ExportOptions = args.into();
                assert!(options.wants_state());
                assert_eq!(options.from_file, Some(PathBuf::from("ecc.json")));
            }
            _ => panic!("expected ecc"),
        }
    }

    #[test]
    fn test_template_conflicts_with_tfstate() {
        let result = Cli::try_parse_from(["tfexport", "ec2", "--tfstate", "--template", "x.hbs"]);
        assert!(result.is_err());
    }
}
