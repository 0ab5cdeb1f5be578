mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "buildstack")]
#[command(about = "Deploy CodeBuild projects as CloudFormation stacks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the template and deploy the stack
    Deploy {
        /// Stack name (default: <project>[-<env>]-cb)
        #[arg(long)]
        stack_name: Option<String>,
        /// CodeBuild project name (default: project directory name)
        #[arg(long)]
        project_name: Option<String>,
        /// Wait for the stack to finish (default)
        #[arg(long, overrides_with = "no_wait")]
        wait: bool,
        /// Return as soon as the stack has been submitted
        #[arg(long, overrides_with = "wait")]
        no_wait: bool,
        /// Only write the template, do not deploy
        #[arg(long)]
        noop: bool,
    },
    /// Show the output of a CodeBuild build
    Logs {
        /// CodeBuild project name (default: project directory name)
        #[arg(long)]
        project_name: Option<String>,
        /// Build id (default: latest build of the project)
        #[arg(long)]
        build_id: Option<String>,
        /// Keep polling until the build finishes
        #[arg(short, long)]
        follow: bool,
    },
    /// Show version information
    Version,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout is reserved for operator output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    if matches!(cli.command, Commands::Version) {
        println!("buildstack {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let project_root = buildstack_config::find_project_root()?;
    let settings = match buildstack_config::Settings::load(&project_root) {
        Ok(settings) => settings,
        Err(e) => {
            commands::print_error(&e);
            std::process::exit(1);
        }
    };
    tracing::debug!(project_root = %project_root.display(), "Loaded settings");

    match cli.command {
        Commands::Deploy {
            stack_name,
            project_name,
            wait: _,
            no_wait,
            noop,
        } => {
            let options = buildstack_core::DeployOptions {
                stack_name,
                project_name,
                wait: !no_wait,
                noop,
            };
            let outcome = commands::deploy::handle(&project_root, settings, options).await?;
            if !outcome.is_success() {
                std::process::exit(outcome.exit_code());
            }
        }
        Commands::Logs {
            project_name,
            build_id,
            follow,
        } => {
            commands::logs::handle(&project_root, settings, project_name, build_id, follow)
                .await?;
        }
        Commands::Version => {
            unreachable!("Version is handled before settings are loaded");
        }
    }

    Ok(())
}
