//! Anvil build CLI
//!
//! Thin orchestrator-facing shim over the build core: port negotiation for
//! dev-server startup and service-worker artifact staging. All logic lives
//! in the library.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

use anvil_build::{
    build_worker_artifact, AllocatorPolicy, BuildConfig, BuildTarget, ClaimedPorts, Environment,
    PortAllocator,
};

#[derive(Parser)]
#[command(name = "anvil")]
#[command(version = "0.12.3")]
#[command(about = "Anvil build orchestration core", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Negotiate a free dev-server port
    Port {
        /// Ports already claimed by sibling build processes
        #[arg(long = "used", value_delimiter = ',')]
        used: Vec<u16>,
        /// Also probe the range above the highest claimed port
        #[arg(long)]
        include_trailing: bool,
    },
    /// Stage a service-worker artifact from a build configuration file
    Sw {
        /// Path to the .anvilbuild configuration file
        config: PathBuf,
        /// Build environment (dev or prod)
        #[arg(long, default_value = "prod")]
        env: String,
        /// Locale identifier for this build
        #[arg(long)]
        locale: Option<String>,
        /// Directory for staged worker templates
        #[arg(long)]
        tmp_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Port {
            used,
            include_trailing,
        } => {
            let allocator = PortAllocator::from_env().policy(AllocatorPolicy {
                include_trailing_range: include_trailing,
            });
            match allocator.allocate(ClaimedPorts::from(used)).await {
                Some(port) => println!("{port}"),
                None => bail!("no free port in any candidate range"),
            }
        }
        Commands::Sw {
            config,
            env,
            locale,
            tmp_dir,
        } => {
            let environment: Environment = env.parse()?;
            let mut build_config = BuildConfig::load(&config)?;
            let target = BuildTarget::from_config(environment, locale, &build_config);
            let tmp_dir = tmp_dir.unwrap_or_else(|| std::env::temp_dir().join("anvil-sw"));

            match build_worker_artifact(&mut build_config, &target, &tmp_dir)? {
                Some(artifact) => {
                    println!("✓ staged worker template: {}", artifact.sw_src.display());
                    println!("  └─ destination: {}", artifact.sw_dest);
                }
                None => println!("service worker disabled in configuration"),
            }
        }
    }

    Ok(())
}
