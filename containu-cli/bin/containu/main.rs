#[path = "mod.rs"]
mod containu;

use std::sync::Arc;

use clap::{CommandFactory, Parser};
use containu::handlers;
use containu_cli::{
    AnsiStyles, ContainuArgs, ContainuCliResult, ContainuSubcommand, NetworkSubcommand,
    VolumeSubcommand,
};
use containu_core::{
    catalog::DemoCatalog,
    config::LifecycleConfig,
    management::{BatchAction, LifecycleService},
};
use tracing_subscriber::EnvFilter;

//--------------------------------------------------------------------------------------------------
// Functions: main
//--------------------------------------------------------------------------------------------------

#[tokio::main]
async fn main() -> ContainuCliResult<()> {
    // Load a .env file before anything reads the environment
    dotenvy::dotenv().ok();

    // Parse command line arguments
    let args = ContainuArgs::parse();

    handlers::log_level(&args);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Print version if requested
    if args.version {
        println!("{}", format!("v{}", env!("CARGO_PKG_VERSION")).literal());
        return Ok(());
    }

    let Some(subcommand) = args.subcommand else {
        ContainuArgs::command().print_help()?;
        return Ok(());
    };

    let mut config = LifecycleConfig::from_env()?;
    if let Some(latency_ms) = args.latency_ms {
        config = config.with_latency(std::time::Duration::from_millis(latency_ms));
    }

    let service = LifecycleService::seeded(Arc::new(DemoCatalog), config)?;
    let json = args.json;

    match subcommand {
        ContainuSubcommand::Ps { query, sort } => {
            handlers::ps_subcommand(&service, query, sort, json)?;
        }
        ContainuSubcommand::Inspect { name } => {
            handlers::inspect_subcommand(&service, &name)?;
        }
        ContainuSubcommand::Create {
            name,
            image,
            ports,
            networks,
            volumes,
            start,
        } => {
            handlers::create_subcommand(&service, name, image, ports, networks, volumes, start, json)
                .await?;
        }
        ContainuSubcommand::Start { names } => {
            handlers::batch_subcommand(&service, names, BatchAction::Start, json).await?;
        }
        ContainuSubcommand::Stop { names } => {
            handlers::batch_subcommand(&service, names, BatchAction::Stop, json).await?;
        }
        ContainuSubcommand::Restart { names } => {
            handlers::batch_subcommand(&service, names, BatchAction::Restart, json).await?;
        }
        ContainuSubcommand::Rm { names } => {
            handlers::batch_subcommand(&service, names, BatchAction::Delete, json).await?;
        }
        ContainuSubcommand::Logs {
            name,
            tail,
            search,
            levels,
            follow,
        } => {
            handlers::logs_subcommand(&service, &name, tail, search, levels, follow, json).await?;
        }
        ContainuSubcommand::Stats { name, follow } => {
            handlers::stats_subcommand(&service, &name, follow, json).await?;
        }
        ContainuSubcommand::Exec { name, command } => {
            handlers::exec_subcommand(&service, &name, command).await?;
        }
        ContainuSubcommand::Images { query } => {
            handlers::images_subcommand(&service, query, json)?;
        }
        ContainuSubcommand::Pull { reference } => {
            handlers::pull_subcommand(&service, &reference, json).await?;
        }
        ContainuSubcommand::Rmi { reference } => {
            handlers::rmi_subcommand(&service, &reference).await?;
        }
        ContainuSubcommand::Network { subcommand } => match subcommand {
            NetworkSubcommand::Ls => handlers::network_ls_subcommand(&service, json)?,
            NetworkSubcommand::Create { name, driver } => {
                handlers::network_create_subcommand(&service, &name, &driver, json).await?;
            }
            NetworkSubcommand::Rm { name } => {
                handlers::network_rm_subcommand(&service, &name).await?;
            }
        },
        ContainuSubcommand::Volume { subcommand } => match subcommand {
            VolumeSubcommand::Ls => handlers::volume_ls_subcommand(&service, json)?,
            VolumeSubcommand::Create { name, driver } => {
                handlers::volume_create_subcommand(&service, &name, &driver, json).await?;
            }
            VolumeSubcommand::Rm { name } => {
                handlers::volume_rm_subcommand(&service, &name).await?;
            }
        },
    }

    Ok(())
}
