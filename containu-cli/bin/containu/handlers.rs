use std::collections::HashSet;

use containu_cli::{
    level_style, parse_image_reference, status_style, AnsiStyles, ContainuArgs, ContainuCliError,
    ContainuCliResult,
};
use containu_core::{
    management::{BatchAction, BatchCoordinator, LifecycleService, StreamEmitter},
    models::{ContainerOptions, LogEntry, LogLevel, MetricSample},
    store::StoreSnapshot,
    view::{all_levels, filter_images, filter_logs, visible, SortOption},
};
use containu_utils::{CHECKMARK, CROSSMARK};
use futures::StreamExt;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

const SHORT_ID_LEN: usize = 12;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

#[derive(Serialize)]
struct BatchOutput {
    action: BatchAction,
    summary: String,
    succeeded: Vec<String>,
    failed: Vec<FailureOutput>,
}

#[derive(Clone, Serialize)]
struct FailureOutput {
    name: String,
    error: String,
}

//--------------------------------------------------------------------------------------------------
// Functions: Handlers
//--------------------------------------------------------------------------------------------------

pub fn log_level(args: &ContainuArgs) {
    let level = if args.trace {
        Some("trace")
    } else if args.debug {
        Some("debug")
    } else if args.info {
        Some("info")
    } else if args.warn {
        Some("warn")
    } else if args.error {
        Some("error")
    } else {
        None
    };

    // Set RUST_LOG environment variable only if a level is specified
    if let Some(level) = level {
        std::env::set_var(
            "RUST_LOG",
            format!(
                "containu={},containu_core={},containu_cli={}",
                level, level, level
            ),
        );
    }
}

pub fn ps_subcommand(
    service: &LifecycleService,
    query: Option<String>,
    sort: SortOption,
    json: bool,
) -> ContainuCliResult<()> {
    let snapshot = service.snapshot()?;
    let containers = visible(snapshot.get_containers(), query.as_deref().unwrap_or(""), sort);

    if json {
        return print_json(&containers);
    }

    println!(
        "{}",
        format!(
            "{:<14} {:<20} {:<22} {:<10} {:<10} {:>6} {:<10} {}",
            "ID", "NAME", "IMAGE", "STATUS", "UPTIME", "CPU", "MEMORY", "PORTS"
        )
        .header()
    );

    for container in containers {
        println!(
            "{:<14} {:<20} {:<22} {:<10} {:<10} {:>5.1}% {:<10} {}",
            short_id(container.id),
            container.name,
            container.image,
            status_style(container.status),
            container.uptime,
            container.cpu_usage,
            container.memory_usage,
            container.ports.join(", ")
        );
    }

    Ok(())
}

pub fn inspect_subcommand(service: &LifecycleService, name: &str) -> ContainuCliResult<()> {
    let snapshot = service.snapshot()?;
    let id = resolve_container(&snapshot, name)?;
    let container = service.get_store().container(id)?;

    print_json(&container)
}

#[allow(clippy::too_many_arguments)]
pub async fn create_subcommand(
    service: &LifecycleService,
    name: String,
    image: String,
    ports: Vec<String>,
    networks: Vec<String>,
    volumes: Vec<String>,
    start: bool,
    json: bool,
) -> ContainuCliResult<()> {
    let options = ContainerOptions::builder()
        .name(name)
        .image(image)
        .ports(ports)
        .networks(networks)
        .volumes(volumes)
        .build();

    let container = service.create(options).await?;
    if start {
        service.start(container.id).await?;
    }

    if json {
        return print_json(&service.get_store().container(container.id)?);
    }

    println!(
        "{} Created container {} ({})",
        &*CHECKMARK,
        console::style(&container.name).yellow(),
        short_id(container.id)
    );

    if start {
        println!(
            "{} Started container {}",
            &*CHECKMARK,
            console::style(&container.name).yellow()
        );
    }

    Ok(())
}

pub async fn batch_subcommand(
    service: &LifecycleService,
    names: Vec<String>,
    action: BatchAction,
    json: bool,
) -> ContainuCliResult<()> {
    let snapshot = service.snapshot()?;
    let mut ids = Vec::with_capacity(names.len());
    let mut unknown = Vec::new();

    for name in names {
        match resolve_container(&snapshot, &name) {
            Ok(id) => ids.push(id),
            Err(e) => {
                tracing::debug!("skipping {}: {}", name, e);
                unknown.push(FailureOutput {
                    error: e.to_string(),
                    name,
                });
            }
        }
    }

    let report = BatchCoordinator::new(service.clone())
        .run(ids.iter().copied(), action)
        .await;

    let mut summary = report.to_string();
    for failure in &unknown {
        summary.push_str(&format!("; {} failed: {}", failure.name, failure.error));
    }

    let mut seen = HashSet::new();
    let succeeded: Vec<String> = ids
        .iter()
        .filter(|id| seen.insert(**id))
        .filter(|id| matches!(report.outcome(**id), Some(Ok(()))))
        .map(|id| report.name_of(*id))
        .collect();

    let mut failed: Vec<FailureOutput> = report
        .failures()
        .into_iter()
        .map(|(id, error)| FailureOutput {
            name: report.name_of(id),
            error: error.to_string(),
        })
        .collect();
    failed.extend(unknown);

    if json {
        print_json(&BatchOutput {
            action,
            summary: summary.clone(),
            succeeded,
            failed: failed.clone(),
        })?;
    } else {
        for name in &succeeded {
            println!(
                "{} {} {}",
                &*CHECKMARK,
                capitalize(action.past_tense()),
                console::style(name).yellow()
            );
        }

        for failure in &failed {
            println!(
                "{} {}: {}",
                &*CROSSMARK,
                console::style(&failure.name).yellow(),
                failure.error
            );
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        Err(ContainuCliError::BatchFailed(summary))
    }
}

pub async fn logs_subcommand(
    service: &LifecycleService,
    name: &str,
    tail: usize,
    search: Option<String>,
    levels: Vec<LogLevel>,
    follow: bool,
    json: bool,
) -> ContainuCliResult<()> {
    let snapshot = service.snapshot()?;
    let id = resolve_container(&snapshot, name)?;

    let search = search.unwrap_or_default();
    let levels: HashSet<LogLevel> = if levels.is_empty() {
        all_levels()
    } else {
        levels.into_iter().collect()
    };

    let entries = service.fetch_logs(id, tail).await?;
    for entry in filter_logs(&entries, &search, &levels) {
        print_log_entry(&entry, json)?;
    }

    if !follow {
        return Ok(());
    }

    let token = cancel_on_interrupt();
    let emitter = StreamEmitter::new(service.clone());
    let mut stream = std::pin::pin!(emitter.stream_logs(id, token)?);

    while let Some(entry) = stream.next().await {
        if !filter_logs(std::slice::from_ref(&entry), &search, &levels).is_empty() {
            print_log_entry(&entry, json)?;
        }
    }

    Ok(())
}

pub async fn stats_subcommand(
    service: &LifecycleService,
    name: &str,
    follow: bool,
    json: bool,
) -> ContainuCliResult<()> {
    let snapshot = service.snapshot()?;
    let id = resolve_container(&snapshot, name)?;

    if !follow {
        let sample = service.stats(id).await?;
        return print_sample(&sample, json);
    }

    let token = cancel_on_interrupt();
    let emitter = StreamEmitter::new(service.clone());
    let mut stream = std::pin::pin!(emitter.stream_stats(id, token)?);

    while let Some(sample) = stream.next().await {
        print_sample(&sample, json)?;
    }

    Ok(())
}

pub async fn exec_subcommand(
    service: &LifecycleService,
    name: &str,
    command: Vec<String>,
) -> ContainuCliResult<()> {
    let snapshot = service.snapshot()?;
    let id = resolve_container(&snapshot, name)?;

    let output = service.exec(id, &command.join(" ")).await?;
    println!("{}", output);

    Ok(())
}

pub fn images_subcommand(
    service: &LifecycleService,
    query: Option<String>,
    json: bool,
) -> ContainuCliResult<()> {
    let images = filter_images(&service.get_store().images()?, query.as_deref().unwrap_or(""));

    if json {
        return print_json(&images);
    }

    println!(
        "{}",
        format!(
            "{:<20} {:<10} {:<14} {:<10} {}",
            "REPOSITORY", "TAG", "ID", "SIZE", "CREATED"
        )
        .header()
    );

    for image in images {
        println!(
            "{:<20} {:<10} {:<14} {:<10} {}",
            image.repository,
            image.tag,
            short_id(image.id),
            image.size,
            image.created
        );
    }

    Ok(())
}

pub async fn pull_subcommand(
    service: &LifecycleService,
    reference: &str,
    json: bool,
) -> ContainuCliResult<()> {
    let (repository, tag) = parse_image_reference(reference);
    let image = service.pull(&repository, &tag).await?;

    if json {
        return print_json(&image);
    }

    println!(
        "{} Pulled {} ({})",
        &*CHECKMARK,
        console::style(image.reference()).yellow(),
        image.size
    );

    Ok(())
}

pub async fn rmi_subcommand(service: &LifecycleService, reference: &str) -> ContainuCliResult<()> {
    let snapshot = service.snapshot()?;
    let id = resolve_image(&snapshot, reference)?;

    if let Some(image) = service.remove_image(id).await? {
        println!(
            "{} Removed image {}",
            &*CHECKMARK,
            console::style(image.reference()).yellow()
        );
    }

    Ok(())
}

pub fn network_ls_subcommand(service: &LifecycleService, json: bool) -> ContainuCliResult<()> {
    let networks = service.get_store().networks()?;

    if json {
        return print_json(&networks);
    }

    println!(
        "{}",
        format!(
            "{:<14} {:<14} {:<10} {:<16} {:<8} {}",
            "ID", "NAME", "DRIVER", "SUBNET", "SCOPE", "CONTAINERS"
        )
        .header()
    );

    for network in networks {
        println!(
            "{:<14} {:<14} {:<10} {:<16} {:<8} {}",
            short_id(network.id),
            network.name,
            network.driver,
            network.subnet,
            network.scope,
            network.containers.len()
        );
    }

    Ok(())
}

pub async fn network_create_subcommand(
    service: &LifecycleService,
    name: &str,
    driver: &str,
    json: bool,
) -> ContainuCliResult<()> {
    let network = service.create_network(name, driver).await?;

    if json {
        return print_json(&network);
    }

    println!(
        "{} Created network {} ({})",
        &*CHECKMARK,
        console::style(&network.name).yellow(),
        network.subnet
    );

    Ok(())
}

pub async fn network_rm_subcommand(service: &LifecycleService, name: &str) -> ContainuCliResult<()> {
    let snapshot = service.snapshot()?;
    let id = snapshot
        .network_by_name(name)
        .map(|n| n.id)
        .or_else(|| parse_id(name).filter(|id| snapshot.network(*id).is_some()))
        .ok_or_else(|| unknown("network", name))?;

    if let Some(network) = service.remove_network(id).await? {
        println!(
            "{} Removed network {}",
            &*CHECKMARK,
            console::style(&network.name).yellow()
        );
    }

    Ok(())
}

pub fn volume_ls_subcommand(service: &LifecycleService, json: bool) -> ContainuCliResult<()> {
    let volumes = service.get_store().volumes()?;

    if json {
        return print_json(&volumes);
    }

    println!(
        "{}",
        format!(
            "{:<14} {:<20} {:<8} {:<10} {}",
            "ID", "NAME", "DRIVER", "SIZE", "MOUNT POINT"
        )
        .header()
    );

    for volume in volumes {
        println!(
            "{:<14} {:<20} {:<8} {:<10} {}",
            short_id(volume.id),
            volume.name,
            volume.driver,
            volume.size,
            volume.mount_point
        );
    }

    Ok(())
}

pub async fn volume_create_subcommand(
    service: &LifecycleService,
    name: &str,
    driver: &str,
    json: bool,
) -> ContainuCliResult<()> {
    let volume = service.create_volume(name, driver).await?;

    if json {
        return print_json(&volume);
    }

    println!(
        "{} Created volume {} at {}",
        &*CHECKMARK,
        console::style(&volume.name).yellow(),
        volume.mount_point
    );

    Ok(())
}

pub async fn volume_rm_subcommand(service: &LifecycleService, name: &str) -> ContainuCliResult<()> {
    let snapshot = service.snapshot()?;
    let id = snapshot
        .volume_by_name(name)
        .map(|v| v.id)
        .or_else(|| parse_id(name).filter(|id| snapshot.volume(*id).is_some()))
        .ok_or_else(|| unknown("volume", name))?;

    if let Some(volume) = service.remove_volume(id).await? {
        println!(
            "{} Removed volume {}",
            &*CHECKMARK,
            console::style(&volume.name).yellow()
        );
    }

    Ok(())
}

//--------------------------------------------------------------------------------------------------
// Functions: Helpers
//--------------------------------------------------------------------------------------------------

fn resolve_container(snapshot: &StoreSnapshot, name: &str) -> ContainuCliResult<Uuid> {
    if let Some(container) = snapshot.container_by_name(name) {
        return Ok(container.id);
    }

    if let Some(id) = parse_id(name).filter(|id| snapshot.container(*id).is_some()) {
        return Ok(id);
    }

    // Short ids as printed by `ps`
    let matches: Vec<Uuid> = snapshot
        .get_containers()
        .iter()
        .map(|c| c.id)
        .filter(|id| name.len() >= 4 && id.simple().to_string().starts_with(name))
        .collect();

    match matches.as_slice() {
        [id] => Ok(*id),
        _ => Err(unknown("container", name)),
    }
}

fn resolve_image(snapshot: &StoreSnapshot, reference: &str) -> ContainuCliResult<Uuid> {
    let (repository, tag) = parse_image_reference(reference);

    snapshot
        .image_by_reference(&format!("{}:{}", repository, tag))
        .map(|i| i.id)
        .or_else(|| parse_id(reference).filter(|id| snapshot.image(*id).is_some()))
        .ok_or_else(|| unknown("image", reference))
}

fn parse_id(value: &str) -> Option<Uuid> {
    Uuid::parse_str(value).ok()
}

fn unknown(kind: &'static str, name: &str) -> ContainuCliError {
    ContainuCliError::UnknownResource {
        kind,
        name: name.to_string(),
    }
}

fn short_id(id: Uuid) -> String {
    id.simple().to_string()[..SHORT_ID_LEN].to_string()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn print_json<T: Serialize>(value: &T) -> ContainuCliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_log_entry(entry: &LogEntry, json: bool) -> ContainuCliResult<()> {
    if json {
        println!("{}", serde_json::to_string(entry)?);
    } else {
        println!(
            "{} {:<5} {}",
            console::style(entry.timestamp.format("%Y-%m-%d %H:%M:%S")).dim(),
            level_style(entry.level),
            entry.message
        );
    }

    Ok(())
}

fn print_sample(sample: &MetricSample, json: bool) -> ContainuCliResult<()> {
    if json {
        println!("{}", serde_json::to_string(sample)?);
    } else {
        println!(
            "{} cpu {:>5.1}%  mem {:>6.1} MB  net {:>5.2} MB/s",
            console::style(sample.timestamp.format("%H:%M:%S")).dim(),
            sample.cpu,
            sample.memory,
            sample.network_io
        );
    }

    Ok(())
}

fn cancel_on_interrupt() -> CancellationToken {
    let token = CancellationToken::new();
    let interrupted = token.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("interrupted, cancelling stream");
            interrupted.cancel();
        }
    });

    token
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use containu_core::{catalog::DemoCatalog, config::LifecycleConfig};

    use super::*;

    fn snapshot() -> StoreSnapshot {
        LifecycleService::seeded(Arc::new(DemoCatalog), LifecycleConfig::default())
            .unwrap()
            .snapshot()
            .unwrap()
    }

    #[test]
    fn test_resolve_container_by_name_id_and_prefix() {
        let snapshot = snapshot();
        let db = snapshot.container_by_name("db-main").unwrap().id;

        assert_eq!(resolve_container(&snapshot, "db-main").unwrap(), db);
        assert_eq!(resolve_container(&snapshot, &db.to_string()).unwrap(), db);
        assert_eq!(resolve_container(&snapshot, &short_id(db)).unwrap(), db);
        assert!(matches!(
            resolve_container(&snapshot, "nope"),
            Err(ContainuCliError::UnknownResource { kind: "container", .. })
        ));
    }

    #[test]
    fn test_resolve_image_defaults_tag() {
        let snapshot = snapshot();

        let nginx = resolve_image(&snapshot, "nginx").unwrap();
        assert_eq!(snapshot.image(nginx).unwrap().reference(), "nginx:latest");
        assert!(resolve_image(&snapshot, "nginx:1.0").is_err());
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("started"), "Started");
        assert_eq!(capitalize(""), "");
    }
}
