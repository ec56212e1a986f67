use containu_core::{
    models::{ContainerOptions, ContainerStatus, LogLevel},
    ContainuError,
};
use uuid::Uuid;

use super::{demo_service, id_of};

#[test_log::test(tokio::test)]
async fn test_start_appends_starting_then_started() {
    let service = demo_service();

    for name in ["redis-cache", "dev-environment", "worker-node-1"] {
        let id = id_of(&service, name);
        let before = service.get_store().logs(id).unwrap().len();

        service.start(id).await.unwrap();

        let container = service.get_store().container(id).unwrap();
        assert_eq!(container.status, ContainerStatus::Running);

        let logs = service.get_store().logs(id).unwrap();
        assert_eq!(logs.len(), before + 2);
        assert_eq!(logs[before].message, format!("Container {} starting...", name));
        assert_eq!(
            logs[before + 1].message,
            format!("Container {} started successfully", name)
        );
        assert!(logs[before].timestamp < logs[before + 1].timestamp);
        assert!(logs.iter().all(|e| e.level == LogLevel::Info));
    }
}

#[test_log::test(tokio::test)]
async fn test_delete_prunes_everything_then_not_found() {
    let service = demo_service();
    let id = id_of(&service, "web-server-prod");

    service.fetch_logs(id, 10).await.unwrap();
    service.stats(id).await.unwrap();
    service
        .get_store()
        .update_selection(|selection| {
            selection.select(id);
            selection.mark(id);
        })
        .unwrap();

    let removed = service.delete(id).await.unwrap();
    assert_eq!(removed.name, "web-server-prod");

    let snapshot = service.snapshot().unwrap();
    assert!(snapshot.container(id).is_none());
    assert!(!snapshot.get_selection().references(id));
    assert!(snapshot
        .get_networks()
        .iter()
        .all(|n| !n.containers.contains(&id)));
    assert!(service.get_store().logs(id).unwrap_err().is_not_found());
    assert!(service.get_store().metrics(id).unwrap_err().is_not_found());

    let second = service.delete(id).await;
    assert!(matches!(second, Err(ContainuError::NotFound { id: missing, .. }) if missing == id));
}

#[test_log::test(tokio::test)]
async fn test_stop_twice_is_idempotent() {
    let service = demo_service();
    let id = id_of(&service, "monitoring-stack");

    service.stop(id).await.unwrap();
    let after_first = service.get_store().logs(id).unwrap();
    assert_eq!(after_first.len(), 2);

    service.stop(id).await.unwrap();

    assert_eq!(
        service.get_store().container(id).unwrap().status,
        ContainerStatus::Stopped
    );
    assert_eq!(service.get_store().logs(id).unwrap(), after_first);
}

#[test_log::test(tokio::test)]
async fn test_pull_then_remove_round_trip() {
    let service = demo_service();
    let before = service.get_store().images().unwrap();

    let image = service.pull("nginx", "latest").await.unwrap();
    assert_eq!(image.reference(), "nginx:latest");
    assert_eq!(service.get_store().images().unwrap().len(), before.len() + 1);

    service.remove_image(image.id).await.unwrap();

    assert_eq!(service.get_store().images().unwrap(), before);
}

#[test_log::test(tokio::test)]
async fn test_concurrent_start_and_delete_on_same_id() {
    let service = demo_service();
    let id = id_of(&service, "redis-cache");

    let (started, deleted) = tokio::join!(service.start(id), service.delete(id));

    assert!(deleted.is_ok());
    match started {
        Ok(()) => {}
        Err(e) => assert!(e.is_not_found()),
    }
    assert!(service.snapshot().unwrap().container(id).is_none());
    assert!(service.get_store().logs(id).unwrap_err().is_not_found());
}

#[test_log::test(tokio::test)]
async fn test_create_attaches_back_references() {
    let service = demo_service();
    let options = ContainerOptions::builder()
        .name("api-v2")
        .image("node:20")
        .networks(vec!["my-app-net".to_string()])
        .volumes(vec!["postgres-data".to_string()])
        .build();

    let container = service.create(options).await.unwrap();

    let snapshot = service.snapshot().unwrap();
    assert!(snapshot
        .network_by_name("my-app-net")
        .unwrap()
        .containers
        .contains(&container.id));
    assert!(snapshot
        .volume_by_name("postgres-data")
        .unwrap()
        .containers
        .contains(&container.id));

    service.delete(container.id).await.unwrap();
    let snapshot = service.snapshot().unwrap();
    assert!(!snapshot
        .volume_by_name("postgres-data")
        .unwrap()
        .containers
        .contains(&container.id));
}

#[test_log::test(tokio::test)]
async fn test_ids_are_never_reused() {
    let service = demo_service();
    let options = ContainerOptions::builder().name("tmp").image("alpine").build();

    let first = service.create(options.clone()).await.unwrap();
    service.delete(first.id).await.unwrap();
    let second = service.create(options).await.unwrap();

    assert_ne!(first.id, second.id);
    assert!(service.start(Uuid::new_v4()).await.unwrap_err().is_not_found());
}
