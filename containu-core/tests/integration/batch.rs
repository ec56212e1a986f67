use std::{sync::Arc, time::Duration};

use containu_core::{
    catalog::DemoCatalog,
    config::LifecycleConfig,
    management::{BatchAction, BatchCoordinator, LifecycleService},
    models::ContainerStatus,
    ContainuError,
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::{demo_service, id_of};

fn slow_restart_service() -> LifecycleService {
    let config = LifecycleConfig::builder()
        .latency(Duration::from_millis(10))
        .restart_pause(Duration::from_millis(200))
        .build();
    LifecycleService::seeded(Arc::new(DemoCatalog), config).unwrap()
}

#[test_log::test(tokio::test)]
async fn test_batch_start_with_missing_id() {
    let service = demo_service();
    let coordinator = BatchCoordinator::new(service.clone());
    let a = id_of(&service, "redis-cache");
    let b = Uuid::new_v4();
    let c = id_of(&service, "dev-environment");

    let report = coordinator.run([a, b, c], BatchAction::Start).await;

    assert_eq!(report.len(), 3);
    assert!(matches!(report.outcome(a), Some(Ok(()))));
    assert!(matches!(report.outcome(c), Some(Ok(()))));
    assert!(matches!(
        report.outcome(b),
        Some(Err(ContainuError::NotFound { .. }))
    ));

    let store = service.get_store();
    assert_eq!(store.container(a).unwrap().status, ContainerStatus::Running);
    assert_eq!(store.container(c).unwrap().status, ContainerStatus::Running);
}

#[test_log::test(tokio::test)]
async fn test_batch_runs_concurrently() {
    let service = demo_service();
    let coordinator = BatchCoordinator::new(service.clone());
    let ids: Vec<_> = service
        .snapshot()
        .unwrap()
        .get_containers()
        .iter()
        .map(|c| c.id)
        .collect();
    let latency = service.get_config().get_latency();

    let started = tokio::time::Instant::now();
    let report = coordinator.run(ids.clone(), BatchAction::Stop).await;
    let elapsed = started.elapsed();

    assert!(report.all_succeeded());
    assert!(elapsed < latency * ids.len() as u32);
    assert!(service
        .snapshot()
        .unwrap()
        .get_containers()
        .iter()
        .all(|c| c.status == ContainerStatus::Stopped));
}

#[test_log::test(tokio::test)]
async fn test_batch_restart_after_delete_reports_not_found() {
    let service = demo_service();
    let coordinator = BatchCoordinator::new(service.clone());
    let redis = id_of(&service, "redis-cache");
    let db = id_of(&service, "db-main");

    let deleted = coordinator.run([redis], BatchAction::Delete).await;
    assert!(deleted.all_succeeded());

    let report = coordinator.run([redis, db], BatchAction::Restart).await;

    assert_eq!(report.succeeded(), vec![db]);
    assert!(report.outcome(redis).unwrap().as_ref().unwrap_err().is_not_found());
    assert!(report.to_string().starts_with("1 of 2 containers restarted; "));
}

#[test_log::test(tokio::test)]
async fn test_dropped_batch_still_finishes_started_restart() {
    let service = slow_restart_service();
    let coordinator = BatchCoordinator::new(service.clone());
    let db = id_of(&service, "db-main");

    let batch = tokio::spawn(async move { coordinator.run([db], BatchAction::Restart).await });
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(
        service.get_store().container(db).unwrap().status,
        ContainerStatus::Stopped
    );

    batch.abort();
    assert!(batch.await.unwrap_err().is_cancelled());

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(
        service.get_store().container(db).unwrap().status,
        ContainerStatus::Running
    );
    assert_eq!(service.get_store().logs(db).unwrap().len(), 4);
}

#[test_log::test(tokio::test)]
async fn test_cancel_during_batch_completes_started_units() {
    let service = slow_restart_service();
    let coordinator = BatchCoordinator::new(service.clone());
    let db = id_of(&service, "db-main");
    let web = id_of(&service, "web-server-prod");
    let token = CancellationToken::new();

    let batch = {
        let token = token.clone();
        tokio::spawn(async move {
            coordinator
                .run_cancellable([db, web], BatchAction::Restart, token)
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(60)).await;
    token.cancel();

    let report = batch.await.unwrap();

    assert!(report.all_succeeded());
    assert_eq!(report.len(), 2);
    let store = service.get_store();
    assert!(store.container(db).unwrap().is_running());
    assert!(store.container(web).unwrap().is_running());
}
