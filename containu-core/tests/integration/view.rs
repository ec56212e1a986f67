use std::collections::HashSet;

use containu_core::{
    models::LogLevel,
    view::{filter_logs, visible, SortOption},
};

use super::{demo_service, id_of};

#[test]
fn test_visible_db_query() {
    let service = demo_service();
    let snapshot = service.snapshot().unwrap();

    let result = visible(snapshot.get_containers(), "db", SortOption::Name);

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].name, "db-main");
}

#[test]
fn test_visible_status_sort_puts_errors_first() {
    let service = demo_service();
    let snapshot = service.snapshot().unwrap();

    let running_first = visible(snapshot.get_containers(), "", SortOption::Status);
    let statuses: Vec<_> = running_first.iter().map(|c| c.status.as_str()).collect();
    let mut sorted = statuses.clone();
    sorted.sort();

    assert_eq!(statuses, sorted);
    assert_eq!(running_first[0].name, "worker-node-1");
}

#[test_log::test(tokio::test)]
async fn test_filter_fetched_logs_by_level() {
    let service = demo_service();
    let id = id_of(&service, "db-main");

    let logs = service.fetch_logs(id, 100).await.unwrap();
    let errors = filter_logs(&logs, "", &HashSet::from([LogLevel::Error]));

    assert!(errors.iter().all(|e| e.level == LogLevel::Error));
    assert_eq!(
        errors.len(),
        logs.iter().filter(|e| e.level == LogLevel::Error).count()
    );
}
