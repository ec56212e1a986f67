use containu_core::{
    management::StreamEmitter,
    models::{CPU_RANGE, MEMORY_RANGE, NETWORK_IO_RANGE},
};
use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use super::{demo_service, id_of};

#[test_log::test(tokio::test)]
async fn test_stats_stream_runs_to_completion() {
    let service = demo_service();
    let emitter = StreamEmitter::new(service.clone());
    let id = id_of(&service, "db-main");

    let samples: Vec<_> = emitter
        .stream_stats(id, CancellationToken::new())
        .unwrap()
        .collect()
        .await;

    assert_eq!(samples.len(), 60);
    for sample in &samples {
        assert!(CPU_RANGE.contains(&sample.cpu));
        assert!(MEMORY_RANGE.contains(&sample.memory));
        assert!(NETWORK_IO_RANGE.contains(&sample.network_io));
    }
    assert!(samples.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    assert_eq!(service.get_store().metrics(id).unwrap(), samples);
}

#[test_log::test(tokio::test)]
async fn test_stats_stream_cancelled_after_ten() {
    let service = demo_service();
    let emitter = StreamEmitter::new(service.clone());
    let id = id_of(&service, "db-main");
    let token = CancellationToken::new();

    let mut stream = std::pin::pin!(emitter.stream_stats(id, token.clone()).unwrap());
    let mut received = Vec::new();
    while let Some(sample) = stream.next().await {
        received.push(sample);
        if received.len() == 10 {
            token.cancel();
        }
    }

    assert_eq!(received.len(), 10);
    assert_eq!(service.get_store().metrics(id).unwrap().len(), 10);
}

#[test_log::test(tokio::test)]
async fn test_log_stream_is_bounded_and_not_restartable() {
    let service = demo_service();
    let emitter = StreamEmitter::new(service.clone());
    let id = id_of(&service, "api-gateway");

    let first: Vec<_> = emitter
        .stream_logs(id, CancellationToken::new())
        .unwrap()
        .collect()
        .await;
    let second: Vec<_> = emitter
        .stream_logs(id, CancellationToken::new())
        .unwrap()
        .collect()
        .await;

    assert_eq!(first.len(), 20);
    assert_eq!(second.len(), 20);

    let logs = service.get_store().logs(id).unwrap();
    assert_eq!(logs.len(), 40);
    assert!(logs.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}

#[test_log::test(tokio::test)]
async fn test_cancelling_parent_stops_subscription() {
    let service = demo_service();
    let emitter = StreamEmitter::new(service.clone());
    let id = id_of(&service, "db-main");
    let parent = CancellationToken::new();

    let mut receiver = emitter.subscribe_stats(id, parent.clone()).unwrap();
    assert!(receiver.next().await.is_some());

    parent.cancel();

    let mut remaining = 0;
    while receiver.next().await.is_some() {
        remaining += 1;
    }
    assert!(remaining < 59);
}
