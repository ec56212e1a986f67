//! End-to-end tests of the lifecycle layer over the demo catalog.

mod batch;
mod lifecycle;
mod streams;
mod view;

use std::{sync::Arc, time::Duration};

use containu_core::{
    catalog::DemoCatalog, config::LifecycleConfig, management::LifecycleService,
};
use uuid::Uuid;

//--------------------------------------------------------------------------------------------------
// Functions: Helpers
//--------------------------------------------------------------------------------------------------

/// A config with a small latency so concurrency is exercised without slowing the suite down.
pub fn test_config() -> LifecycleConfig {
    LifecycleConfig::builder()
        .latency(Duration::from_millis(10))
        .restart_pause(Duration::from_millis(5))
        .stream_interval(Duration::from_millis(2))
        .build()
}

/// A service over a store seeded with the demo catalog.
pub fn demo_service() -> LifecycleService {
    LifecycleService::seeded(Arc::new(DemoCatalog), test_config()).unwrap()
}

/// Looks up a container id by name.
pub fn id_of(service: &LifecycleService, name: &str) -> Uuid {
    service
        .snapshot()
        .unwrap()
        .container_by_name(name)
        .unwrap_or_else(|| panic!("no container named {}", name))
        .id
}
