//! Shared handler state.

use rendersort_config::ServiceConfig;
use rendersort_core::AovMapper;
use rendersort_telemetry::Metrics;

pub(crate) struct ApiState {
    pub(crate) config: ServiceConfig,
    pub(crate) telemetry: Metrics,
    pub(crate) mapper: AovMapper,
}

impl ApiState {
    pub(crate) const fn new(config: ServiceConfig, telemetry: Metrics, mapper: AovMapper) -> Self {
        Self {
            config,
            telemetry,
            mapper,
        }
    }
}
