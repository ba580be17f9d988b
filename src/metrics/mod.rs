use lazy_static::lazy_static;
use prometheus::IntCounterVec;
use prometheus::IntGauge;
use prometheus::Opts;
use prometheus::Registry;

#[cfg(test)]
mod metrics_test;

lazy_static! {
    pub static ref WATCH_SESSIONS_METRIC: IntCounterVec = IntCounterVec::new(
        Opts::new("dircache_watch_sessions_total", "Watch streams successfully started"),
        &["user"]
    )
    .expect("metric can not be created");

    pub static ref WATCH_RETRIES_METRIC: IntCounterVec = IntCounterVec::new(
        Opts::new("dircache_watch_retries_total", "Failed watch sessions followed by a retry"),
        &["user"]
    )
    .expect("metric can not be created");

    pub static ref WATCH_EVENTS_APPLIED_METRIC: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "dircache_watch_events_applied_total",
            "Watch events that mutated the cache"
        ),
        &["user"]
    )
    .expect("metric can not be created");

    pub static ref ACTIVE_WATCHERS_METRIC: IntGauge =
        IntGauge::new("dircache_active_watchers", "Watcher tasks currently running")
            .expect("metric can not be created");
}

/// Registers the directory cache collectors with `registry`.
pub fn register_custom_metrics(registry: &Registry) -> prometheus::Result<()> {
    registry.register(Box::new(WATCH_SESSIONS_METRIC.clone()))?;
    registry.register(Box::new(WATCH_RETRIES_METRIC.clone()))?;
    registry.register(Box::new(WATCH_EVENTS_APPLIED_METRIC.clone()))?;
    registry.register(Box::new(ACTIVE_WATCHERS_METRIC.clone()))?;
    Ok(())
}
