use super::*;

#[test]
fn test_custom_registry() {
    let registry = Registry::new();
    register_custom_metrics(&registry).unwrap();

    WATCH_SESSIONS_METRIC.with_label_values(&["metrics-test@x"]).inc();
    WATCH_RETRIES_METRIC.with_label_values(&["metrics-test@x"]).inc();
    WATCH_EVENTS_APPLIED_METRIC.with_label_values(&["metrics-test@x"]).inc();

    let metrics = registry.gather();
    let metric_names: Vec<_> = metrics.iter().map(|m| m.get_name()).collect();
    assert!(metric_names.contains(&"dircache_watch_sessions_total"));
    assert!(metric_names.contains(&"dircache_watch_retries_total"));
    assert!(metric_names.contains(&"dircache_watch_events_applied_total"));
    assert!(metric_names.contains(&"dircache_active_watchers"));
}

#[test]
fn test_double_registration_is_rejected() {
    let registry = Registry::new();
    register_custom_metrics(&registry).unwrap();
    assert!(register_custom_metrics(&registry).is_err());
}

#[test]
fn test_counter_increment() {
    let label = "counter-test@x";
    let before = WATCH_RETRIES_METRIC.with_label_values(&[label]).get();

    WATCH_RETRIES_METRIC.with_label_values(&[label]).inc();
    WATCH_RETRIES_METRIC.with_label_values(&[label]).inc();

    let value = WATCH_RETRIES_METRIC.with_label_values(&[label]).get();
    assert_eq!(value, before + 2, "Counter should increment correctly");
}
