use opentelemetry::{KeyValue, metrics::UpDownCounter};
use std::sync::LazyLock;

static STATDS: LazyLock<UpDownCounter<i64>> = LazyLock::new(|| {
    logfire::i64_up_down_counter("ruka_landing_statds")
        .with_description("Ruka landing lead statistics")
        .with_unit("attempt")
        .build()
});

fn incr_statds(metric: String, value: String) {
    STATDS.add(1, &[KeyValue::new(metric, value)]);
}

pub fn incr_lead_action_statds(action: &str) {
    incr_statds("lead_action".to_string(), action.into())
}

pub fn incr_crm_status_statds(status: &str) {
    incr_statds("crm_status".to_string(), status.into())
}

pub fn incr_notification_status_statds(status: &str) {
    incr_statds("notification_status".to_string(), status.into())
}
