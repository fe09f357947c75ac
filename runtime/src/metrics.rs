//! Metric names and descriptions recorded by the [`Store`](crate::Store).
//!
//! The runtime only records through the `metrics` facade. Installing a
//! recorder or exporter is left to the binary embedding the store; call
//! [`describe_store_metrics`] once after installing it so exporters can
//! publish help text.

use metrics::{describe_counter, describe_histogram};

/// Actions accepted by `Store::send`
pub const ACTIONS_TOTAL: &str = "store.actions.total";

/// Actions rejected because the store is shutting down
pub const ACTIONS_REJECTED: &str = "store.actions.rejected";

/// Effects executed, labelled by `type`
pub const EFFECTS_EXECUTED: &str = "store.effects.executed";

/// Pending effects aborted through `Effect::Cancel` or `Store::cancel`
pub const EFFECTS_CANCELLED: &str = "store.effects.cancelled";

/// Wall time spent inside the reducer
pub const REDUCER_DURATION: &str = "store.reducer.duration_seconds";

/// Register descriptions for every store metric.
pub fn describe_store_metrics() {
    describe_counter!(ACTIONS_TOTAL, "Total number of actions reduced by the store");
    describe_counter!(
        ACTIONS_REJECTED,
        "Actions rejected because the store was shutting down"
    );
    describe_counter!(EFFECTS_EXECUTED, "Effects executed, labelled by effect type");
    describe_counter!(
        EFFECTS_CANCELLED,
        "Scheduled or running effects aborted before completion"
    );
    describe_histogram!(
        REDUCER_DURATION,
        "Time spent executing the reducer for a single action"
    );
}
