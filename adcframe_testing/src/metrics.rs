//! Assertions over a [`DebuggingRecorder`] snapshot.

use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};

/// Create a debugging recorder and the snapshotter observing it.
#[must_use]
pub fn debugging_recorder_setup() -> (Snapshotter, DebuggingRecorder) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    (snapshotter, recorder)
}

/// Sum every counter called `name` whose labels include `label`.
///
/// Pass `None` to sum across all label sets.
#[must_use]
pub fn counter_total(
    snapshotter: &Snapshotter,
    name: &str,
    label: Option<(&str, &str)>,
) -> u64 {
    snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .filter(|(key, _, _, _)| key.key().name() == name)
        .filter(|(key, _, _, _)| {
            label.is_none_or(|(k, v)| key.key().labels().any(|l| l.key() == k && l.value() == v))
        })
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(count) => count,
            _ => 0,
        })
        .sum()
}

/// Latest value of the gauge called `name`, if it was recorded.
#[must_use]
pub fn gauge_value(snapshotter: &Snapshotter, name: &str) -> Option<f64> {
    snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .find(|(key, _, _, _)| key.key().name() == name)
        .and_then(|(_, _, _, value)| match value {
            DebugValue::Gauge(gauge) => Some(gauge.0),
            _ => None,
        })
}
