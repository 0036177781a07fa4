//! Metrics for the presence sensor data-point pipeline.
//!
//! Every metric the dispatcher and settings encoder emit is declared here as
//! a [`Metric`] constant, so names stay in one place.
//!
//! ```rust,ignore
//! use presence_metrics::{describe_metrics, metric_defs, MetricLabels};
//!
//! describe_metrics();
//!
//! let labels = MetricLabels::new("hallway", "ZY-M100");
//! metrics::counter!(metric_defs::DP_RECEIVED.name, &labels.with_dp("presence")).increment(1);
//! ```

pub use metrics;

use metrics::{KeyName, Recorder, SharedString, Unit};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
}

/// A metric name with the metadata handed to the recorder.
#[derive(Debug, Clone)]
pub struct Metric {
    pub name: &'static str,
    pub kind: MetricKind,
    pub description: &'static str,
    pub unit: Option<Unit>,
}

impl Metric {
    const fn new(name: &'static str, kind: MetricKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            unit: None,
        }
    }

    const fn counted(mut self) -> Self {
        self.unit = Some(Unit::Count);
        self
    }

    /// Register this metric's description with the installed recorder.
    pub fn describe(&self) {
        let key = KeyName::from_const_str(self.name);
        let description = SharedString::const_str(self.description);
        metrics::with_recorder(|recorder: &dyn Recorder| match self.kind {
            MetricKind::Counter => recorder.describe_counter(key, self.unit, description),
            MetricKind::Gauge => recorder.describe_gauge(key, self.unit, description),
            MetricKind::Histogram => recorder.describe_histogram(key, self.unit, description),
        });
    }
}

/// Metric declarations.
pub mod metric_defs {
    use super::{Metric, MetricKind::*};

    // Inbound data points, labelled by device, model and dp.

    pub const DP_RECEIVED: Metric = Metric::new(
        "presence.dp.received",
        Counter,
        "Data-point records handed to the dispatcher",
    )
    .counted();

    pub const DP_UNKNOWN: Metric = Metric::new(
        "presence.dp.unknown",
        Counter,
        "Records whose identifier is not in the action table",
    )
    .counted();

    pub const DP_DECODE_FAILED: Metric = Metric::new(
        "presence.dp.decode_failed",
        Counter,
        "Records whose payload could not be decoded for its type tag",
    )
    .counted();

    pub const ACTION_FAILED: Metric = Metric::new(
        "presence.action.failed",
        Counter,
        "Update actions that returned an error",
    )
    .counted();

    // Sensor readings, labelled by device and model.

    pub const OCCUPANCY: Metric = Metric::new(
        "presence.occupancy",
        Gauge,
        "1 while the sensor reports presence, 0 otherwise",
    );

    pub const LUMINANCE: Metric =
        Metric::new("presence.luminance", Gauge, "Last reported illuminance");

    pub const DISTANCE: Metric = Metric::new(
        "presence.distance",
        Gauge,
        "Last reported distance to the detected target",
    );

    // Outbound settings.

    pub const SETTINGS_WRITES: Metric = Metric::new(
        "presence.settings.writes",
        Counter,
        "Data-point writes issued for changed settings",
    )
    .counted();

    pub const SETTINGS_UNMAPPED: Metric = Metric::new(
        "presence.settings.unmapped",
        Counter,
        "Changed settings keys skipped because they have no encoder",
    )
    .counted();

    pub const SETTINGS_BATCH_SIZE: Metric = Metric::new(
        "presence.settings.batch_size",
        Histogram,
        "Writes issued per settings event",
    )
    .counted();

    pub const ALL: &[&Metric] = &[
        &DP_RECEIVED,
        &DP_UNKNOWN,
        &DP_DECODE_FAILED,
        &ACTION_FAILED,
        &OCCUPANCY,
        &LUMINANCE,
        &DISTANCE,
        &SETTINGS_WRITES,
        &SETTINGS_UNMAPPED,
        &SETTINGS_BATCH_SIZE,
    ];
}

/// Label values identifying one sensor.
#[derive(Debug, Clone)]
pub struct MetricLabels {
    pub device: String,
    pub model: String,
}

impl MetricLabels {
    pub fn new(device: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            model: model.into(),
        }
    }

    /// Convert to the label vector accepted by the `metrics` macros.
    pub fn to_labels(&self) -> Vec<(&'static str, String)> {
        vec![
            ("device", self.device.clone()),
            ("model", self.model.clone()),
        ]
    }

    /// Device labels plus the data-point label.
    pub fn with_dp(&self, dp: impl Into<String>) -> Vec<(&'static str, String)> {
        let mut labels = self.to_labels();
        labels.push(("dp", dp.into()));
        labels
    }
}

/// Describe all metrics. Call once after installing a recorder.
pub fn describe_metrics() {
    for metric in metric_defs::ALL {
        metric.describe();
    }
}
