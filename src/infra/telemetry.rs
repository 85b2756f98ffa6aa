use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

pub const FILES_PROCESSED: &str = "yojitsu_files_processed_total";
pub const FILES_CHANGED: &str = "yojitsu_files_changed_total";
pub const EXTRACT_DEGRADED: &str = "yojitsu_extract_degraded_total";
pub const STRUCTURE_VIOLATIONS: &str = "yojitsu_structure_violations_total";

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            FILES_PROCESSED,
            Unit::Count,
            "Total number of HTML files read by batch commands."
        );
        describe_counter!(
            FILES_CHANGED,
            Unit::Count,
            "Total number of HTML files rewritten by fix or prerender."
        );
        describe_counter!(
            EXTRACT_DEGRADED,
            Unit::Count,
            "Total number of articles extracted with missing metadata."
        );
        describe_counter!(
            STRUCTURE_VIOLATIONS,
            Unit::Count,
            "Total number of missing structural requirements found by check."
        );
    });
}
