use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

use crate::{engine::PredictionPath, error::AppError};

/// Installs the global Prometheus recorder and registers metric descriptions.
pub fn install() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    describe_counter!(
        "predictions_total",
        "Successful predictions, labelled by model or fallback path"
    );
    describe_counter!(
        "prediction_errors_total",
        "Failed prediction requests, labelled by error kind"
    );
    describe_histogram!(
        "prediction_duration_ms",
        Unit::Milliseconds,
        "Time spent handling a prediction request"
    );

    Ok(handle)
}

pub fn observe_prediction(path: PredictionPath, elapsed: Duration) {
    counter!("predictions_total", "path" => path.as_str()).increment(1);
    histogram!("prediction_duration_ms").record(elapsed.as_secs_f64() * 1000.0);
}

pub fn observe_error(err: &AppError) {
    counter!("prediction_errors_total", "kind" => err.kind()).increment(1);
}
