use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::{any::Any, sync::Arc, time::Instant};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::info_span;
use uuid::Uuid;

use crate::{
    engine::CareerEngine,
    error::{prediction_failed, AppError},
    telemetry,
    types::{DimensionsResponse, HealthResponse, PredictRequest, PredictResponse},
};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<CareerEngine>,
    pub metrics: Option<PrometheusHandle>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/predict", post(predict))
        .route("/dimensions", get(dimensions))
        .route("/metrics", get(metrics))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(state.engine.health())
}

pub async fn predict(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PredictResponse>, AppError> {
    let start = Instant::now();
    let span = info_span!("predict", request_id = %Uuid::new_v4());

    let result = span.in_scope(|| {
        let request = PredictRequest::from_body(&body)?;
        state.engine.predict(&request.answers)
    });

    match result {
        Ok((prediction, path)) => {
            telemetry::observe_prediction(path, start.elapsed());
            Ok(Json(PredictResponse {
                success: true,
                prediction,
            }))
        }
        Err(e) => {
            telemetry::observe_error(&e);
            Err(e)
        }
    }
}

pub async fn dimensions() -> Json<DimensionsResponse> {
    Json(DimensionsResponse::canonical())
}

pub async fn metrics(State(state): State<AppState>) -> String {
    state
        .metrics
        .as_ref()
        .map(PrometheusHandle::render)
        .unwrap_or_default()
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unexpected panic".to_string()
    };

    prediction_failed(detail).into_response()
}
