use crate::{
    catalog::CourseCatalog,
    error::AppError,
    features::{build_feature_map, FeatureMap, DIMENSION_COUNT},
    matcher,
    model::{PredictionOutcome, PredictorAdapter},
    settings::Config,
    types::{HealthResponse, Prediction},
};
use std::time::Instant;
use tracing::{debug, error, info, warn};

pub const DEFAULT_MODEL_CONFIDENCE: f64 = 0.8;
pub const FALLBACK_LABEL: &str = "General Studies";
pub const FALLBACK_CONFIDENCE: f64 = 0.6;
const FALLBACK_MESSAGE: &str = "Based on your interests, here are some career paths to consider";

/// Which path produced a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionPath {
    Model,
    Fallback,
}

impl PredictionPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionPath::Model => "model",
            PredictionPath::Fallback => "fallback",
        }
    }
}

/// Process-wide prediction service. Built once at startup and shared read-only.
pub struct CareerEngine {
    predictor: PredictorAdapter,
    catalog: CourseCatalog,
}

impl CareerEngine {
    pub async fn new(config: &Config) -> Self {
        info!("Initializing career engine...");

        let predictor = PredictorAdapter::load(&config.model_path).await;

        let catalog = match CourseCatalog::load(&config.course_data_path).await {
            Ok(catalog) => catalog,
            Err(e) => {
                error!(
                    "Failed to load course data from {}: {}",
                    config.course_data_path, e
                );
                CourseCatalog::empty()
            }
        };

        info!(
            "Career engine ready (model loaded: {}, courses: {})",
            predictor.is_loaded(),
            catalog.len()
        );

        Self::from_parts(predictor, catalog)
    }

    pub fn from_parts(predictor: PredictorAdapter, catalog: CourseCatalog) -> Self {
        Self { predictor, catalog }
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            status: "OK",
            model_loaded: self.predictor.is_loaded(),
            course_data_loaded: !self.catalog.is_empty(),
            message: "ML Service is running",
        }
    }

    pub fn predict(&self, answers: &[f64]) -> Result<(Prediction, PredictionPath), AppError> {
        let start = Instant::now();

        if answers.len() != DIMENSION_COUNT {
            return Err(AppError::InvalidInput);
        }

        let features = build_feature_map(answers);

        let outcome = self
            .predictor
            .predict(&features)
            .ok_or(AppError::ModelUnavailable)?;

        let result = match outcome {
            PredictionOutcome::Predicted { label, confidence } => {
                let message = format!("Based on your interests, we recommend: {}", label);
                let confidence = confidence.unwrap_or(DEFAULT_MODEL_CONFIDENCE);
                (
                    self.assemble(label, confidence, features, message),
                    PredictionPath::Model,
                )
            }
            PredictionOutcome::Failed(e) => {
                warn!("Prediction error: {}; using rule-based fallback", e);
                (self.fallback(answers), PredictionPath::Fallback)
            }
        };

        debug!(
            "Prediction via {} path took {:.2?}",
            result.1.as_str(),
            start.elapsed()
        );
        Ok(result)
    }

    /// Rule-based prediction used when the model call fails.
    pub fn fallback(&self, answers: &[f64]) -> Prediction {
        self.assemble(
            FALLBACK_LABEL.to_string(),
            FALLBACK_CONFIDENCE,
            build_feature_map(answers),
            FALLBACK_MESSAGE.to_string(),
        )
    }

    fn assemble(
        &self,
        predicted_course: String,
        confidence: f64,
        features: FeatureMap,
        message: String,
    ) -> Prediction {
        let top_features = features.top_features();
        let recommended_courses = matcher::recommend(&top_features, &self.catalog);

        Prediction {
            predicted_course,
            confidence,
            top_features,
            recommended_courses,
            feature_scores: features,
            message,
        }
    }
}
