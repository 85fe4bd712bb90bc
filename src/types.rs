use crate::{
    error::{prediction_failed, AppError},
    features::{FeatureMap, InterestCategory, TopFeature, DIMENSION_COUNT, INTEREST_DIMENSIONS},
    matcher::RecommendationEntry,
};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct PredictRequest {
    pub answers: Vec<f64>,
}

impl PredictRequest {
    /// Parses a `/predict` body.
    ///
    /// Bodies that are not a JSON object, and non-numeric answers, are
    /// `PredictionFailed`; a missing, non-array or wrongly sized `answers` is
    /// `InvalidInput`.
    pub fn from_body(body: &[u8]) -> Result<Self, AppError> {
        let payload: Value = serde_json::from_slice(body).map_err(prediction_failed)?;
        let object = payload
            .as_object()
            .ok_or_else(|| prediction_failed("request body must be a JSON object"))?;

        let answers = match object.get("answers") {
            Some(Value::Array(items)) if items.len() == DIMENSION_COUNT => items,
            _ => return Err(AppError::InvalidInput),
        };

        let answers = answers
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_f64()
                    .ok_or_else(|| prediction_failed(format!("answer {} is not a number", i)))
            })
            .collect::<Result<Vec<f64>, AppError>>()?;

        Ok(Self { answers })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub predicted_course: String,
    pub confidence: f64,
    #[serde(rename = "topFeatures")]
    pub top_features: Vec<TopFeature>,
    #[serde(rename = "recommendedCourses")]
    pub recommended_courses: Vec<RecommendationEntry>,
    #[serde(rename = "featureScores")]
    pub feature_scores: FeatureMap,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictResponse {
    pub success: bool,
    pub prediction: Prediction,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
    pub course_data_loaded: bool,
    pub message: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct DimensionInfo {
    pub index: usize,
    pub name: &'static str,
    pub category: Option<InterestCategory>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DimensionsResponse {
    pub success: bool,
    pub dimensions: Vec<DimensionInfo>,
}

impl DimensionsResponse {
    pub fn canonical() -> Self {
        let dimensions = INTEREST_DIMENSIONS
            .iter()
            .enumerate()
            .map(|(index, name)| DimensionInfo {
                index,
                name: *name,
                category: InterestCategory::of_index(index),
            })
            .collect();

        Self {
            success: true,
            dimensions,
        }
    }
}
