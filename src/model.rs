use crate::features::FeatureMap;
use chrono::{DateTime, Utc};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::{path::Path, sync::Arc};
use thiserror::Error;
use tracing::{debug, error, info};

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid model artifact: {0}")]
    InvalidArtifact(String),

    #[error("feature '{0}' required by the model is missing")]
    MissingFeature(String),

    #[error("model produced non-finite scores")]
    NonFinite,
}

/// Anything that can classify a feature map.
pub trait Classifier: Send + Sync {
    fn predict(&self, features: &FeatureMap) -> Result<String, ModelError>;

    /// Class probability distribution. Only meaningful when
    /// [`Classifier::supports_probability`] is true.
    fn predict_proba(&self, features: &FeatureMap) -> Result<Vec<f64>, ModelError>;

    fn supports_probability(&self) -> bool;
}

/// On-disk form of the trained classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub version: String,
    #[serde(default)]
    pub trained_at: Option<DateTime<Utc>>,
    pub feature_order: Vec<String>,
    pub classes: Vec<String>,
    pub intercepts: Vec<f64>,
    pub coefficients: Vec<Vec<f64>>,
    #[serde(default)]
    pub probability: bool,
}

/// Multinomial linear classifier: `argmax(W·x + b)`, softmax for probabilities.
#[derive(Debug, Clone)]
pub struct LinearClassifier {
    version: String,
    feature_order: Vec<String>,
    classes: Vec<String>,
    coefficients: DMatrix<f64>,
    intercepts: DVector<f64>,
    probability: bool,
}

impl LinearClassifier {
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelError> {
        let n_classes = artifact.classes.len();
        let n_features = artifact.feature_order.len();

        if n_classes == 0 {
            return Err(ModelError::InvalidArtifact("no classes".to_string()));
        }
        if n_features == 0 {
            return Err(ModelError::InvalidArtifact("empty feature_order".to_string()));
        }
        if artifact.intercepts.len() != n_classes {
            return Err(ModelError::InvalidArtifact(format!(
                "expected {} intercepts, found {}",
                n_classes,
                artifact.intercepts.len()
            )));
        }
        if artifact.coefficients.len() != n_classes
            || artifact.coefficients.iter().any(|row| row.len() != n_features)
        {
            return Err(ModelError::InvalidArtifact(format!(
                "coefficients must be {} x {}",
                n_classes, n_features
            )));
        }

        let flat: Vec<f64> = artifact.coefficients.into_iter().flatten().collect();

        Ok(Self {
            version: artifact.version,
            feature_order: artifact.feature_order,
            classes: artifact.classes,
            coefficients: DMatrix::from_row_slice(n_classes, n_features, &flat),
            intercepts: DVector::from_vec(artifact.intercepts),
            probability: artifact.probability,
        })
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        let artifact: ModelArtifact = serde_json::from_str(&content)?;
        let trained_at = artifact.trained_at;
        let model = Self::from_artifact(artifact)?;

        info!(
            "Loaded classifier {} from {} ({} classes, {} features, trained {})",
            model.version(),
            path.display(),
            model.classes.len(),
            model.feature_order.len(),
            trained_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "unknown".to_string())
        );
        Ok(model)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    fn logits(&self, features: &FeatureMap) -> Result<DVector<f64>, ModelError> {
        let x = self
            .feature_order
            .iter()
            .map(|name| {
                features
                    .get(name)
                    .map(|score| score.value())
                    .ok_or_else(|| ModelError::MissingFeature(name.clone()))
            })
            .collect::<Result<Vec<f64>, _>>()?;

        let logits = &self.coefficients * DVector::from_vec(x) + &self.intercepts;
        if logits.iter().any(|z| !z.is_finite()) {
            return Err(ModelError::NonFinite);
        }
        Ok(logits)
    }
}

impl Classifier for LinearClassifier {
    fn predict(&self, features: &FeatureMap) -> Result<String, ModelError> {
        let logits = self.logits(features)?;

        // first maximum wins
        let mut best = 0;
        for (i, z) in logits.iter().enumerate() {
            if *z > logits[best] {
                best = i;
            }
        }
        Ok(self.classes[best].clone())
    }

    fn predict_proba(&self, features: &FeatureMap) -> Result<Vec<f64>, ModelError> {
        let logits = self.logits(features)?;
        let max = logits.max();
        let exp: Vec<f64> = logits.iter().map(|z| (z - max).exp()).collect();
        let total: f64 = exp.iter().sum();
        Ok(exp.into_iter().map(|e| e / total).collect())
    }

    fn supports_probability(&self) -> bool {
        self.probability
    }
}

/// Result of one model call.
#[derive(Debug)]
pub enum PredictionOutcome {
    Predicted {
        label: String,
        confidence: Option<f64>,
    },
    Failed(ModelError),
}

/// Startup-loaded classifier handle. `None` when loading failed; that state
/// lasts for the life of the process.
#[derive(Clone, Default)]
pub struct PredictorAdapter {
    classifier: Option<Arc<dyn Classifier>>,
}

impl PredictorAdapter {
    pub fn available(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            classifier: Some(classifier),
        }
    }

    pub fn unavailable() -> Self {
        Self { classifier: None }
    }

    pub async fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match LinearClassifier::load(path).await {
            Ok(model) => Self::available(Arc::new(model)),
            Err(e) => {
                error!("Failed to load ML model from {}: {}", path.display(), e);
                Self::unavailable()
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.classifier.is_some()
    }

    /// Runs the classifier. Returns `None` only when no model is loaded; model
    /// errors come back as [`PredictionOutcome::Failed`].
    pub fn predict(&self, features: &FeatureMap) -> Option<PredictionOutcome> {
        let classifier = self.classifier.as_ref()?;
        Some(Self::run(classifier.as_ref(), features))
    }

    fn run(classifier: &dyn Classifier, features: &FeatureMap) -> PredictionOutcome {
        let label = match classifier.predict(features) {
            Ok(label) => label,
            Err(e) => return PredictionOutcome::Failed(e),
        };

        let confidence = if classifier.supports_probability() {
            match classifier.predict_proba(features) {
                Ok(probabilities) => probabilities.into_iter().reduce(f64::max),
                Err(e) => return PredictionOutcome::Failed(e),
            }
        } else {
            None
        };

        debug!("Model predicted {} (confidence {:?})", label, confidence);
        PredictionOutcome::Predicted { label, confidence }
    }
}
