use serde::{
    ser::{SerializeMap, SerializeTuple},
    Serialize, Serializer,
};
use std::cmp::Ordering;

pub const DIMENSION_COUNT: usize = 25;
pub const TOP_FEATURE_COUNT: usize = 5;

/// Quiz dimensions in the exact column order the classifier was trained on.
pub const INTEREST_DIMENSIONS: [&str; DIMENSION_COUNT] = [
    "Drawing",
    "Dancing",
    "Singing",
    "Photography",
    "Makeup",
    "Designing",
    "Solving Puzzles",
    "Coding",
    "Electricity Components",
    "Science, Chemistry, Physics",
    "Mechanic Parts",
    "Computer Parts",
    "Engineering",
    "Doctor",
    "Gardening",
    "Biology",
    "Chemistry",
    "Business",
    "Management",
    "Leadership",
    "Communication",
    "Helping Others",
    "Teaching",
    "Counseling",
    "Social Work",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InterestCategory {
    #[serde(rename = "Creative & Artistic")]
    CreativeArtistic,
    #[serde(rename = "Logical & Scientific")]
    LogicalScientific,
    #[serde(rename = "Technical & Mechanical")]
    TechnicalMechanical,
    #[serde(rename = "Medical & Biological")]
    MedicalBiological,
    #[serde(rename = "Business & Management")]
    BusinessManagement,
    #[serde(rename = "Social & Helping")]
    SocialHelping,
}

impl InterestCategory {
    /// Quiz section a dimension index belongs to.
    pub fn of_index(index: usize) -> Option<Self> {
        match index {
            0..=5 => Some(Self::CreativeArtistic),
            6..=9 => Some(Self::LogicalScientific),
            10..=12 => Some(Self::TechnicalMechanical),
            13..=16 => Some(Self::MedicalBiological),
            17..=20 => Some(Self::BusinessManagement),
            21..=24 => Some(Self::SocialHelping),
            _ => None,
        }
    }
}

/// A quiz score. Integral values are echoed back as JSON integers.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Score(pub f64);

impl Score {
    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for Score {
    fn from(value: f64) -> Self {
        Score(value)
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let v = self.0;
        if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
            serializer.serialize_i64(v as i64)
        } else {
            serializer.serialize_f64(v)
        }
    }
}

/// Scores for all 25 dimensions, in canonical order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMap {
    entries: Vec<(&'static str, Score)>,
}

impl FeatureMap {
    pub fn get(&self, name: &str) -> Option<Score> {
        self.entries
            .iter()
            .find(|(dimension, _)| *dimension == name)
            .map(|(_, score)| *score)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Score)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The highest scoring dimensions, descending. Equal scores keep canonical order.
    pub fn top_features(&self) -> Vec<TopFeature> {
        let mut ranked: Vec<TopFeature> = self
            .iter()
            .map(|(dimension, score)| TopFeature(dimension, score))
            .collect();

        // sort_by is stable
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        ranked.truncate(TOP_FEATURE_COUNT);
        ranked
    }
}

impl Serialize for FeatureMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (dimension, score) in &self.entries {
            map.serialize_entry(dimension, score)?;
        }
        map.end()
    }
}

/// `(dimension, score)`, serialized as a two element array.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopFeature(pub &'static str, pub Score);

impl TopFeature {
    pub fn dimension(&self) -> &'static str {
        self.0
    }

    pub fn score(&self) -> Score {
        self.1
    }
}

impl Serialize for TopFeature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut pair = serializer.serialize_tuple(2)?;
        pair.serialize_element(self.0)?;
        pair.serialize_element(&self.1)?;
        pair.end()
    }
}

/// Zips answer `i` onto dimension `i`.
///
/// Positions past the end of `answers` score 0. Callers are expected to have
/// rejected vectors whose length is not [`DIMENSION_COUNT`]; the padding is kept
/// so the builder itself never panics on a short vector.
pub fn build_feature_map(answers: &[f64]) -> FeatureMap {
    let entries = INTEREST_DIMENSIONS
        .iter()
        .enumerate()
        .map(|(i, dimension)| (*dimension, Score(answers.get(i).copied().unwrap_or(0.0))))
        .collect();

    FeatureMap { entries }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_answers() -> Vec<f64> {
        (0..DIMENSION_COUNT).map(|i| (i % 5 + 1) as f64).collect()
    }

    #[test]
    fn test_feature_map_has_every_dimension_in_order() {
        let answers = sample_answers();
        let features = build_feature_map(&answers);

        assert_eq!(features.len(), DIMENSION_COUNT);
        for (i, (dimension, score)) in features.iter().enumerate() {
            assert_eq!(dimension, INTEREST_DIMENSIONS[i]);
            assert_eq!(score.value(), answers[i]);
        }
        assert_eq!(features.get("Coding"), Some(Score(3.0)));
        assert_eq!(features.get("Astronomy"), None);
    }

    #[test]
    fn test_short_answers_default_to_zero() {
        let features = build_feature_map(&[4.0, 2.0]);

        assert_eq!(features.len(), DIMENSION_COUNT);
        assert_eq!(features.get("Drawing"), Some(Score(4.0)));
        assert_eq!(features.get("Dancing"), Some(Score(2.0)));
        assert_eq!(features.get("Social Work"), Some(Score(0.0)));
    }

    #[test]
    fn test_top_features_sorted_and_truncated() {
        let features = build_feature_map(&sample_answers());
        let top = features.top_features();

        assert_eq!(top.len(), TOP_FEATURE_COUNT);
        assert!(top.windows(2).all(|w| w[0].score() >= w[1].score()));
        assert!(top.iter().all(|t| t.score() == Score(5.0)));
    }

    #[test]
    fn test_top_features_ties_keep_canonical_order() {
        let mut answers = vec![0.0; DIMENSION_COUNT];
        answers[..5].copy_from_slice(&[5.0; 5]);
        let top = build_feature_map(&answers).top_features();

        let names: Vec<&str> = top.iter().map(|t| t.dimension()).collect();
        assert_eq!(
            names,
            vec!["Drawing", "Dancing", "Singing", "Photography", "Makeup"]
        );
    }

    #[test]
    fn test_scores_serialize_as_integers_when_integral() {
        assert_eq!(serde_json::to_string(&Score(4.0)).unwrap(), "4");
        assert_eq!(serde_json::to_string(&Score(3.5)).unwrap(), "3.5");
        assert_eq!(
            serde_json::to_string(&TopFeature("Coding", Score(5.0))).unwrap(),
            r#"["Coding",5]"#
        );
    }

    #[test]
    fn test_feature_map_serializes_in_canonical_order() {
        let json = serde_json::to_string(&build_feature_map(&sample_answers())).unwrap();

        assert!(json.starts_with(r#"{"Drawing":1,"Dancing":2"#));
        assert!(json.ends_with(r#""Social Work":5}"#));
    }

    #[test]
    fn test_categories_cover_every_dimension() {
        assert!((0..DIMENSION_COUNT).all(|i| InterestCategory::of_index(i).is_some()));
        assert_eq!(
            InterestCategory::of_index(7),
            Some(InterestCategory::LogicalScientific)
        );
        assert_eq!(InterestCategory::of_index(DIMENSION_COUNT), None);
    }
}
