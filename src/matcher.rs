use crate::{
    catalog::{CourseCatalog, CourseRecord},
    features::{Score, TopFeature},
};
use serde::Serialize;

pub const HIGH_INTEREST_THRESHOLD: f64 = 4.0;
pub const COURSES_PER_DIMENSION: usize = 3;
pub const GENERAL_INTEREST: &str = "General Interest";
pub const GENERAL_INTEREST_SCORE: f64 = 3.0;
pub const GENERAL_INTEREST_COURSES: usize = 5;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecommendationEntry {
    pub feature: String,
    pub score: Score,
    pub courses: Vec<CourseRecord>,
}

/// Matches high-interest dimensions against the catalog by keyword.
///
/// Every top feature scoring at least [`HIGH_INTEREST_THRESHOLD`] yields one entry
/// holding the first [`COURSES_PER_DIMENSION`] courses that mention it. When no
/// dimension produces an entry, a single "General Interest" entry with the head of
/// the catalog is returned instead.
pub fn recommend(top_features: &[TopFeature], catalog: &CourseCatalog) -> Vec<RecommendationEntry> {
    let mut recommendations: Vec<RecommendationEntry> = top_features
        .iter()
        .filter(|top| top.score().value() >= HIGH_INTEREST_THRESHOLD)
        .filter_map(|top| {
            let courses: Vec<CourseRecord> = catalog
                .mentioning(top.dimension())
                .take(COURSES_PER_DIMENSION)
                .cloned()
                .collect();

            (!courses.is_empty()).then(|| RecommendationEntry {
                feature: top.dimension().to_string(),
                score: top.score(),
                courses,
            })
        })
        .collect();

    if recommendations.is_empty() {
        recommendations.push(RecommendationEntry {
            feature: GENERAL_INTEREST.to_string(),
            score: Score(GENERAL_INTEREST_SCORE),
            courses: catalog
                .courses()
                .iter()
                .take(GENERAL_INTEREST_COURSES)
                .cloned()
                .collect(),
        });
    }

    recommendations
}
