use crate::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{info, warn};

/// One entry of the course suggestions file. Keys other than the three known
/// ones are carried in `metadata` and written back out unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CourseRecord {
    pub course: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills_required: Option<Vec<String>>,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl CourseRecord {
    pub fn skills(&self) -> &[String] {
        self.skills_required.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone)]
struct SearchText {
    course: String,
    overview: String,
    skills: Vec<String>,
}

impl SearchText {
    fn of(record: &CourseRecord) -> Self {
        Self {
            course: record.course.to_lowercase(),
            overview: record.overview.as_deref().unwrap_or_default().to_lowercase(),
            skills: record.skills().iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    fn mentions(&self, needle: &str) -> bool {
        self.course.contains(needle)
            || self.overview.contains(needle)
            || self.skills.iter().any(|skill| skill.contains(needle))
    }
}

/// Read-only course list, kept in file order.
#[derive(Debug, Clone, Default)]
pub struct CourseCatalog {
    courses: Vec<CourseRecord>,
    search: Vec<SearchText>,
}

impl CourseCatalog {
    pub fn new(courses: Vec<CourseRecord>) -> Self {
        let search = courses.iter().map(SearchText::of).collect();
        Self { courses, search }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        let catalog = Self::from_json(&content)?;
        info!(
            "Loaded {} courses from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Parses a JSON array of course objects. Elements that are not course
    /// records are skipped.
    pub fn from_json(content: &str) -> Result<Self, AppError> {
        let raw: Vec<Value> = serde_json::from_str(content)?;
        let mut courses = Vec::with_capacity(raw.len());

        for (position, value) in raw.into_iter().enumerate() {
            match serde_json::from_value::<CourseRecord>(value) {
                Ok(record) => courses.push(record),
                Err(e) => warn!("Skipping course entry {}: {}", position, e),
            }
        }

        Ok(Self::new(courses))
    }

    pub fn courses(&self) -> &[CourseRecord] {
        &self.courses
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Courses whose name, overview or any required skill contains `keyword`,
    /// ignoring case. Catalog order is preserved.
    pub fn mentioning<'a>(&'a self, keyword: &str) -> impl Iterator<Item = &'a CourseRecord> + 'a {
        let needle = keyword.to_lowercase();
        self.courses
            .iter()
            .zip(self.search.iter())
            .filter(move |(_, text)| text.mentions(&needle))
            .map(|(record, _)| record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CATALOG: &str = r#"[
        {"course": "B.Des Fashion Designing", "overview": "Clothing and textiles", "skills_required": ["Creativity", "Sketching"], "colleges": ["NIFT Delhi"]},
        {"course": "B.Sc Biology", "skills_required": ["Lab work"]},
        {"overview": "missing a course name"},
        {"course": "MBBS", "overview": "Become a DOCTOR", "duration": "5.5 years"}
    ]"#;

    #[test]
    fn test_parse_skips_invalid_entries() {
        let catalog = CourseCatalog::from_json(CATALOG).unwrap();

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.courses()[2].course, "MBBS");
        assert!(catalog.courses()[1].overview.is_none());
    }

    #[test]
    fn test_metadata_passes_through() {
        let catalog = CourseCatalog::from_json(CATALOG).unwrap();
        let json = serde_json::to_value(&catalog.courses()[0]).unwrap();

        assert_eq!(json["colleges"][0], "NIFT Delhi");
        assert_eq!(json["skills_required"][1], "Sketching");

        let biology = serde_json::to_value(&catalog.courses()[1]).unwrap();
        assert!(biology.get("overview").is_none());
    }

    #[test]
    fn test_mentioning_is_case_insensitive_across_fields() {
        let catalog = CourseCatalog::from_json(CATALOG).unwrap();

        let by_name: Vec<_> = catalog.mentioning("designing").map(|c| &c.course).collect();
        assert_eq!(by_name, vec!["B.Des Fashion Designing"]);

        let by_overview: Vec<_> = catalog.mentioning("Doctor").map(|c| &c.course).collect();
        assert_eq!(by_overview, vec!["MBBS"]);

        let by_skill: Vec<_> = catalog.mentioning("LAB").map(|c| &c.course).collect();
        assert_eq!(by_skill, vec!["B.Sc Biology"]);

        assert_eq!(catalog.mentioning("Welding").count(), 0);
    }

    #[test]
    fn test_non_array_is_an_error() {
        assert!(CourseCatalog::from_json(r#"{"course": "x"}"#).is_err());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CATALOG.as_bytes()).unwrap();

        let catalog = CourseCatalog::load(file.path()).await.unwrap();
        assert_eq!(catalog.len(), 3);

        assert!(CourseCatalog::load("does/not/exist.json").await.is_err());
    }
}
