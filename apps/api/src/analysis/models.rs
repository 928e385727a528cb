//! Domain types for coursework analysis. Field names follow the wire format (camelCase).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;

/// The fixed set of career paths a user can map coursework onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CareerPath {
    #[serde(rename = "Data Scientist")]
    DataScientist,
    #[serde(rename = "Data Analyst")]
    DataAnalyst,
    #[serde(rename = "Software Engineer")]
    SoftwareEngineer,
    #[serde(rename = "Project Manager")]
    ProjectManager,
    #[serde(rename = "Product Manager")]
    ProductManager,
    #[serde(rename = "UX Designer")]
    UxDesigner,
    #[serde(rename = "Marketing Specialist")]
    MarketingSpecialist,
    #[serde(rename = "Business Analyst")]
    BusinessAnalyst,
}

impl CareerPath {
    pub const ALL: [CareerPath; 8] = [
        CareerPath::DataScientist,
        CareerPath::DataAnalyst,
        CareerPath::SoftwareEngineer,
        CareerPath::ProjectManager,
        CareerPath::ProductManager,
        CareerPath::UxDesigner,
        CareerPath::MarketingSpecialist,
        CareerPath::BusinessAnalyst,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CareerPath::DataScientist => "Data Scientist",
            CareerPath::DataAnalyst => "Data Analyst",
            CareerPath::SoftwareEngineer => "Software Engineer",
            CareerPath::ProjectManager => "Project Manager",
            CareerPath::ProductManager => "Product Manager",
            CareerPath::UxDesigner => "UX Designer",
            CareerPath::MarketingSpecialist => "Marketing Specialist",
            CareerPath::BusinessAnalyst => "Business Analyst",
        }
    }
}

impl fmt::Display for CareerPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CareerPath {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        CareerPath::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| AppError::Validation(format!("Unknown career path: {s}")))
    }
}

/// Raw request body. Both fields are optional on the wire so that a missing
/// field becomes a validation error rather than a deserialization rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequestBody {
    #[serde(default)]
    pub coursework_content: Option<String>,
    #[serde(default)]
    pub career_path: Option<String>,
}

/// A validated analysis request.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub coursework_content: String,
    pub career_path: CareerPath,
}

impl TryFrom<AnalysisRequestBody> for AnalysisRequest {
    type Error = AppError;

    fn try_from(body: AnalysisRequestBody) -> Result<Self, Self::Error> {
        let coursework_content = body
            .coursework_content
            .filter(|c| !c.trim().is_empty());
        let career_path = body.career_path.filter(|c| !c.trim().is_empty());

        let (Some(coursework_content), Some(career_path)) = (coursework_content, career_path)
        else {
            return Err(AppError::Validation(
                "Missing courseworkContent or careerPath".to_string(),
            ));
        };

        Ok(AnalysisRequest {
            coursework_content,
            career_path: career_path.parse()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillCategory {
    Technical,
    #[serde(rename = "Soft Skills")]
    SoftSkills,
    Professional,
}

impl fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SkillCategory::Technical => "Technical",
            SkillCategory::SoftSkills => "Soft Skills",
            SkillCategory::Professional => "Professional",
        })
    }
}

/// An extracted competency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub name: String,
    /// 0.0 to 1.0
    pub confidence: f64,
    pub category: SkillCategory,
    #[serde(default)]
    pub related_courses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerMatch {
    pub career: String,
    pub matched_skills: Vec<String>,
    /// 0 to 100
    #[serde(deserialize_with = "deserialize_percentage")]
    pub percentage_fit: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_skills: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<String>,
}

/// Full structured output of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub skills: Vec<Skill>,
    pub career_match: CareerMatch,
}

impl AnalysisResult {
    /// Reads a relayed gateway value as a typed result.
    /// The relay itself never does this; only callers that need the parts (persistence) do.
    pub fn from_value(value: Value) -> Result<Self, AppError> {
        let result: Self = serde_json::from_value(value)
            .map_err(|e| AppError::MalformedResponse(format!("unexpected analysis shape: {e}")))?;
        result.check_ranges()?;
        Ok(result)
    }

    fn check_ranges(&self) -> Result<(), AppError> {
        if self.career_match.percentage_fit > 100 {
            return Err(AppError::MalformedResponse(format!(
                "percentageFit out of range: {}",
                self.career_match.percentage_fit
            )));
        }
        if let Some(skill) = self
            .skills
            .iter()
            .find(|s| !(0.0..=1.0).contains(&s.confidence))
        {
            return Err(AppError::MalformedResponse(format!(
                "confidence out of range for {}: {}",
                skill.name, skill.confidence
            )));
        }
        Ok(())
    }
}

/// Accepts whole numbers written either as integers or as floats (`85` or `85.0`).
fn deserialize_percentage<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let n = f64::deserialize(deserializer)?;
    if n.fract() != 0.0 || !(0.0..=f64::from(u8::MAX)).contains(&n) {
        return Err(serde::de::Error::custom(format!(
            "expected a whole percentage, got {n}"
        )));
    }
    Ok(n as u8)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn body(content: Option<&str>, career: Option<&str>) -> AnalysisRequestBody {
        AnalysisRequestBody {
            coursework_content: content.map(str::to_string),
            career_path: career.map(str::to_string),
        }
    }

    #[test]
    fn test_career_path_labels_roundtrip_through_from_str() {
        for career in CareerPath::ALL {
            assert_eq!(career.label().parse::<CareerPath>().unwrap(), career);
        }
    }

    #[test]
    fn test_career_path_from_str_is_case_insensitive() {
        assert_eq!(
            "  ux designer ".parse::<CareerPath>().unwrap(),
            CareerPath::UxDesigner
        );
    }

    #[test]
    fn test_unknown_career_path_is_validation_error() {
        let err = "Astronaut".parse::<CareerPath>().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_career_path_serde_uses_labels() {
        let json = serde_json::to_string(&CareerPath::MarketingSpecialist).unwrap();
        assert_eq!(json, r#""Marketing Specialist""#);
    }

    #[test]
    fn test_request_requires_both_fields() {
        for b in [
            body(None, Some("Data Analyst")),
            body(Some("Linear algebra"), None),
            body(Some("   "), Some("Data Analyst")),
            body(Some("Linear algebra"), Some("")),
            AnalysisRequestBody::default(),
        ] {
            let err = AnalysisRequest::try_from(b).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
    }

    #[test]
    fn test_request_body_accepts_camel_case() {
        let b: AnalysisRequestBody = serde_json::from_str(
            r#"{"courseworkContent": "Databases 101", "careerPath": "Software Engineer"}"#,
        )
        .unwrap();
        let request = AnalysisRequest::try_from(b).unwrap();
        assert_eq!(request.coursework_content, "Databases 101");
        assert_eq!(request.career_path, CareerPath::SoftwareEngineer);
    }

    #[test]
    fn test_analysis_result_full_deserializes_correctly() {
        let json = serde_json::json!({
            "skills": [
                {
                    "name": "Stakeholder Communication",
                    "confidence": 0.75,
                    "category": "Soft Skills",
                    "relatedCourses": ["Business Writing", "Team Project"]
                }
            ],
            "careerMatch": {
                "career": "Project Manager",
                "matchedSkills": ["Stakeholder Communication"],
                "percentageFit": 62,
                "missingSkills": ["Budgeting"],
                "recommendations": "Take a course in project finance."
            }
        });

        let result = AnalysisResult::from_value(json).unwrap();
        assert_eq!(result.skills[0].category, SkillCategory::SoftSkills);
        assert_eq!(result.skills[0].related_courses.len(), 2);
        assert_eq!(result.career_match.percentage_fit, 62);
        assert_eq!(
            result.career_match.missing_skills.as_deref(),
            Some(&["Budgeting".to_string()][..])
        );
    }

    #[test]
    fn test_optional_career_match_fields_are_omitted_when_absent() {
        let json = serde_json::json!({
            "skills": [],
            "careerMatch": {
                "career": "Data Analyst",
                "matchedSkills": [],
                "percentageFit": 0
            }
        });
        let result = AnalysisResult::from_value(json.clone()).unwrap();
        assert_eq!(serde_json::to_value(&result).unwrap(), json);
    }

    fn result_json(confidence: Value, percentage_fit: Value) -> Value {
        serde_json::json!({
            "skills": [
                {
                    "name": "Regression Analysis",
                    "confidence": confidence,
                    "category": "Technical"
                }
            ],
            "careerMatch": {
                "career": "Data Analyst",
                "matchedSkills": ["Regression Analysis"],
                "percentageFit": percentage_fit
            }
        })
    }

    #[test]
    fn test_percentage_fit_above_100_is_malformed_response() {
        let err = AnalysisResult::from_value(result_json(json!(0.8), json!(150))).unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse(_)));
    }

    #[test]
    fn test_confidence_outside_unit_range_is_malformed_response() {
        for confidence in [json!(3.7), json!(-0.1)] {
            let err = AnalysisResult::from_value(result_json(confidence, json!(70)))
                .unwrap_err();
            assert!(matches!(err, AppError::MalformedResponse(_)));
        }
    }

    #[test]
    fn test_integral_float_percentage_fit_is_accepted() {
        let result = AnalysisResult::from_value(result_json(json!(1.0), json!(85.0))).unwrap();
        assert_eq!(result.career_match.percentage_fit, 85);
        assert_eq!(result.skills[0].confidence, 1.0);
    }

    #[test]
    fn test_fractional_percentage_fit_is_malformed_response() {
        let err = AnalysisResult::from_value(result_json(json!(0.5), json!(85.5))).unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse(_)));
    }

    #[test]
    fn test_wrong_shape_is_malformed_response() {
        let err = AnalysisResult::from_value(serde_json::json!({ "summary": "ok" })).unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse(_)));
    }
}
